//! Typed host API over the native exports

mod person;

pub use person::Person;

use crate::interop::{func_args_result, names, CallResult, NativeLibrary};
use crate::proto::{Greetings, Language, Response};

/// Greet `name` in English.
pub fn greet(library: &NativeLibrary, name: &str) -> CallResult<String> {
    greet_in(library, name, Language::English)
}

/// Greet `name` in `language`.
pub fn greet_in(library: &NativeLibrary, name: &str, language: Language) -> CallResult<String> {
    let request = Greetings {
        name: name.to_string(),
        language: language as i32,
    };
    let response: Response =
        func_args_result(library, names::GREET, library.symbols().greet, &request)?;
    Ok(response.text)
}
