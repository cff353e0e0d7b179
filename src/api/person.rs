use crate::interop::{names, CallResult, ForeignInstance, NativeLibrary};
use crate::proto::{Greetings, Language, PersonParams, Response};
use std::sync::Arc;

/// A person living on the native side.
///
/// Released on `dispose` or on drop, whichever comes first. `dispose`
/// consumes the value, so a released person cannot be used again.
#[derive(Debug)]
pub struct Person {
    instance: ForeignInstance,
}

impl Person {
    pub fn new(library: &Arc<NativeLibrary>, name: &str, age: u32) -> CallResult<Self> {
        let params = PersonParams {
            name: name.to_string(),
            age,
        };
        let instance = ForeignInstance::create(
            Arc::clone(library),
            "Person",
            |symbols| symbols.create_person,
            |symbols| symbols.free_person,
            &params,
        )?;
        Ok(Self { instance })
    }

    pub fn greet(&self, name: &str) -> CallResult<String> {
        self.greet_in(name, Language::English)
    }

    pub fn greet_in(&self, name: &str, language: Language) -> CallResult<String> {
        let request = Greetings {
            name: name.to_string(),
            language: language as i32,
        };
        let response: Response =
            self.instance
                .call(names::PERSON_GREET, |symbols| symbols.person_greet, &request)?;
        Ok(response.text)
    }

    /// Release the native person now and surface any error.
    pub fn dispose(self) -> CallResult<()> {
        self.instance.release()
    }

    pub fn is_live(&self) -> bool {
        self.instance.is_live()
    }

    /// Underlying instance, for callers that need handle-level control
    pub fn instance(&self) -> &ForeignInstance {
        &self.instance
    }
}
