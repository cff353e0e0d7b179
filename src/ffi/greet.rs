//! Stateless greeting export

use super::{decode_request, read_input, respond, Failure, NativeResult};
use crate::proto::{self, CallStatus, Greetings, Language, Response};
use tracing::debug;

/// Longest name accepted, in characters
pub(crate) const MAX_NAME_CHARS: usize = 256;

/// Validate a greeting request and render the response.
pub(crate) fn render(request: &Greetings) -> NativeResult<Response> {
    if request.name.is_empty() {
        return Err(Failure::new(CallStatus::EmptyParams));
    }

    let chars = request.name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(Failure::with_details(
            CallStatus::InvalidArgumentsDetails,
            format!("name must be at most {} characters, got {}", MAX_NAME_CHARS, chars),
        ));
    }

    let language =
        Language::try_from(request.language).map_err(|_| Failure::new(CallStatus::UnknownEnumValue))?;

    Ok(Response {
        text: format!("{}, {}", language.salutation(), request.name),
    })
}

/// `Greetings -> Response`
///
/// # Safety
/// `ptr` must point to `len` readable bytes (or `len` must be 0), and the
/// out-slots must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn rust_protos_greet(
    ptr: *const u8,
    len: u64,
    out_ptr: *mut u64,
    out_len: *mut u64,
) -> i32 {
    respond("rust_protos_greet", out_ptr, out_len, || {
        let request: Greetings = decode_request(read_input(ptr, len)?)?;
        let response = render(&request)?;
        debug!(
            event = "greet",
            language = Language::try_from(request.language).map_or("UNKNOWN", |l| l.as_str_name()),
            "Greeting rendered"
        );
        Ok(proto::encode(&response))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, language: i32) -> Greetings {
        Greetings {
            name: name.to_string(),
            language,
        }
    }

    #[test]
    fn test_render_languages() {
        let text = |lang: Language| render(&request("Mike", lang as i32)).unwrap().text;
        assert_eq!(text(Language::English), "Hello, Mike");
        assert_eq!(text(Language::Spanish), "Hola, Mike");
        assert_eq!(text(Language::French), "Bonjour, Mike");
    }

    #[test]
    fn test_render_empty_name() {
        let err = render(&request("", 0)).unwrap_err();
        assert_eq!(err, Failure::new(CallStatus::EmptyParams));
    }

    #[test]
    fn test_render_unknown_language() {
        let err = render(&request("Mike", 42)).unwrap_err();
        assert_eq!(err.status, CallStatus::UnknownEnumValue);
    }

    #[test]
    fn test_render_name_limit_counts_chars() {
        // multi-byte characters count once each
        let name = "é".repeat(MAX_NAME_CHARS);
        assert!(render(&request(&name, 0)).is_ok());

        let err = render(&request(&"x".repeat(MAX_NAME_CHARS + 1), 0)).unwrap_err();
        assert_eq!(err.status, CallStatus::InvalidArgumentsDetails);
        assert!(err.details.unwrap().contains("257"));
    }
}
