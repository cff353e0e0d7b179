//! Protobuf messages exchanged across the boundary
//!
//! Declared in the shape `prost-build` emits, so both sides share one
//! definition and one wire encoding. Any schema change here changes the
//! boundary for every host that loads this library.

mod error;
mod greetings;
mod person;
mod response;

pub use error::{CallStatus, Error};
pub use greetings::{Greetings, Language};
pub use person::PersonParams;
pub use response::Response;

use prost::Message;

/// Encode a message into a fresh buffer sized by `encoded_len`.
#[inline]
pub fn encode<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

/// Decode a message from bytes.
#[inline]
pub fn decode<M: Message + Default>(bytes: &[u8]) -> Result<M, prost::DecodeError> {
    M::decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greetings_roundtrip() {
        let msg = Greetings {
            name: "Mike".to_string(),
            language: Language::Spanish as i32,
        };
        let decoded: Greetings = decode(&encode(&msg)).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_default_message_encodes_empty() {
        // proto3 omits default-valued fields entirely
        assert!(encode(&Greetings::default()).is_empty());
        assert!(encode(&PersonParams::default()).is_empty());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(CallStatus::DecodeError.as_str_name(), "DECODE_ERROR");
        assert_eq!(CallStatus::try_from(2).unwrap().as_str_name(), "INVALID_ARGUMENTS_DETAILS");
        assert_eq!(Language::French.as_str_name(), "FRENCH");
        assert!(CallStatus::try_from(6).is_err());
    }

    #[test]
    fn test_truncated_bytes_fail_to_decode() {
        let bytes = encode(&Response {
            text: "Hello, Mike".to_string(),
        });
        let result: Result<Response, _> = decode(&bytes[..bytes.len() - 3]);
        assert!(result.is_err());
    }
}
