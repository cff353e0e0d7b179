//! C FFI - the native side of the boundary
//!
//! Every export follows the same contract:
//! 1. Input arrives as `(ptr, len)` and is only read
//! 2. Output is allocated here and reported through two `u64` out-slots
//! 3. The return value is a `CallStatus` code; positive codes may carry an
//!    `Error` record in the output buffer
//! 4. Panics never unwind across the boundary

mod buffer;
mod greet;
mod person;

pub use buffer::{export_bytes, free_buffer};
pub use greet::rust_protos_greet;
pub use person::{create_new_person, free_person, is_live_person, person_greet};

use crate::proto::{self, CallStatus};
use prost::Message;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};

/// Native-side failure: a status plus optional details for the error record
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Failure {
    pub status: CallStatus,
    pub details: Option<String>,
}

impl Failure {
    pub fn new(status: CallStatus) -> Self {
        Self {
            status,
            details: None,
        }
    }

    pub fn with_details(status: CallStatus, details: impl Into<String>) -> Self {
        Self {
            status,
            details: Some(details.into()),
        }
    }
}

pub(crate) type NativeResult<T> = Result<T, Failure>;

/// Borrow the input region. Zero length never touches the pointer.
pub(crate) unsafe fn read_input<'a>(ptr: *const u8, len: u64) -> NativeResult<&'a [u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(Failure::with_details(
            CallStatus::InvalidArgumentsDetails,
            format!("null input buffer with length {}", len),
        ));
    }
    Ok(std::slice::from_raw_parts(ptr, len as usize))
}

pub(crate) fn decode_request<M: Message + Default>(bytes: &[u8]) -> NativeResult<M> {
    proto::decode(bytes).map_err(|err| {
        debug!(event = "request_decode_failed", error = %err, "Rejecting malformed request");
        Failure::new(CallStatus::DecodeError)
    })
}

/// Run an export body and publish its outcome through the out-slots.
pub(crate) unsafe fn respond<F>(name: &str, out_ptr: *mut u64, out_len: *mut u64, body: F) -> i32
where
    F: FnOnce() -> NativeResult<Vec<u8>>,
{
    if out_ptr.is_null() || out_len.is_null() {
        error!(event = "null_out_slot", function = name, "Output slots must not be null");
        return CallStatus::InvalidArguments.code();
    }

    match guarded(name, body) {
        Ok(bytes) => {
            export_bytes(bytes, out_ptr, out_len);
            CallStatus::Ok.code()
        }
        Err(failure) => {
            let payload = failure
                .details
                .map(|details| proto::encode(&proto::Error { details }))
                .unwrap_or_default();
            export_bytes(payload, out_ptr, out_len);
            failure.status.code()
        }
    }
}

/// Catch panics so they surface as `INTERNAL_ERROR` instead of unwinding
/// into foreign frames.
pub(crate) fn guarded<T, F>(name: &str, body: F) -> NativeResult<T>
where
    F: FnOnce() -> NativeResult<T>,
{
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        error!(event = "native_panic", function = name, error = %message, "Native code panicked");
        Err(Failure::with_details(CallStatus::InternalError, message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "native code panicked".to_string()
    }
}
