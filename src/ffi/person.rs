//! Person instances owned by the native side
//!
//! Handles are registry ids rather than raw pointers, so a stale or forged
//! handle is rejected instead of dereferenced.

use super::greet::{self, MAX_NAME_CHARS};
use super::{decode_request, guarded, read_input, respond, Failure, NativeResult};
use crate::proto::{self, CallStatus, Greetings, PersonParams};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

/// Oldest age accepted at construction
const MAX_AGE: u32 = 150;

#[derive(Debug, Clone)]
struct Person {
    name: String,
    age: u32,
}

static PEOPLE: Lazy<DashMap<u64, Person>> = Lazy::new(DashMap::new);

/// Handle 0 is reserved for "no instance"
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn validate(params: &PersonParams) -> NativeResult<()> {
    if params.name.is_empty() {
        return Err(Failure::new(CallStatus::EmptyParams));
    }
    if params.name.chars().count() > MAX_NAME_CHARS || params.age > MAX_AGE {
        return Err(Failure::new(CallStatus::InvalidArguments));
    }
    Ok(())
}

/// True while `handle` refers to a person that has not been freed
pub fn is_live_person(handle: u64) -> bool {
    PEOPLE.contains_key(&handle)
}

/// `PersonParams -> handle`
///
/// Writes the new handle into `out_handle` only on success.
///
/// # Safety
/// `ptr` must point to `len` readable bytes (or `len` must be 0), and
/// `out_handle` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn create_new_person(out_handle: *mut u64, ptr: *const u8, len: u64) -> i32 {
    if out_handle.is_null() {
        return CallStatus::InvalidArguments.code();
    }

    let created = guarded("create_new_person", || {
        let params: PersonParams = decode_request(read_input(ptr, len)?)?;
        validate(&params)?;

        let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        debug!(event = "person_created", handle, age = params.age, "Person created");
        PEOPLE.insert(
            handle,
            Person {
                name: params.name,
                age: params.age,
            },
        );
        Ok(handle)
    });

    match created {
        Ok(handle) => {
            *out_handle = handle;
            CallStatus::Ok.code()
        }
        Err(failure) => failure.status.code(),
    }
}

/// `(handle, Greetings) -> Response`
///
/// # Safety
/// Same as `rust_protos_greet`. Unknown handles are reported, not dereferenced.
#[no_mangle]
pub unsafe extern "C" fn person_greet(
    handle: u64,
    ptr: *const u8,
    len: u64,
    out_ptr: *mut u64,
    out_len: *mut u64,
) -> i32 {
    respond("person_greet", out_ptr, out_len, || {
        let person = PEOPLE.get(&handle).map(|p| p.value().clone()).ok_or_else(|| {
            Failure::with_details(
                CallStatus::InvalidArgumentsDetails,
                format!("unknown person handle {}", handle),
            )
        })?;

        let request: Greetings = decode_request(read_input(ptr, len)?)?;
        let response = greet::render(&request)?;
        trace!(
            event = "person_greet",
            handle,
            person = %person.name,
            age = person.age,
            "Person greeted"
        );
        Ok(proto::encode(&response))
    })
}

/// Free a person. Unknown handles are logged and ignored.
#[no_mangle]
pub extern "C" fn free_person(handle: u64) {
    match PEOPLE.remove(&handle) {
        Some((_, person)) => debug!(event = "person_freed", handle, person = %person.name),
        None => warn!(event = "person_free_unknown", handle, "Ignoring unknown person handle"),
    }
}
