//! Call adapter - encode, invoke, copy out, release, unwrap
//!
//! Three shapes share one unwrap path:
//! - free function `(in, out) -> status`
//! - constructor `(out_handle, in) -> status`
//! - instance method `(handle, in, out) -> status`
//!
//! No raw pointer leaves this module; every native buffer goes through
//! `NativeBuffer` and is released before the status is even inspected.

use super::abi::{CreateNewArgsFn, FuncArgsResultFn, MethodArgsResultFn, RawHandle, Symbols};
use super::buffer::{NativeBuffer, OutSlots};
use super::library::NativeLibrary;
use super::status::{CallError, CallOutcome, CallResult};
use crate::logging;
use crate::proto;
use prost::Message;
use std::num::NonZeroU64;

/// Invoke a stateless entry point.
pub fn func_args_result<I, R>(
    library: &NativeLibrary,
    name: &'static str,
    func: FuncArgsResultFn,
    input: &I,
) -> CallResult<R>
where
    I: Message,
    R: Message + Default,
{
    let request = proto::encode(input);
    logging::log_boundary_call(name, request.len());

    let mut slots = OutSlots::new();
    // SAFETY: request outlives the call; slots are valid for writes
    let status = unsafe {
        func(
            request.as_ptr(),
            request.len() as u64,
            slots.ptr_slot(),
            slots.len_slot(),
        )
    };

    unwrap_output(library, name, status, slots)
}

/// Invoke a library's constructor and return the new native handle.
///
/// Construction carries a status like every other call. There is no output
/// buffer, so failures have no details. A zero handle on success is
/// reported as `NullHandle`.
pub fn create_new_args<I>(
    library: &NativeLibrary,
    name: &'static str,
    constructor: fn(&Symbols) -> CreateNewArgsFn,
    input: &I,
) -> CallResult<NonZeroU64>
where
    I: Message,
{
    let func = constructor(library.symbols());
    let request = proto::encode(input);
    logging::log_boundary_call(name, request.len());

    let mut handle: RawHandle = 0;
    // SAFETY: request outlives the call; handle slot is valid for writes
    let status = unsafe { func(&mut handle, request.as_ptr(), request.len() as u64) };

    CallOutcome::from_status(status, Vec::new())
        .into_result()
        .map_err(|err| failed(name, status, err))?;

    let handle =
        NonZeroU64::new(handle).ok_or_else(|| failed(name, status, CallError::NullHandle(name)))?;

    logging::log_boundary_return(name, status);
    Ok(handle)
}

/// Invoke an instance method on a live handle.
///
/// Callers are responsible for `handle` being live; `ForeignInstance`
/// is the only caller that should reach this.
pub fn method_args_result<I, R>(
    library: &NativeLibrary,
    name: &'static str,
    func: MethodArgsResultFn,
    handle: RawHandle,
    input: &I,
) -> CallResult<R>
where
    I: Message,
    R: Message + Default,
{
    let request = proto::encode(input);
    logging::log_boundary_call(name, request.len());

    let mut slots = OutSlots::new();
    // SAFETY: as in func_args_result, plus the handle contract above
    let status = unsafe {
        func(
            handle,
            request.as_ptr(),
            request.len() as u64,
            slots.ptr_slot(),
            slots.len_slot(),
        )
    };

    unwrap_output(library, name, status, slots)
}

/// Copy out and release the output buffer, then classify the status.
fn unwrap_output<R>(
    library: &NativeLibrary,
    name: &'static str,
    status: i32,
    slots: OutSlots,
) -> CallResult<R>
where
    R: Message + Default,
{
    // SAFETY: slots were just filled by an entry point of `library`
    let buffer = unsafe { NativeBuffer::adopt(slots, library.symbols().free_buffer) };
    let payload = buffer.into_vec();

    let bytes = CallOutcome::from_status(status, payload)
        .into_result()
        .map_err(|err| failed(name, status, err))?;

    // proto3 encodes an all-default message as zero bytes
    let result = if bytes.is_empty() {
        R::default()
    } else {
        proto::decode::<R>(&bytes)
            .map_err(|err| failed(name, status, CallError::MalformedResponse(err.to_string())))?
    };

    logging::log_boundary_return(name, status);
    Ok(result)
}

#[inline]
fn failed(name: &'static str, status: i32, err: CallError) -> CallError {
    logging::log_boundary_failure(name, status, &err);
    err
}
