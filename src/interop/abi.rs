//! Boundary ABI - entry point signatures and the symbol table
//!
//! Pointers, lengths and handles all travel as `u64` so the layout is the
//! same on every host regardless of its native pointer width handling.

/// Native instance handle as seen by the host. Never dereferenced here.
pub type RawHandle = u64;

/// `free_buffer(ptr, len)`
pub type FreeBufferFn = unsafe extern "C" fn(ptr: u64, len: u64);

/// Free function: `(in_ptr, in_len, out_ptr, out_len) -> status`
pub type FuncArgsResultFn =
    unsafe extern "C" fn(ptr: *const u8, len: u64, out_ptr: *mut u64, out_len: *mut u64) -> i32;

/// Constructor: `(out_handle, in_ptr, in_len) -> status`
pub type CreateNewArgsFn =
    unsafe extern "C" fn(out_handle: *mut RawHandle, ptr: *const u8, len: u64) -> i32;

/// Instance method: `(handle, in_ptr, in_len, out_ptr, out_len) -> status`
pub type MethodArgsResultFn = unsafe extern "C" fn(
    handle: RawHandle,
    ptr: *const u8,
    len: u64,
    out_ptr: *mut u64,
    out_len: *mut u64,
) -> i32;

/// Instance destructor: `(handle)`
pub type FreeInstanceFn = unsafe extern "C" fn(handle: RawHandle);

/// Exported symbol names
pub mod names {
    pub const FREE_BUFFER: &str = "free_buffer";
    pub const GREET: &str = "rust_protos_greet";
    pub const CREATE_PERSON: &str = "create_new_person";
    pub const PERSON_GREET: &str = "person_greet";
    pub const FREE_PERSON: &str = "free_person";
}

/// Resolved entry points of one native library
#[derive(Debug, Clone, Copy)]
pub struct Symbols {
    pub free_buffer: FreeBufferFn,
    pub greet: FuncArgsResultFn,
    pub create_person: CreateNewArgsFn,
    pub person_greet: MethodArgsResultFn,
    pub free_person: FreeInstanceFn,
}

impl Symbols {
    /// Table bound to this crate's own exports.
    pub fn in_process() -> Self {
        use crate::ffi;
        Self {
            free_buffer: ffi::free_buffer,
            greet: ffi::rust_protos_greet,
            create_person: ffi::create_new_person,
            person_greet: ffi::person_greet,
            free_person: ffi::free_person,
        }
    }
}
