//! Interoperability - host side of the protobuf call boundary
//!
//! Architecture:
//! - `abi.rs` - entry point signatures and the resolved symbol table
//! - `buffer.rs` - copy-out-and-release of native-owned buffers
//! - `status.rs` - status code to typed failure mapping
//! - `call.rs` - the three call shapes (function, constructor, method)
//! - `handle.rs` - owned native instances
//! - `library.rs` - dynamic loading and explicit teardown

mod abi;
mod buffer;
mod call;
mod handle;
mod library;
mod status;

pub use abi::{
    names, CreateNewArgsFn, FreeBufferFn, FreeInstanceFn, FuncArgsResultFn, MethodArgsResultFn,
    RawHandle, Symbols,
};
pub use buffer::{NativeBuffer, OutSlots};
pub use call::{create_new_args, func_args_result, method_args_result};
pub use handle::ForeignInstance;
pub use library::{LibraryError, LibraryResult, NativeLibrary};
pub use status::{CallError, CallOutcome, CallResult, FailureKind};
