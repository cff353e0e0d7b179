//! Protolink - protobuf messages across a C ABI boundary
//!
//! Built as a `cdylib`, this crate is the native library: `ffi` exports
//! `free_buffer`, `rust_protos_greet`, `create_new_person`, `person_greet`
//! and `free_person`. Built as an `rlib`, it is the host: `interop` moves
//! encoded messages across the boundary, owns every native buffer and
//! handle, and turns status codes into typed errors.

pub mod api;
pub mod config;
pub mod ffi;
pub mod interop;
pub mod logging;
pub mod proto;

// Re-export commonly used items
pub use api::{greet, greet_in, Person};
pub use config::{Config, ConfigError};
pub use interop::{CallError, CallResult, FailureKind, ForeignInstance, LibraryError, NativeLibrary};
pub use logging::LogConfig;
pub use proto::Language;
