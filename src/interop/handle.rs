//! Opaque handle lifecycle: `Uncreated -> Live -> Released`
//!
//! The handle slot sits behind a read/write lock. Method calls hold the
//! read side for the whole boundary call, release takes the write side, so
//! a release can never overlap an in-flight call on the same instance.
//! Once the slot is empty every further call or release is answered
//! locally with `CallError::Released`.

use super::abi::{CreateNewArgsFn, FreeInstanceFn, MethodArgsResultFn, RawHandle, Symbols};
use super::call;
use super::library::NativeLibrary;
use super::status::{CallError, CallResult};
use crate::logging;
use parking_lot::RwLock;
use prost::Message;
use std::num::NonZeroU64;
use std::sync::Arc;

/// Host-side owner of one native object
pub struct ForeignInstance {
    library: Arc<NativeLibrary>,
    kind: &'static str,
    release_fn: FreeInstanceFn,
    handle: RwLock<Option<NonZeroU64>>,
}

impl ForeignInstance {
    /// Run `constructor` from `library`'s symbol table and take ownership
    /// of the handle it produces. The matching destructor comes from the
    /// same table, so the instance can only be released by the library
    /// that created it.
    pub fn create<I: Message>(
        library: Arc<NativeLibrary>,
        kind: &'static str,
        constructor: fn(&Symbols) -> CreateNewArgsFn,
        destructor: fn(&Symbols) -> FreeInstanceFn,
        params: &I,
    ) -> CallResult<Self> {
        let handle = call::create_new_args(&library, kind, constructor, params)?;
        logging::log_handle_created(kind, handle.get());

        let release_fn = destructor(library.symbols());
        Ok(Self {
            library,
            kind,
            release_fn,
            handle: RwLock::new(Some(handle)),
        })
    }

    /// Invoke an instance method. Rejected locally once released.
    pub fn call<I, R>(
        &self,
        name: &'static str,
        method: fn(&Symbols) -> MethodArgsResultFn,
        input: &I,
    ) -> CallResult<R>
    where
        I: Message,
        R: Message + Default,
    {
        let guard = self.handle.read();
        let handle = (*guard).ok_or(CallError::Released(self.kind))?;
        let func = method(self.library.symbols());
        call::method_args_result(&self.library, name, func, handle.get(), input)
    }

    /// Release the native object. Only the first call reaches the boundary.
    pub fn release(&self) -> CallResult<()> {
        let handle = self
            .handle
            .write()
            .take()
            .ok_or(CallError::Released(self.kind))?;
        self.release_raw(handle);
        Ok(())
    }

    pub fn is_live(&self) -> bool {
        self.handle.read().is_some()
    }

    /// Raw handle value while live, for diagnostics only
    pub fn raw_handle(&self) -> Option<RawHandle> {
        self.handle.read().map(NonZeroU64::get)
    }

    #[inline]
    pub fn library(&self) -> &Arc<NativeLibrary> {
        &self.library
    }

    fn release_raw(&self, handle: NonZeroU64) {
        // SAFETY: the slot was emptied under the write lock, so this handle
        // is released exactly once and no call is using it
        unsafe { (self.release_fn)(handle.get()) };
        logging::log_handle_released(self.kind, handle.get());
    }
}

impl Drop for ForeignInstance {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            self.release_raw(handle);
        }
    }
}

impl std::fmt::Debug for ForeignInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignInstance")
            .field("kind", &self.kind)
            .field("handle", &self.raw_handle())
            .finish()
    }
}
