//! Host side of the buffer transfer protocol
//!
//! The native side allocates every output buffer; the host copies it out
//! and hands the exact `(ptr, len)` back to `free_buffer`. `NativeBuffer`
//! is the scope guard for that pair: it releases exactly once, on drop,
//! whether the call succeeded, failed, or the copy panicked.

use super::abi::FreeBufferFn;
use tracing::trace;

/// The two out-slots passed to a native entry point
#[derive(Debug, Default)]
pub struct OutSlots {
    pub ptr: u64,
    pub len: u64,
}

impl OutSlots {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn ptr_slot(&mut self) -> *mut u64 {
        &mut self.ptr
    }

    #[inline]
    pub fn len_slot(&mut self) -> *mut u64 {
        &mut self.len
    }
}

/// Native-owned output buffer, released on drop
pub struct NativeBuffer {
    ptr: u64,
    len: u64,
    free: FreeBufferFn,
}

impl NativeBuffer {
    /// Take ownership of whatever the native side wrote into `slots`.
    ///
    /// # Safety
    /// `slots` must hold either `(0, _)` or a pointer/length pair returned
    /// by the library `free` belongs to, not yet released.
    #[inline]
    pub unsafe fn adopt(slots: OutSlots, free: FreeBufferFn) -> Self {
        Self {
            ptr: slots.ptr,
            len: slots.len,
            free,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Null pointer or zero length
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptr == 0 || self.len == 0
    }

    /// View the native bytes. Empty buffers are never dereferenced.
    pub fn as_slice(&self) -> &[u8] {
        if self.is_empty() {
            return &[];
        }
        // SAFETY: adopt() guarantees a live native allocation of `len` bytes
        unsafe { std::slice::from_raw_parts(self.ptr as *const u8, self.len as usize) }
    }

    /// Copy into host memory, then release the native allocation.
    pub fn into_vec(self) -> Vec<u8> {
        self.as_slice().to_vec()
        // `self` drops here and releases
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        trace!(
            event = "buffer_release",
            address = self.ptr,
            size_bytes = self.len,
            "Releasing native buffer"
        );
        // SAFETY: adopt() contract; Drop runs at most once
        unsafe { (self.free)(self.ptr, self.len) }
    }
}

impl std::fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("ptr", &format_args!("{:#x}", self.ptr))
            .field("len", &self.len)
            .finish()
    }
}
