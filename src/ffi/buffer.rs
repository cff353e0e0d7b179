//! Native-side buffer ownership transfer
//!
//! Output bytes become a leaked boxed slice; the host gets `(ptr, len)` and
//! must hand the same pair back to `free_buffer`.

use tracing::trace;

/// Leak `bytes` and write its location into the out-slots.
/// Empty output writes `(0, 0)`.
///
/// # Safety
/// `out_ptr` and `out_len` must be valid for writes.
pub unsafe fn export_bytes(bytes: Vec<u8>, out_ptr: *mut u64, out_len: *mut u64) {
    if bytes.is_empty() {
        *out_ptr = 0;
        *out_len = 0;
        return;
    }

    let len = bytes.len();
    let ptr = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
    trace!(event = "buffer_export", address = ?ptr, size_bytes = len);

    *out_ptr = ptr as u64;
    *out_len = len as u64;
}

/// Return an output buffer to the native allocator.
///
/// Null pointers are ignored, so the host may release unconditionally.
///
/// # Safety
/// `(ptr, len)` must be exactly a pair produced by `export_bytes` that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn free_buffer(ptr: u64, len: u64) {
    if ptr == 0 {
        return;
    }
    trace!(event = "buffer_free", address = ptr, size_bytes = len);
    let slice = std::ptr::slice_from_raw_parts_mut(ptr as *mut u8, len as usize);
    drop(Box::from_raw(slice));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_empty_writes_null() {
        let (mut ptr, mut len) = (7u64, 7u64);
        unsafe { export_bytes(Vec::new(), &mut ptr, &mut len) };
        assert_eq!((ptr, len), (0, 0));
        unsafe { free_buffer(ptr, len) };
    }

    #[test]
    fn test_export_and_free() {
        let (mut ptr, mut len) = (0u64, 0u64);
        unsafe { export_bytes(b"hello".to_vec(), &mut ptr, &mut len) };
        assert_ne!(ptr, 0);
        assert_eq!(len, 5);
        let view = unsafe { std::slice::from_raw_parts(ptr as *const u8, len as usize) };
        assert_eq!(view, b"hello");
        unsafe { free_buffer(ptr, len) };
    }
}
