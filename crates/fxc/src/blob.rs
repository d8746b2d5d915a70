//! Owned access to the compiler's reference-counted output blobs.
//!
//! `D3DCompile` returns its outputs as ID3DBlob objects: a pointer to a
//! struct whose first field points to a virtual dispatch table. All raw
//! pointer work in the crate lives here; everything else operates on owned
//! byte vectors.

use std::ffi::c_void;
use std::ptr::NonNull;

/// Virtual dispatch table of an output blob.
///
/// The slot order (three IUnknown slots, then the two buffer accessors) is
/// the ID3DBlob ABI contract and must not be reordered.
#[repr(C)]
pub(crate) struct BlobVtbl {
    // The IUnknown slots are never called, but they occupy table positions
    // the accessor offsets depend on.
    #[allow(dead_code)]
    pub query_interface:
        unsafe extern "system" fn(*mut Blob, *const c_void, *mut *mut c_void) -> i32,
    #[allow(dead_code)]
    pub add_ref: unsafe extern "system" fn(*mut Blob) -> u32,
    pub release: unsafe extern "system" fn(*mut Blob) -> u32,
    pub get_buffer_pointer: unsafe extern "system" fn(*mut Blob) -> *mut c_void,
    pub get_buffer_size: unsafe extern "system" fn(*mut Blob) -> usize,
}

/// An output blob as the native side lays it out: a single pointer to the
/// vtable.
#[repr(C)]
pub(crate) struct Blob {
    vtbl: *const BlobVtbl,
}

/// Sole owner of a blob received through a `D3DCompile` out-parameter.
///
/// Dropping the wrapper calls the blob's `release` slot. The raw handle
/// never escapes, so the release runs exactly once on every exit path and
/// use after release is unrepresentable.
pub(crate) struct OwnedBlob {
    ptr: NonNull<Blob>,
}

impl OwnedBlob {
    /// Take ownership of a raw blob pointer. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a live blob with a valid vtable, and
    /// the caller must hold the blob's only reference; ownership transfers
    /// to the wrapper.
    pub unsafe fn from_raw(ptr: *mut Blob) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    fn vtbl(&self) -> &BlobVtbl {
        unsafe { &*(*self.ptr.as_ptr()).vtbl }
    }

    /// Current length of the blob's buffer in bytes.
    pub fn len(&self) -> usize {
        unsafe { (self.vtbl().get_buffer_size)(self.ptr.as_ptr()) }
    }

    /// Copy the blob's buffer into an owned vector.
    ///
    /// The buffer pointer is only guaranteed valid while the blob is
    /// alive, so the bytes are fully copied and never alias blob storage.
    /// A zero-length buffer yields an empty vector without touching the
    /// pointer accessor.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.len();
        if len == 0 {
            return Vec::new();
        }
        let ptr = unsafe { (self.vtbl().get_buffer_pointer)(self.ptr.as_ptr()) };
        unsafe { std::slice::from_raw_parts(ptr as *const u8, len).to_vec() }
    }
}

impl Drop for OwnedBlob {
    fn drop(&mut self) {
        unsafe {
            (self.vtbl().release)(self.ptr.as_ptr());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double for a native blob: same leading layout as `Blob`, with
    /// payload and call counters behind it. The vtable functions cast the
    /// incoming `*mut Blob` back to `*mut FakeBlob`.
    #[repr(C)]
    pub(crate) struct FakeBlob {
        vtbl: *const BlobVtbl,
        data: Vec<u8>,
        releases: Arc<AtomicUsize>,
        pointer_reads: Arc<AtomicUsize>,
    }

    static FAKE_VTBL: BlobVtbl = BlobVtbl {
        query_interface: fake_query_interface,
        add_ref: fake_add_ref,
        release: fake_release,
        get_buffer_pointer: fake_get_buffer_pointer,
        get_buffer_size: fake_get_buffer_size,
    };

    unsafe extern "system" fn fake_query_interface(
        _me: *mut Blob,
        _iid: *const c_void,
        _out: *mut *mut c_void,
    ) -> i32 {
        -1
    }

    unsafe extern "system" fn fake_add_ref(_me: *mut Blob) -> u32 {
        2
    }

    unsafe extern "system" fn fake_release(me: *mut Blob) -> u32 {
        let me = unsafe { Box::from_raw(me as *mut FakeBlob) };
        me.releases.fetch_add(1, Ordering::SeqCst);
        0
    }

    unsafe extern "system" fn fake_get_buffer_pointer(me: *mut Blob) -> *mut c_void {
        let me = unsafe { &*(me as *const FakeBlob) };
        me.pointer_reads.fetch_add(1, Ordering::SeqCst);
        me.data.as_ptr() as *mut c_void
    }

    unsafe extern "system" fn fake_get_buffer_size(me: *mut Blob) -> usize {
        unsafe { (*(me as *const FakeBlob)).data.len() }
    }

    /// Allocate a fake blob holding `data`. Its `release` slot frees the
    /// allocation, matching the reference-counting contract.
    pub(crate) fn fake_blob(data: &[u8]) -> (*mut Blob, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let releases = Arc::new(AtomicUsize::new(0));
        let pointer_reads = Arc::new(AtomicUsize::new(0));
        let raw = Box::into_raw(Box::new(FakeBlob {
            vtbl: &FAKE_VTBL,
            data: data.to_vec(),
            releases: releases.clone(),
            pointer_reads: pointer_reads.clone(),
        }));
        (raw as *mut Blob, releases, pointer_reads)
    }

    #[test]
    fn test_extraction_round_trips() {
        let (raw, releases, _) = fake_blob(b"DXBC\x01\x02\x03");
        let blob = unsafe { OwnedBlob::from_raw(raw) }.unwrap();
        assert_eq!(blob.len(), 7);
        assert_eq!(blob.to_bytes(), b"DXBC\x01\x02\x03");
        drop(blob);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_length_reads_no_pointer() {
        let (raw, releases, pointer_reads) = fake_blob(b"");
        let blob = unsafe { OwnedBlob::from_raw(raw) }.unwrap();
        assert_eq!(blob.to_bytes(), Vec::<u8>::new());
        assert_eq!(pointer_reads.load(Ordering::SeqCst), 0);
        drop(blob);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_without_extraction() {
        let (raw, releases, pointer_reads) = fake_blob(b"unused");
        let blob = unsafe { OwnedBlob::from_raw(raw) }.unwrap();
        drop(blob);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(pointer_reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_null_is_not_a_blob() {
        assert!(unsafe { OwnedBlob::from_raw(std::ptr::null_mut()) }.is_none());
    }

    #[test]
    fn test_bytes_do_not_alias_blob_storage() {
        let (raw, _, _) = fake_blob(b"alias-check");
        let bytes = {
            let blob = unsafe { OwnedBlob::from_raw(raw) }.unwrap();
            blob.to_bytes()
        };
        // The blob is released; the copy must still be intact.
        assert_eq!(bytes, b"alias-check");
    }
}
