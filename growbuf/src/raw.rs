//! Raw allocation primitives.
//!
//! Containers never call the global allocator directly; they go through
//! [`RawAlloc`] so that constrained targets (and tests) can plug in their own
//! memory source and observe allocation failures.

use alloc::alloc::{alloc, dealloc, Layout};
use core::ptr::NonNull;

/// A source of raw memory regions.
///
/// # Safety
///
/// Implementations must return either `None` or a pointer to a fresh region
/// that is valid for reads and writes of `layout.size()` bytes, aligned to
/// `layout.align()`, and not handed out again until it is passed back to
/// [`RawAlloc::deallocate`].
///
/// Callers never request zero-sized layouts.
pub unsafe trait RawAlloc {
    /// Returns a fresh region for `layout`, or `None` when memory is exhausted.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Returns a region to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with the same `layout`,
    /// and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide heap, via `alloc::alloc`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

unsafe impl RawAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0, "zero-sized layouts never reach the allocator");
        // SAFETY: the layout has a non-zero size.
        NonNull::new(unsafe { alloc(layout) })
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: see trait doc.
        unsafe { dealloc(ptr.as_ptr(), layout) }
    }
}

unsafe impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
