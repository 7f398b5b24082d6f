//! Safe allocation: size arithmetic is checked before anything is requested
//! from the allocator, and a failed request never touches existing storage.

use core::alloc::Layout;
use core::mem;
use core::ptr::NonNull;

use crate::error::GrowBufError;
use crate::raw::RawAlloc;

/// Layout of a region holding `n` units of `T` followed by `overhead` units.
///
/// # Errors
///
/// `OverflowRejected` if `n + overhead` or the byte size does not fit.
pub(crate) fn layout_for<T>(n: usize, overhead: usize) -> Result<Layout, GrowBufError> {
    let rejected = GrowBufError::OverflowRejected {
        requested: n,
        overhead,
    };
    let units = n.checked_add(overhead).ok_or(rejected)?;
    Layout::array::<T>(units).map_err(|_| rejected)
}

/// Largest `n` for which [`layout_for`] succeeds.
pub(crate) const fn max_units<T>(overhead: usize) -> usize {
    let size = mem::size_of::<T>();
    if size == 0 {
        return usize::MAX - overhead;
    }
    // Layout::array caps the byte size at isize::MAX rounded down to alignment.
    let max_bytes = isize::MAX as usize - (mem::align_of::<T>() - 1);
    max_bytes / size - overhead
}

/// Allocates a fresh region for `n` units plus `overhead`.
///
/// The caller keeps its current region until this returns `Ok`, so a failure
/// leaves the caller untouched.
///
/// # Errors
///
/// - `OverflowRejected` when the size computation overflows
/// - `AllocationFailed` when the allocator is exhausted
pub(crate) fn allocate<T, A: RawAlloc>(
    alloc: &A,
    n: usize,
    overhead: usize,
) -> Result<NonNull<T>, GrowBufError> {
    debug_assert!(n > 0, "empty regions are represented without allocating");

    let layout = layout_for::<T>(n, overhead).inspect_err(|_| {
        tracing::debug!(requested = n, overhead, "allocation size rejected");
    })?;

    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }

    match alloc.allocate(layout) {
        Some(ptr) => Ok(ptr.cast()),
        None => {
            tracing::debug!(
                bytes = layout.size(),
                align = layout.align(),
                "allocator exhausted"
            );
            Err(GrowBufError::AllocationFailed {
                bytes: layout.size(),
                align: layout.align(),
            })
        }
    }
}

/// Returns a region obtained from [`allocate`] with the same `n` and `overhead`.
///
/// # Safety
///
/// `ptr` must come from `allocate::<T, A>(alloc, n, overhead)` and must not be
/// used afterwards.
pub(crate) unsafe fn release<T, A: RawAlloc>(
    alloc: &A,
    ptr: NonNull<T>,
    n: usize,
    overhead: usize,
) {
    // The layout was valid when the region was allocated.
    if let Ok(layout) = layout_for::<T>(n, overhead) {
        if layout.size() != 0 {
            // SAFETY: see function doc.
            unsafe { alloc.deallocate(ptr.cast(), layout) }
        }
    }
}
