use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use core::slice;

use crate::raw::RawAlloc;
use crate::typed_array::TypedArray;

/// Owning iterator over the elements of a `TypedArray`.
///
/// Elements not yet yielded are dropped with the iterator, then the storage
/// is released.
pub struct IntoIter<T, A: RawAlloc> {
    ptr: NonNull<T>,
    cap: usize,
    start: usize,
    end: usize,
    alloc: A,
    _owns: PhantomData<T>,
}

impl<T, A: RawAlloc> IntoIter<T, A> {
    pub(crate) fn new(array: TypedArray<T, A>) -> Self {
        let (ptr, len, cap, alloc) = array.into_raw_parts();
        Self {
            ptr,
            cap,
            start: 0,
            end: len,
            alloc,
            _owns: PhantomData,
        }
    }

    /// The elements not yet yielded.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` is live.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr().add(self.start), self.end - self.start) }
    }
}

impl<T, A: RawAlloc> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: the slot is live and leaves `[start, end)` right away.
        let item = unsafe { self.ptr.as_ptr().add(self.start).read() };
        self.start += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T, A: RawAlloc> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the slot was live and is now outside `[start, end)`.
        Some(unsafe { self.ptr.as_ptr().add(self.end).read() })
    }
}

impl<T, A: RawAlloc> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: RawAlloc> FusedIterator for IntoIter<T, A> {}

impl<T, A: RawAlloc> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        // SAFETY: `[start, end)` is live; mark it consumed before dropping.
        unsafe {
            let rest = ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr().add(self.start),
                self.end - self.start,
            );
            self.start = self.end;
            ptr::drop_in_place(rest);
            TypedArray::<T, A>::release_raw(&self.alloc, self.ptr, self.cap);
        }
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

// SAFETY: same ownership as `TypedArray`.
unsafe impl<T: Send, A: RawAlloc + Send> Send for IntoIter<T, A> {}
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for IntoIter<T, A> {}
