use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut, Range};
use core::ptr::{self, NonNull};
use core::slice;

use crate::error::{sub_range, GrowBufError};
use crate::growth;
use crate::iter::IntoIter;
use crate::raw::{Global, RawAlloc};
use crate::region;

/// A growable array of `T`.
///
/// Slots `[0, len)` hold live elements, slots `[len, capacity)` are
/// uninitialized. A zero-capacity array owns no storage.
///
/// Growth is fallible: operations that may allocate return `Result` and leave
/// the array untouched on error. Elements are never cloned or dropped while
/// the storage moves; they are relocated as a block.
pub struct TypedArray<T, A: RawAlloc = Global> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    alloc: A,
    _owns: PhantomData<T>,
}

// SAFETY: the array owns its elements like `Vec<T>` does.
unsafe impl<T: Send, A: RawAlloc + Send> Send for TypedArray<T, A> {}
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for TypedArray<T, A> {}

impl<T> TypedArray<T, Global> {
    /// Creates an empty array. Does not allocate.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an array of `len` default values.
    ///
    /// Returns an empty array if the storage cannot be allocated.
    #[must_use]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut array = Self::new();
        let _ = array.replace_with(len, |_| T::default());
        array
    }

    /// Creates an array of `len` default values.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed` if the storage cannot be allocated.
    pub fn try_with_len(len: usize) -> Result<Self, GrowBufError>
    where
        T: Default,
    {
        let mut array = Self::new();
        array.replace_with(len, |_| T::default())?;
        Ok(array)
    }

    /// Creates an array of `len` clones of `value`.
    ///
    /// Returns an empty array if the storage cannot be allocated.
    #[must_use]
    pub fn from_elem(len: usize, value: &T) -> Self
    where
        T: Clone,
    {
        let mut array = Self::new();
        let _ = array.assign_elem(len, value);
        array
    }

    /// Creates an array of `len` clones of `value`.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed` if the storage cannot be allocated.
    pub fn try_from_elem(len: usize, value: &T) -> Result<Self, GrowBufError>
    where
        T: Clone,
    {
        let mut array = Self::new();
        array.assign_elem(len, value)?;
        Ok(array)
    }

    /// Creates an array of clones of `items`.
    ///
    /// Returns an empty array if the storage cannot be allocated.
    #[must_use]
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from_slice_in(items, Global)
    }

    /// Creates an array of clones of `items`.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed` if the storage cannot be allocated.
    pub fn try_from_slice(items: &[T]) -> Result<Self, GrowBufError>
    where
        T: Clone,
    {
        Self::try_from_slice_in(items, Global)
    }

    /// Creates an array of clones of the elements in `[begin, end)`.
    ///
    /// Returns an empty array if `begin >= end` or `T` is zero-sized.
    ///
    /// # Safety
    ///
    /// If `begin < end`, both pointers must be derived from the same object and
    /// the range must hold initialized elements.
    #[must_use]
    pub unsafe fn from_raw_range(begin: *const T, end: *const T) -> Self
    where
        T: Clone,
    {
        if begin >= end || mem::size_of::<T>() == 0 {
            return Self::new();
        }
        // SAFETY: see function doc.
        let items = unsafe { slice::from_raw_parts(begin, end.offset_from(begin).unsigned_abs()) };
        Self::from_slice(items)
    }
}

impl<T, A: RawAlloc> TypedArray<T, A> {
    /// Creates an empty array that will allocate from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            alloc,
            _owns: PhantomData,
        }
    }

    /// Creates an array of clones of `items`, allocating from `alloc`.
    ///
    /// Returns an empty array if the storage cannot be allocated.
    pub fn from_slice_in(items: &[T], alloc: A) -> Self
    where
        T: Clone,
    {
        let mut array = Self::new_in(alloc);
        let _ = array.assign_slice(items);
        array
    }

    /// Creates an array of clones of `items`, allocating from `alloc`.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed` if the storage cannot be allocated.
    pub fn try_from_slice_in(items: &[T], alloc: A) -> Result<Self, GrowBufError>
    where
        T: Clone,
    {
        let mut array = Self::new_in(alloc);
        array.assign_slice(items)?;
        Ok(array)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of element slots allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Largest capacity that passes the size checks.
    #[must_use]
    pub fn max_size(&self) -> usize {
        region::max_units::<T>(0)
    }

    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Pointer to the storage, `None` while nothing is allocated.
    #[must_use]
    pub fn data_ptr(&self) -> Option<NonNull<T>> {
        (self.cap != 0).then_some(self.ptr)
    }

    /// The `[begin, end)` pointer pair of the live elements. Equal when empty.
    #[must_use]
    pub fn as_ptr_range(&self) -> Range<*const T> {
        self.as_slice().as_ptr_range()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is live; `ptr` is non-null and aligned.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and the elements are owned.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Appends `value`. Storage doubles when full (0, 1, 2, 4, 8, ...).
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the array is unchanged and
    /// `value` is dropped.
    pub fn push(&mut self, value: T) -> Result<(), GrowBufError> {
        let target = growth::amortized(self.cap, self.len, 1)?;
        if target > self.cap {
            self.relocate(target)?;
        }
        // SAFETY: `len < cap`, the slot is uninitialized.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element. Capacity is kept.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is now outside `[0, len)`.
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Drops the elements past `len`. Capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        // SAFETY: `[len, self.len)` is live; shorten first so a panicking drop
        // cannot drop twice.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().add(len), self.len - len);
            self.len = len;
            ptr::drop_in_place(tail);
        }
    }

    /// Appends clones of `items`, growing the storage to exactly the needed size.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the array is unchanged.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<(), GrowBufError>
    where
        T: Clone,
    {
        if items.is_empty() {
            return Ok(());
        }
        let total = growth::exact(self.len, items.len())?;
        if total > self.cap {
            self.relocate(total)?;
        }
        for item in items {
            // SAFETY: `len < total <= cap`; `len` tracks each write.
            unsafe { self.ptr.as_ptr().add(self.len).write(item.clone()) };
            self.len += 1;
        }
        Ok(())
    }

    /// Moves all elements of `other` to the end of `self`, leaving `other`
    /// empty with its capacity kept.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; both arrays are unchanged.
    pub fn append<B: RawAlloc>(&mut self, other: &mut TypedArray<T, B>) -> Result<(), GrowBufError> {
        if other.is_empty() {
            return Ok(());
        }
        let total = growth::exact(self.len, other.len)?;
        if total > self.cap {
            self.relocate(total)?;
        }
        // SAFETY: the regions are distinct; ownership moves bitwise and
        // `other` forgets the moved elements.
        unsafe {
            ptr::copy_nonoverlapping(other.ptr.as_ptr(), self.ptr.as_ptr().add(self.len), other.len);
        }
        self.len = total;
        other.len = 0;
        Ok(())
    }

    /// Replaces the content with clones of `items`.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the array is unchanged.
    pub fn assign_slice(&mut self, items: &[T]) -> Result<(), GrowBufError>
    where
        T: Clone,
    {
        self.replace_with(items.len(), |i| items[i].clone())
    }

    /// Replaces the content with `len` clones of `value`.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the array is unchanged.
    pub fn assign_elem(&mut self, len: usize, value: &T) -> Result<(), GrowBufError>
    where
        T: Clone,
    {
        self.replace_with(len, |_| value.clone())
    }

    /// Replaces the content with clones of `len` elements of `other` starting
    /// at `pos`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the window is not inside `other`, otherwise see
    /// [`TypedArray::assign_slice`].
    pub fn assign_sub<B: RawAlloc>(
        &mut self,
        other: &TypedArray<T, B>,
        pos: usize,
        len: usize,
    ) -> Result<(), GrowBufError>
    where
        T: Clone,
    {
        let range = sub_range(other.len(), pos, len)?;
        self.assign_slice(&other.as_slice()[range])
    }

    /// Drops every element and releases the storage.
    pub fn clear(&mut self) {
        self.truncate(0);
        self.release();
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    /// Exchanges contents, capacities and allocators. Never allocates.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Adjusts the capacity.
    ///
    /// - `0` shrinks to fit: an empty array releases its storage, otherwise
    ///   the capacity becomes `len()`.
    /// - `capacity > len()` sets the capacity to exactly `capacity`.
    /// - Anything else is a no-op.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the array is unchanged.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), GrowBufError> {
        if capacity == 0 {
            if self.cap == 0 {
                return Ok(());
            }
            if self.len == 0 {
                self.clear();
                return Ok(());
            }
            return self.relocate(self.len);
        }
        if capacity > self.len {
            return self.relocate(capacity);
        }
        Ok(())
    }

    /// Same as `reserve(0)`.
    ///
    /// # Errors
    ///
    /// See [`TypedArray::reserve`].
    pub fn shrink_to_fit(&mut self) -> Result<(), GrowBufError> {
        self.reserve(0)
    }

    /// Orders by length first, then element by element.
    #[must_use]
    pub fn compare<B: RawAlloc>(&self, other: &TypedArray<T, B>) -> Ordering
    where
        T: Ord,
    {
        if ptr::addr_eq(self, other) {
            return Ordering::Equal;
        }
        self.len
            .cmp(&other.len)
            .then_with(|| self.as_slice().cmp(other.as_slice()))
    }

    /// Moves the live elements into a fresh region of exactly `capacity`
    /// slots. The only path by which elements change address.
    fn relocate(&mut self, capacity: usize) -> Result<(), GrowBufError> {
        debug_assert!(capacity >= self.len, "cannot drop live elements");
        if capacity == self.cap {
            return Ok(());
        }
        let fresh = region::allocate::<T, A>(&self.alloc, capacity, 0)?;
        // SAFETY: the fresh region has room for `len` elements; the old slots
        // become logically uninitialized and are released without dropping.
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), fresh.as_ptr(), self.len) };
        self.release();
        self.ptr = fresh;
        self.cap = capacity;
        Ok(())
    }

    /// Builds `len` elements with `make` in a fresh region, then drops the
    /// old content. On error nothing is touched.
    fn replace_with(
        &mut self,
        len: usize,
        mut make: impl FnMut(usize) -> T,
    ) -> Result<(), GrowBufError> {
        if len == 0 {
            self.clear();
            return Ok(());
        }
        let fresh = region::allocate::<T, A>(&self.alloc, len, 0)?;
        for i in 0..len {
            // SAFETY: `i < len`, the fresh region is exclusively ours. A panic
            // in `make` leaks the fresh region without touching `self`.
            unsafe { fresh.as_ptr().add(i).write(make(i)) };
        }
        self.clear();
        self.ptr = fresh;
        self.len = len;
        self.cap = len;
        Ok(())
    }

    /// Frees the storage without dropping elements.
    fn release(&mut self) {
        if self.cap != 0 {
            // SAFETY: the region came from `region::allocate` with `cap` slots.
            unsafe { region::release::<T, A>(&self.alloc, self.ptr, self.cap, 0) };
        }
    }

    /// Hands storage and elements over without dropping them.
    pub(crate) fn into_raw_parts(self) -> (NonNull<T>, usize, usize, A) {
        let me = ManuallyDrop::new(self);
        // SAFETY: `me` is never dropped, so the allocator is moved out once.
        let alloc = unsafe { ptr::read(&me.alloc) };
        (me.ptr, me.len, me.cap, alloc)
    }

    /// Frees storage previously handed out by [`TypedArray::into_raw_parts`].
    ///
    /// # Safety
    ///
    /// `ptr` and `cap` must come from `into_raw_parts` with the same allocator,
    /// and the elements must have been moved out or dropped.
    pub(crate) unsafe fn release_raw(alloc: &A, ptr: NonNull<T>, cap: usize) {
        if cap != 0 {
            // SAFETY: see function doc.
            unsafe { region::release::<T, A>(alloc, ptr, cap, 0) };
        }
    }
}

impl<T: Clone, A: RawAlloc + Clone> TypedArray<T, A> {
    /// Creates an array of clones of `len` elements of `other` starting at
    /// `pos`.
    ///
    /// Returns an empty array if the window is not inside `other` or the
    /// storage cannot be allocated.
    #[must_use]
    pub fn from_sub(other: &Self, pos: usize, len: usize) -> Self {
        let mut array = Self::new_in(other.alloc.clone());
        let _ = array.assign_sub(other, pos, len);
        array
    }

    /// Deep copy.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed` if the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, GrowBufError> {
        Self::try_from_slice_in(self.as_slice(), self.alloc.clone())
    }
}

impl<T, A: RawAlloc> Drop for TypedArray<T, A> {
    fn drop(&mut self) {
        self.truncate(0);
        self.release();
    }
}

impl<T: Clone, A: RawAlloc + Clone> Clone for TypedArray<T, A> {
    /// Deep copy; an empty array if the copy cannot be allocated.
    fn clone(&self) -> Self {
        Self::from_slice_in(self.as_slice(), self.alloc.clone())
    }
}

impl<T, A: RawAlloc + Default> Default for TypedArray<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A: RawAlloc> Deref for TypedArray<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: RawAlloc> DerefMut for TypedArray<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: RawAlloc> AsRef<[T]> for TypedArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Clone> From<&[T]> for TypedArray<T> {
    fn from(items: &[T]) -> Self {
        Self::from_slice(items)
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a TypedArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a mut TypedArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, A: RawAlloc> IntoIterator for TypedArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<T, U, A: RawAlloc, B: RawAlloc> PartialEq<TypedArray<U, B>> for TypedArray<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &TypedArray<U, B>) -> bool {
        if ptr::addr_eq(self, other) {
            return true;
        }
        self.len == other.len && self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: RawAlloc> Eq for TypedArray<T, A> {}

impl<T, U, A: RawAlloc> PartialEq<[U]> for TypedArray<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A: RawAlloc> PartialEq<&[U]> for TypedArray<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, A: RawAlloc, const N: usize> PartialEq<[U; N]> for TypedArray<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

/// Length first, then element by element.
impl<T: PartialOrd, A: RawAlloc> PartialOrd for TypedArray<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.len.cmp(&other.len) {
            Ordering::Equal => self.as_slice().partial_cmp(other.as_slice()),
            unequal => Some(unequal),
        }
    }
}

impl<T: Ord, A: RawAlloc> Ord for TypedArray<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl<T: Hash, A: RawAlloc> Hash for TypedArray<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for TypedArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
