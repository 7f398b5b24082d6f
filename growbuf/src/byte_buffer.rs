use core::cmp::Ordering;
use core::ffi::CStr;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Deref, DerefMut, Range};
use core::ptr::{self, NonNull};
use core::slice;

use crate::error::{sub_range, GrowBufError};
use crate::growth;
use crate::raw::{Global, RawAlloc};
use crate::region;

/// Every empty `ByteBuffer` points here. Never written, never freed.
static EMPTY: [u8; 1] = [0];

/// Bytes allocated past the capacity for the NUL terminator.
const TERMINATOR: usize = 1;

fn shared_empty() -> NonNull<u8> {
    NonNull::from(&EMPTY).cast()
}

/// Source of the bytes written into a fresh region.
#[derive(Clone, Copy)]
enum Fill<'s> {
    Copy(&'s [u8]),
    Repeat(u8, usize),
}

impl Fill<'_> {
    fn len(self) -> usize {
        match self {
            Fill::Copy(bytes) => bytes.len(),
            Fill::Repeat(_, count) => count,
        }
    }

    /// # Safety
    ///
    /// `dst` is valid for `self.len()` writes and does not overlap the source.
    unsafe fn write_to(self, dst: *mut u8) {
        match self {
            Fill::Copy(bytes) => unsafe {
                ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
            },
            Fill::Repeat(byte, count) => unsafe { dst.write_bytes(byte, count) },
        }
    }
}

/// A growable, NUL-terminated byte string.
///
/// Storage is `capacity + 1` bytes so the byte at `len()` is always `0`.
/// An empty buffer that never reserved memory points at a shared static
/// terminator instead of allocating.
///
/// Fallible operations return `Result` and leave the buffer untouched on
/// error.
pub struct ByteBuffer<A: RawAlloc = Global> {
    ptr: NonNull<u8>,
    len: usize,
    cap: usize,
    alloc: A,
}

// SAFETY: the buffer owns its heap region; the shared empty region is immutable.
unsafe impl<A: RawAlloc + Send> Send for ByteBuffer<A> {}
unsafe impl<A: RawAlloc + Sync> Sync for ByteBuffer<A> {}

impl ByteBuffer<Global> {
    /// Creates an empty buffer. Does not allocate.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a buffer holding a copy of `bytes`.
    ///
    /// Returns an empty buffer if the copy cannot be allocated.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_bytes_in(bytes, Global)
    }

    /// Creates a buffer holding a copy of `bytes`.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed` if the copy cannot be allocated.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, GrowBufError> {
        Self::try_from_bytes_in(bytes, Global)
    }

    /// Creates a buffer holding the bytes of `cstr` before its terminator.
    #[must_use]
    pub fn from_cstr(cstr: &CStr) -> Self {
        Self::from_bytes(cstr.to_bytes())
    }

    /// Creates a buffer of `count` copies of `byte`.
    ///
    /// Returns an empty buffer if the storage cannot be allocated.
    #[must_use]
    pub fn from_repeat(count: usize, byte: u8) -> Self {
        let mut buf = Self::new();
        let _ = buf.assign_repeat(count, byte);
        buf
    }

    /// Creates a buffer of `count` copies of `byte`.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed` if the storage cannot be allocated.
    pub fn try_from_repeat(count: usize, byte: u8) -> Result<Self, GrowBufError> {
        let mut buf = Self::new();
        buf.assign_repeat(count, byte)?;
        Ok(buf)
    }

    /// Creates a buffer from the half-open byte range `[begin, end)`.
    ///
    /// Returns an empty buffer if `begin >= end`.
    ///
    /// # Safety
    ///
    /// If `begin < end`, both pointers must be derived from the same object and
    /// the range must be valid for reads.
    #[must_use]
    pub unsafe fn from_raw_range(begin: *const u8, end: *const u8) -> Self {
        if begin >= end {
            return Self::new();
        }
        // SAFETY: see function doc.
        let bytes = unsafe { slice::from_raw_parts(begin, end.offset_from(begin).unsigned_abs()) };
        Self::from_bytes(bytes)
    }
}

impl<A: RawAlloc> ByteBuffer<A> {
    /// Creates an empty buffer that will allocate from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self {
            ptr: shared_empty(),
            len: 0,
            cap: 0,
            alloc,
        }
    }

    /// Creates a buffer holding a copy of `bytes`, allocating from `alloc`.
    ///
    /// Returns an empty buffer if the copy cannot be allocated.
    pub fn from_bytes_in(bytes: &[u8], alloc: A) -> Self {
        let mut buf = Self::new_in(alloc);
        let _ = buf.assign(bytes);
        buf
    }

    /// Creates a buffer holding a copy of `bytes`, allocating from `alloc`.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed` if the copy cannot be allocated.
    pub fn try_from_bytes_in(bytes: &[u8], alloc: A) -> Result<Self, GrowBufError> {
        let mut buf = Self::new_in(alloc);
        buf.assign(bytes)?;
        Ok(buf)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes that fit without reallocating, excluding the terminator.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Largest capacity that passes the size checks.
    #[must_use]
    pub fn max_size(&self) -> usize {
        region::max_units::<u8>(TERMINATOR)
    }

    /// Whether the buffer points at the shared static empty string.
    #[must_use]
    pub fn is_shared_empty(&self) -> bool {
        ptr::eq(self.ptr.as_ptr(), EMPTY.as_ptr())
    }

    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Pointer to the first byte. Never null; the content is NUL-terminated.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// The `[begin, end)` pointer pair of the content. Equal when empty.
    #[must_use]
    pub fn as_ptr_range(&self) -> Range<*const u8> {
        self.as_bytes().as_ptr_range()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len + 1` initialized bytes.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        if self.cap == 0 {
            return &mut [];
        }
        // SAFETY: the heap region is owned and holds `len` initialized bytes.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// The content followed by its terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        // SAFETY: `ptr[len]` is the terminator.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len + TERMINATOR) }
    }

    /// The content up to the first NUL byte, as a C string.
    #[must_use]
    pub fn as_cstr(&self) -> &CStr {
        // SAFETY: the region is NUL-terminated at `len` and lives as long as `self`.
        unsafe { CStr::from_ptr(self.ptr.as_ptr().cast()) }
    }

    #[must_use]
    pub fn front(&self) -> Option<u8> {
        self.as_bytes().first().copied()
    }

    #[must_use]
    pub fn back(&self) -> Option<u8> {
        self.as_bytes().last().copied()
    }

    /// Appends a copy of `bytes`, growing the storage to exactly the needed size.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the buffer is unchanged.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), GrowBufError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let total = growth::exact(self.len, bytes.len())?;
        if total > self.cap {
            self.grow_to(total)?;
        }
        // SAFETY: the region has room for `total + 1` bytes and `bytes` is not
        // part of it (the borrow checker forbids aliasing `self`).
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.as_ptr().add(self.len), bytes.len());
        }
        self.set_len(total);
        Ok(())
    }

    /// Appends the content of another buffer.
    ///
    /// # Errors
    ///
    /// See [`ByteBuffer::append`].
    pub fn append_buf<B: RawAlloc>(&mut self, other: &ByteBuffer<B>) -> Result<(), GrowBufError> {
        self.append(other.as_bytes())
    }

    /// Appends the bytes of `cstr` before its terminator.
    ///
    /// # Errors
    ///
    /// See [`ByteBuffer::append`].
    pub fn append_cstr(&mut self, cstr: &CStr) -> Result<(), GrowBufError> {
        self.append(cstr.to_bytes())
    }

    /// Appends `len` bytes of `bytes` starting at `pos`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the window is not inside `bytes`, otherwise see
    /// [`ByteBuffer::append`].
    pub fn append_sub(&mut self, bytes: &[u8], pos: usize, len: usize) -> Result<(), GrowBufError> {
        let range = sub_range(bytes.len(), pos, len)?;
        self.append(&bytes[range])
    }

    /// Appends one byte, growing the storage to exactly the needed size.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the buffer is unchanged.
    pub fn push(&mut self, byte: u8) -> Result<(), GrowBufError> {
        let target = growth::exact(self.len, 1)?;
        if target > self.cap {
            self.grow_to(target)?;
        }
        // SAFETY: `len < cap`, the slot and the one after it are in the region.
        unsafe { self.ptr.as_ptr().add(self.len).write(byte) };
        self.set_len(self.len + 1);
        Ok(())
    }

    /// Removes and returns the last byte. Capacity is kept.
    pub fn pop(&mut self) -> Option<u8> {
        let last = self.back()?;
        self.set_len(self.len - 1);
        Some(last)
    }

    /// Shortens the content to `len` bytes. Capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.set_len(len);
        }
    }

    /// Replaces the content with a copy of `bytes`.
    ///
    /// The new storage is sized exactly; the old storage is released only
    /// after the new one is filled.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the buffer is unchanged.
    pub fn assign(&mut self, bytes: &[u8]) -> Result<(), GrowBufError> {
        self.replace_with(Fill::Copy(bytes))
    }

    /// Replaces the content with a copy of another buffer's content.
    ///
    /// # Errors
    ///
    /// See [`ByteBuffer::assign`].
    pub fn assign_buf<B: RawAlloc>(&mut self, other: &ByteBuffer<B>) -> Result<(), GrowBufError> {
        self.assign(other.as_bytes())
    }

    /// Replaces the content with `len` bytes of `other` starting at `pos`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the window is not inside `other`, otherwise see
    /// [`ByteBuffer::assign`].
    pub fn assign_sub<B: RawAlloc>(
        &mut self,
        other: &ByteBuffer<B>,
        pos: usize,
        len: usize,
    ) -> Result<(), GrowBufError> {
        let range = sub_range(other.len(), pos, len)?;
        self.assign(&other.as_bytes()[range])
    }

    /// Replaces the content with `count` copies of `byte`.
    ///
    /// # Errors
    ///
    /// See [`ByteBuffer::assign`].
    pub fn assign_repeat(&mut self, count: usize, byte: u8) -> Result<(), GrowBufError> {
        self.replace_with(Fill::Repeat(byte, count))
    }

    /// Replaces the content with the single byte `byte`.
    ///
    /// # Errors
    ///
    /// See [`ByteBuffer::assign`].
    pub fn assign_byte(&mut self, byte: u8) -> Result<(), GrowBufError> {
        self.assign_repeat(1, byte)
    }

    /// Releases the storage and returns to the shared empty string.
    pub fn clear(&mut self) {
        self.release();
        self.ptr = shared_empty();
        self.len = 0;
        self.cap = 0;
    }

    /// Exchanges contents, capacities and allocators. Never allocates.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Adjusts the capacity.
    ///
    /// - `0` shrinks to fit: an empty buffer goes back to the shared empty
    ///   string, otherwise the capacity becomes `len()`.
    /// - `capacity > len()` sets the capacity to exactly `capacity`.
    /// - Anything else is a no-op.
    ///
    /// # Errors
    ///
    /// `OverflowRejected` or `AllocationFailed`; the buffer is unchanged.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), GrowBufError> {
        if capacity == 0 {
            if self.cap == 0 {
                return Ok(());
            }
            if self.len == 0 {
                self.clear();
                return Ok(());
            }
            return self.grow_to(self.len);
        }
        if capacity > self.len {
            return self.grow_to(capacity);
        }
        Ok(())
    }

    /// Same as `reserve(0)`.
    ///
    /// # Errors
    ///
    /// See [`ByteBuffer::reserve`].
    pub fn shrink_to_fit(&mut self) -> Result<(), GrowBufError> {
        self.reserve(0)
    }

    /// Orders by length first, then byte by byte.
    #[must_use]
    pub fn compare<B: RawAlloc>(&self, other: &ByteBuffer<B>) -> Ordering {
        if ptr::eq(self.as_ptr(), other.as_ptr()) && self.len == other.len {
            return Ordering::Equal;
        }
        self.len
            .cmp(&other.len)
            .then_with(|| self.as_bytes().cmp(other.as_bytes()))
    }

    /// Compares like `strcmp`: the scan stops at the first NUL of either side.
    #[must_use]
    pub fn compare_cstr(&self, other: &CStr) -> Ordering {
        self.as_cstr().to_bytes().cmp(other.to_bytes())
    }

    /// Moves the content into a fresh region of exactly `capacity` bytes.
    fn grow_to(&mut self, capacity: usize) -> Result<(), GrowBufError> {
        debug_assert!(capacity >= self.len, "cannot drop live content");
        if capacity == self.cap {
            return Ok(());
        }
        if capacity == 0 {
            self.clear();
            return Ok(());
        }
        let fresh = region::allocate::<u8, A>(&self.alloc, capacity, TERMINATOR)?;
        // SAFETY: the fresh region holds `capacity + 1 > len` bytes; the old
        // one holds `len + 1` initialized bytes including the terminator.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), fresh.as_ptr(), self.len + TERMINATOR);
        }
        self.release();
        self.ptr = fresh;
        self.cap = capacity;
        Ok(())
    }

    fn replace_with(&mut self, fill: Fill<'_>) -> Result<(), GrowBufError> {
        let len = fill.len();
        if len == 0 {
            self.clear();
            return Ok(());
        }
        let fresh = region::allocate::<u8, A>(&self.alloc, len, TERMINATOR)?;
        // SAFETY: the fresh region holds `len + 1` bytes and is not shared.
        unsafe {
            fill.write_to(fresh.as_ptr());
            fresh.as_ptr().add(len).write(0);
        }
        self.release();
        self.ptr = fresh;
        self.len = len;
        self.cap = len;
        Ok(())
    }

    /// Sets the length and re-terminates.
    fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.cap);
        self.len = len;
        if self.cap != 0 {
            // SAFETY: `len <= cap`, the region holds `cap + 1` bytes.
            unsafe { self.ptr.as_ptr().add(len).write(0) };
        }
    }

    /// Frees the heap region, if any. Leaves `ptr` dangling.
    fn release(&mut self) {
        if !self.is_shared_empty() {
            // SAFETY: a non-shared region was obtained from `region::allocate`
            // with `cap` and the terminator overhead.
            unsafe { region::release::<u8, A>(&self.alloc, self.ptr, self.cap, TERMINATOR) };
        }
    }
}

impl<A: RawAlloc + Clone> ByteBuffer<A> {
    /// Creates a buffer from `len` bytes of `other` starting at `pos`.
    ///
    /// Returns an empty buffer if the window is not inside `other` or the
    /// copy cannot be allocated.
    #[must_use]
    pub fn from_sub(other: &Self, pos: usize, len: usize) -> Self {
        let mut buf = Self::new_in(other.alloc.clone());
        let _ = buf.assign_sub(other, pos, len);
        buf
    }

    /// Creates a buffer from the bytes of `other` starting at `pos`.
    ///
    /// Returns an empty buffer if `pos >= other.len()`.
    #[must_use]
    pub fn from_tail(other: &Self, pos: usize) -> Self {
        Self::from_sub(other, pos, other.len.saturating_sub(pos))
    }

    /// Deep copy.
    ///
    /// # Errors
    ///
    /// `AllocationFailed` if the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, GrowBufError> {
        Self::try_from_bytes_in(self.as_bytes(), self.alloc.clone())
    }
}

impl<A: RawAlloc> Drop for ByteBuffer<A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<A: RawAlloc + Clone> Clone for ByteBuffer<A> {
    /// Deep copy; an empty buffer if the copy cannot be allocated.
    fn clone(&self) -> Self {
        Self::from_bytes_in(self.as_bytes(), self.alloc.clone())
    }
}

impl<A: RawAlloc + Default> Default for ByteBuffer<A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<A: RawAlloc> Deref for ByteBuffer<A> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<A: RawAlloc> DerefMut for ByteBuffer<A> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_bytes_mut()
    }
}

impl<A: RawAlloc> AsRef<[u8]> for ByteBuffer<A> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&str> for ByteBuffer {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl From<&CStr> for ByteBuffer {
    fn from(cstr: &CStr) -> Self {
        Self::from_cstr(cstr)
    }
}

/// Compares every byte, embedded NULs included, consistently with `Ord`
/// and `Hash`. For C string semantics, use [`ByteBuffer::compare_cstr`].
impl<A: RawAlloc, B: RawAlloc> PartialEq<ByteBuffer<B>> for ByteBuffer<A> {
    fn eq(&self, other: &ByteBuffer<B>) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl<A: RawAlloc> Eq for ByteBuffer<A> {}

impl<A: RawAlloc> PartialOrd for ByteBuffer<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: RawAlloc> Ord for ByteBuffer<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl<A: RawAlloc> PartialEq<[u8]> for ByteBuffer<A> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl<A: RawAlloc> PartialEq<&[u8]> for ByteBuffer<A> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<A: RawAlloc, const N: usize> PartialEq<[u8; N]> for ByteBuffer<A> {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.as_bytes() == other
    }
}

impl<A: RawAlloc, const N: usize> PartialEq<&[u8; N]> for ByteBuffer<A> {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == *other
    }
}

impl<A: RawAlloc> PartialEq<str> for ByteBuffer<A> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<A: RawAlloc> PartialEq<&str> for ByteBuffer<A> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Terminator-scan equality, see [`ByteBuffer::compare_cstr`].
impl<A: RawAlloc> PartialEq<CStr> for ByteBuffer<A> {
    fn eq(&self, other: &CStr) -> bool {
        self.compare_cstr(other) == Ordering::Equal
    }
}

impl<A: RawAlloc> PartialEq<&CStr> for ByteBuffer<A> {
    fn eq(&self, other: &&CStr) -> bool {
        self.compare_cstr(other) == Ordering::Equal
    }
}

impl<A: RawAlloc> Hash for ByteBuffer<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl<A: RawAlloc> fmt::Debug for ByteBuffer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"{}\"", self.as_bytes().escape_ascii())
    }
}

#[cfg(feature = "display")]
impl<A: RawAlloc> fmt::Display for ByteBuffer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;

        for chunk in self.as_bytes().utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}

impl<A: RawAlloc> fmt::Write for ByteBuffer<A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

#[cfg(feature = "std")]
impl<A: RawAlloc> std::io::Write for ByteBuffer<A> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.append(buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::OutOfMemory, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
