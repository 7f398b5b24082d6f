#![no_std]

//! `growbuf`: a growable byte string and a growable typed array for
//! constrained environments.
//!
//! The crate needs only `core` and `alloc`. Allocation failures are ordinary
//! return values: every operation that may allocate returns
//! `Result<_, GrowBufError>`, and a failed operation leaves its receiver
//! exactly as it was (same length, capacity and content).
//!
//! # `ByteBuffer`
//!
//! A NUL-terminated byte string. The byte after the content is always `0`, so
//! the buffer can be handed out as a C string at any time. Empty buffers share
//! one static terminator and do not allocate.
//!
//! ```
//! # use growbuf::ByteBuffer;
//! let mut buf = ByteBuffer::new();
//! assert_eq!(buf.capacity(), 0);
//! assert!(buf.is_shared_empty());
//!
//! buf.append(b"hello").unwrap();
//! assert_eq!(buf.capacity(), 5); // appends size exactly
//! buf.append(b", world").unwrap();
//!
//! assert_eq!(buf, "hello, world");
//! assert_eq!(buf.as_cstr().to_bytes(), b"hello, world");
//!
//! buf.clear();
//! assert!(buf.is_shared_empty());
//! ```
//!
//! # `TypedArray`
//!
//! A vector of `T`. Single-element pushes double the capacity; explicit
//! `reserve` is exact; `reserve(0)` shrinks to fit.
//!
//! ```
//! # use growbuf::TypedArray;
//! let mut array = TypedArray::new();
//! let mut capacities = [0; 5];
//! for (i, slot) in capacities.iter_mut().enumerate() {
//!     array.push(i).unwrap();
//!     *slot = array.capacity();
//! }
//! assert_eq!(capacities, [1, 2, 4, 4, 8]);
//!
//! array.reserve(0).unwrap();
//! assert_eq!(array.capacity(), 5);
//! assert_eq!(array, [0, 1, 2, 3, 4]);
//! ```
//!
//! # Failure Model
//!
//! Size arithmetic is checked before the allocator is asked for anything, and
//! new storage is always obtained before old storage is released:
//!
//! ```
//! # use growbuf::{ByteBuffer, GrowBufError};
//! let mut buf = ByteBuffer::from_bytes(b"keep me");
//! let err = buf.reserve(usize::MAX).unwrap_err();
//! assert!(matches!(err, GrowBufError::OverflowRejected { .. }));
//! assert_eq!(buf, "keep me");
//! assert_eq!(buf.capacity(), 7);
//! ```
//!
//! Both containers take an allocator parameter implementing [`RawAlloc`]
//! (defaulting to [`Global`]) so that targets can supply their own memory.
//!
//! # Features
//!
//! - `std`: `std::io::Write` for `ByteBuffer`, `std::error::Error` plumbing.
//! - `display`: `Display` for `ByteBuffer` (lossy UTF-8).
//!
//! Allocation failures and rejected sizes are reported through `tracing` at
//! debug level.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod algorithm;
mod byte_buffer;
mod error;
mod growth;
mod iter;
mod raw;
mod region;
mod typed_array;

// Re-export public types and traits
pub use byte_buffer::ByteBuffer;
pub use error::GrowBufError;
pub use growth::GROWTH_FACTOR;
pub use iter::IntoIter;
pub use raw::{Global, RawAlloc};
pub use typed_array::TypedArray;
