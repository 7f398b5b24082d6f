use thiserror::Error;

/// Error types for `ByteBuffer` and `TypedArray` operations
///
/// A returned error always means the receiver was left exactly as it was
/// before the call: same length, same capacity, same content.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum GrowBufError {
    /// A size computation would exceed the representable range
    #[error("Overflow rejected: {requested} units plus {overhead} overhead is not representable")]
    OverflowRejected {
        /// Number of logical units requested
        requested: usize,
        /// Fixed overhead added to the request (the terminator byte)
        overhead: usize,
    },
    /// The allocator returned no memory
    #[error("Allocation failed: {bytes} bytes with alignment {align}")]
    AllocationFailed {
        /// Size of the refused allocation in bytes
        bytes: usize,
        /// Alignment of the refused allocation
        align: usize,
    },
    /// Position and length reference content outside `[0, length)`
    #[error("Out of range: position {pos} with length {len} for content of length {length}")]
    OutOfRange {
        /// Requested start position
        pos: usize,
        /// Requested number of units
        len: usize,
        /// Length of the source content
        length: usize,
    },
}

/// Validates a `(pos, len)` window over content of `length` units.
///
/// The window must start inside the content (`pos < length`) and must not run
/// past its end.
///
/// # Errors
///
/// `OutOfRange` if the window is not inside the content.
pub(crate) fn sub_range(
    length: usize,
    pos: usize,
    len: usize,
) -> Result<core::ops::Range<usize>, GrowBufError> {
    if pos < length && len <= length - pos {
        Ok(pos..pos + len)
    } else {
        Err(GrowBufError::OutOfRange { pos, len, length })
    }
}
