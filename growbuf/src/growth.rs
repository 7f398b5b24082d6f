//! Capacity targets for implicit growth.
//!
//! Byte appends size exactly; single-element array pushes double.

use crate::error::GrowBufError;

/// Multiplier applied to the capacity when a push runs out of room.
pub const GROWTH_FACTOR: usize = 2;

/// Length after appending `increment` units.
///
/// # Errors
///
/// `OverflowRejected` if the sum does not fit.
pub(crate) fn exact(length: usize, increment: usize) -> Result<usize, GrowBufError> {
    length
        .checked_add(increment)
        .ok_or(GrowBufError::OverflowRejected {
            requested: length,
            overhead: increment,
        })
}

/// Capacity to reserve so that `increment` more units fit after `length`.
///
/// Returns the current capacity when there is room already. Otherwise the
/// capacity is multiplied by [`GROWTH_FACTOR`] (at least 1), or set to exactly
/// the needed size if doubling overflows or falls short.
///
/// # Errors
///
/// `OverflowRejected` if the needed size does not fit.
pub(crate) fn amortized(
    capacity: usize,
    length: usize,
    increment: usize,
) -> Result<usize, GrowBufError> {
    let needed = exact(length, increment)?;
    if needed <= capacity {
        return Ok(capacity);
    }
    let doubled = capacity.checked_mul(GROWTH_FACTOR).unwrap_or(needed).max(1);
    Ok(doubled.max(needed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubling_sequence() {
        let mut capacity = 0;
        let mut seen = [0usize; 5];
        for (length, slot) in seen.iter_mut().enumerate() {
            capacity = amortized(capacity, length, 1).unwrap();
            *slot = capacity;
        }
        assert_eq!(seen, [1, 2, 4, 4, 8]);
    }

    #[test]
    fn test_room_left_keeps_capacity() {
        assert_eq!(amortized(10, 3, 1), Ok(10));
        assert_eq!(amortized(10, 9, 1), Ok(10));
    }

    #[test]
    fn test_large_increment_sizes_exactly() {
        assert_eq!(amortized(4, 4, 100), Ok(104));
    }

    #[test]
    fn test_doubling_overflow_falls_back_to_needed() {
        let capacity = usize::MAX / 2 + 1;
        assert_eq!(amortized(capacity, capacity, 1), Ok(capacity + 1));
    }

    #[test]
    fn test_length_overflow_is_rejected() {
        assert!(exact(usize::MAX, 1).is_err());
        assert!(amortized(usize::MAX, usize::MAX, 1).is_err());
    }
}
