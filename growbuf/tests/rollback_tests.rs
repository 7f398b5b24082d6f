mod common;

use common::BudgetAlloc;
use growbuf::{ByteBuffer, GrowBufError, TypedArray};

fn snapshot<A: growbuf::RawAlloc>(buf: &ByteBuffer<A>) -> (usize, usize, *const u8, Vec<u8>) {
    (buf.len(), buf.capacity(), buf.as_ptr(), buf.as_bytes_with_nul().to_vec())
}

#[test]
fn test_construction_on_exhausted_allocator_is_empty() {
    let alloc = BudgetAlloc::exhausted();

    let buf = ByteBuffer::from_bytes_in(b"wanted", &alloc);
    assert!(buf.is_shared_empty());
    assert_eq!(buf.capacity(), 0);

    assert!(matches!(
        ByteBuffer::try_from_bytes_in(b"wanted", &alloc),
        Err(GrowBufError::AllocationFailed { bytes: 7, align: 1 })
    ));

    let array = TypedArray::from_slice_in(&[1u64, 2, 3], &alloc);
    assert!(array.is_empty());
    assert!(array.data_ptr().is_none());
}

#[test]
fn test_byte_buffer_failed_growth_rolls_back() {
    let alloc = BudgetAlloc::new(1);
    let mut buf = ByteBuffer::from_bytes_in(b"abc", &alloc);
    let before = snapshot(&buf);

    assert!(matches!(
        buf.append(b"defgh"),
        Err(GrowBufError::AllocationFailed { .. })
    ));
    assert_eq!(snapshot(&buf), before);

    assert!(buf.push(b'd').is_err());
    assert_eq!(snapshot(&buf), before);

    assert!(buf.reserve(64).is_err());
    assert_eq!(snapshot(&buf), before);

    assert!(buf.assign(b"replacement").is_err());
    assert_eq!(snapshot(&buf), before);

    assert!(buf.assign_repeat(2, b'x').is_err());
    assert_eq!(snapshot(&buf), before);

    assert_eq!(alloc.live(), 1);
}

#[test]
fn test_byte_buffer_failed_shrink_rolls_back() {
    let alloc = BudgetAlloc::new(2);
    let mut buf = ByteBuffer::from_bytes_in(b"abc", &alloc);
    buf.reserve(40).unwrap();
    let before = snapshot(&buf);

    assert!(buf.reserve(0).is_err());
    assert_eq!(snapshot(&buf), before);
    assert_eq!(buf.capacity(), 40);
}

#[test]
fn test_byte_buffer_oversized_request_rolls_back() {
    let alloc = BudgetAlloc::with_max_bytes(usize::MAX, 16);
    let mut buf = ByteBuffer::new_in(&alloc);
    buf.append(b"fits").unwrap();
    let before = snapshot(&buf);

    // One byte more than the allocator will hand out, terminator included.
    assert_eq!(
        buf.reserve(16),
        Err(GrowBufError::AllocationFailed { bytes: 17, align: 1 })
    );
    assert_eq!(snapshot(&buf), before);

    let max = buf.max_size();
    assert!(buf.reserve(max).is_err());
    assert!(matches!(
        buf.reserve(max + 1),
        Err(GrowBufError::OverflowRejected { .. })
    ));
    assert_eq!(snapshot(&buf), before);
}

#[test]
fn test_byte_buffer_recovers_after_budget_refill() {
    let alloc = BudgetAlloc::new(1);
    let mut buf = ByteBuffer::from_bytes_in(b"one", &alloc);
    assert!(buf.append(b"two").is_err());

    alloc.set_budget(1);
    buf.append(b"two").unwrap();

    assert_eq!(buf, "onetwo");
    assert_eq!(alloc.live(), 1);
}

#[test]
fn test_typed_array_failed_growth_rolls_back() {
    let alloc = BudgetAlloc::new(1);
    let mut array = TypedArray::from_slice_in(&[1, 2, 3], &alloc);
    let region = array.data_ptr();

    assert!(array.push(4).is_err());
    assert!(array.extend_from_slice(&[4, 5]).is_err());
    assert!(array.reserve(10).is_err());
    assert!(array.assign_elem(5, &0).is_err());
    assert!(array.assign_slice(&[7]).is_err());

    assert_eq!(array, [1, 2, 3]);
    assert_eq!(array.capacity(), 3);
    assert_eq!(array.data_ptr(), region);
}

#[test]
fn test_typed_array_failed_shrink_rolls_back() {
    let alloc = BudgetAlloc::new(2);
    let mut array = TypedArray::from_slice_in(&[1, 2, 3], &alloc);
    array.reserve(10).unwrap();
    let region = array.data_ptr();

    assert!(matches!(
        array.reserve(0),
        Err(GrowBufError::AllocationFailed { .. })
    ));
    assert!(array.shrink_to_fit().is_err());

    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 10);
    assert_eq!(array.data_ptr(), region);
    assert_eq!(array, [1, 2, 3]);
    assert_eq!(alloc.live(), 1);
}

#[test]
fn test_typed_array_append_failure_keeps_both_sides() {
    let alloc = BudgetAlloc::new(2);
    let mut left = TypedArray::from_slice_in(&[1, 2], &alloc);
    let mut right = TypedArray::from_slice_in(&[3], &alloc);

    assert!(left.append(&mut right).is_err());

    assert_eq!(left, [1, 2]);
    assert_eq!(right, [3]);
}

#[test]
fn test_typed_array_oversized_request() {
    let alloc = BudgetAlloc::with_max_bytes(usize::MAX, 64);
    let mut array: TypedArray<u32, _> = TypedArray::new_in(&alloc);

    array.reserve(16).unwrap();
    assert_eq!(
        array.reserve(17),
        Err(GrowBufError::AllocationFailed { bytes: 68, align: 4 })
    );
    assert_eq!(array.capacity(), 16);
}

#[test]
fn test_storage_is_released() {
    let alloc = BudgetAlloc::new(usize::MAX);
    {
        let mut buf = ByteBuffer::new_in(&alloc);
        for byte in 0..100u8 {
            buf.push(byte).unwrap();
        }
        let mut array = TypedArray::new_in(&alloc);
        for value in 0..100 {
            array.push(value).unwrap();
        }
        assert_eq!(alloc.live(), 2);

        array.clear();
        assert_eq!(alloc.live(), 1);
        buf.clear();
        assert_eq!(alloc.live(), 0);

        buf.append(b"again").unwrap();
        array.push(1).unwrap();
        let iter = array.into_iter();
        assert_eq!(alloc.live(), 2);
        drop(iter);
        assert_eq!(alloc.live(), 1);
    }
    assert_eq!(alloc.live(), 0);
}
