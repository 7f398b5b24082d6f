mod common;

use common::Counters;
use growbuf::TypedArray;

#[test]
fn test_empty_array_creates_nothing() {
    let counters = Counters::default();
    {
        let array: TypedArray<common::Tracked<'_>> = TypedArray::new();
        assert!(array.is_empty());
    }
    assert_eq!(counters.clones(), 0);
    assert_eq!(counters.drops(), 0);
}

#[test]
fn test_from_elem_clones_once_per_slot() {
    let counters = Counters::default();
    let sample = counters.make(1);

    let array = TypedArray::from_elem(200, &sample);
    assert_eq!(counters.clones(), 200);
    assert_eq!(counters.drops(), 0);

    drop(array);
    assert_eq!(counters.drops(), 200);
    drop(sample);
    assert_eq!(counters.drops(), 201);
}

#[test]
fn test_reserve_relocates_without_clone_or_drop() {
    let counters = Counters::default();
    let sample = counters.make(7);
    let mut array = TypedArray::from_elem(200, &sample);
    counters.reset();

    array.reserve(400).unwrap();
    assert_eq!(array.capacity(), 400);
    assert_eq!(counters.clones(), 0);
    assert_eq!(counters.drops(), 0);

    // Not larger than the content: nothing happens.
    array.reserve(50).unwrap();
    array.reserve(0).unwrap();
    assert_eq!(array.capacity(), 200);
    assert_eq!(counters.clones(), 0);
    assert_eq!(counters.drops(), 0);

    assert!(array.iter().all(|t| t.value == 7));
}

#[test]
fn test_push_moves_values_in() {
    let counters = Counters::default();
    let mut array = TypedArray::new();

    for i in 0..1000 {
        array.push(counters.make(i)).unwrap();
    }

    assert_eq!(array.capacity(), 1024);
    assert_eq!(array.len(), 1000);
    assert_eq!(counters.clones(), 0);
    assert_eq!(counters.drops(), 0);
    assert!(array.iter().enumerate().all(|(i, t)| t.value == i as u32));
}

#[test]
fn test_pop_hands_out_each_element_once() {
    let counters = Counters::default();
    let sample = counters.make(3);
    let mut array = TypedArray::from_elem(10, &sample);
    counters.reset();

    for _ in 0..10 {
        let popped = array.pop();
        assert!(popped.is_some());
    }
    assert!(array.is_empty());
    assert_eq!(counters.drops(), 10);

    drop(array);
    assert_eq!(counters.drops(), 10);
}

#[test]
fn test_truncate_and_clear_drop_live_elements() {
    let counters = Counters::default();
    let mut array = TypedArray::new();
    for i in 0..6 {
        array.push(counters.make(i)).unwrap();
    }

    array.truncate(4);
    assert_eq!(counters.drops(), 2);

    array.clear();
    assert_eq!(counters.drops(), 6);
    assert_eq!(array.capacity(), 0);
}

#[test]
fn test_assign_drops_old_content_after_building_new() {
    let counters = Counters::default();
    let mut array = TypedArray::new();
    for i in 0..3 {
        array.push(counters.make(i)).unwrap();
    }
    let replacement = [counters.make(10), counters.make(11)];
    counters.reset();

    array.assign_slice(&replacement).unwrap();

    assert_eq!(counters.clones(), 2);
    assert_eq!(counters.drops(), 3);
    assert_eq!(array.len(), 2);
    assert_eq!(array[0].value, 10);
}

#[test]
fn test_partially_consumed_iterator_drops_the_rest() {
    let counters = Counters::default();
    let mut array = TypedArray::new();
    for i in 0..5 {
        array.push(counters.make(i)).unwrap();
    }

    let mut iter = array.into_iter();
    let first = iter.next().unwrap();
    assert_eq!(first.value, 0);
    drop(iter);

    assert_eq!(counters.drops(), 4);
    drop(first);
    assert_eq!(counters.drops(), 5);
}

#[test]
fn test_swap_moves_no_elements() {
    let counters = Counters::default();
    let sample = counters.make(1);
    let mut a = TypedArray::from_elem(100, &sample);
    let mut b = TypedArray::new();
    counters.reset();

    a.swap(&mut b);

    assert_eq!(counters.clones(), 0);
    assert_eq!(counters.drops(), 0);
    assert_eq!(b.len(), 100);
}
