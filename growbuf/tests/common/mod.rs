#![allow(dead_code)]

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;

use growbuf::{Global, RawAlloc};

/// Allocator that refuses requests once its budget is spent or when a
/// request is larger than `max_bytes`. Counts live regions.
pub struct BudgetAlloc {
    allocations_left: Cell<usize>,
    max_bytes: usize,
    live: Cell<usize>,
}

impl BudgetAlloc {
    pub fn new(allocations: usize) -> Self {
        Self::with_max_bytes(allocations, usize::MAX)
    }

    pub fn with_max_bytes(allocations: usize, max_bytes: usize) -> Self {
        Self {
            allocations_left: Cell::new(allocations),
            max_bytes,
            live: Cell::new(0),
        }
    }

    pub fn exhausted() -> Self {
        Self::new(0)
    }

    pub fn set_budget(&self, allocations: usize) {
        self.allocations_left.set(allocations);
    }

    pub fn live(&self) -> usize {
        self.live.get()
    }
}

unsafe impl RawAlloc for BudgetAlloc {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.allocations_left.get() == 0 || layout.size() > self.max_bytes {
            return None;
        }
        let ptr = Global.allocate(layout)?;
        self.allocations_left.set(self.allocations_left.get() - 1);
        self.live.set(self.live.get() + 1);
        Some(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live.set(self.live.get() - 1);
        unsafe { Global.deallocate(ptr, layout) }
    }
}

/// Element that records how often it is cloned and dropped.
#[derive(Debug)]
pub struct Tracked<'a> {
    pub value: u32,
    clones: &'a Cell<usize>,
    drops: &'a Cell<usize>,
}

#[derive(Default)]
pub struct Counters {
    pub clones: Cell<usize>,
    pub drops: Cell<usize>,
}

impl Counters {
    pub fn make(&self, value: u32) -> Tracked<'_> {
        Tracked {
            value,
            clones: &self.clones,
            drops: &self.drops,
        }
    }

    pub fn reset(&self) {
        self.clones.set(0);
        self.drops.set(0);
    }

    pub fn clones(&self) -> usize {
        self.clones.get()
    }

    pub fn drops(&self) -> usize {
        self.drops.get()
    }
}

impl Clone for Tracked<'_> {
    fn clone(&self) -> Self {
        self.clones.set(self.clones.get() + 1);
        Tracked {
            value: self.value,
            clones: self.clones,
            drops: self.drops,
        }
    }
}

impl Drop for Tracked<'_> {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

impl PartialEq for Tracked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
