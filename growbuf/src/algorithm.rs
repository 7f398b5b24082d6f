//! Small free functions over values and slices.

/// The smaller of `a` and `b`; `a` when they compare equal.
pub fn min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

/// The larger of `a` and `b`; `a` when they compare equal.
pub fn max<T: PartialOrd>(a: T, b: T) -> T {
    if a < b {
        b
    } else {
        a
    }
}

pub fn swap<T>(a: &mut T, b: &mut T) {
    core::mem::swap(a, b);
}

/// Sets every slot of `dst` to a clone of `value`.
pub fn fill<T: Clone>(dst: &mut [T], value: &T) {
    dst.fill(value.clone());
}

/// Sets the first `n` slots of `dst` (at most `dst.len()`) to clones of
/// `value` and returns the index one past the last slot written.
pub fn fill_n<T: Clone>(dst: &mut [T], n: usize, value: &T) -> usize {
    let end = n.min(dst.len());
    fill(&mut dst[..end], value);
    end
}
