#![allow(dead_code)]

use constructive::Real;

/// Sums terms using a balanced reduction instead of left-associative chaining.
///
/// This keeps the expression graph shallow (O(log n) depth), so timings measure
/// arithmetic rather than walks down long addition chains.
pub fn balanced_sum(mut values: Vec<Real>) -> Real {
    if values.is_empty() {
        return Real::zero();
    }

    while values.len() > 1 {
        let mut next = Vec::with_capacity(values.len().div_ceil(2));
        let mut iter = values.into_iter();
        while let Some(left) = iter.next() {
            if let Some(right) = iter.next() {
                next.push(left + right);
            } else {
                next.push(left);
            }
        }
        values = next;
    }

    values
        .pop()
        .expect("values should contain at least one element")
}

/// Set `CONSTRUCTIVE_BENCH_VERBOSE` to print the computed values once per bench.
pub fn verbose() -> bool {
    std::env::var_os("CONSTRUCTIVE_BENCH_VERBOSE").is_some()
}
