// Proper divisors by trial division.
//
// Linear in `n`; callers only ask about beat numbers, which stay small.

/// Integers in `[1, n/2]` that divide `n`. Excludes `n` itself, includes 1.
pub fn divisors(n: u64) -> Vec<u64> {
    (1..=n / 2).filter(|d| n % d == 0).collect()
}

pub fn sum_of_divisors(n: u64) -> u64 {
    divisors(n).into_iter().sum()
}
