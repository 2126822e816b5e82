// Digit-level properties of an integer in a given radix.
//
// Everything here is pure: the digit expansion from `radix::digits` is the
// single source of truth, and each helper is a small reduction over it.

use crate::radix::{Radix, digits};
use std::collections::HashSet;

/// Sum of the digits of `n` in `radix`.
pub fn digit_sum(n: u64, radix: Radix) -> u64 {
    digits(n, radix).into_iter().map(u64::from).sum()
}

/// Repeated digit sum until a single digit remains. Always in `[0, radix)`.
pub fn digital_root(n: u64, radix: Radix) -> u64 {
    let mut root = digit_sum(n, radix);
    while root >= radix.get() as u64 {
        root = digit_sum(root, radix);
    }
    root
}

/// True if the digits of `n` in `radix` read the same in both directions.
pub fn is_palindrome(n: u64, radix: Radix) -> bool {
    let d = digits(n, radix);
    d.iter().eq(d.iter().rev())
}

/// The subsequence of `bases` in which `n` is a palindrome, in input order.
pub fn palindrome_bases<I>(n: u64, bases: I) -> Vec<Radix>
where
    I: IntoIterator<Item = Radix>,
{
    bases.into_iter().filter(|&r| is_palindrome(n, r)).collect()
}

/// Number of occurrences of `digit` in the expansion of `n`.
pub fn count_digit(n: u64, radix: Radix, digit: u32) -> usize {
    digits(n, radix).into_iter().filter(|&d| d == digit).count()
}

pub fn ones_in_binary(n: u64) -> u32 {
    n.count_ones()
}

/// Zero digits in the binary expansion; `0` itself has one.
pub fn zeroes_in_binary(n: u64) -> usize {
    count_digit(n, Radix::BINARY, 0)
}

pub fn highest_digit(n: u64, radix: Radix) -> u32 {
    digits(n, radix).into_iter().max().unwrap_or(0)
}

pub fn lowest_digit(n: u64, radix: Radix) -> u32 {
    digits(n, radix).into_iter().min().unwrap_or(0)
}

/// The least-significant nonzero digit of `n`, or 0 when `n == 0`.
pub fn last_nonzero_digit(n: u64, radix: Radix) -> u32 {
    digits(n, radix)
        .into_iter()
        .rev()
        .find(|&d| d != 0)
        .unwrap_or(0)
}

/// Happy-number test in `radix`.
///
/// Iterates `n -> sum of squared digits` until a value repeats. The visited
/// set is the termination guarantee; `n` is happy iff the cycle it falls
/// into is the fixed point 1.
pub fn is_happy(n: u64, radix: Radix) -> bool {
    let mut visited = HashSet::new();
    let mut current = n;
    while visited.insert(current) {
        current = digits(current, radix)
            .into_iter()
            .map(|d| (d as u64) * (d as u64))
            .sum();
    }
    current == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_sum_and_root() {
        assert_eq!(digit_sum(12345, Radix::DECIMAL), 15);
        assert_eq!(digital_root(12345, Radix::DECIMAL), 6);
        assert_eq!(digital_root(0, Radix::DECIMAL), 0);
        assert_eq!(digital_root(9, Radix::DECIMAL), 9);
        assert_eq!(digital_root(11, Radix::DECIMAL), 2);
        // 21^3 = 9261 = "6A5A" in base 11 -> 31 = "29" -> 11 = "10" -> 1
        assert_eq!(digital_root(9261, Radix::UNDECIMAL), 1);
    }

    #[test]
    fn test_digital_root_is_single_digit() {
        for base in 2..=36 {
            let radix = Radix::new(base).unwrap();
            for n in 0..3000 {
                assert!(digital_root(n, radix) < base as u64, "n={n} base={base}");
            }
        }
    }

    #[test]
    fn test_palindrome_bases_preserves_order() {
        // 5 = 101 (2), 12 (3), 11 (4), 10 (5)
        let bases = Radix::span(2, 5).rev();
        let found: Vec<u32> = palindrome_bases(5, bases).into_iter().map(Radix::get).collect();
        assert_eq!(found, vec![4, 2]);
        assert!(palindrome_bases(0, Radix::span(2, 16)).len() == 15);
    }

    #[test]
    fn test_binary_counts() {
        assert_eq!(ones_in_binary(0), 0);
        assert_eq!(ones_in_binary(21), 3);
        assert_eq!(zeroes_in_binary(0), 1);
        assert_eq!(zeroes_in_binary(8), 3);
        assert_eq!(zeroes_in_binary(7), 0);
    }

    #[test]
    fn test_extreme_digits() {
        assert_eq!(highest_digit(3917, Radix::DECIMAL), 9);
        assert_eq!(lowest_digit(3917, Radix::DECIMAL), 1);
        assert_eq!(highest_digit(0, Radix::DECIMAL), 0);
        assert_eq!(highest_digit(143, Radix::DUODECIMAL), 11);
    }

    #[test]
    fn test_last_nonzero_digit() {
        assert_eq!(last_nonzero_digit(0, Radix::DECIMAL), 0);
        assert_eq!(last_nonzero_digit(300, Radix::DECIMAL), 3);
        assert_eq!(last_nonzero_digit(4050, Radix::DECIMAL), 5);
        assert_eq!(last_nonzero_digit(8, Radix::BINARY), 1);
    }

    #[test]
    fn test_count_digit() {
        // 17 = 122 in base 3
        assert_eq!(count_digit(17, Radix::TERNARY, 2), 2);
        assert_eq!(count_digit(9, Radix::TERNARY, 2), 0);
    }

    #[test]
    fn test_happy_numbers() {
        // 19 -> 82 -> 68 -> 100 -> 1
        assert!(is_happy(19, Radix::DECIMAL));
        assert!(is_happy(1, Radix::DECIMAL));
        assert!(is_happy(7, Radix::DECIMAL));
        assert!(!is_happy(4, Radix::DECIMAL));
        assert!(!is_happy(20, Radix::DECIMAL));
        assert!(!is_happy(0, Radix::DECIMAL));
        let happy_below_50: Vec<u64> = (1..50).filter(|&n| is_happy(n, Radix::DECIMAL)).collect();
        assert_eq!(happy_below_50, vec![1, 7, 10, 13, 19, 23, 28, 31, 32, 44, 49]);
    }

    #[test]
    fn test_every_positive_number_is_happy_in_binary() {
        for n in 1..500 {
            assert!(is_happy(n, Radix::BINARY), "n={n}");
        }
    }
}
