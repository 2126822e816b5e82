// Number-theoretic heuristics for beat-driven composition.
//
// Pure functions over non-negative integers: base conversion, digit sums
// and digital roots, palindromes across bases, happy numbers, divisors, and
// binary digit counts. Primality, factorization, and Fibonacci membership go
// through `NumberOracle`, which owns the only mutable state in the crate:
// two ascending caches that grow on demand and never shrink.
//
// Module map:
// - radix.rs: validated `Radix` (2..=36), digit expansion, `to_base`
// - digits.rs: digit sums/roots, palindromes, extreme digits, happy numbers
// - divisors.rs: proper divisors and their sum
// - oracle.rs: `NumberOracle` prime and Fibonacci caches, prime factors
//
// **Determinism.** Every result depends only on the input and, for the
// oracle, on nothing at all: the caches change cost, never answers.

pub mod digits;
pub mod divisors;
pub mod error;
pub mod oracle;
pub mod radix;

pub use digits::{
    count_digit, digit_sum, digital_root, highest_digit, is_happy, is_palindrome,
    last_nonzero_digit, lowest_digit, ones_in_binary, palindrome_bases, zeroes_in_binary,
};
pub use divisors::{divisors, sum_of_divisors};
pub use error::{HeuristicsError, Result};
pub use oracle::NumberOracle;
pub use radix::{Radix, digits, from_radix_string, to_base, to_radix_string};
