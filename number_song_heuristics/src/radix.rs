// Positional base conversion.
//
// A `Radix` is a validated base in 2..=36. Validation happens once at
// construction so every digit-level helper downstream is infallible; only
// the entry points that accept a raw `u32` base can fail.
//
// Digits are produced most-significant first, using 0-9 then A-Z, and zero
// is always rendered as the single digit "0".

use crate::error::{HeuristicsError, Result};

const DIGIT_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A positional numeral base between 2 and 36 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Radix(u32);

impl Radix {
    pub const BINARY: Radix = Radix(2);
    pub const TERNARY: Radix = Radix(3);
    pub const DECIMAL: Radix = Radix(10);
    pub const UNDECIMAL: Radix = Radix(11);
    pub const DUODECIMAL: Radix = Radix(12);

    /// Validate a raw base.
    pub fn new(base: u32) -> Result<Self> {
        if (2..=36).contains(&base) {
            Ok(Radix(base))
        } else {
            Err(HeuristicsError::InvalidBase(base))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Every radix in `low..=high`, ascending. Out-of-range bounds are clamped.
    pub fn span(low: u32, high: u32) -> impl DoubleEndedIterator<Item = Radix> {
        (low.max(2)..=high.min(36)).map(Radix)
    }
}

/// Digit values of `n` in the given radix, most-significant first.
///
/// `digits(0, _)` is `[0]`.
pub fn digits(mut n: u64, radix: Radix) -> Vec<u32> {
    let base = radix.0 as u64;
    let mut out = Vec::new();
    while n != 0 {
        out.push((n % base) as u32);
        n /= base;
    }
    if out.is_empty() {
        out.push(0);
    }
    out.reverse();
    out
}

/// Render `n` in the given radix.
pub fn to_radix_string(n: u64, radix: Radix) -> String {
    digits(n, radix)
        .into_iter()
        .map(|d| DIGIT_ALPHABET[d as usize] as char)
        .collect()
}

/// Render `n` in `base`, failing if the base is not in 2..=36.
pub fn to_base(n: u64, base: u32) -> Result<String> {
    Ok(to_radix_string(n, Radix::new(base)?))
}

/// Inverse of `to_base`: parse a digit string back into an integer.
///
/// Returns `None` on an empty string, a character outside the radix, or
/// overflow.
pub fn from_radix_string(text: &str, radix: Radix) -> Option<u64> {
    if text.is_empty() {
        return None;
    }
    text.chars().try_fold(0u64, |acc, c| {
        let d = c.to_digit(radix.0)?;
        acc.checked_mul(radix.0 as u64)?.checked_add(d as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base_examples() {
        assert_eq!(to_base(0, 2).unwrap(), "0");
        assert_eq!(to_base(5, 2).unwrap(), "101");
        assert_eq!(to_base(255, 16).unwrap(), "FF");
        assert_eq!(to_base(35, 36).unwrap(), "Z");
        assert_eq!(to_base(510, 12).unwrap(), "366");
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert_eq!(to_base(10, 1), Err(HeuristicsError::InvalidBase(1)));
        assert_eq!(to_base(10, 0), Err(HeuristicsError::InvalidBase(0)));
        assert_eq!(Radix::new(37), Err(HeuristicsError::InvalidBase(37)));
    }

    #[test]
    fn test_round_trip_all_bases() {
        for base in 2..=36 {
            let radix = Radix::new(base).unwrap();
            for n in (0..2000).chain([u32::MAX as u64, u64::MAX]) {
                let s = to_radix_string(n, radix);
                assert_eq!(from_radix_string(&s, radix), Some(n), "n={n} base={base}");
            }
        }
    }

    #[test]
    fn test_span_clamps() {
        let bases: Vec<u32> = Radix::span(0, 5).map(Radix::get).collect();
        assert_eq!(bases, vec![2, 3, 4, 5]);
        assert_eq!(Radix::span(2, 16).count(), 15);
    }
}
