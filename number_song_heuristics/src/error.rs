// Error type for the heuristics crate.
//
// The only fallible input is a numeric base: digit strings use the alphabet
// 0-9 then A-Z, so a base must lie in 2..=36.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeuristicsError {
    #[error("invalid argument: base {0} is outside 2..=36")]
    InvalidBase(u32),
}

pub type Result<T> = std::result::Result<T, HeuristicsError>;
