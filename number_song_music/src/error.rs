// Error type for the music crate. Heuristics, I/O, and JSON errors convert
// in with `?`; everything else is an invalid argument or a synthesis failure.

use number_song_heuristics::HeuristicsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Heuristics(#[from] HeuristicsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("synthesis engine failed: {0}")]
    Synthesis(String),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
