use std::time::Duration;

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid window size: `{0}`, must be greater than zero")]
    InvalidSize(usize),
    #[error("invalid resolution: `{0:?}`, must be non-zero and fit in i64 nanoseconds")]
    InvalidResolution(Duration),
    #[error("invalid over-allocation factor: `{0}`")]
    InvalidOverAlloc(usize),
    #[error("stale insertion, slot: {slot}, head: {head}")]
    Stale { slot: i64, head: i64 },
    #[error("timestamp out of range")]
    TimestampOutOfRange,
}

impl Error {
    #[inline]
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::Stale { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_context() {
        let e = Error::Stale { slot: 3, head: 10 };
        assert_eq!(e.to_string(), "stale insertion, slot: 3, head: 10");
        assert!(e.is_stale());
        assert!(!Error::TimestampOutOfRange.is_stale());
        assert_eq!(
            Error::InvalidSize(0).to_string(),
            "invalid window size: `0`, must be greater than zero"
        );
    }
}
