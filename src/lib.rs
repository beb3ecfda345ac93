use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use crate::error::{Error, Result};
pub use crate::rpt::Rpt;

mod error;
mod rpt;

/// Default ratio of buffer cells to window slots.
pub const OVER_ALLOC: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    //Number of trailing slots summed by `Rpt::get`
    pub size: usize,
    //Time span of a single slot
    pub resolution: Duration,
    //Buffer length is `size * over_alloc`, trading memory for fewer compactions
    pub over_alloc: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size: 60,
            resolution: Duration::from_secs(1),
            over_alloc: OVER_ALLOC,
        }
    }
}

impl Config {
    /// Checks that a counter can be built from this configuration.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidSize(self.size));
        }
        self.resolution_nanos()?;
        if self.over_alloc == 0 || self.size.checked_mul(self.over_alloc).is_none() {
            return Err(Error::InvalidOverAlloc(self.over_alloc));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn resolution_nanos(&self) -> Result<i64> {
        match i64::try_from(self.resolution.as_nanos()) {
            Ok(nanos) if nanos > 0 => Ok(nanos),
            _ => Err(Error::InvalidResolution(self.resolution)),
        }
    }
}
