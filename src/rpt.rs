//! A time-bucketed request counter for computing requests-per-period.
//!
//! `Rpt` groups events into slots of a fixed `resolution` and keeps the trailing
//! `size` slots available for queries. Storage is over-allocated (`size * over_alloc`
//! cells) so that moving forward in time is usually a plain index bump. Only when the
//! cursor would run off the end of the buffer are the still-relevant cells copied back
//! to the front ("compaction").
//!
//! A gap wider than the window wipes the buffer and the next slot starts at cell 0,
//! so `range()` never reaches further back than what was recorded since. `get()`
//! sums the trailing `size` cells ending at the head; dividing by `size * resolution`
//! turns that into a rate.
//!
//! The counter has a single writer. Callers sharing it between threads must wrap it
//! in their own lock.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use chrono::DateTime;
//! use rmqtt_rpt::Rpt;
//!
//! // requests per minute with one-second resolution
//! let mut rpt = Rpt::new(60, Duration::from_secs(1)).unwrap();
//! rpt.add_requests_to(2, DateTime::from_timestamp(1, 0).unwrap()).unwrap();
//! rpt.add_requests_to(3, DateTime::from_timestamp(2, 0).unwrap()).unwrap();
//! assert_eq!(rpt.get(), 5);
//! assert_eq!(rpt.range(-1, 0), vec![2, 3]);
//! ```

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::{Config, OVER_ALLOC};

#[derive(Debug, Clone)]
pub struct Rpt {
    periods: Vec<u64>,
    resolution: Duration,
    resolution_nanos: i64,
    //slot index last written
    head: i64,
    //position of `head` in `periods`
    ptr: usize,
    size: usize,
}

impl Rpt {
    /// Creates a counter holding `size` slots, each `resolution` long, with the
    /// default over-allocation factor.
    #[inline]
    pub fn new(size: usize, resolution: Duration) -> Result<Self> {
        Self::with_over_alloc(size, resolution, OVER_ALLOC)
    }

    /// Creates a counter whose buffer is `size * over_alloc` cells long.
    #[inline]
    pub fn with_over_alloc(size: usize, resolution: Duration, over_alloc: usize) -> Result<Self> {
        Self::from_config(&Config {
            size,
            resolution,
            over_alloc,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        let resolution_nanos = cfg.resolution_nanos()?;
        let length = cfg.size * cfg.over_alloc;
        info!(
            "new rpt, size: {}, resolution: {:?}, capacity: {}",
            cfg.size, cfg.resolution, length
        );
        Ok(Self {
            periods: vec![0; length],
            resolution: cfg.resolution,
            resolution_nanos,
            head: 0,
            ptr: 0,
            size: cfg.size,
        })
    }

    /// Adds a single request in the current period. This is an alias to
    /// `add_requests_to(1, Utc::now())`.
    #[inline]
    pub fn add_request(&mut self) -> Result<()> {
        self.add_requests_to(1, Utc::now())
    }

    /// Adds `requests` to the slot containing `at`.
    #[inline]
    pub fn add_requests_to<Tz: TimeZone>(&mut self, requests: u64, at: DateTime<Tz>) -> Result<()> {
        let nanos = at
            .timestamp_nanos_opt()
            .ok_or(Error::TimestampOutOfRange)?;
        self.add_requests_at_nanos(requests, nanos)
    }

    /// Adds `requests` to the slot containing `nanos` (nanoseconds since the Unix epoch).
    ///
    /// Moving backwards in time is allowed while the target slot is still held in the
    /// buffer; the head then follows the insertion. An insertion that would land before
    /// the start of the buffer returns `Error::Stale` and changes nothing.
    pub fn add_requests_at_nanos(&mut self, requests: u64, nanos: i64) -> Result<()> {
        let slot = nanos.div_euclid(self.resolution_nanos);
        let target = i128::from(slot) - i128::from(self.head) + self.ptr as i128;
        if target < 0 {
            warn!(
                "rejecting stale insertion, slot: {}, head: {}, ptr: {}",
                slot, self.head, self.ptr
            );
            return Err(Error::Stale {
                slot,
                head: self.head,
            });
        }

        let length = self.periods.len();
        let target = if target >= length as i128 {
            // Cells still inside the window ending at `slot` move to the front and
            // the head lands right after them. Without any, start over at 0.
            let keep = (length + self.size - 1) as i128 - target;
            if keep > 0 {
                self.shift(keep as usize);
                self.size - 1
            } else {
                debug!(
                    "gap of {} slots exceeds the window, wiping history",
                    i128::from(slot) - i128::from(self.head)
                );
                self.shift(0);
                0
            }
        } else {
            target as usize
        };

        let period = &mut self.periods[target];
        *period = period.saturating_add(requests);
        self.ptr = target;
        self.head = slot;
        Ok(())
    }

    /// Moves the last `n` cells to the front of the buffer and zeroes the rest.
    fn shift(&mut self, n: usize) {
        let length = self.periods.len();
        debug!("compacting rpt, keep: {}, capacity: {}", n, length);
        self.periods.copy_within(length - n.., 0);
        self.periods[n..].fill(0);
    }

    /// Returns the number of requests in the trailing `size` slots, ending at the
    /// head. Fewer slots are summed while less history has been recorded.
    #[inline]
    pub fn get(&self) -> u64 {
        self.periods[..=self.ptr]
            .iter()
            .rev()
            .take(self.size)
            .fold(0, |total, c| total.saturating_add(*c))
    }

    /// Returns the count of the head slot.
    #[inline]
    pub fn current(&self) -> u64 {
        self.periods[self.ptr]
    }

    /// Requests per second, `get()` spread over `size * resolution`.
    #[inline]
    pub fn rate_per_second(&self) -> f64 {
        self.rate_per(Duration::from_secs(1))
    }

    /// Scales the windowed total from `size` slots down (or up) to `per`.
    #[inline]
    pub fn rate_per(&self, per: Duration) -> f64 {
        // resolution and size are validated non-zero
        let slots = per.as_secs_f64() / self.resolution.as_secs_f64();
        self.get() as f64 * slots / self.size as f64
    }

    /// Returns the slot counts from `start` to `end`, both relative to the head.
    ///
    /// E.g. `range(-60, 0)` yields the last 61 slots oldest first and `range(0, -60)`
    /// the same slots newest first. Positive bounds clamp to the head and bounds
    /// reaching past the recorded history clamp to the oldest held slot.
    pub fn range(&self, start: isize, end: isize) -> Vec<u64> {
        let start = self.filter_bound(start);
        let end = self.filter_bound(end);
        let ptr = self.ptr as isize;
        let at = |offset: isize| self.periods[(ptr + offset) as usize];
        if end > start {
            (start..=end).map(at).collect()
        } else {
            (end..=start).rev().map(at).collect()
        }
    }

    #[inline]
    fn filter_bound(&self, bound: isize) -> isize {
        let ptr = self.ptr as isize;
        if bound > 0 {
            0
        } else if ptr + bound < 0 {
            -ptr
        } else {
            bound
        }
    }

    /// Drops all recorded counts.
    #[inline]
    pub fn clear(&mut self) {
        self.periods.fill(0);
        self.head = 0;
        self.ptr = 0;
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn resolution(&self) -> Duration {
        self.resolution
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.periods.len()
    }

    /// Returns the slot index (time since epoch divided by resolution) last written.
    #[inline]
    pub fn head(&self) -> i64 {
        self.head
    }
}
