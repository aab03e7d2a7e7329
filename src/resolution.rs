use crate::core::units::{MINUTES_PER_DAY, MINUTES_PER_HOUR};
use crate::errors::SimulationError;
use serde::{Deserialize, Serialize};

/// Length of one time slice of the simulated day, in minutes.
///
/// Only divisors of a day are representable, so every resolution produces a
/// whole number of slices.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Resolution(u32);

impl Resolution {
    pub const HOURLY: Resolution = Resolution(60);

    pub fn new(minutes: u32) -> Result<Self, SimulationError> {
        if minutes == 0 || MINUTES_PER_DAY % minutes != 0 {
            return Err(SimulationError::InvalidResolution(minutes));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn slice_count(&self) -> usize {
        (MINUTES_PER_DAY / self.0) as usize
    }

    /// Duration of one slice in hours; power (kW) times this gives kWh
    pub fn slice_hours(&self) -> f64 {
        self.0 as f64 / MINUTES_PER_HOUR as f64
    }

    pub fn iter(&self) -> SliceIterator {
        SliceIterator {
            resolution: *self,
            current_index: 0,
        }
    }

    /// Fail unless `actual` equals this resolution's slice count
    pub(crate) fn check_length(
        &self,
        channel: &'static str,
        actual: usize,
    ) -> Result<(), SimulationError> {
        let expected = self.slice_count();
        if actual != expected {
            return Err(SimulationError::ArrayLengthMismatch {
                channel,
                expected,
                actual,
                resolution_minutes: self.0,
            });
        }
        Ok(())
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::HOURLY
    }
}

impl TryFrom<u32> for Resolution {
    type Error = SimulationError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<Resolution> for u32 {
    fn from(resolution: Resolution) -> Self {
        resolution.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slice {
    pub index: usize,
    pub minutes: u32,
}

impl Slice {
    pub fn start_minute(&self) -> u32 {
        self.index as u32 * self.minutes
    }

    /// Hour of day at which this slice starts, fractional for sub-hourly slices
    pub fn start_hour(&self) -> f64 {
        self.start_minute() as f64 / MINUTES_PER_HOUR as f64
    }

    /// Whether the slice starts within [from_hour, to_hour)
    pub fn starts_within(&self, from_hour: f64, to_hour: f64) -> bool {
        let hour = self.start_hour();
        hour >= from_hour && hour < to_hour
    }

    /// Label such as "06:30" for charts
    pub fn label(&self) -> String {
        let minute = self.start_minute();
        format!(
            "{:02}:{:02}",
            minute / MINUTES_PER_HOUR,
            minute % MINUTES_PER_HOUR
        )
    }
}

#[derive(Clone, Debug)]
pub struct SliceIterator {
    resolution: Resolution,
    current_index: usize,
}

impl Iterator for SliceIterator {
    type Item = Slice;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.resolution.slice_count() {
            return None;
        }
        let slice = Slice {
            index: self.current_index,
            minutes: self.resolution.minutes(),
        };
        self.current_index += 1;
        Some(slice)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.resolution.slice_count() - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SliceIterator {}
