use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during simulation: {0}")]
    FailureInCalculation(#[from] SimulationError),
    #[error("Demand leaked between compared systems: {0}")]
    DemandInconsistency(#[from] DemandConsistencyError),
    #[error("Error while writing outputs: {0}")]
    Output(OutputError),
}

/// Input-contract violations. Raised before any slice is computed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid resolution of {0} minutes: must be a positive divisor of 1440")]
    InvalidResolution(u32),
    #[error("Array length mismatch for {channel}: expected {expected} slices at {resolution_minutes}-minute resolution, got {actual}")]
    ArrayLengthMismatch {
        channel: &'static str,
        expected: usize,
        actual: usize,
        resolution_minutes: u32,
    },
    #[error("Slice range {start}..{end} is outside a profile of {slice_count} slices")]
    SliceOutOfRange {
        start: usize,
        end: usize,
        slice_count: usize,
    },
    #[error("Invalid draw rate for {channel} at slice {slice}: {value} L/min must be finite and not negative")]
    InvalidDrawRate {
        channel: &'static str,
        slice: usize,
        value: f64,
    },
}

/// Raised when two runs over the same profile disagree on demand. This is a
/// regression in the engine rather than bad input, so it is kept apart from
/// [`SimulationError`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DemandConsistencyError {
    #[error("Results have different slice counts ({a} vs {b})")]
    LengthMismatch { a: usize, b: usize },
    #[error("Demand channel '{channel}' differs at slice {slice}: {a} vs {b}")]
    ChannelMismatch {
        slice: usize,
        channel: &'static str,
        a: f64,
        b: f64,
    },
    #[error("Result carries {actual} rows but its {resolution_minutes}-minute resolution implies {expected}")]
    ResolutionMismatch {
        expected: usize,
        actual: usize,
        resolution_minutes: u32,
    },
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
