use thiserror::Error;

/// Input validation failures. Remote estimation problems never show up
/// here: they degrade to the geometric fallback inside the estimator, and
/// schedule infeasibility is reported as conflict data, not as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("stop {stop_id}: could not parse fixed time '{value}', expected HH:mm")]
    InvalidFixedTime { stop_id: String, value: String },

    #[error("stop {stop_id}: duration must not be negative (got {minutes})")]
    NegativeDuration { stop_id: String, minutes: i64 },

    #[error("stop {stop_id}: buffer must not be negative (got {minutes})")]
    NegativeBuffer { stop_id: String, minutes: i64 },

    #[error("duplicate stop id: {0}")]
    DuplicateStopId(String),
}
