use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

/// Layout of the second-level prefix of `StartedAt`.
pub const STARTED_AT_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";
pub const STARTED_AT_WIDTH: usize = 19;

/// Start times before this year are the platform's "not started" sentinel.
pub const MIN_STARTED_YEAR: i32 = 2000;

/// How long an instance must have been running before it counts as ready.
pub const WARM_UP_GRACE: TimeDelta = TimeDelta::seconds(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceVerdict {
    OtherDefinition,
    NotStarted {
        started: NaiveDateTime,
    },
    WarmingUp {
        started: NaiveDateTime,
        elapsed: TimeDelta,
    },
    Ready {
        started: NaiveDateTime,
        elapsed: TimeDelta,
    },
}

impl InstanceVerdict {
    pub fn is_ready(&self) -> bool {
        matches!(self, InstanceVerdict::Ready { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutAssessment {
    pub ready: usize,
    pub expected: usize,
    pub verdicts: Vec<InstanceVerdict>,
}

impl RolloutAssessment {
    /// Exact match only: extra instances still draining mean the rollout
    /// has not settled yet.
    pub fn is_complete(&self) -> bool {
        self.ready == self.expected
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("malformed StartedAt timestamp {value:?}: {source}")]
    MalformedTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

pub type ReadinessResult<T> = Result<T, ReadinessError>;
