use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::lib::platform::types::{PlatformClient, PlatformError};
use crate::lib::rollout::types::ReadinessError;
use crate::lib::tasks::types::DefinitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RolloutState {
    Pending,
    Registered,
    ServiceUpdated,
    Converging,
    Complete,
    Failed,
}

pub struct Deployer {
    pub client: PlatformClient,
    pub deployment_id: uuid::Uuid,
    pub state: RolloutState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployOutcome {
    pub service: String,
    pub image: String,
    pub previous_task_definition: String,
    pub task_definition: String,
    pub replicas: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error("Invalid rollout transition from {from:?} to {to:?}")]
    InvalidStateTransition { from: RolloutState, to: RolloutState },

    #[error("{ready} of {expected} replicas ready on {task_definition} after {waited:?}")]
    RolloutTimedOut {
        task_definition: String,
        ready: usize,
        expected: usize,
        waited: Duration,
    },
}

pub type DeployResult<T> = Result<T, DeployError>;
