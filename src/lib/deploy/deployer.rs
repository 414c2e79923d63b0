use chrono::Utc;
use tracing::{Instrument, debug, info, info_span, warn};

use super::state::valid_state_transition;
use super::types::{
    DeployError, DeployOutcome, DeployResult, Deployer, RolloutState, WaitOptions,
};
use crate::lib::platform::types::PlatformClient;
use crate::lib::rollout::{
    readiness::assess_rollout,
    types::{InstanceVerdict, RolloutAssessment},
};
use crate::lib::tasks::definition::build_definition;

impl Deployer {
    pub fn new(client: PlatformClient) -> Self {
        Deployer {
            client,
            deployment_id: uuid::Uuid::new_v4(),
            state: RolloutState::Pending,
        }
    }

    fn advance(&mut self, next: RolloutState) -> DeployResult<()> {
        if !valid_state_transition(&self.state, &next) {
            return Err(DeployError::InvalidStateTransition {
                from: self.state,
                to: next,
            });
        }

        debug!("Rollout {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn fail(&mut self) {
        if valid_state_transition(&self.state, &RolloutState::Failed) {
            self.state = RolloutState::Failed;
        }
    }

    /// Points `service_name` at a new task definition revision running `image`.
    pub async fn deploy(&mut self, service_name: &str, image: &str) -> DeployResult<DeployOutcome> {
        // Checked before any request: one revision per deployer.
        if !valid_state_transition(&self.state, &RolloutState::Registered) {
            return Err(DeployError::InvalidStateTransition {
                from: self.state,
                to: RolloutState::Registered,
            });
        }

        let span = info_span!("deploy", id = %self.deployment_id, service = service_name);
        let result = self.run_deploy(service_name, image).instrument(span).await;
        if result.is_err() {
            self.fail();
        }
        result
    }

    async fn run_deploy(&mut self, service_name: &str, image: &str) -> DeployResult<DeployOutcome> {
        let mut service = self.client.find_service(service_name).await?;
        info!(
            "Found service {} on task definition {}",
            service.name, service.task_definition
        );

        let current = self
            .client
            .find_task_definition(&service.task_definition)
            .await?;
        debug!("Current task definition: {:?}", current);

        let definition = build_definition(&current, image)?;
        let new_arn = self.client.register_task_definition(&definition).await?;
        self.advance(RolloutState::Registered)?;
        info!("Registered task definition {}", new_arn);

        let previous = std::mem::replace(&mut service.task_definition, new_arn.clone());
        self.client.update_service(&service).await?;
        self.advance(RolloutState::ServiceUpdated)?;
        info!("Service {} updated to {}", service.name, new_arn);

        Ok(DeployOutcome {
            service: service.name,
            image: image.to_string(),
            previous_task_definition: previous,
            task_definition: new_arn,
            replicas: service.replicas.unwrap_or(1),
        })
    }

    /// Polls running tasks until exactly `replicas` of them have been up on
    /// `task_definition` past the warm-up window, or `options.timeout` runs out.
    pub async fn wait_for_rollout(
        &mut self,
        task_definition: &str,
        replicas: usize,
        options: WaitOptions,
    ) -> DeployResult<RolloutAssessment> {
        let span = info_span!("wait", id = %self.deployment_id, task_definition);
        let result = self
            .poll_rollout(task_definition, replicas, options)
            .instrument(span)
            .await;
        if result.is_err() {
            self.fail();
        }
        result
    }

    async fn poll_rollout(
        &mut self,
        task_definition: &str,
        replicas: usize,
        options: WaitOptions,
    ) -> DeployResult<RolloutAssessment> {
        let started = tokio::time::Instant::now();

        loop {
            self.advance(RolloutState::Converging)?;

            let tasks = self.client.list_tasks().await?;
            let assessment = assess_rollout(&tasks, task_definition, replicas, Utc::now())?;
            log_verdicts(&assessment);

            if assessment.is_complete() {
                self.advance(RolloutState::Complete)?;
                info!("{} of {} replicas ready", assessment.ready, replicas);
                return Ok(assessment);
            }

            let waited = started.elapsed();
            if waited >= options.timeout {
                warn!(
                    "Gave up after {:?} with {} of {} replicas ready",
                    waited, assessment.ready, replicas
                );
                return Err(DeployError::RolloutTimedOut {
                    task_definition: task_definition.to_string(),
                    ready: assessment.ready,
                    expected: replicas,
                    waited,
                });
            }

            info!(
                "{} of {} replicas ready, checking again in {:?}",
                assessment.ready, replicas, options.poll_interval
            );
            tokio::time::sleep(options.poll_interval.min(options.timeout - waited)).await;
        }
    }
}

fn log_verdicts(assessment: &RolloutAssessment) {
    for verdict in &assessment.verdicts {
        match verdict {
            InstanceVerdict::OtherDefinition => {}
            InstanceVerdict::NotStarted { started } => {
                debug!("Task has not been started: {}", started)
            }
            InstanceVerdict::WarmingUp { started, elapsed } => debug!(
                "Task started at {} has only been up {}s",
                started,
                elapsed.num_seconds()
            ),
            InstanceVerdict::Ready { started, elapsed } => debug!(
                "Task started at {} ready after {}s",
                started,
                elapsed.num_seconds()
            ),
        }
    }
}
