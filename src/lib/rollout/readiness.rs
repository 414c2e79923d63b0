use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

use super::types::{
    InstanceVerdict, MIN_STARTED_YEAR, ReadinessError, ReadinessResult, RolloutAssessment,
    STARTED_AT_LAYOUT, STARTED_AT_WIDTH, WARM_UP_GRACE,
};
use crate::lib::tasks::types::TaskInstance;

/// Parses the first [`STARTED_AT_WIDTH`] characters of a `StartedAt` value.
/// Fractional seconds and zone suffixes past that point are ignored.
pub fn parse_started_at(value: &str) -> ReadinessResult<NaiveDateTime> {
    let prefix = match value.char_indices().nth(STARTED_AT_WIDTH) {
        Some((end, _)) => &value[..end],
        None => value,
    };

    NaiveDateTime::parse_from_str(prefix, STARTED_AT_LAYOUT).map_err(|source| {
        ReadinessError::MalformedTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

pub fn evaluate_instance(
    instance: &TaskInstance,
    target_arn: &str,
    now: DateTime<Utc>,
) -> ReadinessResult<InstanceVerdict> {
    if !instance.task_definition_arn.eq_ignore_ascii_case(target_arn) {
        return Ok(InstanceVerdict::OtherDefinition);
    }

    let started = parse_started_at(&instance.started_at)?;
    if started.year() < MIN_STARTED_YEAR {
        return Ok(InstanceVerdict::NotStarted { started });
    }

    let elapsed = now.naive_utc() - started;
    if elapsed < WARM_UP_GRACE {
        return Ok(InstanceVerdict::WarmingUp { started, elapsed });
    }

    Ok(InstanceVerdict::Ready { started, elapsed })
}

pub fn assess_rollout(
    instances: &[TaskInstance],
    target_arn: &str,
    expected_replicas: usize,
    now: DateTime<Utc>,
) -> ReadinessResult<RolloutAssessment> {
    let verdicts = instances
        .iter()
        .map(|instance| evaluate_instance(instance, target_arn, now))
        .collect::<ReadinessResult<Vec<_>>>()?;

    Ok(RolloutAssessment {
        ready: verdicts.iter().filter(|v| v.is_ready()).count(),
        expected: expected_replicas,
        verdicts,
    })
}

pub fn count_ready(
    instances: &[TaskInstance],
    target_arn: &str,
    now: DateTime<Utc>,
) -> ReadinessResult<usize> {
    Ok(assess_rollout(instances, target_arn, 0, now)?.ready)
}

pub fn is_rollout_complete(
    instances: &[TaskInstance],
    target_arn: &str,
    expected_replicas: usize,
    now: DateTime<Utc>,
) -> ReadinessResult<bool> {
    Ok(assess_rollout(instances, target_arn, expected_replicas, now)?.is_complete())
}
