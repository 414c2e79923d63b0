use super::types::RolloutState;

pub fn valid_state_transition(src: &RolloutState, dst: &RolloutState) -> bool {
    let allowed: &[RolloutState] = match src {
        RolloutState::Pending => &[RolloutState::Registered, RolloutState::Failed],
        RolloutState::Registered => &[RolloutState::ServiceUpdated, RolloutState::Failed],
        RolloutState::ServiceUpdated => &[RolloutState::Converging, RolloutState::Failed],
        RolloutState::Converging => &[
            RolloutState::Converging,
            RolloutState::Complete,
            RolloutState::Failed,
        ],
        RolloutState::Complete | RolloutState::Failed => &[],
    };

    allowed.contains(dst)
}
