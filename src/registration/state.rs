use crate::model::Status;

/// The registration agent's lifecycle, a superset of the wire [`Status`] enum: it adds
/// `Unregistered`, a local-only state the registry never sees (there is no wire representation
/// for "this instance no longer exists").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Up,
    Down,
    OutOfService,
    Unknown,
    Unregistered,
}

impl LifecycleState {
    pub fn initial(instance_enabled_on_it: bool) -> Self {
        if instance_enabled_on_it {
            LifecycleState::Up
        } else {
            LifecycleState::Starting
        }
    }

    /// Whether the heartbeat loop should fire while in this state: true iff the state is `Up`.
    pub fn heartbeat_enabled(&self) -> bool {
        matches!(self, LifecycleState::Up)
    }
}

impl From<Status> for LifecycleState {
    fn from(status: Status) -> Self {
        match status {
            Status::Up => LifecycleState::Up,
            Status::Down => LifecycleState::Down,
            Status::Starting => LifecycleState::Starting,
            Status::OutOfService => LifecycleState::OutOfService,
            Status::Unknown => LifecycleState::Unknown,
        }
    }
}
