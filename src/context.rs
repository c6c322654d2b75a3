use std::sync::Arc;

use crate::config::Config;
use crate::model::Snapshot;
use crate::transport::Transport;

/// What the registration and discovery agents need from the [`crate::client::Client`], named
/// narrowly enough to avoid a back-reference that would own the Client right back.
pub trait AgentContext: Send + Sync {
    fn config(&self) -> &Config;
    fn transport(&self) -> &Transport;
    fn current_snapshot(&self) -> Arc<Snapshot>;
    fn publish_snapshot(&self, snapshot: Snapshot);
}
