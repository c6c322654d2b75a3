use std::sync::Arc;
use std::time::Duration;

use crate::context::AgentContext;
use crate::event::cancellation::CancellationMessage;
use crate::event::channel::EventConsumer;
use crate::utils::thread_context::NotStartedThreadContext;

use super::agent::RegistrationAgent;

const THREAD_NAME: &str = "eureka-heartbeat";

/// Builds the (not-yet-started) heartbeat loop thread context.
///
/// The first tick fires immediately after the loop starts; every following tick waits
/// `renewal_interval` from the moment the previous tick finished, so the cadence is fixed-rate
/// rather than re-armed from wall-clock "now" on every send.
pub fn build(
    ctx: Arc<dyn AgentContext>,
    agent: Arc<RegistrationAgent>,
    renewal_interval: Duration,
) -> NotStartedThreadContext<impl FnOnce(EventConsumer<CancellationMessage>) + Send + 'static, ()> {
    NotStartedThreadContext::new(THREAD_NAME, move |stop_consumer| loop {
        agent.tick_heartbeat(ctx.as_ref());
        if stop_consumer.is_cancelled(renewal_interval) {
            break;
        }
    })
}
