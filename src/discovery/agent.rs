use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::context::AgentContext;
use crate::event::cancellation::CancellationMessage;
use crate::event::channel::EventConsumer;
use crate::model::{App, Snapshot};
use crate::transport::operations;
use crate::utils::thread_context::NotStartedThreadContext;

const THREAD_NAME: &str = "eureka-discovery";

/// Builds the (not-yet-started) discovery fetch loop thread context.
pub fn build(
    ctx: Arc<dyn AgentContext>,
    fetch_interval: Duration,
) -> NotStartedThreadContext<impl FnOnce(EventConsumer<CancellationMessage>) + Send + 'static, ()> {
    NotStartedThreadContext::new(THREAD_NAME, move |stop_consumer| loop {
        fetch_cycle(ctx.as_ref());
        if stop_consumer.is_cancelled(fetch_interval) {
            break;
        }
    })
}

/// One multi-zone fetch cycle: dispatch `QueryApps` to every configured zone in parallel,
/// rendezvous on all results, annotate, and install a single new [`Snapshot`].
pub fn fetch_cycle(ctx: &dyn AgentContext) {
    let config = ctx.config();
    if !config.client.discovery_enabled {
        return;
    }

    let region = config.client.region.clone();
    let zones: Vec<(String, crate::model::Endpoint)> = config
        .client
        .zones_in_region
        .iter()
        .filter_map(|zone| {
            config
                .client
                .endpoint_for(zone)
                .map(|endpoint| (zone.clone(), endpoint.clone()))
        })
        .collect();

    let expected = zones.len();
    let (result_tx, result_rx) = crossbeam::channel::bounded::<(String, Vec<App>)>(expected.max(1));
    let transport = ctx.transport().clone();

    let handles: Vec<_> = zones
        .into_iter()
        .map(|(zone, endpoint)| {
            let tx = result_tx.clone();
            let transport = transport.clone();
            let region = region.clone();
            std::thread::spawn(move || {
                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    operations::query_apps(&transport, &endpoint)
                }));
                let apps = match outcome {
                    Ok(Ok(apps)) => annotate(apps, &region, &zone),
                    Ok(Err(err)) => {
                        warn!(%zone, %err, "zone fetch failed, contributing an empty app list");
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(%zone, "zone fetch worker panicked, contributing an empty app list");
                        Vec::new()
                    }
                };
                let _ = tx.send((zone, apps));
            })
        })
        .collect();
    drop(result_tx);

    let mut builder = Snapshot::builder();
    for _ in 0..expected {
        if let Ok((zone, apps)) = result_rx.recv() {
            builder = builder.insert(zone, apps);
        }
    }
    for handle in handles {
        let _ = handle.join();
    }

    ctx.publish_snapshot(builder.build());
}

fn annotate(apps: Vec<App>, region: &str, zone: &str) -> Vec<App> {
    apps.into_iter()
        .map(|mut app| {
            app.region = region.to_string();
            app.zone = zone.to_string();
            for instance in &mut app.instances {
                instance.region = region.to_string();
                instance.zone = zone.to_string();
            }
            app
        })
        .collect()
}
