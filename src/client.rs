use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::config::{ClientConfig, Config, InstanceConfig, Resolver};
use crate::context::AgentContext;
use crate::discovery;
use crate::error::ClientError;
use crate::event::cancellation::CancellationMessage;
use crate::event::channel::EventConsumer;
use crate::model::{App, Instance, Snapshot};
use crate::query::QueryEngine;
use crate::registration::{heartbeat, LifecycleState, RegistrationAgent, RegistrationError};
use crate::transport::Transport;
use crate::utils::thread_context::{NotStartedThreadContext, StartedThreadContext};

const WATCHDOG_THREAD_NAME: &str = "eureka-scope-watchdog";
const WATCHDOG_POLL_INTERVAL: Duration = Duration::from_millis(200);

enum ClientState {
    NotStarted,
    Running {
        heartbeat: StartedThreadContext,
        discovery: StartedThreadContext,
        watchdog: Option<StartedThreadContext>,
    },
    Stopped,
}

/// The public handle: resolves configuration once, then owns the registration agent, the
/// transport, and the discovery snapshot for as long as the client runs.
///
/// Background loops never own a `Client` back — they hold an `Arc<dyn AgentContext>` clone of
/// it instead, which is how the Client avoids an ownership cycle with the threads it spawns.
pub struct Client {
    config: Arc<Config>,
    transport: Transport,
    snapshot: ArcSwap<Snapshot>,
    registration: Arc<RegistrationAgent>,
    state: Mutex<ClientState>,
}

impl AgentContext for Client {
    fn config(&self) -> &Config {
        &self.config
    }

    fn transport(&self) -> &Transport {
        &self.transport
    }

    fn current_snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    fn publish_snapshot(&self, snapshot: Snapshot) {
        self.snapshot.store(Arc::new(snapshot));
    }
}

impl Client {
    /// Resolves `instance`/`client` into a frozen [`Config`] and builds a not-yet-started
    /// Client around it. Resolution happens exactly once, here.
    pub fn new(instance: InstanceConfig, client: ClientConfig) -> Result<Arc<Self>, ClientError> {
        let resolver = Resolver::new();
        let config = resolver.resolve(instance, client)?;
        let registration = Arc::new(RegistrationAgent::new(&config));
        Ok(Arc::new(Self {
            config,
            transport: Transport::new(),
            snapshot: ArcSwap::from_pointee(Snapshot::empty()),
            registration,
            state: Mutex::new(ClientState::NotStarted),
        }))
    }

    /// Returns the instance this client would (re-)register, with its current status baked in.
    pub fn current_instance(&self) -> Instance {
        self.registration.current_instance()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.registration.lifecycle()
    }

    /// Derives a fresh root scope, issues the synchronous initial register, then launches the
    /// heartbeat and discovery loops. Fails `AlreadyRunning` if already running.
    pub fn start(self: &Arc<Self>) -> Result<(), ClientError> {
        self.start_under(None)
    }

    /// As [`Client::start`], but the returned scope additionally cancels (via `force_stop`
    /// semantics) when `parent` is cancelled, letting a caller's own cancellation scope own
    /// this client's lifetime too.
    pub fn start_under(
        self: &Arc<Self>,
        parent: Option<EventConsumer<CancellationMessage>>,
    ) -> Result<(), ClientError> {
        let mut guard = self.state.lock().expect("client state poisoned");
        if !matches!(*guard, ClientState::NotStarted) {
            return Err(ClientError::AlreadyRunning);
        }

        match self.registration.register(self.as_ref()) {
            Ok(()) | Err(RegistrationError::FeatureDisabled) => {}
            Err(err) => return Err(err.into()),
        }

        let ctx: Arc<dyn AgentContext> = self.clone();
        let heartbeat_loop = heartbeat::build(
            ctx.clone(),
            Arc::clone(&self.registration),
            Duration::from_secs(u64::from(
                self.config.instance.lease_renewal_interval_in_seconds,
            )),
        )
        .start();
        let discovery_loop =
            discovery::agent::build(ctx, self.config.client.registry_fetch_interval).start();
        let watchdog = parent.map(|parent_consumer| self.spawn_watchdog(parent_consumer));

        *guard = ClientState::Running {
            heartbeat: heartbeat_loop,
            discovery: discovery_loop,
            watchdog,
        };
        Ok(())
    }

    fn spawn_watchdog(
        self: &Arc<Self>,
        parent: EventConsumer<CancellationMessage>,
    ) -> StartedThreadContext {
        let client = Arc::clone(self);
        NotStartedThreadContext::new(WATCHDOG_THREAD_NAME, move |stop_consumer| loop {
            if parent.is_cancelled(WATCHDOG_POLL_INTERVAL) {
                client.force_stop();
                break;
            }
            if stop_consumer.is_cancelled(Duration::ZERO) {
                break;
            }
        })
        .start()
    }

    /// Issues `unregister`; on success cancels the scope (stopping both loops) and returns. On
    /// failure the scope is left alive so the caller can retry or fall back to `force_stop`.
    pub fn stop(&self) -> Result<(), ClientError> {
        let mut guard = self.state.lock().expect("client state poisoned");
        match std::mem::replace(&mut *guard, ClientState::NotStarted) {
            ClientState::NotStarted => {
                *guard = ClientState::NotStarted;
                Err(ClientError::NotStarted)
            }
            ClientState::Stopped => {
                *guard = ClientState::Stopped;
                Err(ClientError::AlreadyStopped)
            }
            ClientState::Running {
                heartbeat,
                discovery,
                watchdog,
            } => match self.registration.unregister(self) {
                Ok(()) => {
                    let _ = heartbeat.stop_blocking();
                    let _ = discovery.stop_blocking();
                    if let Some(watchdog) = watchdog {
                        let _ = watchdog.stop_blocking();
                    }
                    *guard = ClientState::Stopped;
                    Ok(())
                }
                Err(err) => {
                    *guard = ClientState::Running {
                        heartbeat,
                        discovery,
                        watchdog,
                    };
                    Err(err.into())
                }
            },
        }
    }

    /// Best-effort `unregister` (the result is ignored), then unconditionally cancels the
    /// scope. A no-op if the client was never started.
    pub fn force_stop(&self) {
        let mut guard = self.state.lock().expect("client state poisoned");
        match std::mem::replace(&mut *guard, ClientState::NotStarted) {
            ClientState::Running {
                heartbeat,
                discovery,
                watchdog,
            } => {
                let _ = self.registration.unregister(self);
                let _ = heartbeat.stop_blocking();
                let _ = discovery.stop_blocking();
                if let Some(watchdog) = watchdog {
                    let _ = watchdog.stop_blocking();
                }
                *guard = ClientState::Stopped;
            }
            other => *guard = other,
        }
    }

    pub fn change_status(&self, status: &str) -> Result<(), ClientError> {
        self.ensure_running()?;
        Ok(self.registration.change_status(self, status)?)
    }

    pub fn change_metadata(&self, updates: HashMap<String, String>) -> Result<(), ClientError> {
        self.ensure_running()?;
        Ok(self.registration.change_metadata(self, updates)?)
    }

    pub fn access_app(&self, name: &str) -> Result<App, ClientError> {
        self.ensure_running()?;
        Ok(QueryEngine::access_app(self, name)?)
    }

    pub fn access_apps_by_vip(&self, vip: &str) -> Result<Vec<App>, ClientError> {
        self.ensure_running()?;
        Ok(QueryEngine::access_apps_by_vip(self, vip)?)
    }

    pub fn access_apps_by_svip(&self, svip: &str) -> Result<Vec<App>, ClientError> {
        self.ensure_running()?;
        Ok(QueryEngine::access_apps_by_svip(self, svip)?)
    }

    pub fn access_instances_by_vip(&self, vip: &str) -> Result<Vec<Instance>, ClientError> {
        self.ensure_running()?;
        Ok(QueryEngine::access_instances_by_vip(self, vip)?)
    }

    pub fn access_instances_by_svip(&self, svip: &str) -> Result<Vec<Instance>, ClientError> {
        self.ensure_running()?;
        Ok(QueryEngine::access_instances_by_svip(self, svip)?)
    }

    pub fn access_instance_by_vip(&self, vip: &str) -> Result<Instance, ClientError> {
        self.ensure_running()?;
        Ok(QueryEngine::access_instance_by_vip(self, vip)?)
    }

    pub fn access_instance_by_svip(&self, svip: &str) -> Result<Instance, ClientError> {
        self.ensure_running()?;
        Ok(QueryEngine::access_instance_by_svip(self, svip)?)
    }

    fn ensure_running(&self) -> Result<(), ClientError> {
        match *self.state.lock().expect("client state poisoned") {
            ClientState::NotStarted => Err(ClientError::NotStarted),
            ClientState::Stopped => Err(ClientError::AlreadyStopped),
            ClientState::Running { .. } => Ok(()),
        }
    }
}
