use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use super::{BackendHandle, ClientSettings, Connector};

/// Broadcast after every initialization attempt, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    pub initialized: bool,
}

/// Bounds how long a caller waits for the handle: `poll_interval * max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    poll_interval: Duration,
    max_attempts: u32,
}

impl ReadinessPolicy {
    pub fn new(poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            poll_interval,
            max_attempts,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn budget(&self) -> Duration {
        self.poll_interval.saturating_mul(self.max_attempts)
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), 50)
    }
}

/// Owns the one long-lived backend handle and announces when it exists.
///
/// The handle lives in a `watch` channel written at most once; waiters observe it
/// directly, so a late subscriber cannot miss an earlier announcement.
pub struct BackendInitializer {
    settings: ClientSettings,
    connector: Box<dyn Connector>,
    policy: ReadinessPolicy,
    handle: watch::Sender<Option<BackendHandle>>,
    events: broadcast::Sender<ReadyEvent>,
    init_lock: Mutex<()>,
}

impl BackendInitializer {
    pub fn new(settings: ClientSettings, connector: impl Connector + 'static, policy: ReadinessPolicy) -> Self {
        let (handle, _) = watch::channel(None);
        let (events, _) = broadcast::channel(16);
        Self {
            settings,
            connector: Box::new(connector),
            policy,
            handle,
            events,
            init_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> ReadinessPolicy {
        self.policy
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Builds the handle unless one already exists. Never panics; returns whether a
    /// handle is available afterwards.
    pub fn initialize(&self) -> bool {
        if self.handle.borrow().is_some() {
            return true;
        }

        let _guard = match self.init_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Initialization lock was poisoned! Recovering lock.");
                poisoned.into_inner()
            }
        };
        // Another caller may have finished while we waited for the lock.
        if self.handle.borrow().is_some() {
            return true;
        }

        let initialized = match self.connector.connect(&self.settings) {
            Ok(handle) => {
                self.handle.send_replace(Some(handle));
                log::info!("Backend client initialized for {}", self.settings.endpoint);
                true
            }
            Err(e) => {
                log::error!("Failed to initialize backend client: {}", e);
                false
            }
        };

        // Lagging or absent subscribers are fine; the watch channel is the source of truth.
        let _ = self.events.send(ReadyEvent { initialized });
        initialized
    }

    pub fn handle(&self) -> Option<BackendHandle> {
        self.handle.borrow().clone()
    }

    /// Existing handle, or the result of a single initialization attempt.
    pub fn get_handle(&self) -> Option<BackendHandle> {
        if let Some(handle) = self.handle() {
            return Some(handle);
        }
        if self.initialize() {
            self.handle()
        } else {
            None
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReadyEvent> {
        self.events.subscribe()
    }

    /// Resolves as soon as a handle exists, or to `None` once the policy budget is spent.
    pub async fn wait_until_ready(&self) -> Option<BackendHandle> {
        if let Some(handle) = self.handle() {
            return Some(handle);
        }

        let mut rx = self.handle.subscribe();
        let waited = tokio::time::timeout(self.policy.budget(), async {
            rx.wait_for(|handle| handle.is_some())
                .await
                .ok()
                .and_then(|handle| handle.clone())
        })
        .await;

        match waited {
            Ok(Some(handle)) => Some(handle),
            _ => {
                log::error!(
                    "Failed to initialize backend after {} attempts ({:?})",
                    self.policy.max_attempts(),
                    self.policy.budget()
                );
                None
            }
        }
    }
}
