use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::backoff::{ReconnectPolicy, RetryDecision};
use super::state::{ConnectionState, ConnectionStatus};
use super::transport::{Connector, EventStream};
use crate::notifications::NotificationDispatcher;
use crate::session::Credential;

/// Default bound on a single connect attempt
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

struct Shared {
    status: watch::Sender<ConnectionStatus>,
    reconnect_attempts: AtomicU32,
    gave_up: AtomicBool,
    /// Cancelled when the worker exits, or up front if it never runs
    finished: CancellationToken,
}

impl Shared {
    fn set_status(&self, status: ConnectionStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            tracing::debug!(from = %previous, to = %status, "Channel status changed");
        }
    }
}

/// Best-effort live connection to the notification push endpoint
///
/// At most one connection attempt is in flight per channel. Failures and
/// server-side closes feed the same [`ReconnectPolicy`]; once it gives up the
/// channel stays `Disconnected` until a new channel is built. No error ever
/// reaches the owner: the channel only degrades.
///
/// # Example
/// ```ignore
/// let channel = NotificationChannel::new(connector, dispatcher, credential)
///     .with_policy(settings.reconnect.to_policy());
/// channel.connect();
/// // ...
/// channel.teardown().await;
/// ```
pub struct NotificationChannel {
    connector: Arc<dyn Connector>,
    dispatcher: Arc<NotificationDispatcher>,
    credential: Option<Credential>,
    policy: ReconnectPolicy,
    connect_timeout: Duration,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    started: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationChannel {
    pub fn new(
        connector: Arc<dyn Connector>,
        dispatcher: Arc<NotificationDispatcher>,
        credential: Option<Credential>,
    ) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        let finished = CancellationToken::new();
        if credential.is_none() {
            finished.cancel();
        }

        Self {
            connector,
            dispatcher,
            credential,
            policy: ReconnectPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            shared: Arc::new(Shared {
                status,
                reconnect_attempts: AtomicU32::new(0),
                gave_up: AtomicBool::new(false),
                finished,
            }),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Start the connection loop
    ///
    /// Returns `false` without doing anything when there is no credential,
    /// the channel was torn down, the loop is already running, or the caller
    /// is not inside a Tokio runtime.
    pub fn connect(&self) -> bool {
        let Some(credential) = self.credential.clone() else {
            tracing::debug!("No session credential, notification channel stays disconnected");
            return false;
        };
        if self.cancel.is_cancelled() {
            return false;
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "Notification channel needs a Tokio runtime to connect");
                return false;
            }
        };
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }

        let worker = Worker {
            connector: Arc::clone(&self.connector),
            dispatcher: Arc::clone(&self.dispatcher),
            credential,
            policy: self.policy,
            connect_timeout: self.connect_timeout,
            shared: Arc::clone(&self.shared),
            cancel: self.cancel.clone(),
        };
        let handle = runtime.spawn(worker.run());
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    /// Close the active connection and cancel any pending retry
    pub async fn teardown(&self) {
        self.cancel.cancel();
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Notification channel task ended abnormally");
            }
        }
        self.shared.finished.cancel();
        self.shared.set_status(ConnectionStatus::Disconnected);
    }

    /// Resolves once the channel will make no further connection attempts
    pub async fn stopped(&self) {
        self.shared.finished.cancelled().await;
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.shared.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status.subscribe()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.reconnect_attempts.load(Ordering::SeqCst)
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn gave_up(&self) -> bool {
        self.shared.gave_up.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState {
            status: self.status(),
            reconnect_attempts: self.reconnect_attempts(),
            has_credential: self.has_credential(),
            gave_up: self.gave_up(),
        }
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owned state of the background connection loop
struct Worker {
    connector: Arc<dyn Connector>,
    dispatcher: Arc<NotificationDispatcher>,
    credential: Credential,
    policy: ReconnectPolicy,
    connect_timeout: Duration,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self) {
        let _finished = self.shared.finished.clone().drop_guard();
        let endpoint = self.connector.endpoint();

        while !self.cancel.is_cancelled() {
            self.shared.set_status(ConnectionStatus::Connecting);
            tracing::debug!(endpoint = %endpoint, "Connecting notification channel");

            let attempt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                result = tokio::time::timeout(
                    self.connect_timeout,
                    self.connector.connect(&self.credential),
                ) => result,
            };

            let auth_failure = match attempt {
                Ok(Ok(mut stream)) => {
                    self.shared.reconnect_attempts.store(0, Ordering::SeqCst);
                    self.shared.set_status(ConnectionStatus::Connected);
                    tracing::info!(endpoint = %endpoint, "Notification channel connected");

                    let cancelled = self.pump(&mut stream).await;
                    self.shared.set_status(ConnectionStatus::Disconnected);
                    if cancelled {
                        stream.close().await;
                        break;
                    }
                    false
                }
                Ok(Err(e)) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Notification channel connect failed");
                    e.is_auth_failure()
                }
                Err(_) => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        timeout_ms = self.connect_timeout.as_millis() as u64,
                        "Notification channel connect timed out"
                    );
                    false
                }
            };
            self.shared.set_status(ConnectionStatus::Disconnected);

            let attempts = self.shared.reconnect_attempts.load(Ordering::SeqCst);
            match self.policy.decide(attempts, auth_failure) {
                RetryDecision::GiveUp(reason) => {
                    self.shared.gave_up.store(true, Ordering::SeqCst);
                    tracing::warn!(
                        attempts,
                        reason = ?reason,
                        "Giving up on notification channel"
                    );
                    break;
                }
                RetryDecision::RetryAfter(delay) => {
                    self.shared
                        .reconnect_attempts
                        .store(attempts + 1, Ordering::SeqCst);
                    tracing::info!(
                        attempt = attempts + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Scheduling notification channel reconnect"
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        tracing::debug!(endpoint = %endpoint, "Notification channel loop stopped");
    }

    /// Forward events until the stream ends; `true` when cancelled
    async fn pump(&self, stream: &mut Box<dyn EventStream>) -> bool {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return true,
                next = stream.next_event() => next,
            };

            match next {
                Some(Ok(event)) => self.dispatcher.dispatch(event).await,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Notification channel dropped");
                    return false;
                }
                None => {
                    tracing::info!("Notification channel closed by server");
                    return false;
                }
            }
        }
    }
}
