//! The subscription polling loop
//!
//! A [`SubscriptionPoller`] owns one pull point subscription at a time and
//! moves through these states:
//!
//! ```text
//! Initializing -> Running <-> Recovering -> Terminated
//!                     \           /
//!                      -> Stopped <-
//! ```
//!
//! A failed pull is logged and answered by re-creating the subscription
//! once. A failed re-creation ends the session. Stopping is cooperative,
//! through a [`ShutdownSignal`] checked before each device call and during
//! sleeps. A call that fails once shutdown has been requested is not
//! reported; the run stops as if it had succeeded.

use onvif_api::{ApiError, PullResult, SubscriptionHandle, ToValue, Value};
use tracing::{debug, warn};

use crate::config::PollerConfig;
use crate::error::{PollerError, Result};
use crate::shutdown::{ShutdownSignal, Sleeper, ThreadSleeper};
use crate::sink::LogSink;
use crate::source::EventSource;

/// Lifecycle state of a poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Initializing,
    Running,
    Recovering,
    /// Ended by an unrecoverable failure
    Terminated,
    /// Ended by a shutdown request
    Stopped,
}

/// Keeps a pull point subscription alive and reports what it delivers
pub struct SubscriptionPoller<S, L, Z = ThreadSleeper> {
    source: S,
    sink: L,
    sleeper: Z,
    config: PollerConfig,
    shutdown: ShutdownSignal,
    state: PollerState,
    handle: Option<SubscriptionHandle>,
    renewals: u64,
}

impl<S: EventSource, L: LogSink> SubscriptionPoller<S, L, ThreadSleeper> {
    /// Create a poller that waits on the current thread
    pub fn new(source: S, sink: L, config: PollerConfig) -> Self {
        Self::with_sleeper(source, sink, config, ThreadSleeper)
    }
}

impl<S: EventSource, L: LogSink, Z: Sleeper> SubscriptionPoller<S, L, Z> {
    pub fn with_sleeper(source: S, sink: L, config: PollerConfig, sleeper: Z) -> Self {
        Self {
            source,
            sink,
            sleeper,
            config,
            shutdown: ShutdownSignal::new(),
            state: PollerState::Initializing,
            handle: None,
            renewals: 0,
        }
    }

    /// Use an externally owned shutdown signal
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// A signal that stops this poller when triggered
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// The subscription currently being pulled from
    pub fn handle(&self) -> Option<&SubscriptionHandle> {
        self.handle.as_ref()
    }

    /// Number of successful renewals so far
    pub fn renewals(&self) -> u64 {
        self.renewals
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Run until stopped or until a failure cannot be recovered from
    ///
    /// Returns `Ok(())` only when the shutdown signal ended the session.
    pub fn run(&mut self) -> Result<()> {
        let result = self.drive();
        self.state = match result {
            Ok(()) => PollerState::Stopped,
            Err(_) => PollerState::Terminated,
        };
        result
    }

    fn drive(&mut self) -> Result<()> {
        self.config.validate()?;
        self.initialize()?;

        while !self.shutdown.is_triggered() {
            match self.state {
                PollerState::Running => self.poll_cycle(),
                PollerState::Recovering => self.recover()?,
                PollerState::Initializing | PollerState::Terminated | PollerState::Stopped => break,
            }
        }

        self.sink.info("Subscription stopped", None);
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        self.state = PollerState::Initializing;
        if self.shutdown.is_triggered() {
            return Ok(());
        }

        let properties = match self.source.describe_event_properties() {
            Ok(properties) => properties,
            Err(e) if self.interrupted(&e) => return Ok(()),
            Err(e) => return Err(PollerError::Properties(e)),
        };
        self.sink.debug("Event properties", Some(properties.to_value()));

        if self.shutdown.is_triggered() {
            return Ok(());
        }

        let handle = match self.source.create_subscription(self.config.subscription_lifetime) {
            Ok(handle) => handle,
            Err(e) if self.interrupted(&e) => return Ok(()),
            Err(e) => return Err(PollerError::CreateSubscription(e)),
        };
        self.sink.info("Pull-point subscription created", Some(handle.to_value()));

        self.install(handle);
        Ok(())
    }

    fn poll_cycle(&mut self) {
        let Some(handle) = self.handle.as_ref() else {
            warn!("running without a subscription handle");
            self.state = PollerState::Recovering;
            return;
        };

        match self
            .source
            .pull(handle, self.config.pull_timeout, self.config.message_limit)
        {
            Ok(PullResult::Empty) => {
                self.sink.info("No messages", None);
                self.sleeper.sleep(self.config.poll_interval, &self.shutdown);
            }
            Ok(PullResult::MessageBatch(records)) => {
                self.sink.info(
                    &format!("Received {} messages", records.len()),
                    Some(records.as_slice().to_value()),
                );
                self.sleeper.sleep(self.config.poll_interval, &self.shutdown);
            }
            Err(e) if self.interrupted(&e) => {}
            Err(e) => {
                self.sink.error(&describe_pull_failure(&e), Some(failure_value(&e)));
                self.state = PollerState::Recovering;
            }
        }
    }

    fn recover(&mut self) -> Result<()> {
        self.sleeper.sleep(self.config.retry_delay, &self.shutdown);
        if self.shutdown.is_triggered() {
            return Ok(());
        }

        match self.source.create_subscription(self.config.subscription_lifetime) {
            Ok(handle) => {
                self.sink.info("Subscription renewed", Some(handle.to_value()));
                self.renewals += 1;
                self.install(handle);
                Ok(())
            }
            Err(e) if self.interrupted(&e) => Ok(()),
            Err(e) => {
                self.sink.error(
                    &format!("Failed to renew subscription: {}", e),
                    Some(failure_value(&e)),
                );
                self.state = PollerState::Terminated;
                Err(PollerError::Renewal(e))
            }
        }
    }

    /// A call that failed after shutdown was requested ends the run quietly
    fn interrupted(&self, error: &ApiError) -> bool {
        if self.shutdown.is_triggered() {
            debug!(%error, "call failed after shutdown was requested");
            return true;
        }
        false
    }

    // The previous handle is dropped here and never used again.
    fn install(&mut self, handle: SubscriptionHandle) {
        debug!(address = %handle.address(), "installing subscription handle");
        self.handle = Some(handle);
        self.state = PollerState::Running;
    }
}

fn describe_pull_failure(error: &ApiError) -> String {
    match error {
        ApiError::SoapFault(fault) => format!("SOAP fault: {}", fault),
        ApiError::NetworkError(message) => format!("Transport error: {}", message),
        other => format!("Error pulling messages: {}", other),
    }
}

fn failure_value(error: &ApiError) -> Value {
    let kind = match error.kind() {
        onvif_api::FailureKind::Fault => "fault",
        onvif_api::FailureKind::Transport => "transport",
        onvif_api::FailureKind::Other => "other",
    };
    Value::map().with("kind", kind).with("error", error.to_string())
}
