//! Configuration for the subscription poller

use std::time::Duration;

use crate::error::{PollerError, Result};

/// Configuration for the SubscriptionPoller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Lifetime requested when creating a subscription; the device may grant less
    /// Default: 1 hour
    pub subscription_lifetime: Duration,

    /// How long the device may hold a pull open waiting for messages
    /// Default: 10 seconds
    pub pull_timeout: Duration,

    /// Maximum notifications returned by one pull
    /// Default: 10
    pub message_limit: u32,

    /// Pause between successful pulls
    /// Default: 1 second
    pub poll_interval: Duration,

    /// Pause before re-creating a subscription after a pull failure
    /// Default: 5 seconds
    pub retry_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            subscription_lifetime: Duration::from_secs(3600),
            pull_timeout: Duration::from_secs(10),
            message_limit: 10,
            poll_interval: Duration::from_secs(1),
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl PollerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription_lifetime(mut self, lifetime: Duration) -> Self {
        self.subscription_lifetime = lifetime;
        self
    }

    pub fn with_pull_timeout(mut self, timeout: Duration) -> Self {
        self.pull_timeout = timeout;
        self
    }

    pub fn with_message_limit(mut self, limit: u32) -> Self {
        self.message_limit = limit;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.subscription_lifetime.is_zero() {
            return Err(PollerError::Configuration(
                "subscription_lifetime must be greater than 0".to_string(),
            ));
        }
        if self.pull_timeout.is_zero() {
            return Err(PollerError::Configuration(
                "pull_timeout must be greater than 0".to_string(),
            ));
        }
        if self.message_limit == 0 {
            return Err(PollerError::Configuration(
                "message_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
