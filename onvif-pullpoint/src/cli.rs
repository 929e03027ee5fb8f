//! Command line parsing and settings resolution

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use onvif_api::Credentials;
use onvif_events::{logging, PollerConfig};
use std::time::Duration;

/// ONVIF pull point event subscriber
///
/// Connects to a device, subscribes to its event service and writes every
/// pulled notification to stdout as one JSON object per line.
#[derive(Parser, Debug)]
#[command(name = "onvif-pullpoint")]
#[command(version, about = "Log ONVIF device events as JSON lines")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Subscribe to device events until interrupted
    Subscribe {
        /// Connection settings as JSON: {"host", "port", "username", "password"}
        config: String,

        #[command(flatten)]
        options: PollOptions,
    },
}

/// Tuning for the polling loop
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Seconds the device may hold a pull open
    #[arg(long, default_value = "10")]
    pub pull_timeout: u64,

    /// Maximum notifications per pull
    #[arg(long, default_value = "10")]
    pub message_limit: u32,

    /// Seconds to wait between pulls
    #[arg(long, default_value = "1")]
    pub poll_interval: u64,

    /// Seconds to wait before re-creating a failed subscription
    #[arg(long, default_value = "5")]
    pub retry_delay: u64,

    /// Requested subscription lifetime in seconds
    #[arg(long, default_value = "3600")]
    pub lifetime: u64,

    /// Diagnostic filter on stderr: a level such as `debug`, or a directive
    /// such as `soap_client=trace`
    #[arg(long)]
    pub log_level: Option<String>,
}

impl PollOptions {
    /// Override with environment variables if present
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ONVIF_PULL_TIMEOUT") {
            self.pull_timeout = value
                .parse()
                .context("Invalid ONVIF_PULL_TIMEOUT environment variable")?;
        }

        if let Some(value) = lookup("ONVIF_MESSAGE_LIMIT") {
            self.message_limit = value
                .parse()
                .context("Invalid ONVIF_MESSAGE_LIMIT environment variable")?;
        }

        if let Some(value) = lookup("ONVIF_POLL_INTERVAL") {
            self.poll_interval = value
                .parse()
                .context("Invalid ONVIF_POLL_INTERVAL environment variable")?;
        }

        if let Some(value) = lookup("ONVIF_RETRY_DELAY") {
            self.retry_delay = value
                .parse()
                .context("Invalid ONVIF_RETRY_DELAY environment variable")?;
        }

        if let Some(value) = lookup("ONVIF_SUBSCRIPTION_LIFETIME") {
            self.lifetime = value
                .parse()
                .context("Invalid ONVIF_SUBSCRIPTION_LIFETIME environment variable")?;
        }

        if let Some(value) = lookup("ONVIF_LOG_LEVEL") {
            self.log_level = Some(value);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.log_level {
            logging::validate_filter(level)
                .with_context(|| format!("Invalid log level '{}'", level))?;
        }

        self.poller_config().validate()?;
        Ok(())
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig::new()
            .with_pull_timeout(Duration::from_secs(self.pull_timeout))
            .with_message_limit(self.message_limit)
            .with_poll_interval(Duration::from_secs(self.poll_interval))
            .with_retry_delay(Duration::from_secs(self.retry_delay))
            .with_subscription_lifetime(Duration::from_secs(self.lifetime))
    }
}

/// Everything a subscribe run needs, resolved before any network activity
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub poller: PollerConfig,
    pub log_level: Option<String>,
}

impl Settings {
    pub fn resolve<F>(config: &str, mut options: PollOptions, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_json(config)?;

        options.apply_env(lookup)?;
        options.validate()?;

        Ok(Self {
            credentials,
            poller: options.poller_config(),
            log_level: options.log_level,
        })
    }
}
