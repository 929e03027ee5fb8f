//! Resilient pull point event polling for ONVIF devices
//!
//! This crate drives an [`EventSource`] (normally an
//! [`onvif_api::DeviceSession`]) in a sequential loop: it describes the
//! device's event properties, creates a pull point subscription, then pulls
//! notifications until told to stop. Every step is reported as a structured
//! [`LogRecord`] through an injectable [`LogSink`].
//!
//! # Example
//!
//! ```rust,ignore
//! use onvif_api::{Credentials, SoapClient};
//! use onvif_events::{connect, JsonLinesSink, PollerConfig, SubscriptionPoller};
//!
//! let sink = JsonLinesSink::stdout();
//! let credentials = Credentials::from_json(payload)?;
//! let session = connect(&credentials, SoapClient::new(), &sink)?;
//!
//! let mut poller = SubscriptionPoller::new(session, &sink, PollerConfig::default());
//! poller.run()?;
//! ```
//!
//! # Failure handling
//!
//! - Startup failures (properties, first subscription) are returned at once.
//! - A failed pull is logged, then the subscription is re-created once after
//!   [`PollerConfig::retry_delay`].
//! - A failed re-creation ends the run with [`PollerError::Renewal`].
//! - A call that fails after shutdown was requested is not an error; the
//!   run ends with `Ok(())`.

pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod shutdown;
pub mod sink;
pub mod source;

pub use config::PollerConfig;
pub use error::{PollerError, Result};
pub use poller::{PollerState, SubscriptionPoller};
pub use shutdown::{ShutdownSignal, Sleeper, ThreadSleeper};
pub use sink::{JsonLinesSink, Level, LogRecord, LogSink, MemorySink};
pub use source::{connect, EventSource};
