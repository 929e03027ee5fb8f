//! High-level ONVIF API for device event subscriptions
//!
//! This crate provides a type-safe, trait-based API for the small part of
//! ONVIF needed to consume events through pull point subscriptions. It uses
//! the private `soap-client` crate for low-level SOAP communication.
//!
//! # Device Sessions
//!
//! ```rust,ignore
//! use onvif_api::{Credentials, DeviceSession};
//! use std::time::Duration;
//!
//! let credentials = Credentials::from_json(
//!     r#"{"host": "192.168.1.64", "port": 80, "username": "admin", "password": "secret"}"#,
//! )?;
//! let session = DeviceSession::connect(&credentials)?;
//! let handle = session.create_subscription(Duration::from_secs(3600))?;
//! let result = session.pull(&handle, Duration::from_secs(10), 10)?;
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod operations;
pub mod service;
pub mod session;
pub mod subscription;
pub mod value;
pub mod xsd;

pub use client::OnvifClient;
pub use error::{ApiError, FailureKind, Result};
pub use operation::OnvifOperation;
pub use operations::events::{EventProperties, NotificationRecord};
pub use service::{Service, ServiceInfo};
pub use session::{Credentials, DeviceSession};
pub use subscription::{PullResult, SubscriptionHandle};
pub use value::{ToValue, Value};

pub use soap_client::{SoapClient, SoapFault};
