//! Scripted collaborators for driving the poller without a device

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use onvif_api::{
    ApiError, EventProperties, NotificationRecord, PullResult, SoapFault, SubscriptionHandle,
};
use onvif_events::{EventSource, ShutdownSignal, Sleeper};

/// A call observed by [`ScriptedSource`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Describe,
    Create(Duration),
    Pull {
        address: String,
        timeout: Duration,
        limit: u32,
    },
}

/// Replays queued results in order
///
/// When the pull script runs out the source triggers shutdown and reports
/// an empty pull, which ends the run the same way an interrupt would.
pub struct ScriptedSource {
    properties: RefCell<Option<Result<EventProperties, ApiError>>>,
    creations: RefCell<VecDeque<Result<SubscriptionHandle, ApiError>>>,
    pulls: RefCell<VecDeque<Result<PullResult, ApiError>>>,
    calls: RefCell<Vec<Call>>,
    interrupt_on: Option<usize>,
    shutdown: ShutdownSignal,
}

impl ScriptedSource {
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self {
            properties: RefCell::new(Some(Ok(properties()))),
            creations: RefCell::new(VecDeque::new()),
            pulls: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
            interrupt_on: None,
            shutdown,
        }
    }

    pub fn with_properties(self, result: Result<EventProperties, ApiError>) -> Self {
        *self.properties.borrow_mut() = Some(result);
        self
    }

    pub fn then_create(self, result: Result<SubscriptionHandle, ApiError>) -> Self {
        self.creations.borrow_mut().push_back(result);
        self
    }

    pub fn then_pull(self, result: Result<PullResult, ApiError>) -> Self {
        self.pulls.borrow_mut().push_back(result);
        self
    }

    /// Trigger shutdown while the call at `index` is in flight
    pub fn interrupt_on_call(mut self, index: usize) -> Self {
        self.interrupt_on = Some(index);
        self
    }

    fn observe(&self, call: Call) {
        let mut calls = self.calls.borrow_mut();
        if self.interrupt_on == Some(calls.len()) {
            self.shutdown.trigger();
        }
        calls.push(call);
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn pulled_addresses(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Pull { address, .. } => Some(address.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn creations(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Create(_)))
            .count()
    }
}

impl EventSource for ScriptedSource {
    fn describe_event_properties(&self) -> Result<EventProperties, ApiError> {
        self.observe(Call::Describe);
        self.properties
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Err(ApiError::DeviceError("properties already described".to_string())))
    }

    fn create_subscription(&self, requested_lifetime: Duration) -> Result<SubscriptionHandle, ApiError> {
        self.observe(Call::Create(requested_lifetime));
        self.creations
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::SubscriptionError("creation script exhausted".to_string())))
    }

    fn pull(
        &self,
        handle: &SubscriptionHandle,
        timeout: Duration,
        message_limit: u32,
    ) -> Result<PullResult, ApiError> {
        self.observe(Call::Pull {
            address: handle.address().to_string(),
            timeout,
            limit: message_limit,
        });
        match self.pulls.borrow_mut().pop_front() {
            Some(result) => result,
            None => {
                self.shutdown.trigger();
                Ok(PullResult::Empty)
            }
        }
    }
}

/// Records requested waits without sleeping
#[derive(Default)]
pub struct RecordingSleeper {
    waits: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration, _shutdown: &ShutdownSignal) {
        self.waits.borrow_mut().push(duration);
    }
}

pub fn properties() -> EventProperties {
    EventProperties {
        topic_namespace_locations: vec![
            "http://www.onvif.org/onvif/ver10/topics/topicns.xml".to_string(),
        ],
        fixed_topic_set: true,
        ..Default::default()
    }
}

pub fn handle(index: u32) -> SubscriptionHandle {
    SubscriptionHandle::new(format!("http://192.0.2.10/onvif/Subscription?Idx={}", index))
}

pub fn record(topic: &str, state: &str) -> NotificationRecord {
    let mut record = NotificationRecord {
        topic: topic.to_string(),
        ..Default::default()
    };
    record.data.insert("State".to_string(), state.to_string());
    record
}

pub fn batch(records: Vec<NotificationRecord>) -> PullResult {
    PullResult::from_notifications(records)
}

pub fn transport_error() -> ApiError {
    ApiError::NetworkError("connection reset by peer".to_string())
}

pub fn fault(reason: &str) -> ApiError {
    ApiError::SoapFault(SoapFault {
        code: "env:Receiver".to_string(),
        subcode: None,
        reason: reason.to_string(),
    })
}
