//! Status model and the shared slot map for a poll session

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::endpoint::Endpoint;

/// The observed state of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointState {
    Loading,
    Up,
    Down,
}

impl fmt::Display for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointState::Loading => write!(f, "Loading"),
            EndpointState::Up => write!(f, "Up"),
            EndpointState::Down => write!(f, "Down"),
        }
    }
}

/// Response details captured during a check, present only when the
/// response content could actually be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Complete status snapshot for one endpoint.
///
/// Every check produces a full replacement value; a status is never
/// partially mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub endpoint: Endpoint,
    pub state: EndpointState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub last_checked_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseData>,
}

impl EndpointStatus {
    /// Placeholder written into a slot while its check is in flight
    pub fn loading(endpoint: Endpoint, now_ms: u64) -> Self {
        Self {
            endpoint,
            state: EndpointState::Loading,
            response_time_ms: None,
            error: None,
            last_checked_epoch_ms: now_ms,
            response: None,
        }
    }
}

/// The ordered slot map of a poll session, keyed by endpoint URL.
///
/// A slot exists only once a cycle or a single refresh has touched its
/// endpoint; before that the endpoint is simply unknown to the session.
#[derive(Debug, Default)]
pub struct SessionState {
    slots: Vec<EndpointStatus>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every slot as a `Loading` placeholder, in the given order
    pub fn begin_cycle(&mut self, endpoints: &[Endpoint], now_ms: u64) {
        self.slots = endpoints
            .iter()
            .cloned()
            .map(|endpoint| EndpointStatus::loading(endpoint, now_ms))
            .collect();
    }

    /// Replace the slot matching the status's endpoint URL.
    ///
    /// Returns false (and drops the status) when no such slot exists, so a
    /// single refresh can never grow the slot map.
    pub fn update_slot(&mut self, status: EndpointStatus) -> bool {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.endpoint.url == status.endpoint.url)
        {
            *slot = status;
            true
        } else {
            false
        }
    }

    /// Drop every slot
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn get(&self, url: &str) -> Option<&EndpointStatus> {
        self.slots.iter().find(|s| s.endpoint.url == url)
    }

    pub fn slots(&self) -> &[EndpointStatus] {
        &self.slots
    }

    pub fn snapshot(&self) -> Vec<EndpointStatus> {
        self.slots.clone()
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SessionState>>;

pub fn new_state_handle() -> StateHandle {
    Arc::new(RwLock::new(SessionState::new()))
}

/// Milliseconds since the Unix epoch
pub(crate) fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
