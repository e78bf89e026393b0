use serde::{Deserialize, Serialize};

use super::name::EventName;
use crate::config::Config;
use crate::location::Location;
use crate::status::Status;

/// An event plus its payload, as delivered to listeners.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: EventName,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(name: EventName, payload: EventPayload) -> Self {
        Event { name, payload }
    }
}

/// Payloads carried by panel events: either the full state snapshot or an
/// event-specific subject.
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// Full `{config, location, status}` snapshot.
    Snapshot(StateSnapshot),
    /// A web path (update/publish/delete subjects).
    Path(String),
    /// A plugin id (`pluginused`).
    Plugin(String),
    /// An environment-switch pair (`envswitched`).
    Switch(EnvSwitch),
    None,
}

impl EventPayload {
    /// The telemetry `target` for this payload, when it has one.
    pub fn target(&self) -> Option<String> {
        match self {
            EventPayload::Snapshot(snapshot) => Some(snapshot.location.href()),
            EventPayload::Path(path) => Some(path.clone()),
            EventPayload::Plugin(id) => Some(id.clone()),
            EventPayload::Switch(switch) => Some(switch.target_url.clone()),
            EventPayload::None => None,
        }
    }
}

/// The immutable state triple listeners see on `statusfetched` and
/// lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub config: Config,
    pub location: Location,
    pub status: Status,
}

/// Subject of an `envswitched` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvSwitch {
    pub source_url: String,
    pub target_url: String,
}

/// Normalized record forwarded to the telemetry sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Event name, e.g. `statusfetched`.
    pub checkpoint: String,
    /// Current location at fire time.
    pub source: String,
    /// Event-specific subject, when the payload has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}
