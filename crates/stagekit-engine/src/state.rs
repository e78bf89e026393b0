use stagekit_types::{Config, EnvironmentKind, Location, StateSnapshot, Status};

use crate::resolver;

/// Immutable snapshot every predicate is evaluated against.
///
/// Predicates never see the controller's mutable session; they get this
/// value, so re-evaluation is referentially transparent and testable in
/// isolation.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub config: Config,
    pub location: Location,
    pub status: Status,
}

impl EngineState {
    pub fn new(config: Config, location: Location, status: Status) -> Self {
        EngineState {
            config,
            location,
            status,
        }
    }

    /// Environment classification of this snapshot.
    pub fn environment(&self) -> EnvironmentKind {
        resolver::classify(&self.config, &self.location)
    }

    /// Clone into the event-payload form.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            config: self.config.clone(),
            location: self.location.clone(),
            status: self.status.clone(),
        }
    }
}
