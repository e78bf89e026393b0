pub mod config;
pub mod environment;
pub mod error;
pub mod event;
pub mod location;
pub mod status;

pub use config::{Config, PluginSpec};
pub use environment::EnvironmentKind;
pub use error::{Error, Result};
pub use event::{EnvSwitch, Event, EventName, EventPayload, StateSnapshot, TelemetrySample};
pub use location::Location;
pub use status::{Profile, StageInfo, Status};
