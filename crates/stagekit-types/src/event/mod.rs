mod name;
mod payload;

pub use name::EventName;
pub use payload::{EnvSwitch, Event, EventPayload, StateSnapshot, TelemetrySample};
