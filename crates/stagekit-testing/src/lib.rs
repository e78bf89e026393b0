//! Internal test utilities: a scripted transport, a manual clock and
//! fixture builders shared by the workspace's test suites.

pub mod clock;
pub mod fixtures;
pub mod transport;

pub use clock::ManualClock;
pub use fixtures::{project_config, project_location, status_body};
pub use transport::{ok_json, status, status_with_error, ScriptedTransport};
