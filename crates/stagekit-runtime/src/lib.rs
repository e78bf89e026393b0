//! Session orchestration for the stagekit panel.
//!
//! This crate owns everything that touches the network or the clock: the
//! config loader, the status store and its refresh cycle, the bulk queue,
//! the dictionary, the login/logout poll and the outward-facing
//! [`Controller`] that composes them with the pure engine.

mod builtins;
pub mod bulk_queue;
pub mod config_loader;
pub mod controller;
pub mod dictionary;
pub mod error;
pub mod login;
pub mod notice;
pub mod status;
pub mod transport;

pub use config_loader::ConfigLoader;
pub use controller::{ActionResult, Controller, ControllerBuilder};
pub use dictionary::Dictionary;
pub use error::{Error, Result};
pub use login::{AuthWindow, Clock, LoginPoll, PollOutcome, PollState, TokioClock};
pub use notice::{Notice, NoticeLevel};
pub use status::{RefreshOutcome, StatusStore};
pub use transport::{HttpTransport, Method, Request, Response, Transport};
