//! Status store: the single writer of the remote resource's state.
//!
//! `refresh` is a small state machine over the HTTP status of the admin
//! API's response. Every refresh is stamped with a generation; a response
//! that lost the race against a newer refresh is discarded instead of
//! overwriting fresher state.

use std::sync::Arc;

use stagekit_engine::resolver;
use stagekit_types::{Config, Location, Status};

use crate::error::{Error, Result};
use crate::transport::{Request, Transport};

/// What a refresh produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A full status record.
    Fetched(Status),
    /// The synthetic needs-auth record; not an error.
    Unauthorized(Status),
    /// A newer refresh superseded this one; nothing was applied.
    Stale,
}

pub struct StatusStore {
    transport: Arc<dyn Transport>,
    cached_url: Option<String>,
    generation: u64,
}

impl StatusStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        StatusStore {
            transport,
            cached_url: None,
            generation: 0,
        }
    }

    /// Build the status request address for the current page.
    ///
    /// Editor and listing pages identify the resource by their edit URL;
    /// project pages pass their path and let the API resolve the editor.
    pub fn status_url(config: &Config, location: &Location) -> String {
        let owner = config.owner.as_deref().unwrap_or_default();
        let repo = config.repo.as_deref().unwrap_or_default();
        let ref_name = config.ref_name.as_deref().unwrap_or_default();
        let root = format!(
            "{}/status/{}/{}/{}",
            config.admin_root(),
            owner,
            repo,
            ref_name
        );
        if resolver::is_editor(config, location) || resolver::is_admin_listing(config, location) {
            format!("{}?editUrl={}", root, encode_query(&location.href()))
        } else {
            format!("{}{}?editUrl=auto", root, location.path)
        }
    }

    /// Fetch the resource status.
    ///
    /// The request address is cached per location; `force` rebuilds it
    /// (the location changed). Fatal outcomes surface as errors for the
    /// controller to convert into a sticky notice; 401 is not fatal.
    pub async fn refresh(
        &mut self,
        config: &Config,
        location: &Location,
        force: bool,
    ) -> Result<RefreshOutcome> {
        if force || self.cached_url.is_none() {
            self.cached_url = Some(Self::status_url(config, location));
        }
        let url = match &self.cached_url {
            Some(url) => url.clone(),
            None => Self::status_url(config, location),
        };

        self.generation += 1;
        let generation = self.generation;
        let editor_shaped = resolver::is_editor(config, location)
            || resolver::is_admin_listing(config, location);

        let response = self.transport.execute(Request::get(url)).await?;

        if generation < self.generation {
            tracing::debug!(generation, "stale status response discarded");
            return Ok(RefreshOutcome::Stale);
        }

        match interpret(response.status, &response.body, editor_shaped)? {
            status if status.needs_auth() => Ok(RefreshOutcome::Unauthorized(status)),
            status => Ok(RefreshOutcome::Fetched(status)),
        }
    }

    /// The location changed: drop the cached address and bump the
    /// generation so any in-flight response is discarded.
    pub fn invalidate(&mut self) {
        self.cached_url = None;
        self.generation += 1;
    }
}

/// The response state machine, separated from I/O.
fn interpret(status_code: u16, body: &str, editor_shaped: bool) -> Result<Status> {
    match status_code {
        200 => serde_json::from_str::<Status>(body)
            .map_err(|err| Error::StatusInvalid(err.to_string())),
        401 => Ok(Status::unauthorized()),
        404 => Err(Error::NotFound {
            editor: editor_shaped,
        }),
        other => Err(Error::FailedStatus(other)),
    }
}

/// Percent-encode a query value (RFC 3986 unreserved set passes through).
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
