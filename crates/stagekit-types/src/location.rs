use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Snapshot of the current page address.
///
/// Read-only once taken; callers re-parse when they explicitly want a fresh
/// view (e.g. right before switching environments). `query` keeps its
/// leading `?` and `hash` its leading `#` so that switch-target URLs can be
/// assembled by plain concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Location {
    pub host: String,
    pub path: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub hash: String,
}

impl Location {
    /// Parse an absolute or scheme-less URL into a location snapshot.
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);
        if rest.is_empty() {
            return Err(Error::InvalidLocation(url.to_string()));
        }

        let (rest, hash) = match rest.split_once('#') {
            Some((r, h)) => (r, format!("#{}", h)),
            None => (rest, String::new()),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((r, q)) => (r, format!("?{}", q)),
            None => (rest, String::new()),
        };
        let (host, path) = match rest.split_once('/') {
            Some((h, p)) => (h, format!("/{}", p)),
            None => (rest, "/".to_string()),
        };
        if host.is_empty() {
            return Err(Error::InvalidLocation(url.to_string()));
        }

        Ok(Location {
            host: host.to_string(),
            path,
            query,
            hash,
        })
    }

    /// Reassemble the full address.
    pub fn href(&self) -> String {
        format!("https://{}{}{}{}", self.host, self.path, self.query, self.hash)
    }

    /// File extension of the path, if any. A trailing slash or a bare
    /// segment yields `None`.
    pub fn extension(&self) -> Option<&str> {
        let last = self.path.rsplit('/').next()?;
        match last.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}
