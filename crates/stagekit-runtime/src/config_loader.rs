//! Session configuration assembly.
//!
//! Merges the caller's base configuration with an optional project-level
//! override fetched once per session, then derives the project hosts. A
//! failed or rejected fetch is never fatal: the base simply stands.

use std::sync::Arc;

use serde_json::Value;
use stagekit_engine::resolver;
use stagekit_types::{Config, Location};

use crate::transport::{Request, Transport};

pub struct ConfigLoader {
    transport: Arc<dyn Transport>,
    extended: bool,
}

impl ConfigLoader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        ConfigLoader {
            transport,
            extended: false,
        }
    }

    /// Resolve the session configuration.
    ///
    /// Safe to call repeatedly: the override document is fetched at most
    /// once per session, and every call returns the same shape for the
    /// same inputs afterwards.
    pub async fn load(&mut self, base: Config, location: &Location) -> Config {
        let mut config = base;
        if !config.has_identity() {
            // Degenerate "no project" state for non-project pages.
            return config;
        }

        adopt_ref_from_host(&mut config, location);

        if !self.extended {
            self.extended = true;
            let url = format!("{}/config.json", config.script_root());
            match self.transport.execute(Request::get(url)).await {
                Ok(response) if response.status == 200 => {
                    match serde_json::from_str::<Value>(&response.body) {
                        Ok(doc) => match config.extended_with(doc) {
                            Ok(extended) => config = extended,
                            Err(err) => {
                                tracing::warn!(%err, "project config override rejected");
                            }
                        },
                        Err(err) => {
                            tracing::warn!(%err, "project config is not valid JSON");
                        }
                    }
                }
                Ok(response) => {
                    tracing::debug!(status = response.status, "no project config override");
                }
                Err(err) => {
                    tracing::debug!(%err, "project config fetch failed");
                }
            }
        }

        resolver::derive_hosts(&mut config);
        config
    }
}

/// Adopt the ref the page is actually served from.
///
/// When the location sits on a `{ref}--{repo}--{owner}` host for this
/// project but a different ref than the base names, the session follows
/// the page, not the base.
fn adopt_ref_from_host(config: &mut Config, location: &Location) {
    let (Some(owner), Some(repo)) = (&config.owner, &config.repo) else {
        return;
    };
    let Some((prefix, domain)) = location.host.split_once('.') else {
        return;
    };
    if domain != config.inner_domain() && domain != config.outer_domain() {
        return;
    }
    let parts: Vec<&str> = prefix.split("--").collect();
    if parts.len() == 3
        && parts[1] == repo.as_str()
        && parts[2] == owner.as_str()
        && !parts[0].is_empty()
    {
        config.ref_name = Some(parts[0].to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_follows_the_page_host() {
        let mut config = Config {
            owner: Some("owner".to_string()),
            repo: Some("repo".to_string()),
            ref_name: Some("main".to_string()),
            inner_domain: Some("proj.page".to_string()),
            ..Config::default()
        };
        let location = Location::parse("https://test--repo--owner.proj.page/").unwrap();
        adopt_ref_from_host(&mut config, &location);
        assert_eq!(config.ref_name.as_deref(), Some("test"));
    }

    #[test]
    fn foreign_hosts_leave_the_ref_alone() {
        let mut config = Config {
            owner: Some("owner".to_string()),
            repo: Some("repo".to_string()),
            ref_name: Some("main".to_string()),
            ..Config::default()
        };
        for host in ["test--other--owner.stagekit.page", "blog.example.com"] {
            let location = Location::parse(&format!("https://{}/", host)).unwrap();
            adopt_ref_from_host(&mut config, &location);
            assert_eq!(config.ref_name.as_deref(), Some("main"), "host {}", host);
        }
    }
}
