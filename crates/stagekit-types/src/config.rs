use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::environment::EnvironmentKind;
use crate::error::Result;

/// Default staging ("inner") project domain.
pub const DEFAULT_INNER_DOMAIN: &str = "stagekit.page";
/// Default edge-cache ("outer") project domain.
pub const DEFAULT_OUTER_DOMAIN: &str = "stagekit.live";
/// Default admin API root.
pub const DEFAULT_ADMIN_ROOT: &str = "https://admin.stagekit.dev";
/// Default root for project-level assets (config.json, dictionaries).
pub const DEFAULT_SCRIPT_ROOT: &str = "https://www.stagekit.dev/panel";
/// Default local development host.
pub const DEFAULT_DEV_HOST: &str = "localhost:3000";

/// Immutable session configuration.
///
/// Created once per session by the config loader; an override fetched from
/// the project never mutates it in place, it produces a new record via
/// [`Config::extended_with`]. Identity fields (`owner`, `repo`, `ref`) are
/// never overridden by a remote fetch so a project cannot confuse its own
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub owner: Option<String>,
    pub repo: Option<String>,
    #[serde(rename = "ref")]
    pub ref_name: Option<String>,

    /// Production host configured by the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Staging host, derived as `{ref}--{repo}--{owner}.<inner-domain>`
    /// unless explicitly configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_host: Option<String>,
    /// Edge-cache host, derived like `inner_host` on the outer domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_host: Option<String>,
    /// Content-mount host (byo-storage root the project documents live on).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_host: Option<String>,

    pub push_down: bool,
    pub dev_mode: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Plugins supplied by the hosting project, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginSpec>,

    /// Project-specific keys we carry along without interpreting.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Config {
    /// Whether the identity fields are all present.
    pub fn has_identity(&self) -> bool {
        self.owner.is_some() && self.repo.is_some() && self.ref_name.is_some()
    }

    pub fn inner_domain(&self) -> &str {
        self.inner_domain.as_deref().unwrap_or(DEFAULT_INNER_DOMAIN)
    }

    pub fn outer_domain(&self) -> &str {
        self.outer_domain.as_deref().unwrap_or(DEFAULT_OUTER_DOMAIN)
    }

    pub fn admin_root(&self) -> &str {
        self.admin_root.as_deref().unwrap_or(DEFAULT_ADMIN_ROOT)
    }

    pub fn script_root(&self) -> &str {
        self.script_root.as_deref().unwrap_or(DEFAULT_SCRIPT_ROOT)
    }

    pub fn dev_host(&self) -> &str {
        self.dev_host.as_deref().unwrap_or(DEFAULT_DEV_HOST)
    }

    /// Merge a project-level override document under this configuration.
    ///
    /// Override keys win, except identity fields and already-resolved
    /// derived hosts, which are re-asserted from `self`.
    pub fn extended_with(&self, override_doc: Value) -> Result<Config> {
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        if let Value::Object(incoming) = override_doc {
            for (key, value) in incoming {
                merged.insert(key, value);
            }
        }

        let mut config: Config = serde_json::from_value(Value::Object(merged))?;

        // Identity always comes from the base record.
        config.owner = self.owner.clone();
        config.repo = self.repo.clone();
        config.ref_name = self.ref_name.clone();

        // Hosts the base already resolved stay resolved.
        if self.host.is_some() {
            config.host = self.host.clone();
        }
        if self.inner_host.is_some() {
            config.inner_host = self.inner_host.clone();
        }
        if self.outer_host.is_some() {
            config.outer_host = self.outer_host.clone();
        }
        if self.dev_host.is_some() {
            config.dev_host = self.dev_host.clone();
        }

        Ok(config)
    }
}

/// Declarative plugin shipped in a project's remote configuration.
///
/// The controller lowers each spec into an engine declaration whose
/// visibility condition is the conjunction of the environment and path
/// filters below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginSpec {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Environments the plugin appears in; empty means all.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<EnvironmentKind>,
    /// Path prefixes the plugin is limited to; empty means all paths.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_paths: Vec<String>,
    /// Path prefixes that hide the plugin even when included.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_paths: Vec<String>,
    /// Navigation target of the plugin's button, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Custom event fired when the plugin's button is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    pub feature: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Config {
        Config {
            owner: Some("a".to_string()),
            repo: Some("b".to_string()),
            ref_name: Some("main".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn merge_preserves_identity_fields() {
        let merged = base()
            .extended_with(json!({"owner": "x", "ref": "dev", "extra": "y"}))
            .unwrap();

        assert_eq!(merged.owner.as_deref(), Some("a"));
        assert_eq!(merged.repo.as_deref(), Some("b"));
        assert_eq!(merged.ref_name.as_deref(), Some("main"));
        assert_eq!(merged.extra.get("extra"), Some(&json!("y")));
    }

    #[test]
    fn merge_keeps_resolved_hosts_from_base() {
        let mut config = base();
        config.inner_host = Some("main--b--a.stagekit.page".to_string());

        let merged = config
            .extended_with(json!({"innerHost": "spoofed.example", "host": "b.example"}))
            .unwrap();

        assert_eq!(merged.inner_host.as_deref(), Some("main--b--a.stagekit.page"));
        // The base never resolved a prod host, so the override lands.
        assert_eq!(merged.host.as_deref(), Some("b.example"));
    }

    #[test]
    fn merge_adopts_override_plugins() {
        let merged = base()
            .extended_with(json!({
                "plugins": [
                    {"id": "library", "title": "Library", "environments": ["editor"]}
                ]
            }))
            .unwrap();

        assert_eq!(merged.plugins.len(), 1);
        assert_eq!(merged.plugins[0].id, "library");
        assert_eq!(merged.plugins[0].environments, vec![EnvironmentKind::Editor]);
    }

    #[test]
    fn identity_detection() {
        assert!(base().has_identity());
        assert!(!Config::default().has_identity());
    }
}
