use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of the remote resource across its publication stages.
///
/// Replaced wholesale on every successful fetch. Absence of a stage's
/// metadata means "does not exist in that stage", not "unknown" —
/// downstream predicates treat `None` and an explicit absence identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<StageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<StageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<StageInfo>,

    /// Authenticated user, when a session exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,

    /// Overall response code; carries the synthetic 401 record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Status {
    /// Synthetic record for a 401 response: "needs auth", not an error.
    pub fn unauthorized() -> Self {
        Status {
            status: Some(401),
            ..Status::default()
        }
    }

    pub fn needs_auth(&self) -> bool {
        self.status == Some(401)
    }

    pub fn authenticated(&self) -> bool {
        self.profile.is_some()
    }
}

/// Per-stage metadata (`edit`, `preview`, `live`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StageInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

impl StageInfo {
    /// Whether the authenticated session may perform `action` on this stage.
    pub fn can(&self, action: &str) -> bool {
        self.permissions.iter().any(|p| p == action)
    }

    /// Whether the resource exists in this stage.
    pub fn exists(&self) -> bool {
        self.status.is_none_or(|s| s == 200) && (self.url.is_some() || self.last_modified.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
