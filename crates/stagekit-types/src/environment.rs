use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of the page the panel is attached to.
///
/// Exactly one kind applies to a given (Config, Location) pair. The
/// resolver evaluates editor/admin-listing checks before CDN-host checks,
/// since a content-mount host can coincide with an inner/outer host in
/// degenerate configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentKind {
    /// Local development server
    Dev,
    /// Document-editing surface (byo-storage editor)
    Editor,
    /// File-listing surface (folder browser)
    AdminListing,
    /// Staging host ("inner", `{ref}--{repo}--{owner}.<inner-domain>`)
    Preview,
    /// Edge-cache host ("outer", `{ref}--{repo}--{owner}.<outer-domain>`)
    Live,
    /// The production host configured by the project
    Prod,
    /// None of the known environments
    Unknown,
}

impl EnvironmentKind {
    /// All kinds a plugin spec may name in its `environments` filter.
    pub const ALL: [EnvironmentKind; 7] = [
        EnvironmentKind::Dev,
        EnvironmentKind::Editor,
        EnvironmentKind::AdminListing,
        EnvironmentKind::Preview,
        EnvironmentKind::Live,
        EnvironmentKind::Prod,
        EnvironmentKind::Unknown,
    ];
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnvironmentKind::Dev => "dev",
            EnvironmentKind::Editor => "editor",
            EnvironmentKind::AdminListing => "admin-listing",
            EnvironmentKind::Preview => "preview",
            EnvironmentKind::Live => "live",
            EnvironmentKind::Prod => "prod",
            EnvironmentKind::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}
