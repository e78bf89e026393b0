//! Environment resolution: derived hosts and the classification of a
//! location into exactly one [`EnvironmentKind`].

use once_cell::sync::Lazy;
use regex::Regex;
use stagekit_types::{Config, EnvironmentKind, Location, Status};

/// A known document-editing surface.
struct EditorSurface {
    host_suffix: &'static str,
    path: &'static Lazy<Regex>,
}

static GDOCS_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/(document|spreadsheets)/d/").unwrap());
static SHAREPOINT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(/:[wx]:/|/doc\d*\.aspx)").unwrap());

static EDITOR_SURFACES: &[EditorSurface] = &[
    EditorSurface {
        host_suffix: "docs.google.com",
        path: &GDOCS_PATH,
    },
    EditorSurface {
        host_suffix: ".sharepoint.com",
        path: &SHAREPOINT_PATH,
    },
];

/// Extensions that still count as content when served from a CDN host.
const CONTENT_EXTENSIONS: &[&str] = &["html", "json", "pdf"];

/// Fill in `inner_host`/`outer_host` from the identity fields, unless
/// explicit overrides are present.
pub fn derive_hosts(config: &mut Config) {
    let (Some(owner), Some(repo), Some(ref_name)) =
        (&config.owner, &config.repo, &config.ref_name)
    else {
        return;
    };
    let prefix = format!("{}--{}--{}", ref_name, repo, owner);
    if config.inner_host.is_none() {
        config.inner_host = Some(format!("{}.{}", prefix, config.inner_domain()));
    }
    if config.outer_host.is_none() {
        config.outer_host = Some(format!("{}.{}", prefix, config.outer_domain()));
    }
}

/// Ref-agnostic project host comparison.
///
/// Exact-equal hosts always match. Otherwise both hosts must carry the
/// `{ref}--{repo}--{owner}` naming convention, end in the same project
/// domain, and agree on `{repo}--{owner}` — the `{ref}--` prefix is
/// ignored.
pub fn match_project_host(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (split_project_host(a), split_project_host(b)) {
        (Some((repo_owner_a, domain_a)), Some((repo_owner_b, domain_b))) => {
            repo_owner_a == repo_owner_b && domain_a == domain_b
        }
        _ => false,
    }
}

/// Split `ref--repo--owner.domain` into (`repo--owner`, `domain`).
fn split_project_host(host: &str) -> Option<(&str, &str)> {
    let (prefix, domain) = host.split_once('.')?;
    let mut parts = prefix.splitn(2, "--");
    let _ref = parts.next()?;
    let repo_owner = parts.next()?;
    // Both repo and owner segments must be present.
    if repo_owner.is_empty() || !repo_owner.contains("--") {
        return None;
    }
    Some((repo_owner, domain))
}

pub fn is_dev(config: &Config, location: &Location) -> bool {
    location.host == config.dev_host()
}

pub fn is_inner(config: &Config, location: &Location) -> bool {
    config
        .inner_host
        .as_deref()
        .is_some_and(|host| match_project_host(location.host.as_str(), host))
}

pub fn is_outer(config: &Config, location: &Location) -> bool {
    config
        .outer_host
        .as_deref()
        .is_some_and(|host| match_project_host(location.host.as_str(), host))
}

pub fn is_prod(config: &Config, location: &Location) -> bool {
    config
        .host
        .as_deref()
        .is_some_and(|host| location.host == host)
}

pub fn is_editor(config: &Config, location: &Location) -> bool {
    EDITOR_SURFACES.iter().any(|surface| {
        location.host.ends_with(surface.host_suffix)
            && (surface.path.is_match(&location.path)
                || (config.mount_host.as_deref() == Some(location.host.as_str())
                    && !is_admin_listing(config, location)))
    })
}

pub fn is_admin_listing(_config: &Config, location: &Location) -> bool {
    if location.host == "drive.google.com" {
        return true;
    }
    location.host.ends_with(".sharepoint.com") && location.path.ends_with("/Forms/AllItems.aspx")
}

/// Identity fields present and the location sits on one of the project's
/// own hosts.
pub fn is_project(config: &Config, location: &Location) -> bool {
    config.has_identity()
        && (is_dev(config, location)
            || is_inner(config, location)
            || is_outer(config, location)
            || is_prod(config, location))
}

/// Editor/admin-listing pages, or a path whose extension reads as content.
pub fn is_content(config: &Config, location: &Location) -> bool {
    if is_editor(config, location) || is_admin_listing(config, location) {
        return true;
    }
    match location.extension() {
        None => true,
        Some(ext) => CONTENT_EXTENSIONS.contains(&ext),
    }
}

/// Classify a location into exactly one environment.
///
/// Editor and admin-listing checks run before the CDN-host checks: a
/// content-mount host can coincide with an inner/outer host in degenerate
/// configurations, and the editor interpretation wins.
pub fn classify(config: &Config, location: &Location) -> EnvironmentKind {
    if is_editor(config, location) {
        EnvironmentKind::Editor
    } else if is_admin_listing(config, location) {
        EnvironmentKind::AdminListing
    } else if is_dev(config, location) {
        EnvironmentKind::Dev
    } else if is_inner(config, location) {
        EnvironmentKind::Preview
    } else if is_outer(config, location) {
        EnvironmentKind::Live
    } else if is_prod(config, location) {
        EnvironmentKind::Prod
    } else {
        EnvironmentKind::Unknown
    }
}

/// Host serving the given environment, when the configuration names one.
pub fn host_for(config: &Config, kind: EnvironmentKind) -> Option<String> {
    match kind {
        EnvironmentKind::Dev => Some(config.dev_host().to_string()),
        EnvironmentKind::Preview => config.inner_host.clone(),
        EnvironmentKind::Live => config.outer_host.clone(),
        EnvironmentKind::Prod => config.host.clone(),
        _ => None,
    }
}

/// Build the environment-switch target URL.
///
/// CDN targets are `https://{host}{web_path}{query}{hash}`; the editor
/// target is the edit URL from the current status, with query and hash
/// stripped by construction.
pub fn switch_target(
    config: &Config,
    location: &Location,
    status: &Status,
    kind: EnvironmentKind,
) -> Option<String> {
    if kind == EnvironmentKind::Editor {
        return status.edit.as_ref().and_then(|edit| edit.url.clone());
    }
    let host = host_for(config, kind)?;
    let web_path = status
        .web_path
        .as_deref()
        .unwrap_or(location.path.as_str());
    Some(format!(
        "https://{}{}{}{}",
        host, web_path, location.query, location.hash
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            owner: Some("adobe".to_string()),
            repo: Some("blog".to_string()),
            ref_name: Some("main".to_string()),
            inner_domain: Some("example-inner".to_string()),
            outer_domain: Some("example-outer".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn derives_hosts_from_identity() {
        let mut config = config();
        derive_hosts(&mut config);
        assert_eq!(
            config.inner_host.as_deref(),
            Some("main--blog--adobe.example-inner")
        );
        assert_eq!(
            config.outer_host.as_deref(),
            Some("main--blog--adobe.example-outer")
        );
    }

    #[test]
    fn derive_keeps_explicit_hosts() {
        let mut config = config();
        config.inner_host = Some("staging.example".to_string());
        derive_hosts(&mut config);
        assert_eq!(config.inner_host.as_deref(), Some("staging.example"));
    }

    #[test]
    fn ref_agnostic_host_matching() {
        assert!(match_project_host(
            "main--repo--owner.example",
            "test--repo--owner.example"
        ));
        assert!(!match_project_host(
            "main--repo--owner.example",
            "main--other--owner.example"
        ));
        assert!(match_project_host("blog.adobe.com", "blog.adobe.com"));
        assert!(!match_project_host(
            "main--repo--owner.example",
            "main--repo--owner.other"
        ));
        assert!(!match_project_host("plain.example", "other.example"));
    }

    #[test]
    fn editor_wins_over_cdn_hosts() {
        // Degenerate setup: the mount host doubles as a known editing
        // surface; the editor interpretation must win.
        let mut config = config();
        config.mount_host = Some("corp.sharepoint.com".to_string());
        config.inner_host = Some("corp.sharepoint.com".to_string());

        let editing = Location::parse("https://corp.sharepoint.com/sites/blog/x").unwrap();
        assert_eq!(classify(&config, &editing), EnvironmentKind::Editor);

        let listing =
            Location::parse("https://corp.sharepoint.com/sites/blog/Forms/AllItems.aspx").unwrap();
        assert_eq!(classify(&config, &listing), EnvironmentKind::AdminListing);
    }

    #[test]
    fn classifies_cdn_hosts() {
        let mut config = config();
        config.host = Some("blog.adobe.com".to_string());
        derive_hosts(&mut config);

        let cases = [
            ("localhost:3000", "Dev"),
            ("test--blog--adobe.example-inner", "Preview"),
            ("main--blog--adobe.example-outer", "Live"),
            ("blog.adobe.com", "Prod"),
            ("unrelated.example", "Unknown"),
        ];
        for (host, expected) in cases {
            let location = Location::parse(&format!("https://{}/en/post", host)).unwrap();
            let kind = classify(&config, &location);
            assert_eq!(format!("{:?}", kind), expected, "host {}", host);
        }
    }

    #[test]
    fn content_detection() {
        let config = config();
        for path in ["/en/post", "/en/post.html", "/en/data.json", "/doc.pdf", "/en/"] {
            let location = Location::parse(&format!("https://h{}", path)).unwrap();
            assert!(is_content(&config, &location), "path {}", path);
        }
        let media = Location::parse("https://h/media/image.png").unwrap();
        assert!(!is_content(&config, &media));
    }

    #[test]
    fn switch_targets() {
        let mut config = config();
        config.host = Some("blog.adobe.com".to_string());
        derive_hosts(&mut config);

        let location =
            Location::parse("https://main--blog--adobe.example-inner/en/topics/bla").unwrap();
        assert!(is_inner(&config, &location));
        assert!(is_project(&config, &location));

        let status = Status::default();
        assert_eq!(
            switch_target(&config, &location, &status, EnvironmentKind::Prod).as_deref(),
            Some("https://blog.adobe.com/en/topics/bla")
        );

        // Editor targets come from the edit URL and carry no query/hash.
        let mut with_edit = Status::default();
        with_edit.edit = Some(stagekit_types::StageInfo {
            url: Some("https://docs.google.com/document/d/1".to_string()),
            ..Default::default()
        });
        let noisy =
            Location::parse("https://main--blog--adobe.example-inner/en/topics/bla?x=1#top")
                .unwrap();
        assert_eq!(
            switch_target(&config, &noisy, &with_edit, EnvironmentKind::Editor).as_deref(),
            Some("https://docs.google.com/document/d/1")
        );
        assert_eq!(
            switch_target(&config, &noisy, &with_edit, EnvironmentKind::Live).as_deref(),
            Some("https://main--blog--adobe.example-outer/en/topics/bla?x=1#top")
        );
    }
}
