//! Canonical fixture data for the workspace's test suites.

use stagekit_types::{Config, Location};

/// A project on `owner/repo@main` with explicit domains and roots, so no
/// test depends on the library defaults.
pub fn project_config() -> Config {
    Config {
        owner: Some("owner".to_string()),
        repo: Some("repo".to_string()),
        ref_name: Some("main".to_string()),
        host: Some("www.project.example".to_string()),
        inner_domain: Some("proj.page".to_string()),
        outer_domain: Some("proj.live".to_string()),
        admin_root: Some("https://admin.example".to_string()),
        script_root: Some("https://scripts.example/panel".to_string()),
        ..Config::default()
    }
}

/// A content page on the project's staging host.
pub fn project_location() -> Location {
    Location::parse("https://main--repo--owner.proj.page/en/post").unwrap()
}

/// A full status record for [`project_location`], as the admin API would
/// answer it.
pub fn status_body() -> String {
    r#"{
        "webPath": "/en/post",
        "resourcePath": "/en/post.md",
        "edit": {
            "url": "https://docs.google.com/document/d/abc",
            "status": 200
        },
        "preview": {
            "url": "https://main--repo--owner.proj.page/en/post",
            "status": 200,
            "lastModified": "2026-07-01T10:00:00Z",
            "permissions": ["read", "write"]
        },
        "live": {
            "url": "https://main--repo--owner.proj.live/en/post",
            "status": 200,
            "lastModified": "2026-06-30T08:00:00Z",
            "permissions": ["read"]
        },
        "profile": {
            "name": "Jane Doe",
            "email": "jane@example.com"
        }
    }"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekit_types::Status;

    #[test]
    fn status_body_parses() {
        let status: Status = serde_json::from_str(&status_body()).unwrap();
        assert_eq!(status.web_path.as_deref(), Some("/en/post"));
        assert!(status.authenticated());
        assert!(status.preview.unwrap().can("write"));
    }
}
