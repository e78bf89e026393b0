//! Built-in plugins every session starts with.
//!
//! Environment switchers live in the feature container and visually
//! precede everything else; resource actions (reload, delete, publish,
//! unpublish) are ordinary plugins whose predicates track the status
//! record. The destructive ones are gated behind the power-user mode.

use std::sync::Arc;

use stagekit_engine::{EngineState, PluginDeclaration, Predicate};
use stagekit_types::EnvironmentKind;

fn edit_exists() -> Predicate {
    Predicate::Custom(Arc::new(|state: &EngineState| {
        state.status.edit.as_ref().is_some_and(|edit| edit.exists())
    }))
}

fn preview_exists() -> Predicate {
    Predicate::Custom(Arc::new(|state: &EngineState| {
        state.status.preview.as_ref().is_some_and(|stage| stage.exists())
    }))
}

fn live_exists() -> Predicate {
    Predicate::Custom(Arc::new(|state: &EngineState| {
        state.status.live.as_ref().is_some_and(|stage| stage.exists())
    }))
}

fn on_project_or_editor() -> Predicate {
    Predicate::Any(vec![
        Predicate::Project,
        Predicate::Environment(vec![EnvironmentKind::Editor, EnvironmentKind::AdminListing]),
    ])
}

pub(crate) fn declarations() -> Vec<PluginDeclaration> {
    vec![
        PluginDeclaration::new("env-edit", on_project_or_editor().and(edit_exists()))
            .feature()
            .title("plugin_edit")
            .pinned_when(Predicate::Environment(vec![EnvironmentKind::Editor])),
        PluginDeclaration::new("env-preview", on_project_or_editor())
            .feature()
            .title("plugin_preview")
            .enabled_when(preview_exists())
            .pinned_when(Predicate::Environment(vec![
                EnvironmentKind::Preview,
                EnvironmentKind::Dev,
            ])),
        PluginDeclaration::new("env-live", on_project_or_editor())
            .feature()
            .title("plugin_live")
            .enabled_when(live_exists())
            .pinned_when(Predicate::Environment(vec![EnvironmentKind::Live])),
        PluginDeclaration::new(
            "env-prod",
            on_project_or_editor().and(Predicate::Custom(Arc::new(|state: &EngineState| {
                state.config.host.is_some()
            }))),
        )
        .feature()
        .title("plugin_prod")
        .enabled_when(live_exists())
        .pinned_when(Predicate::Environment(vec![EnvironmentKind::Prod])),
        PluginDeclaration::new(
            "reload",
            Predicate::Environment(vec![EnvironmentKind::Preview, EnvironmentKind::Dev])
                .and(edit_exists()),
        )
        .title("plugin_reload"),
        PluginDeclaration::new(
            "delete",
            Predicate::Environment(vec![EnvironmentKind::Preview, EnvironmentKind::Dev])
                .and(preview_exists())
                .and(Predicate::Not(Box::new(edit_exists()))),
        )
        .advanced(Predicate::Always)
        .title("plugin_delete"),
        PluginDeclaration::new("publish", Predicate::All(vec![Predicate::Project, Predicate::Content]))
            .enabled_when(preview_exists())
            .title("plugin_publish"),
        PluginDeclaration::new(
            "unpublish",
            Predicate::All(vec![Predicate::Project, Predicate::Content]).and(live_exists()),
        )
        .advanced(Predicate::Always)
        .title("plugin_unpublish"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekit_engine::PluginRegistry;
    use stagekit_engine::resolver;
    use stagekit_types::{Config, Location, StageInfo, Status};

    fn state_on(host: &str, status: Status) -> EngineState {
        let mut config = Config {
            owner: Some("owner".to_string()),
            repo: Some("repo".to_string()),
            ref_name: Some("main".to_string()),
            host: Some("www.project.example".to_string()),
            inner_domain: Some("proj.page".to_string()),
            outer_domain: Some("proj.live".to_string()),
            ..Config::default()
        };
        resolver::derive_hosts(&mut config);
        let location = Location::parse(&format!("https://{}/en/post", host)).unwrap();
        EngineState::new(config, location, status)
    }

    fn registry_for(state: &EngineState) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        for decl in declarations() {
            registry.add(decl, state);
        }
        registry
    }

    #[test]
    fn switchers_render_on_project_hosts_only() {
        let status = Status {
            preview: Some(StageInfo {
                url: Some("https://main--repo--owner.proj.page/en/post".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let on_project = state_on("main--repo--owner.proj.page", status.clone());
        let registry = registry_for(&on_project);
        assert!(registry.get("env-preview").is_some());
        assert!(registry.get("env-preview").unwrap().enabled);
        assert!(registry.get("env-preview").unwrap().pressed);
        assert!(registry.get("env-live").is_some());
        assert!(!registry.get("env-live").unwrap().enabled);

        let elsewhere = state_on("unrelated.example", status);
        let registry = registry_for(&elsewhere);
        assert!(registry.handles().is_empty());
    }

    #[test]
    fn publish_needs_a_preview_to_be_enabled() {
        let bare = state_on("main--repo--owner.proj.page", Status::default());
        let registry = registry_for(&bare);
        let publish = registry.get("publish").expect("publish rendered on project");
        assert!(!publish.enabled);

        let previewed = state_on(
            "main--repo--owner.proj.page",
            Status {
                preview: Some(StageInfo {
                    last_modified: Some("2026-07-01T10:00:00Z".parse().unwrap()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        let registry = registry_for(&previewed);
        assert!(registry.get("publish").unwrap().enabled);
    }

    #[test]
    fn destructive_plugins_are_power_user_only() {
        let status = Status {
            preview: Some(StageInfo {
                url: Some("https://x/en/post".to_string()),
                ..Default::default()
            }),
            live: Some(StageInfo {
                url: Some("https://y/en/post".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let state = state_on("main--repo--owner.proj.page", status);

        let mut registry = registry_for(&state);
        assert!(registry.get("delete").is_none());
        assert!(registry.get("unpublish").is_none());

        registry.set_show_advanced(true);
        registry.reevaluate(&state);
        assert!(registry.get("delete").is_some());
        assert!(registry.get("unpublish").is_some());
    }
}
