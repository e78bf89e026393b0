//! The re-evaluation contract across status changes: pure, repeatable,
//! order-preserving.

use std::sync::Arc;

use stagekit_engine::{
    resolver, ContainerKind, EngineState, PluginDeclaration, PluginRegistry, Predicate,
};
use stagekit_types::{Config, EnvironmentKind, Location, Profile, StageInfo, Status};

fn project_state(status: Status) -> EngineState {
    let mut config = Config {
        owner: Some("owner".to_string()),
        repo: Some("repo".to_string()),
        ref_name: Some("main".to_string()),
        inner_domain: Some("proj.page".to_string()),
        ..Config::default()
    };
    resolver::derive_hosts(&mut config);
    let location = Location::parse("https://main--repo--owner.proj.page/en/post").unwrap();
    EngineState::new(config, location, status)
}

fn preview_status() -> Status {
    Status {
        web_path: Some("/en/post".to_string()),
        preview: Some(StageInfo {
            url: Some("https://main--repo--owner.proj.page/en/post".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn double_pass_is_a_fixpoint_for_any_fixed_status() {
    let statuses = [
        Status::default(),
        Status::unauthorized(),
        preview_status(),
        Status {
            profile: Some(Profile::default()),
            ..preview_status()
        },
    ];

    for status in statuses {
        let state = project_state(status);
        let mut registry = PluginRegistry::new();
        registry.add(
            PluginDeclaration::new("a", Predicate::Environment(vec![EnvironmentKind::Preview])),
            &state,
        );
        registry.add(
            PluginDeclaration::new("b", Predicate::Authenticated).enabled_when(Predicate::Content),
            &state,
        );
        registry.add(
            PluginDeclaration::new(
                "c",
                Predicate::Custom(Arc::new(|s: &EngineState| s.status.preview.is_some())),
            ),
            &state,
        );

        registry.reevaluate(&state);
        let first = registry.handles().to_vec();
        registry.reevaluate(&state);
        assert_eq!(registry.handles(), first.as_slice(), "re-evaluation drifted");
    }
}

#[test]
fn status_change_drives_insertion_and_removal() {
    let mut registry = PluginRegistry::new();
    let empty = project_state(Status::default());
    registry.add(
        PluginDeclaration::new(
            "publish-now",
            Predicate::Custom(Arc::new(|s: &EngineState| s.status.preview.is_some())),
        ),
        &empty,
    );
    assert!(registry.get("publish-now").is_none());

    let with_preview = project_state(preview_status());
    registry.reevaluate(&with_preview);
    assert!(registry.get("publish-now").is_some());

    registry.reevaluate(&empty);
    assert!(registry.get("publish-now").is_none());
}

#[test]
fn nested_registration_lands_in_named_container() {
    let state = project_state(preview_status());
    let mut registry = PluginRegistry::new();

    registry.add(
        PluginDeclaration::new("tools", Predicate::Always).callback(Arc::new(
            |_state: &EngineState| {
                vec![
                    PluginDeclaration::new("tools-validate", Predicate::Always).container("tools"),
                    PluginDeclaration::new("tools-audit", Predicate::Authenticated)
                        .container("tools"),
                ]
            },
        )),
        &state,
    );

    let ids: Vec<&str> = registry.handles().iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["tools", "tools-validate"]);
    assert_eq!(
        registry.get("tools-validate").unwrap().container,
        ContainerKind::Named("tools".to_string())
    );

    // The auth-gated child appears once a profile arrives, same container.
    let authed = project_state(Status {
        profile: Some(Profile::default()),
        ..preview_status()
    });
    registry.reevaluate(&authed);
    assert!(registry.get("tools-audit").is_some());
}
