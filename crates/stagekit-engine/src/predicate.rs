use std::fmt;
use std::sync::Arc;

use stagekit_types::EnvironmentKind;

use crate::resolver;
use crate::state::EngineState;

/// Declarative visibility/enablement condition.
///
/// Predicates are data interpreted against an [`EngineState`] snapshot; the
/// `Custom` variant is the escape hatch for conditions the closed set does
/// not express, and must stay a pure function of the snapshot.
#[derive(Clone)]
pub enum Predicate {
    /// The location classifies into one of the given environments.
    Environment(Vec<EnvironmentKind>),
    /// The page reads as content (editor/admin pages, content extensions).
    Content,
    /// Identity fields present and the location is on a project host.
    Project,
    /// A profile is present in the current status.
    Authenticated,
    /// Path filter: empty `include` matches everything, `exclude` wins.
    PathMatches {
        include: Vec<String>,
        exclude: Vec<String>,
    },
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    Always,
    Custom(Arc<dyn Fn(&EngineState) -> bool + Send + Sync>),
}

impl Predicate {
    pub fn eval(&self, state: &EngineState) -> bool {
        match self {
            Predicate::Environment(kinds) => kinds.contains(&state.environment()),
            Predicate::Content => resolver::is_content(&state.config, &state.location),
            Predicate::Project => resolver::is_project(&state.config, &state.location),
            Predicate::Authenticated => state.status.authenticated(),
            Predicate::PathMatches { include, exclude } => {
                let path = state.status.web_path.as_deref().unwrap_or(&state.location.path);
                let included =
                    include.is_empty() || include.iter().any(|p| path.starts_with(p.as_str()));
                let excluded = exclude.iter().any(|p| path.starts_with(p.as_str()));
                included && !excluded
            }
            Predicate::All(inner) => inner.iter().all(|p| p.eval(state)),
            Predicate::Any(inner) => inner.iter().any(|p| p.eval(state)),
            Predicate::Not(inner) => !inner.eval(state),
            Predicate::Always => true,
            Predicate::Custom(f) => f(state),
        }
    }

    /// Conjunction, flattening nested `All`s.
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::All(mut inner) => {
                inner.push(other);
                Predicate::All(inner)
            }
            first => Predicate::All(vec![first, other]),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Environment(kinds) => f.debug_tuple("Environment").field(kinds).finish(),
            Predicate::Content => write!(f, "Content"),
            Predicate::Project => write!(f, "Project"),
            Predicate::Authenticated => write!(f, "Authenticated"),
            Predicate::PathMatches { include, exclude } => f
                .debug_struct("PathMatches")
                .field("include", include)
                .field("exclude", exclude)
                .finish(),
            Predicate::All(inner) => f.debug_tuple("All").field(inner).finish(),
            Predicate::Any(inner) => f.debug_tuple("Any").field(inner).finish(),
            Predicate::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Predicate::Always => write!(f, "Always"),
            Predicate::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekit_types::{Config, Location, Status};

    fn state(host: &str, path: &str) -> EngineState {
        let mut config = Config {
            owner: Some("owner".to_string()),
            repo: Some("repo".to_string()),
            ref_name: Some("main".to_string()),
            inner_domain: Some("proj.page".to_string()),
            ..Config::default()
        };
        resolver::derive_hosts(&mut config);
        let location = Location::parse(&format!("https://{}{}", host, path)).unwrap();
        EngineState::new(config, location, Status::default())
    }

    #[test]
    fn environment_predicate() {
        let state = state("main--repo--owner.proj.page", "/en/post");
        assert!(Predicate::Environment(vec![EnvironmentKind::Preview]).eval(&state));
        assert!(!Predicate::Environment(vec![EnvironmentKind::Prod]).eval(&state));
    }

    #[test]
    fn path_filters() {
        let state = state("main--repo--owner.proj.page", "/en/blog/post");
        let included = Predicate::PathMatches {
            include: vec!["/en/".to_string()],
            exclude: vec![],
        };
        assert!(included.eval(&state));

        let excluded = Predicate::PathMatches {
            include: vec!["/en/".to_string()],
            exclude: vec!["/en/blog/".to_string()],
        };
        assert!(!excluded.eval(&state));
    }

    #[test]
    fn combinators() {
        let state = state("main--repo--owner.proj.page", "/en/post");
        let p = Predicate::Project.and(Predicate::Content);
        assert!(p.eval(&state));
        assert!(!Predicate::Not(Box::new(p)).eval(&state));
        assert!(Predicate::Any(vec![Predicate::Authenticated, Predicate::Always]).eval(&state));
    }

    #[test]
    fn custom_predicates_see_the_snapshot() {
        let mut s = state("main--repo--owner.proj.page", "/en/post");
        s.status.web_path = Some("/en/post".to_string());
        let custom = Predicate::Custom(Arc::new(|state: &EngineState| {
            state.status.web_path.as_deref() == Some("/en/post")
        }));
        assert!(custom.eval(&s));
    }
}
