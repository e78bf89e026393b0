//! Plugin registry: declarations in, rendered projection out.
//!
//! The rendered set is a derived, idempotent projection of every
//! declaration's condition over the current [`EngineState`]; the
//! re-evaluation pass rebuilds it from scratch, so running it twice with
//! unchanged state changes nothing.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::predicate::Predicate;
use crate::state::EngineState;

/// Callbacks may register further plugins; additions are drained in a
/// follow-up pass, never mid-iteration.
pub type PluginCallback = Arc<dyn Fn(&EngineState) -> Vec<PluginDeclaration> + Send + Sync>;

/// Upper bound on follow-up passes caused by callback registrations.
const MAX_REENTRANT_PASSES: usize = 8;

/// Where a rendered plugin lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    Root,
    /// The feature container, rendered before ordinary plugins.
    Feature,
    /// A named dropdown container.
    Named(String),
}

/// What a plugin's button does when used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginAction {
    /// Navigate to a URL.
    OpenUrl(String),
    /// Fire a project-supplied event.
    Emit(String),
}

/// A declaratively-registered UI affordance.
#[derive(Clone)]
pub struct PluginDeclaration {
    pub id: String,
    /// Visibility condition, re-run on every status refresh.
    pub condition: Predicate,
    /// Enabled/disabled flag, refreshed each pass independent of visibility.
    pub enabled_when: Option<Predicate>,
    /// Pressed-state flag (e.g. the current environment's switcher button).
    pub pinned_when: Option<Predicate>,
    /// Restricts visibility to the power-user mode.
    pub advanced: Option<Predicate>,
    pub container: Option<String>,
    pub feature: bool,
    pub override_existing: bool,
    pub title: Option<String>,
    pub action: Option<PluginAction>,
    /// Invoked once after each (re-)insertion.
    pub callback: Option<PluginCallback>,
}

impl PluginDeclaration {
    pub fn new(id: impl Into<String>, condition: Predicate) -> Self {
        PluginDeclaration {
            id: id.into(),
            condition,
            enabled_when: None,
            pinned_when: None,
            advanced: None,
            container: None,
            feature: false,
            override_existing: false,
            title: None,
            action: None,
            callback: None,
        }
    }

    pub fn enabled_when(mut self, predicate: Predicate) -> Self {
        self.enabled_when = Some(predicate);
        self
    }

    pub fn pinned_when(mut self, predicate: Predicate) -> Self {
        self.pinned_when = Some(predicate);
        self
    }

    pub fn advanced(mut self, predicate: Predicate) -> Self {
        self.advanced = Some(predicate);
        self
    }

    pub fn container(mut self, name: impl Into<String>) -> Self {
        self.container = Some(name.into());
        self
    }

    pub fn feature(mut self) -> Self {
        self.feature = true;
        self
    }

    pub fn override_existing(mut self) -> Self {
        self.override_existing = true;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn action(mut self, action: PluginAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn callback(mut self, callback: PluginCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    fn container_kind(&self) -> ContainerKind {
        if let Some(name) = &self.container {
            ContainerKind::Named(name.clone())
        } else if self.feature {
            ContainerKind::Feature
        } else {
            ContainerKind::Root
        }
    }
}

impl fmt::Debug for PluginDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDeclaration")
            .field("id", &self.id)
            .field("condition", &self.condition)
            .field("container", &self.container)
            .field("feature", &self.feature)
            .finish_non_exhaustive()
    }
}

/// A rendered plugin: the projection the UI consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginHandle {
    pub id: String,
    pub container: ContainerKind,
    pub enabled: bool,
    pub pressed: bool,
}

/// Owns the declared plugins and their rendered projection.
#[derive(Default)]
pub struct PluginRegistry {
    declarations: Vec<PluginDeclaration>,
    rendered: Vec<PluginHandle>,
    show_advanced: bool,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    /// Register a declaration and project it against the current state.
    ///
    /// Returns the rendered handle when the condition holds right now;
    /// either way the declaration stays recorded for future re-evaluation.
    /// Re-registering an id replaces the declaration in place, keeping its
    /// position; `override_existing` marks the replacement as intentional.
    pub fn add(&mut self, decl: PluginDeclaration, state: &EngineState) -> Option<&PluginHandle> {
        let id = decl.id.clone();
        self.upsert(decl);
        self.reevaluate(state);
        self.get(&id)
    }

    /// Drop a declaration and its rendered handle.
    pub fn remove(&mut self, id: &str) {
        self.declarations.retain(|d| d.id != id);
        self.rendered.retain(|h| h.id != id);
    }

    /// The rendered handle for `id`, if currently visible.
    pub fn get(&self, id: &str) -> Option<&PluginHandle> {
        self.rendered.iter().find(|h| h.id == id)
    }

    /// Rendered plugins in display order (feature container first).
    pub fn handles(&self) -> &[PluginHandle] {
        &self.rendered
    }

    pub fn declaration(&self, id: &str) -> Option<&PluginDeclaration> {
        self.declarations.iter().find(|d| d.id == id)
    }

    pub fn set_show_advanced(&mut self, show: bool) {
        self.show_advanced = show;
    }

    /// Drop everything (session teardown).
    pub fn clear(&mut self) {
        self.declarations.clear();
        self.rendered.clear();
    }

    /// Re-run every declaration's predicates against `state`.
    ///
    /// Rebuilds the rendered projection from the declaration list: newly
    /// true conditions insert, newly false ones remove, enablement and
    /// pressed flags refresh either way. Callback-produced declarations are
    /// collected during the pass and processed in follow-up passes over a
    /// fresh snapshot, bounded to keep a misbehaving callback from looping
    /// forever.
    pub fn reevaluate(&mut self, state: &EngineState) {
        for pass in 0.. {
            let previously: HashSet<String> =
                self.rendered.iter().map(|h| h.id.clone()).collect();
            let snapshot = self.declarations.clone();
            let mut next = Vec::with_capacity(snapshot.len());
            let mut spawned = Vec::new();

            let ordered = snapshot
                .iter()
                .filter(|d| d.feature)
                .chain(snapshot.iter().filter(|d| !d.feature));
            for decl in ordered {
                if !self.visible(decl, state) {
                    continue;
                }
                next.push(PluginHandle {
                    id: decl.id.clone(),
                    container: decl.container_kind(),
                    enabled: decl.enabled_when.as_ref().is_none_or(|p| p.eval(state)),
                    pressed: decl.pinned_when.as_ref().is_some_and(|p| p.eval(state)),
                });
                if !previously.contains(&decl.id)
                    && let Some(callback) = &decl.callback
                {
                    spawned.extend(callback(state));
                }
            }
            self.rendered = next;

            if spawned.is_empty() {
                break;
            }
            if pass + 1 >= MAX_REENTRANT_PASSES {
                tracing::warn!(
                    dropped = spawned.len(),
                    "plugin callbacks kept registering plugins; giving up"
                );
                break;
            }
            for decl in spawned {
                self.upsert(decl);
            }
        }
    }

    fn visible(&self, decl: &PluginDeclaration, state: &EngineState) -> bool {
        let gated = match &decl.advanced {
            Some(predicate) => self.show_advanced && predicate.eval(state),
            None => true,
        };
        gated && decl.condition.eval(state)
    }

    fn upsert(&mut self, decl: PluginDeclaration) {
        match self.declarations.iter_mut().find(|d| d.id == decl.id) {
            Some(slot) => *slot = decl,
            None => self.declarations.push(decl),
        }
    }
}
