//! The outward-facing session object.
//!
//! A `Controller` is an explicitly constructed value — there is no global
//! session singleton; uniqueness per page is the caller's responsibility.
//! It composes the config loader, the status store, the plugin registry
//! and the event bus, and owns the session's mutable state.

use std::sync::Arc;
use std::time::Duration;

use stagekit_engine::{
    bulk, EngineState, EventBus, PluginAction, PluginDeclaration, PluginHandle, PluginRegistry,
    Predicate, Sampler,
};
use stagekit_types::{
    Config, EnvSwitch, EnvironmentKind, Event, EventName, EventPayload, Location, PluginSpec,
    Status,
};

use crate::builtins;
use crate::bulk_queue::{self, BulkResponse};
use crate::config_loader::ConfigLoader;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::login::{AuthWindow, Clock, LoginPoll, PollOutcome, PollState};
use crate::notice::Notice;
use crate::status::{RefreshOutcome, StatusStore};
use crate::transport::{Method, Request, Transport};

/// Publication stage an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Preview,
    Live,
    Code,
}

impl Stage {
    fn segment(self) -> &'static str {
        match self {
            Stage::Preview => "preview",
            Stage::Live => "live",
            Stage::Code => "code",
        }
    }
}

/// Structured outcome of a single resource action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub ok: bool,
    /// HTTP status; 0 when no response arrived.
    pub status: u16,
    pub error: Option<String>,
    pub path: String,
}

pub struct ControllerBuilder {
    config: Config,
    location: Location,
    transport: Arc<dyn Transport>,
    sampler: Option<Box<dyn Sampler>>,
    plugins: Vec<PluginDeclaration>,
    load_dictionary: bool,
}

impl ControllerBuilder {
    pub fn new(config: Config, location: Location, transport: Arc<dyn Transport>) -> Self {
        ControllerBuilder {
            config,
            location,
            transport,
            sampler: None,
            plugins: Vec::new(),
            load_dictionary: false,
        }
    }

    pub fn sampler(mut self, sampler: Box<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Caller-supplied plugin, registered after the built-ins.
    pub fn plugin(mut self, decl: PluginDeclaration) -> Self {
        self.plugins.push(decl);
        self
    }

    pub fn load_dictionary(mut self) -> Self {
        self.load_dictionary = true;
        self
    }

    /// Resolve the configuration, register plugins and run the first
    /// refresh cycle. A fatal first fetch leaves the controller alive with
    /// its sticky notice pending; construction itself cannot fail.
    pub async fn open(self) -> Controller {
        let mut loader = ConfigLoader::new(Arc::clone(&self.transport));
        let config = loader.load(self.config, &self.location).await;

        let dictionary = if self.load_dictionary {
            let lang = config.lang.clone().unwrap_or_else(|| "en".to_string());
            Dictionary::fetch(self.transport.as_ref(), config.script_root(), &lang).await
        } else {
            Dictionary::empty()
        };

        let bus = match self.sampler {
            Some(sampler) => EventBus::with_sampler(sampler),
            None => EventBus::new(),
        };

        let mut controller = Controller {
            store: StatusStore::new(Arc::clone(&self.transport)),
            transport: self.transport,
            registry: PluginRegistry::new(),
            bus,
            dictionary,
            config,
            location: self.location,
            status: Status::default(),
            visible: false,
            closed: false,
            notices: Vec::new(),
        };

        let state = controller.state();
        for decl in builtins::declarations() {
            controller.registry.add(decl, &state);
        }
        for spec in controller.config.plugins.clone() {
            controller.registry.add(lower_spec(&spec), &state);
        }
        for decl in self.plugins {
            controller.registry.add(decl, &state);
        }

        let _ = controller.refresh(true).await;
        controller
    }
}

pub struct Controller {
    transport: Arc<dyn Transport>,
    store: StatusStore,
    registry: PluginRegistry,
    bus: EventBus,
    dictionary: Dictionary,
    config: Config,
    location: Location,
    status: Status,
    visible: bool,
    closed: bool,
    notices: Vec<Notice>,
}

impl Controller {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn environment(&self) -> EnvironmentKind {
        stagekit_engine::resolver::classify(&self.config, &self.location)
    }

    pub fn handles(&self) -> &[PluginHandle] {
        self.registry.handles()
    }

    /// The rendered handle for `id`, if currently visible.
    pub fn get_handle(&self, id: &str) -> Option<&PluginHandle> {
        self.registry.get(id)
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Register an event listener.
    pub fn on<F>(&mut self, name: EventName, listener: F)
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        self.bus.on(name, listener);
    }

    /// Pending notices, oldest first.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Pending notices, draining them.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Dismiss the oldest pending notice; terminal notices tear the
    /// session down on acknowledgment.
    pub fn acknowledge_notice(&mut self) {
        if self.notices.is_empty() {
            return;
        }
        let notice = self.notices.remove(0);
        if notice.terminal {
            self.close();
        }
    }

    pub fn show(&mut self) {
        if self.visible || self.closed {
            return;
        }
        self.visible = true;
        self.fire(EventName::Shown, EventPayload::Snapshot(self.state().snapshot()));
    }

    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        self.fire(EventName::Hidden, EventPayload::Snapshot(self.state().snapshot()));
    }

    pub fn toggle(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    pub fn set_show_advanced(&mut self, show: bool) {
        self.registry.set_show_advanced(show);
        let state = self.state();
        self.registry.reevaluate(&state);
    }

    /// Adopt a fresh page address (explicit location refresh).
    pub fn update_location(&mut self, url: &str) -> Result<()> {
        self.location = Location::parse(url)?;
        self.store.invalidate();
        Ok(())
    }

    /// Register a plugin; returns its rendered handle when visible now.
    pub fn add_plugin(&mut self, decl: PluginDeclaration) -> Option<PluginHandle> {
        let state = self.state();
        self.registry.add(decl, &state).cloned()
    }

    pub fn remove_plugin(&mut self, id: &str) {
        self.registry.remove(id);
    }

    /// A plugin's button was used. Fires `pluginused` (and the plugin's
    /// project event, if declared) and hands back a navigation target when
    /// the plugin declares one.
    pub fn use_plugin(&mut self, id: &str) -> Option<String> {
        let action = self
            .registry
            .declaration(id)
            .and_then(|decl| decl.action.clone());
        self.fire(EventName::PluginUsed, EventPayload::Plugin(id.to_string()));
        match action {
            Some(PluginAction::OpenUrl(url)) => Some(url),
            Some(PluginAction::Emit(event)) => {
                self.fire(
                    EventName::custom(&event),
                    EventPayload::Snapshot(self.state().snapshot()),
                );
                None
            }
            None => None,
        }
    }

    /// Fetch the resource status and drive the re-evaluation cycle.
    ///
    /// The status record is replaced before `statusfetched` fires, and the
    /// registry pass runs to completion before this returns. A 401 takes
    /// the same path as success so login affordances can appear. Fatal
    /// errors become a sticky notice and are returned to the caller.
    pub async fn refresh(&mut self, force: bool) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        match self.store.refresh(&self.config, &self.location, force).await {
            Ok(RefreshOutcome::Stale) => Ok(()),
            Ok(RefreshOutcome::Fetched(status)) | Ok(RefreshOutcome::Unauthorized(status)) => {
                self.status = status;
                let state = self.state();
                self.registry.reevaluate(&state);
                self.fire(
                    EventName::StatusFetched,
                    EventPayload::Snapshot(state.snapshot()),
                );
                Ok(())
            }
            Err(err) => {
                self.notices.push(
                    Notice::fatal(err.message_key(), err.is_terminal())
                        .with_detail(err.to_string()),
                );
                Err(err)
            }
        }
    }

    /// One deferred re-check when the plugin list came up empty.
    pub async fn recheck_if_empty(&mut self, clock: &dyn Clock, delay: Duration) {
        if !self.registry.handles().is_empty() || self.closed {
            return;
        }
        clock.sleep(delay).await;
        let state = self.state();
        self.registry.reevaluate(&state);
    }

    /// Build the environment-switch target and announce it.
    pub fn switch_environment(&mut self, kind: EnvironmentKind) -> Result<EnvSwitch> {
        let target_url =
            stagekit_engine::resolver::switch_target(&self.config, &self.location, &self.status, kind)
                .ok_or_else(|| {
                    Error::Config(format!("no host configured for environment {}", kind))
                })?;
        let switch = EnvSwitch {
            source_url: self.location.href(),
            target_url,
        };
        self.fire(EventName::EnvSwitched, EventPayload::Switch(switch.clone()));
        Ok(switch)
    }

    /// Update the preview stage of `path`.
    ///
    /// A first failure triggers exactly one forced status refresh and one
    /// retry (the rename recovery), never more.
    pub async fn update(&mut self, path: &str) -> ActionResult {
        let mut result = self.admin_call(Method::Post, Stage::Preview, path).await;
        if !result.ok {
            let _ = self.refresh(true).await;
            result = self.admin_call(Method::Post, Stage::Preview, path).await;
        }
        if result.ok {
            self.fire(EventName::Updated, EventPayload::Path(result.path.clone()));
            let _ = self.refresh(false).await;
        }
        result
    }

    /// Remove `path` from the preview stage.
    pub async fn delete(&mut self, path: &str) -> ActionResult {
        let result = self.admin_call(Method::Delete, Stage::Preview, path).await;
        if result.ok {
            self.fire(EventName::Deleted, EventPayload::Path(result.path.clone()));
            let _ = self.refresh(false).await;
        }
        result
    }

    /// Publish `path` to the live stage.
    pub async fn publish(&mut self, path: &str) -> ActionResult {
        let result = self.admin_call(Method::Post, Stage::Live, path).await;
        if result.ok {
            self.fire(EventName::Published, EventPayload::Path(result.path.clone()));
            let _ = self.refresh(false).await;
        }
        result
    }

    /// Remove `path` from the live stage.
    pub async fn unpublish(&mut self, path: &str) -> ActionResult {
        let result = self.admin_call(Method::Delete, Stage::Live, path).await;
        if result.ok {
            self.fire(EventName::Unpublished, EventPayload::Path(result.path.clone()));
            let _ = self.refresh(false).await;
        }
        result
    }

    /// Update the code resource at `path` (no rename recovery).
    pub async fn update_code(&mut self, path: &str) -> ActionResult {
        let result = self.admin_call(Method::Post, Stage::Code, path).await;
        if result.ok {
            self.fire(EventName::Updated, EventPayload::Path(result.path.clone()));
        }
        result
    }

    /// Bulk-update the preview stage for a folder selection.
    pub async fn bulk_preview(
        &mut self,
        folder: &str,
        filenames: &[String],
        concurrency: usize,
    ) -> stagekit_engine::BulkSummary {
        self.bulk_operation(folder, filenames, concurrency, Stage::Preview, EventName::Updated)
            .await
    }

    /// Bulk-publish a folder selection to the live stage.
    pub async fn bulk_publish(
        &mut self,
        folder: &str,
        filenames: &[String],
        concurrency: usize,
    ) -> stagekit_engine::BulkSummary {
        self.bulk_operation(folder, filenames, concurrency, Stage::Live, EventName::Published)
            .await
    }

    /// Resolve a selection into shareable URLs on the given environment.
    pub fn bulk_urls(
        &self,
        folder: &str,
        filenames: &[String],
        kind: EnvironmentKind,
    ) -> Vec<String> {
        let Some(host) = stagekit_engine::resolver::host_for(&self.config, kind) else {
            return Vec::new();
        };
        filenames
            .iter()
            .map(|name| format!("https://{}{}", host, bulk::resolve_web_path(folder, name)))
            .collect()
    }

    /// Poll the auth window, then confirm a profile appeared.
    pub async fn login(&mut self, window: &dyn AuthWindow, clock: &dyn Clock) -> PollOutcome {
        let outcome = self.poll_auth(window, clock, true).await;
        if outcome == PollOutcome::Success {
            self.fire(
                EventName::LoggedIn,
                EventPayload::Snapshot(self.state().snapshot()),
            );
        } else {
            self.notices.push(Notice::warning("error_login_timeout"));
        }
        outcome
    }

    /// Poll the auth window, then confirm the profile is gone.
    pub async fn logout(&mut self, window: &dyn AuthWindow, clock: &dyn Clock) -> PollOutcome {
        let outcome = self.poll_auth(window, clock, false).await;
        if outcome == PollOutcome::Success {
            self.fire(
                EventName::LoggedOut,
                EventPayload::Snapshot(self.state().snapshot()),
            );
        } else {
            self.notices.push(Notice::warning("error_logout_timeout"));
        }
        outcome
    }

    /// Tear the session down: plugins gone, listeners gone, hidden.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.registry.clear();
        self.fire(EventName::Hidden, EventPayload::None);
        self.bus.clear();
        self.visible = false;
        self.closed = true;
    }

    fn state(&self) -> EngineState {
        EngineState::new(
            self.config.clone(),
            self.location.clone(),
            self.status.clone(),
        )
    }

    fn fire(&mut self, name: EventName, payload: EventPayload) {
        let event = Event::new(name, payload);
        self.bus.fire(&event, &self.location);
    }

    async fn poll_auth(
        &mut self,
        window: &dyn AuthWindow,
        clock: &dyn Clock,
        expect_profile: bool,
    ) -> PollOutcome {
        let mut poll = LoginPoll::default();
        loop {
            if !poll.tick(clock).await {
                return PollOutcome::TimedOut;
            }
            if poll.state() == PollState::AwaitingWindowClose {
                if !window.is_closed() {
                    continue;
                }
                poll.window_closed();
            }
            if self.refresh(true).await.is_ok()
                && self.status.authenticated() == expect_profile
            {
                return PollOutcome::Success;
            }
        }
    }

    async fn admin_call(&self, method: Method, stage: Stage, path: &str) -> ActionResult {
        let request = Request {
            method,
            url: admin_url(&self.config, stage, path),
        };
        match self.transport.execute(request).await {
            Ok(response) if response.is_ok() => {
                // Successful mutations answer with the canonical web path.
                let path = serde_json::from_str::<serde_json::Value>(&response.body)
                    .ok()
                    .and_then(|doc| {
                        doc.get("webPath")
                            .and_then(|p| p.as_str())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| path.to_string());
                ActionResult {
                    ok: true,
                    status: response.status,
                    error: None,
                    path,
                }
            }
            Ok(response) => ActionResult {
                ok: false,
                status: response.status,
                error: response
                    .error_header
                    .or_else(|| Some(format!("status {}", response.status))),
                path: path.to_string(),
            },
            Err(err) => ActionResult {
                ok: false,
                status: 0,
                error: Some(err.to_string()),
                path: path.to_string(),
            },
        }
    }

    async fn bulk_operation(
        &mut self,
        folder: &str,
        filenames: &[String],
        concurrency: usize,
        stage: Stage,
        success_event: EventName,
    ) -> stagekit_engine::BulkSummary {
        let paths: Vec<String> = filenames
            .iter()
            .map(|name| bulk::resolve_web_path(folder, name))
            .collect();

        let transport = Arc::clone(&self.transport);
        let root = admin_url(&self.config, stage, "");
        let results = bulk_queue::run(paths, concurrency, |path| {
            let transport = Arc::clone(&transport);
            let url = format!("{}{}", root, path);
            async move {
                match transport.execute(Request::post(url)).await {
                    Ok(response) => Ok(BulkResponse {
                        status: response.status,
                        error: response.error_header,
                    }),
                    Err(err) => Err(anyhow::anyhow!(err)),
                }
            }
        })
        .await;

        let summary = bulk::summarize(results, Some(&bulk::normalize_error_message));
        for result in &summary.ok {
            self.fire(success_event.clone(), EventPayload::Path(result.path.clone()));
        }
        self.notices.push(Notice {
            level: summary.severity.into(),
            message_key: match stage {
                Stage::Live => "bulk_publish_done".to_string(),
                _ => "bulk_preview_done".to_string(),
            },
            detail: None,
            sticky: summary.severity != stagekit_engine::Severity::Info,
            terminal: false,
        });
        let _ = self.refresh(false).await;
        summary
    }
}

fn admin_url(config: &Config, stage: Stage, path: &str) -> String {
    format!(
        "{}/{}/{}/{}/{}{}",
        config.admin_root(),
        stage.segment(),
        config.owner.as_deref().unwrap_or_default(),
        config.repo.as_deref().unwrap_or_default(),
        config.ref_name.as_deref().unwrap_or_default(),
        path
    )
}

/// Lower a project-supplied plugin spec into an engine declaration.
fn lower_spec(spec: &PluginSpec) -> PluginDeclaration {
    let mut condition = if spec.environments.is_empty() {
        Predicate::Always
    } else {
        Predicate::Environment(spec.environments.clone())
    };
    if !spec.include_paths.is_empty() || !spec.exclude_paths.is_empty() {
        condition = condition.and(Predicate::PathMatches {
            include: spec.include_paths.clone(),
            exclude: spec.exclude_paths.clone(),
        });
    }

    let mut decl = PluginDeclaration::new(spec.id.clone(), condition);
    if let Some(title) = &spec.title {
        decl = decl.title(title.clone());
    }
    if let Some(container) = &spec.container {
        decl = decl.container(container.clone());
    }
    if spec.feature {
        decl = decl.feature();
    }
    if let Some(url) = &spec.url {
        decl = decl.action(PluginAction::OpenUrl(url.clone()));
    } else if let Some(event) = &spec.event {
        decl = decl.action(PluginAction::Emit(event.clone()));
    }
    decl
}
