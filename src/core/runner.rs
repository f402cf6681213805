//! Main autosplitter runner
//!
//! [`Autosplitter`] is what a timer host talks to. Once per tick the host
//! calls [`refresh`](Autosplitter::refresh) and then polls the decisions;
//! when its own timer changes state it calls the lifecycle callbacks. No
//! error crosses this boundary: failures read as `false` or `None`.

use std::sync::Arc;
use std::time::Duration;

use super::{AutosplitterState, GameSession, SubscriptionId, VersionCallback, VersionStatus};
use crate::engine::{create_policy, fields, BoxedPolicy, DecisionContext, DecisionPolicy, SharedSettings};
use crate::error::Result;
use crate::games::{GameCatalog, Variant};
use crate::ledger::RunLedger;
use crate::memory::{ProcessFinder, SystemProcessFinder};
use crate::watch::Observation;

/// Host-facing autosplitter
pub struct Autosplitter {
    catalog: Arc<GameCatalog>,
    session: GameSession,
    policy: Option<BoxedPolicy>,
    /// Title the current policy was built for
    policy_title: Option<String>,
    variant: Option<Variant>,
    ledger: RunLedger,
    settings: SharedSettings,
    /// Whether the last refresh produced fresh samples
    updated: bool,
}

impl Autosplitter {
    /// Create an autosplitter over a catalog and a process capability
    pub fn new(catalog: GameCatalog, finder: Box<dyn ProcessFinder>, settings: SharedSettings) -> Self {
        let catalog = Arc::new(catalog);
        log::info!(
            "Autosplitter created for {} titles",
            catalog.titles().len()
        );
        Self {
            session: GameSession::new(catalog.clone(), finder),
            catalog,
            policy: None,
            policy_title: None,
            variant: None,
            ledger: RunLedger::new(),
            settings,
            updated: false,
        }
    }

    /// Create an autosplitter that looks for real processes
    pub fn with_system_finder(catalog: GameCatalog, settings: SharedSettings) -> Self {
        Self::new(catalog, Box::new(SystemProcessFinder::new()), settings)
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    /// Settings handle shared with the settings collaborator
    pub fn settings(&self) -> SharedSettings {
        self.settings.clone()
    }

    pub fn ledger(&self) -> &RunLedger {
        &self.ledger
    }

    pub fn version_status(&self) -> &VersionStatus {
        self.session.status()
    }

    // =========================================================================
    // POLL CONTRACT
    // =========================================================================

    /// Sample the game once. Returns whether the sample succeeded.
    pub fn refresh(&mut self) -> bool {
        self.updated = self.session.refresh();
        self.sync_policy();
        if !self.updated {
            return false;
        }

        let Some(obs) = self.session.observation() else {
            return false;
        };
        let Some(title) = self
            .policy_title
            .as_deref()
            .and_then(|id| self.catalog.title(id))
        else {
            return false;
        };

        let variant = title.select_variant(obs.current_i64(fields::VARIANT));
        if variant.as_ref().map(|v| &v.id) != self.variant.as_ref().map(|v| &v.id) {
            if let Some(v) = &variant {
                log::info!("Active variant: {}", v.id);
            }
        }
        self.variant = variant;

        if let (Some(policy), Some(variant)) = (self.policy.as_mut(), self.variant.as_ref()) {
            let settings = *self.settings.read();
            let ctx = DecisionContext {
                settings: &settings,
                title,
                variant,
                ledger: &self.ledger,
            };
            policy.update(obs, &ctx);
        }
        true
    }

    /// In-game time across every variant of the run
    ///
    /// `None` while the game's timer is not advancing, the last refresh
    /// failed, or no build is bound.
    pub fn query_elapsed_time(&self) -> Option<Duration> {
        let live = self.decide(|p, obs, ctx| p.elapsed_ticks(obs, ctx))?;
        let variant = self.variant.as_ref()?;
        self.ledger
            .aggregate_elapsed(variant, live)
            .map(|t| t.to_duration())
    }

    /// The host should pause its game-time clock whenever
    /// [`query_elapsed_time`](Self::query_elapsed_time) is `None`
    pub fn is_elapsed_time_paused_when_unavailable(&self) -> bool {
        true
    }

    pub fn should_start(&self) -> bool {
        let start = self
            .decide(|p, obs, ctx| p.should_start(obs, ctx))
            .unwrap_or(false);
        if start {
            log::debug!("Start condition met");
        }
        start
    }

    pub fn should_split(&self) -> bool {
        let split = self.decide(|p, obs, ctx| p.split_kind(obs, ctx)).flatten();
        if let Some(kind) = split {
            log::debug!("Split condition met ({:?})", kind);
        }
        split.is_some()
    }

    pub fn should_reset(&self) -> bool {
        let reset = self
            .decide(|p, obs, ctx| p.should_reset(obs, ctx))
            .unwrap_or(false);
        if reset {
            log::debug!("Reset condition met");
        }
        reset
    }

    // =========================================================================
    // LIFECYCLE CALLBACKS
    // =========================================================================

    /// The host timer started
    pub fn on_run_start(&mut self) {
        self.ledger.clear();

        let (Some(obs), Some(policy), Some(variant)) = (
            self.session.observation(),
            self.policy.as_mut(),
            self.variant.as_ref(),
        ) else {
            log::debug!("Run started with no bound game");
            return;
        };
        let Some(title) = self.catalog.title(&variant.title_id) else {
            return;
        };

        let settings = *self.settings.read();
        let ctx = DecisionContext {
            settings: &settings,
            title,
            variant,
            ledger: &self.ledger,
        };
        policy.on_run_start(obs, &ctx);
        log::info!("Run started in variant '{}'", variant.id);
    }

    /// The host timer split; `segment_id` is the game segment just completed,
    /// normally [`current_segment`](Self::current_segment) on the tick
    /// [`should_split`](Self::should_split) fired
    pub fn on_segment_split(&mut self, segment_id: i64) {
        let Some(record) = self.with_context(|p, obs, ctx| p.segment_record(obs, ctx, segment_id)) else {
            log::warn!("Split on segment {} with no bound game; not recorded", segment_id);
            return;
        };
        if let Some(variant) = &self.variant {
            self.ledger.push(variant, record);
        }
    }

    /// The host timer undid its last split
    pub fn on_segment_undo(&mut self) {
        if self.ledger.pop().is_none() {
            log::debug!("Undo with an empty ledger");
        }
    }

    /// The host timer performed a full reset
    pub fn on_run_reset(&mut self) {
        self.ledger.clear();
        if let Some(policy) = self.policy.as_mut() {
            policy.on_run_reset();
        }
        log::info!("Run reset");
    }

    // =========================================================================
    // NOTIFICATIONS AND STATUS
    // =========================================================================

    /// Register a version-changed callback; it lives as long as this autosplitter
    pub fn subscribe_version_changed(&mut self, callback: VersionCallback) -> SubscriptionId {
        self.session.subscribe(callback)
    }

    pub fn unsubscribe_version_changed(&mut self, id: SubscriptionId) -> bool {
        self.session.unsubscribe(id)
    }

    /// Segment the player is in, from the last good sample
    pub fn current_segment(&self) -> Option<i64> {
        let obs = self.session.observation()?;
        self.policy.as_ref()?.current_segment(obs)
    }

    pub fn active_variant(&self) -> Option<&Variant> {
        self.variant.as_ref()
    }

    /// Get the current state
    pub fn state(&self) -> AutosplitterState {
        let process = self.session.process();
        AutosplitterState {
            process_attached: self.session.is_bound(),
            process_id: process.map(|p| p.pid),
            process_name: process.map(|p| p.name.clone()),
            version: self.session.status().clone(),
            last_refresh_ok: self.updated,
            active_variant: self.variant.as_ref().map(|v| v.id.clone()),
            current_segment: self.current_segment(),
            completed_segments: self
                .variant
                .as_ref()
                .map(|v| self.ledger.completed_segments(&v.id).as_slice().to_vec())
                .unwrap_or_default(),
            ledger_totals: self.ledger.totals(),
            undo_depth: self.ledger.len(),
        }
    }

    /// Current state as JSON for the status display
    pub fn state_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.state())?)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Rebuild the policy when a different title gets bound
    fn sync_policy(&mut self) {
        let Some(version) = self.session.version() else {
            return;
        };
        if self.policy_title.as_deref() == Some(version.title_id.as_str()) {
            return;
        }
        let Some(title) = self.catalog.title(&version.title_id) else {
            return;
        };

        log::info!("Using {:?} policy for '{}'", title.family, title.id);
        self.policy = Some(create_policy(title));
        self.policy_title = Some(title.id.clone());
        self.variant = None;
    }

    /// Evaluate against the last good sample, regardless of this tick's outcome
    fn with_context<R>(
        &self,
        f: impl FnOnce(&dyn DecisionPolicy, &Observation, &DecisionContext) -> R,
    ) -> Option<R> {
        let obs = self.session.observation()?;
        let policy = self.policy.as_deref()?;
        let variant = self.variant.as_ref()?;
        let title = self.catalog.title(&variant.title_id)?;
        let settings = *self.settings.read();
        let ctx = DecisionContext {
            settings: &settings,
            title,
            variant,
            ledger: &self.ledger,
        };
        Some(f(policy, obs, &ctx))
    }

    /// Evaluate only when this tick's refresh succeeded
    fn decide<R>(
        &self,
        f: impl FnOnce(&dyn DecisionPolicy, &Observation, &DecisionContext) -> R,
    ) -> Option<R> {
        if !self.updated {
            return None;
        }
        self.with_context(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{shared_settings, RunSettings};
    use crate::memory::MockProcessFinder;

    fn empty() -> Autosplitter {
        Autosplitter::new(
            GameCatalog::new(),
            Box::new(MockProcessFinder::new()),
            shared_settings(RunSettings::default()),
        )
    }

    #[test]
    fn test_unbound_answers_are_neutral() {
        let mut splitter = empty();
        assert!(!splitter.refresh());
        assert!(!splitter.should_start());
        assert!(!splitter.should_split());
        assert!(!splitter.should_reset());
        assert_eq!(splitter.query_elapsed_time(), None);
        assert!(splitter.is_elapsed_time_paused_when_unavailable());
        assert_eq!(splitter.current_segment(), None);
    }

    #[test]
    fn test_lifecycle_without_game_is_harmless() {
        let mut splitter = empty();
        splitter.on_run_start();
        splitter.on_segment_split(3);
        splitter.on_segment_undo();
        splitter.on_run_reset();
        assert!(splitter.ledger().is_empty());
    }

    #[test]
    fn test_state_json_when_idle() {
        let splitter = empty();
        let state = splitter.state();
        assert!(!state.process_attached);
        assert_eq!(state.version, VersionStatus::None);
        assert!(splitter.state_json().unwrap().contains("\"process_attached\":false"));
    }
}
