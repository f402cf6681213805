//! Decision policies
//!
//! A policy turns the current/previous field samples into the four host
//! decisions (start, split, reset, elapsed time). There are exactly two
//! implementations, one per [`Family`]; per-title quirks are parameters in
//! the catalog, not new types.
//!
//! Policies never read memory themselves. They see an
//! [`Observation`](crate::watch::Observation) plus a [`DecisionContext`]
//! carrying the user's settings, the title, the active variant and the run
//! ledger.

pub mod classic;
pub mod later;
mod settings;

pub use classic::{ClassicParams, ClassicPolicy};
pub use later::{LaterParams, LaterPolicy};
pub use settings::{shared_settings, RunMode, RunSettings, SharedSettings};

use crate::games::{Family, TitleConfig, Variant};
use crate::ledger::{RunLedger, SegmentRecord};
use crate::watch::Observation;

/// Well-known field names looked up in every version's field table
///
/// A version that omits a field opts out of every rule that uses it.
pub mod fields {
    /// Current segment id
    pub const LEVEL: &str = "level";
    /// Selects the active variant
    pub const VARIANT: &str = "variant";
    /// Player health; deathrun splits and pauses
    pub const HEALTH: &str = "health";
    /// Monotonic secret/bonus counter
    pub const SECRETS: &str = "secrets";

    /// Classic: per-segment tick counter
    pub const LEVEL_TIME: &str = "level_time";
    /// Classic: "segment complete" flag
    pub const LEVEL_COMPLETE: &str = "level_complete";
    /// Classic: selected title-screen/pause-menu entry
    pub const MENU_CHOICE: &str = "menu_choice";
    /// Classic: saved per-segment times (array field)
    pub const SAVED_TIMES: &str = "saved_times";

    /// Later: tick counter since New Game
    pub const TIMER: &str = "timer";
    /// Later: segment about to load, nonzero only momentarily
    pub const NEXT_LEVEL: &str = "next_level";
    /// Later: loading flag
    pub const LOADING: &str = "loading";
    /// Later: inventory/menu overlay open
    pub const INVENTORY_OPEN: &str = "inventory_open";
}

/// Why a split fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    /// The current segment was completed
    Segment,
    /// A secret/bonus pickup; does not complete the segment
    Secret,
    /// The player died during a deathrun
    Death,
}

/// Everything besides the field samples a policy may consult
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub settings: &'a RunSettings,
    pub title: &'a TitleConfig,
    pub variant: &'a Variant,
    pub ledger: &'a RunLedger,
}

impl DecisionContext<'_> {
    /// Whether `segment_id` has reached its completion limit in this attempt
    ///
    /// The home segment counts once, through the variant's completion set.
    pub fn is_completed(&self, segment_id: i64) -> bool {
        if self.variant.is_home(segment_id) {
            return self
                .ledger
                .variant(&self.variant.id)
                .map_or(false, |v| v.is_home_completed(segment_id));
        }

        let done = self
            .ledger
            .completed_segments(&self.variant.id)
            .count(segment_id);
        done >= self.title.max_completions(segment_id)
    }
}

/// Trait implemented by both decision families
pub trait DecisionPolicy: Send + Sync {
    fn family(&self) -> Family;

    /// Id of the segment the player is in
    fn current_segment(&self, obs: &Observation) -> Option<i64> {
        obs.current_i64(fields::LEVEL)
    }

    fn should_start(&self, obs: &Observation, ctx: &DecisionContext) -> bool;

    /// The reason a split should happen this tick, if any
    fn split_kind(&self, obs: &Observation, ctx: &DecisionContext) -> Option<SplitKind>;

    fn should_split(&self, obs: &Observation, ctx: &DecisionContext) -> bool {
        self.split_kind(obs, ctx).is_some()
    }

    fn should_reset(&self, obs: &Observation, ctx: &DecisionContext) -> bool;

    /// In-game ticks of the active variant at its native rate, or `None`
    /// while time is not advancing
    fn elapsed_ticks(&self, obs: &Observation, ctx: &DecisionContext) -> Option<u64>;

    /// Record describing the segment the host just split on
    fn segment_record(&self, obs: &Observation, ctx: &DecisionContext, segment_id: i64) -> SegmentRecord;

    /// Called once per successful refresh, before any query
    fn update(&mut self, _obs: &Observation, _ctx: &DecisionContext) {}

    fn on_run_start(&mut self, _obs: &Observation, _ctx: &DecisionContext) {}

    fn on_run_reset(&mut self) {}
}

/// Boxed policy type
pub type BoxedPolicy = Box<dyn DecisionPolicy>;

/// Policy for a title's family, configured from its parameters
pub fn create_policy(title: &TitleConfig) -> BoxedPolicy {
    match title.family {
        Family::Classic => Box::new(ClassicPolicy::new(title.classic.clone())),
        Family::Later => Box::new(LaterPolicy::new(title.later.clone())),
    }
}

/// Health crossed from alive to dead this tick
pub(crate) fn death_edge(obs: &Observation) -> bool {
    matches!(obs.edge_f64(fields::HEALTH), Some((old, cur)) if old > 0.0 && cur <= 0.0)
}

/// The secret counter went up this tick
pub(crate) fn secret_edge(obs: &Observation) -> bool {
    matches!(obs.edge_i64(fields::SECRETS), Some((old, cur)) if cur > old)
}
