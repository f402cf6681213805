//! Later family policy
//!
//! Time model: one monotonic tick counter (`timer`) since New Game, saved
//! and reloaded with the save data. Segment boundaries are signalled by
//! `next_level`, which is nonzero only while the next segment loads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{death_edge, fields, secret_edge, DecisionContext, DecisionPolicy, RunMode, SplitKind};
use crate::games::Family;
use crate::ledger::{SegmentRecord, TransitionDirection};
use crate::watch::Observation;

/// Per-title Later parameters
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LaterParams {
    /// `next_level` value written when New Game is chosen
    pub new_game_sentinel: i64,
    /// Segment id of the main menu
    pub menu_segment: i64,
    /// Cutscene segments; only split when cutscene splits are enabled
    pub cutscene_segments: Vec<i64>,
}

impl Default for LaterParams {
    fn default() -> Self {
        Self {
            new_game_sentinel: 1,
            menu_segment: 0,
            cutscene_segments: Vec::new(),
        }
    }
}

/// Decision policy for the Later family
#[derive(Debug, Clone)]
pub struct LaterPolicy {
    params: LaterParams,
    /// Tick counter value at run start, per variant
    ticks_at_start: HashMap<String, u64>,
    running: bool,
}

impl LaterPolicy {
    pub fn new(params: LaterParams) -> Self {
        Self {
            params,
            ticks_at_start: HashMap::new(),
            running: false,
        }
    }

    pub fn params(&self) -> &LaterParams {
        &self.params
    }

    /// Baseline captured for a variant, if the run has reached it
    pub fn ticks_at_start(&self, variant_id: &str) -> Option<u64> {
        self.ticks_at_start.get(variant_id).copied()
    }

    /// 0 when starting at the very first segment, else the counter's previous value
    fn baseline(obs: &Observation, ctx: &DecisionContext) -> u64 {
        if obs.current_i64(fields::LEVEL) == Some(ctx.variant.first_segment) {
            0
        } else {
            obs.old_i64(fields::TIMER).unwrap_or(0).max(0) as u64
        }
    }

    /// The game is resetting its own state; counters may jump
    fn mid_initialization(obs: &Observation) -> bool {
        obs.current_bool(fields::LOADING) == Some(true) || obs.old_i64(fields::TIMER) == Some(0)
    }

    fn segment_edge(&self, obs: &Observation, ctx: &DecisionContext) -> bool {
        let Some((old, target)) = obs.edge_i64(fields::NEXT_LEVEL) else {
            return false;
        };
        if old != 0 || target == 0 {
            return false;
        }

        let current = self.current_segment(obs);
        if current == Some(self.params.menu_segment) {
            return false;
        }
        if target == self.params.menu_segment && current != Some(ctx.variant.final_segment) {
            return false;
        }
        if self.params.cutscene_segments.contains(&target) && !ctx.settings.split_on_cutscene {
            return false;
        }
        true
    }
}

impl DecisionPolicy for LaterPolicy {
    fn family(&self) -> Family {
        Family::Later
    }

    fn should_start(&self, obs: &Observation, ctx: &DecisionContext) -> bool {
        let Some((old, cur)) = obs.edge_i64(fields::NEXT_LEVEL) else {
            return false;
        };
        if old == 0 || cur != 0 {
            return false;
        }

        match ctx.settings.mode {
            RunMode::FullGame => old == self.params.new_game_sentinel,
            RunMode::IndividualSegment | RunMode::Deathrun => true,
        }
    }

    fn split_kind(&self, obs: &Observation, ctx: &DecisionContext) -> Option<SplitKind> {
        if let Some(segment) = self.current_segment(obs) {
            if ctx.is_completed(segment) {
                return None;
            }
        }

        if ctx.settings.is_deathrun() {
            return death_edge(obs).then_some(SplitKind::Death);
        }

        if self.segment_edge(obs, ctx) {
            return Some(SplitKind::Segment);
        }

        if ctx.settings.split_on_secret
            && secret_edge(obs)
            && !Self::mid_initialization(obs)
            && obs.current_bool(fields::INVENTORY_OPEN) != Some(true)
        {
            return Some(SplitKind::Secret);
        }

        None
    }

    fn should_reset(&self, obs: &Observation, ctx: &DecisionContext) -> bool {
        if !ctx.settings.auto_reset {
            return false;
        }

        obs.current_i64(fields::NEXT_LEVEL) == Some(0)
            && obs.current_i64(fields::LEVEL) == Some(self.params.menu_segment)
            && obs.current_bool(fields::LOADING) == Some(true)
            && matches!(obs.old_i64(fields::LEVEL), Some(prev) if prev != self.params.menu_segment)
    }

    fn elapsed_ticks(&self, obs: &Observation, ctx: &DecisionContext) -> Option<u64> {
        if ctx.settings.is_deathrun() {
            if let Some(health) = obs.current_f64(fields::HEALTH) {
                if health <= 0.0 {
                    return None;
                }
            }
        }

        let (old, cur) = obs.edge_i64(fields::TIMER)?;
        if old == cur || cur < 0 {
            return None;
        }

        let start = self.ticks_at_start(&ctx.variant.id).unwrap_or(0);
        // A save from another timeline can read below the baseline
        (cur as u64).checked_sub(start)
    }

    fn segment_record(&self, obs: &Observation, ctx: &DecisionContext, segment_id: i64) -> SegmentRecord {
        if self.split_kind(obs, ctx) == Some(SplitKind::Secret) {
            return SegmentRecord::ignored(segment_id);
        }

        let timer = obs.current_i64(fields::TIMER).unwrap_or(0).max(0) as u64;
        let consumed = self.ticks_at_start(&ctx.variant.id).unwrap_or(0)
            + ctx.ledger.variant_total(&ctx.variant.id);

        let direction = obs
            .current_i64(fields::NEXT_LEVEL)
            .filter(|&next| next != 0)
            .map(|next| TransitionDirection::between(segment_id, next))
            .unwrap_or_default();

        SegmentRecord::completed(segment_id, timer.saturating_sub(consumed))
            .with_max_completions(ctx.title.max_completions(segment_id))
            .with_direction(direction)
    }

    fn update(&mut self, obs: &Observation, ctx: &DecisionContext) {
        // Entering another variant mid-run gives it its own baseline
        if self.running && !self.ticks_at_start.contains_key(&ctx.variant.id) {
            let baseline = Self::baseline(obs, ctx);
            log::debug!("Variant '{}' baseline {} ticks", ctx.variant.id, baseline);
            self.ticks_at_start.insert(ctx.variant.id.clone(), baseline);
        }
    }

    fn on_run_start(&mut self, obs: &Observation, ctx: &DecisionContext) {
        self.ticks_at_start.clear();
        let baseline = Self::baseline(obs, ctx);
        self.ticks_at_start.insert(ctx.variant.id.clone(), baseline);
        self.running = true;
        log::debug!("Run started in '{}' at {} ticks", ctx.variant.id, baseline);
    }

    fn on_run_reset(&mut self) {
        self.ticks_at_start.clear();
        self.running = false;
    }
}
