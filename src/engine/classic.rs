//! Classic family policy
//!
//! Time model: a per-segment tick counter (`level_time`) that restarts at
//! every segment boundary. Completed segments' times are kept by the game in
//! save-state memory (`saved_times`, one slot per segment id).

use serde::{Deserialize, Serialize};

use super::{death_edge, fields, secret_edge, DecisionContext, DecisionPolicy, RunMode, SplitKind};
use crate::games::Family;
use crate::ledger::SegmentRecord;
use crate::watch::{Observation, Value};

/// Per-title Classic parameters
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassicParams {
    /// `level_time` must start below this many ticks to count as "just began"
    pub start_threshold: i64,
    /// `menu_choice` value for "New Game"; no menu gating when unset
    pub new_game_choice: Option<i64>,
    /// `menu_choice` value for "exit to title / exit game"; never resets when unset
    pub exit_choice: Option<i64>,
    /// The area-select menu keeps ticking `level_time` after a segment completes
    pub area_select_quirk: bool,
    /// Segment id stored in `saved_times[0]`
    pub saved_time_index_base: i64,
}

impl Default for ClassicParams {
    fn default() -> Self {
        Self {
            start_threshold: 30,
            new_game_choice: None,
            exit_choice: None,
            area_select_quirk: false,
            saved_time_index_base: 1,
        }
    }
}

/// Decision policy for the Classic family
#[derive(Debug, Clone)]
pub struct ClassicPolicy {
    params: ClassicParams,
    /// Set while a completed segment's counter keeps running in a menu
    still_complete: bool,
}

impl ClassicPolicy {
    pub fn new(params: ClassicParams) -> Self {
        Self {
            params,
            still_complete: false,
        }
    }

    pub fn params(&self) -> &ClassicParams {
        &self.params
    }

    /// Whether the area-select latch is holding time
    pub fn is_latched(&self) -> bool {
        self.still_complete
    }

    fn saved_time(&self, saved: Option<&[Value]>, segment_id: i64) -> Option<u64> {
        let index = segment_id - self.params.saved_time_index_base;
        if index < 0 {
            return None;
        }
        let value = saved?.get(index as usize)?.as_i64();
        (value >= 0).then_some(value as u64)
    }

    /// Ledger ticks recorded for a segment, used when memory has no saved slot
    fn recorded_time(ctx: &DecisionContext, segment_id: i64) -> u64 {
        ctx.ledger
            .variant(&ctx.variant.id)
            .map(|v| {
                v.records()
                    .iter()
                    .filter(|r| !r.ignored && r.segment_id == segment_id)
                    .fold(0u64, |total, r| total.saturating_add(r.igt_ticks))
            })
            .unwrap_or(0)
    }
}

impl DecisionPolicy for ClassicPolicy {
    fn family(&self) -> Family {
        Family::Classic
    }

    fn should_start(&self, obs: &Observation, ctx: &DecisionContext) -> bool {
        let Some((old, cur)) = obs.edge_i64(fields::LEVEL_TIME) else {
            return false;
        };
        let just_began = old == 0 && cur > 0 && cur < self.params.start_threshold;
        if !just_began {
            return false;
        }

        match (ctx.settings.mode, self.params.new_game_choice) {
            (RunMode::FullGame, Some(choice)) => {
                obs.current_i64(fields::MENU_CHOICE) == Some(choice)
            }
            _ => true,
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

        if obs.edge_bool(fields::LEVEL_COMPLETE) == Some((false, true)) {
            return Some(SplitKind::Segment);
        }

        if ctx.settings.split_on_secret && secret_edge(obs) {
            return Some(SplitKind::Secret);
        }

        None
    }

    fn should_reset(&self, obs: &Observation, _ctx: &DecisionContext) -> bool {
        match self.params.exit_choice {
            Some(choice) => obs.current_i64(fields::MENU_CHOICE) == Some(choice),
            None => false,
        }
    }

    fn elapsed_ticks(&self, obs: &Observation, ctx: &DecisionContext) -> Option<u64> {
        let (old, cur) = obs.edge_i64(fields::LEVEL_TIME)?;
        if old == cur || self.still_complete {
            return None;
        }

        let current = self.current_segment(obs);
        let saved = obs.current_array(fields::SAVED_TIMES);
        let mut seen = Vec::new();
        let mut total = cur.max(0) as u64;

        for id in ctx.ledger.completed_segments(&ctx.variant.id).iter() {
            if Some(id) == current || seen.contains(&id) {
                continue;
            }
            seen.push(id);
            // Saved slots are game memory and may hold garbage
            total = total.saturating_add(
                self.saved_time(saved, id)
                    .unwrap_or_else(|| Self::recorded_time(ctx, id)),
            );
        }

        Some(total)
    }

    fn segment_record(&self, obs: &Observation, ctx: &DecisionContext, segment_id: i64) -> SegmentRecord {
        if self.split_kind(obs, ctx) == Some(SplitKind::Secret) {
            return SegmentRecord::ignored(segment_id);
        }

        let ticks = if self.current_segment(obs) == Some(segment_id) || obs.current(fields::LEVEL).is_none() {
            obs.current_i64(fields::LEVEL_TIME).unwrap_or(0).max(0) as u64
        } else {
            self.saved_time(obs.current_array(fields::SAVED_TIMES), segment_id)
                .unwrap_or(0)
        };

        SegmentRecord::completed(segment_id, ticks)
            .with_max_completions(ctx.title.max_completions(segment_id))
    }

    fn update(&mut self, obs: &Observation, _ctx: &DecisionContext) {
        if !self.params.area_select_quirk {
            self.still_complete = false;
            return;
        }

        match obs.edge_bool(fields::LEVEL_COMPLETE) {
            Some((false, true)) => self.still_complete = true,
            Some((_, false)) => self.still_complete = false,
            _ => {}
        }

        // A new segment restarts the counter
        if let Some((old, cur)) = obs.edge_i64(fields::LEVEL_TIME) {
            if cur < old {
                self.still_complete = false;
            }
        }
    }

    fn on_run_reset(&mut self) {
        self.still_complete = false;
    }
}
