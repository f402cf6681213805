//! Run-scoped ledger across every variant

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use super::{CompletedSegments, SegmentRecord, VariantLedger};
use crate::games::Variant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
enum EntryKind {
    Stack,
    Home(i64),
}

/// Which variant a push belonged to, in global push order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct OrderEntry {
    variant_id: String,
    kind: EntryKind,
}

/// An amount of in-game time at an explicit tick rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregateTime {
    pub ticks: u64,
    pub tick_rate: u64,
}

impl AggregateTime {
    /// Exact conversion; sub-nanosecond remainders are truncated
    pub fn to_duration(&self) -> Duration {
        ticks_to_duration(self.ticks, self.tick_rate)
    }
}

/// Convert ticks at `tick_rate` per second to a [`Duration`] using integer math
pub fn ticks_to_duration(ticks: u64, tick_rate: u64) -> Duration {
    if tick_rate == 0 {
        return Duration::ZERO;
    }
    let nanos = (ticks % tick_rate) as u128 * 1_000_000_000 / tick_rate as u128;
    Duration::new(ticks / tick_rate, nanos as u32)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `None` when the result does not fit in a u64
fn lcm(a: u64, b: u64) -> Option<u64> {
    (a / gcd(a, b)).checked_mul(b)
}

/// Completed-segment records for one timer session
///
/// Owned by whoever owns the run; cleared on a full timer reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunLedger {
    variants: BTreeMap<String, VariantLedger>,
    order: Vec<OrderEntry>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a split for `variant`
    ///
    /// Home segments go to the variant's completion set instead of its
    /// stack; a home segment that is already completed is ignored and
    /// `false` is returned.
    pub fn push(&mut self, variant: &Variant, record: SegmentRecord) -> bool {
        let ledger = self
            .variants
            .entry(variant.id.clone())
            .or_insert_with(|| VariantLedger::new(variant.tick_rate, variant.final_segment));

        let kind = if variant.is_home(record.segment_id) {
            if !ledger.complete_home(record) {
                log::debug!(
                    "Home segment {} of '{}' already completed",
                    record.segment_id,
                    variant.id
                );
                return false;
            }
            EntryKind::Home(record.segment_id)
        } else {
            ledger.push(record);
            EntryKind::Stack
        };

        log::debug!(
            "Ledger push '{}' segment {} ({} ticks{})",
            variant.id,
            record.segment_id,
            record.igt_ticks,
            if record.ignored { ", ignored" } else { "" }
        );
        self.order.push(OrderEntry {
            variant_id: variant.id.clone(),
            kind,
        });
        true
    }

    /// Reverse the most recent push across all variants
    pub fn pop(&mut self) -> Option<SegmentRecord> {
        let entry = self.order.pop()?;
        let ledger = self.variants.get_mut(&entry.variant_id)?;

        let record = match entry.kind {
            EntryKind::Stack => ledger.pop(),
            EntryKind::Home(segment_id) => ledger.undo_home(segment_id),
        };

        if ledger.is_empty() {
            self.variants.remove(&entry.variant_id);
        }

        if let Some(r) = &record {
            log::debug!("Ledger pop '{}' segment {}", entry.variant_id, r.segment_id);
        }
        record
    }

    pub fn variant(&self, variant_id: &str) -> Option<&VariantLedger> {
        self.variants.get(variant_id)
    }

    /// Stored ticks for a variant (0 if nothing recorded)
    pub fn variant_total(&self, variant_id: &str) -> u64 {
        self.variants.get(variant_id).map_or(0, |v| v.total())
    }

    pub fn completed_segments(&self, variant_id: &str) -> CompletedSegments {
        self.variants
            .get(variant_id)
            .map(|v| v.completed_segments())
            .unwrap_or_default()
    }

    /// Stored ticks of every variant at its native rate
    pub fn totals(&self) -> BTreeMap<String, u64> {
        self.variants
            .iter()
            .map(|(id, v)| (id.clone(), v.total()))
            .collect()
    }

    /// Total in-game time across all variants
    ///
    /// Every other variant contributes its stored total. The active variant
    /// contributes its stored total once its final segment is recorded,
    /// otherwise `live_ticks` (its whole in-progress time). Totals at
    /// different native rates are scaled to their least common multiple.
    ///
    /// Returns `None` when the active variant is in progress and no live
    /// time is available, or when the common rate does not fit in a u64.
    pub fn aggregate_elapsed(&self, active: &Variant, live_ticks: Option<u64>) -> Option<AggregateTime> {
        let active_ledger = self.variants.get(&active.id);
        let active_ticks = match active_ledger {
            Some(ledger) if ledger.is_complete() => ledger.total(),
            _ => live_ticks?,
        };

        let mut common = active.tick_rate.max(1) as u64;
        for rate in self.variants.values().map(|v| v.tick_rate() as u64) {
            if rate > 0 {
                let Some(next) = lcm(common, rate) else {
                    log::warn!("Tick rates have no common multiple below 2^64; time unavailable");
                    return None;
                };
                common = next;
            }
        }

        let mut ticks = active_ticks.saturating_mul(common / active.tick_rate.max(1) as u64);
        for (id, ledger) in &self.variants {
            if *id == active.id || ledger.tick_rate() == 0 {
                continue;
            }
            let scale = common / ledger.tick_rate() as u64;
            ticks = ticks.saturating_add(ledger.total().saturating_mul(scale));
        }

        Some(AggregateTime {
            ticks,
            tick_rate: common,
        })
    }

    /// Number of pushes that can still be undone
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget everything; used on a full timer reset
    pub fn clear(&mut self) {
        self.variants.clear();
        self.order.clear();
        log::debug!("Ledger cleared");
    }
}
