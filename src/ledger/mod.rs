//! Stats ledger
//!
//! Completed-segment records per variant, with exact undo. The
//! [`RunLedger`] is an explicit value owned by the run; nothing here is
//! global state.

mod completed;
mod record;
mod run;
mod variant;

pub use completed::CompletedSegments;
pub use record::{SegmentRecord, TransitionDirection};
pub use run::{ticks_to_duration, AggregateTime, RunLedger};
pub use variant::VariantLedger;
