//! Tick-sampled memory observation
//!
//! A [`WatchSet`] binds a version's [`FieldTable`] to a running process and
//! samples every field once per tick. The resulting [`Observation`] exposes
//! the newest and the previous sample of each field, which is all the
//! decision policies ever look at.

mod field;
mod observation;
mod set;
mod value;

pub use field::{FieldSpec, FieldTable};
pub use observation::Observation;
pub use set::WatchSet;
pub use value::{Value, ValueType};
