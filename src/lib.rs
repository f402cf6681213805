//! IGT Autosplitter
//!
//! A memory-based autosplit engine for speedrun timers. It identifies the
//! exact game build that is running, samples a small table of named values
//! from its memory once per tick, and turns their changes into start, split
//! and reset decisions plus an in-game time readout.
//!
//! Game knowledge is data: titles, builds and field tables come from TOML
//! catalogs (see [`games`]). Two decision families cover every title
//! (see [`engine`]). Completed segments accumulate in an undoable
//! [`RunLedger`](ledger::RunLedger).
//!
//! ```no_run
//! use igt_autosplitter::{engine, Autosplitter, GameCatalog};
//!
//! let catalog = GameCatalog::load_dir(std::path::Path::new("catalog"))?;
//! let settings = engine::shared_settings(engine::RunSettings::default());
//! let mut splitter = Autosplitter::with_system_finder(catalog, settings);
//!
//! if splitter.refresh() && splitter.should_split() {
//!     let segment = splitter.current_segment().unwrap_or_default();
//!     splitter.on_segment_split(segment);
//! }
//! # Ok::<(), igt_autosplitter::AutosplitterError>(())
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod games;
pub mod ledger;
pub mod memory;
pub mod watch;

// Re-export commonly used types
pub use crate::core::{Autosplitter, AutosplitterState, SubscriptionId, VersionStatus};
pub use engine::{RunMode, RunSettings, SharedSettings};
pub use error::{AutosplitterError, Result};
pub use games::{DetectionResult, GameCatalog, VersionDescriptor};
pub use ledger::{RunLedger, SegmentRecord};
