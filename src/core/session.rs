//! Game session: binds the observation layer to a detected build

use std::sync::Arc;

use super::{EventHandler, SubscriptionId, VersionCallback, VersionStatus};
use crate::error::{AutosplitterError, Result};
use crate::games::{DetectionResult, GameCatalog, VersionDescriptor, VersionDetector};
use crate::memory::{MemoryReader, ProcessFinder, ProcessRef};
use crate::watch::{Observation, WatchSet};

/// A bound process and its sampled fields
struct Binding {
    process: ProcessRef,
    reader: Box<dyn MemoryReader>,
    version: VersionDescriptor,
    watch: WatchSet,
}

/// Owns the process handle and the observation layer
///
/// `Unbound` until detection finds a known build; then `Bound` until the
/// process exits. A failed read while bound only fails that tick.
pub struct GameSession {
    catalog: Arc<GameCatalog>,
    finder: Box<dyn ProcessFinder>,
    detector: VersionDetector,
    binding: Option<Binding>,
    events: EventHandler,
    status: VersionStatus,
    /// Last refresh outcome, to log failures once per transition
    last_ok: bool,
}

impl GameSession {
    pub fn new(catalog: Arc<GameCatalog>, finder: Box<dyn ProcessFinder>) -> Self {
        let detector = VersionDetector::new(&catalog);
        Self {
            catalog,
            finder,
            detector,
            binding: None,
            events: EventHandler::new(),
            status: VersionStatus::None,
            last_ok: true,
        }
    }

    /// Run one tick. Returns whether fresh samples are available.
    pub fn refresh(&mut self) -> bool {
        let ok = self.tick();
        if ok != self.last_ok {
            if ok {
                log::debug!("Refresh recovered");
            } else {
                log::debug!("Refresh failed; decisions suspended");
            }
            self.last_ok = ok;
        }
        ok
    }

    fn tick(&mut self) -> bool {
        if let Some(binding) = &mut self.binding {
            if !self.finder.is_running(&binding.process) || !binding.reader.is_valid() {
                log::info!(
                    "Process {} (PID {}) exited",
                    binding.process.name,
                    binding.process.pid
                );
                self.binding = None;
                self.set_status(VersionStatus::None);
                return false;
            }

            return match binding.watch.update(binding.reader.as_ref()) {
                Ok(()) => true,
                Err(e) => {
                    log::debug!("Tick discarded: {}", e);
                    false
                }
            };
        }

        match self.detector.detect(self.finder.as_ref()) {
            DetectionResult::NotFound => {
                self.set_status(VersionStatus::None);
                false
            }
            DetectionResult::Unknown { process, hash } => {
                if self.status != VersionStatus::Unknown(hash.clone()) {
                    log::warn!(
                        "{} (PID {}) has unknown executable hash {}",
                        process.name,
                        process.pid,
                        hash
                    );
                }
                self.set_status(VersionStatus::Unknown(hash));
                false
            }
            DetectionResult::Found { process, version, .. } => match self.bind(process, version) {
                Ok(()) => true,
                Err(e) => {
                    log::debug!("Bind failed, retrying next tick: {}", e);
                    false
                }
            },
        }
    }

    fn bind(&mut self, process: ProcessRef, version: VersionDescriptor) -> Result<()> {
        let (_, config) = self.catalog.resolve(&version)?;
        let reader = self
            .finder
            .open_process(&process)
            .ok_or(AutosplitterError::ProcessNotFound)?;

        let mut watch = WatchSet::bind(&config.fields, &process);
        watch.prime(reader.as_ref())?;

        log::info!(
            "Bound {} to {} (PID {}, {} fields)",
            version,
            process.name,
            process.pid,
            watch.len()
        );

        self.binding = Some(Binding {
            process,
            reader,
            version: version.clone(),
            watch,
        });
        self.set_status(VersionStatus::Found(version));
        Ok(())
    }

    /// Emit a notification only when the status actually changes
    fn set_status(&mut self, status: VersionStatus) {
        if self.status != status {
            self.status = status;
            self.events.emit(&self.status);
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn status(&self) -> &VersionStatus {
        &self.status
    }

    pub fn version(&self) -> Option<&VersionDescriptor> {
        self.binding.as_ref().map(|b| &b.version)
    }

    pub fn process(&self) -> Option<&ProcessRef> {
        self.binding.as_ref().map(|b| &b.process)
    }

    /// Field samples of the bound process (last good values after a failed tick)
    pub fn observation(&self) -> Option<&Observation> {
        self.binding.as_ref().map(|b| b.watch.observation())
    }

    pub fn subscribe(&mut self, callback: VersionCallback) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MockMemoryReader, MockProcessFinder};
    use parking_lot::Mutex;
    use std::io::Write;
    use std::path::PathBuf;

    const BASE: usize = 0x400000;

    struct Harness {
        session: GameSession,
        finder: MockProcessFinder,
        events: Arc<Mutex<Vec<VersionStatus>>>,
        known: tempfile::NamedTempFile,
        known_hash: String,
    }

    fn exe(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn harness() -> Harness {
        let known = exe(b"session build");
        let known_hash = crate::games::hash_executable(known.path()).unwrap();
        let catalog = GameCatalog::from_toml_str(&format!(
            r#"
            [[title]]
            id = "crypt"
            name = "Crypt"
            family = "classic"
            process_names = ["crypt.exe"]

            [[title.variants]]
            id = "crypt"
            first_segment = 1
            final_segment = 10

            [[title.versions]]
            id = "1.0"
            hash = "{known_hash}"

            [title.versions.fields.level]
            type = "u8"
            address = [0x100]
            "#
        ))
        .unwrap();

        let finder = MockProcessFinder::new();
        let mut session = GameSession::new(Arc::new(catalog), Box::new(finder.clone()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        session.subscribe(Box::new(move |s| sink.lock().push(s.clone())));

        Harness {
            session,
            finder,
            events,
            known,
            known_hash,
        }
    }

    fn process(pid: u32, exe: PathBuf) -> ProcessRef {
        ProcessRef {
            pid,
            name: "crypt.exe".into(),
            executable: exe,
            base_address: BASE,
            module_size: 0x1000,
            is_64_bit: false,
        }
    }

    #[test]
    fn test_idle_without_process() {
        let mut h = harness();
        assert!(!h.session.refresh());
        assert!(!h.session.is_bound());
        // Already None: nothing emitted
        assert!(h.events.lock().is_empty());
    }

    #[test]
    fn test_bind_prime_and_exit() {
        let mut h = harness();
        let mem = MockMemoryReader::new();
        mem.write_u8(BASE + 0x100, 3);
        h.finder.add_process(process(10, h.known.path().to_path_buf()), mem.clone());

        assert!(h.session.refresh());
        assert!(h.session.is_bound());
        let obs = h.session.observation().unwrap();
        assert_eq!(obs.current_i64("level"), Some(3));
        assert!(!obs.changed("level"));

        mem.write_u8(BASE + 0x100, 4);
        assert!(h.session.refresh());
        assert_eq!(h.session.observation().unwrap().edge_i64("level"), Some((3, 4)));

        h.finder.remove_process(10);
        assert!(!h.session.refresh());
        assert!(!h.session.is_bound());

        let events = h.events.lock();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], VersionStatus::Found(v) if v.title_id == "crypt"));
        assert_eq!(events[1], VersionStatus::None);
    }

    #[test]
    fn test_unknown_notified_once() {
        let mut h = harness();
        let other = exe(b"unknown build");
        h.finder
            .add_process(process(11, other.path().to_path_buf()), MockMemoryReader::new());

        for _ in 0..3 {
            assert!(!h.session.refresh());
        }
        let events = h.events.lock();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], VersionStatus::Unknown(hash) if *hash != h.known_hash));
    }

    #[test]
    fn test_read_failure_keeps_binding() {
        let mut h = harness();
        let mem = MockMemoryReader::new();
        mem.write_u8(BASE + 0x100, 3);
        h.finder.add_process(process(12, h.known.path().to_path_buf()), mem.clone());
        assert!(h.session.refresh());

        mem.set_fail_reads(true);
        assert!(!h.session.refresh());
        assert!(h.session.is_bound());
        assert_eq!(h.session.observation().unwrap().current_i64("level"), Some(3));

        mem.set_fail_reads(false);
        assert!(h.session.refresh());
    }

    #[test]
    fn test_priming_failure_stays_unbound() {
        let mut h = harness();
        // Level byte is never written, so priming cannot read it
        let mem = MockMemoryReader::new();
        h.finder.add_process(process(13, h.known.path().to_path_buf()), mem.clone());

        assert!(!h.session.refresh());
        assert!(!h.session.is_bound());
        assert!(h.events.lock().is_empty());

        mem.write_u8(BASE + 0x100, 1);
        assert!(h.session.refresh());
        assert!(h.session.is_bound());
    }
}
