//! Traits for memory reading and process discovery
//!
//! These traits are the seam between the autosplitter and the operating
//! system. The platform adapters implement them for real processes; the mock
//! implementations below let the whole pipeline run without a game.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

/// Trait for reading memory from a process
pub trait MemoryReader: Send + Sync {
    /// Read raw bytes from memory
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>>;

    /// Read a u8 from memory
    fn read_u8(&self, address: usize) -> Option<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Some(bytes[0])
    }

    /// Read an i8 from memory
    fn read_i8(&self, address: usize) -> Option<i8> {
        self.read_u8(address).map(|v| v as i8)
    }

    /// Read a u16 from memory
    fn read_u16(&self, address: usize) -> Option<u16> {
        let bytes = self.read_bytes(address, 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read an i16 from memory
    fn read_i16(&self, address: usize) -> Option<i16> {
        let bytes = self.read_bytes(address, 2)?;
        Some(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a u32 from memory
    fn read_u32(&self, address: usize) -> Option<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an i32 from memory
    fn read_i32(&self, address: usize) -> Option<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a u64 from memory
    fn read_u64(&self, address: usize) -> Option<u64> {
        let bytes = self.read_bytes(address, 8)?;
        Some(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
            bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Read an i64 from memory
    fn read_i64(&self, address: usize) -> Option<i64> {
        self.read_u64(address).map(|v| v as i64)
    }

    /// Read an f32 from memory
    fn read_f32(&self, address: usize) -> Option<f32> {
        let bytes = self.read_bytes(address, 4)?;
        Some(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a boolean (non-zero = true)
    fn read_bool(&self, address: usize) -> Option<bool> {
        self.read_u8(address).map(|v| v != 0)
    }

    /// Check if the reader is still valid (process still running)
    fn is_valid(&self) -> bool;
}

/// A running process that matched one of the candidate names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRef {
    /// Process ID
    pub pid: u32,
    /// Process name as reported by the OS
    pub name: String,
    /// Path of the on-disk executable image
    pub executable: PathBuf,
    /// Base address of the main module
    pub base_address: usize,
    /// Size of the main module
    pub module_size: usize,
    /// Whether the process is 64-bit
    pub is_64_bit: bool,
}

/// Trait for finding and attaching to processes
pub trait ProcessFinder: Send + Sync {
    /// Every running process whose name matches one of `names`
    /// (case-insensitive), in enumeration order
    fn find_processes(&self, names: &[&str]) -> Vec<ProcessRef>;

    /// Open a process and create a memory reader
    fn open_process(&self, process: &ProcessRef) -> Option<Box<dyn MemoryReader>>;

    /// Whether the process is still running
    fn is_running(&self, process: &ProcessRef) -> bool;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Default)]
struct MockMemory {
    bytes: HashMap<usize, u8>,
    valid: bool,
    fail_reads: bool,
}

/// Mock memory reader backed by a sparse byte map
///
/// Clones share the same memory, so a test can keep one handle and mutate
/// "game memory" while the session owns another.
#[derive(Clone)]
pub struct MockMemoryReader {
    inner: Arc<RwLock<MockMemory>>,
}

impl Default for MockMemoryReader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMemoryReader {
    /// Create a new, valid, empty mock memory
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockMemory {
                bytes: HashMap::new(),
                valid: true,
                fail_reads: false,
            })),
        }
    }

    /// Write bytes to mock memory
    pub fn write_bytes(&self, address: usize, data: &[u8]) {
        let mut mem = self.inner.write();
        for (i, b) in data.iter().enumerate() {
            mem.bytes.insert(address + i, *b);
        }
    }

    /// Write a u8 to mock memory
    pub fn write_u8(&self, address: usize, value: u8) {
        self.write_bytes(address, &[value]);
    }

    /// Write an i16 to mock memory
    pub fn write_i16(&self, address: usize, value: i16) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write a u32 to mock memory
    pub fn write_u32(&self, address: usize, value: u32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write an i32 to mock memory
    pub fn write_i32(&self, address: usize, value: i32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write a u64 to mock memory
    pub fn write_u64(&self, address: usize, value: u64) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Write a pointer to mock memory
    pub fn write_ptr(&self, address: usize, value: usize) {
        self.write_u64(address, value as u64);
    }

    /// Make every read fail while the process stays valid
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.write().fail_reads = fail;
    }

    /// Invalidate the process (simulate process exit)
    pub fn invalidate(&self) {
        self.inner.write().valid = false;
    }
}

impl MemoryReader for MockMemoryReader {
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        let mem = self.inner.read();
        if !mem.valid || mem.fail_reads {
            return None;
        }
        (address..address + size)
            .map(|a| mem.bytes.get(&a).copied())
            .collect()
    }

    fn is_valid(&self) -> bool {
        self.inner.read().valid
    }
}

#[derive(Default)]
struct MockProcesses {
    processes: Vec<ProcessRef>,
    readers: HashMap<u32, MockMemoryReader>,
}

/// Mock process finder for testing
///
/// Clones share the same process list so processes can be started and
/// stopped while an autosplitter owns the finder.
#[derive(Clone, Default)]
pub struct MockProcessFinder {
    inner: Arc<RwLock<MockProcesses>>,
}

impl MockProcessFinder {
    /// Create a new mock process finder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock process with a memory reader
    pub fn add_process(&self, process: ProcessRef, reader: MockMemoryReader) {
        let mut inner = self.inner.write();
        inner.readers.insert(process.pid, reader);
        inner.processes.push(process);
    }

    /// Remove a process (simulate exit)
    pub fn remove_process(&self, pid: u32) {
        let mut inner = self.inner.write();
        inner.processes.retain(|p| p.pid != pid);
        if let Some(reader) = inner.readers.remove(&pid) {
            reader.invalidate();
        }
    }
}

impl ProcessFinder for MockProcessFinder {
    fn find_processes(&self, names: &[&str]) -> Vec<ProcessRef> {
        let inner = self.inner.read();
        inner
            .processes
            .iter()
            .filter(|p| names.iter().any(|n| n.eq_ignore_ascii_case(&p.name)))
            .cloned()
            .collect()
    }

    fn open_process(&self, process: &ProcessRef) -> Option<Box<dyn MemoryReader>> {
        self.inner
            .read()
            .readers
            .get(&process.pid)
            .cloned()
            .map(|r| Box::new(r) as Box<dyn MemoryReader>)
    }

    fn is_running(&self, process: &ProcessRef) -> bool {
        let inner = self.inner.read();
        inner.processes.iter().any(|p| p.pid == process.pid)
            && inner.readers.get(&process.pid).map_or(false, |r| r.is_valid())
    }
}
