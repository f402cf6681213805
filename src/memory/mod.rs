//! Cross-platform memory operations
//!
//! This module provides platform-agnostic abstractions for process discovery
//! and memory reading, with implementations for Windows and Linux plus mocks
//! for tests.

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

mod pointer;
mod process;
mod traits;

pub use pointer::Pointer;
pub use process::{is_process_running, list_processes, SystemProcessFinder};
pub use traits::{MemoryReader, MockMemoryReader, MockProcessFinder, ProcessFinder, ProcessRef};

#[cfg(target_os = "windows")]
pub use windows::WindowsMemoryReader;

#[cfg(target_os = "linux")]
pub use linux::LinuxMemoryReader;
