//! Windows memory reader implementation

#![cfg(target_os = "windows")]

use super::MemoryReader;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
use windows::Win32::System::Threading::GetExitCodeProcess;

/// Windows-specific memory reader using ReadProcessMemory
///
/// Owns the process handle and closes it on drop.
pub struct WindowsMemoryReader {
    handle: HANDLE,
}

impl WindowsMemoryReader {
    /// Wrap a handle opened with `PROCESS_VM_READ | PROCESS_QUERY_INFORMATION`
    pub fn new(handle: HANDLE) -> Self {
        Self { handle }
    }
}

// STATUS_PENDING, reported as the exit code of a live process
const STILL_ACTIVE: u32 = 259;

/// Whether the process behind `handle` has not exited yet
pub(crate) fn handle_is_running(handle: HANDLE) -> bool {
    let mut exit_code: u32 = 0;
    unsafe { GetExitCodeProcess(handle, &mut exit_code).is_ok() && exit_code == STILL_ACTIVE }
}

impl MemoryReader for WindowsMemoryReader {
    fn read_bytes(&self, address: usize, size: usize) -> Option<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let mut bytes_read = 0;

        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const _,
                buffer.as_mut_ptr() as *mut _,
                size,
                Some(&mut bytes_read),
            )
        };

        if result.is_ok() && bytes_read == size {
            Some(buffer)
        } else {
            None
        }
    }

    fn is_valid(&self) -> bool {
        handle_is_running(self.handle)
    }
}

impl Drop for WindowsMemoryReader {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

// HANDLE is a raw pointer wrapper; the reader only issues read-only calls on it
unsafe impl Send for WindowsMemoryReader {}
unsafe impl Sync for WindowsMemoryReader {}
