//! Process discovery and module information
//!
//! Enumerates running processes by name and describes each match as a
//! [`ProcessRef`]. Enumeration order is whatever the OS reports; callers
//! that pick "the first match" inherit that order.

use super::{MemoryReader, ProcessFinder, ProcessRef};

/// [`ProcessFinder`] backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessFinder;

impl SystemProcessFinder {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessFinder for SystemProcessFinder {
    fn find_processes(&self, names: &[&str]) -> Vec<ProcessRef> {
        list_processes(names)
    }

    fn open_process(&self, process: &ProcessRef) -> Option<Box<dyn MemoryReader>> {
        open_reader(process)
    }

    fn is_running(&self, process: &ProcessRef) -> bool {
        is_process_running(process.pid)
    }
}

fn name_matches(names: &[&str], candidate: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(candidate))
}

// =============================================================================
// Windows
// =============================================================================

/// Find every process matching one of the given names (Windows)
#[cfg(target_os = "windows")]
pub fn list_processes(names: &[&str]) -> Vec<ProcessRef> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
        TH32CS_SNAPPROCESS,
    };

    let mut found = Vec::new();

    unsafe {
        let snapshot = match CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) {
            Ok(s) => s,
            Err(e) => {
                log::debug!("Process snapshot failed: {}", e);
                return found;
            }
        };

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };

        if Process32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                let name = wide_to_string(&entry.szExeFile);

                if name_matches(names, &name) {
                    let pid = entry.th32ProcessID;
                    match (get_module_info(pid, &name), executable_path(pid)) {
                        (Some((base, size)), Some(executable)) => found.push(ProcessRef {
                            pid,
                            name: name.clone(),
                            executable,
                            base_address: base,
                            module_size: size,
                            is_64_bit: check_is_64_bit(pid),
                        }),
                        _ => log::debug!("Skipping '{}' (PID {}): module info unavailable", name, pid),
                    }
                }

                if Process32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }

        let _ = CloseHandle(snapshot);
    }

    found
}

#[cfg(target_os = "windows")]
fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// Get base address and size of a module loaded in a process (Windows)
#[cfg(target_os = "windows")]
fn get_module_info(pid: u32, module_name: &str) -> Option<(usize, usize)> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, Module32FirstW, Module32NextW, MODULEENTRY32W,
        TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32,
    };

    unsafe {
        let snapshot =
            CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid).ok()?;

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };

        let mut result = None;
        if Module32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                if wide_to_string(&entry.szModule).eq_ignore_ascii_case(module_name) {
                    result = Some((entry.modBaseAddr as usize, entry.modBaseSize as usize));
                    break;
                }
                if Module32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }

        let _ = CloseHandle(snapshot);
        result
    }
}

/// Full path of the process image (Windows)
#[cfg(target_os = "windows")]
fn executable_path(pid: u32) -> Option<std::path::PathBuf> {
    use windows::core::PWSTR;
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{
        OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
        PROCESS_QUERY_LIMITED_INFORMATION,
    };

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;
        let mut buf = [0u16; 1024];
        let mut len = buf.len() as u32;
        let result = QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            PWSTR(buf.as_mut_ptr()),
            &mut len,
        );
        let _ = CloseHandle(handle);
        result.ok()?;
        Some(std::path::PathBuf::from(String::from_utf16_lossy(
            &buf[..len as usize],
        )))
    }
}

/// Check if a process is 64-bit (Windows)
#[cfg(target_os = "windows")]
fn check_is_64_bit(pid: u32) -> bool {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{
        IsWow64Process, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    };

    unsafe {
        if let Ok(handle) = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
            let mut is_wow64 = windows::Win32::Foundation::BOOL(0);
            let ok = IsWow64Process(handle, &mut is_wow64).is_ok();
            let _ = CloseHandle(handle);
            if ok {
                // WOW64 means a 32-bit process on 64-bit Windows
                return !is_wow64.as_bool();
            }
        }
    }

    std::mem::size_of::<usize>() == 8
}

/// Check if a process is still running by its PID (Windows)
#[cfg(target_os = "windows")]
pub fn is_process_running(pid: u32) -> bool {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

    unsafe {
        if let Ok(handle) = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
            let result = super::windows::handle_is_running(handle);
            let _ = CloseHandle(handle);
            return result;
        }
    }

    false
}

#[cfg(target_os = "windows")]
fn open_reader(process: &ProcessRef) -> Option<Box<dyn MemoryReader>> {
    use windows::Win32::System::Threading::{
        OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
    };

    let handle = unsafe {
        OpenProcess(PROCESS_VM_READ | PROCESS_QUERY_INFORMATION, false, process.pid).ok()?
    };
    Some(Box::new(super::WindowsMemoryReader::new(handle)))
}

// =============================================================================
// Linux
// =============================================================================

/// Find every process matching one of the given names (Linux)
///
/// Matches either `/proc/[pid]/comm` or the file name of the first
/// `cmdline` argument, which covers games running under Wine/Proton.
#[cfg(target_os = "linux")]
pub fn list_processes(names: &[&str]) -> Vec<ProcessRef> {
    use std::fs;
    use std::path::{Path, PathBuf};

    let mut found = Vec::new();
    let Ok(entries) = fs::read_dir("/proc") else {
        return found;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(pid) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|s| s.parse::<u32>().ok())
        else {
            continue;
        };

        let Ok(comm) = fs::read_to_string(path.join("comm")) else {
            continue;
        };
        let comm = comm.trim().to_string();

        let first_arg = fs::read_to_string(path.join("cmdline"))
            .ok()
            .and_then(|s| s.split('\0').next().map(|s| s.to_string()))
            .filter(|s| !s.is_empty());

        // Wine reports Windows-style paths; take the last component of either style
        let exe_name = first_arg
            .as_deref()
            .and_then(|s| s.rsplit(['/', '\\']).next())
            .map(|s| s.to_string())
            .unwrap_or_else(|| comm.clone());

        if !name_matches(names, &comm) && !name_matches(names, &exe_name) {
            continue;
        }

        let executable = first_arg
            .map(PathBuf::from)
            .filter(|p| p.is_file())
            .or_else(|| fs::read_link(path.join("exe")).ok());

        let Some(executable) = executable else {
            log::debug!("Skipping '{}' (PID {}): executable path unavailable", exe_name, pid);
            continue;
        };

        let module_hint = Path::new(&exe_name).to_path_buf();
        if let Some((base, size)) = get_module_base_from_maps(pid, &module_hint) {
            found.push(ProcessRef {
                pid,
                name: exe_name,
                executable,
                base_address: base,
                module_size: size,
                is_64_bit: std::mem::size_of::<usize>() == 8,
            });
        }
    }

    found
}

/// Parse /proc/[pid]/maps to get base address and size of the main module
///
/// Prefers the mappings backed by the executable itself and falls back to
/// the first readable mapping range.
#[cfg(target_os = "linux")]
fn get_module_base_from_maps(pid: u32, module: &std::path::Path) -> Option<(usize, usize)> {
    let maps = std::fs::read_to_string(format!("/proc/{}/maps", pid)).ok()?;
    let module_name = module.file_name()?.to_string_lossy().to_lowercase();

    let mut named: Option<(usize, usize)> = None;
    let mut fallback: Option<(usize, usize)> = None;

    for line in maps.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 || !parts[1].starts_with('r') {
            continue;
        }

        let Some((start, end)) = parts[0].split_once('-') else {
            continue;
        };
        let (Ok(start), Ok(end)) = (
            usize::from_str_radix(start, 16),
            usize::from_str_radix(end, 16),
        ) else {
            continue;
        };

        let is_module = parts
            .get(5)
            .map(|p| p.to_lowercase().ends_with(&module_name))
            .unwrap_or(false);

        let slot = if is_module { &mut named } else { &mut fallback };
        *slot = match *slot {
            None => Some((start, end)),
            Some((s, e)) => Some((s.min(start), e.max(end))),
        };
    }

    named.or(fallback).map(|(base, end)| (base, end - base))
}

/// Check if a process is still running by its PID (Linux)
#[cfg(target_os = "linux")]
pub fn is_process_running(pid: u32) -> bool {
    std::path::Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(target_os = "linux")]
fn open_reader(process: &ProcessRef) -> Option<Box<dyn MemoryReader>> {
    Some(Box::new(super::LinuxMemoryReader::new(process.pid as i32)))
}

// =============================================================================
// Other platforms
// =============================================================================

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub fn list_processes(_names: &[&str]) -> Vec<ProcessRef> {
    Vec::new()
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub fn is_process_running(_pid: u32) -> bool {
    false
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn open_reader(_process: &ProcessRef) -> Option<Box<dyn MemoryReader>> {
    None
}
