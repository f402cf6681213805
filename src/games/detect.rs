//! Version detection by executable hash

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::{GameCatalog, VersionDescriptor};
use crate::error::Result;
use crate::memory::{ProcessFinder, ProcessRef};

/// Outcome of one detection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionResult {
    /// No candidate process is running (or its image could not be hashed)
    NotFound,
    /// A candidate is running but its hash is not in the catalog
    Unknown { process: ProcessRef, hash: String },
    /// A known build is running
    Found {
        process: ProcessRef,
        hash: String,
        version: VersionDescriptor,
    },
}

/// Lowercase hex SHA-256 of a file's contents
pub fn hash_executable(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Matches running processes against the catalog's known builds
#[derive(Debug, Clone)]
pub struct VersionDetector {
    process_names: Vec<String>,
    versions: HashMap<String, VersionDescriptor>,
}

impl VersionDetector {
    pub fn new(catalog: &GameCatalog) -> Self {
        let mut process_names: Vec<String> = Vec::new();
        for name in catalog.all_process_names() {
            if !process_names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                process_names.push(name.to_string());
            }
        }

        let versions = catalog
            .titles()
            .iter()
            .flat_map(|title| {
                title.versions.iter().map(move |v| {
                    (
                        v.hash.to_lowercase(),
                        VersionDescriptor {
                            title_id: title.id.clone(),
                            version_id: v.id.clone(),
                            family: title.family,
                        },
                    )
                })
            })
            .collect();

        Self {
            process_names,
            versions,
        }
    }

    /// Candidate process names
    pub fn process_names(&self) -> &[String] {
        &self.process_names
    }

    /// Classify the first running candidate process
    ///
    /// Pure query. When several candidates run, the first one in the
    /// finder's enumeration order is used.
    pub fn detect(&self, finder: &dyn ProcessFinder) -> DetectionResult {
        let names: Vec<&str> = self.process_names.iter().map(|s| s.as_str()).collect();
        let candidates = finder.find_processes(&names);

        let Some(process) = candidates.into_iter().next() else {
            return DetectionResult::NotFound;
        };

        let hash = match hash_executable(&process.executable) {
            Ok(h) => h,
            Err(e) => {
                log::debug!(
                    "Could not hash {} (PID {}): {}",
                    process.executable.display(),
                    process.pid,
                    e
                );
                return DetectionResult::NotFound;
            }
        };

        match self.versions.get(&hash) {
            Some(version) => DetectionResult::Found {
                process,
                hash,
                version: version.clone(),
            },
            None => DetectionResult::Unknown { process, hash },
        }
    }
}
