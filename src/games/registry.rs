//! Catalog of known titles and builds

use std::collections::HashMap;
use std::path::Path;

use super::{CatalogFile, TitleConfig, VersionConfig, VersionDescriptor};
use crate::error::{AutosplitterError, Result};

/// Registry of titles, indexed by process name and executable hash
#[derive(Debug, Clone, Default)]
pub struct GameCatalog {
    titles: Vec<TitleConfig>,
    /// Lowercase process name -> title index
    process_map: HashMap<String, usize>,
    /// Lowercase hash -> (title index, version index)
    hash_map: HashMap<String, (usize, usize)>,
}

impl GameCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.merge(CatalogFile::from_toml_str(content)?)?;
        Ok(catalog)
    }

    /// Load a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load and merge every `*.toml` file in a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "toml"))
            .collect();
        paths.sort();

        let mut catalog = Self::new();
        for path in &paths {
            let content = std::fs::read_to_string(path)?;
            catalog.merge(CatalogFile::from_toml_str(&content)?)?;
            log::debug!("Loaded catalog file {}", path.display());
        }

        log::info!(
            "Loaded {} titles from {} catalog files",
            catalog.titles.len(),
            paths.len()
        );
        Ok(catalog)
    }

    /// Add every title of a parsed file
    pub fn merge(&mut self, file: CatalogFile) -> Result<()> {
        for title in file.title {
            self.register(title)?;
        }
        Ok(())
    }

    /// Register a title
    ///
    /// Title ids, variant ids and executable hashes must be unique across
    /// the whole catalog.
    pub fn register(&mut self, title: TitleConfig) -> Result<()> {
        title.validate()?;

        if self.title(&title.id).is_some() {
            return Err(AutosplitterError::ConfigError(format!(
                "duplicate title '{}'",
                title.id
            )));
        }
        for variant in &title.variants {
            if self.variant_owner(&variant.id).is_some()
                || title.variants.iter().filter(|v| v.id == variant.id).count() > 1
            {
                return Err(AutosplitterError::ConfigError(format!(
                    "duplicate variant '{}'",
                    variant.id
                )));
            }
        }
        for version in &title.versions {
            if self.hash_map.contains_key(&version.hash.to_lowercase()) {
                return Err(AutosplitterError::ConfigError(format!(
                    "hash of '{}' version '{}' is already registered",
                    title.id, version.id
                )));
            }
        }

        let index = self.titles.len();
        for name in &title.process_names {
            self.process_map.entry(name.to_lowercase()).or_insert(index);
        }
        for (v, version) in title.versions.iter().enumerate() {
            self.hash_map.insert(version.hash.to_lowercase(), (index, v));
        }

        log::debug!(
            "Registered title '{}' with {} versions",
            title.id,
            title.versions.len()
        );
        self.titles.push(title);
        Ok(())
    }

    pub fn titles(&self) -> &[TitleConfig] {
        &self.titles
    }

    pub fn title(&self, id: &str) -> Option<&TitleConfig> {
        self.titles.iter().find(|t| t.id == id)
    }

    /// Find title by process name
    pub fn find_title_by_process(&self, process_name: &str) -> Option<&TitleConfig> {
        self.process_map
            .get(&process_name.to_lowercase())
            .map(|&i| &self.titles[i])
    }

    /// Look up a build by executable hash (case-insensitive)
    pub fn find_version_by_hash(&self, hash: &str) -> Option<(&TitleConfig, &VersionConfig)> {
        self.hash_map.get(&hash.to_lowercase()).map(|&(t, v)| {
            let title = &self.titles[t];
            (title, &title.versions[v])
        })
    }

    /// Descriptor for a build found by hash
    pub fn describe(&self, hash: &str) -> Option<VersionDescriptor> {
        self.find_version_by_hash(hash)
            .map(|(title, version)| VersionDescriptor {
                title_id: title.id.clone(),
                version_id: version.id.clone(),
                family: title.family,
            })
    }

    /// Title and version config behind a descriptor
    pub fn resolve(&self, version: &VersionDescriptor) -> Result<(&TitleConfig, &VersionConfig)> {
        let title = self
            .title(&version.title_id)
            .ok_or_else(|| AutosplitterError::UnknownTitle(version.title_id.clone()))?;
        let config = title
            .version(&version.version_id)
            .ok_or_else(|| AutosplitterError::VersionUnknown(version.version_id.clone()))?;
        Ok((title, config))
    }

    /// Get all process names that can be detected
    pub fn all_process_names(&self) -> Vec<&str> {
        self.titles
            .iter()
            .flat_map(|t| t.process_names.iter().map(|s| s.as_str()))
            .collect()
    }

    fn variant_owner(&self, variant_id: &str) -> Option<&TitleConfig> {
        self.titles
            .iter()
            .find(|t| t.variants.iter().any(|v| v.id == variant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::Family;

    fn doc(title: &str, process: &str, hash: &str) -> String {
        format!(
            r#"
            [[title]]
            id = "{title}"
            name = "{title}"
            family = "classic"
            process_names = ["{process}"]

            [[title.variants]]
            id = "{title}"
            first_segment = 1
            final_segment = 10

            [[title.versions]]
            id = "1.0"
            hash = "{hash}"

            [title.versions.fields.level]
            type = "u8"
            address = [0x10]
            "#
        )
    }

    const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const HASH_B: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    #[test]
    fn test_catalog_lookup() {
        let catalog = GameCatalog::from_toml_str(&doc("crypt", "Crypt.exe", HASH_B)).unwrap();

        assert_eq!(catalog.find_title_by_process("crypt.EXE").unwrap().id, "crypt");
        assert!(catalog.find_title_by_process("other.exe").is_none());

        let desc = catalog.describe(&HASH_B.to_lowercase()).unwrap();
        assert_eq!(desc.title_id, "crypt");
        assert_eq!(desc.version_id, "1.0");
        assert_eq!(desc.family, Family::Classic);

        let (title, version) = catalog.resolve(&desc).unwrap();
        assert_eq!(title.id, "crypt");
        assert!(version.fields.contains_key("level"));
        assert_eq!(catalog.all_process_names(), vec!["Crypt.exe"]);
    }

    #[test]
    fn test_duplicate_hash_rejected() {
        let mut catalog = GameCatalog::from_toml_str(&doc("crypt", "crypt.exe", HASH_A)).unwrap();
        let other = CatalogFile::from_toml_str(&doc("tower", "tower.exe", HASH_A)).unwrap();
        assert!(catalog.merge(other).is_err());
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let mut catalog = GameCatalog::from_toml_str(&doc("crypt", "crypt.exe", HASH_A)).unwrap();
        let other = CatalogFile::from_toml_str(&doc("crypt", "crypt2.exe", HASH_B)).unwrap();
        assert!(catalog.merge(other).is_err());
    }

    #[test]
    fn test_load_dir_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), doc("crypt", "crypt.exe", HASH_A)).unwrap();
        std::fs::write(dir.path().join("b.toml"), doc("tower", "tower.exe", HASH_B)).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = GameCatalog::load_dir(dir.path()).unwrap();
        assert_eq!(catalog.titles().len(), 2);
        assert!(catalog.title("tower").is_some());
    }

    #[test]
    fn test_resolve_unknown_title() {
        let catalog = GameCatalog::new();
        let desc = VersionDescriptor {
            title_id: "missing".into(),
            version_id: "1.0".into(),
            family: Family::Later,
        };
        assert!(matches!(
            catalog.resolve(&desc),
            Err(AutosplitterError::UnknownTitle(_))
        ));
    }
}
