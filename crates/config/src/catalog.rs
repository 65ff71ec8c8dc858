//! Explicit theater configuration provider.
//!
//! Resolution order for a key:
//! 1. catalog overrides (merged over the built-in record of the same key);
//! 2. the installation's `Theater.txt`, merged over the `.tdf` definition and built-in record;
//! 3. the built-in record.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::install::{
    TheaterDefinition, parse_tdf, parse_theater_list, parse_theater_txt, read_lossy,
    theater_list_path, theater_txt_candidates,
};
use crate::{
    ConfigError, TheaterConfig, TheaterRecord, builtin, center_projection_string, load_records,
};

/// A theater listed by the installation's `Theater.lst`.
#[derive(Debug, Clone)]
pub struct InstalledTheater {
    pub key: String,
    pub tdf_path: PathBuf,
    pub definition: TheaterDefinition,
}

/// Source of validated [`TheaterConfig`] values.
#[derive(Debug, Clone, Default)]
pub struct TheaterCatalog {
    install_root: Option<PathBuf>,
    overrides: Vec<TheaterRecord>,
}

impl TheaterCatalog {
    /// Catalog backed only by the built-in table.
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = Some(root.into());
        self
    }

    pub fn with_overrides(mut self, records: Vec<TheaterRecord>) -> Self {
        self.overrides.extend(records);
        self
    }

    /// Add override records from a YAML/TOML file or directory of TOML files.
    pub fn load_overrides<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let records = load_records(path.as_ref())?;
        debug!(path = %path.as_ref().display(), count = records.len(), "loaded theater overrides");
        Ok(self.with_overrides(records))
    }

    pub fn install_root(&self) -> Option<&Path> {
        self.install_root.as_deref()
    }

    /// True when the install root exists and contains a `Data` directory.
    pub fn installation_available(&self) -> bool {
        self.install_root
            .as_deref()
            .map(|root| root.join("Data").is_dir())
            .unwrap_or(false)
    }

    /// Sorted keys of every theater this catalog can resolve.
    pub fn available(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = builtin::BUILTIN_KEYS
            .iter()
            .map(|key| key.to_string())
            .collect();
        keys.extend(self.overrides.iter().filter_map(|r| r.resolved_key()));
        keys.extend(self.installed_theaters().into_iter().map(|t| t.key));
        keys.into_iter().collect()
    }

    /// Resolve and validate the configuration for `key` (case-insensitive).
    pub fn resolve(&self, key: &str) -> Result<TheaterConfig, ConfigError> {
        let key = key.trim().to_ascii_lowercase();
        let base = builtin::record(&key);

        if let Some(record) = self.override_record(&key) {
            debug!(theater = %key, "resolved theater from catalog override");
            let record = record.merged_over(base.unwrap_or_default());
            return TheaterConfig::try_from(with_key(record, &key));
        }

        if let Some(record) = self.installed_record(&key, base.as_ref()) {
            match TheaterConfig::try_from(with_key(record, &key)) {
                Ok(config) => {
                    debug!(theater = %key, "resolved theater from installation files");
                    return Ok(config);
                }
                Err(err) if base.is_some() => {
                    warn!(
                        theater = %key,
                        error = %err,
                        "installation config invalid; using built-in record"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        match base {
            Some(record) => {
                debug!(theater = %key, "resolved theater from built-in table");
                TheaterConfig::try_from(record)
            }
            None => Err(ConfigError::UnknownTheater(key)),
        }
    }

    /// Absolute heightmap path for a resolved theater, if an install root is set.
    pub fn heightmap_path(&self, config: &TheaterConfig) -> Option<PathBuf> {
        config.paths().heightmap(self.install_root.as_deref()?)
    }

    /// Theaters listed in the installation's `Theater.lst`.
    ///
    /// Unreadable list or definition files are logged and skipped.
    pub fn installed_theaters(&self) -> Vec<InstalledTheater> {
        let Some(root) = self.install_root.as_deref() else {
            return Vec::new();
        };
        if !self.installation_available() {
            return Vec::new();
        }
        let list_path = theater_list_path(root);
        if !list_path.is_file() {
            return Vec::new();
        }
        let contents = match read_lossy(&list_path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %list_path.display(), error = %err, "cannot read theater list");
                return Vec::new();
            }
        };

        let mut theaters = Vec::new();
        for entry in parse_theater_list(&contents) {
            let tdf_path = root.join("Data").join(crate::normalize_separators(&entry));
            if !tdf_path.is_file() {
                debug!(path = %tdf_path.display(), "listed theater definition missing");
                continue;
            }
            let definition = match read_lossy(&tdf_path) {
                Ok(text) => parse_tdf(&text),
                Err(err) => {
                    warn!(
                        path = %tdf_path.display(),
                        error = %err,
                        "cannot read theater definition"
                    );
                    continue;
                }
            };
            if definition.is_empty() {
                continue;
            }
            if let Some(key) = definition.key(&tdf_path) {
                theaters.push(InstalledTheater {
                    key,
                    tdf_path,
                    definition,
                });
            }
        }
        theaters
    }

    fn override_record(&self, key: &str) -> Option<TheaterRecord> {
        self.overrides
            .iter()
            .rev()
            .find(|record| record.resolved_key().as_deref() == Some(key))
            .cloned()
    }

    fn installed_record(&self, key: &str, base: Option<&TheaterRecord>) -> Option<TheaterRecord> {
        let root = self.install_root.as_deref()?;
        if !self.installation_available() {
            return None;
        }

        let installed = self.installed_theaters().into_iter().find(|t| t.key == key);
        let definition_record = installed.as_ref().map(|t| TheaterRecord {
            name: t.definition.name.clone(),
            terrain_subdir: t.definition.terrain_dir.clone(),
            campaign_subdir: t.definition.campaign_dir.clone(),
            ..TheaterRecord::default()
        });
        let merged_base = match (definition_record, base) {
            (Some(def), Some(base)) => def.merged_over(base.clone()),
            (Some(def), None) => def,
            (None, Some(base)) => base.clone(),
            (None, None) => return None,
        };

        let terrain = merged_base.terrain_subdir.clone()?;
        let txt_path = theater_txt_candidates(root, &terrain)
            .into_iter()
            .find(|path| path.is_file());
        let Some(txt_path) = txt_path else {
            // A .tdf without Theater.txt still contributes its directories.
            return installed.map(|_| merged_base);
        };

        let parsed = read_lossy(&txt_path).and_then(|text| parse_theater_txt(&txt_path, &text));
        match parsed {
            Ok(record) => {
                let mut merged = record.merged_over(merged_base);
                if merged.projection_string.is_none() {
                    merged.projection_string = merged
                        .center_lat
                        .zip(merged.center_lon)
                        .map(|(lat, lon)| center_projection_string(lat, lon));
                }
                Some(merged)
            }
            Err(err) => {
                warn!(path = %txt_path.display(), error = %err, "cannot parse Theater.txt");
                installed.map(|_| merged_base)
            }
        }
    }
}

fn with_key(mut record: TheaterRecord, key: &str) -> TheaterRecord {
    record.key = Some(key.to_string());
    record
}
