// Company dictionary persisted as company_config.json
//
// { "companies": { "<name>": ["<phrase>", ...], ... } }

use std::fs;
use std::path::{Path, PathBuf};

use ctrsum_core::{CtrError, IndicatorDictionary, IndicatorStore};
use serde::{Deserialize, Serialize};

pub const COMPANY_CONFIG_FILE: &str = "company_config.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CompanyConfigFile {
    companies: IndicatorDictionary,
}

/// File-backed [`IndicatorStore`].
///
/// The dictionary is read once and cached; `save` writes through and drops
/// the cache so the next `load` sees exactly what is on disk.
///
/// A file that exists but cannot be read is never overwritten: once `load`
/// has fallen back to the built-in companies, `save` refuses until the
/// file reads cleanly again.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    cache: Option<IndicatorDictionary>,
    read_error: Option<String>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), cache: None, read_error: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the file could not be loaded, if it could not. Saves are refused
    /// while this is set.
    pub fn read_error(&self) -> Option<&str> {
        self.read_error.as_deref()
    }

    /// Strict read: missing file is `Ok(None)`, anything else that goes
    /// wrong is an error. `load` is the forgiving version.
    pub fn read(&self) -> Result<Option<IndicatorDictionary>, CtrError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| CtrError::Store(format!("failed to read {}: {}", self.path.display(), e)))?;
        let file: CompanyConfigFile = serde_json::from_str(&contents)
            .map_err(|e| CtrError::Store(format!("failed to parse {}: {}", self.path.display(), e)))?;
        Ok(Some(file.companies))
    }
}

impl IndicatorStore for JsonFileStore {
    fn load(&mut self) -> IndicatorDictionary {
        if let Some(dict) = &self.cache {
            return dict.clone();
        }

        let dict = match self.read() {
            Ok(Some(dict)) => dict,
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no company config, using built-in companies");
                IndicatorDictionary::builtin()
            }
            Err(e) => {
                tracing::warn!(error = %e, "using built-in companies, config will not be overwritten");
                self.read_error = Some(e.to_string());
                IndicatorDictionary::builtin()
            }
        };
        self.cache = Some(dict.clone());
        dict
    }

    fn save(&mut self, dictionary: &IndicatorDictionary) -> Result<(), CtrError> {
        // The dictionary being saved was derived from the built-ins, not the file
        if let Some(reason) = &self.read_error {
            tracing::warn!(path = %self.path.display(), "not saving over unreadable company config");
            return Err(CtrError::Store(format!(
                "refusing to overwrite unreadable {} ({})",
                self.path.display(),
                reason
            )));
        }
        self.cache = None;

        let file = CompanyConfigFile { companies: dictionary.clone() };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CtrError::Store(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| CtrError::Store(format!("failed to create {}: {}", parent.display(), e)))?;
        }

        // Atomic: write .tmp then rename
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| CtrError::Store(format!("failed to write {}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| CtrError::Store(format!("failed to rename tmp to {}: {}", self.path.display(), e)))?;

        tracing::debug!(path = %self.path.display(), companies = dictionary.len(), "saved company config");
        Ok(())
    }
}
