// Application settings
// Loaded from ~/.config/ctrsum/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an alternative settings file
pub const SETTINGS_ENV: &str = "CTRSUM_SETTINGS";

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    /// AI classification disabled (default)
    #[default]
    None,
    /// OpenAI-compatible chat-completions API
    #[serde(rename = "openai")]
    OpenAI,
}

impl AIProvider {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AIProvider::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AIProvider::None => "none",
            AIProvider::OpenAI => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AIProvider::None => "",
            AIProvider::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            AIProvider::None => "",
            AIProvider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// AI-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AISettings {
    pub provider: AIProvider,

    /// Model identifier. Empty = provider default
    pub model: String,

    /// Base URL of the API. None = provider default
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub temperature: f32,

    pub max_tokens: u32,
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            provider: AIProvider::None,
            model: String::new(),
            endpoint: None,
            timeout_secs: 15,
            temperature: 0.1,
            max_tokens: 20,
        }
    }
}

impl AISettings {
    /// Get the effective model (user-specified or provider default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    pub fn effective_endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or_else(|| self.provider.default_endpoint())
    }
}

/// Batch processing defaults. CLI flags win over these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Try the capitalization heuristic after the dictionary
    pub heuristic_fallback: bool,

    /// Save newly detected companies to the company config
    pub learn: bool,

    /// Workbook file name when --output is not given
    pub output_name: String,

    /// Company config location. None = company_config.json in the working directory
    pub config_path: Option<PathBuf>,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            heuristic_fallback: false,
            learn: true,
            output_name: "CTR_Summary.xlsx".to_string(),
            config_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ai: AISettings,
    pub processing: ProcessingSettings,
}

impl Settings {
    /// Get the settings file path. `CTRSUM_SETTINGS` overrides it.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ctrsum");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. Missing file = defaults; unreadable or
    /// malformed file = defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "error parsing settings, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "error reading settings, using defaults");
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Company config path, relative to `base` when not set in settings.
    pub fn company_config_path(&self, base: &Path) -> PathBuf {
        match &self.processing.config_path {
            Some(p) => p.clone(),
            None => base.join(crate::company_store::COMPANY_CONFIG_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.ai.provider, AIProvider::None);
        assert_eq!(s.ai.timeout_secs, 15);
        assert_eq!(s.ai.max_tokens, 20);
        assert!(s.processing.learn);
        assert!(!s.processing.heuristic_fallback);
        assert_eq!(s.processing.output_name, "CTR_Summary.xlsx");
    }

    #[test]
    fn test_parse_with_comments_and_partial_sections() {
        let json = r#"{
    // AI classification
    "ai": {
        "provider": "openai",
        "model": "gpt-4o"
    },
    // Learning off for shared configs
    "processing": { "learn": false }
}"#;
        let s = Settings::parse(json).unwrap();
        assert_eq!(s.ai.provider, AIProvider::OpenAI);
        assert_eq!(s.ai.effective_model(), "gpt-4o");
        assert_eq!(s.ai.effective_endpoint(), "https://api.openai.com/v1");
        assert_eq!(s.ai.timeout_secs, 15);
        assert!(!s.processing.learn);
        assert_eq!(s.processing.output_name, "CTR_Summary.xlsx");
    }

    #[test]
    fn test_effective_model_falls_back_to_provider_default() {
        let ai = AISettings { provider: AIProvider::OpenAI, ..Default::default() };
        assert_eq!(ai.effective_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load_from(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_company_config_path() {
        let mut s = Settings::default();
        assert_eq!(
            s.company_config_path(Path::new("/work")),
            PathBuf::from("/work/company_config.json")
        );
        s.processing.config_path = Some(PathBuf::from("/etc/ctrsum/companies.json"));
        assert_eq!(
            s.company_config_path(Path::new("/work")),
            PathBuf::from("/etc/ctrsum/companies.json")
        );
    }
}
