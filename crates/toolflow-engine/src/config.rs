use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use toolflow_core::WizardVariant;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config validation failed: {0}")]
    Invalid(String),
}

/// Hosted data store the wizard submits records to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub workflows_table: String,
    pub tools_table: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: None,
            workflows_table: "workflows".to_string(),
            tools_table: "tools".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn table_for(&self, variant: WizardVariant) -> &str {
        match variant {
            WizardVariant::Workflow => &self.workflows_table,
            WizardVariant::ToolSubmission => &self.tools_table,
        }
    }
}

/// Where drafts are kept between visits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStorage {
    /// One JSON file per draft, surviving restarts.
    #[default]
    File,
    /// Process memory only; drafts are gone once the app exits.
    Memory,
}

/// `<user data dir>/toolflow/drafts`, or `.toolflow/drafts` when the platform
/// has no data directory.
pub fn default_draft_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("toolflow"))
        .unwrap_or_else(|| PathBuf::from(".toolflow"))
        .join("drafts")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Seconds between auto-save attempts while there are unsaved changes.
    pub autosave_interval_secs: u64,
    /// Delay between a successful submit and the navigation away from the wizard.
    pub redirect_delay_ms: u64,
    pub draft_storage: DraftStorage,
    /// Overrides [`default_draft_dir`] for file storage.
    pub draft_dir: Option<PathBuf>,
    /// Namespace for draft keys (e.g. a user id).
    pub draft_scope: Option<String>,
    pub backend: BackendConfig,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            autosave_interval_secs: 30,
            redirect_delay_ms: 1500,
            draft_storage: DraftStorage::File,
            draft_dir: None,
            draft_scope: None,
            backend: BackendConfig::default(),
        }
    }
}

impl WizardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`WizardConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autosave_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "autosave_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.base_url must be non-empty".to_string()));
        }
        for (field, table) in [
            ("workflows_table", &self.backend.workflows_table),
            ("tools_table", &self.backend.tools_table),
        ] {
            if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::Invalid(format!(
                    "backend.{field} must use only ASCII letters, digits or '_'"
                )));
            }
        }
        Ok(())
    }

    /// Directory for draft files, or `None` when drafts stay in memory.
    pub fn draft_location(&self) -> Option<PathBuf> {
        match self.draft_storage {
            DraftStorage::Memory => None,
            DraftStorage::File => Some(self.draft_dir.clone().unwrap_or_else(default_draft_dir)),
        }
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}
