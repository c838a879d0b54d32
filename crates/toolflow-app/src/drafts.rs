use toolflow_core::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError};
use toolflow_engine::WizardConfig;

/// Draft storage picked from config: a directory on disk, or memory only.
#[derive(Debug, Clone)]
pub enum DraftBackend {
    File(FileKeyValueStore),
    Memory(MemoryKeyValueStore),
}

impl DraftBackend {
    pub fn from_config(config: &WizardConfig) -> Self {
        match config.draft_location() {
            Some(dir) => Self::File(FileKeyValueStore::new(dir)),
            None => Self::Memory(MemoryKeyValueStore::new()),
        }
    }
}

impl KeyValueStore for DraftBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::File(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::File(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::File(store) => store.remove(key),
            Self::Memory(store) => store.remove(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolflow_engine::DraftStorage;

    #[test]
    fn default_config_keeps_drafts_on_disk() {
        let backend = DraftBackend::from_config(&WizardConfig::default());
        match backend {
            DraftBackend::File(store) => {
                let path = store.path_for("toolflow.draft.workflow");
                assert!(path.ends_with("toolflow/drafts/toolflow.draft.workflow.json"));
            }
            DraftBackend::Memory(_) => panic!("default config should persist drafts"),
        }
    }

    #[test]
    fn memory_storage_is_opt_in() {
        let config = WizardConfig {
            draft_storage: DraftStorage::Memory,
            ..Default::default()
        };
        assert!(matches!(DraftBackend::from_config(&config), DraftBackend::Memory(_)));
    }
}
