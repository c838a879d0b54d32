use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::storage::{KeyValueStore, StorageError};
use crate::{WizardData, WizardVariant};

const DRAFT_KEY_PREFIX: &str = "toolflow.draft";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to serialize draft: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Stored draft is unreadable: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Storage key for a variant's draft, optionally namespaced by a scope
/// (user or entity id) so unrelated sessions do not pick up each other's drafts.
pub fn draft_key(variant: WizardVariant, scope: Option<&str>) -> String {
    match scope.map(str::trim).filter(|s| !s.is_empty()) {
        Some(scope) => format!("{}.{}:{}", DRAFT_KEY_PREFIX, variant.slug(), scope),
        None => format!("{}.{}", DRAFT_KEY_PREFIX, variant.slug()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftEnvelope<'a> {
    saved_at: DateTime<Utc>,
    data: &'a WizardData,
}

#[derive(Debug, Deserialize)]
struct StoredDraft {
    data: WizardData,
}

/// Single-slot draft persistence on top of a [`KeyValueStore`].
///
/// Clones share the underlying store.
#[derive(Debug)]
pub struct DraftStore<K> {
    store: Arc<K>,
    key: String,
}

impl<K> Clone for DraftStore<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
        }
    }
}

impl<K: KeyValueStore> DraftStore<K> {
    pub fn new(store: K, variant: WizardVariant, scope: Option<&str>) -> Self {
        Self {
            store: Arc::new(store),
            key: draft_key(variant, scope),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist `data`, returning the save timestamp.
    pub fn save(&self, data: &WizardData) -> Result<DateTime<Utc>, DraftError> {
        let saved_at = Utc::now();
        let envelope = DraftEnvelope { saved_at, data };
        let json = serde_json::to_string(&envelope).map_err(DraftError::Serialize)?;
        self.store.set(&self.key, &json)?;
        Ok(saved_at)
    }

    pub fn load(&self) -> Result<Option<WizardData>, DraftError> {
        let Some(json) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let envelope: StoredDraft = serde_json::from_str(&json).map_err(DraftError::Corrupt)?;
        Ok(Some(envelope.data))
    }

    pub fn clear(&self) -> Result<(), DraftError> {
        self.store.remove(&self.key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
    use crate::{Catalog, ImportType, WizardPatch};

    fn sample_data() -> WizardData {
        let catalog = Catalog::builtin();
        let mut data = WizardData {
            import_type: ImportType::Template,
            tags: vec!["blog".to_string()],
            is_public: true,
            ..Default::default()
        };
        let patch: WizardPatch = catalog.template("blog-pipeline").unwrap().seed(&catalog);
        data.merge(patch);
        data
    }

    #[test]
    fn keys_differ_per_variant_and_scope() {
        assert_eq!(draft_key(WizardVariant::Workflow, None), "toolflow.draft.workflow");
        assert_eq!(
            draft_key(WizardVariant::ToolSubmission, None),
            "toolflow.draft.tool-submission"
        );
        assert_eq!(
            draft_key(WizardVariant::Workflow, Some("user-7")),
            "toolflow.draft.workflow:user-7"
        );
        assert_eq!(
            draft_key(WizardVariant::Workflow, Some("  ")),
            "toolflow.draft.workflow"
        );
    }

    #[test]
    fn save_then_load_is_deep_equal() {
        let drafts = DraftStore::new(MemoryKeyValueStore::new(), WizardVariant::Workflow, None);
        let data = sample_data();
        drafts.save(&data).unwrap();
        assert_eq!(drafts.load().unwrap(), Some(data));
    }

    #[test]
    fn save_then_load_through_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let drafts = DraftStore::new(
            FileKeyValueStore::new(dir.path()),
            WizardVariant::ToolSubmission,
            Some("session-1"),
        );
        let data = sample_data();
        drafts.save(&data).unwrap();
        assert_eq!(drafts.load().unwrap(), Some(data));

        drafts.clear().unwrap();
        assert_eq!(drafts.load().unwrap(), None);
    }

    #[test]
    fn variants_do_not_share_drafts() {
        let store = MemoryKeyValueStore::new();
        let workflow = DraftStore::new(store.clone(), WizardVariant::Workflow, None);
        let tool = DraftStore::new(store.clone(), WizardVariant::ToolSubmission, None);
        workflow.save(&sample_data()).unwrap();
        assert_eq!(tool.load().unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corrupt_draft_is_an_error() {
        let store = MemoryKeyValueStore::new();
        let drafts = DraftStore::new(store.clone(), WizardVariant::Workflow, None);
        store.set(drafts.key(), "{ nope").unwrap();
        assert!(matches!(drafts.load(), Err(DraftError::Corrupt(_))));
    }
}
