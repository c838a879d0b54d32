pub mod config;
pub mod events;
pub mod records;
mod wizard;

pub use config::{BackendConfig, ConfigError, DraftStorage, WizardConfig, default_draft_dir};
pub use events::{
    NavigationRequest, Notification, NotificationAction, NotificationLevel, Screen, WizardEvent,
};
pub use records::{RecordStatus, RecordStore, RestRecordStore, StoreError, Submission};
pub use wizard::{
    AutosaveHandle, Submitter, Transition, WizardController, WizardError, WizardSession,
    WizardState,
};
