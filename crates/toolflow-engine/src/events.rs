use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use toolflow_core::{ValidationErrors, WizardStep, WizardVariant};

/// Screens the hosting app can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Dashboard,
    Wizard(WizardVariant),
    RecordDetail(WizardVariant),
}

/// Hand control back to the host's screen switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub from: Screen,
    pub to: Screen,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Follow-up a notification offers to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationAction {
    SaveDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub action: Option<NotificationAction>,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Events sent from the wizard back to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WizardEvent {
    StepChanged { from: WizardStep, to: WizardStep },
    ValidationFailed { step: WizardStep, errors: ValidationErrors },
    DraftSaved { saved_at: DateTime<Utc>, automatic: bool },
    Notification(Notification),
    Submitted { record_id: String },
    Navigate(NavigationRequest),
}
