use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
use toolflow_core::draft::{DraftError, DraftStore};
use toolflow_core::storage::KeyValueStore;
use toolflow_core::{
    Catalog, ConnectionError, Position, ToolDefinition, ValidationErrors, WizardData, WizardPatch,
    WizardStep, WizardVariant, WorkflowTemplate, validate_all, validate_step,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::events::{
    NavigationRequest, Notification, NotificationAction, NotificationLevel, Screen, WizardEvent,
};
use crate::records::{StoreError, Submission};

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Step {0} is out of range (1-4)")]
    StepOutOfRange(u8),

    #[error("A submission is already in progress")]
    SubmitInProgress,

    #[error("{step} is incomplete")]
    Incomplete {
        step: WizardStep,
        errors: ValidationErrors,
    },

    #[error("Submission failed: {0}")]
    Submit(#[from] StoreError),

    #[error("Record {record_id} was created after the wizard was reset")]
    Abandoned { record_id: String },

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Everything the UI renders from. Owned by the controller; readers get clones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub is_valid: bool,
    pub is_submitting: bool,
    pub is_draft: bool,
    pub has_unsaved_changes: bool,
    pub data: WizardData,
    pub validation_errors: ValidationErrors,
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// Outcome of a forward navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced(WizardStep),
    Blocked,
    /// The review step is valid; the caller should submit.
    ReadyToSubmit,
}

const SUBMIT_FAILED_MESSAGE: &str =
    "Something went wrong while submitting. Try again, or save as draft and come back later.";

/// Identifies the data an auto-save snapshot was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AutosaveTicket {
    revision: u64,
    generation: u64,
}

/// A draft write taken out of the controller so it can run without the lock.
pub(crate) struct AutosaveJob<K> {
    pub(crate) ticket: AutosaveTicket,
    drafts: DraftStore<K>,
    data: WizardData,
}

impl<K: KeyValueStore> AutosaveJob<K> {
    pub(crate) fn write(&self) -> Result<DateTime<Utc>, DraftError> {
        self.drafts.save(&self.data)
    }
}

/// Step/validation state machine for one wizard session.
pub struct WizardController<K: KeyValueStore> {
    variant: WizardVariant,
    state: WizardState,
    drafts: DraftStore<K>,
    event_tx: Sender<WizardEvent>,
    /// Set once a blocked attempt has shown errors on the current step;
    /// later edits keep the error map in sync until the step changes.
    errors_surfaced: bool,
    autosave_failing: bool,
    /// Bumped on every data edit.
    revision: u64,
    /// Bumped whenever the session is reset or closed.
    generation: u64,
    /// Generation the in-flight submit started in.
    submit_generation: Option<u64>,
}

impl<K: KeyValueStore> WizardController<K> {
    /// Start a session, hydrating from the stored draft when one exists.
    pub fn open(
        variant: WizardVariant,
        drafts: DraftStore<K>,
        event_tx: Sender<WizardEvent>,
    ) -> Self {
        let mut controller = Self {
            variant,
            state: WizardState::default(),
            drafts,
            event_tx,
            errors_surfaced: false,
            autosave_failing: false,
            revision: 0,
            generation: 0,
            submit_generation: None,
        };

        match controller.drafts.load() {
            Ok(Some(data)) => {
                info!(variant = %variant, key = controller.drafts.key(), "restored draft");
                controller.state.data = data;
                controller.emit(WizardEvent::Notification(Notification::new(
                    NotificationLevel::Info,
                    "Draft restored",
                    "Picked up where you left off.",
                )));
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable draft: {}", e),
        }

        controller.refresh_validity();
        controller
    }

    pub fn variant(&self) -> WizardVariant {
        self.variant
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn data(&self) -> &WizardData {
        &self.state.data
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step
    }

    pub fn drafts(&self) -> &DraftStore<K> {
        &self.drafts
    }

    pub(crate) fn event_sender(&self) -> Sender<WizardEvent> {
        self.event_tx.clone()
    }

    fn emit(&self, event: WizardEvent) {
        let _ = self.event_tx.try_send(event);
    }

    fn notify(&self, notification: Notification) {
        self.emit(WizardEvent::Notification(notification));
    }

    /// Recompute `is_valid` for the current step. The error map is only
    /// replaced once errors have been surfaced on this step.
    fn refresh_validity(&mut self) {
        let result = validate_step(self.variant, self.state.current_step, &self.state.data);
        self.state.is_valid = result.is_valid;
        if self.errors_surfaced {
            self.state.validation_errors = result.errors;
        }
    }

    fn move_to(&mut self, step: WizardStep) {
        let from = self.state.current_step;
        self.state.current_step = step;
        self.errors_surfaced = false;
        self.state.validation_errors.clear();
        self.refresh_validity();
        info!(from = from.number(), to = step.number(), "wizard step changed");
        self.emit(WizardEvent::StepChanged { from, to: step });
    }

    fn surface_errors(&mut self, step: WizardStep, errors: ValidationErrors) {
        self.errors_surfaced = true;
        self.state.is_valid = false;
        self.state.validation_errors = errors.clone();
        debug!(step = step.number(), ?errors, "validation blocked navigation");
        self.emit(WizardEvent::ValidationFailed { step, errors });
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn next(&mut self) -> Transition {
        let step = self.state.current_step;
        let result = validate_step(self.variant, step, &self.state.data);
        if !result.is_valid {
            self.surface_errors(step, result.errors);
            return Transition::Blocked;
        }

        self.state.is_valid = true;
        self.state.validation_errors.clear();
        match step.next() {
            Some(next) => {
                self.move_to(next);
                Transition::Advanced(next)
            }
            None => Transition::ReadyToSubmit,
        }
    }

    /// Go back one step. Never validates; a no-op on the first step.
    pub fn previous(&mut self) -> WizardStep {
        if let Some(prev) = self.state.current_step.previous() {
            self.move_to(prev);
        }
        self.state.current_step
    }

    /// Jump straight to step `n` (1-based) without validating the steps in between.
    pub fn jump_to(&mut self, n: u8) -> Result<WizardStep, WizardError> {
        let step = WizardStep::from_number(n).ok_or(WizardError::StepOutOfRange(n))?;
        if step != self.state.current_step {
            self.move_to(step);
        }
        Ok(step)
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    fn mark_changed(&mut self) {
        self.revision += 1;
        self.state.has_unsaved_changes = true;
        self.refresh_validity();
    }

    /// Shallow-merge `patch` into the form data. Validation waits for navigation.
    pub fn update_data(&mut self, patch: WizardPatch) {
        self.state.data.merge(patch);
        self.mark_changed();
    }

    pub fn apply_template(&mut self, template: &WorkflowTemplate, catalog: &Catalog) {
        let mut patch = template.seed(catalog);
        patch.import_type = Some(toolflow_core::ImportType::Template);
        self.update_data(patch);
    }

    pub fn add_tool(&mut self, tool: &ToolDefinition, position: Option<Position>) -> Uuid {
        let id = self.state.data.graph.add_tool(tool, position);
        self.mark_changed();
        id
    }

    pub fn connect(
        &mut self,
        from_node: Uuid,
        from_output: &str,
        to_node: Uuid,
        to_input: &str,
    ) -> Result<Uuid, WizardError> {
        let id = self
            .state
            .data
            .graph
            .connect(from_node, from_output, to_node, to_input)?;
        self.mark_changed();
        Ok(id)
    }

    pub fn remove_node(&mut self, id: Uuid) -> bool {
        let removed = self.state.data.graph.remove_node(id);
        if removed {
            self.mark_changed();
        }
        removed
    }

    pub fn remove_connection(&mut self, id: Uuid) -> bool {
        let removed = self.state.data.graph.remove_connection(id);
        if removed {
            self.mark_changed();
        }
        removed
    }

    pub fn move_node(&mut self, id: Uuid, position: Position) -> bool {
        let Some(node) = self.state.data.graph.find_node_mut(id) else {
            return false;
        };
        node.position = position;
        self.mark_changed();
        true
    }

    // -------------------------------------------------------------------------
    // Drafts
    // -------------------------------------------------------------------------

    fn write_draft(&mut self) -> Result<DateTime<Utc>, DraftError> {
        self.state.is_draft = true;
        let result = self.drafts.save(&self.state.data);
        self.state.is_draft = false;

        if let Ok(saved_at) = &result {
            self.state.has_unsaved_changes = false;
            self.state.last_saved_at = Some(*saved_at);
        }
        result
    }

    /// User-triggered save. Failures are reported once and never retried.
    pub fn save_draft(&mut self) -> Result<DateTime<Utc>, DraftError> {
        match self.write_draft() {
            Ok(saved_at) => {
                info!(key = self.drafts.key(), "draft saved");
                self.autosave_failing = false;
                self.emit(WizardEvent::DraftSaved {
                    saved_at,
                    automatic: false,
                });
                self.notify(Notification::new(
                    NotificationLevel::Success,
                    "Draft saved",
                    "You can come back and finish later.",
                ));
                Ok(saved_at)
            }
            Err(e) => {
                warn!("Failed to save draft: {}", e);
                self.notify(Notification::new(
                    NotificationLevel::Error,
                    "Couldn't save draft",
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Timer-triggered save: silent, and a no-op when nothing changed.
    pub fn autosave(&mut self) -> Option<Result<DateTime<Utc>, DraftError>> {
        let job = self.begin_autosave()?;
        let result = job.write();
        Some(self.finish_autosave(job.ticket, result))
    }

    /// Snapshot the data for an auto-save, or `None` when there is nothing to write.
    pub(crate) fn begin_autosave(&mut self) -> Option<AutosaveJob<K>> {
        if !self.state.has_unsaved_changes || self.state.is_submitting {
            return None;
        }
        self.state.is_draft = true;
        Some(AutosaveJob {
            ticket: AutosaveTicket {
                revision: self.revision,
                generation: self.generation,
            },
            drafts: self.drafts.clone(),
            data: self.state.data.clone(),
        })
    }

    /// Record the outcome of a write started by [`Self::begin_autosave`].
    ///
    /// Edits made while the write ran stay unsaved.
    pub(crate) fn finish_autosave(
        &mut self,
        ticket: AutosaveTicket,
        result: Result<DateTime<Utc>, DraftError>,
    ) -> Result<DateTime<Utc>, DraftError> {
        self.state.is_draft = false;
        if ticket.generation != self.generation {
            debug!("dropping auto-save result from a reset session");
            return result;
        }

        match &result {
            Ok(saved_at) => {
                debug!(key = self.drafts.key(), "auto-saved draft");
                self.state.last_saved_at = Some(*saved_at);
                if ticket.revision == self.revision {
                    self.state.has_unsaved_changes = false;
                }
                self.autosave_failing = false;
                self.emit(WizardEvent::DraftSaved {
                    saved_at: *saved_at,
                    automatic: true,
                });
            }
            Err(e) => {
                warn!("Auto-save failed: {}", e);
                // Only tell the user about the first failure in a streak.
                if !self.autosave_failing {
                    self.notify(Notification::new(
                        NotificationLevel::Warning,
                        "Auto-save unavailable",
                        e.to_string(),
                    ));
                }
                self.autosave_failing = true;
            }
        }
        result
    }

    /// Clear the in-progress flag after an auto-save write that never reported back.
    pub(crate) fn abort_autosave(&mut self) {
        self.state.is_draft = false;
    }

    pub fn discard_draft(&mut self) -> Result<(), DraftError> {
        self.drafts.clear()?;
        info!(key = self.drafts.key(), "draft discarded");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// First half of a submit: re-validate every step and hand out the payload.
    ///
    /// On a validation failure the wizard moves to the first failing step.
    pub fn begin_submit(&mut self) -> Result<Submission, WizardError> {
        if self.state.is_submitting {
            return Err(WizardError::SubmitInProgress);
        }

        if let Err(blocked) = validate_all(self.variant, &self.state.data) {
            if blocked.step != self.state.current_step {
                self.move_to(blocked.step);
            }
            self.surface_errors(blocked.step, blocked.errors.clone());
            self.notify(Notification::new(
                NotificationLevel::Warning,
                "Almost there",
                format!("Please complete {} before submitting.", blocked.step),
            ));
            return Err(WizardError::Incomplete {
                step: blocked.step,
                errors: blocked.errors,
            });
        }

        self.state.is_submitting = true;
        self.submit_generation = Some(self.generation);
        info!(variant = %self.variant, name = %self.state.data.name, "submitting");
        Ok(Submission::new(self.variant, self.state.data.clone()))
    }

    /// Second half of a submit, fed with the result of the create call.
    ///
    /// A result arriving after the session was reset or closed leaves the
    /// stored draft and the current state alone.
    pub fn finish_submit(
        &mut self,
        result: Result<String, StoreError>,
    ) -> Result<String, WizardError> {
        let started_in = self.submit_generation.take();
        self.state.is_submitting = false;

        if started_in != Some(self.generation) {
            return match result {
                Ok(record_id) => {
                    warn!(record_id = %record_id, "submission finished after the wizard was reset");
                    Err(WizardError::Abandoned { record_id })
                }
                Err(e) => {
                    warn!("submission failed after the wizard was reset: {}", e);
                    Err(WizardError::Submit(e))
                }
            };
        }

        match result {
            Ok(record_id) => {
                if let Err(e) = self.drafts.clear() {
                    warn!("Failed to clear draft after submit: {}", e);
                }
                info!(variant = %self.variant, record_id = %record_id, "submission succeeded");

                let (title, message) = match self.variant {
                    WizardVariant::Workflow => ("Workflow created", "Your workflow is live."),
                    WizardVariant::ToolSubmission => {
                        ("Tool submitted", "Your tool is queued for review.")
                    }
                };
                self.notify(Notification::new(NotificationLevel::Success, title, message));
                self.emit(WizardEvent::Submitted {
                    record_id: record_id.clone(),
                });
                self.reset();
                Ok(record_id)
            }
            Err(e) => {
                error!(variant = %self.variant, "submission failed: {}", e);
                self.notify(
                    Notification::new(
                        NotificationLevel::Error,
                        "Submission failed",
                        SUBMIT_FAILED_MESSAGE,
                    )
                    .with_action(NotificationAction::SaveDraft),
                );
                Err(WizardError::Submit(e))
            }
        }
    }

    /// Where to go once a record was created.
    pub fn completion_navigation(&self, record_id: &str) -> NavigationRequest {
        let mut params = BTreeMap::new();
        params.insert("id".to_string(), record_id.to_string());
        NavigationRequest {
            from: Screen::Wizard(self.variant),
            to: Screen::RecordDetail(self.variant),
            params,
        }
    }

    /// Abandon the session. The stored draft is kept for a later visit.
    pub fn cancel(&mut self) {
        info!(
            variant = %self.variant,
            unsaved = self.state.has_unsaved_changes,
            "wizard cancelled"
        );
        self.reset();
        self.emit(WizardEvent::Navigate(NavigationRequest {
            from: Screen::Wizard(self.variant),
            to: Screen::Dashboard,
            params: BTreeMap::new(),
        }));
    }

    /// Detach any in-flight submit or auto-save from this session.
    pub(crate) fn close(&mut self) {
        self.generation += 1;
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.state = WizardState::default();
        self.errors_surfaced = false;
        self.autosave_failing = false;
        self.refresh_validity();
    }
}
