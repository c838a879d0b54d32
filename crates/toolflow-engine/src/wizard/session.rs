use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use toolflow_core::storage::KeyValueStore;
use tracing::debug;

use super::autosave::AutosaveHandle;
use super::controller::{Transition, WizardController, WizardError, WizardState};
use crate::config::WizardConfig;
use crate::events::WizardEvent;
use crate::records::RecordStore;

/// A controller wired to a record store, an auto-save timer and the
/// delayed post-submit navigation.
pub struct WizardSession<K: KeyValueStore + 'static, S: RecordStore> {
    controller: Arc<Mutex<WizardController<K>>>,
    records: Arc<S>,
    event_tx: Sender<WizardEvent>,
    redirect_delay: Duration,
    autosave: Option<AutosaveHandle>,
}

impl<K: KeyValueStore + 'static, S: RecordStore> WizardSession<K, S> {
    /// Starts the auto-save timer, so this must run inside a tokio runtime.
    pub fn open(controller: WizardController<K>, records: S, config: &WizardConfig) -> Self {
        let event_tx = controller.event_sender();
        let controller = Arc::new(Mutex::new(controller));
        let autosave = AutosaveHandle::spawn(controller.clone(), config.autosave_interval());

        Self {
            controller,
            records: Arc::new(records),
            event_tx,
            redirect_delay: config.redirect_delay(),
            autosave: Some(autosave),
        }
    }

    pub fn controller(&self) -> &Arc<Mutex<WizardController<K>>> {
        &self.controller
    }

    pub fn records(&self) -> &S {
        &self.records
    }

    /// Run `f` against the controller under its lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut WizardController<K>) -> R) -> R {
        f(&mut self.controller.lock())
    }

    pub fn state(&self) -> WizardState {
        self.controller.lock().state().clone()
    }

    /// Forward navigation; on a valid review step this submits.
    pub async fn next(&self) -> Result<Transition, WizardError> {
        let transition = self.controller.lock().next();
        if transition == Transition::ReadyToSubmit {
            self.submit().await?;
        }
        Ok(transition)
    }

    pub async fn submit(&self) -> Result<String, WizardError> {
        self.submitter().submit().await
    }

    /// Detached handle for driving a submit from a spawned task.
    pub fn submitter(&self) -> Submitter<K, S> {
        Submitter {
            controller: self.controller.clone(),
            records: self.records.clone(),
            event_tx: self.event_tx.clone(),
            redirect_delay: self.redirect_delay,
        }
    }

    pub fn is_autosave_running(&self) -> bool {
        self.autosave.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop background work. An in-flight submit still completes, but its
    /// result no longer touches the stored draft.
    pub fn close(&mut self) {
        if let Some(handle) = self.autosave.take() {
            handle.cancel();
            self.controller.lock().close();
            debug!("wizard session closed");
        }
    }
}

impl<K: KeyValueStore + 'static, S: RecordStore> Drop for WizardSession<K, S> {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct Submitter<K: KeyValueStore + 'static, S: RecordStore> {
    controller: Arc<Mutex<WizardController<K>>>,
    records: Arc<S>,
    event_tx: Sender<WizardEvent>,
    redirect_delay: Duration,
}

impl<K: KeyValueStore + 'static, S: RecordStore> Clone for Submitter<K, S> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            records: self.records.clone(),
            event_tx: self.event_tx.clone(),
            redirect_delay: self.redirect_delay,
        }
    }
}

impl<K: KeyValueStore + 'static, S: RecordStore> Submitter<K, S> {
    /// Validate, make exactly one create call, then record the outcome.
    ///
    /// The controller lock is never held across the network call.
    pub async fn submit(self) -> Result<String, WizardError> {
        let submission = self.controller.lock().begin_submit()?;
        let result = self.records.create(&submission).await;
        let (outcome, navigation) = {
            let mut controller = self.controller.lock();
            let outcome = controller.finish_submit(result);
            let navigation = outcome
                .as_ref()
                .ok()
                .map(|id| controller.completion_navigation(id));
            (outcome, navigation)
        };

        if let Some(request) = navigation {
            let tx = self.event_tx.clone();
            let delay = self.redirect_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(WizardEvent::Navigate(request)).await;
            });
        }

        outcome
    }
}
