use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use toolflow_core::storage::KeyValueStore;
use tracing::{debug, warn};

use super::controller::WizardController;

/// Periodic draft writer owned by a session. Stops when cancelled or dropped.
pub struct AutosaveHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Must be called from within a tokio runtime.
    pub fn spawn<K: KeyValueStore + 'static>(
        controller: Arc<Mutex<WizardController<K>>>,
        period: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        let job = controller.lock().begin_autosave();
                        let Some(job) = job else {
                            continue;
                        };
                        // The file write runs off the async workers and without the lock.
                        let written = tokio::task::spawn_blocking(move || {
                            let result = job.write();
                            (job.ticket, result)
                        })
                        .await;
                        match written {
                            Ok((ticket, result)) => {
                                let _ = controller.lock().finish_autosave(ticket, result);
                            }
                            Err(e) => {
                                warn!("auto-save write did not complete: {}", e);
                                controller.lock().abort_autosave();
                            }
                        }
                    }
                }
            }
            debug!("autosave stopped");
        });

        Self { token, task }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
