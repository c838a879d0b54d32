mod autosave;
mod controller;
mod session;


pub use autosave::AutosaveHandle;
pub use controller::{Transition, WizardController, WizardError, WizardState};
pub use session::{Submitter, WizardSession};
