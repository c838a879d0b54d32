//! One panel per wizard step.
//!
//! Panels render from a snapshot of the wizard data and report at most one
//! edit per frame as a [`StepAction`]; the wizard view applies it to the
//! controller.

mod build;
mod details;
mod review;
mod source;

use eframe::egui::{self, RichText};
use toolflow_core::{
    Catalog, Field, Position, ValidationErrors, WizardData, WizardPatch, WizardStep, WizardVariant,
};
use uuid::Uuid;

use crate::theme::ACCENT_RED;

pub use build::BuildPanel;
pub use details::DetailsPanel;
pub use review::ReviewPanel;
pub use source::SourcePanel;

/// Edit requested by a step panel.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Update(WizardPatch),
    ApplyTemplate(String),
    AddTool {
        tool_id: String,
        position: Option<Position>,
    },
    Connect {
        from_node: Uuid,
        from_port: String,
        to_node: Uuid,
        to_port: String,
    },
    RemoveNode(Uuid),
    RemoveConnection(Uuid),
    JumpTo(WizardStep),
}

/// Read-only inputs every panel renders from.
pub struct StepContext<'a> {
    pub variant: WizardVariant,
    pub data: &'a WizardData,
    pub errors: &'a ValidationErrors,
    pub catalog: &'a Catalog,
}

pub trait StepPanel {
    fn render(&mut self, ui: &mut egui::Ui, cx: &StepContext<'_>) -> Option<StepAction>;
}

/// Panel state for a whole wizard session.
#[derive(Default)]
pub struct StepPanels {
    source: SourcePanel,
    build: BuildPanel,
    details: DetailsPanel,
    review: ReviewPanel,
}

impl StepPanels {
    pub fn panel_for(&mut self, step: WizardStep) -> &mut dyn StepPanel {
        match step {
            WizardStep::Source => &mut self.source,
            WizardStep::Build => &mut self.build,
            WizardStep::Details => &mut self.details,
            WizardStep::Review => &mut self.review,
        }
    }
}

/// Red hint under a field when the last validation pass flagged it.
pub(crate) fn field_error(ui: &mut egui::Ui, errors: &ValidationErrors, field: Field) {
    if let Some(message) = errors.get(&field) {
        ui.label(RichText::new(message).size(12.0).color(ACCENT_RED));
    }
}

pub(crate) fn section_heading(ui: &mut egui::Ui, text: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(text).strong().size(15.0));
    ui.add_space(4.0);
}
