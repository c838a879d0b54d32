use eframe::egui::{self, RichText};
use toolflow_core::{
    Field, ImportType, PublishSettings, TestConfig, WizardPatch, WizardStep, WizardVariant,
    validate_graph,
};

use super::{StepAction, StepContext, StepPanel, field_error, section_heading};
use crate::theme::{self, ACCENT_AMBER, TEXT_MUTED, TEXT_SECONDARY};

const TERMS_LABEL: &str =
    "I confirm I have the rights to share this tool and accept the submission terms";

#[derive(Default)]
pub struct ReviewPanel;

fn summary_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [110.0, 18.0],
            egui::Label::new(RichText::new(label).color(TEXT_MUTED)),
        );
        let value = if value.trim().is_empty() { "—" } else { value };
        ui.label(RichText::new(value).color(TEXT_SECONDARY));
    });
}

/// Card summarising one step, with an "Edit" button that jumps back to it.
fn summary_card(
    ui: &mut egui::Ui,
    step: WizardStep,
    action: &mut Option<StepAction>,
    body: impl FnOnce(&mut egui::Ui),
) {
    theme::card_frame(false).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(RichText::new(step.title()).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Edit").clicked() {
                    *action = Some(StepAction::JumpTo(step));
                }
            });
        });
        body(ui);
    });
    ui.add_space(6.0);
}

impl ReviewPanel {
    fn test_config(ui: &mut egui::Ui, current: &TestConfig) -> Option<TestConfig> {
        let mut config = current.clone();
        let mut changed = false;

        section_heading(ui, "Test run");
        ui.label("Sample input");
        changed |= ui
            .add(
                egui::TextEdit::multiline(&mut config.sample_input)
                    .desired_rows(2)
                    .desired_width(f32::INFINITY),
            )
            .changed();
        ui.horizontal(|ui| {
            ui.label("Timeout");
            changed |= ui
                .add(
                    egui::DragValue::new(&mut config.timeout_seconds)
                        .range(1..=3600)
                        .suffix(" s"),
                )
                .changed();
        });

        changed.then_some(config)
    }

    fn publish_settings(
        ui: &mut egui::Ui,
        variant: WizardVariant,
        current: &PublishSettings,
    ) -> Option<PublishSettings> {
        let mut publish = current.clone();
        let mut changed = false;

        section_heading(ui, "Release");
        ui.horizontal(|ui| {
            ui.label("Version");
            changed |= ui
                .add(egui::TextEdit::singleline(&mut publish.version).desired_width(100.0))
                .changed();
        });
        ui.label("Release notes");
        changed |= ui
            .add(
                egui::TextEdit::multiline(&mut publish.release_notes)
                    .desired_rows(2)
                    .desired_width(f32::INFINITY),
            )
            .changed();
        match variant {
            WizardVariant::Workflow => {
                changed |= ui
                    .checkbox(&mut publish.publish_immediately, "Publish immediately")
                    .changed();
            }
            WizardVariant::ToolSubmission => {
                ui.label(
                    RichText::new("Tool submissions are reviewed before they are listed.")
                        .size(12.0)
                        .color(TEXT_MUTED),
                );
            }
        }

        changed.then_some(publish)
    }
}

impl StepPanel for ReviewPanel {
    fn render(&mut self, ui: &mut egui::Ui, cx: &StepContext<'_>) -> Option<StepAction> {
        let data = cx.data;
        let mut action = None;
        let mut patch = WizardPatch::default();

        egui::ScrollArea::vertical().show(ui, |ui| {
            summary_card(ui, WizardStep::Source, &mut action, |ui| {
                summary_row(ui, "Start from", data.import_type.display_name());
                match data.import_type {
                    ImportType::Template => {
                        let name = data
                            .selected_template
                            .as_deref()
                            .and_then(|id| cx.catalog.template(id))
                            .map(|t| t.name.as_str())
                            .unwrap_or_default();
                        summary_row(ui, "Template", name);
                    }
                    ImportType::AiGenerated => summary_row(ui, "Prompt", &data.ai_prompt),
                    ImportType::File => {
                        summary_row(ui, "File", data.source_file.as_deref().unwrap_or_default())
                    }
                    ImportType::Blank => {}
                }
            });

            summary_card(ui, WizardStep::Build, &mut action, |ui| {
                let graph = &data.graph;
                summary_row(ui, "Tools", &graph.nodes.len().to_string());
                summary_row(ui, "Connections", &graph.connections.len().to_string());
                if let Err(e) = validate_graph(graph) {
                    ui.label(RichText::new(e.to_string()).size(12.0).color(ACCENT_AMBER));
                }
            });

            summary_card(ui, WizardStep::Details, &mut action, |ui| {
                summary_row(ui, "Name", &data.name);
                summary_row(ui, "Description", &data.description);
                summary_row(ui, "Category", &data.category);
                summary_row(ui, "Tags", &data.tags.join(", "));
                summary_row(ui, "Difficulty", data.difficulty.display_name());
                summary_row(ui, "Visibility", if data.is_public { "Public" } else { "Private" });
            });

            if let Some(config) = Self::test_config(ui, &data.test_config) {
                patch.test_config = Some(config);
            }
            if let Some(publish) = Self::publish_settings(ui, cx.variant, &data.publish) {
                patch.publish = Some(publish);
            }

            if cx.variant == WizardVariant::ToolSubmission {
                section_heading(ui, "Terms");
                let mut accepted = data.terms_accepted;
                if ui.checkbox(&mut accepted, TERMS_LABEL).changed() {
                    patch.terms_accepted = Some(accepted);
                }
                field_error(ui, cx.errors, Field::TermsAccepted);
            }
        });

        action.or((!patch.is_empty()).then_some(StepAction::Update(patch)))
    }
}
