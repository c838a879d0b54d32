use anyhow::Context;
use eframe::egui::{self, RichText};
use std::path::Path;
use toolflow_core::{Field, ImportType, WizardPatch, WorkflowExport};
use tracing::{info, warn};

use super::{StepAction, StepContext, StepPanel, field_error, section_heading};
use crate::theme::{self, ACCENT_RED, TEXT_MUTED, TEXT_SECONDARY};

#[derive(Default)]
pub struct SourcePanel {
    import_error: Option<String>,
}

fn read_export(path: &Path) -> anyhow::Result<WorkflowExport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    WorkflowExport::from_json(&json).context("file is not an exported workflow")
}

impl SourcePanel {
    fn import_file(&mut self) -> Option<StepAction> {
        let path = rfd::FileDialog::new()
            .set_title("Import workflow")
            .add_filter("Workflow JSON", &["json"])
            .pick_file()?;

        match read_export(&path) {
            Ok(export) => {
                info!(
                    path = %path.display(),
                    nodes = export.graph.nodes.len(),
                    "imported workflow file"
                );
                self.import_error = None;
                let mut patch = export.into_patch(path.display().to_string());
                patch.import_type = Some(ImportType::File);
                Some(StepAction::Update(patch))
            }
            Err(e) => {
                warn!("Workflow import failed: {:#}", e);
                self.import_error = Some(format!("{:#}", e));
                None
            }
        }
    }

    fn template_picker(&mut self, ui: &mut egui::Ui, cx: &StepContext<'_>) -> Option<StepAction> {
        let mut action = None;
        let selected = cx.data.selected_template.as_deref();

        for template in &cx.catalog.templates {
            let is_selected = selected == Some(template.id.as_str());
            theme::card_frame(is_selected).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&template.name).strong());
                    ui.label(
                        RichText::new(format!(
                            "{} · {}",
                            template.category,
                            template.difficulty.display_name()
                        ))
                        .size(12.0)
                        .color(TEXT_MUTED),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = if is_selected { "Selected" } else { "Use template" };
                        if ui.add_enabled(!is_selected, egui::Button::new(label)).clicked() {
                            action = Some(StepAction::ApplyTemplate(template.id.clone()));
                        }
                    });
                });
                ui.label(RichText::new(&template.description).color(TEXT_SECONDARY));
                let tools: Vec<&str> = template
                    .tool_ids
                    .iter()
                    .filter_map(|id| cx.catalog.tool(id))
                    .map(|tool| tool.name.as_str())
                    .collect();
                ui.label(RichText::new(tools.join(" → ")).size(12.0).color(TEXT_MUTED));
            });
            ui.add_space(6.0);
        }

        field_error(ui, cx.errors, Field::SelectedTemplate);
        action
    }
}

impl StepPanel for SourcePanel {
    fn render(&mut self, ui: &mut egui::Ui, cx: &StepContext<'_>) -> Option<StepAction> {
        let mut action = None;

        section_heading(ui, "How do you want to start?");
        ui.horizontal_wrapped(|ui| {
            for kind in ImportType::ALL {
                let current = cx.data.import_type == kind;
                if ui.radio(current, kind.display_name()).clicked() && !current {
                    action = Some(StepAction::Update(WizardPatch {
                        import_type: Some(kind),
                        ..Default::default()
                    }));
                }
            }
        });
        ui.add_space(12.0);

        match cx.data.import_type {
            ImportType::Blank => {
                ui.label(
                    RichText::new("Start from an empty canvas and add tools in the next step.")
                        .color(TEXT_SECONDARY),
                );
            }
            ImportType::Template => {
                if let Some(picked) = self.template_picker(ui, cx) {
                    action = Some(picked);
                }
            }
            ImportType::AiGenerated => {
                ui.label("Describe what the workflow should do");
                let mut prompt = cx.data.ai_prompt.clone();
                let response = ui.add(
                    egui::TextEdit::multiline(&mut prompt)
                        .hint_text("e.g. Summarize new support tickets and post a daily digest")
                        .desired_rows(5)
                        .desired_width(f32::INFINITY),
                );
                if response.changed() {
                    action = Some(StepAction::Update(WizardPatch {
                        ai_prompt: Some(prompt),
                        ..Default::default()
                    }));
                }
                field_error(ui, cx.errors, Field::AiPrompt);
            }
            ImportType::File => {
                ui.horizontal(|ui| {
                    if ui.button("Choose file…").clicked()
                        && let Some(imported) = self.import_file()
                    {
                        action = Some(imported);
                    }
                    match &cx.data.source_file {
                        Some(path) => ui.label(RichText::new(path).color(TEXT_SECONDARY)),
                        None => ui.label(RichText::new("No file selected").color(TEXT_MUTED)),
                    };
                });
                if let Some(error) = &self.import_error {
                    ui.label(RichText::new(error).size(12.0).color(ACCENT_RED));
                }
            }
        }

        action
    }
}
