use eframe::egui::{self, RichText};
use toolflow_core::{CATEGORIES, Difficulty, Field, WizardPatch, parse_tags};

use super::{StepAction, StepContext, StepPanel, field_error, section_heading};
use crate::theme::TEXT_MUTED;

#[derive(Default)]
pub struct DetailsPanel {
    /// Raw tag text; parsed into the data on every edit.
    tags_input: Option<String>,
}

/// The cached tag text while it still parses to `tags`, otherwise `tags` rejoined.
fn tag_text(cached: Option<String>, tags: &[String]) -> String {
    match cached {
        Some(text) if parse_tags(&text) == tags => text,
        _ => tags.join(", "),
    }
}

impl StepPanel for DetailsPanel {
    fn render(&mut self, ui: &mut egui::Ui, cx: &StepContext<'_>) -> Option<StepAction> {
        let data = cx.data;
        let mut patch = WizardPatch::default();

        section_heading(ui, "Name");
        let mut name = data.name.clone();
        if ui
            .add(egui::TextEdit::singleline(&mut name).desired_width(420.0))
            .changed()
        {
            patch.name = Some(name);
        }
        field_error(ui, cx.errors, Field::Name);

        section_heading(ui, "Description");
        let mut description = data.description.clone();
        if ui
            .add(
                egui::TextEdit::multiline(&mut description)
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            )
            .changed()
        {
            patch.description = Some(description);
        }
        field_error(ui, cx.errors, Field::Description);

        section_heading(ui, "Category");
        let selected = if data.category.is_empty() {
            "Select a category"
        } else {
            data.category.as_str()
        };
        egui::ComboBox::from_id_salt("details_category")
            .selected_text(selected)
            .width(240.0)
            .show_ui(ui, |ui| {
                for category in CATEGORIES {
                    if ui
                        .selectable_label(data.category == category, category)
                        .clicked()
                    {
                        patch.category = Some(category.to_string());
                    }
                }
            });
        field_error(ui, cx.errors, Field::Category);

        section_heading(ui, "Tags");
        // Templates and file imports can replace the tags behind the buffer.
        let text = tag_text(self.tags_input.take(), &data.tags);
        let tags = self.tags_input.insert(text);
        if ui
            .add(
                egui::TextEdit::singleline(tags)
                    .hint_text("comma, separated, tags")
                    .desired_width(420.0),
            )
            .changed()
        {
            patch.tags = Some(parse_tags(tags));
        }

        section_heading(ui, "Difficulty");
        ui.horizontal(|ui| {
            for level in Difficulty::ALL {
                if ui
                    .radio(data.difficulty == level, level.display_name())
                    .clicked()
                {
                    patch.difficulty = Some(level);
                }
            }
        });

        section_heading(ui, "Visibility");
        let mut is_public = data.is_public;
        if ui.checkbox(&mut is_public, "List publicly").changed() {
            patch.is_public = Some(is_public);
        }
        let mut allow_forking = data.allow_forking;
        if ui
            .checkbox(&mut allow_forking, "Allow others to fork")
            .changed()
        {
            patch.allow_forking = Some(allow_forking);
        }
        if !data.is_public {
            ui.label(
                RichText::new("Private records are only visible to you.")
                    .size(12.0)
                    .color(TEXT_MUTED),
            );
        }

        (!patch.is_empty()).then_some(StepAction::Update(patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn in_progress_text_is_kept() {
        let text = tag_text(Some("blog, seo, ".to_string()), &tags(&["blog", "seo"]));
        assert_eq!(text, "blog, seo, ");
    }

    #[test]
    fn replaced_tags_override_stale_text() {
        // A template applied after the field was edited.
        let text = tag_text(Some("draft".to_string()), &tags(&["podcast", "notes"]));
        assert_eq!(text, "podcast, notes");
        assert_eq!(tag_text(None, &tags(&["a"])), "a");
    }
}
