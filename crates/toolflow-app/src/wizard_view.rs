use eframe::egui::{self, Align, Button, Color32, Layout, RichText};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{Receiver, channel};
use toolflow_core::draft::DraftStore;
use toolflow_core::shortcuts::{Key, KeyChord, WizardCommand, resolve_shortcut};
use toolflow_core::{Catalog, WizardStep, WizardVariant};
use toolflow_engine::{
    RestRecordStore, Transition, WizardConfig, WizardController, WizardEvent, WizardSession,
};
use tracing::{debug, warn};

use crate::drafts::DraftBackend;
use crate::steps::{StepAction, StepContext, StepPanels};
use crate::theme::{
    self, ACCENT_AMBER, ACCENT_CORAL, ACCENT_GREEN, TEXT_MUTED, TEXT_PRIMARY, TEXT_SECONDARY,
};

const SHORTCUT_KEYS: [(egui::Key, Key); 5] = [
    (egui::Key::Enter, Key::Enter),
    (egui::Key::Escape, Key::Escape),
    (egui::Key::S, Key::S),
    (egui::Key::ArrowLeft, Key::ArrowLeft),
    (egui::Key::ArrowRight, Key::ArrowRight),
];

/// The open wizard: its session, the event stream and per-step panel state.
pub struct WizardView {
    variant: WizardVariant,
    session: WizardSession<DraftBackend, RestRecordStore>,
    events: Receiver<WizardEvent>,
    panels: StepPanels,
    submitted: Option<String>,
}

impl WizardView {
    pub fn open(
        variant: WizardVariant,
        drafts: DraftBackend,
        config: &WizardConfig,
        runtime: &Handle,
    ) -> Self {
        let (event_tx, events) = channel(64);
        let drafts = DraftStore::new(drafts, variant, config.draft_scope.as_deref());
        let controller = WizardController::open(variant, drafts, event_tx);
        let records = RestRecordStore::new(config.backend.clone());

        // The session spawns its auto-save task on the current runtime.
        let _guard = runtime.enter();
        let session = WizardSession::open(controller, records, config);

        Self {
            variant,
            session,
            events,
            panels: StepPanels::default(),
            submitted: None,
        }
    }

    /// Drain everything the wizard emitted since the last frame.
    pub fn poll_events(&mut self) -> Vec<WizardEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let WizardEvent::Submitted { record_id } = &event {
                self.submitted = Some(record_id.clone());
            }
            events.push(event);
        }
        events
    }

    pub fn run(&mut self, command: WizardCommand, runtime: &Handle) {
        debug!(?command, "wizard command");
        match command {
            WizardCommand::Next => {
                if self.session.with(|c| c.next()) == Transition::ReadyToSubmit {
                    self.submit(runtime);
                }
            }
            WizardCommand::Previous => {
                self.session.with(|c| c.previous());
            }
            WizardCommand::Submit => self.submit(runtime),
            WizardCommand::SaveDraft => {
                // Failures are reported through a notification.
                let _ = self.session.with(|c| c.save_draft());
            }
            WizardCommand::Cancel => self.session.with(|c| c.cancel()),
        }
    }

    fn submit(&self, runtime: &Handle) {
        if self.submitted.is_some() {
            return;
        }
        let submitter = self.session.submitter();
        runtime.spawn(async move {
            if let Err(e) = submitter.submit().await {
                debug!("submit did not complete: {}", e);
            }
        });
    }

    fn apply(&mut self, action: StepAction, catalog: &Catalog) {
        self.session.with(|c| match action {
            StepAction::Update(patch) => c.update_data(patch),
            StepAction::ApplyTemplate(id) => match catalog.template(&id) {
                Some(template) => c.apply_template(template, catalog),
                None => warn!(template = %id, "unknown template"),
            },
            StepAction::AddTool { tool_id, position } => match catalog.tool(&tool_id) {
                Some(tool) => {
                    c.add_tool(tool, position);
                }
                None => warn!(tool = %tool_id, "unknown tool"),
            },
            StepAction::Connect {
                from_node,
                from_port,
                to_node,
                to_port,
            } => {
                if let Err(e) = c.connect(from_node, &from_port, to_node, &to_port) {
                    warn!("Connection rejected: {}", e);
                }
            }
            StepAction::RemoveNode(id) => {
                c.remove_node(id);
            }
            StepAction::RemoveConnection(id) => {
                c.remove_connection(id);
            }
            StepAction::JumpTo(step) => {
                if let Err(e) = c.jump_to(step.number()) {
                    warn!("{}", e);
                }
            }
        });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context, runtime: &Handle) {
        let step = self.session.with(|c| c.current_step());
        let commands: Vec<WizardCommand> = ctx.input(|i| {
            SHORTCUT_KEYS
                .iter()
                .filter(|(egui_key, _)| i.key_pressed(*egui_key))
                .map(|(_, key)| KeyChord {
                    key: *key,
                    command: i.modifiers.command,
                })
                .filter_map(|chord| resolve_shortcut(chord, step))
                .collect()
        });
        for command in commands {
            self.run(command, runtime);
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, catalog: &Catalog, runtime: &Handle) {
        if self.submitted.is_none() {
            self.handle_shortcuts(ctx, runtime);
        }

        let state = self.session.state();
        let step = state.current_step;
        let mut command = None;

        egui::TopBottomPanel::top("wizard_header")
            .frame(theme::header_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new(self.variant.display_name()).color(TEXT_PRIMARY));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if state.has_unsaved_changes {
                            ui.label(
                                RichText::new("Unsaved changes")
                                    .size(12.0)
                                    .color(ACCENT_AMBER),
                            );
                        } else if let Some(saved_at) = state.last_saved_at {
                            let local = saved_at.with_timezone(&chrono::Local);
                            ui.label(
                                RichText::new(format!("Draft saved {}", local.format("%H:%M:%S")))
                                    .size(12.0)
                                    .color(TEXT_MUTED),
                            );
                        }
                    });
                });
                ui.add_space(6.0);
                ui.add(egui::ProgressBar::new(step.progress()).fill(ACCENT_CORAL));
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    for s in WizardStep::ALL {
                        let color = match s.cmp(&step) {
                            std::cmp::Ordering::Less => ACCENT_GREEN,
                            std::cmp::Ordering::Equal => ACCENT_CORAL,
                            std::cmp::Ordering::Greater => TEXT_MUTED,
                        };
                        let label = format!("{}. {}", s.number(), s.title());
                        ui.label(RichText::new(label).color(color));
                        ui.add_space(12.0);
                    }
                });
            });

        egui::TopBottomPanel::bottom("wizard_footer")
            .frame(theme::footer_frame())
            .show(ctx, |ui| {
                ui.add_enabled_ui(self.submitted.is_none(), |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            command = Some(WizardCommand::Cancel);
                        }
                        if ui.button("Save draft").clicked() {
                            command = Some(WizardCommand::SaveDraft);
                        }

                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            let label = if step.is_last() { "Submit" } else { "Next" };
                            let primary = Button::new(RichText::new(label).color(Color32::WHITE))
                                .fill(ACCENT_CORAL)
                                .corner_radius(6.0);
                            if ui.add_enabled(!state.is_submitting, primary).clicked() {
                                command = Some(WizardCommand::Next);
                            }
                            if state.is_submitting {
                                ui.spinner();
                            }
                            if ui
                                .add_enabled(step != WizardStep::FIRST, Button::new("Back"))
                                .clicked()
                            {
                                command = Some(WizardCommand::Previous);
                            }
                        });
                    });
                });
            });

        let mut action = None;
        egui::CentralPanel::default()
            .frame(theme::content_frame())
            .show(ctx, |ui| {
                if let Some(record_id) = &self.submitted {
                    ui.vertical_centered(|ui| {
                        ui.add_space(80.0);
                        ui.heading(RichText::new("Submitted").color(ACCENT_GREEN));
                        ui.label(
                            RichText::new(format!("Record {record_id}")).color(TEXT_SECONDARY),
                        );
                        ui.spinner();
                    });
                    return;
                }

                ui.heading(step.title());
                ui.label(RichText::new(step.description()).color(TEXT_SECONDARY));
                ui.add_space(12.0);

                let cx = StepContext {
                    variant: self.variant,
                    data: &state.data,
                    errors: &state.validation_errors,
                    catalog,
                };
                action = self.panels.panel_for(step).render(ui, &cx);
            });

        if let Some(action) = action {
            self.apply(action, catalog);
        }
        if let Some(command) = command {
            self.run(command, runtime);
        }
    }
}
