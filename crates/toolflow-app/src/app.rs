use crate::drafts::DraftBackend;
use crate::theme::{self, ACCENT_CORAL, ACCENT_GREEN, TEXT_SECONDARY};
use crate::wizard_view::WizardView;
use eframe::egui::{self, Align2, Button, Color32, RichText};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use toolflow_core::draft::DraftStore;
use toolflow_core::shortcuts::WizardCommand;
use toolflow_core::{Catalog, WizardVariant};
use toolflow_engine::{
    NavigationRequest, Notification, NotificationAction, Screen, WizardConfig, WizardEvent,
};
use tracing::{debug, info, warn};

const TOAST_LIFETIME: Duration = Duration::from_secs(6);

struct Toast {
    notification: Notification,
    shown_at: Instant,
}

pub struct ToolflowApp {
    config: WizardConfig,
    runtime: Runtime,
    catalog: Catalog,
    drafts: DraftBackend,

    screen: Screen,
    wizard: Option<WizardView>,
    last_record: Option<String>,

    toasts: Vec<Toast>,
    /// Variants with a stored draft, refreshed whenever the dashboard is shown.
    resumable: Vec<WizardVariant>,
}

impl ToolflowApp {
    pub fn new(config: WizardConfig, runtime: Runtime) -> Self {
        let drafts = DraftBackend::from_config(&config);
        let mut app = Self {
            config,
            runtime,
            catalog: Catalog::builtin(),
            drafts,
            screen: Screen::Dashboard,
            wizard: None,
            last_record: None,
            toasts: Vec::new(),
            resumable: Vec::new(),
        };
        app.refresh_resumable();
        app
    }

    fn draft_store(&self, variant: WizardVariant) -> DraftStore<DraftBackend> {
        DraftStore::new(self.drafts.clone(), variant, self.config.draft_scope.as_deref())
    }

    fn refresh_resumable(&mut self) {
        self.resumable = [WizardVariant::Workflow, WizardVariant::ToolSubmission]
            .into_iter()
            .filter(|variant| match self.draft_store(*variant).load() {
                Ok(draft) => draft.is_some(),
                Err(e) => {
                    warn!("Ignoring unreadable draft: {}", e);
                    false
                }
            })
            .collect();
    }

    fn open_wizard(&mut self, variant: WizardVariant) {
        info!(variant = %variant, "opening wizard");
        self.wizard = Some(WizardView::open(
            variant,
            self.drafts.clone(),
            &self.config,
            self.runtime.handle(),
        ));
        self.screen = Screen::Wizard(variant);
    }

    fn navigate(&mut self, request: NavigationRequest) {
        info!(from = ?request.from, to = ?request.to, "navigate");
        match request.to {
            Screen::Dashboard => {
                self.wizard = None;
                self.refresh_resumable();
            }
            Screen::Wizard(variant) => {
                self.open_wizard(variant);
                return;
            }
            Screen::RecordDetail(_) => {
                self.wizard = None;
                self.last_record = request.params.get("id").cloned();
                self.refresh_resumable();
            }
        }
        self.screen = request.to;
    }

    fn push_toast(&mut self, notification: Notification) {
        self.toasts.push(Toast {
            notification,
            shown_at: Instant::now(),
        });
        if self.toasts.len() > 5 {
            self.toasts.remove(0);
        }
    }

    fn poll_wizard_events(&mut self) {
        let Some(wizard) = self.wizard.as_mut() else {
            return;
        };

        for event in wizard.poll_events() {
            match event {
                WizardEvent::Notification(notification) => self.push_toast(notification),
                WizardEvent::Navigate(request) => self.navigate(request),
                WizardEvent::DraftSaved {
                    saved_at,
                    automatic,
                } => debug!(%saved_at, automatic, "draft saved"),
                WizardEvent::StepChanged { .. }
                | WizardEvent::ValidationFailed { .. }
                | WizardEvent::Submitted { .. } => {}
            }
        }
    }

    fn show_dashboard(&mut self, ctx: &egui::Context) {
        let mut open = None;
        let mut discard = None;

        egui::CentralPanel::default()
            .frame(theme::content_frame())
            .show(ctx, |ui| {
                ui.heading("Toolflow");
                ui.label(
                    RichText::new("Build a workflow from tools, or submit a tool of your own.")
                        .color(TEXT_SECONDARY),
                );
                ui.add_space(24.0);

                ui.horizontal_top(|ui| {
                    for variant in [WizardVariant::Workflow, WizardVariant::ToolSubmission] {
                        let has_draft = self.resumable.contains(&variant);
                        theme::card_frame(has_draft).show(ui, |ui| {
                            ui.set_width(280.0);
                            ui.label(RichText::new(variant.display_name()).strong().size(16.0));
                            ui.add_space(6.0);
                            let blurb = match variant {
                                WizardVariant::Workflow => {
                                    "Chain tools together and publish the result."
                                }
                                WizardVariant::ToolSubmission => {
                                    "Describe a tool and send it for review."
                                }
                            };
                            ui.label(RichText::new(blurb).color(TEXT_SECONDARY));
                            ui.add_space(12.0);
                            ui.horizontal(|ui| {
                                let label = if has_draft { "Resume draft" } else { "Start" };
                                let start = Button::new(RichText::new(label).color(Color32::WHITE))
                                    .fill(ACCENT_CORAL)
                                    .corner_radius(6.0);
                                if ui.add(start).clicked() {
                                    open = Some(variant);
                                }
                                if has_draft && ui.button("Discard draft").clicked() {
                                    discard = Some(variant);
                                }
                            });
                        });
                        ui.add_space(16.0);
                    }
                });
            });

        if let Some(variant) = discard {
            match self.draft_store(variant).clear() {
                Ok(()) => info!(variant = %variant, "draft discarded from dashboard"),
                Err(e) => warn!("Failed to discard draft: {}", e),
            }
            self.refresh_resumable();
        }
        if let Some(variant) = open {
            self.open_wizard(variant);
        }
    }

    fn show_record_detail(&mut self, ctx: &egui::Context, variant: WizardVariant) {
        let mut back = false;
        egui::CentralPanel::default()
            .frame(theme::content_frame())
            .show(ctx, |ui| {
                let title = match variant {
                    WizardVariant::Workflow => "Workflow created",
                    WizardVariant::ToolSubmission => "Tool submitted",
                };
                ui.heading(RichText::new(title).color(ACCENT_GREEN));
                if let Some(id) = &self.last_record {
                    ui.label(RichText::new(format!("Record id: {id}")).color(TEXT_SECONDARY));
                }
                ui.add_space(16.0);
                if ui.button("Back to dashboard").clicked() {
                    back = true;
                }
            });

        if back {
            self.navigate(NavigationRequest {
                from: Screen::RecordDetail(variant),
                to: Screen::Dashboard,
                params: Default::default(),
            });
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        self.toasts.retain(|toast| toast.shown_at.elapsed() < TOAST_LIFETIME);
        if self.toasts.is_empty() {
            return;
        }

        let mut save_draft = false;
        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_BOTTOM, [-16.0, -72.0])
            .show(ctx, |ui| {
                for (index, toast) in self.toasts.iter().enumerate() {
                    let n = &toast.notification;
                    theme::toast_frame(n.level).show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(&n.title)
                                    .strong()
                                    .color(theme::notification_color(n.level)),
                            );
                            if ui.small_button("✕").clicked() {
                                dismissed = Some(index);
                            }
                        });
                        ui.label(RichText::new(&n.message).size(12.0).color(TEXT_SECONDARY));
                        if n.action == Some(NotificationAction::SaveDraft)
                            && ui.button("Save as draft").clicked()
                        {
                            save_draft = true;
                            dismissed = Some(index);
                        }
                    });
                    ui.add_space(6.0);
                }
            });

        if let Some(index) = dismissed {
            self.toasts.remove(index);
        }
        if save_draft && let Some(wizard) = self.wizard.as_mut() {
            wizard.run(WizardCommand::SaveDraft, self.runtime.handle());
        }
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}

impl eframe::App for ToolflowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_wizard_events();

        match self.screen {
            Screen::Dashboard => self.show_dashboard(ctx),
            Screen::Wizard(variant) => match self.wizard.as_mut() {
                Some(wizard) => {
                    wizard.show(ctx, &self.catalog, self.runtime.handle());
                    // Auto-save and submit results arrive from background tasks.
                    ctx.request_repaint_after(Duration::from_millis(250));
                }
                None => {
                    warn!(variant = %variant, "wizard screen without a session");
                    self.screen = Screen::Dashboard;
                }
            },
            Screen::RecordDetail(variant) => self.show_record_detail(ctx, variant),
        }

        self.show_toasts(ctx);
    }
}
