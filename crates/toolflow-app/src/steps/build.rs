use eframe::egui::{self, RichText};
use toolflow_core::{
    CATEGORIES, Field, Port, Position, ToolDefinition, WorkflowGraph, WorkflowNode, validate_graph,
};

use super::{StepAction, StepContext, StepPanel, field_error, section_heading};
use crate::theme::{self, ACCENT_AMBER, ACCENT_GREEN, TEXT_MUTED, TEXT_SECONDARY};

#[derive(Default)]
pub struct BuildPanel {
    search: String,
}

fn matches_search(tool: &ToolDefinition, search: &str) -> bool {
    let search = search.trim().to_lowercase();
    search.is_empty()
        || tool.name.to_lowercase().contains(&search)
        || tool.category.to_lowercase().contains(&search)
}

fn port_label(ui: &mut egui::Ui, port: &Port, connected: bool) {
    ui.colored_label(theme::port_color(port.kind), "●");
    let mut text = RichText::new(&port.name).size(12.0);
    if port.required {
        text = text.strong();
    }
    ui.label(text);
    if connected {
        ui.label(RichText::new("connected").size(11.0).color(ACCENT_GREEN));
    }
}

/// Inputs that `output` on `from` could feed right now.
fn connection_targets<'g>(
    graph: &'g WorkflowGraph,
    from: &WorkflowNode,
    output: &Port,
) -> Vec<(&'g WorkflowNode, &'g Port)> {
    graph
        .nodes
        .iter()
        .filter(|node| node.id != from.id)
        .flat_map(|node| node.inputs.iter().map(move |input| (node, input)))
        .filter(|(node, input)| graph.validate_connection(from.id, &output.id, node.id, &input.id))
        .collect()
}

impl BuildPanel {
    fn palette(&mut self, ui: &mut egui::Ui, cx: &StepContext<'_>) -> Option<StepAction> {
        let mut action = None;

        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("Search tools")
                .desired_width(f32::INFINITY),
        );
        ui.add_space(6.0);

        egui::ScrollArea::vertical()
            .id_salt("tool_palette")
            .show(ui, |ui| {
                for category in CATEGORIES {
                    let tools: Vec<&ToolDefinition> = cx
                        .catalog
                        .tools
                        .iter()
                        .filter(|t| t.category == category && matches_search(t, &self.search))
                        .collect();
                    if tools.is_empty() {
                        continue;
                    }

                    ui.label(RichText::new(category).size(12.0).color(TEXT_MUTED));
                    for tool in tools {
                        let button = egui::Button::new(&tool.name).min_size(egui::vec2(200.0, 0.0));
                        let response = ui.add(button).on_hover_text(format!(
                            "in: {}\nout: {}",
                            kinds(&tool.input_types),
                            kinds(&tool.output_types)
                        ));
                        if response.clicked() {
                            action = Some(StepAction::AddTool {
                                tool_id: tool.id.clone(),
                                position: Some(Position::cascade(cx.data.graph.nodes.len())),
                            });
                        }
                    }
                    ui.add_space(6.0);
                }
            });

        action
    }

    fn node_card(
        &self,
        ui: &mut egui::Ui,
        graph: &WorkflowGraph,
        node: &WorkflowNode,
    ) -> Option<StepAction> {
        let mut action = None;

        theme::card_frame(false).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(&node.label).strong());
                ui.label(RichText::new(&node.tool_id).size(11.0).color(TEXT_MUTED));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Remove").clicked() {
                        action = Some(StepAction::RemoveNode(node.id));
                    }
                });
            });

            for input in &node.inputs {
                ui.horizontal(|ui| {
                    port_label(ui, input, graph.is_input_connected(node.id, &input.id));
                });
            }

            for output in &node.outputs {
                ui.horizontal(|ui| {
                    port_label(ui, output, graph.is_output_connected(node.id, &output.id));
                    let targets = connection_targets(graph, node, output);
                    ui.add_enabled_ui(!targets.is_empty(), |ui| {
                        egui::ComboBox::from_id_salt(("connect", node.id, output.id.as_str()))
                            .selected_text("Connect to…")
                            .show_ui(ui, |ui| {
                                for (target, input) in targets {
                                    let label = format!("{} · {}", target.label, input.name);
                                    if ui.selectable_label(false, label).clicked() {
                                        action = Some(StepAction::Connect {
                                            from_node: node.id,
                                            from_port: output.id.clone(),
                                            to_node: target.id,
                                            to_port: input.id.clone(),
                                        });
                                    }
                                }
                            });
                    });
                });
            }
        });

        action
    }

    fn connection_list(&self, ui: &mut egui::Ui, graph: &WorkflowGraph) -> Option<StepAction> {
        let mut action = None;
        if graph.connections.is_empty() {
            return None;
        }

        section_heading(ui, "Connections");
        for conn in &graph.connections {
            let describe = |id, port: &str| {
                graph
                    .find_node(id)
                    .map(|n| format!("{} ({})", n.label, port))
                    .unwrap_or_else(|| "missing node".to_string())
            };
            ui.horizontal(|ui| {
                ui.colored_label(theme::port_color(conn.kind), "●");
                ui.label(
                    RichText::new(format!(
                        "{} → {}",
                        describe(conn.from_node, &conn.from_port),
                        describe(conn.to_node, &conn.to_port)
                    ))
                    .color(TEXT_SECONDARY),
                );
                if ui.small_button("✕").clicked() {
                    action = Some(StepAction::RemoveConnection(conn.id));
                }
            });
        }
        action
    }
}

fn kinds(list: &[toolflow_core::PortKind]) -> String {
    if list.is_empty() {
        return "none".to_string();
    }
    list.iter()
        .map(|k| k.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StepPanel for BuildPanel {
    fn render(&mut self, ui: &mut egui::Ui, cx: &StepContext<'_>) -> Option<StepAction> {
        let mut action = None;
        let graph = &cx.data.graph;

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(220.0);
                section_heading(ui, "Tools");
                if let Some(added) = self.palette(ui, cx) {
                    action = Some(added);
                }
            });

            ui.separator();

            ui.vertical(|ui| {
                section_heading(ui, "Workflow");
                field_error(ui, cx.errors, Field::Nodes);
                if let Err(e) = validate_graph(graph) {
                    ui.label(RichText::new(e.to_string()).size(12.0).color(ACCENT_AMBER));
                }

                egui::ScrollArea::vertical()
                    .id_salt("workflow_nodes")
                    .show(ui, |ui| {
                        if graph.is_empty() {
                            ui.label(
                                RichText::new("Pick a tool on the left to add it here.")
                                    .color(TEXT_MUTED),
                            );
                        }
                        for node in &graph.nodes {
                            if let Some(edit) = self.node_card(ui, graph, node) {
                                action = Some(edit);
                            }
                            ui.add_space(6.0);
                        }
                        if let Some(removed) = self.connection_list(ui, graph) {
                            action = Some(removed);
                        }
                    });
            });
        });

        action
    }
}
