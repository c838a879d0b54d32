use crate::{ImportType, WizardData, WizardStep, WizardVariant, WorkflowGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Form fields a step rule can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    SelectedTemplate,
    AiPrompt,
    Nodes,
    Name,
    Description,
    Category,
    TermsAccepted,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::SelectedTemplate => "selectedTemplate",
            Field::AiPrompt => "aiPrompt",
            Field::Nodes => "nodes",
            Field::Name => "name",
            Field::Description => "description",
            Field::Category => "category",
            Field::TermsAccepted => "termsAccepted",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level messages from one validation pass.
pub type ValidationErrors = BTreeMap<Field, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepValidation {
    pub is_valid: bool,
    pub errors: ValidationErrors,
}

impl StepValidation {
    fn from_errors(errors: ValidationErrors) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Check the rules of a single step. Pure: same input, same answer.
pub fn validate_step(
    variant: WizardVariant,
    step: WizardStep,
    data: &WizardData,
) -> StepValidation {
    let mut errors = ValidationErrors::new();

    match step {
        WizardStep::Source => match data.import_type {
            ImportType::Template => {
                if data.selected_template.as_deref().is_none_or(is_blank) {
                    errors.insert(Field::SelectedTemplate, "Please select a template".to_string());
                }
            }
            ImportType::AiGenerated => {
                if is_blank(&data.ai_prompt) {
                    errors.insert(
                        Field::AiPrompt,
                        "Please describe the workflow you want to generate".to_string(),
                    );
                }
            }
            ImportType::Blank | ImportType::File => {}
        },
        WizardStep::Build => {
            if data.graph.is_empty() {
                errors.insert(Field::Nodes, "Add at least one tool to the workflow".to_string());
            }
        }
        WizardStep::Details => {
            if is_blank(&data.name) {
                errors.insert(Field::Name, "Name is required".to_string());
            }
            if is_blank(&data.description) {
                errors.insert(Field::Description, "Description is required".to_string());
            }
            if is_blank(&data.category) {
                errors.insert(Field::Category, "Please select a category".to_string());
            }
        }
        WizardStep::Review => match variant {
            WizardVariant::ToolSubmission => {
                if !data.terms_accepted {
                    errors.insert(
                        Field::TermsAccepted,
                        "You must accept the submission terms".to_string(),
                    );
                }
            }
            WizardVariant::Workflow => {}
        },
    }

    StepValidation::from_errors(errors)
}

/// First step that fails, checking every step in order and then graph integrity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionBlocked {
    pub step: WizardStep,
    pub errors: ValidationErrors,
}

pub fn validate_all(variant: WizardVariant, data: &WizardData) -> Result<(), SubmissionBlocked> {
    for step in WizardStep::ALL {
        let result = validate_step(variant, step, data);
        if !result.is_valid {
            return Err(SubmissionBlocked {
                step,
                errors: result.errors,
            });
        }
    }

    if let Err(e) = validate_graph(&data.graph) {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::Nodes, e.to_string());
        return Err(SubmissionBlocked {
            step: WizardStep::Build,
            errors,
        });
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Connection {0} references a node that no longer exists")]
    DanglingNode(uuid::Uuid),

    #[error("Connection {0} references a port that does not exist")]
    DanglingPort(uuid::Uuid),

    #[error("Input '{port}' on {label} has more than one incoming connection")]
    MultipleIncoming { label: String, port: String },

    #[error("Connection {0} links incompatible port kinds")]
    IncompatibleKinds(uuid::Uuid),
}

/// Re-check every stored connection against the graph it lives in.
///
/// Connections are only checked when created, so edits made afterwards
/// (imports, removals, hand-edited drafts) can leave the graph inconsistent.
pub fn validate_graph(graph: &WorkflowGraph) -> Result<(), GraphError> {
    let mut seen_inputs = HashSet::new();

    for conn in &graph.connections {
        let source = graph
            .find_node(conn.from_node)
            .ok_or(GraphError::DanglingNode(conn.id))?;
        let target = graph
            .find_node(conn.to_node)
            .ok_or(GraphError::DanglingNode(conn.id))?;

        let output = source
            .output(&conn.from_port)
            .ok_or(GraphError::DanglingPort(conn.id))?;
        let input = target
            .input(&conn.to_port)
            .ok_or(GraphError::DanglingPort(conn.id))?;

        if !seen_inputs.insert((conn.to_node, conn.to_port.as_str())) {
            return Err(GraphError::MultipleIncoming {
                label: target.label.clone(),
                port: input.name.clone(),
            });
        }

        if !output.kind.can_feed(input.kind) {
            return Err(GraphError::IncompatibleKinds(conn.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PortKind, ToolDefinition, WorkflowConnection};

    fn tool(inputs: &[PortKind], outputs: &[PortKind]) -> ToolDefinition {
        ToolDefinition {
            id: "t".to_string(),
            name: "Tool".to_string(),
            category: "Testing".to_string(),
            input_types: inputs.to_vec(),
            output_types: outputs.to_vec(),
        }
    }

    fn complete_data() -> WizardData {
        let mut data = WizardData {
            name: "My Workflow".to_string(),
            description: "desc".to_string(),
            category: "Content Creation".to_string(),
            terms_accepted: true,
            ..Default::default()
        };
        data.graph.add_tool(&tool(&[PortKind::Text], &[PortKind::Text]), None);
        data
    }

    #[test]
    fn blank_and_file_imports_pass_step_one() {
        for import_type in [ImportType::Blank, ImportType::File] {
            let data = WizardData {
                import_type,
                ..Default::default()
            };
            let result = validate_step(WizardVariant::Workflow, WizardStep::Source, &data);
            assert!(result.is_valid);
            assert!(result.errors.is_empty());
        }
    }

    #[test]
    fn template_import_requires_selection() {
        let mut data = WizardData {
            import_type: ImportType::Template,
            ..Default::default()
        };
        let result = validate_step(WizardVariant::Workflow, WizardStep::Source, &data);
        assert!(!result.is_valid);
        assert!(result.errors.contains_key(&Field::SelectedTemplate));

        data.selected_template = Some("blog-pipeline".to_string());
        assert!(validate_step(WizardVariant::Workflow, WizardStep::Source, &data).is_valid);
    }

    #[test]
    fn ai_import_requires_non_blank_prompt() {
        let mut data = WizardData {
            import_type: ImportType::AiGenerated,
            ai_prompt: "   ".to_string(),
            ..Default::default()
        };
        let result = validate_step(WizardVariant::Workflow, WizardStep::Source, &data);
        assert!(!result.is_valid);
        assert!(!result.errors[&Field::AiPrompt].is_empty());

        data.ai_prompt = "Summarize my inbox".to_string();
        assert!(validate_step(WizardVariant::Workflow, WizardStep::Source, &data).is_valid);
    }

    #[test]
    fn build_step_requires_a_node() {
        let data = WizardData::default();
        let result = validate_step(WizardVariant::Workflow, WizardStep::Build, &data);
        assert_eq!(result.errors.keys().collect::<Vec<_>>(), vec![&Field::Nodes]);
        assert!(
            validate_step(WizardVariant::Workflow, WizardStep::Build, &complete_data()).is_valid
        );
    }

    #[test]
    fn details_step_reports_every_missing_field() {
        let data = WizardData {
            name: "Named".to_string(),
            ..Default::default()
        };
        let result = validate_step(WizardVariant::Workflow, WizardStep::Details, &data);
        assert!(!result.is_valid);
        assert!(!result.errors.contains_key(&Field::Name));
        assert!(result.errors.contains_key(&Field::Description));
        assert!(result.errors.contains_key(&Field::Category));
    }

    #[test]
    fn review_step_depends_on_variant() {
        let data = WizardData::default();
        assert!(validate_step(WizardVariant::Workflow, WizardStep::Review, &data).is_valid);
        let result = validate_step(WizardVariant::ToolSubmission, WizardStep::Review, &data);
        assert!(result.errors.contains_key(&Field::TermsAccepted));
    }

    #[test]
    fn validation_is_idempotent() {
        let data = WizardData {
            import_type: ImportType::AiGenerated,
            ..Default::default()
        };
        for step in WizardStep::ALL {
            let first = validate_step(WizardVariant::ToolSubmission, step, &data);
            let second = validate_step(WizardVariant::ToolSubmission, step, &data);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn validate_all_reports_first_failing_step() {
        let mut data = complete_data();
        assert_eq!(validate_all(WizardVariant::ToolSubmission, &data), Ok(()));

        data.graph.nodes.clear();
        data.name.clear();
        let blocked = validate_all(WizardVariant::Workflow, &data).unwrap_err();
        assert_eq!(blocked.step, WizardStep::Build);
        assert!(blocked.errors.contains_key(&Field::Nodes));
    }

    #[test]
    fn validate_graph_catches_dangling_connection() {
        let mut data = complete_data();
        let node = data.graph.nodes[0].id;
        let conn_id = uuid::Uuid::new_v4();
        data.graph.connections.push(WorkflowConnection {
            id: conn_id,
            from_node: uuid::Uuid::new_v4(),
            from_port: "output-0".to_string(),
            to_node: node,
            to_port: "input-0".to_string(),
            kind: PortKind::Text,
        });
        assert_eq!(
            validate_graph(&data.graph),
            Err(GraphError::DanglingNode(conn_id))
        );
        let blocked = validate_all(WizardVariant::Workflow, &data).unwrap_err();
        assert_eq!(blocked.step, WizardStep::Build);
    }

    #[test]
    fn validate_graph_catches_double_incoming() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool(&[], &[PortKind::Text]), None);
        let b = graph.add_tool(&tool(&[], &[PortKind::Text]), None);
        let c = graph.add_tool(&tool(&[PortKind::Text], &[]), None);
        graph.connect(a, "output-0", c, "input-0").unwrap();
        // Bypass the creation-time check.
        let mut dup = graph.connections[0].clone();
        dup.id = uuid::Uuid::new_v4();
        dup.from_node = b;
        graph.connections.push(dup);

        assert!(matches!(
            validate_graph(&graph),
            Err(GraphError::MultipleIncoming { .. })
        ));
    }

    #[test]
    fn validate_graph_accepts_connected_graph() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool(&[], &[PortKind::Json]), None);
        let b = graph.add_tool(&tool(&[PortKind::Any], &[]), None);
        graph.connect(a, "output-0", b, "input-0").unwrap();
        assert_eq!(validate_graph(&graph), Ok(()));
    }
}
