//! Read-only catalog of tool definitions and workflow templates.
//!
//! Tools are owned by the directory, not by the wizard: nodes only hold a
//! `tool_id` reference. Templates pre-seed a wizard session and are never
//! mutated by it.

use serde::{Deserialize, Serialize};

use crate::{Difficulty, PortKind, Position, WizardPatch, WorkflowGraph};

/// Categories offered by the details step.
pub const CATEGORIES: [&str; 8] = [
    "Content Creation",
    "Data Analysis",
    "Marketing",
    "Productivity",
    "Research",
    "Customer Support",
    "Development",
    "Design",
];

/// Horizontal gap between template nodes laid out left to right.
const TEMPLATE_NODE_SPACING: f32 = 260.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub id: String,
    pub name: String,
    pub category: String,
    pub input_types: Vec<PortKind>,
    pub output_types: Vec<PortKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub tool_ids: Vec<String>,
}

impl WorkflowTemplate {
    /// Patch that starts a session from this template.
    ///
    /// Tools missing from `catalog` are skipped. Consecutive nodes are chained
    /// from the first output into the first input whenever the kinds allow it.
    pub fn seed(&self, catalog: &Catalog) -> WizardPatch {
        let mut graph = WorkflowGraph::default();
        let mut previous: Option<uuid::Uuid> = None;

        for (i, tool) in self
            .tool_ids
            .iter()
            .filter_map(|id| catalog.tool(id))
            .enumerate()
        {
            let position = Position::new(
                100.0 + i as f32 * TEMPLATE_NODE_SPACING,
                crate::DEFAULT_NODE_POSITION.y,
            );
            let id = graph.add_tool(tool, Some(position));

            if let Some(prev) = previous
                && let Err(e) = graph.connect(prev, "output-0", id, "input-0")
            {
                tracing::debug!(
                    template = %self.id,
                    tool = %tool.id,
                    "template step not chained: {}",
                    e
                );
            }
            previous = Some(id);
        }

        WizardPatch {
            selected_template: Some(Some(self.id.clone())),
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            category: Some(self.category.clone()),
            tags: Some(self.tags.clone()),
            difficulty: Some(self.difficulty),
            graph: Some(graph),
            ..Default::default()
        }
    }
}

/// Tools and templates available to the wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub tools: Vec<ToolDefinition>,
    pub templates: Vec<WorkflowTemplate>,
}

impl Catalog {
    pub fn tool(&self, id: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn template(&self, id: &str) -> Option<&WorkflowTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// The catalog shipped with the app.
    pub fn builtin() -> Self {
        use PortKind::*;

        let tool = |id: &str,
                    name: &str,
                    category: &str,
                    inputs: &[PortKind],
                    outputs: &[PortKind]| ToolDefinition {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            input_types: inputs.to_vec(),
            output_types: outputs.to_vec(),
        };
        let template = |id: &str,
                        name: &str,
                        description: &str,
                        category: &str,
                        tags: &[&str],
                        difficulty: Difficulty,
                        tool_ids: &[&str]| WorkflowTemplate {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            difficulty,
            tool_ids: tool_ids.iter().map(|t| t.to_string()).collect(),
        };

        Self {
            tools: vec![
                tool("web-scraper", "Web Scraper", "Research", &[Text], &[Text, Json]),
                tool("text-writer", "Text Writer", "Content Creation", &[Text, Json], &[Text]),
                tool("summarizer", "Summarizer", "Productivity", &[Text], &[Text]),
                tool("translator", "Translator", "Productivity", &[Text], &[Text]),
                tool("image-generator", "Image Generator", "Design", &[Text], &[Image]),
                tool("image-upscaler", "Image Upscaler", "Design", &[Image], &[Image]),
                tool("transcriber", "Transcriber", "Productivity", &[Audio], &[Text]),
                tool("voice-synth", "Voice Synthesizer", "Content Creation", &[Text], &[Audio]),
                tool("video-editor", "Video Editor", "Content Creation", &[Video, Audio], &[Video]),
                tool("sentiment", "Sentiment Analyzer", "Data Analysis", &[Text], &[Json, Number]),
                tool("chart-builder", "Chart Builder", "Data Analysis", &[Json], &[Image]),
                tool("webhook", "Webhook", "Development", &[Any], &[Json]),
                tool("file-reader", "File Reader", "Development", &[File], &[Text]),
            ],
            templates: vec![
                template(
                    "blog-pipeline",
                    "Blog Post Pipeline",
                    "Research a topic, draft a post, and generate a cover image.",
                    "Content Creation",
                    &["blog", "writing"],
                    Difficulty::Beginner,
                    &["web-scraper", "text-writer", "image-generator"],
                ),
                template(
                    "podcast-notes",
                    "Podcast Show Notes",
                    "Transcribe an episode and summarize it into show notes.",
                    "Productivity",
                    &["podcast", "audio"],
                    Difficulty::Beginner,
                    &["transcriber", "summarizer"],
                ),
                template(
                    "feedback-dashboard",
                    "Customer Feedback Dashboard",
                    "Score feedback sentiment and chart the results.",
                    "Data Analysis",
                    &["feedback", "analytics"],
                    Difficulty::Intermediate,
                    &["sentiment", "chart-builder"],
                ),
                template(
                    "localized-voiceover",
                    "Localized Voiceover",
                    "Translate a script and synthesize a voiceover.",
                    "Marketing",
                    &["localization", "voice"],
                    Difficulty::Advanced,
                    &["translator", "voice-synth"],
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_reference_known_tools() {
        let catalog = Catalog::builtin();
        for template in &catalog.templates {
            for id in &template.tool_ids {
                assert!(
                    catalog.tool(id).is_some(),
                    "template {} references unknown tool {}",
                    template.id,
                    id
                );
            }
            assert!(CATEGORIES.contains(&template.category.as_str()));
        }
    }

    #[test]
    fn seed_lays_out_and_chains_template_tools() {
        let catalog = Catalog::builtin();
        let template = catalog.template("blog-pipeline").unwrap();
        let patch = template.seed(&catalog);

        let graph = patch.graph.expect("graph seeded");
        assert_eq!(graph.nodes.len(), 3);
        // scraper(text) -> writer(text), writer(text) -> image generator(text)
        assert_eq!(graph.connections.len(), 2);
        assert!(graph.nodes[0].position.x < graph.nodes[1].position.x);
        assert_eq!(patch.name.as_deref(), Some("Blog Post Pipeline"));
        assert_eq!(
            patch.selected_template,
            Some(Some("blog-pipeline".to_string()))
        );
    }

    #[test]
    fn seed_skips_chain_for_incompatible_ports() {
        let catalog = Catalog::builtin();
        let template = WorkflowTemplate {
            id: "odd".to_string(),
            name: "Odd".to_string(),
            description: String::new(),
            category: "Design".to_string(),
            tags: vec![],
            difficulty: Difficulty::Beginner,
            tool_ids: vec!["image-generator".to_string(), "transcriber".to_string()],
        };
        let graph = template.seed(&catalog).graph.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.connections.is_empty());
    }

    #[test]
    fn seed_ignores_unknown_tools() {
        let catalog = Catalog::builtin();
        let template = WorkflowTemplate {
            id: "partial".to_string(),
            name: "Partial".to_string(),
            description: String::new(),
            category: "Research".to_string(),
            tags: vec![],
            difficulty: Difficulty::Beginner,
            tool_ids: vec!["missing".to_string(), "summarizer".to_string()],
        };
        let graph = template.seed(&catalog).graph.unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].tool_id, "summarizer");
    }
}
