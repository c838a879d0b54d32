use serde::{Deserialize, Serialize};

use crate::WorkflowGraph;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportType {
    #[default]
    Blank,
    Template,
    AiGenerated,
    File,
}

impl ImportType {
    pub const ALL: [ImportType; 4] = [
        ImportType::Blank,
        ImportType::Template,
        ImportType::AiGenerated,
        ImportType::File,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ImportType::Blank => "Start from scratch",
            ImportType::Template => "Start from a template",
            ImportType::AiGenerated => "Describe it to the AI",
            ImportType::File => "Import a file",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    pub sample_input: String,
    pub timeout_seconds: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            sample_input: String::new(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishSettings {
    pub version: String,
    pub release_notes: String,
    pub publish_immediately: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            release_notes: String::new(),
            publish_immediately: true,
        }
    }
}

/// Everything the wizard accumulates before submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardData {
    pub import_type: ImportType,
    pub selected_template: Option<String>,
    pub ai_prompt: String,
    pub source_file: Option<String>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub allow_forking: bool,
    pub difficulty: Difficulty,
    #[serde(flatten)]
    pub graph: WorkflowGraph,
    pub test_config: TestConfig,
    pub publish: PublishSettings,
    pub terms_accepted: bool,
}

/// Partial update merged into [`WizardData`] one field at a time.
///
/// `None` leaves a field untouched. Optional fields take `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardPatch {
    pub import_type: Option<ImportType>,
    pub selected_template: Option<Option<String>>,
    pub ai_prompt: Option<String>,
    pub source_file: Option<Option<String>>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub allow_forking: Option<bool>,
    pub difficulty: Option<Difficulty>,
    pub graph: Option<WorkflowGraph>,
    pub test_config: Option<TestConfig>,
    pub publish: Option<PublishSettings>,
    pub terms_accepted: Option<bool>,
}

impl WizardPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl WizardData {
    /// Shallow merge: each field present in `patch` replaces the current value.
    pub fn merge(&mut self, patch: WizardPatch) {
        let WizardPatch {
            import_type,
            selected_template,
            ai_prompt,
            source_file,
            name,
            description,
            category,
            tags,
            is_public,
            allow_forking,
            difficulty,
            graph,
            test_config,
            publish,
            terms_accepted,
        } = patch;

        if let Some(v) = import_type {
            self.import_type = v;
        }
        if let Some(v) = selected_template {
            self.selected_template = v;
        }
        if let Some(v) = ai_prompt {
            self.ai_prompt = v;
        }
        if let Some(v) = source_file {
            self.source_file = v;
        }
        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = tags {
            self.tags = v;
        }
        if let Some(v) = is_public {
            self.is_public = v;
        }
        if let Some(v) = allow_forking {
            self.allow_forking = v;
        }
        if let Some(v) = difficulty {
            self.difficulty = v;
        }
        if let Some(v) = graph {
            self.graph = v;
        }
        if let Some(v) = test_config {
            self.test_config = v;
        }
        if let Some(v) = publish {
            self.publish = v;
        }
        if let Some(v) = terms_accepted {
            self.terms_accepted = v;
        }
    }
}

/// Split a comma separated tag field, dropping blanks and duplicates.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(|t| t.trim().to_lowercase()) {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// On-disk shape of an exported workflow, accepted by the "import a file" source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExport {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub graph: WorkflowGraph,
}

impl WorkflowExport {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Patch that fills the session from this export; blank metadata is left alone.
    pub fn into_patch(self, source: impl Into<String>) -> WizardPatch {
        let non_empty = |s: String| (!s.trim().is_empty()).then_some(s);
        WizardPatch {
            source_file: Some(Some(source.into())),
            name: non_empty(self.name),
            description: non_empty(self.description),
            category: non_empty(self.category),
            tags: (!self.tags.is_empty()).then_some(self.tags),
            graph: Some(self.graph),
            ..Default::default()
        }
    }
}
