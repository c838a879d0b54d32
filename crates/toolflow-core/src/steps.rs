use serde::{Deserialize, Serialize};
use std::fmt;

/// Which record the wizard produces. Each variant keeps its own draft slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardVariant {
    Workflow,
    ToolSubmission,
}

impl WizardVariant {
    pub fn display_name(&self) -> &'static str {
        match self {
            WizardVariant::Workflow => "Create Workflow",
            WizardVariant::ToolSubmission => "Submit a Tool",
        }
    }

    /// Stable slug used in storage keys and table routing.
    pub fn slug(&self) -> &'static str {
        match self {
            WizardVariant::Workflow => "workflow",
            WizardVariant::ToolSubmission => "tool-submission",
        }
    }
}

impl fmt::Display for WizardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// The four wizard steps, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Source,
    Build,
    Details,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Source,
        WizardStep::Build,
        WizardStep::Details,
        WizardStep::Review,
    ];

    pub const FIRST: WizardStep = WizardStep::Source;
    pub const LAST: WizardStep = WizardStep::Review;

    /// 1-based step number.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Source => 1,
            WizardStep::Build => 2,
            WizardStep::Details => 3,
            WizardStep::Review => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(WizardStep::Source),
            2 => Some(WizardStep::Build),
            3 => Some(WizardStep::Details),
            4 => Some(WizardStep::Review),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Source => "Choose a starting point",
            WizardStep::Build => "Build the workflow",
            WizardStep::Details => "Describe it",
            WizardStep::Review => "Review & publish",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WizardStep::Source => "Start blank, from a template, from a prompt, or from a file.",
            WizardStep::Build => "Add tools and connect their inputs and outputs.",
            WizardStep::Details => "Name, description, category and visibility.",
            WizardStep::Review => "Check everything, configure a test run, then publish.",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number().saturating_sub(1))
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    /// Completed fraction when this step is active, for progress bars.
    pub fn progress(self) -> f32 {
        f32::from(self.number()) / Self::ALL.len() as f32
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip_and_are_ordered() {
        for (i, step) in WizardStep::ALL.iter().enumerate() {
            assert_eq!(step.number() as usize, i + 1);
            assert_eq!(WizardStep::from_number(step.number()), Some(*step));
        }
        assert!(WizardStep::Source < WizardStep::Review);
    }

    #[test]
    fn from_number_is_bounds_checked() {
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(5), None);
    }

    #[test]
    fn next_and_previous_stop_at_the_ends() {
        assert_eq!(WizardStep::Source.previous(), None);
        assert_eq!(WizardStep::Source.next(), Some(WizardStep::Build));
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::Review.previous(), Some(WizardStep::Details));
    }

    #[test]
    fn progress_reaches_one_on_last_step() {
        assert_eq!(WizardStep::Source.progress(), 0.25);
        assert_eq!(WizardStep::Review.progress(), 1.0);
    }

    #[test]
    fn variants_have_distinct_slugs() {
        assert_ne!(
            WizardVariant::Workflow.slug(),
            WizardVariant::ToolSubmission.slug()
        );
    }
}
