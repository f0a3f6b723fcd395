//! Structure definition tree
//!
//! The in-memory form of a structure file: project -> goals -> journeys ->
//! checkpoints -> steps. Built once by the parser and read-only afterwards.

use serde::{Deserialize, Serialize};

/// Root of a structure document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDefinition {
    pub project: ProjectSpec,
    #[serde(default)]
    pub goals: Vec<GoalSpec>,
}

/// Project to create, or an existing one to reuse when `id` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ProjectSpec {
    /// Whether the project refers to an existing remote resource
    pub fn uses_existing(&self) -> bool {
        self.id.is_some_and(|id| id > 0)
    }
}

/// A named test target; creating one remotely auto-creates its first journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub journeys: Vec<JourneySpec>,
}

/// An ordered sequence of checkpoints forming one test path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneySpec {
    pub name: String,
    #[serde(default)]
    pub checkpoints: Vec<CheckpointSpec>,
}

/// A named group of steps within a journey
///
/// `navigation_url` only applies to the first checkpoint of the first
/// journey of a goal, which is auto-created remotely with a navigation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_url: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// A single atomic action within a checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Closed set of supported step types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Navigate,
    Click,
    Wait,
    Fill,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepKind::Navigate => "navigate",
            StepKind::Click => "click",
            StepKind::Wait => "wait",
            StepKind::Fill => "fill",
        };
        f.write_str(name)
    }
}

impl StructureDefinition {
    /// Total number of journeys declared across all goals
    pub fn journey_count(&self) -> usize {
        self.goals.iter().map(|g| g.journeys.len()).sum()
    }

    /// Total number of checkpoints declared across all goals
    pub fn checkpoint_count(&self) -> usize {
        self.goals
            .iter()
            .flat_map(|g| &g.journeys)
            .map(|j| j.checkpoints.len())
            .sum()
    }

    /// Total number of steps declared across all checkpoints
    pub fn step_count(&self) -> usize {
        self.goals
            .iter()
            .flat_map(|g| &g.journeys)
            .flat_map(|j| &j.checkpoints)
            .map(|c| c.steps.len())
            .sum()
    }
}
