//! Dry-run preview
//!
//! Walks the definition tree without any remote calls, annotating each node
//! with the same adopt-vs-create decision the orchestrator would make. This
//! is the only pre-flight visibility the caller has, so the decisions come
//! from the shared policy functions rather than being re-derived here.

use serde::Serialize;

use crate::structure::{StepSpec, StructureDefinition};

use super::policy::{self, Decision};

/// What a real run would do for one structure definition
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub project: ProjectPlan,
    pub goals: Vec<GoalPlan>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ProjectPlan {
    UseExisting { id: i64 },
    Create { name: String, description: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalPlan {
    pub name: String,
    pub url: String,
    pub journeys: Vec<JourneyPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyPlan {
    pub name: String,
    pub decision: Decision,
    pub checkpoints: Vec<CheckpointPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckpointPlan {
    pub name: String,
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_url: Option<String>,
    pub steps: Vec<StepSpec>,
}

/// Aggregate counts over the whole structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub goals: usize,
    pub journeys: usize,
    pub checkpoints: usize,
    pub steps: usize,
}

/// Compute the plan for a structure definition without remote calls
///
/// The journey decision assumes the documented auto-creation side effect:
/// every goal arrives with exactly one pre-existing journey.
pub fn preview(def: &StructureDefinition) -> PreviewReport {
    let project = match def.project.id.filter(|id| *id > 0) {
        Some(id) => ProjectPlan::UseExisting { id },
        None => ProjectPlan::Create {
            name: def.project.name.clone(),
            description: def.project.description.clone(),
        },
    };

    let goals = def
        .goals
        .iter()
        .map(|goal| GoalPlan {
            name: goal.name.clone(),
            url: goal.url.clone(),
            journeys: goal
                .journeys
                .iter()
                .enumerate()
                .map(|(j, journey)| JourneyPlan {
                    name: journey.name.clone(),
                    decision: policy::journey_decision(j, 1),
                    checkpoints: journey
                        .checkpoints
                        .iter()
                        .enumerate()
                        .map(|(k, checkpoint)| CheckpointPlan {
                            name: checkpoint.name.clone(),
                            decision: policy::checkpoint_decision(j, k),
                            navigation_url: checkpoint.navigation_url.clone(),
                            steps: checkpoint.steps.clone(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect::<Vec<GoalPlan>>();

    // Adopted checkpoints with a navigation URL gain one navigate step on
    // top of their declared ones, so the step total comes from the plan
    // rather than from the raw definition.
    let steps = goals
        .iter()
        .flat_map(|goal| &goal.journeys)
        .flat_map(|journey| &journey.checkpoints)
        .map(|checkpoint| {
            let navigate = matches!(checkpoint.decision, Decision::Adopt)
                && checkpoint.navigation_url.is_some();
            checkpoint.steps.len() + usize::from(navigate)
        })
        .sum();

    PreviewReport {
        project,
        goals,
        totals: Totals {
            goals: def.goals.len(),
            journeys: def.journey_count(),
            checkpoints: def.checkpoint_count(),
            steps,
        },
    }
}

impl PreviewReport {
    /// Render the plan as human-readable text
    pub fn render(&self, verbose: bool) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "Preview mode - nothing will be created\n");

        match &self.project {
            ProjectPlan::UseExisting { id } => {
                let _ = writeln!(out, "Using existing project ID: {id}");
            }
            ProjectPlan::Create { name, description } => {
                let _ = writeln!(out, "Project: {name}");
                if !description.is_empty() {
                    let _ = writeln!(out, "  Description: {description}");
                }
            }
        }

        let _ = writeln!(out, "\nGoals: {}", self.goals.len());
        for (i, goal) in self.goals.iter().enumerate() {
            let _ = writeln!(out, "\n  Goal {}: {}", i + 1, goal.name);
            let _ = writeln!(out, "    URL: {}", goal.url);

            for (j, journey) in goal.journeys.iter().enumerate() {
                match journey.decision {
                    Decision::Adopt => {
                        let _ = writeln!(
                            out,
                            "    Journey {}: {} (will rename auto-created journey)",
                            j + 1,
                            journey.name
                        );
                    }
                    Decision::Create => {
                        let _ = writeln!(out, "    Journey {}: {}", j + 1, journey.name);
                    }
                }

                for (k, checkpoint) in journey.checkpoints.iter().enumerate() {
                    match checkpoint.decision {
                        Decision::Adopt => {
                            let _ = writeln!(
                                out,
                                "      Checkpoint {}: {} (will update existing navigation checkpoint)",
                                k + 1,
                                checkpoint.name
                            );
                            if let Some(url) = &checkpoint.navigation_url {
                                let _ = writeln!(out, "        Navigation URL: {url}");
                            }
                        }
                        Decision::Create => {
                            let _ = writeln!(
                                out,
                                "      Checkpoint {}: {}",
                                k + 1,
                                checkpoint.name
                            );
                        }
                    }

                    if verbose && !checkpoint.steps.is_empty() {
                        let _ = writeln!(out, "        Steps:");
                        for step in &checkpoint.steps {
                            let mut line = format!("          - {}", step.kind);
                            if let Some(selector) = &step.selector {
                                line.push_str(&format!(" (selector: {selector})"));
                            }
                            if let Some(value) = &step.value {
                                line.push_str(&format!(" (value: {value})"));
                            }
                            let _ = writeln!(out, "{line}");
                        }
                    }
                }
            }
        }

        let _ = writeln!(out, "\nTotals:");
        let _ = writeln!(out, "  Goals: {}", self.totals.goals);
        let _ = writeln!(out, "  Journeys: {}", self.totals.journeys);
        let _ = writeln!(out, "  Checkpoints: {}", self.totals.checkpoints);
        let _ = writeln!(out, "  Steps: {}", self.totals.steps);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::parser;

    fn checkout_def() -> StructureDefinition {
        parser::parse(
            br##"{
                "project": {"name": "Shop"},
                "goals": [{
                    "name": "Checkout",
                    "url": "https://shop.test",
                    "journeys": [{
                        "name": "Happy Path",
                        "checkpoints": [
                            {"name": "Navigate", "navigation_url": "https://shop.test"},
                            {"name": "Pay", "steps": [{"type": "click", "selector": "#pay"}]}
                        ]
                    }]
                }]
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn test_preview_annotates_adoption() {
        let report = preview(&checkout_def());
        let journey = &report.goals[0].journeys[0];
        assert_eq!(journey.decision, Decision::Adopt);
        assert_eq!(journey.checkpoints[0].decision, Decision::Adopt);
        assert_eq!(journey.checkpoints[1].decision, Decision::Create);
    }

    #[test]
    fn test_preview_totals() {
        let report = preview(&checkout_def());
        assert_eq!(report.totals.goals, 1);
        assert_eq!(report.totals.journeys, 1);
        assert_eq!(report.totals.checkpoints, 2);
        // one declared click step plus the navigate step the adopted
        // checkpoint picks up for its navigation URL
        assert_eq!(report.totals.steps, 2);
    }

    #[test]
    fn test_navigation_url_on_created_checkpoint_adds_no_step() {
        let def = parser::parse(
            br##"{
                "project": {"name": "Shop"},
                "goals": [{
                    "name": "Checkout",
                    "url": "https://shop.test",
                    "journeys": [{
                        "name": "Happy Path",
                        "checkpoints": [
                            {"name": "Navigate"},
                            {"name": "Pay", "navigation_url": "https://shop.test/pay",
                             "steps": [{"type": "click", "selector": "#pay"}]}
                        ]
                    }]
                }]
            }"##,
        )
        .unwrap();
        let report = preview(&def);
        // only adopted checkpoints get the extra navigate step
        assert_eq!(report.totals.steps, 1);
    }

    #[test]
    fn test_render_mentions_reuse() {
        let report = preview(&checkout_def());
        let text = report.render(true);
        assert!(text.contains("rename auto-created journey"));
        assert!(text.contains("update existing navigation checkpoint"));
        assert!(text.contains("- click (selector: #pay)"));
    }

    #[test]
    fn test_existing_project_previewed_as_reuse() {
        let def = parser::parse(
            br#"{"project": {"id": 9}, "goals": [{"name": "G"}]}"#,
        )
        .unwrap();
        let report = preview(&def);
        assert!(matches!(report.project, ProjectPlan::UseExisting { id: 9 }));
    }
}
