//! Result reporting
//!
//! Renders the created-resources tree in the caller's requested format.
//! Format selection never alters orchestration behavior - this module only
//! ever sees a finished run.

use std::str::FromStr;

use clap::ValueEnum;
use colored::Colorize;

use crate::common::Result;
use crate::orchestrator::CreatedResources;
use crate::structure::StructureDefinition;

/// Output format for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Human,
    /// Pretty-printed JSON of the full resource tree
    Json,
    /// YAML of the full resource tree
    Yaml,
    /// Conversational narrative for AI agents
    Ai,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            "ai" => Ok(Self::Ai),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Render a finished run in the requested format
pub fn render(
    resources: &CreatedResources,
    def: &StructureDefinition,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(resources)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(resources)?),
        OutputFormat::Human => Ok(render_human(resources, def)),
        OutputFormat::Ai => Ok(render_ai(resources, def)),
    }
}

fn journey_count(resources: &CreatedResources) -> usize {
    resources.goals.iter().map(|g| g.journeys.len()).sum()
}

fn checkpoint_count(resources: &CreatedResources) -> usize {
    resources
        .goals
        .iter()
        .flat_map(|g| &g.journeys)
        .map(|j| j.checkpoints.len())
        .sum()
}

fn render_human(resources: &CreatedResources, def: &StructureDefinition) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Created test structure successfully!".green().bold());
    let _ = writeln!(out);

    if def.project.uses_existing() {
        let _ = writeln!(out, "Using existing project ID: {}", resources.project_id);
    } else {
        let _ = writeln!(
            out,
            "Project: {} (ID: {})",
            def.project.name.bold(),
            resources.project_id
        );
    }

    let _ = writeln!(out, "\nSummary:");
    let _ = writeln!(out, "  Goals created: {}", resources.goals.len());
    let _ = writeln!(out, "  Journeys: {}", journey_count(resources));
    let _ = writeln!(out, "  Checkpoints: {}", checkpoint_count(resources));
    let _ = writeln!(out, "  Steps created: {}", resources.total_steps);

    out
}

fn render_ai(resources: &CreatedResources, def: &StructureDefinition) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Successfully created test structure.\n");
    let _ = writeln!(
        out,
        "Project: {} (ID: {})",
        def.project.name, resources.project_id
    );
    let _ = writeln!(out, "\nResource summary:");
    let _ = writeln!(out, "- Goals created: {}", resources.goals.len());
    let _ = writeln!(
        out,
        "- Journeys: {} (including renamed auto-created ones)",
        journey_count(resources)
    );
    let _ = writeln!(
        out,
        "- Checkpoints: {} (including adopted navigation checkpoints)",
        checkpoint_count(resources)
    );
    let _ = writeln!(out, "- Total steps: {}", resources.total_steps);

    let _ = writeln!(out, "\nNotes:");
    let _ = writeln!(
        out,
        "- The first journey of each goal was auto-created by the service and adopted"
    );
    let _ = writeln!(
        out,
        "- The first checkpoint of each goal holds the shared navigation step"
    );
    let _ = writeln!(out, "\nNext steps:");
    let _ = writeln!(out, "1. Review the structure in the service UI");
    let _ = writeln!(out, "2. Run the test journeys");
    let _ = writeln!(out, "3. Extend the structure file with more tests");

    out
}
