//! CLI command handling
//!
//! Wires parsed commands to the parser, orchestrator and reporter.

use std::path::Path;

use crate::client::HttpClient;
use crate::commands::Commands;
use crate::common::{Config, Error, Result};
use crate::orchestrator::{preview, Orchestrator};
use crate::report::{self, OutputFormat};
use crate::structure::{parser, StructureDefinition};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Create {
            file,
            dry_run,
            verbose,
            project_id,
            format,
        } => {
            let config = Config::load()?;
            let def = load_structure(&file, project_id)?;

            if dry_run {
                let report = preview(&def);
                println!("{}", report.render(verbose || config.output.verbose));
                return Ok(());
            }

            let client = HttpClient::new(&config)?;
            let mut orchestrator =
                Orchestrator::new(&client).with_verbose(verbose || config.output.verbose);

            let resources = match orchestrator.run(&def).await {
                Ok(resources) => resources,
                Err(e) => {
                    // Nothing is rolled back; tell the operator what the
                    // failed run left behind.
                    eprintln!("{}", orchestrator.log().diagnostic());
                    return Err(e);
                }
            };

            let format = resolve_format(format, &config)?;
            println!("{}", report::render(&resources, &def, format)?);

            Ok(())
        }

        Commands::Validate { file } => {
            let def = load_structure(&file, None)?;
            println!("Structure file is valid.");
            println!("  Goals: {}", def.goals.len());
            println!("  Journeys: {}", def.journey_count());
            println!("  Checkpoints: {}", def.checkpoint_count());
            println!("  Steps: {}", def.step_count());
            Ok(())
        }

        Commands::Ping => {
            let config = Config::load()?;
            let client = HttpClient::new(&config)?;
            let elapsed = client.ping().await?;
            println!(
                "API is reachable at {} ({} ms)",
                config.api.base_url,
                elapsed.as_millis()
            );
            Ok(())
        }
    }
}

/// Read, decode and validate a structure file
///
/// A `--project-id` override is applied before validation so a structure
/// without a project name still validates against an existing project.
fn load_structure(file: &Path, project_id: Option<i64>) -> Result<StructureDefinition> {
    let data = std::fs::read(file).map_err(|e| Error::file_read(file, e))?;

    let mut def = parser::decode(&data)?;
    if let Some(id) = project_id {
        def.project.id = Some(id);
    }
    parser::validate(&def)?;

    Ok(def)
}

/// CLI flag wins over the configured default format
fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(format) => Ok(format),
        None => config
            .output
            .default_format
            .parse()
            .map_err(Error::Config),
    }
}
