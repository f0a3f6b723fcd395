//! CLI command definitions
//!
//! Defines the clap commands for the testweaver CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::report::OutputFormat;

#[derive(Subcommand)]
pub enum Commands {
    /// Create a complete test structure from a YAML or JSON file
    ///
    /// Reads a structure definition and creates every resource in order:
    /// project -> goals -> journeys -> checkpoints -> steps, reusing the
    /// journey and navigation checkpoint the service auto-creates per goal.
    Create {
        /// Structure definition file (YAML or JSON)
        #[arg(long, short = 'f')]
        file: PathBuf,

        /// Preview what would be created without creating anything
        #[arg(long)]
        dry_run: bool,

        /// Enable verbose logging of each operation
        #[arg(long)]
        verbose: bool,

        /// Use an existing project ID instead of creating a new project
        #[arg(long)]
        project_id: Option<i64>,

        /// Output format (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Parse and validate a structure file without any remote calls
    Validate {
        /// Structure definition file (YAML or JSON)
        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    /// Check connectivity and authentication against the remote API
    Ping,
}
