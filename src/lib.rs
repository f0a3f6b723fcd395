//! testweaver - materialize declarative test-suite structures
//!
//! Takes a hierarchical structure file (project -> goals -> journeys ->
//! checkpoints -> steps) and creates the corresponding resources on a remote
//! test-automation service, adopting the journey and navigation checkpoint
//! the service auto-creates as a side effect of goal creation.

pub mod cli;
pub mod client;
pub mod commands;
pub mod common;
pub mod orchestrator;
pub mod report;
pub mod structure;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use orchestrator::{CreatedResources, Orchestrator, TransactionLog};
pub use structure::StructureDefinition;
