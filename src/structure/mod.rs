//! Structure documents: definition tree and parser

pub mod parser;
pub mod spec;

pub use spec::{
    CheckpointSpec, GoalSpec, JourneySpec, ProjectSpec, StepKind, StepSpec,
    StructureDefinition,
};
