//! Transaction log
//!
//! Flat accumulator of every resource id created or adopted during a run,
//! appended to before the next remote call is attempted. Read only on the
//! failure path to print what already exists remotely - there is no
//! automated rollback; cleanup is left to the operator.

use std::fmt;

/// Kind of remote resource recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Goal,
    Journey,
    Checkpoint,
    Step,
}

/// Accumulator of identifiers from successful remote calls
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionLog {
    pub project_id: Option<i64>,
    pub goals: Vec<i64>,
    pub journeys: Vec<i64>,
    pub checkpoints: Vec<i64>,
    pub steps_created: usize,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successfully created or adopted resource
    pub fn record(&mut self, kind: ResourceKind, id: i64) {
        match kind {
            ResourceKind::Project => self.project_id = Some(id),
            ResourceKind::Goal => self.goals.push(id),
            ResourceKind::Journey => self.journeys.push(id),
            ResourceKind::Checkpoint => self.checkpoints.push(id),
            ResourceKind::Step => self.steps_created += 1,
        }
    }

    /// Whether anything was recorded
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.goals.is_empty()
            && self.journeys.is_empty()
            && self.checkpoints.is_empty()
            && self.steps_created == 0
    }

    /// Render the failure-path diagnostic, grouped by kind
    pub fn diagnostic(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TransactionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No resources were created before the failure.");
        }

        writeln!(f, "Resources created so far:")?;
        if let Some(id) = self.project_id {
            writeln!(f, "  Project ID: {id}")?;
        }
        if !self.goals.is_empty() {
            writeln!(f, "  Goal IDs: {:?}", self.goals)?;
        }
        if !self.journeys.is_empty() {
            writeln!(f, "  Journey IDs: {:?}", self.journeys)?;
        }
        if !self.checkpoints.is_empty() {
            writeln!(f, "  Checkpoint IDs: {:?}", self.checkpoints)?;
        }
        if self.steps_created > 0 {
            writeln!(f, "  Steps created: {}", self.steps_created)?;
        }
        writeln!(f, "Manual cleanup may be required.")
    }
}
