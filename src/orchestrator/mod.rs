//! Reconciliation orchestrator
//!
//! Walks a structure definition top to bottom and materializes it remotely
//! with the minimum number of creations, adopting the resources the remote
//! service auto-creates as a side effect of goal creation: one initial
//! journey per goal and one navigation checkpoint inside it.
//!
//! The run is strictly sequential - every remote call's result feeds the
//! next one (project id -> goal id -> snapshot id -> journey id ->
//! checkpoint id). Any failure aborts immediately; the transaction log then
//! holds everything created up to that point.

pub mod log;
pub mod policy;
pub mod preview;

use serde::Serialize;

use crate::client::{Goal, ResourceClient};
use crate::common::{Error, Result};
use crate::structure::{CheckpointSpec, StepKind, StepSpec, StructureDefinition};

pub use log::{ResourceKind, TransactionLog};
pub use policy::Decision;
pub use preview::{preview, PreviewReport};

/// Wait steps without an explicit timeout wait this long
const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Remote identifiers of everything a run produced, isomorphic to the input
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResources {
    pub project_id: i64,
    pub goals: Vec<CreatedGoal>,
    pub total_steps: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedGoal {
    pub id: i64,
    pub name: String,
    pub snapshot_id: i64,
    pub journeys: Vec<CreatedJourney>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedJourney {
    pub id: i64,
    pub name: String,
    pub checkpoints: Vec<CreatedCheckpoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedCheckpoint {
    pub id: i64,
    pub name: String,
    pub step_count: usize,
}

/// Materializes structure definitions against a remote resource client
pub struct Orchestrator<'a, C: ResourceClient> {
    client: &'a C,
    log: TransactionLog,
    verbose: bool,
}

impl<'a, C: ResourceClient> Orchestrator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            log: TransactionLog::new(),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Identifiers recorded so far; consult after a failed run
    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    /// Materialize the whole structure
    ///
    /// On error the run stops at the failing call; everything created before
    /// it stays remote and is listed in [`Orchestrator::log`].
    pub async fn run(&mut self, def: &StructureDefinition) -> Result<CreatedResources> {
        let project_id = self.resolve_project(def).await?;

        let mut resources = CreatedResources {
            project_id,
            goals: Vec::with_capacity(def.goals.len()),
            total_steps: 0,
        };

        for goal_def in &def.goals {
            tracing::info!(goal = %goal_def.name, "creating goal");
            let goal = self
                .client
                .create_goal(project_id, &goal_def.name, &goal_def.url)
                .await
                .map_err(|e| in_context(e, &format!("goal '{}'", goal_def.name)))?;
            self.log.record(ResourceKind::Goal, goal.id);

            let snapshot_id = self
                .client
                .goal_snapshot(goal.id)
                .await
                .map_err(|e| in_context(e, &format!("goal {}", goal.id)))?;

            let mut created_goal = CreatedGoal {
                id: goal.id,
                name: goal.name.clone(),
                snapshot_id,
                journeys: Vec::with_capacity(goal_def.journeys.len()),
            };

            // Goal creation auto-created one journey; find it so index 0 can
            // adopt it instead of duplicating it.
            let existing = self
                .client
                .list_journeys(goal.id, snapshot_id)
                .await
                .map_err(|e| in_context(e, &format!("goal {}", goal.id)))?;
            if self.verbose {
                tracing::info!(count = existing.len(), "found pre-existing journeys");
            }

            for (journey_idx, journey_def) in goal_def.journeys.iter().enumerate() {
                let decision = policy::journey_decision(journey_idx, existing.len());

                let mut journey = match decision {
                    Decision::Adopt => {
                        let adopted = existing[0].clone();
                        tracing::info!(
                            journey = %adopted.name,
                            id = adopted.id,
                            "adopting auto-created journey"
                        );
                        adopted
                    }
                    Decision::Create => {
                        tracing::info!(journey = %journey_def.name, "creating journey");
                        self.client
                            .create_journey(goal.id, snapshot_id, &journey_def.name)
                            .await
                            .map_err(|e| {
                                in_context(e, &format!("journey '{}'", journey_def.name))
                            })?
                    }
                };
                self.log.record(ResourceKind::Journey, journey.id);

                // Align the remote name with the declared one. A failed
                // rename is not fatal - the journey still works as a
                // container under its auto-assigned name.
                if journey.name != journey_def.name {
                    match self
                        .client
                        .rename_journey(journey.id, &journey_def.name)
                        .await
                    {
                        Ok(renamed) => journey = renamed,
                        Err(e) => {
                            tracing::warn!(
                                journey = journey.id,
                                error = %e,
                                "failed to rename journey, keeping remote name"
                            );
                        }
                    }
                }

                let mut created_journey = CreatedJourney {
                    id: journey.id,
                    name: journey.name.clone(),
                    checkpoints: Vec::with_capacity(journey_def.checkpoints.len()),
                };

                for (checkpoint_idx, checkpoint_def) in
                    journey_def.checkpoints.iter().enumerate()
                {
                    let created_checkpoint = self
                        .materialize_checkpoint(
                            &goal,
                            snapshot_id,
                            journey.id,
                            journey_idx,
                            checkpoint_idx,
                            checkpoint_def,
                            &mut resources.total_steps,
                        )
                        .await?;
                    created_journey.checkpoints.push(created_checkpoint);
                }

                created_goal.journeys.push(created_journey);
            }

            resources.goals.push(created_goal);
        }

        Ok(resources)
    }

    /// Adopt the declared project or create a new one
    async fn resolve_project(&mut self, def: &StructureDefinition) -> Result<i64> {
        if let Some(id) = def.project.id.filter(|id| *id > 0) {
            tracing::info!(project = id, "using existing project");
            self.log.record(ResourceKind::Project, id);
            return Ok(id);
        }

        tracing::info!(project = %def.project.name, "creating project");
        let project = self
            .client
            .create_project(&def.project.name, &def.project.description)
            .await?;
        self.log.record(ResourceKind::Project, project.id);
        Ok(project.id)
    }

    #[allow(clippy::too_many_arguments)]
    async fn materialize_checkpoint(
        &mut self,
        goal: &Goal,
        snapshot_id: i64,
        journey_id: i64,
        journey_idx: usize,
        checkpoint_idx: usize,
        checkpoint_def: &CheckpointSpec,
        total_steps: &mut usize,
    ) -> Result<CreatedCheckpoint> {
        match policy::checkpoint_decision(journey_idx, checkpoint_idx) {
            Decision::Adopt => {
                // The journey's first checkpoint already exists with a
                // navigation step; creating another here would leave an
                // orphaned duplicate.
                tracing::info!(
                    checkpoint = %checkpoint_def.name,
                    "adopting navigation checkpoint"
                );
                let first = self
                    .client
                    .first_checkpoint(journey_id)
                    .await
                    .map_err(|e| in_context(e, &format!("journey {journey_id}")))?;
                self.log.record(ResourceKind::Checkpoint, first.id);

                // The API has no direct way to retarget the existing
                // navigation step, so the declared URL goes in as an
                // additional navigate step.
                let mut step_count = 0;
                if let Some(url) = &checkpoint_def.navigation_url {
                    if self.verbose {
                        tracing::info!(url = %url, "setting navigation target");
                    }
                    let step_id = self
                        .client
                        .add_navigate_step(first.id, url)
                        .await
                        .map_err(|e| in_context(e, &format!("checkpoint {}", first.id)))?;
                    self.log.record(ResourceKind::Step, step_id);
                    step_count += 1;
                    *total_steps += 1;
                }

                for step_def in &checkpoint_def.steps {
                    self.add_step(first.id, step_def).await?;
                    step_count += 1;
                    *total_steps += 1;
                }

                Ok(CreatedCheckpoint {
                    id: first.id,
                    name: checkpoint_def.name.clone(),
                    step_count,
                })
            }
            Decision::Create => {
                tracing::info!(checkpoint = %checkpoint_def.name, "creating checkpoint");
                let checkpoint = self
                    .client
                    .create_checkpoint(goal.id, snapshot_id, &checkpoint_def.name)
                    .await
                    .map_err(|e| {
                        in_context(e, &format!("checkpoint '{}'", checkpoint_def.name))
                    })?;
                self.log.record(ResourceKind::Checkpoint, checkpoint.id);

                let position = policy::attach_position(journey_idx, checkpoint_idx);
                self.client
                    .attach_checkpoint(journey_id, checkpoint.id, position)
                    .await
                    .map_err(|e| {
                        in_context(
                            e,
                            &format!(
                                "checkpoint {} in journey {journey_id}",
                                checkpoint.id
                            ),
                        )
                    })?;

                for step_def in &checkpoint_def.steps {
                    self.add_step(checkpoint.id, step_def).await?;
                    *total_steps += 1;
                }

                let name = if checkpoint.title.is_empty() {
                    checkpoint_def.name.clone()
                } else {
                    checkpoint.title.clone()
                };

                Ok(CreatedCheckpoint {
                    id: checkpoint.id,
                    name,
                    step_count: checkpoint_def.steps.len(),
                })
            }
        }
    }

    /// Dispatch one declared step to the matching client operation
    async fn add_step(&mut self, checkpoint_id: i64, step: &StepSpec) -> Result<()> {
        if self.verbose {
            tracing::info!(kind = %step.kind, checkpoint = checkpoint_id, "adding step");
        }

        let selector = step.selector.as_deref().unwrap_or_default();
        let step_id = match step.kind {
            StepKind::Navigate => {
                let url = step.url.as_deref().unwrap_or_default();
                self.client.add_navigate_step(checkpoint_id, url).await
            }
            StepKind::Click => self.client.add_click_step(checkpoint_id, selector).await,
            StepKind::Wait => {
                let timeout = step.timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS);
                self.client
                    .add_wait_step(checkpoint_id, selector, timeout)
                    .await
            }
            StepKind::Fill => {
                let value = step.value.as_deref().unwrap_or_default();
                self.client
                    .add_fill_step(checkpoint_id, selector, value)
                    .await
            }
        }
        .map_err(|e| {
            in_context(
                e,
                &format!("{} step in checkpoint {checkpoint_id}", step.kind),
            )
        })?;

        self.log.record(ResourceKind::Step, step_id);
        Ok(())
    }
}

/// Attach parent-resource context to a remote call error
fn in_context(err: Error, context: &str) -> Error {
    match err {
        Error::RemoteCall { operation, message } => Error::RemoteCall {
            operation,
            message: format!("{message} ({context})"),
        },
        other => other,
    }
}
