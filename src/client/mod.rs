//! Remote resource client
//!
//! Per-resource-kind operations against the remote test-automation service.
//! The orchestrator only depends on the [`ResourceClient`] trait; the HTTP
//! implementation lives in [`http`].

pub mod http;

use async_trait::async_trait;
use serde::Deserialize;

use crate::common::Result;

pub use http::HttpClient;

/// A remote project
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A remote goal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// A remote journey
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub id: i64,
    #[serde(default)]
    pub goal_id: i64,
    #[serde(default)]
    pub snapshot_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
}

/// A remote checkpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub position: i32,
}

/// Operations the orchestrator needs from the remote service
///
/// All operations are synchronous request/response; any failure is opaque
/// beyond the operation name and a message. One step-creation operation
/// exists per step type.
#[async_trait]
pub trait ResourceClient {
    async fn create_project(&self, name: &str, description: &str) -> Result<Project>;

    /// Create a goal; the service auto-creates its first journey and, inside
    /// it, a first checkpoint holding a navigation step
    async fn create_goal(&self, project_id: i64, name: &str, url: &str) -> Result<Goal>;

    /// Fetch the current snapshot id of a goal, required by all journey and
    /// checkpoint operations
    async fn goal_snapshot(&self, goal_id: i64) -> Result<i64>;

    /// List journeys for a goal, ordered so the auto-created journey is first
    async fn list_journeys(&self, goal_id: i64, snapshot_id: i64) -> Result<Vec<Journey>>;

    async fn create_journey(&self, goal_id: i64, snapshot_id: i64, name: &str)
        -> Result<Journey>;

    async fn rename_journey(&self, journey_id: i64, name: &str) -> Result<Journey>;

    /// Fetch the auto-created first checkpoint of a journey
    async fn first_checkpoint(&self, journey_id: i64) -> Result<Checkpoint>;

    async fn create_checkpoint(
        &self,
        goal_id: i64,
        snapshot_id: i64,
        title: &str,
    ) -> Result<Checkpoint>;

    async fn attach_checkpoint(
        &self,
        journey_id: i64,
        checkpoint_id: i64,
        position: i32,
    ) -> Result<()>;

    async fn add_navigate_step(&self, checkpoint_id: i64, url: &str) -> Result<i64>;

    async fn add_click_step(&self, checkpoint_id: i64, selector: &str) -> Result<i64>;

    async fn add_wait_step(
        &self,
        checkpoint_id: i64,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<i64>;

    async fn add_fill_step(&self, checkpoint_id: i64, selector: &str, value: &str)
        -> Result<i64>;
}
