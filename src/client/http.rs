//! HTTP implementation of the resource client
//!
//! Talks to the remote service's REST API. Responses arrive in a
//! `{success, item/map, error}` envelope; every operation checks both the
//! HTTP status and the envelope's success flag.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::common::{Config, Error, Result};

use super::{Checkpoint, Goal, Journey, Project, ResourceClient};

/// Appending at the end without querying existing steps first
const APPEND_STEP_INDEX: i64 = 999;

/// HTTP client for the remote test-automation API
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    organization_id: i64,
}

#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    item: Option<T>,
    #[serde(default)]
    error: Option<Value>,
}

impl<T> Envelope<T> {
    fn error_message(&self) -> Option<String> {
        match &self.error {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

impl HttpClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !config.api.auth_token.is_empty() {
            let value = format!("Bearer {}", config.api.auth_token);
            let mut value = HeaderValue::from_str(&value)
                .map_err(|e| Error::Config(format!("invalid auth token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            organization_id: config.organization.id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and decode the response envelope
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        tracing::debug!(operation, "issuing API request");

        let response = request
            .send()
            .await
            .map_err(|e| Error::remote_call(operation, e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::remote_call(operation, e.to_string()))?;

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|_| {
            Error::remote_call(
                operation,
                format!("unexpected response (status {status}): {body}"),
            )
        })?;

        if !status.is_success() {
            let message = envelope
                .error_message()
                .unwrap_or_else(|| format!("status {status}: {body}"));
            return Err(Error::remote_call(operation, message));
        }

        if !envelope.success {
            let message = envelope
                .error_message()
                .unwrap_or_else(|| "API returned success=false".to_string());
            return Err(Error::remote_call(operation, message));
        }

        envelope
            .item
            .ok_or_else(|| Error::remote_call(operation, "response had no item"))
    }

    /// Append a step to a checkpoint; the wire payload varies per step type
    async fn add_step(&self, checkpoint_id: i64, parsed_step: Value) -> Result<i64> {
        let body = json!({
            "checkpointId": checkpoint_id,
            "stepIndex": APPEND_STEP_INDEX,
            "parsedStep": parsed_step,
        });

        let response = self
            .http
            .post(self.url("/teststeps"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::remote_call("add-step", e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::remote_call("add-step", e.to_string()))?;
        if !status.is_success() {
            return Err(Error::remote_call(
                "add-step",
                format!("status {status}: {text}"),
            ));
        }

        // Some deployments return the created step directly, some wrap it,
        // some just acknowledge with no id at all
        let value: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let id = value
            .get("id")
            .or_else(|| value.get("item").and_then(|item| item.get("id")))
            .and_then(Value::as_i64)
            .unwrap_or(1);
        Ok(id)
    }

    /// Probe connectivity and authentication; returns the round-trip time
    pub async fn ping(&self) -> Result<Duration> {
        let start = Instant::now();
        let response = self
            .http
            .get(self.url("/projects"))
            .query(&[("organizationId", self.organization_id.to_string())])
            .send()
            .await
            .map_err(|e| Error::remote_call("ping", e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::remote_call("ping", format!("status {status}: {text}")));
        }
        Ok(start.elapsed())
    }
}

/// Selector payload used by all element-targeting steps
fn guess_selector(clue: &str) -> Value {
    json!({
        "selectors": [{
            "type": "GUESS",
            "value": json!({ "clue": clue }).to_string(),
        }]
    })
}

#[async_trait]
impl ResourceClient for HttpClient {
    async fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        let body = json!({
            "name": name,
            "description": description,
            "organizationId": self.organization_id,
        });
        self.execute(
            "create-project",
            self.http.post(self.url("/projects")).json(&body),
        )
        .await
    }

    async fn create_goal(&self, project_id: i64, name: &str, url: &str) -> Result<Goal> {
        let body = json!({
            "projectId": project_id,
            "name": name,
            "url": url,
            "environmentId": null,
            "deviceSize": { "width": 1280, "height": 800 },
            "meta": {
                "disableSameOrigin": false,
                "popupAutoDismiss": true,
            },
            "createFirstJourney": true,
        });
        self.execute("create-goal", self.http.post(self.url("/goals")).json(&body))
            .await
    }

    async fn goal_snapshot(&self, goal_id: i64) -> Result<i64> {
        #[derive(serde::Deserialize)]
        struct Versions {
            #[serde(default)]
            snapshots: Vec<Snapshot>,
        }
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Snapshot {
            snapshot_id: i64,
        }

        let versions: Versions = self
            .execute(
                "get-goal-snapshot",
                self.http.get(self.url(&format!("/goals/{goal_id}/versions"))),
            )
            .await?;

        versions
            .snapshots
            .first()
            .map(|s| s.snapshot_id)
            .ok_or_else(|| {
                Error::remote_call(
                    "get-goal-snapshot",
                    format!("no snapshots found for goal {goal_id}"),
                )
            })
    }

    async fn list_journeys(&self, goal_id: i64, snapshot_id: i64) -> Result<Vec<Journey>> {
        #[derive(serde::Deserialize)]
        struct Entry {
            journey: Journey,
        }
        #[derive(serde::Deserialize)]
        struct Listing {
            #[serde(default)]
            success: bool,
            #[serde(default)]
            map: std::collections::HashMap<String, Entry>,
        }

        let operation = "list-journeys";
        let response = self
            .http
            .get(self.url("/testsuites/latest_status"))
            .query(&[
                ("goalId", goal_id.to_string()),
                ("snapshotId", snapshot_id.to_string()),
                ("includeSequencesDetails", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::remote_call(operation, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::remote_call(operation, e.to_string()))?;
        if !status.is_success() {
            return Err(Error::remote_call(operation, format!("status {status}: {body}")));
        }

        let listing: Listing = serde_json::from_str(&body).map_err(|e| {
            Error::remote_call(operation, format!("unexpected response: {e}"))
        })?;
        if !listing.success {
            return Err(Error::remote_call(operation, "API returned success=false"));
        }

        let mut journeys: Vec<Journey> =
            listing.map.into_values().map(|e| e.journey).collect();
        // Ascending id puts the auto-created journey first
        journeys.sort_by_key(|j| j.id);
        Ok(journeys)
    }

    async fn create_journey(
        &self,
        goal_id: i64,
        snapshot_id: i64,
        name: &str,
    ) -> Result<Journey> {
        let body = json!({
            "goalId": goal_id,
            "snapshotId": snapshot_id,
            "name": name,
            "title": name,
            "archived": false,
            "draft": true,
        });
        self.execute(
            "create-journey",
            self.http.post(self.url("/testsuites")).json(&body),
        )
        .await
    }

    async fn rename_journey(&self, journey_id: i64, name: &str) -> Result<Journey> {
        let body = json!({ "title": name });
        self.execute(
            "rename-journey",
            self.http
                .put(self.url(&format!("/testsuites/{journey_id}")))
                .json(&body),
        )
        .await
    }

    async fn first_checkpoint(&self, journey_id: i64) -> Result<Checkpoint> {
        #[derive(serde::Deserialize)]
        struct JourneyDetail {
            #[serde(default)]
            cases: Vec<Checkpoint>,
        }

        let detail: JourneyDetail = self
            .execute(
                "get-first-checkpoint",
                self.http.get(self.url(&format!("/testsuites/{journey_id}"))),
            )
            .await?;

        detail.cases.into_iter().next().ok_or_else(|| {
            Error::remote_call(
                "get-first-checkpoint",
                format!("no checkpoints found for journey {journey_id}"),
            )
        })
    }

    async fn create_checkpoint(
        &self,
        goal_id: i64,
        snapshot_id: i64,
        title: &str,
    ) -> Result<Checkpoint> {
        let body = json!({
            "goalId": goal_id,
            "snapshotId": snapshot_id,
            "title": title,
        });
        self.execute(
            "create-checkpoint",
            self.http.post(self.url("/testcases")).json(&body),
        )
        .await
    }

    async fn attach_checkpoint(
        &self,
        journey_id: i64,
        checkpoint_id: i64,
        position: i32,
    ) -> Result<()> {
        let body = json!({
            "checkpointId": checkpoint_id,
            "position": position,
        });
        // The attach endpoint acknowledges with an empty body on success
        let response = self
            .http
            .post(self.url(&format!("/testsuites/{journey_id}/checkpoints/attach")))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::remote_call("attach-checkpoint", e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::remote_call(
                "attach-checkpoint",
                format!("status {status}: {text}"),
            ));
        }
        Ok(())
    }

    async fn add_navigate_step(&self, checkpoint_id: i64, url: &str) -> Result<i64> {
        let parsed_step = json!({
            "action": "NAVIGATE",
            "target": guess_selector(url),
            "value": url,
            "meta": {},
        });
        self.add_step(checkpoint_id, parsed_step).await
    }

    async fn add_click_step(&self, checkpoint_id: i64, selector: &str) -> Result<i64> {
        let parsed_step = json!({
            "action": "CLICK",
            "target": guess_selector(selector),
            "value": "",
            "meta": {},
        });
        self.add_step(checkpoint_id, parsed_step).await
    }

    async fn add_wait_step(
        &self,
        checkpoint_id: i64,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<i64> {
        let parsed_step = json!({
            "action": "WAIT",
            "target": guess_selector(selector),
            "value": timeout_ms.to_string(),
            "meta": {},
        });
        self.add_step(checkpoint_id, parsed_step).await
    }

    async fn add_fill_step(
        &self,
        checkpoint_id: i64,
        selector: &str,
        value: &str,
    ) -> Result<i64> {
        let parsed_step = json!({
            "action": "FILL",
            "target": guess_selector(selector),
            "value": value,
            "meta": {},
        });
        self.add_step(checkpoint_id, parsed_step).await
    }
}
