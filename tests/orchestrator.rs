//! Orchestrator integration tests
//!
//! Drive the reconciliation orchestrator with an in-process mock client that
//! records every call and can fail on demand, then check the adoption
//! invariant, count conservation, dry-run parity and fail-fast semantics.

use std::sync::Mutex;

use async_trait::async_trait;

use testweaver::client::{Checkpoint, Goal, Journey, Project, ResourceClient};
use testweaver::common::{Error, Result};
use testweaver::orchestrator::{preview, Decision, Orchestrator};
use testweaver::structure::parser;
use testweaver::StructureDefinition;

const AUTO_JOURNEY_NAME: &str = "Untitled Journey";

#[derive(Default)]
struct MockState {
    next_id: i64,
    calls: Vec<String>,
    /// 1-based index of the call that should fail
    fail_at: Option<usize>,
    fail_rename: bool,
    /// Journeys reported as pre-existing per goal
    auto_journeys: usize,
}

struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 100,
                auto_journeys: 1,
                ..Default::default()
            }),
        }
    }

    fn failing_at(call: usize) -> Self {
        let client = Self::new();
        client.state.lock().unwrap().fail_at = Some(call);
        client
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Record the call and apply failure injection
    fn track(&self, call: String) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        let operation = call
            .split('(')
            .next()
            .unwrap_or_default()
            .to_string();
        state.calls.push(call);
        if state.fail_at == Some(state.calls.len()) {
            return Err(Error::remote_call(&operation, "injected failure"));
        }
        state.next_id += 1;
        Ok(state.next_id)
    }
}

#[async_trait]
impl ResourceClient for MockClient {
    async fn create_project(&self, name: &str, _description: &str) -> Result<Project> {
        let id = self.track(format!("create-project({name})"))?;
        Ok(Project {
            id,
            name: name.to_string(),
            description: String::new(),
        })
    }

    async fn create_goal(&self, project_id: i64, name: &str, url: &str) -> Result<Goal> {
        let id = self.track(format!("create-goal({project_id}, {name})"))?;
        Ok(Goal {
            id,
            project_id,
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    async fn goal_snapshot(&self, goal_id: i64) -> Result<i64> {
        self.track(format!("get-goal-snapshot({goal_id})"))
    }

    async fn list_journeys(&self, goal_id: i64, snapshot_id: i64) -> Result<Vec<Journey>> {
        self.track(format!("list-journeys({goal_id})"))?;
        let count = self.state.lock().unwrap().auto_journeys;
        Ok((0..count)
            .map(|i| Journey {
                id: goal_id * 1000 + i as i64,
                goal_id,
                snapshot_id,
                name: AUTO_JOURNEY_NAME.to_string(),
                title: AUTO_JOURNEY_NAME.to_string(),
            })
            .collect())
    }

    async fn create_journey(
        &self,
        goal_id: i64,
        snapshot_id: i64,
        name: &str,
    ) -> Result<Journey> {
        let id = self.track(format!("create-journey({goal_id}, {name})"))?;
        Ok(Journey {
            id,
            goal_id,
            snapshot_id,
            name: name.to_string(),
            title: name.to_string(),
        })
    }

    async fn rename_journey(&self, journey_id: i64, name: &str) -> Result<Journey> {
        self.track(format!("rename-journey({journey_id}, {name})"))?;
        if self.state.lock().unwrap().fail_rename {
            return Err(Error::remote_call("rename-journey", "rename rejected"));
        }
        Ok(Journey {
            id: journey_id,
            goal_id: 0,
            snapshot_id: 0,
            name: name.to_string(),
            title: name.to_string(),
        })
    }

    async fn first_checkpoint(&self, journey_id: i64) -> Result<Checkpoint> {
        let id = self.track(format!("get-first-checkpoint({journey_id})"))?;
        Ok(Checkpoint {
            id,
            title: "Navigation".to_string(),
            position: 1,
        })
    }

    async fn create_checkpoint(
        &self,
        goal_id: i64,
        _snapshot_id: i64,
        title: &str,
    ) -> Result<Checkpoint> {
        let id = self.track(format!("create-checkpoint({goal_id}, {title})"))?;
        Ok(Checkpoint {
            id,
            title: title.to_string(),
            position: 0,
        })
    }

    async fn attach_checkpoint(
        &self,
        journey_id: i64,
        checkpoint_id: i64,
        position: i32,
    ) -> Result<()> {
        self.track(format!(
            "attach-checkpoint({journey_id}, {checkpoint_id}, {position})"
        ))?;
        Ok(())
    }

    async fn add_navigate_step(&self, checkpoint_id: i64, url: &str) -> Result<i64> {
        self.track(format!("add-navigate-step({checkpoint_id}, {url})"))
    }

    async fn add_click_step(&self, checkpoint_id: i64, selector: &str) -> Result<i64> {
        self.track(format!("add-click-step({checkpoint_id}, {selector})"))
    }

    async fn add_wait_step(
        &self,
        checkpoint_id: i64,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<i64> {
        self.track(format!(
            "add-wait-step({checkpoint_id}, {selector}, {timeout_ms})"
        ))
    }

    async fn add_fill_step(
        &self,
        checkpoint_id: i64,
        selector: &str,
        value: &str,
    ) -> Result<i64> {
        self.track(format!("add-fill-step({checkpoint_id}, {selector}, {value})"))
    }
}

fn checkout_structure() -> StructureDefinition {
    parser::parse(
        br##"
project:
  name: Shop
goals:
  - name: Checkout
    url: https://shop.test
    journeys:
      - name: Happy Path
        checkpoints:
          - name: Navigate
            navigation_url: https://shop.test
          - name: Pay
            steps:
              - type: click
                selector: "#pay"
"##,
    )
    .unwrap()
}

fn wide_structure() -> StructureDefinition {
    // 2 goals x 2 journeys x 2 checkpoints, one step per checkpoint
    parser::parse(
        br##"{
        "project": {"name": "Shop"},
        "goals": [
            {"name": "G1", "url": "https://a.test", "journeys": [
                {"name": "J1", "checkpoints": [
                    {"name": "C1", "steps": [{"type": "navigate", "url": "https://a.test"}]},
                    {"name": "C2", "steps": [{"type": "wait", "selector": ".done"}]}
                ]},
                {"name": "J2", "checkpoints": [
                    {"name": "C3", "steps": [{"type": "click", "selector": "#go"}]},
                    {"name": "C4", "steps": [{"type": "fill", "selector": "#q", "value": "x"}]}
                ]}
            ]},
            {"name": "G2", "url": "https://b.test", "journeys": [
                {"name": "J3", "checkpoints": [
                    {"name": "C5", "steps": []},
                    {"name": "C6", "steps": [{"type": "click", "selector": "#ok"}]}
                ]},
                {"name": "J4", "checkpoints": [
                    {"name": "C7", "steps": []},
                    {"name": "C8", "steps": []}
                ]}
            ]}
        ]
    }"##,
    )
    .unwrap()
}

#[tokio::test]
async fn test_checkout_example_scenario() {
    let def = checkout_structure();
    let client = MockClient::new();
    let mut orchestrator = Orchestrator::new(&client);

    let resources = orchestrator.run(&def).await.unwrap();

    assert_eq!(resources.goals.len(), 1);
    let goal = &resources.goals[0];
    assert_eq!(goal.journeys.len(), 1);

    // The auto-created journey was adopted and renamed
    let journey = &goal.journeys[0];
    assert_eq!(journey.name, "Happy Path");
    assert_eq!(journey.checkpoints.len(), 2);

    // One navigate step into the adopted checkpoint, one click in the new one
    assert_eq!(journey.checkpoints[0].step_count, 1);
    assert_eq!(journey.checkpoints[1].step_count, 1);
    assert_eq!(resources.total_steps, 2);

    let calls = client.calls();
    assert!(calls.iter().any(|c| c.starts_with("rename-journey")));
    assert!(calls.iter().any(|c| c.starts_with("add-navigate-step")));
    // Second checkpoint attached at position 2
    assert!(calls.iter().any(|c| c.starts_with("attach-checkpoint") && c.ends_with("2)")));
    // Nothing was created where adoption applies
    assert_eq!(client.count_calls("create-journey"), 0);
    assert_eq!(client.count_calls("create-checkpoint"), 1);
}

#[tokio::test]
async fn test_adoption_invariant() {
    let def = wide_structure();
    let client = MockClient::new();
    let mut orchestrator = Orchestrator::new(&client);

    orchestrator.run(&def).await.unwrap();

    // One explicit create-journey per goal beyond the adopted first
    assert_eq!(client.count_calls("create-journey"), 2);
    // The first checkpoint of each goal's first journey is fetched, never created
    assert_eq!(client.count_calls("get-first-checkpoint"), 2);
    // 8 declared checkpoints minus the 2 adopted ones
    assert_eq!(client.count_calls("create-checkpoint"), 6);
}

#[tokio::test]
async fn test_count_conservation() {
    let def = wide_structure();
    let client = MockClient::new();
    let mut orchestrator = Orchestrator::new(&client);

    let resources = orchestrator.run(&def).await.unwrap();

    assert_eq!(resources.goals.len(), def.goals.len());

    let output_checkpoints: usize = resources
        .goals
        .iter()
        .flat_map(|g| &g.journeys)
        .map(|j| j.checkpoints.len())
        .sum();
    assert_eq!(output_checkpoints, def.checkpoint_count());
    assert_eq!(resources.total_steps, def.step_count());
}

#[tokio::test]
async fn test_dry_run_matches_real_run_decisions() {
    let def = wide_structure();
    let report = preview(&def);

    let client = MockClient::new();
    let mut orchestrator = Orchestrator::new(&client);
    let resources = orchestrator.run(&def).await.unwrap();

    // Preview marks exactly the nodes the real run adopted
    let adopted_journeys: usize = report
        .goals
        .iter()
        .flat_map(|g| &g.journeys)
        .filter(|j| j.decision == Decision::Adopt)
        .count();
    let adopted_checkpoints: usize = report
        .goals
        .iter()
        .flat_map(|g| &g.journeys)
        .flat_map(|j| &j.checkpoints)
        .filter(|c| c.decision == Decision::Adopt)
        .count();

    let total_journeys = def.journey_count();
    let total_checkpoints = def.checkpoint_count();

    assert_eq!(
        client.count_calls("create-journey"),
        total_journeys - adopted_journeys
    );
    assert_eq!(client.count_calls("get-first-checkpoint"), adopted_checkpoints);
    assert_eq!(
        client.count_calls("create-checkpoint"),
        total_checkpoints - adopted_checkpoints
    );
    assert_eq!(report.totals.steps, resources.total_steps);
}

#[tokio::test]
async fn test_dry_run_step_total_matches_real_run() {
    // The adopted navigation checkpoint gains a navigate step beyond the
    // declared ones; the preview total must account for it too.
    let def = checkout_structure();
    let report = preview(&def);

    let client = MockClient::new();
    let mut orchestrator = Orchestrator::new(&client);
    let resources = orchestrator.run(&def).await.unwrap();

    assert_eq!(resources.total_steps, 2);
    assert_eq!(report.totals.steps, resources.total_steps);
}

#[tokio::test]
async fn test_fail_fast_stops_at_failing_call() {
    let def = checkout_structure();

    // Call sequence: create-project, create-goal, get-goal-snapshot,
    // list-journeys, rename-journey, get-first-checkpoint,
    // add-navigate-step, create-checkpoint, attach-checkpoint,
    // add-click-step. Fail the attach (9th call).
    let client = MockClient::failing_at(9);
    let mut orchestrator = Orchestrator::new(&client);

    let err = orchestrator.run(&def).await.unwrap_err();
    assert!(matches!(err, Error::RemoteCall { .. }));

    // No call after the failing one
    let calls = client.calls();
    assert_eq!(calls.len(), 9);
    assert!(calls[8].starts_with("attach-checkpoint"));

    // The log holds exactly what succeeded before the failure
    let log = orchestrator.log();
    assert!(log.project_id.is_some());
    assert_eq!(log.goals.len(), 1);
    assert_eq!(log.journeys.len(), 1);
    assert_eq!(log.checkpoints.len(), 2); // adopted + created-but-unattached
    assert_eq!(log.steps_created, 1);

    let diagnostic = log.diagnostic();
    assert!(diagnostic.contains("Manual cleanup"));
}

#[tokio::test]
async fn test_parse_failure_makes_no_remote_calls() {
    let client = MockClient::new();

    let err = parser::parse(b"{definitely not: [valid").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_rename_failure_is_not_fatal() {
    let def = checkout_structure();
    let client = MockClient::new();
    client.state.lock().unwrap().fail_rename = true;

    let mut orchestrator = Orchestrator::new(&client);
    let resources = orchestrator.run(&def).await.unwrap();

    // Journey kept its auto-assigned name but still worked as a container
    assert_eq!(resources.goals[0].journeys[0].name, AUTO_JOURNEY_NAME);
    assert_eq!(resources.total_steps, 2);
}

#[tokio::test]
async fn test_defensive_create_when_no_auto_journey_reported() {
    let def = checkout_structure();
    let client = MockClient::new();
    client.state.lock().unwrap().auto_journeys = 0;

    let mut orchestrator = Orchestrator::new(&client);
    let resources = orchestrator.run(&def).await.unwrap();

    // With nothing to adopt, the first journey is created explicitly
    assert_eq!(client.count_calls("create-journey"), 1);
    assert_eq!(resources.goals[0].journeys[0].name, "Happy Path");
}

#[tokio::test]
async fn test_existing_project_skips_create_call() {
    let def = parser::parse(
        br#"{"project": {"id": 77}, "goals": [{"name": "G", "url": "https://x.test",
            "journeys": [{"name": "J", "checkpoints": [{"name": "C"}]}]}]}"#,
    )
    .unwrap();

    let client = MockClient::new();
    let mut orchestrator = Orchestrator::new(&client);
    let resources = orchestrator.run(&def).await.unwrap();

    assert_eq!(resources.project_id, 77);
    assert_eq!(client.count_calls("create-project"), 0);
    assert_eq!(orchestrator.log().project_id, Some(77));
}

#[tokio::test]
async fn test_second_journey_first_checkpoint_attaches_at_position_two() {
    let def = wide_structure();
    let client = MockClient::new();
    let mut orchestrator = Orchestrator::new(&client);
    orchestrator.run(&def).await.unwrap();

    // Every created checkpoint attaches at position >= 2; position 1 stays
    // reserved for the navigation checkpoint.
    let attach_positions: Vec<i32> = client
        .calls()
        .iter()
        .filter(|c| c.starts_with("attach-checkpoint"))
        .map(|c| {
            c.trim_end_matches(')')
                .rsplit(", ")
                .next()
                .unwrap()
                .parse()
                .unwrap()
        })
        .collect();

    assert!(!attach_positions.is_empty());
    assert!(attach_positions.iter().all(|p| *p >= 2));
}

#[tokio::test]
async fn test_wait_step_default_timeout() {
    let def = parser::parse(
        br#"{"project": {"name": "P"}, "goals": [{"name": "G", "url": "https://x.test",
            "journeys": [{"name": "J", "checkpoints": [
                {"name": "C", "steps": [{"type": "wait", "selector": ".spinner"}]}
            ]}]}]}"#,
    )
    .unwrap();

    let client = MockClient::new();
    let mut orchestrator = Orchestrator::new(&client);
    orchestrator.run(&def).await.unwrap();

    let calls = client.calls();
    let wait = calls
        .iter()
        .find(|c| c.starts_with("add-wait-step"))
        .unwrap();
    assert!(wait.ends_with("5000)"));
}
