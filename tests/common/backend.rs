//! In-process stub of the simulation platform's REST API.
//!
//! Serves the workflow CRUD endpoints and one experiment's timeline from
//! shared state, on an ephemeral localhost port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use society_console::ApiClient;
use tokio::net::TcpListener;
use uuid::Uuid;

pub const FIXED_TIMESTAMP: &str = "2025-04-01T12:00:00Z";

#[derive(Default)]
pub struct StubState {
    pub workflows: Vec<Value>,
    pub experiment: Option<Value>,
    pub timeline: Vec<Value>,
    /// `METHOD path?query` for every request, in arrival order.
    pub requests: Vec<String>,
    next_id: usize,
}

pub type Shared = Arc<Mutex<StubState>>;

pub struct StubBackend {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::default()));
        let app = Router::new()
            .route("/api/workflow-configs", get(list_workflows).post(create_workflow))
            .route(
                "/api/workflow-configs/{id}",
                axum::routing::put(update_workflow).delete(delete_workflow),
            )
            .route("/api/experiments/{id}", get(get_experiment))
            .route("/api/experiments/{id}/timeline", get(get_timeline))
            .route("/api/experiments/{id}/agents/-/status", get(get_agents))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener.local_addr().expect("Stub backend has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub backend failed");
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.url(), Duration::from_secs(5)).expect("Failed to build API client")
    }

    /// Seed a workflow as the backend would return it.
    pub fn add_workflow(&self, id: &str, name: &str, description: &str, updated_at: &str) {
        self.state.lock().workflows.push(json!({
            "id": id,
            "name": name,
            "description": description,
            "config": [{"type": "step", "days": 1}],
            "created_at": FIXED_TIMESTAMP,
            "updated_at": updated_at,
        }));
    }

    pub fn set_experiment(&self, id: Uuid, name: &str, status: i64) {
        self.state.lock().experiment = Some(json!({
            "id": id,
            "name": name,
            "status": status,
            "num_day": 2,
            "cur_day": 1,
            "cur_t": 3600.0,
        }));
    }

    /// Append `(day, t)` points to the served timeline.
    pub fn push_points(&self, points: &[(u32, f64)]) {
        let mut state = self.state.lock();
        for (day, t) in points {
            state.timeline.push(json!({"day": day, "t": t}));
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    pub fn workflow_names(&self) -> Vec<String> {
        self.state
            .lock()
            .workflows
            .iter()
            .filter_map(|w| w["name"].as_str().map(str::to_string))
            .collect()
    }
}

fn record(state: &Shared, entry: String) {
    state.lock().requests.push(entry);
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
}

async fn list_workflows(State(state): State<Shared>) -> Json<Value> {
    record(&state, "GET /api/workflow-configs".into());
    let workflows = state.lock().workflows.clone();
    Json(json!({ "data": workflows }))
}

async fn create_workflow(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    record(&state, "POST /api/workflow-configs".into());
    let mut guard = state.lock();
    guard.next_id += 1;
    let workflow = json!({
        "id": format!("wf-new-{}", guard.next_id),
        "name": body["name"],
        "description": body["description"],
        "config": body["config"],
        "created_at": FIXED_TIMESTAMP,
        "updated_at": FIXED_TIMESTAMP,
    });
    guard.workflows.push(workflow.clone());
    (StatusCode::CREATED, Json(json!({ "data": workflow }))).into_response()
}

async fn update_workflow(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    record(&state, format!("PUT /api/workflow-configs/{id}"));
    let mut guard = state.lock();
    let Some(workflow) = guard.workflows.iter_mut().find(|w| w["id"] == id) else {
        return not_found("workflow");
    };
    workflow["name"] = body["name"].clone();
    workflow["description"] = body["description"].clone();
    workflow["config"] = body["config"].clone();
    workflow["updated_at"] = json!(FIXED_TIMESTAMP);
    Json(json!({ "data": workflow.clone() })).into_response()
}

async fn delete_workflow(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    record(&state, format!("DELETE /api/workflow-configs/{id}"));
    let mut guard = state.lock();
    let before = guard.workflows.len();
    guard.workflows.retain(|w| w["id"] != id);
    if guard.workflows.len() == before {
        return not_found("workflow");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn get_experiment(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    record(&state, format!("GET /api/experiments/{id}"));
    match state.lock().experiment.clone() {
        Some(experiment) => Json(json!({ "data": experiment })).into_response(),
        None => not_found("experiment"),
    }
}

async fn get_timeline(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    record(&state, format!("GET /api/experiments/{id}/timeline"));
    let timeline = state.lock().timeline.clone();
    Json(json!({ "data": timeline }))
}

#[derive(Deserialize)]
struct AgentQuery {
    day: u32,
    t: f64,
}

async fn get_agents(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(query): Query<AgentQuery>,
) -> Json<Value> {
    record(
        &state,
        format!(
            "GET /api/experiments/{id}/agents/-/status?day={}&t={}",
            query.day, query.t
        ),
    );
    Json(json!({
        "data": [
            {"id": 1, "lng": 116.39, "lat": 39.9, "action": "commute", "day": query.day, "t": query.t},
            {"id": 2, "lng": null, "lat": null, "action": null, "day": query.day, "t": query.t}
        ]
    }))
}
