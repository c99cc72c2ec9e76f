use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::timeline::TimelinePoint;

/// Lifecycle status reported by the backend for an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ExperimentStatus {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
    Unknown(i64),
}

impl ExperimentStatus {
    /// Live playback only makes sense while new points are still being recorded.
    pub fn allows_live(&self) -> bool {
        matches!(self, ExperimentStatus::Running)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExperimentStatus::NotStarted => "Not started",
            ExperimentStatus::Running => "Running",
            ExperimentStatus::Completed => "Completed",
            ExperimentStatus::Failed => "Failed",
            ExperimentStatus::Unknown(_) => "Unknown",
        }
    }
}

impl From<i64> for ExperimentStatus {
    fn from(value: i64) -> Self {
        match value {
            0 => ExperimentStatus::NotStarted,
            1 => ExperimentStatus::Running,
            2 => ExperimentStatus::Completed,
            3 => ExperimentStatus::Failed,
            other => ExperimentStatus::Unknown(other),
        }
    }
}

impl From<ExperimentStatus> for i64 {
    fn from(status: ExperimentStatus) -> Self {
        match status {
            ExperimentStatus::NotStarted => 0,
            ExperimentStatus::Running => 1,
            ExperimentStatus::Completed => 2,
            ExperimentStatus::Failed => 3,
            ExperimentStatus::Unknown(other) => other,
        }
    }
}

/// Experiment metadata as served by `GET /api/experiments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: ExperimentStatus,
    #[serde(default)]
    pub num_day: Option<u32>,
    #[serde(default)]
    pub cur_day: Option<u32>,
    #[serde(default)]
    pub cur_t: Option<f64>,
}

/// State of one agent at a recorded instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: i64,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything the console shows for one timeline point.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub point: TimelinePoint,
    pub agents: Vec<AgentStatus>,
}
