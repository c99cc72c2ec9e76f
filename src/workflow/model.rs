use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::workflow::WorkflowError;

/// One step of a workflow. The field schema belongs to the step editor, so
/// steps are carried as opaque JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowStep(pub Map<String, Value>);

impl WorkflowStep {
    /// The step's `type` tag, if present.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }
}

/// Saved workflow configuration as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Vec<WorkflowStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkflowConfig {
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// `updated_at` formatted for tables, empty when unknown.
    pub fn updated_label(&self) -> String {
        self.updated_at
            .map(|ts| format_timestamp(&ts))
            .unwrap_or_default()
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Request body for create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowPayload {
    pub name: String,
    pub description: String,
    pub config: Vec<WorkflowStep>,
}

/// Editable form state for a workflow.
///
/// `target` names the entry being edited; `None` means saving creates a
/// new entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowDraft {
    pub target: Option<String>,
    pub name: String,
    pub description: String,
    pub config: Vec<WorkflowStep>,
}

pub const NAME_REQUIRED: &str = "Please enter a name for this configuration";

impl WorkflowDraft {
    /// Blank draft named after the number of existing workflows.
    pub fn for_new(existing_count: usize) -> Self {
        Self {
            target: None,
            name: format!("Workflow {}", existing_count + 1),
            description: String::new(),
            config: Vec::new(),
        }
    }

    /// Draft that saves back onto `workflow`.
    pub fn from_existing(workflow: &WorkflowConfig) -> Self {
        Self {
            target: Some(workflow.id.clone()),
            name: workflow.name.clone(),
            description: workflow.description_or_empty().to_string(),
            config: workflow.config.clone(),
        }
    }

    /// Copy of `workflow` that saves as a new entry.
    pub fn duplicate_of(workflow: &WorkflowConfig) -> Self {
        Self {
            target: None,
            name: format!("{} (Copy)", workflow.name),
            description: workflow.description_or_empty().to_string(),
            config: workflow.config.clone(),
        }
    }

    /// Check the draft and build the request body.
    pub fn validate(&self) -> Result<WorkflowPayload, WorkflowError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(WorkflowError::Validation(NAME_REQUIRED.to_string()));
        }
        Ok(WorkflowPayload {
            name: name.to_string(),
            description: self.description.clone(),
            config: self.config.clone(),
        })
    }
}
