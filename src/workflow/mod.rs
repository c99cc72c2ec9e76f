//! Saved workflow configurations: model, REST client, export and the
//! table state used by the workflow manager.

mod client;
mod export;
mod model;
mod table;

use thiserror::Error;

use crate::api::ApiError;

pub use client::WorkflowClient;
pub use export::{export_file_name, export_json, export_to_dir};
pub use model::{
    format_timestamp, WorkflowConfig, WorkflowDraft, WorkflowPayload, WorkflowStep, NAME_REQUIRED,
};
pub use table::{SortKey, SortOrder, WorkflowTable, DEFAULT_PAGE_SIZE};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Validation(String),

    #[error("Workflow not found: {0}")]
    NotFound(String),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode workflow: {0}")]
    Serialize(#[from] serde_json::Error),
}
