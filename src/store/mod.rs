//! Experiment timeline store.
//!
//! The store owns the recorded timeline and experiment metadata. The player
//! only reads from it and asks it to refresh or to load a snapshot.

mod http;
mod mock;
mod model;

use async_trait::async_trait;

use crate::api::ApiError;
use crate::timeline::{Timeline, TimelinePoint};

pub use http::HttpTimelineStore;
pub use mock::MockTimelineStore;
pub use model::{AgentStatus, Experiment, ExperimentStatus, Snapshot};

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Scripted failure from a test store.
    #[error("{0}")]
    Unavailable(String),
}

/// Source of timeline points and snapshots for one experiment.
#[async_trait]
pub trait TimelineStore: Send + Sync {
    /// Current timeline.
    fn timeline(&self) -> Timeline;

    /// Number of recorded points; cheaper than cloning the timeline.
    fn timeline_len(&self) -> usize;

    /// Point at `index`, if recorded.
    fn point(&self, index: usize) -> Option<TimelinePoint>;

    /// Last known experiment metadata.
    fn experiment(&self) -> Option<Experiment>;

    /// Reload experiment metadata and append newly recorded points.
    async fn refresh(&self) -> Result<(), StoreError>;

    /// Load the snapshot for `point`.
    async fn fetch_by_time(&self, point: TimelinePoint) -> Result<Snapshot, StoreError>;
}
