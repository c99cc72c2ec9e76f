pub mod api;
pub mod config;
pub mod player;
pub mod store;
pub mod timeline;
pub mod ui;
pub mod util;
pub mod workflow;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use player::{
    PlaybackController, PlaybackMode, PlaybackState, PlayerHandle, PlayerOptions, PlayerRuntime,
    PlayerView, StepSpeed,
};
pub use store::{HttpTimelineStore, MockTimelineStore, StoreError, TimelineStore};
pub use timeline::{Timeline, TimelinePoint};
pub use workflow::{WorkflowClient, WorkflowConfig, WorkflowDraft, WorkflowError, WorkflowTable};
