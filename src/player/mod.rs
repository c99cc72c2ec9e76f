//! Timeline playback.
//!
//! [`controller`] is the pure state machine; [`runtime`] drives it with a
//! tokio timer and the timeline store.

pub mod controller;
pub mod runtime;
pub mod state;

pub use controller::{PlaybackController, PlayerEffect, RefreshPurpose, TimerDirective};
pub use runtime::{
    Notice, PlayerCommand, PlayerHandle, PlayerOptions, PlayerRuntime, PlayerView, NOTICE_TTL,
};
pub use state::{PlaybackMode, PlaybackState, StepSpeed};
