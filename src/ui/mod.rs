//! Terminal presentation: the replay screen and workflow listings.

mod key_hints;
pub mod player_bar;
mod replay;
pub mod snapshot_panel;
pub mod terminal_guard;
mod theme;
pub mod workflow_list;

pub use player_bar::PlayerBar;
pub use replay::ReplayApp;
pub use snapshot_panel::SnapshotPanel;
pub use terminal_guard::{install_panic_hook, TerminalGuard};
