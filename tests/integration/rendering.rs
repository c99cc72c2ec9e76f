//! Rendering checks for the replay widgets.

use ratatui::layout::Rect;
use society_console::player::{PlaybackMode, PlaybackState, PlayerView, StepSpeed};
use society_console::store::{AgentStatus, Experiment, ExperimentStatus, Snapshot};
use society_console::timeline::TimelinePoint;
use society_console::ui::{PlayerBar, SnapshotPanel};
use uuid::Uuid;

use super::common::terminal::{buffer_contains, buffer_row, create_test_terminal_sized};

fn view(status: ExperimentStatus, index: usize, len: usize) -> PlayerView {
    let mut state = PlaybackState::new(StepSpeed::Ms2000);
    state.current_index = index;
    PlayerView {
        state,
        timeline_len: len,
        current_point: TimelinePoint::new(1, 8.0 * 3600.0 + 15.0 * 60.0),
        experiment: Some(Experiment {
            id: Uuid::nil(),
            name: "Beijing commuters".into(),
            status,
            num_day: Some(3),
            cur_day: Some(1),
            cur_t: Some(9.0 * 3600.0),
        }),
        mode_options: if status.allows_live() {
            vec![PlaybackMode::Replay, PlaybackMode::Live]
        } else {
            vec![PlaybackMode::Replay]
        },
        snapshot: None,
        loading: false,
        notice: None,
    }
}

#[test]
fn test_player_bar_shows_status_position_and_speed() {
    let view = view(ExperimentStatus::Running, 3, 10);
    let mut terminal = create_test_terminal_sized(100, 2);
    terminal
        .draw(|f| f.render_widget(PlayerBar::new(&view), f.area()))
        .unwrap();
    let buffer = terminal.backend().buffer();

    let header = buffer_row(buffer, 0);
    assert!(header.contains("● Running"), "{header}");
    assert!(header.contains("Beijing commuters"), "{header}");
    assert!(header.contains("Day 1/3 09:00:00"), "{header}");

    let controls = buffer_row(buffer, 1);
    assert!(controls.contains("◀◀  ▶  ▶▶"), "{controls}");
    assert!(controls.contains("Day 1 08:15:00"), "{controls}");
    assert!(controls.contains("[2s]"), "{controls}");
    assert!(controls.contains("Replay Live"), "{controls}");
}

#[test]
fn test_player_bar_shows_pause_while_playing() {
    let mut view = view(ExperimentStatus::Completed, 0, 10);
    view.state.is_playing = true;
    let mut terminal = create_test_terminal_sized(100, 2);
    terminal
        .draw(|f| f.render_widget(PlayerBar::new(&view), f.area()))
        .unwrap();

    assert!(buffer_contains(terminal.backend().buffer(), "❚❚"));
    assert!(buffer_contains(terminal.backend().buffer(), "Completed"));
}

#[test]
fn test_snapshot_panel_lists_agents() {
    let snapshot = Snapshot {
        point: TimelinePoint::new(0, 60.0),
        agents: vec![
            AgentStatus {
                id: 7,
                lng: Some(116.391234),
                lat: Some(39.907),
                action: Some("commute".into()),
                extra: Default::default(),
            },
            AgentStatus {
                id: 8,
                lng: None,
                lat: None,
                action: None,
                extra: Default::default(),
            },
        ],
    };
    let mut terminal = create_test_terminal_sized(70, 6);
    terminal
        .draw(|f| {
            f.render_widget(
                SnapshotPanel::new(Some(&snapshot), false),
                Rect::new(0, 0, 70, 6),
            )
        })
        .unwrap();
    let buffer = terminal.backend().buffer();

    assert!(buffer_row(buffer, 0).contains("Agents · Day 0 00:01:00 (2)"));
    assert!(buffer_row(buffer, 1).contains("ID"));
    let first = buffer_row(buffer, 2);
    assert!(first.contains('7'), "{first}");
    assert!(first.contains("116.39123"), "{first}");
    assert!(first.contains("commute"), "{first}");
    assert!(buffer_row(buffer, 3).contains('-'));
}

#[test]
fn test_snapshot_panel_empty_states() {
    let mut terminal = create_test_terminal_sized(40, 3);
    terminal
        .draw(|f| f.render_widget(SnapshotPanel::new(None, true), f.area()))
        .unwrap();
    assert!(buffer_contains(terminal.backend().buffer(), "Loading snapshot…"));

    terminal
        .draw(|f| f.render_widget(SnapshotPanel::new(None, false), f.area()))
        .unwrap();
    assert!(buffer_contains(terminal.backend().buffer(), "No snapshot loaded"));
}
