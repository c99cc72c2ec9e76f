//! Transport bar for the replay screen.
//!
//! Two rows: the experiment header with its status dot, then the controls
//! (step/play buttons, position slider, day and time, speed, mode).

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::player::{PlaybackMode, PlayerView};
use crate::store::ExperimentStatus;
use crate::timeline::format_time_of_day;

use super::theme::{
    ACCENT_ERROR, ACCENT_PRIMARY, ACCENT_SUCCESS, ACCENT_WARNING, BAR_BG, TEXT_BRIGHT, TEXT_FAINT,
    TEXT_MUTED, TEXT_SECONDARY,
};

pub const PLAYER_BAR_HEIGHT: u16 = 2;

const BUTTONS_WIDTH: u16 = 12;
const CLOCK_WIDTH: u16 = 18;
const SPEED_WIDTH: u16 = 8;
const MODE_WIDTH: u16 = 15;

pub fn status_color(status: ExperimentStatus) -> Color {
    match status {
        ExperimentStatus::Running => ACCENT_SUCCESS,
        ExperimentStatus::Completed => ACCENT_PRIMARY,
        ExperimentStatus::Failed => ACCENT_ERROR,
        ExperimentStatus::NotStarted => TEXT_MUTED,
        ExperimentStatus::Unknown(_) => ACCENT_WARNING,
    }
}

pub struct PlayerBar<'a> {
    view: &'a PlayerView,
}

impl<'a> PlayerBar<'a> {
    pub fn new(view: &'a PlayerView) -> Self {
        Self { view }
    }

    fn header_line(&self) -> Line<'static> {
        let status = self.view.status();
        let mut spans = vec![
            Span::raw(" "),
            Span::styled("●", Style::default().fg(status_color(status))),
            Span::raw(" "),
            Span::styled(
                status.display_name().to_string(),
                Style::default().fg(TEXT_SECONDARY),
            ),
        ];

        if let Some(experiment) = &self.view.experiment {
            spans.push(Span::styled("  │  ", Style::default().fg(TEXT_FAINT)));
            spans.push(Span::styled(
                experiment.name.clone(),
                Style::default().fg(TEXT_BRIGHT).add_modifier(Modifier::BOLD),
            ));
            if let Some(progress) = progress_label(experiment.cur_day, experiment.cur_t, experiment.num_day) {
                spans.push(Span::styled(
                    format!("  {progress}"),
                    Style::default().fg(TEXT_MUTED),
                ));
            }
        }

        if self.view.loading {
            spans.push(Span::styled("  loading…", Style::default().fg(TEXT_FAINT)));
        }

        Line::from(spans)
    }

    fn buttons_line(&self) -> Line<'static> {
        let enabled = Style::default().fg(TEXT_BRIGHT);
        let disabled = Style::default().fg(TEXT_FAINT);
        let empty = self.view.timeline_len == 0;

        let back_style = if empty || self.view.at_start() {
            disabled
        } else {
            enabled
        };
        // Live mode can always step toward the edge.
        let forward_style =
            if empty || (self.view.at_end() && self.view.state.mode == PlaybackMode::Replay) {
                disabled
            } else {
                enabled
            };
        let play = if self.view.state.is_playing {
            "❚❚"
        } else {
            "▶"
        };

        Line::from(vec![
            Span::raw(" "),
            Span::styled("◀◀", back_style),
            Span::raw("  "),
            Span::styled(play, Style::default().fg(ACCENT_PRIMARY)),
            Span::raw("  "),
            Span::styled("▶▶", forward_style),
        ])
    }

    fn clock_line(&self) -> Line<'static> {
        let point = self.view.current_point;
        Line::from(vec![
            Span::styled(format!("Day {}", point.day), Style::default().fg(TEXT_SECONDARY)),
            Span::raw(" "),
            Span::styled(point.clock(), Style::default().fg(TEXT_BRIGHT)),
        ])
    }

    fn speed_line(&self) -> Line<'static> {
        Line::from(Span::styled(
            format!("[{}]", self.view.state.interval.label()),
            Style::default().fg(TEXT_SECONDARY),
        ))
    }

    fn mode_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, mode) in [PlaybackMode::Replay, PlaybackMode::Live].into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Style::default().fg(TEXT_FAINT)));
            }
            let style = if mode == self.view.state.mode {
                Style::default().fg(ACCENT_PRIMARY).add_modifier(Modifier::BOLD)
            } else if self.view.mode_options.contains(&mode) {
                Style::default().fg(TEXT_SECONDARY)
            } else {
                Style::default().fg(TEXT_FAINT)
            };
            spans.push(Span::styled(mode.display_name(), style));
        }
        Line::from(spans)
    }
}

/// `Day 3/10 08:00:00` style progress for the header, if known.
fn progress_label(cur_day: Option<u32>, cur_t: Option<f64>, num_day: Option<u32>) -> Option<String> {
    let cur_day = cur_day?;
    let mut label = match num_day {
        Some(total) => format!("Day {cur_day}/{total}"),
        None => format!("Day {cur_day}"),
    };
    if let Some(t) = cur_t {
        label.push(' ');
        label.push_str(&format_time_of_day(t));
    }
    Some(label)
}

/// Text slider: filled track up to the knob, empty track after it.
pub fn slider_line(position: usize, len: usize, width: u16) -> Line<'static> {
    let width = width as usize;
    if width == 0 {
        return Line::default();
    }
    let knob = if len <= 1 {
        0
    } else {
        position.min(len - 1) * (width - 1) / (len - 1)
    };

    Line::from(vec![
        Span::styled("━".repeat(knob), Style::default().fg(ACCENT_PRIMARY)),
        Span::styled("●", Style::default().fg(TEXT_BRIGHT)),
        Span::styled(
            "─".repeat(width - knob - 1),
            Style::default().fg(TEXT_FAINT),
        ),
    ])
}

impl Widget for PlayerBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(BAR_BG));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        Paragraph::new(self.header_line()).render(rows[0], buf);
        if area.height < PLAYER_BAR_HEIGHT {
            return;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(BUTTONS_WIDTH),
                Constraint::Min(4),
                Constraint::Length(1),
                Constraint::Length(CLOCK_WIDTH),
                Constraint::Length(SPEED_WIDTH),
                Constraint::Length(MODE_WIDTH),
            ])
            .split(rows[1]);

        Paragraph::new(self.buttons_line()).render(columns[0], buf);
        Paragraph::new(slider_line(
            self.view.state.current_index,
            self.view.timeline_len,
            columns[1].width,
        ))
        .render(columns[1], buf);
        Paragraph::new(self.clock_line()).render(columns[3], buf);
        Paragraph::new(self.speed_line()).render(columns[4], buf);
        Paragraph::new(self.mode_line()).render(columns[5], buf);
    }
}
