//! Interactive replay screen.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{enable_raw_mode, EnterAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::player::{PlaybackMode, PlayerHandle, PlayerView};

use super::key_hints::KeyHints;
use super::player_bar::{PlayerBar, PLAYER_BAR_HEIGHT};
use super::snapshot_panel::SnapshotPanel;
use super::terminal_guard::TerminalGuard;
use super::theme::ACCENT_ERROR;

/// Redraw cadence while idle so expired notices disappear.
const IDLE_REDRAW: Duration = Duration::from_millis(250);
const SCRUB_JUMP: usize = 10;

const HINTS: &[(&str, &str)] = &[
    ("space", "play"),
    ("←/→", "step"),
    ("[ ] { }", "scrub"),
    ("enter", "commit"),
    ("+/-", "speed"),
    ("m", "mode"),
    ("r", "reload"),
    ("q", "quit"),
];

const SCRUB_HINTS: &[(&str, &str)] = &[
    ("[ ] { }", "scrub"),
    ("enter/esc", "commit"),
    ("home/end", "jump"),
    ("q", "quit"),
];

pub struct ReplayApp {
    handle: PlayerHandle,
    view_rx: watch::Receiver<PlayerView>,
    /// Slider position while scrubbing; `None` when not dragging.
    scrub: Option<usize>,
    should_quit: bool,
}

impl ReplayApp {
    pub fn new(handle: PlayerHandle) -> Self {
        let view_rx = handle.subscribe();
        Self {
            handle,
            view_rx,
            scrub: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_some()
    }

    /// Run the screen until the operator quits.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut guard = TerminalGuard::new();
        execute!(io::stdout(), EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal).await;

        self.handle.shutdown();
        guard.cleanup()?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut redraw = tokio::time::interval(IDLE_REDRAW);

        loop {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                changed = self.view_rx.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Player runtime stopped");
                        break;
                    }
                }
                _ = redraw.tick() => {}
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let view = self.view_rx.borrow().clone();

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => match self.scrub.take() {
                Some(position) => self.handle.seek_commit(position),
                None => self.should_quit = true,
            },
            KeyCode::Char(' ') => self.handle.toggle_playing(),
            KeyCode::Right | KeyCode::Char('l') => self.handle.step_forward(),
            KeyCode::Left | KeyCode::Char('h') => self.handle.step_backward(),
            KeyCode::Char(']') => self.scrub_by(&view, 1),
            KeyCode::Char('[') => self.scrub_by(&view, -1),
            KeyCode::Char('}') => self.scrub_by(&view, SCRUB_JUMP as isize),
            KeyCode::Char('{') => self.scrub_by(&view, -(SCRUB_JUMP as isize)),
            KeyCode::Enter => {
                if let Some(position) = self.scrub.take() {
                    self.handle.seek_commit(position);
                }
            }
            KeyCode::Home => self.jump_to(&view, 0),
            KeyCode::End => self.jump_to(&view, view.timeline_len.saturating_sub(1)),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.handle.set_interval(view.state.interval.faster());
            }
            KeyCode::Char('-') => self.handle.set_interval(view.state.interval.slower()),
            KeyCode::Char('m') => {
                let target = match view.state.mode {
                    PlaybackMode::Replay => PlaybackMode::Live,
                    PlaybackMode::Live => PlaybackMode::Replay,
                };
                if view.mode_options.contains(&target) {
                    self.handle.set_mode(target);
                }
            }
            KeyCode::Char('r') => self.handle.reload(),
            _ => {}
        }
    }

    fn scrub_by(&mut self, view: &PlayerView, delta: isize) {
        if view.timeline_len == 0 {
            return;
        }
        let from = self.scrub.unwrap_or(view.state.current_index);
        let position = from
            .saturating_add_signed(delta)
            .min(view.timeline_len - 1);
        self.scrub = Some(position);
        self.handle.seek(position);
    }

    fn jump_to(&mut self, view: &PlayerView, index: usize) {
        if view.timeline_len == 0 {
            return;
        }
        self.scrub = None;
        self.handle.seek_commit(index);
    }

    pub fn draw(&self, f: &mut Frame) {
        let view = self.view_rx.borrow().clone();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(PLAYER_BAR_HEIGHT),
                Constraint::Length(1),
            ])
            .split(f.area());

        f.render_widget(
            SnapshotPanel::new(view.snapshot.as_ref(), view.loading),
            chunks[0],
        );

        if let Some(notice) = view
            .notice
            .as_ref()
            .filter(|notice| !notice.is_expired(Instant::now()))
        {
            f.render_widget(
                Paragraph::new(Line::styled(
                    format!(" {}", notice.message),
                    Style::default().fg(ACCENT_ERROR),
                )),
                chunks[1],
            );
        }

        f.render_widget(PlayerBar::new(&view), chunks[2]);
        let hints = if self.is_scrubbing() {
            SCRUB_HINTS
        } else {
            HINTS
        };
        f.render_widget(KeyHints::new(hints), chunks[3]);
    }
}
