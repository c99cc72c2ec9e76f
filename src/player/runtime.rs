//! Tokio driver for the playback controller.
//!
//! One task owns the controller and the single advance timer. Store calls
//! run as spawned tasks and report back over a channel, so a slow fetch or
//! refresh never blocks operator input. Results are matched against the
//! controller's request identities before they touch the view.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::player::controller::{PlaybackController, PlayerEffect, RefreshPurpose, TimerDirective};
use crate::player::state::{PlaybackMode, PlaybackState, StepSpeed};
use crate::store::{Experiment, ExperimentStatus, Snapshot, StoreError, TimelineStore};
use crate::timeline::TimelinePoint;

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Commands from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    SetPlaying(bool),
    TogglePlaying,
    SetInterval(StepSpeed),
    SetMode(PlaybackMode),
    StepForward,
    StepBackward,
    Seek(usize),
    SeekCommit(usize),
    Reload,
    ObserveStatus(ExperimentStatus),
    Shutdown,
}

/// Completion of a spawned store call.
enum TaskEvent {
    Snapshot {
        seq: u64,
        result: Result<Snapshot, StoreError>,
    },
    Refreshed {
        purpose: RefreshPurpose,
        result: Result<(), StoreError>,
    },
}

/// Transient message for the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub raised_at: Instant,
}

impl Notice {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= NOTICE_TTL
    }
}

/// Read-only picture of the player for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub state: PlaybackState,
    pub timeline_len: usize,
    pub current_point: TimelinePoint,
    pub experiment: Option<Experiment>,
    pub mode_options: Vec<PlaybackMode>,
    /// Last accepted snapshot.
    pub snapshot: Option<Snapshot>,
    /// A fetch for the current index is outstanding.
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl PlayerView {
    pub fn status(&self) -> ExperimentStatus {
        self.experiment
            .as_ref()
            .map(|experiment| experiment.status)
            .unwrap_or_default()
    }

    pub fn at_start(&self) -> bool {
        self.state.current_index == 0
    }

    pub fn at_end(&self) -> bool {
        self.timeline_len == 0 || self.state.current_index + 1 >= self.timeline_len
    }
}

/// Startup options for a player.
#[derive(Debug, Clone, Copy)]
pub struct PlayerOptions {
    pub interval: StepSpeed,
    pub mode: PlaybackMode,
    /// Load the timeline from the store before the first render.
    pub refresh_on_start: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            interval: StepSpeed::default(),
            mode: PlaybackMode::Replay,
            refresh_on_start: true,
        }
    }
}

/// Handle to control a running player.
#[derive(Clone)]
pub struct PlayerHandle {
    cmd_tx: mpsc::UnboundedSender<PlayerCommand>,
    view_rx: watch::Receiver<PlayerView>,
}

impl PlayerHandle {
    pub fn send(&self, command: PlayerCommand) {
        if self.cmd_tx.send(command).is_err() {
            tracing::debug!(?command, "Player runtime is gone; command dropped");
        }
    }

    pub fn set_playing(&self, playing: bool) {
        self.send(PlayerCommand::SetPlaying(playing));
    }

    pub fn toggle_playing(&self) {
        self.send(PlayerCommand::TogglePlaying);
    }

    pub fn set_interval(&self, interval: StepSpeed) {
        self.send(PlayerCommand::SetInterval(interval));
    }

    pub fn set_mode(&self, mode: PlaybackMode) {
        self.send(PlayerCommand::SetMode(mode));
    }

    pub fn step_forward(&self) {
        self.send(PlayerCommand::StepForward);
    }

    pub fn step_backward(&self) {
        self.send(PlayerCommand::StepBackward);
    }

    pub fn seek(&self, index: usize) {
        self.send(PlayerCommand::Seek(index));
    }

    pub fn seek_commit(&self, index: usize) {
        self.send(PlayerCommand::SeekCommit(index));
    }

    pub fn reload(&self) {
        self.send(PlayerCommand::Reload);
    }

    pub fn observe_status(&self, status: ExperimentStatus) {
        self.send(PlayerCommand::ObserveStatus(status));
    }

    pub fn shutdown(&self) {
        self.send(PlayerCommand::Shutdown);
    }

    /// Latest published view.
    pub fn view(&self) -> PlayerView {
        self.view_rx.borrow().clone()
    }

    /// Receiver that wakes on every published view.
    pub fn subscribe(&self) -> watch::Receiver<PlayerView> {
        self.view_rx.clone()
    }
}

pub struct PlayerRuntime {
    controller: PlaybackController,
    store: Arc<dyn TimelineStore>,
    cmd_rx: mpsc::UnboundedReceiver<PlayerCommand>,
    task_tx: mpsc::UnboundedSender<TaskEvent>,
    task_rx: mpsc::UnboundedReceiver<TaskEvent>,
    view_tx: watch::Sender<PlayerView>,
    /// The only advance timer; replaced wholesale on every directive.
    timer: Option<Interval>,
    snapshot: Option<Snapshot>,
    loading: bool,
    notice: Option<Notice>,
}

impl PlayerRuntime {
    /// Spawn the player task and return a handle to control it.
    pub fn spawn(store: Arc<dyn TimelineStore>, options: PlayerOptions) -> PlayerHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let controller = PlaybackController::new(options.interval);

        let initial = PlayerView {
            state: *controller.state(),
            timeline_len: store.timeline_len(),
            current_point: store.point(0).unwrap_or(TimelinePoint::SENTINEL),
            experiment: store.experiment(),
            mode_options: controller.mode_options(),
            snapshot: None,
            loading: false,
            notice: None,
        };
        let (view_tx, view_rx) = watch::channel(initial);

        let runtime = Self {
            controller,
            store,
            cmd_rx,
            task_tx,
            task_rx,
            view_tx,
            timer: None,
            snapshot: None,
            loading: false,
            notice: None,
        };
        tokio::spawn(runtime.run(options));

        PlayerHandle { cmd_tx, view_rx }
    }

    async fn run(mut self, options: PlayerOptions) {
        if options.refresh_on_start {
            if let Err(err) = self.store.refresh().await {
                self.raise("Failed to load timeline", &err);
            }
        }

        let status = self.current_status();
        let effects = self
            .controller
            .bootstrap(self.store.timeline_len(), status);
        self.apply(effects);
        if options.mode.is_live() {
            let effects = self.controller.set_mode(options.mode);
            self.apply(effects);
        }
        self.publish();

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(PlayerCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                Some(event) = self.task_rx.recv() => self.handle_task_event(event),
                _ = next_tick(&mut self.timer) => {
                    let effects = self.controller.tick();
                    self.apply(effects);
                }
            }
            self.publish();
        }

        tracing::debug!("Player runtime stopped");
    }

    fn handle_command(&mut self, cmd: PlayerCommand) {
        let c = &mut self.controller;
        let effects = match cmd {
            PlayerCommand::SetPlaying(playing) => c.set_playing(playing),
            PlayerCommand::TogglePlaying => c.toggle_playing(),
            PlayerCommand::SetInterval(interval) => c.set_interval(interval),
            PlayerCommand::SetMode(mode) => c.set_mode(mode),
            PlayerCommand::StepForward => c.step_forward(),
            PlayerCommand::StepBackward => c.step_backward(),
            PlayerCommand::Seek(index) => c.seek(index),
            PlayerCommand::SeekCommit(index) => c.seek_commit(index),
            PlayerCommand::Reload => c.reload(),
            PlayerCommand::ObserveStatus(status) => c.observe_status(status),
            PlayerCommand::Shutdown => Vec::new(),
        };
        self.apply(effects);
    }

    fn handle_task_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Snapshot { seq, result } => {
                if !self.controller.is_current_fetch(seq) {
                    tracing::debug!(seq, "Discarding stale snapshot");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(snapshot) => self.snapshot = Some(snapshot),
                    Err(err) => self.raise("Failed to load snapshot", &err),
                }
            }
            TaskEvent::Refreshed { purpose, result } => match result {
                Ok(()) => {
                    let len = self.store.timeline_len();
                    let status = self.current_status();
                    let mut effects = self.controller.refresh_completed(purpose, len);
                    effects.extend(self.controller.observe_status(status));
                    self.apply(effects);
                }
                Err(err) => {
                    self.controller.refresh_failed(purpose);
                    self.raise("Failed to refresh timeline", &err);
                }
            },
        }
    }

    fn apply(&mut self, effects: Vec<PlayerEffect>) {
        for effect in effects {
            match effect {
                PlayerEffect::Fetch { seq, index } => self.spawn_fetch(seq, index),
                PlayerEffect::Refresh(purpose) => self.spawn_refresh(purpose),
                PlayerEffect::Timer(TimerDirective::Start { period }) => {
                    let mut interval = interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.timer = Some(interval);
                }
                PlayerEffect::Timer(TimerDirective::Stop) => self.timer = None,
            }
        }
    }

    fn spawn_fetch(&mut self, seq: u64, index: usize) {
        let Some(point) = self.store.point(index) else {
            tracing::warn!(index, "Fetch requested past the end of the timeline");
            return;
        };
        tracing::debug!(seq, index, %point, "Fetching snapshot");

        self.loading = true;
        let store = Arc::clone(&self.store);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = store.fetch_by_time(point).await;
            let _ = tx.send(TaskEvent::Snapshot { seq, result });
        });
    }

    fn spawn_refresh(&mut self, purpose: RefreshPurpose) {
        tracing::debug!(?purpose, "Refreshing timeline");
        let store = Arc::clone(&self.store);
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = store.refresh().await;
            let _ = tx.send(TaskEvent::Refreshed { purpose, result });
        });
    }

    fn current_status(&self) -> ExperimentStatus {
        self.store
            .experiment()
            .map(|experiment| experiment.status)
            .unwrap_or_default()
    }

    fn raise(&mut self, context: &str, err: &StoreError) {
        tracing::warn!(error = %err, "{}", context);
        self.notice = Some(Notice {
            message: format!("{context}: {err}"),
            raised_at: Instant::now(),
        });
    }

    fn publish(&self) {
        let state = *self.controller.state();
        let view = PlayerView {
            state,
            timeline_len: self.controller.timeline_len(),
            current_point: self
                .store
                .point(state.current_index)
                .unwrap_or(TimelinePoint::SENTINEL),
            experiment: self.store.experiment(),
            mode_options: self.controller.mode_options(),
            snapshot: self.snapshot.clone(),
            loading: self.loading,
            notice: self.notice.clone(),
        };
        self.view_tx.send_replace(view);
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
