//! Playback state machine.
//!
//! The controller never touches the network or the clock. Each operation
//! mutates [`PlaybackState`] and returns the side effects the runtime must
//! carry out: snapshot fetches, store refreshes, and timer directives.
//!
//! All operations funnel through [`PlaybackController::finish`], which
//! compares the state before and after the change. That single comparison is
//! what decides whether a fetch is due and whether the advance timer must be
//! re-armed, so no operation starts or stops the timer on its own.

use std::time::Duration;

use crate::player::state::{PlaybackMode, PlaybackState, StepSpeed};
use crate::store::ExperimentStatus;

/// What the runtime should do with its advance timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerDirective {
    /// Drop any armed timer and arm a new one whose first tick is one
    /// `period` from now.
    Start { period: Duration },
    /// Drop any armed timer.
    Stop,
}

/// Why a store refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPurpose {
    /// Live-mode advance; the index jumps to the newest point if the epoch
    /// is still current when the refresh lands.
    LiveTick { epoch: u64 },
    /// Operator-requested reload; never moves the index.
    Reload,
}

/// Side effects produced by a controller transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEffect {
    /// Load the snapshot for the point at `index`. `seq` identifies the
    /// request; only the latest one may update the display.
    Fetch { seq: u64, index: usize },
    Refresh(RefreshPurpose),
    Timer(TimerDirective),
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    state: PlaybackState,
    timeline_len: usize,
    status: ExperimentStatus,
    /// Sequence number of the most recently issued fetch.
    fetch_seq: u64,
    /// Bumped on every accepted mode change; tags live refreshes.
    live_epoch: u64,
    live_refresh_pending: bool,
}

impl PlaybackController {
    pub fn new(interval: StepSpeed) -> Self {
        Self {
            state: PlaybackState::new(interval),
            timeline_len: 0,
            status: ExperimentStatus::default(),
            fetch_seq: 0,
            live_epoch: 0,
            live_refresh_pending: false,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn timeline_len(&self) -> usize {
        self.timeline_len
    }

    pub fn status(&self) -> ExperimentStatus {
        self.status
    }

    pub fn live_epoch(&self) -> u64 {
        self.live_epoch
    }

    fn last_index(&self) -> Option<usize> {
        self.timeline_len.checked_sub(1)
    }

    /// Modes the operator may currently choose from.
    pub fn mode_options(&self) -> Vec<PlaybackMode> {
        let mut options = vec![PlaybackMode::Replay];
        if self.status.allows_live() {
            options.push(PlaybackMode::Live);
        }
        options
    }

    /// Whether a fetch result with this sequence number may be displayed.
    pub fn is_current_fetch(&self, seq: u64) -> bool {
        seq == self.fetch_seq
    }

    /// Effects to issue right after the player is created, once the
    /// timeline length is known.
    pub fn bootstrap(&mut self, timeline_len: usize, status: ExperimentStatus) -> Vec<PlayerEffect> {
        let before = self.state;
        self.status = status;
        self.set_timeline_len(timeline_len);
        self.finish(before, timeline_len > 0)
    }

    pub fn set_playing(&mut self, playing: bool) -> Vec<PlayerEffect> {
        let before = self.state;
        self.state.is_playing = playing;
        self.finish(before, false)
    }

    pub fn toggle_playing(&mut self) -> Vec<PlayerEffect> {
        self.set_playing(!self.state.is_playing)
    }

    pub fn set_interval(&mut self, interval: StepSpeed) -> Vec<PlayerEffect> {
        let before = self.state;
        self.state.interval = interval;
        self.finish(before, false)
    }

    /// Switch between replay and live.
    ///
    /// Live is refused unless the experiment is running; the refusal is
    /// silent because the option is not offered in that case.
    pub fn set_mode(&mut self, mode: PlaybackMode) -> Vec<PlayerEffect> {
        if mode == self.state.mode {
            return Vec::new();
        }
        if mode.is_live() && !self.status.allows_live() {
            tracing::debug!(status = ?self.status, "Ignoring live mode request");
            return Vec::new();
        }

        let before = self.state;
        self.enter_mode(mode);
        self.finish(before, false)
    }

    fn enter_mode(&mut self, mode: PlaybackMode) {
        self.state.mode = mode;
        self.live_epoch += 1;
        self.live_refresh_pending = false;
    }

    /// Record an externally observed experiment status.
    ///
    /// Leaving the running state while in live mode forces replay mode.
    pub fn observe_status(&mut self, status: ExperimentStatus) -> Vec<PlayerEffect> {
        let before = self.state;
        if status != self.status {
            tracing::debug!(from = ?self.status, to = ?status, "Experiment status changed");
        }
        self.status = status;
        if self.state.mode.is_live() && !status.allows_live() {
            tracing::info!(status = ?status, "Experiment no longer running; leaving live mode");
            self.enter_mode(PlaybackMode::Replay);
        }
        self.finish(before, false)
    }

    pub fn step_forward(&mut self) -> Vec<PlayerEffect> {
        match self.state.mode {
            PlaybackMode::Replay => {
                let before = self.state;
                self.advance_replay();
                self.finish(before, false)
            }
            PlaybackMode::Live => self.request_live_refresh(),
        }
    }

    pub fn step_backward(&mut self) -> Vec<PlayerEffect> {
        let before = self.state;
        if self.state.current_index > 0 {
            self.state.current_index -= 1;
        }
        self.finish(before, false)
    }

    /// Slider moved: show the position immediately but defer the fetch.
    pub fn seek(&mut self, index: usize) -> Vec<PlayerEffect> {
        let before = self.state;
        self.state.is_slider_dragging = true;
        self.state.is_playing = false;
        self.state.current_index = self.clamp_index(index);
        self.finish(before, false)
    }

    /// Slider released: settle on `index` and fetch it once.
    pub fn seek_commit(&mut self, index: usize) -> Vec<PlayerEffect> {
        let before = self.state;
        self.state.is_slider_dragging = false;
        self.state.current_index = self.clamp_index(index);
        self.finish(before, true)
    }

    /// One automatic advance.
    pub fn tick(&mut self) -> Vec<PlayerEffect> {
        if !self.state.is_playing {
            tracing::debug!("Tick while paused ignored");
            return Vec::new();
        }
        match self.state.mode {
            PlaybackMode::Replay => {
                let before = self.state;
                self.advance_replay();
                self.finish(before, false)
            }
            PlaybackMode::Live => self.request_live_refresh(),
        }
    }

    /// Move one point forward; playback stops on reaching the last point so
    /// no further tick fires.
    fn advance_replay(&mut self) {
        match self.last_index() {
            Some(last) if self.state.current_index < last => {
                self.state.current_index += 1;
                if self.state.current_index == last {
                    self.state.is_playing = false;
                }
            }
            _ => self.state.is_playing = false,
        }
    }

    fn request_live_refresh(&mut self) -> Vec<PlayerEffect> {
        if self.live_refresh_pending {
            return Vec::new();
        }
        self.live_refresh_pending = true;
        vec![PlayerEffect::Refresh(RefreshPurpose::LiveTick {
            epoch: self.live_epoch,
        })]
    }

    /// Operator asked to reload the timeline without moving.
    pub fn reload(&mut self) -> Vec<PlayerEffect> {
        vec![PlayerEffect::Refresh(RefreshPurpose::Reload)]
    }

    /// A store refresh finished and the timeline now has `timeline_len` points.
    pub fn refresh_completed(
        &mut self,
        purpose: RefreshPurpose,
        timeline_len: usize,
    ) -> Vec<PlayerEffect> {
        let before = self.state;
        let was_empty = self.timeline_len == 0;
        self.set_timeline_len(timeline_len);

        if let RefreshPurpose::LiveTick { epoch } = purpose {
            if epoch == self.live_epoch {
                self.live_refresh_pending = false;
                if let Some(last) = self.last_index() {
                    self.state.current_index = last;
                }
            } else {
                tracing::debug!(
                    epoch,
                    current = self.live_epoch,
                    "Discarding live refresh from a previous mode"
                );
            }
        }

        self.finish(before, was_empty && timeline_len > 0)
    }

    /// A store refresh failed; playback continues from the last good index.
    pub fn refresh_failed(&mut self, purpose: RefreshPurpose) {
        if let RefreshPurpose::LiveTick { epoch } = purpose {
            if epoch == self.live_epoch {
                self.live_refresh_pending = false;
            }
        }
    }

    fn set_timeline_len(&mut self, len: usize) {
        self.timeline_len = len;
        self.state.current_index = self.clamp_index(self.state.current_index);
    }

    fn clamp_index(&self, index: usize) -> usize {
        self.last_index().map_or(0, |last| index.min(last))
    }

    /// Reconcile fetches and the timer against the state before a change.
    fn finish(&mut self, before: PlaybackState, force_fetch: bool) -> Vec<PlayerEffect> {
        let after = self.state;
        let mut effects = Vec::new();

        let index_changed = before.current_index != after.current_index;
        let drag_released = before.is_slider_dragging && !after.is_slider_dragging;
        if (index_changed || drag_released || force_fetch)
            && !after.is_slider_dragging
            && self.timeline_len > 0
        {
            self.fetch_seq += 1;
            effects.push(PlayerEffect::Fetch {
                seq: self.fetch_seq,
                index: after.current_index,
            });
        }

        if before.timer_deps() != after.timer_deps() {
            if after.is_playing {
                effects.push(PlayerEffect::Timer(TimerDirective::Start {
                    period: after.interval.period(),
                }));
            } else if before.is_playing {
                effects.push(PlayerEffect::Timer(TimerDirective::Stop));
            }
        }

        effects
    }
}
