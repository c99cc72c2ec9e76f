use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Selectable tick periods.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u64", into = "u64")]
pub enum StepSpeed {
    Ms100,
    Ms250,
    Ms500,
    #[default]
    Ms1000,
    Ms2000,
    Ms5000,
    Ms10000,
}

impl StepSpeed {
    /// Fastest first.
    pub const ALL: [StepSpeed; 7] = [
        StepSpeed::Ms100,
        StepSpeed::Ms250,
        StepSpeed::Ms500,
        StepSpeed::Ms1000,
        StepSpeed::Ms2000,
        StepSpeed::Ms5000,
        StepSpeed::Ms10000,
    ];

    pub fn as_millis(&self) -> u64 {
        match self {
            StepSpeed::Ms100 => 100,
            StepSpeed::Ms250 => 250,
            StepSpeed::Ms500 => 500,
            StepSpeed::Ms1000 => 1000,
            StepSpeed::Ms2000 => 2000,
            StepSpeed::Ms5000 => 5000,
            StepSpeed::Ms10000 => 10000,
        }
    }

    pub fn from_millis(ms: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|speed| speed.as_millis() == ms)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.as_millis())
    }

    /// Label shown in the speed selector.
    pub fn label(&self) -> &'static str {
        match self {
            StepSpeed::Ms100 => "0.1s",
            StepSpeed::Ms250 => "0.25s",
            StepSpeed::Ms500 => "0.5s",
            StepSpeed::Ms1000 => "1s",
            StepSpeed::Ms2000 => "2s",
            StepSpeed::Ms5000 => "5s",
            StepSpeed::Ms10000 => "10s",
        }
    }

    /// Next shorter period, saturating at the fastest.
    pub fn faster(&self) -> Self {
        let idx = self.position();
        Self::ALL[idx.saturating_sub(1)]
    }

    /// Next longer period, saturating at the slowest.
    pub fn slower(&self) -> Self {
        let idx = self.position();
        Self::ALL[(idx + 1).min(Self::ALL.len() - 1)]
    }

    fn position(&self) -> usize {
        Self::ALL
            .iter()
            .position(|speed| speed == self)
            .unwrap_or_default()
    }
}

impl TryFrom<u64> for StepSpeed {
    type Error = String;

    fn try_from(ms: u64) -> Result<Self, Self::Error> {
        Self::from_millis(ms).ok_or_else(|| {
            let allowed: Vec<String> = Self::ALL.iter().map(|s| s.as_millis().to_string()).collect();
            format!("invalid step interval {ms}ms (expected one of {})", allowed.join(", "))
        })
    }
}

impl From<StepSpeed> for u64 {
    fn from(speed: StepSpeed) -> Self {
        speed.as_millis()
    }
}

/// How automatic advance picks the next index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Step through recorded points one at a time.
    #[default]
    Replay,
    /// Follow the newest point of a running experiment.
    Live,
}

impl PlaybackMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaybackMode::Replay => "Replay",
            PlaybackMode::Live => "Live",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, PlaybackMode::Live)
    }
}

/// Transient player state, owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    pub interval: StepSpeed,
    pub mode: PlaybackMode,
    pub is_slider_dragging: bool,
}

impl PlaybackState {
    pub fn new(interval: StepSpeed) -> Self {
        Self {
            current_index: 0,
            is_playing: false,
            interval,
            mode: PlaybackMode::Replay,
            is_slider_dragging: false,
        }
    }

    /// Fields the advance timer depends on.
    pub(crate) fn timer_deps(&self) -> (bool, StepSpeed, usize, PlaybackMode) {
        (self.is_playing, self.interval, self.current_index, self.mode)
    }
}
