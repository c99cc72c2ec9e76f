//! Recorded simulation time points.
//!
//! A timeline is the ordered list of `(day, t)` pairs an experiment has
//! recorded so far. It only ever grows during a session.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One recorded simulation instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub day: u32,
    /// Seconds since the start of `day`.
    pub t: f64,
}

impl TimelinePoint {
    /// Point shown when no timeline has been recorded yet.
    pub const SENTINEL: TimelinePoint = TimelinePoint { day: 0, t: 0.0 };

    pub fn new(day: u32, t: f64) -> Self {
        Self { day, t }
    }

    /// Chronological comparison by day, then time of day.
    pub fn chrono_cmp(&self, other: &Self) -> Ordering {
        self.day
            .cmp(&other.day)
            .then_with(|| self.t.total_cmp(&other.t))
    }

    pub fn is_after(&self, other: &Self) -> bool {
        self.chrono_cmp(other) == Ordering::Greater
    }

    /// `HH:MM:SS` rendering of the time of day.
    pub fn clock(&self) -> String {
        format_time_of_day(self.t)
    }
}

impl fmt::Display for TimelinePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {} {}", self.day, self.clock())
    }
}

/// Format seconds-since-midnight as `HH:MM:SS`.
///
/// Negative and non-finite inputs render as `00:00:00`.
pub fn format_time_of_day(t: f64) -> String {
    let total = if t.is_finite() && t > 0.0 {
        t.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Append-only, chronologically ordered sequence of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    points: Vec<TimelinePoint>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TimelinePoint> {
        self.points.get(index).copied()
    }

    pub fn last(&self) -> Option<TimelinePoint> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[TimelinePoint] {
        &self.points
    }

    /// Merge a freshly fetched timeline into this one.
    ///
    /// Only points strictly later than the current last point are appended;
    /// existing entries are never reordered or dropped. Returns how many
    /// points were added.
    pub fn merge(&mut self, fetched: impl IntoIterator<Item = TimelinePoint>) -> usize {
        let before = self.points.len();
        for point in fetched {
            match self.last() {
                Some(last) if !point.is_after(&last) => continue,
                _ => self.points.push(point),
            }
        }
        self.points.len() - before
    }
}

impl From<Vec<TimelinePoint>> for Timeline {
    fn from(points: Vec<TimelinePoint>) -> Self {
        let mut timeline = Timeline::new();
        timeline.merge(points);
        timeline
    }
}
