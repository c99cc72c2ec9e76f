//! Scripted in-memory timeline store.
//!
//! Serves a fixed timeline, appends queued points on `refresh`, and records
//! every call so tests can assert on fetch traffic. Delays use
//! `tokio::time::sleep`, so they respect a paused test clock.
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use society_console::store::{ExperimentStatus, MockTimelineStore};
//! use society_console::timeline::TimelinePoint;
//!
//! let store = MockTimelineStore::with_points(5)
//!     .with_status(ExperimentStatus::Running)
//!     .with_fetch_delay(Duration::from_millis(20));
//! store.queue_points(vec![TimelinePoint::new(0, 300.0)]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::store::{AgentStatus, Experiment, ExperimentStatus, Snapshot, StoreError, TimelineStore};
use crate::timeline::{Timeline, TimelinePoint};

#[derive(Default)]
struct MockState {
    timeline: Timeline,
    experiment: Option<Experiment>,
    /// Points appended by the next successful refresh.
    queued: Vec<TimelinePoint>,
    /// Status applied by the next successful refresh.
    queued_status: Option<ExperimentStatus>,
    refresh_failures: VecDeque<String>,
    fetch_failures: VecDeque<String>,
    fetched: Vec<TimelinePoint>,
    refresh_count: usize,
}

/// In-memory [`TimelineStore`] for tests and offline demos.
#[derive(Clone)]
pub struct MockTimelineStore {
    state: Arc<Mutex<MockState>>,
    fetch_delay: Duration,
    refresh_delay: Duration,
    /// Per-point fetch delays, keyed by `(day, t bits)`.
    point_delays: HashMap<(u32, u64), Duration>,
}

impl MockTimelineStore {
    pub fn new(points: Vec<TimelinePoint>) -> Self {
        let state = MockState {
            timeline: Timeline::from(points),
            experiment: Some(Experiment {
                id: Uuid::nil(),
                name: "mock experiment".to_string(),
                status: ExperimentStatus::Completed,
                num_day: Some(1),
                cur_day: None,
                cur_t: None,
            }),
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            fetch_delay: Duration::ZERO,
            refresh_delay: Duration::ZERO,
            point_delays: HashMap::new(),
        }
    }

    /// Timeline of `count` points one simulated minute apart on day 0.
    pub fn with_points(count: usize) -> Self {
        Self::new(Self::minute_points(0, count))
    }

    /// `count` points starting at minute `start`, one minute apart.
    pub fn minute_points(start: usize, count: usize) -> Vec<TimelinePoint> {
        (start..start + count)
            .map(|minute| TimelinePoint::new(0, minute as f64 * 60.0))
            .collect()
    }

    pub fn with_status(self, status: ExperimentStatus) -> Self {
        if let Some(experiment) = self.state.lock().experiment.as_mut() {
            experiment.status = status;
        }
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Override the fetch delay for the point at `index`.
    pub fn with_point_delay(mut self, index: usize, delay: Duration) -> Self {
        let point = self.state.lock().timeline.get(index);
        if let Some(point) = point {
            self.point_delays.insert(key(&point), delay);
        }
        self
    }

    /// Points the next successful refresh will append.
    pub fn queue_points(&self, points: Vec<TimelinePoint>) {
        self.state.lock().queued.extend(points);
    }

    /// Status the next successful refresh will report.
    pub fn queue_status(&self, status: ExperimentStatus) {
        self.state.lock().queued_status = Some(status);
    }

    pub fn fail_next_refresh(&self, message: impl Into<String>) {
        self.state.lock().refresh_failures.push_back(message.into());
    }

    pub fn fail_next_fetch(&self, message: impl Into<String>) {
        self.state.lock().fetch_failures.push_back(message.into());
    }

    /// Every point passed to `fetch_by_time`, in call order.
    pub fn fetched(&self) -> Vec<TimelinePoint> {
        self.state.lock().fetched.clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.state.lock().refresh_count
    }
}

fn key(point: &TimelinePoint) -> (u32, u64) {
    (point.day, point.t.to_bits())
}

#[async_trait]
impl TimelineStore for MockTimelineStore {
    fn timeline(&self) -> Timeline {
        self.state.lock().timeline.clone()
    }

    fn timeline_len(&self) -> usize {
        self.state.lock().timeline.len()
    }

    fn point(&self, index: usize) -> Option<TimelinePoint> {
        self.state.lock().timeline.get(index)
    }

    fn experiment(&self) -> Option<Experiment> {
        self.state.lock().experiment.clone()
    }

    async fn refresh(&self) -> Result<(), StoreError> {
        self.state.lock().refresh_count += 1;

        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }

        let mut state = self.state.lock();
        if let Some(message) = state.refresh_failures.pop_front() {
            return Err(StoreError::Unavailable(message));
        }

        let queued = std::mem::take(&mut state.queued);
        state.timeline.merge(queued);
        if let Some(status) = state.queued_status.take() {
            if let Some(experiment) = state.experiment.as_mut() {
                experiment.status = status;
            }
        }
        Ok(())
    }

    async fn fetch_by_time(&self, point: TimelinePoint) -> Result<Snapshot, StoreError> {
        self.state.lock().fetched.push(point);

        let delay = self
            .point_delays
            .get(&key(&point))
            .copied()
            .unwrap_or(self.fetch_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.state.lock().fetch_failures.pop_front() {
            return Err(StoreError::Unavailable(message));
        }

        let agents = vec![AgentStatus {
            id: 1,
            lng: None,
            lat: None,
            action: Some(format!("act@{}", point.clock())),
            extra: Default::default(),
        }];
        Ok(Snapshot { point, agents })
    }
}
