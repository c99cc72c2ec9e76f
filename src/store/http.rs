use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::store::{AgentStatus, Experiment, Snapshot, StoreError, TimelineStore};
use crate::timeline::{Timeline, TimelinePoint};

/// Snapshots kept per store.
const SNAPSHOT_CACHE_CAPACITY: usize = 64;

type PointKey = (u32, u64);

/// Least-recently-used snapshot cache keyed by `(day, t bits)`.
struct SnapshotCache {
    entries: HashMap<PointKey, Snapshot>,
    /// Keys from least to most recently used.
    order: VecDeque<PointKey>,
    capacity: usize,
}

impl SnapshotCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    fn key(point: &TimelinePoint) -> PointKey {
        (point.day, point.t.to_bits())
    }

    fn touch(&mut self, key: PointKey) {
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key);
    }

    fn get(&mut self, point: &TimelinePoint) -> Option<Snapshot> {
        let key = Self::key(point);
        let snapshot = self.entries.get(&key).cloned()?;
        self.touch(key);
        Some(snapshot)
    }

    fn insert(&mut self, snapshot: Snapshot) {
        let key = Self::key(&snapshot.point);
        self.entries.insert(key, snapshot);
        self.touch(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Timeline store backed by the platform's experiment endpoints.
pub struct HttpTimelineStore {
    api: ApiClient,
    experiment_id: Uuid,
    timeline: RwLock<Timeline>,
    experiment: RwLock<Option<Experiment>>,
    snapshots: Mutex<SnapshotCache>,
}

impl HttpTimelineStore {
    pub fn new(api: ApiClient, experiment_id: Uuid) -> Self {
        Self {
            api,
            experiment_id,
            timeline: RwLock::new(Timeline::new()),
            experiment: RwLock::new(None),
            snapshots: Mutex::new(SnapshotCache::new(SNAPSHOT_CACHE_CAPACITY)),
        }
    }

    pub fn experiment_id(&self) -> Uuid {
        self.experiment_id
    }

    fn cached(&self, point: &TimelinePoint) -> Option<Snapshot> {
        self.snapshots.lock().get(point)
    }
}

#[async_trait]
impl TimelineStore for HttpTimelineStore {
    fn timeline(&self) -> Timeline {
        self.timeline.read().clone()
    }

    fn timeline_len(&self) -> usize {
        self.timeline.read().len()
    }

    fn point(&self, index: usize) -> Option<TimelinePoint> {
        self.timeline.read().get(index)
    }

    fn experiment(&self) -> Option<Experiment> {
        self.experiment.read().clone()
    }

    async fn refresh(&self) -> Result<(), StoreError> {
        let id = self.experiment_id;
        let experiment: Experiment = self
            .api
            .get_data(&format!("/api/experiments/{id}"), &[])
            .await?;
        let points: Vec<TimelinePoint> = self
            .api
            .get_data(&format!("/api/experiments/{id}/timeline"), &[])
            .await?;

        let added = self.timeline.write().merge(points);
        tracing::debug!(
            experiment = %id,
            status = ?experiment.status,
            added,
            "Refreshed experiment timeline"
        );
        *self.experiment.write() = Some(experiment);
        Ok(())
    }

    async fn fetch_by_time(&self, point: TimelinePoint) -> Result<Snapshot, StoreError> {
        if let Some(snapshot) = self.cached(&point) {
            return Ok(snapshot);
        }

        let id = self.experiment_id;
        let agents: Vec<AgentStatus> = self
            .api
            .get_data(
                &format!("/api/experiments/{id}/agents/-/status"),
                &[("day", point.day.to_string()), ("t", point.t.to_string())],
            )
            .await?;

        let snapshot = Snapshot { point, agents };
        let cached = {
            let mut snapshots = self.snapshots.lock();
            snapshots.insert(snapshot.clone());
            snapshots.len()
        };
        tracing::trace!(%point, cached, "Cached snapshot");
        Ok(snapshot)
    }
}
