use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::schema::Run;

/// Bounded, insertion-ordered log of completed runs.
///
/// Constructed once at startup and shared through `Arc` by the
/// orchestrator (writer) and the dispatcher (readers).
///
/// GUARANTEES:
/// - Only terminal runs are ever inserted
/// - `len() <= capacity` after every append
/// - Overflow evicts the oldest run first
/// - Every operation holds the lock for its whole duration
pub struct RunHistory {
    runs: RwLock<VecDeque<Arc<Run>>>,
    capacity: usize,
}

impl RunHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            runs: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a run, evicting the oldest entries beyond capacity.
    pub async fn append(&self, run: Arc<Run>) {
        let mut runs = self.runs.write().await;
        runs.push_back(run);
        while runs.len() > self.capacity {
            runs.pop_front();
        }
    }

    /// The last `n` runs, oldest first.
    pub async fn recent(&self, n: usize) -> Vec<Arc<Run>> {
        let runs = self.runs.read().await;
        let skip = runs.len().saturating_sub(n);
        runs.iter().skip(skip).cloned().collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Option<Arc<Run>> {
        let runs = self.runs.read().await;
        runs.iter().find(|r| r.id == id).cloned()
    }

    pub async fn latest(&self) -> Option<Arc<Run>> {
        self.runs.read().await.back().cloned()
    }

    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }
}
