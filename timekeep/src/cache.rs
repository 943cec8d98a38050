//! Read-through query cache keyed by what a screen asks for.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::domain::{Category, CategoryId, PaidFilter, Period, Project, ProjectDetail, ProjectId, Statistics};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Categories,
    Projects { category: Option<CategoryId> },
    /// A project together with its timers.
    Project(ProjectId),
    Statistics { period: Period, paid_filter: PaidFilter },
}

impl QueryKey {
    pub fn is_projects(&self) -> bool {
        matches!(self, QueryKey::Projects { .. })
    }

    pub fn is_statistics(&self) -> bool {
        matches!(self, QueryKey::Statistics { .. })
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Categories => write!(f, "categories"),
            QueryKey::Projects { category: None } => write!(f, "projects"),
            QueryKey::Projects {
                category: Some(id),
            } => write!(f, "projects?category={}", id),
            QueryKey::Project(id) => write!(f, "project/{}", id),
            QueryKey::Statistics {
                period,
                paid_filter,
            } => write!(f, "statistics/{}?paid={}", period, paid_filter),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Categories(Vec<Category>),
    Projects(Vec<Project>),
    Project(ProjectDetail),
    Statistics(Statistics),
}

/// Which cached entries a mutation makes stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidate {
    Key(QueryKey),
    AllProjects,
    AllStatistics,
}

impl Invalidate {
    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Invalidate::Key(k) => k == key,
            Invalidate::AllProjects => key.is_projects(),
            Invalidate::AllStatistics => key.is_statistics(),
        }
    }
}

/// Shared query results plus a broadcast of invalidated keys.
///
/// Clones share the same entries and channel.
#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, QueryData>>>,
    invalidated: broadcast::Sender<QueryKey>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (invalidated, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            invalidated,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, QueryData>> {
        self.entries.lock().expect("query cache lock poisoned")
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.invalidated.subscribe()
    }

    pub fn get(&self, key: &QueryKey) -> Option<QueryData> {
        let hit = self.lock().get(key).cloned();
        tracing::trace!(key = %key, hit = hit.is_some(), "cache lookup");
        hit
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn insert(&self, key: QueryKey, data: QueryData) {
        self.lock().insert(key, data);
    }

    /// Drop every entry matched by `targets` and notify subscribers.
    ///
    /// Exact keys are announced even when nothing was cached, so a screen
    /// whose first fetch failed still gets a chance to retry.
    pub fn invalidate(&self, targets: &[Invalidate]) -> Vec<QueryKey> {
        let mut removed: Vec<QueryKey> = {
            let mut entries = self.lock();
            let stale: Vec<QueryKey> = entries
                .keys()
                .filter(|key| targets.iter().any(|t| t.matches(key)))
                .cloned()
                .collect();
            for key in &stale {
                entries.remove(key);
            }
            stale
        };

        for target in targets {
            if let Invalidate::Key(key) = target {
                if !removed.contains(key) {
                    removed.push(key.clone());
                }
            }
        }

        for key in &removed {
            tracing::debug!(key = %key, "invalidated");
            // No receivers is fine: nobody is looking at that data.
            let _ = self.invalidated.send(key.clone());
        }
        removed
    }

    pub fn clear(&self) {
        let keys: Vec<QueryKey> = self.lock().drain().map(|(key, _)| key).collect();
        for key in keys {
            let _ = self.invalidated.send(key);
        }
    }
}
