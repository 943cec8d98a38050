//! Synchronization layer between screens and the gateway.
//!
//! Reads go through the [`QueryCache`]; writes go straight to the backend and,
//! only once it has confirmed them, invalidate the queries they affect.
//! Nothing is updated optimistically.

use time::OffsetDateTime;

use crate::cache::{Invalidate, QueryCache, QueryData, QueryKey};
use crate::client::ApiClient;
use crate::domain::{
    Category, CategoryId, PaidFilter, Period, Project, ProjectDetail, ProjectId, Statistics,
    Timer, TimerId,
};
use crate::dto::{ProjectInput, TimerEdit, UpdateTimerRequest};
use crate::error::{Error, Result};
use crate::reconcile::start_time_for_elapsed;

#[derive(Debug, Clone)]
pub struct Store {
    client: ApiClient,
    cache: QueryCache,
}

fn category_targets() -> Vec<Invalidate> {
    vec![
        Invalidate::Key(QueryKey::Categories),
        Invalidate::AllProjects,
    ]
}

fn project_targets(id: Option<&ProjectId>) -> Vec<Invalidate> {
    let mut targets = vec![Invalidate::AllProjects, Invalidate::AllStatistics];
    if let Some(id) = id {
        targets.push(Invalidate::Key(QueryKey::Project(id.clone())));
    }
    targets
}

fn timer_targets(project_id: &ProjectId) -> Vec<Invalidate> {
    project_targets(Some(project_id))
}

impl Store {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cache: QueryCache::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    async fn fetch(&self, key: &QueryKey) -> Result<QueryData> {
        tracing::debug!(key = %key, "fetching");
        let data = match key {
            QueryKey::Categories => QueryData::Categories(self.client.categories().await?),
            QueryKey::Projects { category } => {
                QueryData::Projects(self.client.projects(category.as_ref()).await?)
            }
            QueryKey::Project(id) => QueryData::Project(self.client.project_timers(id).await?),
            QueryKey::Statistics {
                period,
                paid_filter,
            } => QueryData::Statistics(self.client.statistics(*period, *paid_filter).await?),
        };
        self.cache.insert(key.clone(), data.clone());
        Ok(data)
    }

    /// Cached value for `key`, fetching it on a miss.
    pub async fn query(&self, key: &QueryKey) -> Result<QueryData> {
        if let Some(data) = self.cache.get(key) {
            return Ok(data);
        }
        self.fetch(key).await
    }

    /// Refetch `key` regardless of what is cached.
    pub async fn refresh(&self, key: &QueryKey) -> Result<QueryData> {
        self.fetch(key).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        match self.query(&QueryKey::Categories).await? {
            QueryData::Categories(categories) => Ok(categories),
            other => Err(mismatch(&QueryKey::Categories, &other)),
        }
    }

    pub async fn projects(&self, category: Option<&CategoryId>) -> Result<Vec<Project>> {
        let key = QueryKey::Projects {
            category: category.cloned(),
        };
        match self.query(&key).await? {
            QueryData::Projects(projects) => Ok(projects),
            other => Err(mismatch(&key, &other)),
        }
    }

    pub async fn project(&self, id: &ProjectId) -> Result<ProjectDetail> {
        let key = QueryKey::Project(id.clone());
        match self.query(&key).await? {
            QueryData::Project(detail) => Ok(detail),
            other => Err(mismatch(&key, &other)),
        }
    }

    pub async fn statistics(&self, period: Period, paid_filter: PaidFilter) -> Result<Statistics> {
        let key = QueryKey::Statistics {
            period,
            paid_filter,
        };
        match self.query(&key).await? {
            QueryData::Statistics(stats) => Ok(stats),
            other => Err(mismatch(&key, &other)),
        }
    }

    /// Last server-confirmed snapshot of a timer, without fetching.
    pub fn cached_timer(&self, project_id: &ProjectId, timer_id: &TimerId) -> Option<Timer> {
        match self.cache.get(&QueryKey::Project(project_id.clone()))? {
            QueryData::Project(detail) => detail.timer(timer_id).cloned(),
            _ => None,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.client.login(email, password).await?;
        self.cache.clear();
        Ok(())
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        self.client.register(email, password).await?;
        self.cache.clear();
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.client.logout()?;
        self.cache.clear();
        Ok(())
    }

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let category = self.client.create_category(name).await?;
        self.cache.invalidate(&category_targets());
        Ok(category)
    }

    pub async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        self.client.delete_category(id).await?;
        self.cache.invalidate(&category_targets());
        Ok(())
    }

    pub async fn create_project(&self, input: &ProjectInput) -> Result<Project> {
        let project = self.client.create_project(input).await?;
        self.cache.invalidate(&project_targets(None));
        Ok(project)
    }

    pub async fn update_project(&self, id: &ProjectId, input: &ProjectInput) -> Result<Project> {
        let project = self.client.update_project(id, input).await?;
        self.cache.invalidate(&project_targets(Some(id)));
        Ok(project)
    }

    pub async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        self.client.delete_project(id).await?;
        self.cache.invalidate(&project_targets(Some(id)));
        Ok(())
    }

    pub async fn create_timer(&self, name: &str, project_id: &ProjectId) -> Result<Timer> {
        let timer = self.client.create_timer(name, project_id).await?;
        self.cache.invalidate(&timer_targets(project_id));
        Ok(timer)
    }

    pub async fn pause_timer(&self, project_id: &ProjectId, timer_id: &TimerId) -> Result<Timer> {
        let timer = self.client.pause_timer(timer_id).await?;
        self.cache.invalidate(&timer_targets(project_id));
        Ok(timer)
    }

    pub async fn resume_timer(&self, project_id: &ProjectId, timer_id: &TimerId) -> Result<Timer> {
        let timer = self.client.resume_timer(timer_id).await?;
        self.cache.invalidate(&timer_targets(project_id));
        Ok(timer)
    }

    pub async fn stop_timer(&self, project_id: &ProjectId, timer_id: &TimerId) -> Result<Timer> {
        let timer = self.client.stop_timer(timer_id).await?;
        self.cache.invalidate(&timer_targets(project_id));
        Ok(timer)
    }

    pub async fn delete_timer(&self, project_id: &ProjectId, timer_id: &TimerId) -> Result<()> {
        self.client.delete_timer(timer_id).await?;
        self.cache.invalidate(&timer_targets(project_id));
        Ok(())
    }

    pub async fn mark_all_paid(&self, project_id: &ProjectId) -> Result<()> {
        self.client.mark_all_paid(project_id).await?;
        self.cache.invalidate(&timer_targets(project_id));
        Ok(())
    }

    pub async fn update_timer(
        &self,
        project_id: &ProjectId,
        timer_id: &TimerId,
        edit: TimerEdit,
    ) -> Result<Timer> {
        self.update_timer_at(project_id, timer_id, edit, OffsetDateTime::now_utc())
            .await
    }

    /// Apply `edit`, translating a requested duration into a new `startTime`
    /// against the cached snapshot as of `now`.
    ///
    /// A duration edit without a cached snapshot fails with
    /// [`Error::MissingSnapshot`] before anything is sent.
    pub async fn update_timer_at(
        &self,
        project_id: &ProjectId,
        timer_id: &TimerId,
        edit: TimerEdit,
        now: OffsetDateTime,
    ) -> Result<Timer> {
        let start_time = match edit.elapsed {
            Some(elapsed) => {
                let snapshot = self
                    .cached_timer(project_id, timer_id)
                    .ok_or_else(|| Error::MissingSnapshot(timer_id.clone()))?;
                Some(start_time_for_elapsed(&snapshot, elapsed, now)?)
            }
            None => None,
        };

        let request = UpdateTimerRequest {
            name: edit.name,
            description: edit.description,
            start_time,
            is_paid: edit.is_paid,
            is_logged: edit.is_logged,
        };
        let timer = self.client.update_timer(timer_id, &request).await?;
        self.cache.invalidate(&timer_targets(project_id));
        Ok(timer)
    }
}

fn mismatch(key: &QueryKey, data: &QueryData) -> Error {
    tracing::error!(key = %key, data = ?std::mem::discriminant(data), "cache entry has wrong shape");
    Error::Server {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("unexpected cached data for {}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use httpmock::prelude::*;
    use serde_json::json;
    use time::macros::datetime;
    use time::Duration;

    use crate::dev_backend::{DevBackend, DEV_EMAIL, DEV_PASSWORD};
    use crate::elapsed::elapsed_seconds;
    use crate::session::{MemoryTokenStore, Session};

    const T: OffsetDateTime = datetime!(2024-05-10 08:00 UTC);

    async fn dev_store() -> (Store, DevBackend) {
        let backend = DevBackend::empty();
        backend.freeze_clock(T);
        let client = ApiClient::with_dev_backend(Session::in_memory(), backend.clone()).unwrap();
        client.login(DEV_EMAIL, DEV_PASSWORD).await.unwrap();
        (Store::new(client), backend)
    }

    async fn store_with_project() -> (Store, DevBackend, ProjectId) {
        let (store, backend) = dev_store().await;
        let project = store
            .create_project(&ProjectInput::new("Site"))
            .await
            .unwrap();
        (store, backend, project.id)
    }

    #[tokio::test]
    async fn reads_are_served_from_cache_until_invalidated() {
        let (store, backend, project) = store_with_project().await;
        assert!(store.projects(None).await.unwrap()[0].total_time == 0);

        // A change the store does not know about stays invisible.
        let timer = backend.create_timer("side", &project).unwrap();
        backend.advance_clock(Duration::seconds(60));
        backend.stop_timer(&timer.id).unwrap();
        assert_eq!(store.projects(None).await.unwrap()[0].total_time, 0);

        let QueryData::Projects(fresh) = store
            .refresh(&QueryKey::Projects { category: None })
            .await
            .unwrap()
        else {
            panic!("wrong shape");
        };
        assert_eq!(fresh[0].total_time, 60);
        assert_eq!(store.projects(None).await.unwrap()[0].total_time, 60);
    }

    #[tokio::test]
    async fn timer_mutations_invalidate_project_lists_and_statistics() {
        let (store, _backend, project) = store_with_project().await;
        let other = store
            .create_project(&ProjectInput::new("Other"))
            .await
            .unwrap()
            .id;

        store.project(&project).await.unwrap();
        store.project(&other).await.unwrap();
        store.projects(None).await.unwrap();
        store.categories().await.unwrap();
        store
            .statistics(Period::Week, PaidFilter::Paid)
            .await
            .unwrap();

        let mut rx = store.cache().subscribe();
        let timer = store.create_timer("Work", &project).await.unwrap();

        let cache = store.cache();
        assert!(!cache.contains(&QueryKey::Project(project.clone())));
        assert!(!cache.contains(&QueryKey::Projects { category: None }));
        assert!(!cache.contains(&QueryKey::Statistics {
            period: Period::Week,
            paid_filter: PaidFilter::Paid
        }));
        assert!(cache.contains(&QueryKey::Project(other.clone())));
        assert!(cache.contains(&QueryKey::Categories));

        let mut heard = Vec::new();
        while let Ok(key) = rx.try_recv() {
            heard.push(key);
        }
        assert_eq!(heard.len(), 3);

        let detail = store.project(&project).await.unwrap();
        assert_eq!(detail.timer(&timer.id).map(|t| t.name.as_str()), Some("Work"));
    }

    #[tokio::test]
    async fn category_mutations_leave_statistics_alone() {
        let (store, _backend) = dev_store().await;
        store.categories().await.unwrap();
        store.projects(None).await.unwrap();
        store
            .statistics(Period::All, PaidFilter::All)
            .await
            .unwrap();

        let category = store.create_category("Clients").await.unwrap();
        assert!(!store.cache().contains(&QueryKey::Categories));
        assert!(!store
            .cache()
            .contains(&QueryKey::Projects { category: None }));
        assert!(store.cache().contains(&QueryKey::Statistics {
            period: Period::All,
            paid_filter: PaidFilter::All
        }));
        assert_eq!(store.categories().await.unwrap(), vec![category]);
    }

    #[tokio::test]
    async fn failed_mutations_invalidate_nothing() {
        let (store, _backend, project) = store_with_project().await;
        store.project(&project).await.unwrap();
        store.projects(None).await.unwrap();

        let err = store
            .pause_timer(&project, &TimerId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(store.cache().contains(&QueryKey::Project(project.clone())));
        assert!(store
            .cache()
            .contains(&QueryKey::Projects { category: None }));
    }

    #[tokio::test]
    async fn duration_edit_moves_start_of_open_timer() {
        let (store, backend, project) = store_with_project().await;
        let timer = store.create_timer("Work", &project).await.unwrap();
        backend.advance_clock(Duration::seconds(120));
        store.pause_timer(&project, &timer.id).await.unwrap();
        backend.advance_clock(Duration::seconds(30));

        store.project(&project).await.unwrap();
        let now = backend.now();
        let edited = store
            .update_timer_at(
                &project,
                &timer.id,
                TimerEdit {
                    elapsed: Some(7200),
                    ..Default::default()
                },
                now,
            )
            .await
            .unwrap();

        assert_eq!(elapsed_seconds(&edited, now), 7200);
        assert_eq!(edited.start_time, now - Duration::seconds(7200 + 30));
    }

    #[tokio::test]
    async fn duration_edit_of_closed_timer_round_trips() {
        let (store, backend, project) = store_with_project().await;
        let timer = store.create_timer("Work", &project).await.unwrap();
        backend.advance_clock(Duration::seconds(500));
        store.stop_timer(&project, &timer.id).await.unwrap();
        store.project(&project).await.unwrap();

        let edited = store
            .update_timer(
                &project,
                &timer.id,
                TimerEdit {
                    elapsed: Some(3725),
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.name, "Renamed");
        assert_eq!(elapsed_seconds(&edited, T + Duration::days(10)), 3725);
    }

    #[tokio::test]
    async fn duration_edit_without_snapshot_is_rejected() {
        let server = MockServer::start_async().await;
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("abc")));
        let store = Store::new(ApiClient::new(&server.base_url(), session).unwrap());

        let err = store
            .update_timer(
                &ProjectId::new("p1"),
                &TimerId::new("t1"),
                TimerEdit {
                    elapsed: Some(60),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingSnapshot(ref id) if id.as_str() == "t1"));
    }

    #[tokio::test]
    async fn unrepresentable_duration_is_rejected_before_sending() {
        let (store, backend, project) = store_with_project().await;
        let timer = store.create_timer("Work", &project).await.unwrap();
        backend.advance_clock(Duration::seconds(60));
        store.project(&project).await.unwrap();
        let mut invalidated = store.cache().subscribe();

        let err = store
            .update_timer_at(
                &project,
                &timer.id,
                TimerEdit {
                    elapsed: Some(200_000_000 * 3600),
                    ..Default::default()
                },
                backend.now(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(invalidated.try_recv().is_err());
        let detail = store.project(&project).await.unwrap();
        assert_eq!(detail.timer(&timer.id).unwrap().start_time, timer.start_time);
    }

    #[tokio::test]
    async fn flag_edits_need_no_snapshot() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/timers/t1")
                    .json_body(json!({ "isLogged": true }));
                then.status(200).json_body(json!({
                    "id": "t1",
                    "name": "Review",
                    "startTime": "2024-05-10T08:00:00Z",
                    "isLogged": true
                }));
            })
            .await;
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("abc")));
        let store = Store::new(ApiClient::new(&server.base_url(), session).unwrap());

        let timer = store
            .update_timer(
                &ProjectId::new("p1"),
                &TimerId::new("t1"),
                TimerEdit {
                    is_logged: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(timer.is_logged);
    }

    #[tokio::test]
    async fn mark_all_paid_refreshes_the_badge() {
        let (store, backend, project) = store_with_project().await;
        let timer = store.create_timer("Work", &project).await.unwrap();
        backend.advance_clock(Duration::seconds(10));
        store.stop_timer(&project, &timer.id).await.unwrap();

        assert_eq!(
            store.project(&project).await.unwrap().paid_status(),
            Some(crate::domain::PaidStatus::Unpaid)
        );
        store.mark_all_paid(&project).await.unwrap();
        assert_eq!(
            store.project(&project).await.unwrap().paid_status(),
            Some(crate::domain::PaidStatus::Paid)
        );
    }

    #[tokio::test]
    async fn logout_drops_cached_data() {
        let (store, _backend, _project) = store_with_project().await;
        store.projects(None).await.unwrap();

        store.logout().unwrap();
        assert!(!store
            .cache()
            .contains(&QueryKey::Projects { category: None }));
        assert!(store.projects(None).await.unwrap_err().is_unauthorized());
    }
}
