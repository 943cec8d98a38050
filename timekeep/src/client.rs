use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::dev_backend::DevBackend;
use crate::domain::{
    Category, CategoryId, PaidFilter, Period, Project, ProjectDetail, ProjectId, Statistics,
    Timer, TimerId,
};
use crate::dto::{
    AuthResponse, CreateCategoryRequest, CreateTimerRequest, CredentialsRequest, ErrorResponse,
    ProjectInput, UpdateTimerRequest,
};
use crate::error::{Error, Result};
use crate::session::Session;

const UNAUTH_NO_TOKEN: &str = "Требуется вход в систему";

/// Gateway to the time-tracking backend.
///
/// Every call reads the bearer token from the [`Session`] once, when the
/// request is built. With a dev backend attached no HTTP traffic happens.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Session,
    dev_backend: Option<DevBackend>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Result<Self> {
        // A trailing slash keeps any path prefix of the base URL on join.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url,
            session,
            dev_backend: None,
        })
    }

    pub fn dev(session: Session) -> Result<Self> {
        Self::with_dev_backend(session, DevBackend::new())
    }

    pub fn with_dev_backend(session: Session, backend: DevBackend) -> Result<Self> {
        let mut client = Self::new("http://localhost", session)?;
        client.dev_backend = Some(backend);
        Ok(client)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_dev(&self) -> bool {
        self.dev_backend.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Dev backend, provided the session would pass the backend's auth check.
    fn dev_backend(&self) -> Result<Option<&DevBackend>> {
        let Some(dev) = &self.dev_backend else {
            return Ok(None);
        };
        if !self.session.is_authenticated() {
            return Err(Error::Unauthorized(UNAUTH_NO_TOKEN.to_string()));
        }
        Ok(Some(dev))
    }

    async fn send(&self, request: RequestBuilder, call_name: &str) -> Result<Response> {
        tracing::debug!(call = call_name, "sending request");
        let response = request.send().await.map_err(|e| {
            tracing::warn!(call = call_name, error = %e, "request failed");
            Error::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorResponse>(&body)
            .ok()
            .and_then(ErrorResponse::into_message)
            .unwrap_or_else(|| fallback_message(status));
        tracing::warn!(call = call_name, status = %status, message = %message, "request rejected");
        Err(Error::from_status(status, message))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<T> {
        let response = self.send(request, call_name).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            call: call_name.to_string(),
            source,
        })
    }

    async fn send_without_body(&self, request: RequestBuilder, call_name: &str) -> Result<()> {
        let response = self.send(request, call_name).await?;
        let _ = response.bytes().await;
        Ok(())
    }

    async fn authenticate(&self, path: &str, email: &str, password: &str) -> Result<()> {
        let call_name = format!("POST {}", path);
        let response: AuthResponse = self
            .get_json(
                self.client
                    .post(self.endpoint(path)?)
                    .json(&CredentialsRequest { email, password }),
                &call_name,
            )
            .await?;

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Unauthorized("Сервер не вернул токен".to_string()))?;
        self.session.sign_in(&token)?;
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        if let Some(dev) = &self.dev_backend {
            let token = dev.login(email, password)?;
            self.session.sign_in(&token)?;
            return Ok(());
        }
        self.authenticate("/auth/login", email, password).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        if let Some(dev) = &self.dev_backend {
            let token = dev.register(email, password)?;
            self.session.sign_in(&token)?;
            return Ok(());
        }
        self.authenticate("/auth/register", email, password).await
    }

    /// Drop the local token. The backend keeps no server-side session.
    pub fn logout(&self) -> Result<()> {
        self.session.sign_out()?;
        Ok(())
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        if let Some(dev) = self.dev_backend()? {
            return Ok(dev.categories());
        }

        self.get_json(
            self.authorized(self.client.get(self.endpoint("/categories")?)),
            "GET /categories",
        )
        .await
    }

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        if let Some(dev) = self.dev_backend()? {
            return Ok(dev.create_category(name));
        }

        self.get_json(
            self.authorized(
                self.client
                    .post(self.endpoint("/categories")?)
                    .json(&CreateCategoryRequest { name }),
            ),
            "POST /categories",
        )
        .await
    }

    pub async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        if let Some(dev) = self.dev_backend()? {
            return dev.delete_category(id);
        }

        self.send_without_body(
            self.authorized(
                self.client
                    .delete(self.endpoint(&format!("/categories/{}", encode(id.as_str())))?),
            ),
            "DELETE /categories/:id",
        )
        .await
    }

    pub async fn projects(&self, category: Option<&CategoryId>) -> Result<Vec<Project>> {
        if let Some(dev) = self.dev_backend()? {
            return Ok(dev.projects(category));
        }

        let mut request = self.client.get(self.endpoint("/projects")?);
        if let Some(category) = category {
            request = request.query(&[("categoryId", category.as_str())]);
        }
        self.get_json(self.authorized(request), "GET /projects").await
    }

    pub async fn project(&self, id: &ProjectId) -> Result<Project> {
        if let Some(dev) = self.dev_backend()? {
            return dev.project(id);
        }

        self.get_json(
            self.authorized(
                self.client
                    .get(self.endpoint(&format!("/projects/{}", encode(id.as_str())))?),
            ),
            "GET /projects/:id",
        )
        .await
    }

    /// The project together with all of its timers.
    pub async fn project_timers(&self, id: &ProjectId) -> Result<ProjectDetail> {
        if let Some(dev) = self.dev_backend()? {
            return dev.project_detail(id);
        }

        self.get_json(
            self.authorized(
                self.client
                    .get(self.endpoint(&format!("/projects/{}/timers", encode(id.as_str())))?),
            ),
            "GET /projects/:id/timers",
        )
        .await
    }

    pub async fn create_project(&self, input: &ProjectInput) -> Result<Project> {
        if let Some(dev) = self.dev_backend()? {
            return dev.create_project(input);
        }

        self.get_json(
            self.authorized(self.client.post(self.endpoint("/projects")?).json(input)),
            "POST /projects",
        )
        .await
    }

    pub async fn update_project(&self, id: &ProjectId, input: &ProjectInput) -> Result<Project> {
        if let Some(dev) = self.dev_backend()? {
            return dev.update_project(id, input);
        }

        self.get_json(
            self.authorized(
                self.client
                    .patch(self.endpoint(&format!("/projects/{}", encode(id.as_str())))?)
                    .json(input),
            ),
            "PATCH /projects/:id",
        )
        .await
    }

    pub async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        if let Some(dev) = self.dev_backend()? {
            return dev.delete_project(id);
        }

        self.send_without_body(
            self.authorized(
                self.client
                    .delete(self.endpoint(&format!("/projects/{}", encode(id.as_str())))?),
            ),
            "DELETE /projects/:id",
        )
        .await
    }

    pub async fn timers(&self) -> Result<Vec<Timer>> {
        if let Some(dev) = self.dev_backend()? {
            return Ok(dev.timers());
        }

        self.get_json(
            self.authorized(self.client.get(self.endpoint("/timers")?)),
            "GET /timers",
        )
        .await
    }

    /// Create a timer. The backend starts it immediately.
    pub async fn create_timer(&self, name: &str, project_id: &ProjectId) -> Result<Timer> {
        if let Some(dev) = self.dev_backend()? {
            return dev.create_timer(name, project_id);
        }

        self.get_json(
            self.authorized(
                self.client
                    .post(self.endpoint("/timers")?)
                    .json(&CreateTimerRequest { name, project_id }),
            ),
            "POST /timers",
        )
        .await
    }

    async fn timer_action(&self, id: &TimerId, action: &str) -> Result<Timer> {
        let call_name = format!("POST /timers/:id/{}", action);
        self.get_json(
            self.authorized(self.client.post(
                self.endpoint(&format!("/timers/{}/{}", encode(id.as_str()), action))?,
            )),
            &call_name,
        )
        .await
    }

    pub async fn pause_timer(&self, id: &TimerId) -> Result<Timer> {
        if let Some(dev) = self.dev_backend()? {
            return dev.pause_timer(id);
        }
        self.timer_action(id, "pause").await
    }

    pub async fn resume_timer(&self, id: &TimerId) -> Result<Timer> {
        if let Some(dev) = self.dev_backend()? {
            return dev.resume_timer(id);
        }
        self.timer_action(id, "resume").await
    }

    pub async fn stop_timer(&self, id: &TimerId) -> Result<Timer> {
        if let Some(dev) = self.dev_backend()? {
            return dev.stop_timer(id);
        }
        self.timer_action(id, "stop").await
    }

    pub async fn update_timer(&self, id: &TimerId, update: &UpdateTimerRequest) -> Result<Timer> {
        if let Some(dev) = self.dev_backend()? {
            return dev.update_timer(id, update);
        }

        self.get_json(
            self.authorized(
                self.client
                    .patch(self.endpoint(&format!("/timers/{}", encode(id.as_str())))?)
                    .json(update),
            ),
            "PATCH /timers/:id",
        )
        .await
    }

    pub async fn delete_timer(&self, id: &TimerId) -> Result<()> {
        if let Some(dev) = self.dev_backend()? {
            return dev.delete_timer(id);
        }

        self.send_without_body(
            self.authorized(
                self.client
                    .delete(self.endpoint(&format!("/timers/{}", encode(id.as_str())))?),
            ),
            "DELETE /timers/:id",
        )
        .await
    }

    pub async fn statistics(&self, period: Period, filter: PaidFilter) -> Result<Statistics> {
        if let Some(dev) = self.dev_backend()? {
            return Ok(dev.statistics(period, filter));
        }

        self.get_json(
            self.authorized(
                self.client
                    .get(self.endpoint(&format!("/timers/statistics/{}", period.as_str()))?)
                    .query(&[("paidFilter", filter.as_str())]),
            ),
            "GET /timers/statistics/:period",
        )
        .await
    }

    pub async fn mark_all_paid(&self, project_id: &ProjectId) -> Result<()> {
        if let Some(dev) = self.dev_backend()? {
            return dev.mark_all_paid(project_id);
        }

        self.send_without_body(
            self.authorized(self.client.post(self.endpoint(&format!(
                "/timers/project/{}/mark-all-paid",
                encode(project_id.as_str())
            ))?)),
            "POST /timers/project/:id/mark-all-paid",
        )
        .await
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn fallback_message(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UNAUTH_NO_TOKEN.to_string(),
        _ => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use time::macros::datetime;

    use crate::session::MemoryTokenStore;

    fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
        let store = match token {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        };
        ApiClient::new(&server.base_url(), Session::new(Arc::new(store))).unwrap()
    }

    fn timer_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Review",
            "startTime": "2024-05-10T08:00:00Z",
            "endTime": null,
            "isPaused": false,
            "pausedAt": null,
            "totalPause": 0,
            "isPaid": false,
            "isLogged": false,
            "projectId": "p1"
        })
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/categories")
                    .header("authorization", "Bearer abc");
                then.status(200)
                    .json_body(json!([{ "id": "c1", "name": "Clients" }]));
            })
            .await;

        let client = client_for(&server, Some("abc"));
        let categories = client.categories().await.unwrap();

        mock.assert_async().await;
        assert_eq!(categories, vec![Category::new("c1", "Clients")]);
    }

    #[tokio::test]
    async fn login_stores_returned_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/login")
                    .json_body(json!({ "email": "a@b.c", "password": "pw" }));
                then.status(200).json_body(json!({ "token": "t-1" }));
            })
            .await;

        let client = client_for(&server, None);
        client.login("a@b.c", "pw").await.unwrap();

        mock.assert_async().await;
        assert_eq!(client.session().token().as_deref(), Some("t-1"));

        client.logout().unwrap();
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_surfaces_message_and_keeps_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/projects");
                then.status(401).json_body(json!({
                    "message": "Unauthorized",
                    "statusCode": 401
                }));
            })
            .await;

        let client = client_for(&server, Some("expired"));
        let err = client.projects(None).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(client.session().token().as_deref(), Some("expired"));
    }

    #[tokio::test]
    async fn validation_errors_join_messages() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/projects");
                then.status(400).json_body(json!({
                    "message": ["name should not be empty"],
                    "error": "Bad Request",
                    "statusCode": 400
                }));
            })
            .await;

        let client = client_for(&server, Some("abc"));
        let err = client
            .create_project(&ProjectInput::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m == "name should not be empty"));
    }

    #[tokio::test]
    async fn projects_filter_by_category() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/projects")
                    .query_param("categoryId", "c1");
                then.status(200).json_body(json!([
                    { "id": "p1", "name": "Site", "categoryId": "c1", "totalTime": 3600, "isPaid": true }
                ]));
            })
            .await;

        let client = client_for(&server, Some("abc"));
        let projects = client
            .projects(Some(&CategoryId::new("c1")))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(projects.len(), 1);
        assert!(projects[0].is_paid);
    }

    #[tokio::test]
    async fn single_project_is_fetched_by_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/projects/p1")
                    .header("authorization", "Bearer abc");
                then.status(200).json_body(json!({
                    "id": "p1",
                    "name": "Site",
                    "description": "Landing page",
                    "category": { "id": "c1", "name": "Clients" },
                    "totalTime": 5400,
                    "isPaid": false
                }));
            })
            .await;

        let client = client_for(&server, Some("abc"));
        let project = client.project(&ProjectId::new("p1")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(project.name, "Site");
        assert_eq!(project.category_id(), Some(&CategoryId::new("c1")));
        assert_eq!(project.total_time, 5400);
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/projects/gone");
                then.status(404).json_body(json!({
                    "message": "Проект не найден",
                    "statusCode": 404
                }));
            })
            .await;

        let client = client_for(&server, Some("abc"));
        let err = client.project(&ProjectId::new("gone")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "Проект не найден"));
    }

    #[tokio::test]
    async fn statistics_send_period_and_paid_filter() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/timers/statistics/month")
                    .query_param("paidFilter", "unpaid");
                then.status(200).json_body(json!({
                    "totalTime": 7200,
                    "totalPaidTime": 3600,
                    "totalUnpaidTime": 3600,
                    "projectStats": []
                }));
            })
            .await;

        let client = client_for(&server, Some("abc"));
        let stats = client
            .statistics(Period::Month, PaidFilter::Unpaid)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(stats.total_time, 7200);
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn update_timer_patches_only_given_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/timers/t1")
                    .json_body(json!({ "startTime": "2024-05-10T06:00:00Z", "isPaid": true }));
                then.status(200).json_body(timer_json("t1"));
            })
            .await;

        let client = client_for(&server, Some("abc"));
        let update = UpdateTimerRequest {
            start_time: Some(datetime!(2024-05-10 06:00 UTC)),
            is_paid: Some(true),
            ..Default::default()
        };
        let timer = client
            .update_timer(&TimerId::new("t1"), &update)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(timer.id, TimerId::new("t1"));
    }

    #[tokio::test]
    async fn lifecycle_actions_hit_their_paths() {
        let server = MockServer::start_async().await;
        let pause = server
            .mock_async(|when, then| {
                when.method(POST).path("/timers/t1/pause");
                then.status(200).json_body(timer_json("t1"));
            })
            .await;
        let mark = server
            .mock_async(|when, then| {
                when.method(POST).path("/timers/project/p1/mark-all-paid");
                then.status(201);
            })
            .await;

        let client = client_for(&server, Some("abc"));
        client.pause_timer(&TimerId::new("t1")).await.unwrap();
        client.mark_all_paid(&ProjectId::new("p1")).await.unwrap();

        pause.assert_async().await;
        mark.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/timers");
                then.status(200).body("not json");
            })
            .await;

        let client = client_for(&server, Some("abc"));
        let err = client.timers().await.unwrap_err();
        assert!(matches!(err, Error::Decode { ref call, .. } if call == "GET /timers"));
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let client = ApiClient::new("https://example.com/api/", Session::in_memory()).unwrap();
        assert_eq!(
            client.endpoint("/projects/p1").unwrap().as_str(),
            "https://example.com/api/projects/p1"
        );
        assert!(matches!(
            ApiClient::new("not a url", Session::in_memory()),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn dev_backend_requires_a_session() {
        let client = ApiClient::dev(Session::in_memory()).unwrap();
        assert!(client.is_dev());
        assert!(client.projects(None).await.unwrap_err().is_unauthorized());

        client
            .login(crate::dev_backend::DEV_EMAIL, crate::dev_backend::DEV_PASSWORD)
            .await
            .unwrap();
        let projects = client.projects(None).await.unwrap();
        assert!(!projects.is_empty());
        let project = client.project(&projects[0].id).await.unwrap();
        assert_eq!(project.id, projects[0].id);
    }
}
