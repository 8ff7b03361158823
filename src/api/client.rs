//! REST client for the Taskify backend.
//!
//! Every call returns [`ApiResult`]; transport failures, non-success
//! statuses and undecodable bodies all become an [`ApiError`]. Nothing is
//! retried.

use crate::api::error::{ApiError, ApiResult};
use crate::models::{Project, Task, TaskStatus, User};
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Bearer token attached to every request.
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_seconds: 30,
            token: None,
        }
    }
}

/// Body of a successful login or OTP verification.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// A plain acknowledgement from the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailOnly<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct OtpVerification<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordReset<'a> {
    email: &'a str,
    otp: &'a str,
    new_password: &'a str,
}

/// Answers collected by the onboarding flow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    pub role: String,
    pub team_size: String,
    pub use_case: String,
}

/// Account settings update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Fields for creating a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub icon: String,
    pub color: String,
}

/// Invitation of a new member into a project.
#[derive(Debug, Clone, Serialize)]
pub struct Invitation {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: TaskStatus,
}

/// The backend client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        info!("Using Taskify API at {}", config.base_url);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Full URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // === Auth ===

    /// Sign in with email and password. A 401 here means bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let body = Credentials { email, password };
        match self.send_json(Method::POST, "/auth/login", Some(&body)).await {
            Err(ApiError::Unauthorized) => Err(ApiError::InvalidCredentials),
            other => other,
        }
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> ApiResult<AuthSession> {
        let body = OtpVerification { email, otp };
        self.send_json(Method::POST, "/auth/verify-otp", Some(&body))
            .await
    }

    pub async fn resend_otp(&self, email: &str) -> ApiResult<Ack> {
        self.send_json(Method::POST, "/auth/resend-otp", Some(&EmailOnly { email }))
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<Ack> {
        self.send_json(
            Method::POST,
            "/auth/forgot-password",
            Some(&EmailOnly { email }),
        )
        .await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> ApiResult<Ack> {
        let body = PasswordReset {
            email,
            otp,
            new_password,
        };
        self.send_json(Method::POST, "/auth/reset-password", Some(&body))
            .await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        self.execute(Method::POST, "/auth/logout", None::<&()>)
            .await
            .map(|_| ())
    }

    // === Users ===

    pub async fn complete_onboarding(&self, answers: &Onboarding) -> ApiResult<User> {
        self.send_json(Method::PUT, "/users/onboarding", Some(answers))
            .await
    }

    pub async fn update_settings(&self, update: &SettingsUpdate) -> ApiResult<User> {
        self.send_json(Method::PUT, "/users/settings", Some(update))
            .await
    }

    // === Projects and tasks ===

    pub async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.send_json(Method::GET, "/projects", None::<&()>).await
    }

    /// Fetch one project; a 404 is `Ok(None)`.
    pub async fn project(&self, id: &str) -> ApiResult<Option<Project>> {
        not_found_as_none(
            self.send_json(Method::GET, &format!("/projects/{id}"), None::<&()>)
                .await,
        )
    }

    /// Tasks of one project; a 404 is an empty list.
    pub async fn project_tasks(&self, id: &str) -> ApiResult<Vec<Task>> {
        not_found_as_none(
            self.send_json(Method::GET, &format!("/projects/{id}/tasks"), None::<&()>)
                .await,
        )
        .map(Option::unwrap_or_default)
    }

    /// Fetch one task; a 404 is `Ok(None)`.
    pub async fn task(&self, id: &str) -> ApiResult<Option<Task>> {
        not_found_as_none(
            self.send_json(Method::GET, &format!("/tasks/{id}"), None::<&()>)
                .await,
        )
    }

    pub async fn create_project(&self, project: &NewProject) -> ApiResult<Project> {
        self.send_json(Method::POST, "/projects", Some(project)).await
    }

    pub async fn invite_member(&self, project_id: &str, invite: &Invitation) -> ApiResult<Ack> {
        self.send_json(
            Method::POST,
            &format!("/projects/{project_id}/invite"),
            Some(invite),
        )
        .await
    }

    pub async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> ApiResult<Task> {
        self.send_json(
            Method::PATCH,
            &format!("/tasks/{task_id}"),
            Some(&StatusUpdate { status }),
        )
        .await
    }

    // === Plumbing ===

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the response if its status is a success.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<Response> {
        debug!("{} {}", method, path);

        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.config.timeout_seconds)
            } else if e.is_connect() {
                ApiError::Connect(self.config.base_url.clone())
            } else {
                ApiError::Transport(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("{} returned {}: {}", path, status, body);
            return Err(ApiError::from_status(status.as_u16(), &body, path));
        }

        Ok(response)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(method, path, body).await?;
        let text = response.text().await.map_err(ApiError::Transport)?;
        decode(&text)
    }
}

/// Decode a JSON body, accepting both bare payloads and `{"data": ...}` envelopes.
pub fn decode<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    #[derive(Deserialize)]
    struct Envelope<T> {
        data: T,
    }

    match serde_json::from_str::<T>(text) {
        Ok(value) => Ok(value),
        Err(direct) => serde_json::from_str::<Envelope<T>>(text)
            .map(|e| e.data)
            .map_err(|_| ApiError::Decode(direct.to_string())),
    }
}

fn not_found_as_none<T>(result: ApiResult<T>) -> ApiResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ApiError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client(base_url: &str) -> ApiClient {
        ApiClient::new(ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = create_test_client("https://api.example.com/v1/");
        assert_eq!(client.url("/projects"), "https://api.example.com/v1/projects");
        assert_eq!(client.url("projects/3/invite"), "https://api.example.com/v1/projects/3/invite");
    }

    #[test]
    fn test_decode_bare_and_enveloped() {
        let bare: Ack = decode(r#"{"message": "sent"}"#).unwrap();
        assert_eq!(bare.message, "sent");

        let wrapped: Vec<String> = decode(r#"{"data": ["a", "b"]}"#).unwrap();
        assert_eq!(wrapped, vec!["a", "b"]);

        let err = decode::<Vec<String>>("not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_request_bodies_use_camel_case() {
        let reset = PasswordReset {
            email: "a@b.c",
            otp: "123456",
            new_password: "hunter22",
        };
        let json = serde_json::to_value(&reset).unwrap();
        assert_eq!(json["newPassword"], "hunter22");

        let update = StatusUpdate {
            status: TaskStatus::InProgress,
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"status":"in-progress"}"#);

        let settings = SettingsUpdate {
            name: Some("Ana".to_string()),
            email: None,
        };
        assert_eq!(serde_json::to_string(&settings).unwrap(), r#"{"name":"Ana"}"#);
    }

    #[test]
    fn test_not_found_as_none() {
        assert_eq!(not_found_as_none(Ok(3)).unwrap(), Some(3));
        assert_eq!(
            not_found_as_none::<u8>(Err(ApiError::NotFound("/x".to_string()))).unwrap(),
            None
        );
        assert!(not_found_as_none::<u8>(Err(ApiError::Unauthorized)).is_err());
    }

    #[test]
    fn test_connection_refused_is_typed() {
        // Nothing listens on port 9 locally; the call must fail without panicking.
        let client = create_test_client("http://127.0.0.1:9");
        let result = tokio_test::block_on(client.list_projects());
        assert!(matches!(
            result,
            Err(ApiError::Connect(_)) | Err(ApiError::Transport(_)) | Err(ApiError::Timeout(_))
        ));
    }
}
