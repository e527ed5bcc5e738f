use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use queuedeck_core::{
    Action, Format, Job, JobId, JobStatus, LogStream, StatusSummary, TaskId,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::{ApiError, FailureKind};

const API_TOKEN_HEADER: &str = "Api-Token";
const SESSION_TOKEN_HEADER: &str = "Session-Token";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Root every endpoint path is resolved against, e.g. `http://localhost:8123/api/`.
    pub root: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            root: "http://localhost:8123/api/".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// The two opaque credentials attached to authenticated calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_token: String,
    pub session_token: String,
}

impl Credentials {
    pub fn new(api_token: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            session_token: session_token.into(),
        }
    }

    /// The session token travels JSON-encoded.
    fn session_header(&self) -> String {
        serde_json::Value::String(self.session_token.clone()).to_string()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .field("session_token", &"<redacted>")
            .finish()
    }
}

/// Source of credentials, read on every request.
pub trait TokenStore: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

/// Credentials fixed at startup, e.g. from the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens(Option<Credentials>);

impl StaticTokens {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self(credentials)
    }
}

impl TokenStore for StaticTokens {
    fn credentials(&self) -> Option<Credentials> {
        self.0.clone()
    }
}

/// The job-queue HTTP contract. Implemented over reqwest for real use and by
/// in-memory fakes in tests.
#[async_trait::async_trait]
pub trait JobQueueApi: Send + Sync {
    /// Unauthenticated liveness probe.
    async fn ping(&self) -> Result<(), ApiError>;
    async fn status_summary(&self) -> Result<StatusSummary, ApiError>;
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError>;
    /// Status of one job; the body only needs a `status` field.
    async fn job_status(&self, job_id: &JobId) -> Result<JobStatus, ApiError>;
    async fn create_job(&self, url: &str, format: &str) -> Result<JobId, ApiError>;
    async fn list_formats(&self) -> Result<Vec<Format>, ApiError>;
    async fn job_action(&self, job_id: &JobId, action: Action) -> Result<(), ApiError>;
    async fn bulk_action(&self, action: Action) -> Result<(), ApiError>;
    async fn task_action(&self, task_id: &TaskId, action: Action) -> Result<(), ApiError>;
    async fn task_log(&self, task_id: &TaskId, stream: LogStream) -> Result<Vec<u8>, ApiError>;
    async fn get_config(&self) -> Result<serde_json::Value, ApiError>;
    async fn set_config(&self, value: &serde_json::Value) -> Result<(), ApiError>;
    /// Any response counts as accepted; the server may drop the connection while stopping.
    async fn shutdown(&self) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct CreatedJob {
    job_id: JobId,
}

#[derive(Deserialize)]
struct JobStatusProbe {
    status: JobStatus,
}

pub struct ReqwestApi {
    base: Url,
    client: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
}

impl ReqwestApi {
    pub fn new(settings: &ApiSettings, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let mut root = settings.root.trim().to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        let base = Url::parse(&root)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            base,
            client,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.credentials() {
            Some(credentials) => builder
                .header(API_TOKEN_HEADER, credentials.api_token.as_str())
                .header(SESSION_TOKEN_HEADER, credentials.session_header()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        builder.send().await.map_err(map_reqwest_error)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.authorized(self.client.get(url))).await?;
        let response = expect_status(response, StatusCode::OK)?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }

    async fn post_action(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.authorized(self.client.post(url))).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::status(response.status().as_u16()))
        }
    }
}

#[async_trait::async_trait]
impl JobQueueApi for ReqwestApi {
    async fn ping(&self) -> Result<(), ApiError> {
        let url = self.endpoint("ping")?;
        let response = self.send(self.client.post(url)).await?;
        expect_status(response, StatusCode::OK).map(|_| ())
    }

    async fn status_summary(&self) -> Result<StatusSummary, ApiError> {
        self.get_json("status").await
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.get_json("jobs/get_all").await
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobStatus, ApiError> {
        let probe: JobStatusProbe = self.get_json(&format!("jobs/get/{job_id}")).await?;
        Ok(probe.status)
    }

    async fn create_job(&self, url: &str, format: &str) -> Result<JobId, ApiError> {
        let endpoint = self.endpoint("jobs/new")?;
        let request = self
            .authorized(self.client.post(endpoint))
            .form(&[("url", url), ("format", format)]);
        let response = expect_status(self.send(request).await?, StatusCode::ACCEPTED)?;
        let created: CreatedJob = response.json().await.map_err(map_reqwest_error)?;
        Ok(created.job_id)
    }

    async fn list_formats(&self) -> Result<Vec<Format>, ApiError> {
        self.get_json("formats").await
    }

    async fn job_action(&self, job_id: &JobId, action: Action) -> Result<(), ApiError> {
        self.post_action(&format!("jobs/{}/{job_id}", action.as_path()))
            .await
    }

    async fn bulk_action(&self, action: Action) -> Result<(), ApiError> {
        self.post_action(&format!("jobs/{}_all", action.as_path()))
            .await
    }

    async fn task_action(&self, task_id: &TaskId, action: Action) -> Result<(), ApiError> {
        self.post_action(&format!("tasks/{}/{task_id}", action.as_path()))
            .await
    }

    async fn task_log(&self, task_id: &TaskId, stream: LogStream) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&format!("tasks/get_{}/{task_id}", stream.as_str()))?;
        let response = self.send(self.authorized(self.client.get(url))).await?;
        let response = expect_status(response, StatusCode::OK)?;

        let mut bytes = Vec::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    async fn get_config(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("config").await
    }

    async fn set_config(&self, value: &serde_json::Value) -> Result<(), ApiError> {
        let url = self.endpoint("config")?;
        let encoded = value.to_string();
        let request = self
            .authorized(self.client.post(url))
            .form(&[("value", encoded.as_str())]);
        expect_status(self.send(request).await?, StatusCode::ACCEPTED).map(|_| ())
    }

    async fn shutdown(&self) -> Result<(), ApiError> {
        let url = self.endpoint("shutdown_server")?;
        self.send(self.authorized(self.client.post(url))).await?;
        Ok(())
    }
}

fn expect_status(response: Response, expected: StatusCode) -> Result<Response, ApiError> {
    if response.status() == expected {
        Ok(response)
    } else {
        Err(ApiError::status(response.status().as_u16()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
