//! The asynchronous request capability the workflow runs against, and its reqwest transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{HistoryId, StyleEndpoint, UserId},
    error::{ApiError, ApiErrorBody},
    protocol::{
        HealthResponse, HistoryResponse, SignInRequest, SignInResponse, SignUpRequest,
        SignUpResponse, StylizeResponse,
    },
};
use tracing::{debug, info};
use url::Url;

use crate::{error::BackendError, media::UPLOAD_FILE_NAME};

const NGROK_SKIP_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylizeRequest {
    pub endpoint: StyleEndpoint,
    pub media_type: String,
    pub image: Vec<u8>,
    pub user_id: UserId,
}

#[async_trait]
pub trait StudioBackend: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, BackendError>;
    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, BackendError>;
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, BackendError>;
    /// A well-formed reply is returned as-is even when it carries `error` instead of `image`.
    async fn stylize(&self, request: &StylizeRequest) -> Result<StylizeResponse, BackendError>;
    async fn fetch_history(&self, user_id: UserId) -> Result<HistoryResponse, BackendError>;
    async fn delete_history(&self, id: HistoryId) -> Result<(), BackendError>;
}

pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url.trim())
            .map_err(|err| BackendError::Transport(format!("invalid backend url: {err}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|err| BackendError::Transport(format!("invalid request path {path}: {err}")))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let raw = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::new(status.as_u16(), &ApiErrorBody::parse_lenient(&raw)).into());
    }
    serde_json::from_str(&raw).map_err(|err| BackendError::Decode(err.to_string()))
}

#[async_trait]
impl StudioBackend for HttpBackend {
    async fn health(&self) -> Result<HealthResponse, BackendError> {
        let response = self.http.get(self.endpoint("")?).send().await?;
        read_json(response).await
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, BackendError> {
        let response = self
            .http
            .post(self.endpoint("api/signin")?)
            .json(request)
            .send()
            .await?;
        let body: SignInResponse = read_json(response).await?;
        info!(user_id = body.id.0, "signed in");
        Ok(body)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, BackendError> {
        let response = self
            .http
            .post(self.endpoint("api/signup")?)
            .json(request)
            .send()
            .await?;
        let body: SignUpResponse = read_json(response).await?;
        info!(email = %body.email, "account created");
        Ok(body)
    }

    async fn stylize(&self, request: &StylizeRequest) -> Result<StylizeResponse, BackendError> {
        let image = multipart::Part::bytes(request.image.clone())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(&request.media_type)?;
        let form = multipart::Form::new()
            .part("image", image)
            .text("user_id", request.user_id.to_string());

        let response = self
            .http
            .post(self.endpoint(&format!("api/style/{}", request.endpoint))?)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let raw = response.text().await?;
        // Error replies share the success shape, so the body is parsed before the status.
        let body: StylizeResponse =
            serde_json::from_str(&raw).map_err(|err| BackendError::Decode(err.to_string()))?;
        info!(
            endpoint = %request.endpoint,
            user_id = request.user_id.0,
            status = status.as_u16(),
            has_image = body.image.is_some(),
            "stylize request completed"
        );
        if status.is_success() {
            Ok(body)
        } else {
            Err(BackendError::Status {
                status: status.as_u16(),
                message: body.error.filter(|message| !message.trim().is_empty()),
            })
        }
    }

    async fn fetch_history(&self, user_id: UserId) -> Result<HistoryResponse, BackendError> {
        let response = self
            .http
            .get(self.endpoint(&format!("api/history/{user_id}"))?)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(NGROK_SKIP_WARNING_HEADER, "true")
            .send()
            .await?;
        let body: HistoryResponse = read_json(response).await?;
        debug!(user_id = user_id.0, entries = body.history.len(), "history fetched");
        Ok(body)
    }

    async fn delete_history(&self, id: HistoryId) -> Result<(), BackendError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("api/history/{id}"))?)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(ApiError::new(status.as_u16(), &ApiErrorBody::parse_lenient(&raw)).into());
        }
        info!(history_id = id.0, "history entry deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
