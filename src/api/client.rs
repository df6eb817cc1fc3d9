use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::models::{
    ApiConfig, CookiePayload, InputRequest, TypesResponse, UpdateCookiesRequest, VersionResponse,
};
use crate::domain::AppError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Service returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RequestError(e) if e.is_decode() => AppError::InvalidResponse(e.to_string()),
            ApiError::RequestError(e) => match e.status() {
                Some(status) => AppError::NonSuccessStatus(status.as_u16()),
                None => AppError::NetworkUnreachable(e.to_string()),
            },
            ApiError::Status(code) => AppError::NonSuccessStatus(code),
            ApiError::InvalidResponse(msg) => AppError::InvalidResponse(msg),
        }
    }
}

/// Client for the Hitomi Downloader HTTP API.
///
/// Every call is bounded by the configured timeout, and only a plain
/// `200 OK` counts as success.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn ensure_ok(response: Response) -> Result<Response> {
        if response.status() == StatusCode::OK {
            Ok(response)
        } else {
            Err(ApiError::Status(response.status().as_u16()))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Liveness probe.
    ///
    /// Returns the reported version, or `None` when the service answered 200
    /// with a body that isn't `{version}`.
    pub async fn version(&self) -> Result<Option<String>> {
        let response = self.http.get(self.endpoint("version")).send().await?;
        let response = Self::ensure_ok(response)?;

        match Self::decode::<VersionResponse>(response).await {
            Ok(body) => Ok(Some(body.version)),
            Err(e) => {
                tracing::debug!("Ignoring unreadable /version body: {e}");
                Ok(None)
            }
        }
    }

    /// Ask the service which extractor types accept `input`.
    pub async fn types(&self, input: &str) -> Result<Vec<String>> {
        let response = self
            .http
            .post(self.endpoint("types"))
            .json(&InputRequest {
                input: input.to_string(),
            })
            .send()
            .await?;
        let response = Self::ensure_ok(response)?;
        let body: TypesResponse = Self::decode(response).await?;
        Ok(body.types)
    }

    pub async fn download(&self, input: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("download"))
            .json(&InputRequest {
                input: input.to_string(),
            })
            .send()
            .await?;
        Self::ensure_ok(response)?;
        Ok(())
    }

    pub async fn update_cookies(&self, cookies: Vec<CookiePayload>) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("update_cookies"))
            .json(&UpdateCookiesRequest { cookies })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("update_cookies failed with {status}: {body}");
            return Err(ApiError::Status(status));
        }
        Ok(())
    }
}
