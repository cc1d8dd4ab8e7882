use crate::errors::AppError;
use crate::models::{AnalyticsSummary, ShortenRequest};
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

/// HTTP client for the shortener backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self::with_client(base, Client::new())
    }

    pub fn with_client(base: Url, http: Client) -> Self {
        Self { base, http }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// Link to the analytics page for `code`.
    pub fn analytics_page(&self, code: &str) -> String {
        self.endpoint(&format!("/analytics?code={code}"))
    }

    /// `POST /api/shorten`; returns the short URL from the plain-text body.
    pub async fn shorten(&self, request: &ShortenRequest) -> Result<String, AppError> {
        let url = self.endpoint("/api/shorten");
        debug!(%url, target_url = %request.url, alias = ?request.alias, "shortening");
        let response = self.http.post(&url).form(request).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.text().await?.trim().to_owned())
    }

    /// `GET /api/analytics/{code}`.
    pub async fn analytics(&self, code: &str) -> Result<AnalyticsSummary, AppError> {
        let url = self.endpoint(&format!("/api/analytics/{code}"));
        debug!(%url, "fetching analytics");
        let response = self.http.get(&url).send().await?;
        let response = ensure_success(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::HttpStatus { status, body })
}
