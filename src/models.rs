use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Form body of `POST /api/shorten`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(rename = "expiresAt", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl ShortenRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alias: None,
            expires_at: None,
        }
    }

    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    pub fn with_expiry(mut self, expires_at: Option<NaiveDateTime>) -> Self {
        self.expires_at = expires_at.map(|at| at.format("%Y-%m-%dT%H:%M:%S").to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenResult {
    pub short_url: String,
    pub short_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSummary {
    pub total_clicks: u64,
    pub clicks_by_country: Vec<(Option<String>, u64)>,
    pub clicks_by_device: Vec<(String, u64)>,
    pub clicks_by_hour: Vec<(i64, u64)>,
    pub top_referrers: Vec<(Option<String>, u64)>,
    pub recent_clicks: Vec<ClickEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickEvent {
    pub timestamp: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub referer: Option<String>,
    pub ip_address: Option<String>,
}

/// Counts shown in the panel right after a link is shortened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuickStats {
    pub total_clicks: u64,
    pub countries: usize,
    pub devices: usize,
    pub referrers: usize,
}

impl From<&AnalyticsSummary> for QuickStats {
    fn from(summary: &AnalyticsSummary) -> Self {
        Self {
            total_clicks: summary.total_clicks,
            countries: summary.clicks_by_country.len(),
            devices: summary.clicks_by_device.len(),
            referrers: summary.top_referrers.len(),
        }
    }
}
