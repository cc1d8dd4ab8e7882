use crate::api::ApiClient;
use crate::chart::{Canvas, ChartRenderer};
use crate::errors::AppError;
use crate::models::AnalyticsSummary;
use crate::state::{
    AnalyticsPhase, AnalyticsView, ChartSlot, InFlight, RecentActivity, SharedView, SummaryFields,
    shared,
};
use crate::stats::{
    ChartPlan, NO_RECENT_CLICKS, activity_rows, build_overview, country_chart, device_chart,
    hourly_chart, referrer_chart,
};
use crate::validation::{MSG_CODE_EMPTY, validate_short_code};
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use url::Url;

pub const MSG_NOT_FOUND: &str = "Short code not found. Please check the code and try again.";
pub const MSG_FORBIDDEN: &str = "Access denied. You do not have permission to view this data.";
pub const MSG_LOAD_FAILED: &str =
    "Failed to load analytics. Please check the short code and try again.";
pub const MSG_MALFORMED: &str = "Received malformed analytics data";
pub const MSG_DISPLAY_ERROR: &str = "Error displaying analytics data";

pub struct AnalyticsController<R> {
    api: ApiClient,
    view: SharedView<AnalyticsView>,
    renderer: Mutex<R>,
    in_flight: InFlight,
}

impl<R: ChartRenderer> AnalyticsController<R> {
    pub fn new(api: ApiClient, renderer: R) -> Self {
        Self {
            api,
            view: shared(AnalyticsView::default()),
            renderer: Mutex::new(renderer),
            in_flight: InFlight::default(),
        }
    }

    pub fn view(&self) -> SharedView<AnalyticsView> {
        Arc::clone(&self.view)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_held()
    }

    /// Loads analytics straight away when `page_link` carries a `code`
    /// query parameter. Returns whether a load was attempted.
    pub async fn initialize(&self, page_link: &str) -> Result<bool, AppError> {
        let Some(code) = code_from_link(page_link) else {
            debug!(%page_link, "no short code in page link");
            return Ok(false);
        };
        self.load_analytics(&code).await.map(|()| true)
    }

    /// Search box submission.
    pub async fn search(&self, input: &str) -> Result<(), AppError> {
        let code = input.trim();
        if code.is_empty() {
            if self.in_flight.is_held() {
                return Err(AppError::Busy);
            }
            let err = AppError::validation(MSG_CODE_EMPTY);
            error!("analytics error: {err}");
            self.view.lock().await.show_error(MSG_CODE_EMPTY);
            return Err(err);
        }
        self.load_analytics(code).await
    }

    /// Typing clears the banners, but never the phase of a pending load.
    pub async fn on_code_input(&self, value: &str) {
        let mut view = self.view.lock().await;
        view.code_input = value.to_owned();
        if !self.in_flight.is_held() {
            view.hide_messages();
        }
    }

    pub async fn load_analytics(&self, code: &str) -> Result<(), AppError> {
        let code = code.trim();
        let Some(_latch) = self.in_flight.try_acquire() else {
            debug!(%code, "load ignored while a request is in flight");
            return Err(AppError::Busy);
        };

        {
            let mut view = self.view.lock().await;
            view.code_input = code.to_owned();
            if let Err(err) = validate_short_code(code) {
                error!("analytics error: {err}");
                view.show_error(analytics_error_message(&err));
                return Err(err);
            }
            view.hide_messages();
            view.phase = AnalyticsPhase::Loading;
            view.set_loading(true);
        }

        info!(%code, "loading analytics");
        let fetched = self.api.analytics(code).await;

        let mut view = self.view.lock().await;
        view.set_loading(false);
        match fetched {
            Ok(summary) => {
                debug!(%code, total_clicks = summary.total_clicks, "analytics received");
                let mut renderer = self.renderer.lock().await;
                render_into(&mut view, &mut *renderer, &summary);
                view.phase = AnalyticsPhase::Loaded;
                Ok(())
            }
            Err(err) => {
                error!(%code, "error loading analytics: {err}");
                view.show_error(analytics_error_message(&err));
                Err(err)
            }
        }
    }

    /// Replaces everything on the page with `summary`. Chart failures are
    /// returned; the rest of the page is still rendered.
    pub async fn render(&self, summary: &AnalyticsSummary) -> Vec<AppError> {
        let mut view = self.view.lock().await;
        let mut renderer = self.renderer.lock().await;
        let failures = render_into(&mut view, &mut *renderer, summary);
        view.phase = AnalyticsPhase::Loaded;
        failures
    }
}

fn render_into(
    view: &mut AnalyticsView,
    renderer: &mut dyn ChartRenderer,
    summary: &AnalyticsSummary,
) -> Vec<AppError> {
    view.destroy_charts();
    view.display_error = None;

    let overview = build_overview(summary);
    view.fields = SummaryFields {
        total_clicks: overview.total_clicks,
        unique_countries: overview.unique_countries,
        unique_devices: overview.unique_devices,
        peak_hour: overview.peak_hour,
    };

    let plans = [
        (Canvas::Country, country_chart(&summary.clicks_by_country)),
        (Canvas::Device, device_chart(&summary.clicks_by_device)),
        (Canvas::Hourly, hourly_chart(&summary.clicks_by_hour)),
        (Canvas::Referrer, referrer_chart(&summary.top_referrers)),
    ];

    let mut failures = Vec::new();
    for (canvas, plan) in plans {
        let slot = match plan {
            ChartPlan::NoData(message) => ChartSlot::NoData(message.to_string()),
            ChartPlan::Draw {
                kind,
                series,
                options,
            } => match renderer.render(canvas, kind, &series, &options) {
                Ok(handle) => ChartSlot::Rendered(handle),
                Err(err) => {
                    error!(chart = canvas.title(), "error rendering chart: {err}");
                    failures.push(err);
                    ChartSlot::Failed(MSG_DISPLAY_ERROR.to_string())
                }
            },
        };
        view.charts.insert(canvas, slot);
    }

    let rows = activity_rows(&summary.recent_clicks);
    view.recent = Some(if rows.is_empty() {
        RecentActivity::Placeholder(NO_RECENT_CLICKS.to_string())
    } else {
        RecentActivity::Rows(rows)
    });

    if !failures.is_empty() {
        view.display_error = Some(MSG_DISPLAY_ERROR.to_string());
    }
    failures
}

/// `code` query parameter of an absolute or relative page link such as
/// `analytics?code=abc123`.
pub fn code_from_link(link: &str) -> Option<String> {
    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(_) => Url::parse("http://localhost/").ok()?.join(link).ok()?,
    };
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.trim().to_owned())
        .filter(|code| !code.is_empty())
}

/// User-facing message for a failed load.
pub fn analytics_error_message(err: &AppError) -> String {
    match err {
        AppError::Validation(message) => message.clone(),
        AppError::HttpStatus { status, .. } if *status == StatusCode::NOT_FOUND => {
            MSG_NOT_FOUND.to_string()
        }
        AppError::HttpStatus { status, .. } if *status == StatusCode::FORBIDDEN => {
            MSG_FORBIDDEN.to_string()
        }
        AppError::HttpStatus { status, .. } => {
            format!("HTTP {}: Failed to load analytics", status.as_u16())
        }
        AppError::Decode(_) => MSG_MALFORMED.to_string(),
        AppError::Render(_) => MSG_DISPLAY_ERROR.to_string(),
        _ => MSG_LOAD_FAILED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MSG_CODE_INVALID;

    #[test]
    fn code_is_read_from_links() {
        assert_eq!(code_from_link("analytics?code=abc123").as_deref(), Some("abc123"));
        assert_eq!(
            code_from_link("https://links.example/analytics.html?x=1&code=my-link").as_deref(),
            Some("my-link")
        );
        assert_eq!(code_from_link("?code=%20xyz%20").as_deref(), Some("xyz"));
        assert_eq!(code_from_link("analytics?code="), None);
        assert_eq!(code_from_link("analytics"), None);
    }

    #[test]
    fn status_codes_map_to_messages() {
        let status = |code: u16| AppError::HttpStatus {
            status: StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        };
        assert_eq!(analytics_error_message(&status(404)), MSG_NOT_FOUND);
        assert_eq!(analytics_error_message(&status(403)), MSG_FORBIDDEN);
        assert_eq!(
            analytics_error_message(&status(502)),
            "HTTP 502: Failed to load analytics"
        );
        assert_eq!(
            analytics_error_message(&AppError::Decode("eof".into())),
            MSG_MALFORMED
        );
        assert_eq!(
            analytics_error_message(&AppError::Network("reset".into())),
            MSG_LOAD_FAILED
        );
        assert_eq!(
            analytics_error_message(&AppError::validation(MSG_CODE_INVALID)),
            MSG_CODE_INVALID
        );
    }
}
