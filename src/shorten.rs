use crate::api::ApiClient;
use crate::clipboard::Clipboard;
use crate::errors::AppError;
use crate::models::{QuickStats, ShortenRequest, ShortenResult};
use crate::state::{
    AliasPanel, CopyStatus, InFlight, SharedView, ShortenPhase, ShortenView, shared,
};
use crate::validation::{parse_expiry, short_code_from_url, validate_alias, validate_url};
use reqwest::StatusCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const MSG_ALIAS_TAKEN: &str = "Custom alias is already taken. Please choose a different one.";
pub const MSG_BAD_REQUEST: &str = "Invalid request. Please check your input and try again.";
pub const MSG_SHORTEN_FAILED: &str = "Failed to shorten URL. Please try again.";
pub const MSG_COPY_FAILED: &str = "Failed to copy URL. Please copy manually.";
pub const MSG_NOTHING_TO_COPY: &str = "Shorten a URL before copying it.";

/// Lower bound so the backend has recorded analytics for the new code.
pub const MIN_QUICK_STATS_DELAY: Duration = Duration::from_secs(1);
const ALIAS_SHOW_DELAY: Duration = Duration::from_millis(10);
const ALIAS_HIDE_DELAY: Duration = Duration::from_millis(300);
const COPY_LABEL_RESET: Duration = Duration::from_secs(2);

/// What the user typed into the shorten form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortenForm {
    pub url: String,
    pub alias_enabled: bool,
    pub alias: String,
    pub expires_at: Option<String>,
}

impl ShortenForm {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias_enabled = true;
        self.alias = alias.into();
        self
    }

    pub fn expires_at(mut self, expires_at: impl Into<String>) -> Self {
        self.expires_at = Some(expires_at.into());
        self
    }

    /// Validates the form and builds the request body.
    pub fn to_request(&self) -> Result<ShortenRequest, AppError> {
        let url = self.url.trim();
        validate_url(url)?;

        let alias = if self.alias_enabled {
            let alias = self.alias.trim();
            validate_alias(alias)?;
            Some(alias.to_owned())
        } else {
            None
        };

        let expires_at = self
            .expires_at
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_expiry)
            .transpose()?;

        Ok(ShortenRequest::new(url)
            .with_alias(alias)
            .with_expiry(expires_at))
    }
}

/// A successful submission. `quick_stats` completes once the delayed
/// analytics summary has been applied (or dropped).
#[derive(Debug)]
pub struct Submitted {
    pub result: ShortenResult,
    pub quick_stats: JoinHandle<()>,
}

pub struct ShortenController {
    api: ApiClient,
    view: SharedView<ShortenView>,
    clipboard: Mutex<Box<dyn Clipboard>>,
    in_flight: InFlight,
    submission: Arc<AtomicU64>,
    toggle: Arc<AtomicU64>,
    copy_round: Arc<AtomicU64>,
    quick_stats_delay: Duration,
}

impl ShortenController {
    pub fn new(api: ApiClient, clipboard: impl Clipboard + 'static) -> Self {
        Self {
            api,
            view: shared(ShortenView::default()),
            clipboard: Mutex::new(Box::new(clipboard)),
            in_flight: InFlight::default(),
            submission: Arc::new(AtomicU64::new(0)),
            toggle: Arc::new(AtomicU64::new(0)),
            copy_round: Arc::new(AtomicU64::new(0)),
            quick_stats_delay: MIN_QUICK_STATS_DELAY,
        }
    }

    /// Delays shorter than [`MIN_QUICK_STATS_DELAY`] are raised to it.
    pub fn with_quick_stats_delay(mut self, delay: Duration) -> Self {
        self.quick_stats_delay = delay.max(MIN_QUICK_STATS_DELAY);
        self
    }

    pub fn view(&self) -> SharedView<ShortenView> {
        Arc::clone(&self.view)
    }

    pub async fn snapshot(&self) -> ShortenView {
        self.view.lock().await.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_held()
    }

    pub async fn submit(
        &self,
        url: &str,
        alias_enabled: bool,
        alias: &str,
    ) -> Result<Submitted, AppError> {
        let form = ShortenForm {
            url: url.to_owned(),
            alias_enabled,
            alias: alias.to_owned(),
            expires_at: None,
        };
        self.submit_form(&form).await
    }

    pub async fn submit_form(&self, form: &ShortenForm) -> Result<Submitted, AppError> {
        let Some(_latch) = self.in_flight.try_acquire() else {
            debug!("submit ignored while a request is in flight");
            return Err(AppError::Busy);
        };
        let (generation, request) = {
            let mut view = self.view.lock().await;
            // Quick stats still pending from an earlier submission are now
            // stale. Bumped under the view lock, where load_quick_stats checks it.
            let generation = self.submission.fetch_add(1, Ordering::AcqRel) + 1;
            view.hide_messages();
            view.url_input = form.url.clone();
            view.alias_enabled = form.alias_enabled;
            view.alias_input = form.alias.clone();

            match form.to_request() {
                Ok(request) => {
                    view.phase = ShortenPhase::Submitting;
                    view.set_loading(true);
                    (generation, request)
                }
                Err(err) => {
                    error!("URL shortener error: {err}");
                    view.show_error(shorten_error_message(&err));
                    return Err(err);
                }
            }
        };

        let outcome = self.api.shorten(&request).await.and_then(|short_url| {
            let short_code = short_code_from_url(&short_url).ok_or_else(|| {
                AppError::Decode(format!("no short code in {short_url:?}"))
            })?;
            Ok(ShortenResult {
                short_url,
                short_code,
            })
        });

        let mut view = self.view.lock().await;
        view.set_loading(false);
        match outcome {
            Ok(result) => {
                info!(
                    original = %request.url,
                    shortened = %result.short_url,
                    short_code = %result.short_code,
                    "URL shortened"
                );
                view.phase = ShortenPhase::Success {
                    short_url: result.short_url.clone(),
                    short_code: result.short_code.clone(),
                };
                view.copy = CopyStatus::Ready;
                view.quick_stats = None;
                view.last_short_code = Some(result.short_code.clone());
                drop(view);

                let quick_stats = self.spawn_quick_stats(result.short_code.clone(), generation);
                Ok(Submitted {
                    result,
                    quick_stats,
                })
            }
            Err(err) => {
                error!("error shortening URL: {err}");
                view.show_error(shorten_error_message(&err));
                Err(err)
            }
        }
    }

    fn spawn_quick_stats(&self, code: String, generation: u64) -> JoinHandle<()> {
        let api = self.api.clone();
        let view = Arc::clone(&self.view);
        let current = Arc::clone(&self.submission);
        let delay = self.quick_stats_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            load_quick_stats(&api, &view, &current, generation, &code).await;
        })
    }

    /// Reloads the quick stats for the current short code right away.
    pub async fn refresh_quick_stats(&self) -> Option<QuickStats> {
        let code = self.view.lock().await.last_short_code.clone()?;
        let generation = self.submission.load(Ordering::Acquire);
        debug!(%code, "refreshing quick stats");
        load_quick_stats(&self.api, &self.view, &self.submission, generation, &code).await;
        self.view.lock().await.quick_stats
    }

    /// Link to the full analytics page for the current short code.
    pub async fn analytics_link(&self) -> Option<String> {
        let view = self.view.lock().await;
        view.last_short_code
            .as_deref()
            .map(|code| self.api.analytics_page(code))
    }

    /// Copies the short URL. A failure is shown next to the result; the
    /// result itself stays.
    pub async fn copy_result(&self) -> Result<(), AppError> {
        let Some(short_url) = self.view.lock().await.short_url().map(str::to_owned) else {
            return Err(AppError::clipboard(MSG_NOTHING_TO_COPY));
        };

        let copied = self.clipboard.lock().await.set_text(&short_url);

        let mut view = self.view.lock().await;
        match copied {
            Ok(()) => {
                info!(%short_url, "URL copied to clipboard");
                view.copy = CopyStatus::Copied;
                drop(view);
                self.schedule_copy_reset();
                Ok(())
            }
            Err(err) => {
                error!("failed to copy: {err}");
                view.copy = CopyStatus::Failed(MSG_COPY_FAILED.to_string());
                Err(err)
            }
        }
    }

    fn schedule_copy_reset(&self) {
        let round = self.copy_round.fetch_add(1, Ordering::AcqRel) + 1;
        let current = Arc::clone(&self.copy_round);
        let view = Arc::clone(&self.view);
        tokio::spawn(async move {
            tokio::time::sleep(COPY_LABEL_RESET).await;
            if current.load(Ordering::Acquire) != round {
                return;
            }
            let mut view = view.lock().await;
            if view.copy == CopyStatus::Copied {
                view.copy = CopyStatus::Ready;
            }
        });
    }

    /// Shows or hides the alias field. The returned task finishes the
    /// transition; a newer toggle supersedes it.
    pub async fn toggle_alias(&self, enabled: bool) -> JoinHandle<()> {
        let generation = self.toggle.fetch_add(1, Ordering::AcqRel) + 1;
        {
            let mut view = self.view.lock().await;
            view.alias_enabled = enabled;
            view.alias_panel = if enabled {
                AliasPanel::Showing
            } else {
                AliasPanel::Hiding
            };
        }

        let current = Arc::clone(&self.toggle);
        let view = Arc::clone(&self.view);
        let delay = if enabled { ALIAS_SHOW_DELAY } else { ALIAS_HIDE_DELAY };
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::Acquire) != generation {
                return;
            }
            let mut view = view.lock().await;
            if enabled {
                view.alias_panel = AliasPanel::Shown;
            } else {
                view.alias_panel = AliasPanel::Hidden;
                view.alias_input.clear();
            }
        })
    }

    pub async fn on_url_input(&self, value: &str) {
        let mut view = self.view.lock().await;
        view.url_input = value.to_owned();
        if !self.in_flight.is_held() {
            view.hide_messages();
        }
    }

    /// Live alias check, trimmed like a submission. An empty field has not
    /// been typed yet and passes.
    pub async fn on_alias_input(&self, value: &str) -> Result<(), AppError> {
        let mut view = self.view.lock().await;
        view.alias_input = value.to_owned();
        view.hide_messages();
        let alias = value.trim();
        if alias.is_empty() {
            return Ok(());
        }
        validate_alias(alias).inspect_err(|err| {
            debug!("alias rejected: {err}");
            view.show_error(err.to_string());
        })
    }
}

async fn load_quick_stats(
    api: &ApiClient,
    view: &SharedView<ShortenView>,
    current: &AtomicU64,
    generation: u64,
    code: &str,
) {
    debug!(%code, "loading quick stats");
    let stats = match api.analytics(code).await {
        Ok(summary) => Some(QuickStats::from(&summary)),
        Err(err) => {
            warn!(%code, "analytics not available: {err}");
            None
        }
    };
    let mut view = view.lock().await;
    if current.load(Ordering::Acquire) != generation {
        debug!(%code, "dropping quick stats for a superseded link");
        return;
    }
    view.quick_stats = stats;
}

/// User-facing message for a failed submission.
pub fn shorten_error_message(err: &AppError) -> String {
    match err {
        AppError::Validation(message) => message.clone(),
        AppError::HttpStatus { status, .. } if *status == StatusCode::CONFLICT => {
            MSG_ALIAS_TAKEN.to_string()
        }
        AppError::HttpStatus { status, .. } if *status == StatusCode::BAD_REQUEST => {
            MSG_BAD_REQUEST.to_string()
        }
        _ => MSG_SHORTEN_FAILED.to_string(),
    }
}
