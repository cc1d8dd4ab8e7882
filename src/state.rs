use crate::chart::{Canvas, ChartHandle};
use crate::models::QuickStats;
use crate::stats::ActivityRow;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

pub type SharedView<T> = Arc<Mutex<T>>;

pub const SHORTEN_LABEL: &str = "Shorten URL";
pub const SHORTEN_BUSY_LABEL: &str = "Shortening...";
pub const SEARCH_LABEL: &str = "Get Analytics";
pub const SEARCH_BUSY_LABEL: &str = "Loading...";
pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";

/// Result and error banners are one enum so only one can show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShortenPhase {
    #[default]
    Idle,
    Submitting,
    Success {
        short_url: String,
        short_code: String,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AliasPanel {
    #[default]
    Hidden,
    Showing,
    Shown,
    Hiding,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CopyStatus {
    #[default]
    Ready,
    Copied,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenView {
    pub url_input: String,
    pub alias_enabled: bool,
    pub alias_input: String,
    pub alias_panel: AliasPanel,
    pub phase: ShortenPhase,
    pub loading: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub copy: CopyStatus,
    pub quick_stats: Option<QuickStats>,
    /// Code of the most recent successful shortening. Outlives the result
    /// banner so analytics stay reachable after further input.
    pub last_short_code: Option<String>,
}

impl Default for ShortenView {
    fn default() -> Self {
        Self {
            url_input: String::new(),
            alias_enabled: false,
            alias_input: String::new(),
            alias_panel: AliasPanel::Hidden,
            phase: ShortenPhase::Idle,
            loading: false,
            submit_enabled: true,
            submit_label: SHORTEN_LABEL,
            copy: CopyStatus::Ready,
            quick_stats: None,
            last_short_code: None,
        }
    }
}

impl ShortenView {
    pub fn hide_messages(&mut self) {
        self.phase = ShortenPhase::Idle;
        self.copy = CopyStatus::Ready;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.phase = ShortenPhase::Failed {
            message: message.into(),
        };
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.submit_enabled = !loading;
        self.submit_label = if loading { SHORTEN_BUSY_LABEL } else { SHORTEN_LABEL };
    }

    pub fn short_url(&self) -> Option<&str> {
        match &self.phase {
            ShortenPhase::Success { short_url, .. } => Some(short_url),
            _ => None,
        }
    }

    pub fn short_code(&self) -> Option<&str> {
        match &self.phase {
            ShortenPhase::Success { short_code, .. } => Some(short_code),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            ShortenPhase::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn copy_label(&self) -> &'static str {
        match self.copy {
            CopyStatus::Copied => COPIED_LABEL,
            _ => COPY_LABEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalyticsPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed {
        message: String,
    },
}

#[derive(Debug)]
pub enum ChartSlot {
    Rendered(Box<dyn ChartHandle>),
    NoData(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecentActivity {
    Rows(Vec<ActivityRow>),
    Placeholder(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFields {
    pub total_clicks: String,
    pub unique_countries: String,
    pub unique_devices: String,
    pub peak_hour: String,
}

#[derive(Debug)]
pub struct AnalyticsView {
    pub code_input: String,
    pub phase: AnalyticsPhase,
    pub loading: bool,
    pub search_enabled: bool,
    pub search_label: &'static str,
    /// Shown alongside rendered data when a visualization failed.
    pub display_error: Option<String>,
    pub fields: SummaryFields,
    pub charts: BTreeMap<Canvas, ChartSlot>,
    pub recent: Option<RecentActivity>,
}

impl Default for AnalyticsView {
    fn default() -> Self {
        Self {
            code_input: String::new(),
            phase: AnalyticsPhase::Idle,
            loading: false,
            search_enabled: true,
            search_label: SEARCH_LABEL,
            display_error: None,
            fields: SummaryFields::default(),
            charts: BTreeMap::new(),
            recent: None,
        }
    }
}

impl AnalyticsView {
    pub fn hide_messages(&mut self) {
        self.phase = AnalyticsPhase::Idle;
        self.display_error = None;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.phase = AnalyticsPhase::Failed {
            message: message.into(),
        };
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.search_enabled = !loading;
        self.search_label = if loading { SEARCH_BUSY_LABEL } else { SEARCH_LABEL };
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            AnalyticsPhase::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Disposes every drawn chart and empties the canvases.
    pub fn destroy_charts(&mut self) {
        for slot in self.charts.values_mut() {
            if let ChartSlot::Rendered(handle) = slot {
                handle.dispose();
            }
        }
        self.charts.clear();
    }
}

/// Disabled-control latch: at most one request per controller.
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
    pub fn try_acquire(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }

    pub fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub fn shared<T>(view: T) -> SharedView<T> {
    Arc::new(Mutex::new(view))
}
