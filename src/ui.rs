use crate::chart::Canvas;
use crate::state::{
    AliasPanel, AnalyticsPhase, AnalyticsView, ChartSlot, CopyStatus, RecentActivity, ShortenPhase,
    ShortenView,
};
use crate::stats::ActivityRow;
use std::fmt::Write as _;

pub fn render_shorten(view: &ShortenView) -> String {
    let mut out = String::new();
    match &view.phase {
        ShortenPhase::Idle => {}
        ShortenPhase::Submitting => out.push_str(view.submit_label),
        ShortenPhase::Failed { message } => {
            let _ = write!(out, "Error: {message}");
        }
        ShortenPhase::Success {
            short_url,
            short_code,
        } => {
            out.push_str(
                &RESULT_TEXT
                    .replace("{{URL}}", short_url)
                    .replace("{{CODE}}", short_code)
                    .replace("{{COPY}}", view.copy_label()),
            );
            if let Some(stats) = &view.quick_stats {
                out.push_str(
                    &QUICK_STATS_TEXT
                        .replace("{{CLICKS}}", &stats.total_clicks.to_string())
                        .replace("{{COUNTRIES}}", &stats.countries.to_string())
                        .replace("{{DEVICES}}", &stats.devices.to_string())
                        .replace("{{REFERRERS}}", &stats.referrers.to_string()),
                );
            }
        }
    }
    if let CopyStatus::Failed(message) = &view.copy {
        let _ = write!(out, "\nError: {message}");
    }
    if view.alias_panel == AliasPanel::Shown && !view.alias_input.is_empty() {
        let _ = write!(out, "\nCustom alias: {}", view.alias_input);
    }
    out
}

pub fn render_analytics(view: &AnalyticsView) -> String {
    match &view.phase {
        AnalyticsPhase::Idle => String::new(),
        AnalyticsPhase::Loading => view.search_label.to_string(),
        AnalyticsPhase::Failed { message } => format!("Error: {message}"),
        AnalyticsPhase::Loaded => render_loaded(view),
    }
}

fn render_loaded(view: &AnalyticsView) -> String {
    let mut out = SUMMARY_TEXT
        .replace("{{CODE}}", &view.code_input)
        .replace("{{TOTAL}}", &view.fields.total_clicks)
        .replace("{{COUNTRIES}}", &view.fields.unique_countries)
        .replace("{{DEVICES}}", &view.fields.unique_devices)
        .replace("{{PEAK}}", &view.fields.peak_hour);

    if let Some(message) = &view.display_error {
        let _ = write!(out, "\nError: {message}\n");
    }

    for canvas in Canvas::ALL {
        let _ = write!(out, "\n{}\n", canvas.title());
        match view.charts.get(&canvas) {
            Some(ChartSlot::Rendered(handle)) => {
                out.push_str(&handle.text().unwrap_or_default());
                out.push('\n');
            }
            Some(ChartSlot::NoData(message)) | Some(ChartSlot::Failed(message)) => {
                let _ = writeln!(out, "  {message}");
            }
            None => {}
        }
    }

    out.push_str("\nRecent Clicks\n");
    match &view.recent {
        Some(RecentActivity::Rows(rows)) => {
            for row in rows {
                out.push_str(&render_activity(row));
            }
        }
        Some(RecentActivity::Placeholder(message)) => {
            let _ = writeln!(out, "  {message}");
        }
        None => {}
    }
    out
}

fn render_activity(row: &ActivityRow) -> String {
    CLICK_TEXT
        .replace("{{TIME}}", &row.time)
        .replace("{{DEVICE}}", &row.device)
        .replace("{{BROWSER}}", &row.browser)
        .replace("{{OS}}", &row.os)
        .replace("{{COUNTRY}}", &row.country)
        .replace("{{CITY}}", &row.city)
        .replace("{{REFERRER}}", &row.referrer)
        .replace("{{IP}}", &row.ip)
}

const RESULT_TEXT: &str = "Short URL: {{URL}}
Short code: {{CODE}}  [{{COPY}}]";

const QUICK_STATS_TEXT: &str = "
Clicks: {{CLICKS}}  Countries: {{COUNTRIES}}  Devices: {{DEVICES}}  Referrers: {{REFERRERS}}";

const SUMMARY_TEXT: &str = "Analytics for {{CODE}}
  Total clicks:     {{TOTAL}}
  Countries:        {{COUNTRIES}}
  Device types:     {{DEVICES}}
  Peak hour:        {{PEAK}}
";

const CLICK_TEXT: &str = "  {{TIME}}  {{DEVICE}}
    Browser: {{BROWSER}}  OS: {{OS}}
    Country: {{COUNTRY}}  City: {{CITY}}
    Referrer: {{REFERRER}}  IP: {{IP}}
";
