use crate::chart::{ChartKind, ChartOptions, Series};
use crate::models::{AnalyticsSummary, ClickEvent};
use chrono::{DateTime, Local, NaiveDateTime};
use std::collections::HashSet;

pub const DIRECT_TRAFFIC: &str = "Direct Traffic";
pub const UNKNOWN: &str = "Unknown";
pub const NO_GEO_DATA: &str = "No geographic data available";
pub const NO_DEVICE_DATA: &str = "No device data available";
pub const NO_REFERRER_DATA: &str = "No referrer data available";
pub const NO_RECENT_CLICKS: &str = "No recent clicks to display";

const TOP_COUNTRIES: usize = 8;
const TOP_REFERRERS: usize = 6;
const REFERRER_CHART_LABEL_LEN: usize = 25;
const REFERRER_ACTIVITY_LABEL_LEN: usize = 40;

/// The four numbers at the top of the analytics page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub total_clicks: String,
    pub unique_countries: String,
    pub unique_devices: String,
    pub peak_hour: String,
}

/// What a canvas should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartPlan {
    Draw {
        kind: ChartKind,
        series: Series,
        options: ChartOptions,
    },
    NoData(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub time: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub country: String,
    pub city: String,
    pub referrer: String,
    pub ip: String,
}

pub fn build_overview(summary: &AnalyticsSummary) -> Overview {
    Overview {
        total_clicks: format_thousands(summary.total_clicks),
        unique_countries: unique_countries(&summary.clicks_by_country).to_string(),
        unique_devices: unique_devices(&summary.clicks_by_device).to_string(),
        peak_hour: peak_hour(&summary.clicks_by_hour)
            .map(|hour| format!("{hour}:00"))
            .unwrap_or_else(|| "N/A".to_string()),
    }
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn unique_countries(clicks_by_country: &[(Option<String>, u64)]) -> usize {
    clicks_by_country
        .iter()
        .filter_map(|(country, _)| country.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

pub fn unique_devices(clicks_by_device: &[(String, u64)]) -> usize {
    clicks_by_device
        .iter()
        .map(|(device, _)| device.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Hour with the most clicks; the first entry wins a tie. `None` when no
/// hour has any clicks.
pub fn peak_hour(clicks_by_hour: &[(i64, u64)]) -> Option<i64> {
    let (hour, count) = clicks_by_hour
        .iter()
        .fold((0, 0), |max, &(hour, count)| if count > max.1 { (hour, count) } else { max });
    (count > 0).then_some(hour)
}

pub fn country_chart(clicks_by_country: &[(Option<String>, u64)]) -> ChartPlan {
    let series: Series = clicks_by_country
        .iter()
        .filter_map(|(country, count)| match country {
            Some(country) if *count > 0 => Some((country.clone(), *count)),
            _ => None,
        })
        .take(TOP_COUNTRIES)
        .unzip::<_, _, Vec<_>, Vec<_>>()
        .into();

    if series.is_empty() {
        return ChartPlan::NoData(NO_GEO_DATA);
    }
    let mut options = proportional_options(&series);
    options.cutout_percent = Some(60);
    ChartPlan::Draw {
        kind: ChartKind::Donut,
        series,
        options,
    }
}

pub fn device_chart(clicks_by_device: &[(String, u64)]) -> ChartPlan {
    if clicks_by_device.is_empty() {
        return ChartPlan::NoData(NO_DEVICE_DATA);
    }
    let series: Series = clicks_by_device
        .iter()
        .cloned()
        .unzip::<_, _, Vec<_>, Vec<_>>()
        .into();
    let options = proportional_options(&series);
    ChartPlan::Draw {
        kind: ChartKind::Pie,
        series,
        options,
    }
}

/// Always 24 points; hours missing from the input count as zero.
pub fn hourly_chart(clicks_by_hour: &[(i64, u64)]) -> ChartPlan {
    let series: Series = (0..24)
        .map(|hour| {
            let count = clicks_by_hour
                .iter()
                .find(|(h, _)| *h == hour)
                .map(|(_, count)| *count)
                .unwrap_or(0);
            (format!("{hour}:00"), count)
        })
        .unzip::<_, _, Vec<_>, Vec<_>>()
        .into();

    ChartPlan::Draw {
        kind: ChartKind::Line,
        series,
        options: ChartOptions {
            fill: true,
            ..Default::default()
        },
    }
}

pub fn referrer_chart(top_referrers: &[(Option<String>, u64)]) -> ChartPlan {
    if top_referrers.is_empty() {
        return ChartPlan::NoData(NO_REFERRER_DATA);
    }
    let series: Series = top_referrers
        .iter()
        .take(TOP_REFERRERS)
        .map(|(referrer, count)| {
            (referrer_label(referrer.as_deref(), REFERRER_CHART_LABEL_LEN), *count)
        })
        .unzip::<_, _, Vec<_>, Vec<_>>()
        .into();

    ChartPlan::Draw {
        kind: ChartKind::Bar,
        series,
        options: ChartOptions::default(),
    }
}

/// `None`, `""` and `"null"` mean the click had no referrer.
pub fn referrer_label(referrer: Option<&str>, max_chars: usize) -> String {
    match referrer {
        None | Some("") | Some("null") => DIRECT_TRAFFIC.to_string(),
        Some(referrer) => truncate(referrer, max_chars),
    }
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

fn proportional_options(series: &Series) -> ChartOptions {
    let total = series.total();
    let legend = series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, count)| format!("{label} ({count})"))
        .collect();
    let tooltips = series
        .labels
        .iter()
        .zip(&series.values)
        .map(|(label, count)| format!("{label}: {count} ({}%)", percentage(*count, total)))
        .collect();
    ChartOptions {
        legend,
        tooltips,
        ..Default::default()
    }
}

fn percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", count as f64 / total as f64 * 100.0)
}

pub fn activity_rows(recent_clicks: &[ClickEvent]) -> Vec<ActivityRow> {
    recent_clicks.iter().map(activity_row).collect()
}

fn activity_row(click: &ClickEvent) -> ActivityRow {
    ActivityRow {
        time: click
            .timestamp
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| UNKNOWN.to_string()),
        device: or_unknown(&click.device_type),
        browser: with_version(&click.browser, &click.browser_version),
        os: with_version(&click.os, &click.os_version),
        country: or_unknown(&click.country),
        city: or_unknown(&click.city),
        referrer: referrer_label(click.referer.as_deref(), REFERRER_ACTIVITY_LABEL_LEN),
        ip: or_unknown(&click.ip_address),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn or_unknown(value: &Option<String>) -> String {
    present(value).unwrap_or(UNKNOWN).to_string()
}

fn with_version(name: &Option<String>, version: &Option<String>) -> String {
    let name = present(name).unwrap_or(UNKNOWN);
    match present(version) {
        Some(version) => format!("{name} {version}"),
        None => name.to_string(),
    }
}

/// Renders as e.g. `Jan 5, 02:30 PM` in local time. Timestamps without an
/// offset are taken as local already.
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(at) => at.format("%b %-d, %I:%M %p").to_string(),
        None => "Invalid Date".to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Local).naive_local());
    }
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}
