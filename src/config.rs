use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_QUICK_STATS_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the shortener backend, e.g. "https://links.example".
    pub api_url: Url,

    /// Wait before fetching quick stats for a new link. Never below one second.
    pub quick_stats_delay: Duration,
}

impl Config {
    /// Reads `SHORTENER_API_URL` and `SHORTENER_QUICK_STATS_DELAY_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("SHORTENER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let api_url = parse_api_url(&api_url)?;

        let delay_ms = match lookup("SHORTENER_QUICK_STATS_DELAY_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("SHORTENER_QUICK_STATS_DELAY_MS must be a number of milliseconds")?,
            None => DEFAULT_QUICK_STATS_DELAY_MS,
        };

        Ok(Self {
            api_url,
            quick_stats_delay: Duration::from_millis(delay_ms.max(DEFAULT_QUICK_STATS_DELAY_MS)),
        })
    }

    /// Command-line flags win over the environment.
    pub fn apply_args(mut self, cli: &Cli) -> Result<Self> {
        if let Some(api_url) = &cli.api_url {
            self.api_url = parse_api_url(api_url)?;
        }
        Ok(self)
    }
}

pub fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid API URL {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("API URL must use http or https, got {raw:?}");
    }
    Ok(url)
}

#[derive(Debug, Parser)]
#[command(name = "shortener", version, about = "Shorten URLs and inspect their click analytics")]
pub struct Cli {
    /// Shortener backend base URL [env: SHORTENER_API_URL]
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shorten a URL and show its first analytics numbers
    Shorten {
        url: String,

        /// Custom short code (3-20 letters, numbers, hyphens, underscores)
        #[arg(long)]
        alias: Option<String>,

        /// Expiry as local date-time, e.g. 2026-01-31T18:00
        #[arg(long)]
        expires_at: Option<String>,

        /// Copy the short URL to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Show click analytics for a short code
    Analytics {
        code: Option<String>,

        /// Page link carrying a `code` query parameter, e.g. "analytics?code=abc123"
        #[arg(long, conflicts_with = "code")]
        link: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.quick_stats_delay, Duration::from_secs(1));
    }

    #[test]
    fn quick_stats_delay_never_drops_below_one_second() {
        let config =
            Config::from_lookup(lookup(&[("SHORTENER_QUICK_STATS_DELAY_MS", "10")])).unwrap();
        assert_eq!(config.quick_stats_delay, Duration::from_secs(1));
        let config =
            Config::from_lookup(lookup(&[("SHORTENER_QUICK_STATS_DELAY_MS", "2500")])).unwrap();
        assert_eq!(config.quick_stats_delay, Duration::from_millis(2500));
        assert!(Config::from_lookup(lookup(&[("SHORTENER_QUICK_STATS_DELAY_MS", "soon")])).is_err());
    }

    #[test]
    fn api_url_must_be_http() {
        assert!(Config::from_lookup(lookup(&[("SHORTENER_API_URL", "ftp://x.example")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SHORTENER_API_URL", "nonsense")])).is_err());
    }

    #[test]
    fn cli_flag_overrides_env() {
        let cli = Cli::parse_from(["shortener", "--api-url", "https://links.example", "analytics", "abc"]);
        let config = Config::from_lookup(lookup(&[]))
            .unwrap()
            .apply_args(&cli)
            .unwrap();
        assert_eq!(config.api_url.as_str(), "https://links.example/");
        assert!(matches!(cli.command, Command::Analytics { code: Some(ref c), link: None } if c == "abc"));
    }

    #[test]
    fn cli_parses_shorten_flags() {
        let cli = Cli::parse_from([
            "shortener",
            "shorten",
            "https://example.com",
            "--alias",
            "docs",
            "--copy",
        ]);
        match cli.command {
            Command::Shorten {
                url,
                alias,
                expires_at,
                copy,
            } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(alias.as_deref(), Some("docs"));
                assert!(expires_at.is_none());
                assert!(copy);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
