use crate::analytics::AnalyticsController;
use crate::api::ApiClient;
use crate::chart::TextChartRenderer;
use crate::clipboard::ClipboardChain;
use crate::config::{Cli, Command, Config};
use crate::shorten::{ShortenController, ShortenForm};
use crate::ui::{render_analytics, render_shorten};
use std::process::ExitCode;
use tracing::{info, warn};

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<ExitCode> {
    let api = ApiClient::new(config.api_url.clone());
    info!("using shortener at {}", api.base());

    match cli.command {
        Command::Shorten {
            url,
            alias,
            expires_at,
            copy,
        } => {
            let mut form = ShortenForm::new(url);
            if let Some(alias) = alias {
                form = form.alias(alias);
            }
            if let Some(expires_at) = expires_at {
                form = form.expires_at(expires_at);
            }
            let controller = ShortenController::new(api, ClipboardChain::system())
                .with_quick_stats_delay(config.quick_stats_delay);
            Ok(shorten(&controller, &form, copy).await)
        }
        Command::Analytics { code, link } => {
            let controller = AnalyticsController::new(api, TextChartRenderer::default());
            Ok(analytics(&controller, code, link).await)
        }
    }
}

async fn shorten(controller: &ShortenController, form: &ShortenForm, copy: bool) -> ExitCode {
    if form.alias_enabled {
        let _ = controller.toggle_alias(true).await.await;
    }

    let submitted = match controller.submit_form(form).await {
        Ok(submitted) => submitted,
        Err(_) => {
            println!("{}", render_shorten(&controller.snapshot().await));
            return ExitCode::FAILURE;
        }
    };

    if copy {
        // Shown in the rendered view on failure.
        let _ = controller.copy_result().await;
    }
    if let Err(err) = submitted.quick_stats.await {
        warn!("quick stats task failed: {err}");
    }

    println!("{}", render_shorten(&controller.snapshot().await));
    if let Some(link) = controller.analytics_link().await {
        println!("Analytics: {link}");
    }
    ExitCode::SUCCESS
}

async fn analytics(
    controller: &AnalyticsController<TextChartRenderer>,
    code: Option<String>,
    link: Option<String>,
) -> ExitCode {
    let outcome = match (link, code) {
        (Some(link), _) => match controller.initialize(&link).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                println!("No short code found in {link:?}");
                return ExitCode::FAILURE;
            }
            Err(err) => Err(err),
        },
        (None, code) => controller.search(code.as_deref().unwrap_or_default()).await,
    };

    let view = controller.view();
    println!("{}", render_analytics(&*view.lock().await));
    if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
