use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tabcap_app::bridge::{StdioBridge, UiCommand, UiNotice};
use tabcap_app::config::AppConfig;
use tabcap_app::error::CaptureError;
use tabcap_app::orchestrator::{Orchestrator, ThumbnailOutcome};
use tabcap_app::session::BackendStatus;
use tabcap_app::store::RestStore;
use tabcap_rest::RestClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // stdout carries the host protocol; all logging goes to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabcap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = AppConfig::from_env();
    tracing::info!(backend = %config.backend_url, table = %config.table, "loaded configuration");

    // --- REST backend ---
    let client = RestClient::new(config.backend_url.clone(), config.api_key.clone());
    let store = RestStore::new(client, config.table.clone());

    // --- Host bridge + orchestrator ---
    let bridge = StdioBridge::stdio();
    let mut orchestrator = Orchestrator::new(&bridge, store, config);

    let status = orchestrator.check_backend().await;
    tracing::info!(?status, "backend probe complete");
    if let Err(err) = orchestrator.refresh_page_url().await {
        tracing::debug!(%err, "no page URL at startup");
    }

    // --- Command loop ---
    while let Some(cmd) = bridge.next_command().await? {
        let notice = dispatch(&mut orchestrator, cmd).await;
        bridge.notify(&notice).await?;
    }

    tracing::info!("host stream closed, shutting down");
    Ok(())
}

async fn dispatch<H, S>(orchestrator: &mut Orchestrator<H, S>, cmd: UiCommand) -> UiNotice
where
    H: tabcap_capture::host::BrowserHost,
    S: tabcap_app::store::CaptureStore,
{
    let result: Result<String, CaptureError> = match cmd {
        UiCommand::Screenshot => orchestrator
            .capture_screenshot()
            .await
            .map(|()| "Screenshot captured.".into()),
        UiCommand::Thumbnail => orchestrator.capture_thumbnail().await.map(|outcome| {
            match outcome {
                ThumbnailOutcome::Created => "Thumbnail created.".into(),
                ThumbnailOutcome::Cancelled => "Selection cancelled.".into(),
            }
        }),
        UiCommand::Save => orchestrator
            .save()
            .await
            .map(|saved| format!("Capture saved, opening {}", saved.redirect)),
        UiCommand::RefreshUrl => orchestrator
            .refresh_page_url()
            .await
            .map(|()| "URL refreshed.".into()),
        UiCommand::Status => {
            let status = orchestrator.check_backend().await;
            Ok(match status {
                BackendStatus::Connected => "Backend connected.".into(),
                BackendStatus::Error => "Backend unreachable.".into(),
                BackendStatus::Disconnected => "Backend not checked yet.".into(),
            })
        }
    };

    match result {
        Ok(message) => UiNotice {
            ok: true,
            message,
            session: orchestrator.session().snapshot(),
        },
        Err(err) => {
            tracing::error!(%err, ?cmd, "command failed");
            UiNotice {
                ok: false,
                message: err.user_message(),
                session: orchestrator.session().snapshot(),
            }
        }
    }
}
