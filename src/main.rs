use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_digest_bot::{AppConfig, Pipeline};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_digest_bot=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::from_env();
    let pipeline = match Pipeline::from_config(&cfg) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            return std::process::ExitCode::FAILURE;
        }
    };

    // One pass per invocation; scheduling belongs to cron or the CI runner.
    if pipeline.run_guarded().await {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    }
}
