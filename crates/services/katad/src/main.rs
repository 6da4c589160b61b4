//! Kata grading service (katad)
//!
//! Serves the run and test endpoints until interrupted.
//!
//! # Examples
//!
//! ```bash
//! export KATAD_PORT=3001
//! export KATAD_ALLOWED_ORIGIN=https://learn.example.com
//! katad
//! ```

use katad::{api::setup_api, config::Config, prelude::*};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,tower_http=debug,kata_project=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting katad on {config}");
    let (_, api_handle) = setup_api(&config).await?;

    tokio::select! {
        result = api_handle => {
            tracing::error!("API server stopped: {:?}", result);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
