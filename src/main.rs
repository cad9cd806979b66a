//! Tonearm - library browser for a music server
//!
//! Entry point: sets up logging, initializes Libadwaita and runs the
//! application main loop.

use {
    anyhow::Result,
    libadwaita::glib::ExitCode,
    tracing::error,
    tracing_subscriber::{EnvFilter, fmt},
};

use tonearm::ui::TonearmApplication;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    libadwaita::init()?;

    let app = match TonearmApplication::new() {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Failed to start");
            return Err(e);
        }
    };
    Ok(app.run())
}
