//! Application entry point for the nested-circle layout viewer.
//!
//! This binary sets up logging and eframe/egui, and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.
//!
//! Usage: `nest-view [CONFIG.json]`. Fields missing from the JSON file keep
//! their defaults.

mod scenes;
mod viewer;

use std::path::Path;

use nest_core::LayoutConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use viewer::Viewer;

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to
/// `warn,nest_core=info,nest_view=info`.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,nest_core=info,nest_view=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<LayoutConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let cfg = LayoutConfig::from_json(&json)?;
    info!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop, or
///   the initial layout cannot be built.
fn main() -> eframe::Result<()> {
    setup_logging();

    let arg = std::env::args_os().nth(1);
    let cfg = match load_config(arg.as_deref().map(Path::new)) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Nested circles (Esc to quit)",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(cfg)?))),
    )
}
