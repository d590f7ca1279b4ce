pub mod app;
pub mod bindings;
pub mod clipboard;
mod config;
pub mod css;
pub mod error;
pub mod logging;
pub mod render;
pub mod schema;
pub mod state;
pub mod storage;
pub mod store;
pub mod vars;
pub use error::{AppError, AppResult};

/// Entrypoint used by higher-level integrations and CLI bindings.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting themevars");

    let mut app = app::App::new()?;
    let summary = app.start()?;

    tracing::info!(
        fields = summary.fields,
        seeded = summary.seeded,
        removed = summary.removed,
        "startup sync complete"
    );
    Ok(())
}
