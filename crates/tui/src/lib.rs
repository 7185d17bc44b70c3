//! # ImpugnaINE terminal front end
//!
//! Terminal rendition of the impugnación registration wizard built with
//! Ratatui. A session owns one [`impugna_engine::StepperStore`] from start-up
//! until the citizen submits, abandons or interrupts the wizard.
//!
//! ## Key Features
//!
//! - Horizontal stepper with a measured progress rail and mouse support
//! - Per-step forms: registrant choice, representatives, responsible
//!   authorities, narrative and file uploads with simulated progress
//! - Review screen with a summary and a highlighted JSON view
//! - Route line derived from the store after every event
//!
//! ## Architecture
//!
//! Components implement a shared `Component` trait, mutate [`App`] state in
//! their event handlers and report cross-cutting work as effects that the
//! runtime applies.

mod app;
mod ui;

use anyhow::Result;
use impugna_types::TramiteKind;
use impugna_util::UserPreferences;

pub use app::SessionOutcome;
use app::App;

/// Start-up options of a wizard session.
#[derive(Debug, Clone, Default)]
pub struct TuiOptions {
    /// Procedure selected when no initial route names one.
    pub tramite: TramiteKind,
    pub expediente: Option<String>,
    /// Route to open, e.g. `/registro-impugnacion/autoridad?tipo=registro`.
    /// Resolved once; the route is derived from the store afterwards.
    pub initial_route: Option<String>,
    /// Requested palette id or alias.
    pub theme: Option<String>,
}

/// Runs the wizard until the session ends and returns how it ended.
///
/// # Errors
///
/// Terminal setup failures (raw mode, alternate screen) and unreadable
/// terminal input.
pub async fn run(options: TuiOptions, preferences: UserPreferences) -> Result<SessionOutcome> {
    let app = App::new(&options, preferences);
    ui::runtime::run_app(app).await
}
