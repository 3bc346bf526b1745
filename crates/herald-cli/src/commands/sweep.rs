//! One-shot scheduler sweep.

use crate::output::{self, OutputFormat};
use herald_core::error::AppError;
use herald_worker::SchedulerSweep;

/// Run a single sweep tick and print what it did
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let engine = super::Engine::connect(config_path).await?;
    let sweep = SchedulerSweep::new(
        engine.stores,
        engine.publisher,
        engine.clock,
        engine.config.scheduler,
    );

    let report = sweep.run_once().await;

    match format {
        OutputFormat::Json => output::print_json(&report, "{}"),
        OutputFormat::Table => {
            println!("Sweep complete:");
            output::print_kv("Promoted", &report.promoted.to_string());
            output::print_kv("Promotion failures", &report.promotion_failures.to_string());
            output::print_kv("Purged", &report.purged.to_string());
            output::print_kv("Vacuumed", &report.vacuumed.to_string());
        }
    }

    if report.promotion_failures > 0 {
        output::print_warning("Some deferred notifications stay pending until the next sweep");
    }

    Ok(())
}
