//! Store and ledger counters.

use crate::output::{self, OutputFormat};
use herald_core::error::AppError;

/// Print engine-wide counters
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let engine = super::Engine::connect(config_path).await?;
    let stats = engine.service().stats().await?;

    match format {
        OutputFormat::Json => output::print_json(&stats, "{}"),
        OutputFormat::Table => {
            println!("Notifications:");
            output::print_kv("Total", &stats.total.to_string());
            output::print_kv("Pending", &stats.pending.to_string());
            for (category, count) in &stats.by_category {
                output::print_kv(category, &count.to_string());
            }
            println!("Ledger:");
            output::print_kv("Rows", &stats.ledger_rows.to_string());
            output::print_kv("Read", &stats.read.to_string());
            output::print_kv("Dismissed", &stats.dismissed.to_string());
            output::print_kv("Bus", engine.publisher.client().backend_name());
        }
    }

    Ok(())
}
