use crate::error::CliError;
use engine_config::report::{dry_run::PlanPreview, summary::ImportReport};
use model::import::state::ImportState;
use serde::Serialize;
use std::path::Path;

/// One-line progress view, e.g.
/// `[Running] batch 2/3 | 200/250 records (80.0%) | inserted 190 | skipped 10 | errors 1`.
pub fn progress_line(state: &ImportState) -> String {
    format!(
        "[{}] batch {}/{} | {}/{} records ({:.1}%) | inserted {} | skipped {} | errors {}",
        state.status,
        state.current_batch,
        state.total_batches,
        state.processed_records,
        state.total_records,
        state.percentage(),
        state.totals.inserted,
        state.totals.skipped,
        state.error_count()
    )
}

pub fn print_progress(state: &ImportState) {
    eprintln!("{}", progress_line(state));
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub async fn write_report(report: &ImportReport, path: &Path) -> Result<(), CliError> {
    tokio::fs::write(path, to_json(report)?).await?;
    Ok(())
}

pub fn print_summary(report: &ImportReport) {
    let summary = &report.summary;
    println!("Import {} for '{}' ({})", summary.status, report.target, summary.run_id);
    println!("-----------------------------");
    println!("{:<20} {}/{}", "Batches", summary.completed_batches, summary.total_batches);
    println!("{:<20} {}/{}", "Records", summary.processed_records, summary.total_records);
    println!("{:<20} {}", "Inserted", summary.inserted);
    println!("{:<20} {}", "Skipped", summary.skipped);
    for (name, value) in &summary.counters {
        println!("{:<20} {}", name, value);
    }
    println!("{:<20} {}", "Errors", summary.error_count);
    if let Some(ms) = summary.duration_ms {
        println!("{:<20} {:.1}s", "Duration", ms as f64 / 1000.0);
    }

    if !report.recent_errors.is_empty() {
        println!();
        println!("Most recent errors:");
        for error in &report.recent_errors {
            println!("  - {error}");
        }
    }
}

pub fn print_plan(preview: &PlanPreview) {
    println!("Plan ({} profile, header {})", preview.profile, preview.header_mode);
    println!("-----------------------------");
    println!(
        "{:<20} {}",
        "Header",
        preview.header.as_deref().unwrap_or("(none)")
    );
    println!("{:<20} {}", "Records", preview.total_records);
    println!("{:<20} {}", "Batch size", preview.batch_size);
    println!("{:<20} {}", "Batches", preview.total_batches);
    println!();
    println!("{:>6}  {:>15}  {:>6}  {:>10}", "batch", "records", "rows", "bytes");
    for batch in &preview.batches {
        println!(
            "{:>6}  {:>15}  {:>6}  {:>10}",
            batch.batch,
            format!("{}-{}", batch.first_record, batch.last_record),
            batch.rows,
            batch.payload_bytes
        );
    }
}
