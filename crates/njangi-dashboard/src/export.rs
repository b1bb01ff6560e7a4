//! CSV export of the loaded tables and dashboard aggregates
//!
//! Files are written locally only; nothing goes back to Supabase.

use anyhow::{Context, Result};
use csv::Writer;
use std::path::{Path, PathBuf};

use crate::config::ColumnCandidates;
use crate::constants;
use crate::dashboard::{build_dashboard, DashboardView};
use crate::loader::DashboardData;
use crate::table::{cell_text, Table};

/// Write every table plus summary.csv and top_contributors.csv into `output_dir`
pub fn export_all(output_dir: &Path, data: &DashboardData, columns: &ColumnCandidates) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let mut written = Vec::new();

    for (name, table) in data.tables() {
        let path = output_dir.join(format!("{}.csv", name));
        write_table(&path, table)?;
        written.push(path);
    }

    let view = build_dashboard(data, columns);

    let path = output_dir.join(constants::SUMMARY_FILENAME);
    write_summary(&path, &view)?;
    written.push(path);

    let path = output_dir.join(constants::TOP_CONTRIBUTORS_FILENAME);
    write_top_contributors(&path, &view)?;
    written.push(path);

    Ok(written)
}

/// Raw table, header row first. An empty table produces an empty file.
fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;

    if !table.columns().is_empty() {
        wtr.write_record(table.columns())?;
        for row in table.rows() {
            wtr.write_record(
                table
                    .columns()
                    .iter()
                    .map(|column| row.get(column).map(cell_text).unwrap_or_default()),
            )?;
        }
    }

    wtr.flush()?;
    tracing::info!(path = %path.display(), rows = table.len(), "exported table");
    Ok(())
}

fn write_summary(path: &Path, view: &DashboardView) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let metrics = &view.metrics;

    wtr.write_record(["Metric", "Value"])?;
    for (metric, value) in [
        ("Njangi Pot", metrics.pot_total),
        ("Foundation", metrics.foundation_total),
        ("Outstanding Loans", metrics.outstanding_loans_due),
        ("Loan Principal", metrics.loan_principal_total),
        ("Total Interest", metrics.total_interest),
    ] {
        wtr.write_record([metric, &format!("{:.2}", value)])?;
    }
    wtr.write_record(["Members", &metrics.members_count.to_string()])?;

    wtr.flush()?;
    Ok(())
}

fn write_top_contributors(path: &Path, view: &DashboardView) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;

    wtr.write_record(["Member", "Amount"])?;
    for contributor in view.top_contributors.iter().flatten() {
        wtr.write_record([contributor.member.as_str(), &format!("{:.2}", contributor.amount)])?;
    }

    wtr.flush()?;
    Ok(())
}
