//! Report output: one CSV and one log file per run.
//!
//! Both files are named from the run start time
//! (`network_audit_<timestamp>.csv` / `.log`), so the pair from one run is
//! always identifiable. Writing happens once, after aggregation, from a
//! single thread.

mod csv;
mod log;

pub use csv::write_csv;
pub use log::write_log;

use std::path::{Path, PathBuf};

use crate::error::OutputError;
use crate::report::AuditReport;

/// Paths of the files produced for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub log: PathBuf,
}

/// Write the CSV report and the run log into `dir`.
pub fn write_outputs(report: &AuditReport, dir: &Path) -> Result<OutputPaths, OutputError> {
    let slug = report.timestamp_slug();
    let csv_path = dir.join(format!("network_audit_{}.csv", slug));
    let log_path = dir.join(format!("network_audit_{}.log", slug));

    write_csv(report, &csv_path)?;
    write_log(report, &log_path)?;

    Ok(OutputPaths {
        csv: csv_path,
        log: log_path,
    })
}
