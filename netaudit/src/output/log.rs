//! Run log writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::OutputError;
use crate::report::{AuditReport, LogEvent};

/// Write every captured event to `path`, oldest first.
pub fn write_log(report: &AuditReport, path: &Path) -> Result<(), OutputError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut events: Vec<&LogEvent> = report
        .entries()
        .iter()
        .flat_map(|entry| entry.events())
        .collect();
    events.sort_by_key(|e| e.at);

    for event in events {
        writeln!(writer, "{}", format_event(event))?;
    }
    writer.flush()?;
    Ok(())
}

fn format_event(event: &LogEvent) -> String {
    format!(
        "{} - {} - {} - {}",
        event.at.format("%Y-%m-%d %H:%M:%S"),
        event.device,
        event.severity,
        event.message
    )
}
