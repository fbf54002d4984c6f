// Flat-file transaction report

use crate::core::TransactionRecord;
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The report body: one field per line, each line newline-terminated
pub fn render(record: &TransactionRecord) -> String {
    let mut out = String::new();
    for line in record.lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Write the report to `path`, replacing whatever was there
pub fn write_report<P: AsRef<Path>>(path: P, record: &TransactionRecord) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(render(record).as_bytes())?;
    writer.flush()?;

    log::info!("Wrote transaction report to {}", path.display());
    Ok(())
}
