pub mod table;

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

/// Pretty-print any serializable value as JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    write_json(&mut stdout.lock(), value)
}

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::RatingStats;

    #[test]
    fn absent_stats_serialize_as_null() {
        let mut buf = Vec::new();
        write_json(&mut buf, &RatingStats::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["average"].is_null());
        assert!(value["highest"].is_null());
        assert!(buf.ends_with(b"\n"));
    }
}
