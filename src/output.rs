use crate::row::{CSV_HEADER, Row, RowRecord};
use crate::timecode;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write_rows_csv<W: Write>(mut out: W, rows: &[Row]) -> Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for row in rows {
        writeln!(out, "{}", row.to_csv_line())?;
    }
    out.flush()?;
    Ok(())
}

pub fn save_rows_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_rows_csv(BufWriter::new(file), rows)
}

/// Write stored records back out, e.g. after a translation column was appended.
pub fn write_records_csv<W: Write>(out: W, headers: &[String], records: &[RowRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    writer.write_record(headers)?;
    for record in records {
        writer.write_record(&record.fields)?;
    }
    writer.flush()?;
    Ok(())
}

/// Compose SubRip text. Each record's trailing field is its subtitle text;
/// cues are numbered from 1 in record order.
pub fn compose_srt(records: &[RowRecord]) -> Result<String> {
    let mut srt = String::new();

    for (i, record) in records.iter().enumerate() {
        let (Some(start_ms), Some(end_ms)) = (record.start_ms, record.end_ms) else {
            anyhow::bail!("Row {} has no start_ms/end_ms", record.row_num);
        };
        let text = record.text().unwrap_or_default();

        srt.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            timecode::encode_srt(start_ms)?,
            timecode::encode_srt(end_ms)?,
            text
        ));
    }

    Ok(srt)
}

pub fn save_srt(path: &Path, records: &[RowRecord]) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    file.write_all(compose_srt(records)?.as_bytes())?;
    Ok(())
}
