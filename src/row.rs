use std::io::Read;

use crate::error::TimingError;
use crate::timecode;

pub const CSV_HEADER: &str =
    "start_ms,end_ms,start_tc,end_tc,is_estimated_start,is_estimated_end,display_text";

/// One finalized subtitle row. The timecodes are always derived from the
/// millisecond fields, so the two renderings can't drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    start_ms: i64,
    end_ms: i64,
    start_tc: String,
    end_tc: String,
    is_estimated_start: bool,
    is_estimated_end: bool,
    text: String,
}

impl Row {
    pub fn new(
        start_ms: i64,
        end_ms: i64,
        is_estimated_start: bool,
        is_estimated_end: bool,
        text: impl Into<String>,
    ) -> Result<Self, TimingError> {
        Ok(Self {
            start_ms,
            end_ms,
            start_tc: timecode::encode(start_ms)?,
            end_tc: timecode::encode(end_ms)?,
            is_estimated_start,
            is_estimated_end,
            text: text.into(),
        })
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    pub fn start_tc(&self) -> &str {
        &self.start_tc
    }

    pub fn end_tc(&self) -> &str {
        &self.end_tc
    }

    pub fn is_estimated_start(&self) -> bool {
        self.is_estimated_start
    }

    pub fn is_estimated_end(&self) -> bool {
        self.is_estimated_end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// CSV line matching [`CSV_HEADER`], display text always quoted.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},\"{}\"",
            self.start_ms,
            self.end_ms,
            self.start_tc,
            self.end_tc,
            self.is_estimated_start,
            self.is_estimated_end,
            self.text.replace('"', "\"\"")
        )
    }

    pub fn to_record(&self, row_num: usize) -> RowRecord {
        RowRecord {
            row_num,
            start_ms: Some(self.start_ms),
            end_ms: Some(self.end_ms),
            start_tc: Some(self.start_tc.clone()),
            end_tc: Some(self.end_tc.clone()),
            fields: vec![
                self.start_ms.to_string(),
                self.end_ms.to_string(),
                self.start_tc.clone(),
                self.end_tc.clone(),
                self.is_estimated_start.to_string(),
                self.is_estimated_end.to_string(),
                self.text.clone(),
            ],
        }
    }
}

/// A row as loaded from storage. Any timing field may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowRecord {
    /// 1-based line in the source, header included.
    pub row_num: usize,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub start_tc: Option<String>,
    pub end_tc: Option<String>,
    /// Every raw field, including the ones the validator ignores.
    pub fields: Vec<String>,
}

fn optional_ms(row_num: usize, name: &str, raw: &str) -> Result<Option<i64>, TimingError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|e| TimingError::malformed_row(row_num, format!("{name} {raw:?}: {e}")))
}

fn optional_tc(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

impl RowRecord {
    pub fn from_fields(row_num: usize, fields: Vec<String>) -> Result<Self, TimingError> {
        if fields.len() < 4 {
            return Err(TimingError::malformed_row(
                row_num,
                format!("expected at least 4 fields, found {}", fields.len()),
            ));
        }

        Ok(Self {
            row_num,
            start_ms: optional_ms(row_num, "start_ms", &fields[0])?,
            end_ms: optional_ms(row_num, "end_ms", &fields[1])?,
            start_tc: optional_tc(&fields[2]),
            end_tc: optional_tc(&fields[3]),
            fields,
        })
    }

    /// The trailing field: display text, or its translation once one is appended.
    pub fn text(&self) -> Option<&str> {
        self.fields.last().map(String::as_str)
    }
}

/// Streams [`RowRecord`]s out of a CSV source whose first line is a header.
pub struct RowReader<R> {
    inner: csv::Reader<R>,
    index: usize,
}

impl<R: Read> RowReader<R> {
    pub fn new(source: R) -> Self {
        let inner = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);
        Self { inner, index: 0 }
    }

    pub fn headers(&mut self) -> Result<Vec<String>, TimingError> {
        let headers = self
            .inner
            .headers()
            .map_err(|e| TimingError::malformed_row(1, e))?;
        Ok(headers.iter().map(str::to_string).collect())
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<RowRecord, TimingError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = csv::StringRecord::new();
        let row_num = self.index + 2;
        match self.inner.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                self.index += 1;
                let fields = record.iter().map(str::to_string).collect();
                Some(RowRecord::from_fields(row_num, fields))
            }
            Err(e) => {
                self.index += 1;
                Some(Err(TimingError::malformed_row(row_num, e)))
            }
        }
    }
}
