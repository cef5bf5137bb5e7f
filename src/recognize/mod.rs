pub mod aligner;
pub mod azure;
pub mod gcp;
pub mod splitter;

use chrono::TimeDelta;

use crate::config::{AlignConfig, SplitConfig};
use crate::error::TimingError;
use crate::row::Row;
use crate::timecode::{ONE_DAY_MS, ONE_SECOND_MS};

pub use aligner::WordAligner;
pub use splitter::SegmentSplitter;

/// One recognizer-reported utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start_ms: i64,
    pub duration_ms: i64,
    pub text: String,
}

impl Segment {
    pub fn new(start_ms: i64, duration_ms: i64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            duration_ms,
            text: text.into(),
        }
    }

    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms
    }

    pub(crate) fn check(&self) -> Result<(), TimingError> {
        if self.start_ms < 0 {
            return Err(TimingError::malformed_segment(
                self.start_ms,
                "negative start offset",
            ));
        }
        if self.duration_ms < 0 {
            return Err(TimingError::malformed_segment(
                self.start_ms,
                format!("negative duration {} ms", self.duration_ms),
            ));
        }
        if self.start_ms.checked_add(self.duration_ms).is_none() {
            return Err(TimingError::malformed_segment(
                self.start_ms,
                format!("duration {} ms runs past the end of the timeline", self.duration_ms),
            ));
        }
        Ok(())
    }
}

/// One recognized token with its own timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Word {
    pub fn new(text: impl Into<String>, start_ms: i64, end_ms: i64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }

    pub fn from_offsets(
        text: impl Into<String>,
        start: TimeDelta,
        end: TimeDelta,
    ) -> Result<Self, TimingError> {
        Ok(Self {
            text: text.into(),
            start_ms: delta_to_ms(start)?,
            end_ms: delta_to_ms(end)?,
        })
    }
}

/// `days * 86_400_000 + seconds * 1000 + microseconds / 1000`, sub-millisecond truncated.
pub fn delta_to_ms(delta: TimeDelta) -> Result<i64, TimingError> {
    if delta < TimeDelta::zero() {
        return Err(TimingError::invalid_argument(format!(
            "negative time offset {delta}"
        )));
    }

    let days = delta.num_days();
    let seconds = delta.num_seconds() - days * 86_400;
    let micros = i64::from(delta.subsec_nanos()) / 1_000;
    Ok(days * ONE_DAY_MS + seconds * ONE_SECOND_MS + micros / 1_000)
}

/// Recognizer output, one variant per engine style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// Coarse utterance: offset, duration, free text.
    SegmentWithText(Segment),
    /// Utterance whose transcript comes with per-word timing.
    SegmentWithWords { segment: Segment, words: Vec<Word> },
}

impl Recognition {
    pub fn segment(&self) -> &Segment {
        match self {
            Recognition::SegmentWithText(segment) => segment,
            Recognition::SegmentWithWords { segment, .. } => segment,
        }
    }
}

/// Turn recognizer output into rows, in recognition order.
pub fn reconstruct_rows(
    recognitions: &[Recognition],
    split: &SplitConfig,
    align: &AlignConfig,
) -> Result<Vec<Row>, TimingError> {
    let splitter = SegmentSplitter::new(split);
    let aligner = WordAligner::new(align);

    let mut rows = Vec::new();
    for recognition in recognitions {
        match recognition {
            Recognition::SegmentWithText(segment) => rows.extend(splitter.split(segment)?),
            Recognition::SegmentWithWords { segment, words } => {
                rows.extend(aligner.align(segment, words)?)
            }
        }
    }

    log::debug!(
        "reconstructed {} rows from {} recognitions",
        rows.len(),
        recognitions.len()
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_conversion_truncates_sub_millisecond() {
        let delta = TimeDelta::seconds(2) + TimeDelta::microseconds(345_678);
        assert_eq!(delta_to_ms(delta).unwrap(), 2_345);
    }

    #[test]
    fn delta_conversion_counts_days() {
        let delta = TimeDelta::days(1) + TimeDelta::seconds(1);
        assert_eq!(delta_to_ms(delta).unwrap(), 86_401_000);
    }

    #[test]
    fn negative_delta_is_rejected() {
        assert!(delta_to_ms(TimeDelta::milliseconds(-1)).is_err());
    }

    #[test]
    fn negative_duration_segment_fails_fast() {
        let recognitions = vec![Recognition::SegmentWithText(Segment::new(
            1_000, -5, "あ。い。",
        ))];
        let err = reconstruct_rows(
            &recognitions,
            &SplitConfig::default(),
            &AlignConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TimingError::MalformedSegment { start_ms: 1_000, .. }
        ));
    }

    #[test]
    fn dispatches_each_variant_in_order() {
        let recognitions = vec![
            Recognition::SegmentWithText(Segment::new(0, 1_000, "A。B。")),
            Recognition::SegmentWithWords {
                segment: Segment::new(2_000, 1_000, "CD"),
                words: vec![Word::new("C", 2_000, 2_400), Word::new("D", 2_500, 3_000)],
            },
        ];

        let rows = reconstruct_rows(
            &recognitions,
            &SplitConfig::default(),
            &AlignConfig::default(),
        )
        .unwrap();

        let texts: Vec<&str> = rows.iter().map(Row::text).collect();
        assert_eq!(texts, vec!["A。", "B。", "CD"]);
        assert_eq!(rows[2].start_ms(), 2_000);
        assert_eq!(rows[2].end_ms(), 3_000);
        assert_eq!(recognitions[1].segment().end_ms(), 3_000);
    }
}
