use std::ops::Range;

use super::{Segment, Word};
use crate::config::AlignConfig;
use crate::error::TimingError;
use crate::row::Row;

/// A whitespace-delimited unit of the transcript and the words that cover it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan<'t> {
    pub unit: &'t str,
    pub words: Range<usize>,
}

/// Maps the engine's whitespace-separated transcript back onto per-word
/// timing by accumulating character counts.
pub struct WordAligner<'a> {
    config: &'a AlignConfig,
}

impl<'a> WordAligner<'a> {
    pub fn new(config: &'a AlignConfig) -> Self {
        Self { config }
    }

    pub fn clean_word(&self, text: &str) -> String {
        text.replace(self.config.placeholder, "")
    }

    /// Greedily assigns consecutive words to each transcript unit until
    /// their characters reach the unit's length.
    pub fn spans<'t>(
        &self,
        segment: &'t Segment,
        words: &[Word],
    ) -> Result<Vec<WordSpan<'t>>, TimingError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let lens: Vec<usize> = words
            .iter()
            .map(|w| self.clean_word(&w.text).chars().count())
            .collect();

        let mut spans = Vec::new();
        let mut word_i = 0;
        for unit in segment.text.split_whitespace() {
            let unit_len = unit.chars().count();
            if word_i >= words.len() {
                return Err(TimingError::malformed_segment(
                    segment.start_ms,
                    format!("no words left for unit {unit:?}"),
                ));
            }

            let first = word_i;
            let mut count = 0;
            while word_i < words.len() && count + lens[word_i] < unit_len {
                count += lens[word_i];
                word_i += 1;
            }

            if word_i == words.len() {
                return Err(TimingError::malformed_segment(
                    segment.start_ms,
                    format!("words cover only {count} of {unit_len} characters of unit {unit:?}"),
                ));
            }

            spans.push(WordSpan {
                unit,
                words: first..word_i + 1,
            });
            word_i += 1;
        }

        if word_i < words.len() {
            log::warn!(
                "{} trailing words of segment at {} ms matched no transcript unit",
                words.len() - word_i,
                segment.start_ms
            );
        }

        Ok(spans)
    }

    pub fn align(&self, segment: &Segment, words: &[Word]) -> Result<Vec<Row>, TimingError> {
        segment.check()?;

        self.spans(segment, words)?
            .into_iter()
            .map(|span| {
                let start = &words[span.words.start];
                let end = &words[span.words.end - 1];
                Row::new(start.start_ms, end.end_ms, true, true, span.unit)
            })
            .collect()
    }
}
