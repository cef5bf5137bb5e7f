use std::ops::Range;

use super::Segment;
use crate::config::SplitConfig;
use crate::error::TimingError;
use crate::row::Row;

/// A non-empty run of text between delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment {
    /// Byte range shown to the reader: the fragment plus its delimiter, if any.
    display: Range<usize>,
    /// Characters in the fragment, delimiter excluded.
    chars: i64,
}

fn fragments(text: &str, config: &SplitConfig) -> Vec<Fragment> {
    let mut out = Vec::new();
    let mut start = 0;

    let mut push = |body: Range<usize>, display_end: usize| {
        if body.is_empty() {
            return;
        }
        out.push(Fragment {
            chars: text[body.clone()].chars().count() as i64,
            display: body.start..display_end,
        });
    };

    for (i, c) in text.char_indices() {
        if config.is_delimiter(c) {
            push(start..i, i + c.len_utf8());
            start = i + c.len_utf8();
        }
    }
    push(start..text.len(), text.len());

    out
}

/// Cuts a text-only segment into sentence rows, sharing the segment's
/// duration out by character count.
pub struct SegmentSplitter<'a> {
    config: &'a SplitConfig,
}

impl<'a> SegmentSplitter<'a> {
    pub fn new(config: &'a SplitConfig) -> Self {
        Self { config }
    }

    pub fn split(&self, segment: &Segment) -> Result<Vec<Row>, TimingError> {
        segment.check()?;

        let text = segment.text.as_str();
        let sentences = fragments(text, self.config);

        match sentences.len() {
            0 => return Ok(Vec::new()),
            1 => {
                return Ok(vec![Row::new(
                    segment.start_ms,
                    segment.end_ms(),
                    false,
                    false,
                    text,
                )?]);
            }
            _ => {}
        }

        let n = sentences.len() as i64;
        let num_chars: i64 = sentences.iter().map(|s| s.chars).sum();

        let mut gap_ms = self.config.sentence_gap_ms.max(0);
        if segment.duration_ms <= gap_ms.saturating_mul(n - 1) {
            log::warn!(
                "segment at {} ms lasts {} ms, too short for {} gaps of {} ms; splitting without gaps",
                segment.start_ms,
                segment.duration_ms,
                n - 1,
                gap_ms
            );
            gap_ms = 0;
        }
        let speaking_ms = segment.duration_ms - gap_ms * (n - 1);

        let mut rows = Vec::with_capacity(sentences.len());
        let mut sentence_start = segment.start_ms;
        for (j, sentence) in sentences.iter().enumerate() {
            let is_last = j == sentences.len() - 1;
            let duration = if is_last {
                segment.end_ms() - sentence_start
            } else {
                // Widened: the quotient never exceeds speaking_ms.
                (i128::from(speaking_ms) * i128::from(sentence.chars) / i128::from(num_chars)) as i64
            };

            log::debug!(
                "sentence {}/{} of segment at {} ms: {} chars, {} ms",
                j + 1,
                n,
                segment.start_ms,
                sentence.chars,
                duration
            );

            rows.push(Row::new(
                sentence_start,
                sentence_start + duration,
                j == 0,
                is_last,
                &text[sentence.display.clone()],
            )?);

            sentence_start += duration + gap_ms;
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::Arbitrary;

    fn split(start_ms: i64, duration_ms: i64, text: &str) -> Vec<Row> {
        let config = SplitConfig::default();
        SegmentSplitter::new(&config)
            .split(&Segment::new(start_ms, duration_ms, text))
            .unwrap()
    }

    #[test]
    fn two_sentences_share_duration_around_gap() {
        let rows = split(0, 1_000, "A。B。");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].start_ms(), 0);
        assert_eq!(rows[0].end_ms(), 450);
        assert!(rows[0].is_estimated_start());
        assert!(!rows[0].is_estimated_end());
        assert_eq!(rows[0].text(), "A。");

        assert_eq!(rows[1].start_ms(), 550);
        assert_eq!(rows[1].end_ms(), 1_000);
        assert!(!rows[1].is_estimated_start());
        assert!(rows[1].is_estimated_end());
        assert_eq!(rows[1].text(), "B。");
    }

    #[test]
    fn last_sentence_absorbs_rounding() {
        let rows = split(12_345, 1_001, "あいう。えお？かきくけこ。");

        let last = rows.last().unwrap();
        assert_eq!(last.end_ms(), 12_345 + 1_001);

        let spoken: i64 = rows.iter().map(Row::duration_ms).sum();
        assert_eq!(spoken + 100 * (rows.len() as i64 - 1), 1_001);
    }

    #[test]
    fn durations_follow_character_counts() {
        // 900 ms of speech over 1 + 2 chars.
        let rows = split(0, 1_000, "A。BC。");
        assert_eq!(rows[0].duration_ms(), 300);
        assert_eq!(rows[1].start_ms(), 400);
        assert_eq!(rows[1].duration_ms(), 600);
    }

    #[test]
    fn text_without_delimiter_is_one_unestimated_row() {
        let rows = split(500, 2_000, "区切りのない文");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_ms(), 500);
        assert_eq!(rows[0].end_ms(), 2_500);
        assert!(!rows[0].is_estimated_start());
        assert!(!rows[0].is_estimated_end());
        assert_eq!(rows[0].text(), "区切りのない文");
    }

    #[test]
    fn single_sentence_keeps_full_text() {
        let rows = split(0, 800, "。はい。");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(), "。はい。");
    }

    #[test]
    fn empty_or_delimiter_only_text_yields_nothing() {
        assert!(split(0, 1_000, "").is_empty());
        assert!(split(0, 1_000, "。？。").is_empty());
    }

    #[test]
    fn trailing_fragment_without_delimiter_is_shown_alone() {
        let rows = split(0, 1_000, "はい。そうです");
        assert_eq!(rows[0].text(), "はい。");
        assert_eq!(rows[1].text(), "そうです");
    }

    #[test]
    fn repeated_sentences_map_to_their_own_positions() {
        let rows = split(0, 2_100, "はい。いいえ？はい。");
        let texts: Vec<&str> = rows.iter().map(Row::text).collect();
        assert_eq!(texts, vec!["はい。", "いいえ？", "はい。"]);
        assert_eq!(rows[2].end_ms(), 2_100);
    }

    #[test]
    fn consecutive_delimiters_are_skipped() {
        let rows = split(0, 1_000, "A。。B？");
        let texts: Vec<&str> = rows.iter().map(Row::text).collect();
        assert_eq!(texts, vec!["A。", "B？"]);
        assert_eq!(rows[0].end_ms(), 450);
        assert_eq!(rows[1].start_ms(), 550);
    }

    #[test]
    fn segment_shorter_than_gaps_drops_the_gap() {
        let rows = split(0, 100, "A。B。");
        assert_eq!(rows[0].end_ms(), 50);
        assert_eq!(rows[1].start_ms(), 50);
        assert_eq!(rows[1].end_ms(), 100);
    }

    #[test]
    fn configured_gap_and_delimiters_apply() {
        let config = SplitConfig {
            sentence_gap_ms: 0,
            delimiters: vec!['.', '!'],
        };
        let rows = SegmentSplitter::new(&config)
            .split(&Segment::new(0, 1_000, "ab.cd!"))
            .unwrap();
        assert_eq!(rows[0].end_ms(), 500);
        assert_eq!(rows[1].start_ms(), 500);
        assert_eq!(rows[0].text(), "ab.");
        assert_eq!(rows[1].text(), "cd!");
    }

    #[test]
    fn negative_duration_is_malformed() {
        let config = SplitConfig::default();
        let err = SegmentSplitter::new(&config)
            .split(&Segment::new(0, -1, "A。"))
            .unwrap_err();
        assert!(matches!(err, TimingError::MalformedSegment { .. }));
    }

    #[test]
    fn segment_past_end_of_timeline_is_malformed() {
        let config = SplitConfig::default();
        let err = SegmentSplitter::new(&config)
            .split(&Segment::new(i64::MAX - 10, 100, "A。B。"))
            .unwrap_err();
        assert!(matches!(err, TimingError::MalformedSegment { .. }));
    }

    #[test]
    fn very_long_segment_splits_without_overflow() {
        let duration_ms = i64::MAX / 2;
        let rows = split(0, duration_ms, "あいう。えお。");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].duration_ms(), (duration_ms - 100) / 5 * 3 + (duration_ms - 100) % 5 * 3 / 5);
        assert_eq!(rows[1].end_ms(), duration_ms);
    }

    #[derive(Debug, Clone)]
    struct SplitCase {
        start_ms: i64,
        duration_ms: i64,
        text: String,
    }

    impl Arbitrary for SplitCase {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let pieces = ["あ", "いう", "えおか", "。", "？", "キ", "A"];
            let len = usize::arbitrary(g) % 12;
            let text = (0..len).map(|_| *g.choose(&pieces).unwrap()).collect();
            SplitCase {
                start_ms: i64::from(u32::arbitrary(g) % 3_600_000),
                duration_ms: i64::from(u32::arbitrary(g) % 60_000),
                text,
            }
        }
    }

    #[quickcheck_macros::quickcheck]
    fn prop_split_closes_on_segment_end_and_keeps_total(case: SplitCase) -> bool {
        let rows = split(case.start_ms, case.duration_ms, &case.text);
        match rows.last() {
            None => true,
            Some(last) => {
                let gaps = rows.len() as i64 - 1;
                let gap_ms = if case.duration_ms <= 100 * gaps { 0 } else { 100 };
                let spoken: i64 = rows.iter().map(Row::duration_ms).sum();

                last.end_ms() == case.start_ms + case.duration_ms
                    && rows.first().map(Row::start_ms) == Some(case.start_ms)
                    && rows.windows(2).all(|w| w[1].start_ms() - w[0].end_ms() == gap_ms)
                    && spoken + gaps * gap_ms == case.duration_ms
            }
        }
    }
}
