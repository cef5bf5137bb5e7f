//! Google Cloud speech dumps: long-running recognize responses with word time offsets.

use std::path::Path;

use anyhow::Context;
use chrono::TimeDelta;
use serde::Deserialize;

use super::{Recognition, Segment, Word};
use crate::error::TimingError;

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    words: Vec<WordInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordInfo {
    word: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

/// Parse a protobuf JSON duration such as `"1.500s"` or `"2s"`. Word
/// offsets are never negative, so a signed duration is malformed.
pub fn parse_duration(raw: &str) -> Result<TimeDelta, TimingError> {
    let malformed = || TimingError::invalid_argument(format!("malformed duration {raw:?}"));

    let body = raw.strip_suffix('s').ok_or_else(malformed)?;
    let (secs, frac) = body.split_once('.').unwrap_or((body, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if secs.is_empty() || !digits(secs) || frac.len() > 9 || !digits(frac) {
        return Err(malformed());
    }

    let secs: i64 = secs.parse().map_err(|_| malformed())?;
    let nanos: i64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<9}").parse().map_err(|_| malformed())?
    };

    TimeDelta::try_seconds(secs)
        .map(|d| d + TimeDelta::nanoseconds(nanos))
        .ok_or_else(malformed)
}

fn offset(raw: Option<&str>) -> Result<TimeDelta, TimingError> {
    raw.map(parse_duration).unwrap_or(Ok(TimeDelta::zero()))
}

fn to_recognition(alternative: &Alternative) -> Result<Recognition, TimingError> {
    let words = alternative
        .words
        .iter()
        .map(|w| {
            Word::from_offsets(
                w.word.clone(),
                offset(w.start_time.as_deref())?,
                offset(w.end_time.as_deref())?,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let start_ms = words.first().map_or(0, |w| w.start_ms);
    let end_ms = words.last().map_or(start_ms, |w| w.end_ms);

    Ok(Recognition::SegmentWithWords {
        segment: Segment::new(start_ms, end_ms - start_ms, alternative.transcript.clone()),
        words,
    })
}

pub fn parse(json: &str) -> anyhow::Result<Vec<Recognition>> {
    let response: Response = serde_json::from_str(json)?;

    let mut recognitions = Vec::with_capacity(response.results.len());
    for (i, result) in response.results.iter().enumerate() {
        let Some(best) = result.alternatives.first() else {
            log::debug!("result {} has no alternatives", i);
            continue;
        };
        recognitions.push(
            to_recognition(best).with_context(|| format!("Invalid word timing in result {}", i))?,
        );
    }

    Ok(recognitions)
}

pub fn load(path: &Path) -> anyhow::Result<Vec<Recognition>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read GCP dump {:?}", path))?;
    parse(&content).with_context(|| format!("Failed to parse GCP dump {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_parse_with_and_without_fraction() {
        assert_eq!(parse_duration("2s").unwrap(), TimeDelta::seconds(2));
        assert_eq!(
            parse_duration("1.5s").unwrap(),
            TimeDelta::milliseconds(1_500)
        );
        assert_eq!(
            parse_duration("0.000900s").unwrap(),
            TimeDelta::microseconds(900)
        );
        for bad in ["", "s", "1.5", "1.x5s", "abc s", ".5s", "-0.5s", "-1.5s", "-2s", "+1s"] {
            assert!(parse_duration(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn first_alternative_becomes_word_segment() {
        let json = r#"{
            "results": [
                {
                    "alternatives": [
                        {
                            "transcript": "今日は 晴れ",
                            "words": [
                                {"word": "▁今日", "startTime": "0.100s", "endTime": "0.400s"},
                                {"word": "は", "startTime": "0.400s", "endTime": "0.650s"},
                                {"word": "▁晴れ", "startTime": "1s", "endTime": "1.200s"}
                            ]
                        },
                        {"transcript": "ignored", "words": []}
                    ]
                },
                {"alternatives": []}
            ]
        }"#;

        let recognitions = parse(json).unwrap();
        assert_eq!(recognitions.len(), 1);

        let Recognition::SegmentWithWords { segment, words } = &recognitions[0] else {
            panic!("expected word segment");
        };
        assert_eq!(segment.start_ms, 100);
        assert_eq!(segment.duration_ms, 1_100);
        assert_eq!(segment.text, "今日は 晴れ");
        assert_eq!(words[1], Word::new("は", 400, 650));
    }

    #[test]
    fn missing_start_time_means_zero() {
        let json = r#"{"results": [{"alternatives": [{"transcript": "a",
            "words": [{"word": "a", "endTime": "0.300s"}]}]}]}"#;
        let recognitions = parse(json).unwrap();
        assert_eq!(recognitions[0].segment().start_ms, 0);
        assert_eq!(recognitions[0].segment().duration_ms, 300);
    }

    #[test]
    fn empty_response_has_no_recognitions() {
        assert!(parse("{}").unwrap().is_empty());
    }

    #[test]
    fn negative_word_time_is_rejected() {
        let json = r#"{"results": [{"alternatives": [{"transcript": "a",
            "words": [{"word": "a", "startTime": "-0.5s", "endTime": "0.300s"}]}]}]}"#;
        assert!(parse(json).is_err());
    }

    #[test]
    fn bad_word_time_is_reported() {
        let json = r#"{"results": [{"alternatives": [{"transcript": "a",
            "words": [{"word": "a", "startTime": "soon", "endTime": "0.300s"}]}]}]}"#;
        assert!(parse(json).is_err());
    }
}
