//! Fixed-width `HH:MM:SS.mmm` rendering of millisecond offsets.
//!
//! Hours are zero-padded to two digits and widen past 99 instead of
//! truncating. Two timecodes of equal width compare lexicographically in
//! the same order as their millisecond values, which is what the legacy
//! string checks in [`crate::validate`] rely on.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::TimingError;

pub const ONE_SECOND_MS: i64 = 1000;
pub const ONE_MINUTE_MS: i64 = ONE_SECOND_MS * 60;
pub const ONE_HOUR_MS: i64 = ONE_MINUTE_MS * 60;
pub const ONE_DAY_MS: i64 = ONE_HOUR_MS * 24;

static TIMECODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2})\.(\d{3})$").expect("timecode pattern is valid")
});

struct Parts {
    hours: i64,
    minutes: i64,
    seconds: i64,
    millis: i64,
}

fn split(ms: i64) -> Result<Parts, TimingError> {
    if ms < 0 {
        return Err(TimingError::invalid_argument(format!(
            "negative millisecond offset {ms}"
        )));
    }

    Ok(Parts {
        hours: ms / ONE_HOUR_MS,
        minutes: (ms % ONE_HOUR_MS) / ONE_MINUTE_MS,
        seconds: (ms % ONE_MINUTE_MS) / ONE_SECOND_MS,
        millis: ms % ONE_SECOND_MS,
    })
}

/// Render `ms` as `HH:MM:SS.mmm`.
pub fn encode(ms: i64) -> Result<String, TimingError> {
    let p = split(ms)?;
    Ok(format!(
        "{:02}:{:02}:{:02}.{:03}",
        p.hours, p.minutes, p.seconds, p.millis
    ))
}

/// Render `ms` as a SubRip timestamp (`HH:MM:SS,mmm`).
pub fn encode_srt(ms: i64) -> Result<String, TimingError> {
    let p = split(ms)?;
    Ok(format!(
        "{:02}:{:02}:{:02},{:03}",
        p.hours, p.minutes, p.seconds, p.millis
    ))
}

/// Parse a timecode produced by [`encode`] back into milliseconds.
pub fn decode(tc: &str) -> Result<i64, TimingError> {
    let caps = TIMECODE_RE
        .captures(tc)
        .ok_or_else(|| TimingError::malformed_timecode(tc))?;

    let field = |i: usize| -> Result<i64, TimingError> {
        caps[i]
            .parse::<i64>()
            .map_err(|_| TimingError::malformed_timecode(tc))
    };

    let (hours, minutes, seconds, millis) = (field(1)?, field(2)?, field(3)?, field(4)?);
    if minutes >= 60 || seconds >= 60 {
        return Err(TimingError::malformed_timecode(tc));
    }

    hours
        .checked_mul(ONE_HOUR_MS)
        .and_then(|h| h.checked_add(minutes * ONE_MINUTE_MS + seconds * ONE_SECOND_MS + millis))
        .ok_or_else(|| TimingError::malformed_timecode(tc))
}
