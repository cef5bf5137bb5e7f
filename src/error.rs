use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimingError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("malformed timecode {input:?}: expected HH:MM:SS.mmm")]
    MalformedTimecode { input: String },
    #[error("malformed segment at {start_ms} ms: {message}")]
    MalformedSegment { start_ms: i64, message: String },
    #[error("malformed row {row_num}: {message}")]
    MalformedRow { row_num: usize, message: String },
}

impl TimingError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn malformed_timecode(input: impl Into<String>) -> Self {
        Self::MalformedTimecode {
            input: input.into(),
        }
    }

    pub(crate) fn malformed_segment(start_ms: i64, message: impl Into<String>) -> Self {
        Self::MalformedSegment {
            start_ms,
            message: message.into(),
        }
    }

    pub(crate) fn malformed_row(row_num: usize, message: impl std::fmt::Display) -> Self {
        Self::MalformedRow {
            row_num,
            message: message.to_string(),
        }
    }
}
