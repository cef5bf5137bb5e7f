//! Subtitle timing reconstruction and validation.
//!
//! Recognizer output comes in as [`recognize::Recognition`]s and leaves as
//! timed [`row::Row`]s; stored rows are checked with
//! [`validate::RowSequenceValidator`].

pub mod config;
pub mod error;
pub mod output;
pub mod recognize;
pub mod row;
pub mod timecode;
pub mod translate;
pub mod validate;

pub use error::TimingError;
pub use recognize::{Recognition, Segment, Word, reconstruct_rows};
pub use row::{Row, RowRecord};
pub use validate::{RowSequenceValidator, ValidationReport, Violation, ViolationKind};
