//! One-pass consistency check over an ordered sequence of stored rows.
//!
//! Each row is checked on its own (start before end) and against the row
//! before it (no touching, no overlap). Only the first failing check of a
//! row is reported, and the pass always runs to the end so one run lists
//! every inconsistent row.

use std::cmp::Ordering;
use std::fmt;

use crate::config::{TimecodeComparison, ValidationPolicy};
use crate::row::RowRecord;
use crate::timecode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    NonMonotonicMs { start_ms: i64, end_ms: i64 },
    NonMonotonicTimecode { start_tc: String, end_tc: String },
    OverlapMs { start_ms: i64, prev_end_ms: i64 },
    OverlapTimecode { start_tc: String, prev_end_tc: String },
}

impl ViolationKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::NonMonotonicMs { .. } => "NonMonotonicMs",
            ViolationKind::NonMonotonicTimecode { .. } => "NonMonotonicTimecode",
            ViolationKind::OverlapMs { .. } => "OverlapMs",
            ViolationKind::OverlapTimecode { .. } => "OverlapTimecode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub row_num: usize,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid row {}: ", self.row_num)?;
        match &self.kind {
            ViolationKind::NonMonotonicMs { start_ms, end_ms } => {
                write!(f, "start_ms: {start_ms}, end_ms: {end_ms}")?
            }
            ViolationKind::NonMonotonicTimecode { start_tc, end_tc } => {
                write!(f, "start_tc: {start_tc}, end_tc: {end_tc}")?
            }
            ViolationKind::OverlapMs {
                start_ms,
                prev_end_ms,
            } => write!(f, "start_ms: {start_ms}, p_end_ms: {prev_end_ms}")?,
            ViolationKind::OverlapTimecode {
                start_tc,
                prev_end_tc,
            } => write!(f, "start_tc: {start_tc}, p_end_tc: {prev_end_tc}")?,
        }
        write!(f, " ({})", self.kind.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub rows_processed: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Timing of the row the next one is compared against.
#[derive(Debug, Clone)]
struct Previous {
    end_ms: Option<i64>,
    end_tc: Option<String>,
}

pub struct RowSequenceValidator {
    policy: ValidationPolicy,
    prev: Option<Previous>,
    report: ValidationReport,
}

impl RowSequenceValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            prev: None,
            report: ValidationReport::default(),
        }
    }

    fn compare_tc(&self, a: &str, b: &str) -> Ordering {
        if self.policy.timecode_comparison == TimecodeComparison::Decoded {
            if let (Ok(a), Ok(b)) = (timecode::decode(a), timecode::decode(b)) {
                return a.cmp(&b);
            }
            log::debug!("comparing undecodable timecodes {a:?} and {b:?} as strings");
        }
        a.cmp(b)
    }

    fn check(&self, row: &RowRecord) -> Option<ViolationKind> {
        if let (Some(start_ms), Some(end_ms)) = (row.start_ms, row.end_ms) {
            if start_ms >= end_ms {
                return Some(ViolationKind::NonMonotonicMs { start_ms, end_ms });
            }
        }

        if let (Some(start_tc), Some(end_tc)) = (&row.start_tc, &row.end_tc) {
            if self.compare_tc(start_tc, end_tc) != Ordering::Less {
                return Some(ViolationKind::NonMonotonicTimecode {
                    start_tc: start_tc.clone(),
                    end_tc: end_tc.clone(),
                });
            }
        }

        let prev = self.prev.as_ref()?;

        if let (Some(start_ms), Some(prev_end_ms)) = (row.start_ms, prev.end_ms) {
            if start_ms <= prev_end_ms {
                return Some(ViolationKind::OverlapMs {
                    start_ms,
                    prev_end_ms,
                });
            }
        }

        if let (Some(start_tc), Some(prev_end_tc)) = (&row.start_tc, &prev.end_tc) {
            if self.compare_tc(start_tc, prev_end_tc) != Ordering::Greater {
                return Some(ViolationKind::OverlapTimecode {
                    start_tc: start_tc.clone(),
                    prev_end_tc: prev_end_tc.clone(),
                });
            }
        }

        None
    }

    /// Check one row against its predecessor and record any violation.
    pub fn push(&mut self, row: &RowRecord) -> Option<&Violation> {
        self.report.rows_processed += 1;

        let violation = self.check(row);
        if violation.is_none() || self.policy.carry_forward_on_failure {
            self.prev = Some(Previous {
                end_ms: row.end_ms,
                end_tc: row.end_tc.clone(),
            });
        }

        let kind = violation?;
        self.report.violations.push(Violation {
            row_num: row.row_num,
            kind,
        });
        self.report.violations.last()
    }

    pub fn finish(self) -> ValidationReport {
        self.report
    }
}

pub fn validate_rows<'r>(
    rows: impl IntoIterator<Item = &'r RowRecord>,
    policy: ValidationPolicy,
) -> ValidationReport {
    let mut validator = RowSequenceValidator::new(policy);
    for row in rows {
        validator.push(row);
    }
    validator.finish()
}
