//! Azure speech dumps: one entry per recognized utterance, timed in 100 ns ticks.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::{Recognition, Segment};

pub const TICKS_PER_MS: i64 = 10_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzureResult {
    #[serde(default)]
    pub recognition_status: Option<String>,
    pub offset: i64,
    pub duration: i64,
    #[serde(alias = "Text")]
    pub display_text: String,
}

impl AzureResult {
    fn is_success(&self) -> bool {
        self.recognition_status
            .as_deref()
            .is_none_or(|status| status == "Success")
    }

    pub fn to_segment(&self) -> Segment {
        Segment::new(
            self.offset / TICKS_PER_MS,
            self.duration / TICKS_PER_MS,
            self.display_text.clone(),
        )
    }
}

pub fn parse(json: &str) -> anyhow::Result<Vec<Recognition>> {
    let results: Vec<AzureResult> = serde_json::from_str(json)?;

    let total = results.len();
    let recognitions: Vec<Recognition> = results
        .iter()
        .filter(|r| r.is_success())
        .map(|r| Recognition::SegmentWithText(r.to_segment()))
        .collect();

    if recognitions.len() < total {
        log::warn!(
            "skipped {} unsuccessful Azure results",
            total - recognitions.len()
        );
    }
    Ok(recognitions)
}

pub fn load(path: &Path) -> anyhow::Result<Vec<Recognition>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Azure dump {:?}", path))?;
    parse(&content).with_context(|| format!("Failed to parse Azure dump {:?}", path))
}
