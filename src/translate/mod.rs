pub mod deepl;

use std::future::Future;

use anyhow::Result;
use indicatif::ProgressBar;

use crate::row::RowRecord;

pub use deepl::DeepLTranslator;

pub const TRANSLATION_HEADER: &str = "translated_text";

/// A translation service: returns one translation per input, in order.
pub trait Translator {
    fn translate_batch(&self, texts: &[String]) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Translate the trailing text of every record in fixed-size batches and
/// append each translation as a new trailing field.
pub async fn translate_records<T: Translator>(
    translator: &T,
    mut records: Vec<RowRecord>,
    batch_size: usize,
    pb: &ProgressBar,
) -> Result<Vec<RowRecord>> {
    if batch_size == 0 {
        anyhow::bail!("Translation batch size must be at least 1");
    }

    for (batch_i, chunk) in records.chunks_mut(batch_size).enumerate() {
        let texts: Vec<String> = chunk
            .iter()
            .map(|r| r.text().unwrap_or_default().to_string())
            .collect();

        let translated = translator.translate_batch(&texts).await?;
        if translated.len() != chunk.len() {
            anyhow::bail!(
                "Translator returned {} texts for a batch of {} (batch {})",
                translated.len(),
                chunk.len(),
                batch_i + 1
            );
        }

        for (record, text) in chunk.iter_mut().zip(translated) {
            record.fields.push(text);
        }

        log::info!("translated batch {} ({} rows)", batch_i + 1, chunk.len());
        pb.inc(chunk.len() as u64);
    }

    Ok(records)
}
