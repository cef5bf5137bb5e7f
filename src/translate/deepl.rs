use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Translator;
use crate::config::TranslationConfig;

pub struct DeepLTranslator {
    client: reqwest::Client,
    base_url: String,
    auth_key: String,
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a [String],
    source_lang: &'a str,
    target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TextResult>,
}

#[derive(Debug, Deserialize)]
struct TextResult {
    text: String,
}

impl DeepLTranslator {
    pub fn new(config: &TranslationConfig, auth_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_key,
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/translate", self.base_url)
    }
}

impl Translator for DeepLTranslator {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>> {
        let body = TranslateRequest {
            text: texts,
            source_lang: &self.source_lang,
            target_lang: &self.target_lang,
        };

        let res = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("DeepL-Auth-Key {}", self.auth_key))
            .json(&body)
            .send()
            .await
            .context("Failed to send DeepL request")?;

        let status = res.status();
        if !status.is_success() {
            let error_text = res.text().await.unwrap_or_default();
            anyhow::bail!("DeepL API error: {} - {}", status, error_text);
        }

        let parsed: TranslateResponse = res
            .json()
            .await
            .context("Failed to parse DeepL response")?;

        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }
}
