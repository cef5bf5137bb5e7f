use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_SENTENCE_GAP_MS: i64 = 100;
pub const DEFAULT_TRANSLATION_BATCH_SIZE: usize = 50;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub split: SplitConfig,
    pub align: AlignConfig,
    pub validation: ValidationPolicy,
    pub translation: TranslationConfig,
}

/// How a text-only segment is cut into sentences.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SplitConfig {
    /// Pause assumed between two sentences of the same segment.
    pub sentence_gap_ms: i64,
    pub delimiters: Vec<char>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            sentence_gap_ms: DEFAULT_SENTENCE_GAP_MS,
            delimiters: vec!['。', '？'],
        }
    }
}

impl SplitConfig {
    pub fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(&c)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AlignConfig {
    /// Recognizer-specific marker removed from word text.
    pub placeholder: char,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self { placeholder: '▁' }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimecodeComparison {
    /// Compare decoded milliseconds; undecodable strings fall back to `Lexicographic`.
    #[default]
    Decoded,
    Lexicographic,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Let a row that failed a check still become the predecessor of the next row.
    pub carry_forward_on_failure: bool,
    pub timecode_comparison: TimecodeComparison,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            carry_forward_on_failure: true,
            timecode_comparison: TimecodeComparison::Decoded,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TranslationConfig {
    pub auth_key: Option<String>,
    pub base_url: String,
    pub source_lang: String,
    pub target_lang: String,
    pub batch_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            auth_key: None,
            base_url: "https://api-free.deepl.com".to_string(),
            source_lang: "JA".to_string(),
            target_lang: "EN-US".to_string(),
            batch_size: DEFAULT_TRANSLATION_BATCH_SIZE,
        }
    }
}

fn config_root() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".jimaku"))
}

pub fn resolve_profile_path(profile: &str) -> anyhow::Result<PathBuf> {
    if let Some(rest) = profile.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not find home directory")?;
        return Ok(home.join(rest));
    }

    let path = PathBuf::from(profile);
    if path.is_absolute() || profile.starts_with("./") || profile.starts_with("../") {
        return Ok(path);
    }

    Ok(config_root()?
        .join("profiles")
        .join(format!("{}.yaml", profile)))
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let config_path = config_root()?.join("config.yaml");

    if !config_path.exists() {
        log::debug!("No config at {:?}, using defaults", config_path);
        return Ok(AppConfig::default());
    }

    load_config_file(&config_path)
}

pub fn load_config_file(path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    parse_config(&content).with_context(|| format!("Failed to parse config {:?}", path))
}

pub fn parse_config(content: &str) -> anyhow::Result<AppConfig> {
    let config: AppConfig = serde_yaml::from_str(content)?;
    if config.translation.batch_size == 0 {
        anyhow::bail!("translation.batch_size must be at least 1");
    }
    Ok(config)
}

/// The profile replaces the app config when given.
pub fn load(profile: Option<&str>) -> anyhow::Result<AppConfig> {
    match profile {
        Some(p) => {
            let path = resolve_profile_path(p)?;
            load_config_file(&path).context("Failed to load profile")
        }
        None => load_app_config().context("Failed to load app config"),
    }
}
