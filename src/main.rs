use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jimaku::config;
use jimaku::output;
use jimaku::recognize::{self, azure, gcp};
use jimaku::row::{RowReader, RowRecord};
use jimaku::translate::{self, DeepLTranslator, TRANSLATION_HEADER};
use jimaku::validate::RowSequenceValidator;

#[derive(Parser)]
#[command(name = "jimaku")]
#[command(about = "Subtitle rows from speech recognition output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Engine {
    /// Utterances with offset, duration and text
    Azure,
    /// Transcripts with per-word time offsets
    Gcp,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct timed rows from a recognizer dump
    Recognize {
        /// Engine that produced the dump
        #[arg(value_enum)]
        engine: Engine,

        /// Recognizer output (JSON)
        input: PathBuf,

        /// Configuration profile or file path
        #[arg(short, long)]
        profile: Option<String>,

        /// Output CSV (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that stored rows are ordered and do not overlap
    ///
    /// Row numbers in violations are file lines, the header being line 1.
    /// The closing "N rows validated." count covers data rows only and
    /// leaves out the header line.
    Validate {
        /// Rows CSV
        input: PathBuf,

        /// Configuration profile or file path
        #[arg(short, long)]
        profile: Option<String>,

        /// Exit with an error when any violation is found
        #[arg(long)]
        strict: bool,
    },

    /// Compose an SRT file from stored rows
    Generate {
        /// Rows CSV; the last column is used as subtitle text
        input: PathBuf,

        /// Output SRT (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Append a translation column
    Translate {
        /// Rows CSV
        input: PathBuf,

        /// DeepL API key (overrides translation.auth_key)
        #[arg(long)]
        auth_key: Option<String>,

        /// Configuration profile or file path
        #[arg(short, long)]
        profile: Option<String>,

        /// Output CSV (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn open_rows(path: &Path) -> anyhow::Result<RowReader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    Ok(RowReader::new(BufReader::new(file)))
}

fn read_rows(path: &Path) -> anyhow::Result<(Vec<String>, Vec<RowRecord>)> {
    let mut reader = open_rows(path)?;
    let headers = reader.headers()?;
    let records = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read rows from {:?}", path))?;
    Ok((headers, records))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recognize {
            engine,
            input,
            profile,
            output,
        } => {
            let app_config = config::load(profile.as_deref())?;

            let recognitions = match engine {
                Engine::Azure => azure::load(&input)?,
                Engine::Gcp => gcp::load(&input)?,
            };

            let rows =
                recognize::reconstruct_rows(&recognitions, &app_config.split, &app_config.align)
                    .context("Failed to reconstruct rows")?;
            log::info!(
                "{} recognitions produced {} rows",
                recognitions.len(),
                rows.len()
            );

            match output {
                Some(path) => {
                    output::save_rows_csv(&path, &rows)?;
                    println!("Saved rows to {:?}", path);
                }
                None => output::write_rows_csv(std::io::stdout().lock(), &rows)?,
            }
        }
        Commands::Validate {
            input,
            profile,
            strict,
        } => {
            let app_config = config::load(profile.as_deref())?;

            let mut validator = RowSequenceValidator::new(app_config.validation);
            for record in open_rows(&input)? {
                let record = record.with_context(|| format!("Failed to read {:?}", input))?;
                if let Some(violation) = validator.push(&record) {
                    println!("{}", violation);
                }
            }

            let report = validator.finish();
            println!("{} rows validated.", report.rows_processed);

            if strict && !report.is_clean() {
                anyhow::bail!("{} invalid rows", report.violations.len());
            }
        }
        Commands::Generate { input, output } => {
            let (_, records) = read_rows(&input)?;

            match output {
                Some(path) => {
                    output::save_srt(&path, &records)?;
                    println!("Saved SRT to {:?}", path);
                }
                None => print!("{}", output::compose_srt(&records)?),
            }
        }
        Commands::Translate {
            input,
            auth_key,
            profile,
            output,
        } => {
            let app_config = config::load(profile.as_deref())?;
            let tc = app_config.translation;

            let auth_key = auth_key
                .or_else(|| tc.auth_key.clone())
                .ok_or_else(|| anyhow::anyhow!("DeepL auth key is required for translate"))?;

            let (mut headers, records) = read_rows(&input)?;
            if records.is_empty() {
                anyhow::bail!("No rows to translate in {:?}", input);
            }

            let pb_trans = ProgressBar::new(records.len() as u64);
            pb_trans.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                    .progress_chars("#>-"),
            );
            pb_trans.enable_steady_tick(Duration::from_millis(100));

            let translator = DeepLTranslator::new(&tc, auth_key);
            let translated =
                translate::translate_records(&translator, records, tc.batch_size, &pb_trans)
                    .await?;
            pb_trans.finish_with_message("Translation complete");

            headers.push(TRANSLATION_HEADER.to_string());
            match output {
                Some(path) => {
                    let file =
                        File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
                    output::write_records_csv(file, &headers, &translated)?;
                    println!("Saved translation to {:?}", path);
                }
                None => output::write_records_csv(std::io::stdout().lock(), &headers, &translated)?,
            }
        }
    }

    Ok(())
}
