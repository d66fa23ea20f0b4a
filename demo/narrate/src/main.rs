mod config;
mod wav;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use config::NarrateConfig;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use voiceforge_audio::{
    DispatchEvent, DispatchGovernor, HttpSynthesizer, LongFormPipeline, StagedBackoff,
};
use voiceforge_core::{
    build_long_text_chunks, build_sentence_aligned_word_windows, normalize_text,
    preflight_word_limit, VfError,
};

/// Long-form narration: chunk text, synthesize over HTTP, stitch to WAV
#[derive(Debug, Parser)]
#[command(name = "narrate", version, about, long_about = None)]
struct Cli {
    /// TOML config (defaults to NARRATE_CONFIG or ./narrate.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print synthesis chunks as JSON
    Chunk {
        /// Input text, or @file.txt to read a file
        input: String,
        #[arg(long)]
        engine: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },

    /// Print sentence-aligned word windows as JSON
    Windows {
        /// Input text, or @file.txt to read a file
        input: String,
        #[arg(long)]
        max_words: Option<usize>,
    },

    /// Print the word-limit preflight result as JSON
    Preflight {
        /// Input text, or @file.txt to read a file
        input: String,
    },

    /// Synthesize the whole text and write a WAV file
    Synth {
        /// Input text, or @file.txt to read a file
        input: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        engine: Option<String>,
        #[arg(long)]
        voice: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        speed: Option<f32>,
        #[arg(long)]
        emotion: Option<String>,
        #[arg(long)]
        style: Option<String>,
    },
}

fn read_input(input: &str) -> std::io::Result<String> {
    match input.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path),
        None => Ok(input.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "info,voiceforge_core=info,voiceforge_audio=info,narrate=info".to_string()
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = NarrateConfig::load(cli.config.as_deref());
    cfg.pipeline.validate()?;
    let profiles = cfg.profile_table()?;

    match cli.command {
        Commands::Chunk {
            input,
            engine,
            language,
        } => {
            let text = read_input(&input)?;
            let engine = engine.unwrap_or_else(|| cfg.voice.engine.clone());
            let language = language.unwrap_or_else(|| cfg.voice.language.clone());
            let profile = profiles.resolve(&engine, &language)?;
            let chunks = build_long_text_chunks(&text, &profile);
            println!("{}", serde_json::to_string_pretty(&chunks)?);
        }
        Commands::Windows { input, max_words } => {
            let text = read_input(&input)?;
            let max = max_words.unwrap_or(cfg.pipeline.max_words_per_window);
            if max == 0 {
                return Err(VfError::invalid("max_words", "must be greater than zero").into());
            }
            let windows = build_sentence_aligned_word_windows(&text, max);
            println!("{}", serde_json::to_string_pretty(&windows)?);
        }
        Commands::Preflight { input } => {
            let text = read_input(&input)?;
            let result = preflight_word_limit(&text, cfg.pipeline.max_words_per_request);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Synth {
            input,
            output,
            engine,
            voice,
            language,
            speed,
            emotion,
            style,
        } => {
            let text = read_input(&input)?;
            let mut selection = cfg.voice.selection();
            if let Some(v) = engine {
                selection.engine = v;
            }
            if let Some(v) = voice {
                selection.voice_id = v;
            }
            if let Some(v) = language {
                selection.language = v;
            }
            if speed.is_some() {
                selection.speed = speed;
            }
            if emotion.is_some() {
                selection.emotion = emotion;
            }
            if style.is_some() {
                selection.style = style;
            }

            let (tx, mut rx) = mpsc::unbounded_channel();
            let synth = Arc::new(HttpSynthesizer::with_config(cfg.http.clone()));
            let mut governor = DispatchGovernor::new(synth)
                .with_retry_policy(Arc::new(StagedBackoff::from_config(&cfg.pipeline)))
                .with_max_concurrency(cfg.pipeline.max_concurrency)
                .with_events(tx);
            if let Some(limit) = cfg.attempt_timeout() {
                governor = governor.with_attempt_timeout(limit);
            }

            // Ctrl+C cancels pending attempts and backoff waits
            let cancel = governor.cancellation_token();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    warn!(target: "narrate", "Interrupted; cancelling synthesis");
                    cancel.cancel();
                }
            });

            let progress = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match event {
                        DispatchEvent::ChunkCompleted {
                            chunk_index,
                            chunk_total,
                            samples,
                        } => info!(
                            target: "narrate",
                            chunk = chunk_index + 1,
                            total = chunk_total,
                            samples,
                            "Chunk done"
                        ),
                        DispatchEvent::AttemptFailed {
                            attempt,
                            error,
                            backoff_ms,
                        } => warn!(
                            target: "narrate",
                            chunk = attempt.chunk_index + 1,
                            attempt = attempt.attempt,
                            trace_id = %attempt.trace_id,
                            error = %error,
                            backoff_ms = ?backoff_ms,
                            "Attempt failed"
                        ),
                        DispatchEvent::AttemptStarted(_) => {}
                    }
                }
            });

            let pipeline =
                LongFormPipeline::with_governor(governor, profiles, cfg.pipeline.clone())?;
            info!(
                target: "narrate",
                chars = normalize_text(&text).chars().count(),
                engine = %selection.engine,
                synthesizer = %pipeline.governor().synthesizer_name(),
                "Starting narration"
            );
            let result = pipeline.narrate(&text, &selection).await;
            drop(pipeline);
            progress.await.ok();

            let narration = match result {
                Ok(n) => n,
                Err(e) => {
                    error!(target: "narrate", error = %e, "Narration failed");
                    return Err(e.into());
                }
            };
            wav::write_wav(&output, &narration.audio)?;
            info!(
                target: "narrate",
                path = %output.display(),
                chunks = narration.chunks.len(),
                attempts = narration.attempts.len(),
                duration_ms = narration.audio.duration_ms(),
                "Wrote narration"
            );
        }
    }

    Ok(())
}
