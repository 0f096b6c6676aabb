//! pdf-speech - Convert PDF books to speech, one WAV file per page

mod config;
mod extract;
mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::PdfSpeechConfig;
use log::{debug, error, info, warn};
use progress::BarSink;
use speech_core::pipeline::page_status;
use speech_core::tts::EspeakFactory;
use speech_core::{
    BackendFactory, ConversionPipeline, ConvertError, LogSink, PageState, PipelineConfig,
    ProgressSink, RetryPolicy, SynthesisClient, Voice, VoiceSettings,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

const EXIT_MISSING_INPUT: u8 = 1;
const EXIT_NO_TEXT: u8 = 2;
const EXIT_FAILED: u8 = 3;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "pdf-speech")]
#[command(about = "Convert PDF books to speech, one WAV file per page", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the PDF (or plain-text) file
    input: Option<PathBuf>,

    /// Output folder for WAV files (default: tts_output)
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Voice index from `pdf-speech voices`, or a voice name
    #[arg(long)]
    voice: Option<String>,

    /// Speech rate in words per minute (default 175)
    #[arg(long)]
    rate: Option<u32>,

    /// Volume (0.0-1.0, default 1.0)
    #[arg(long)]
    volume: Option<f32>,

    /// Max characters per TTS chunk (default 1500)
    #[arg(long)]
    chunk: Option<usize>,

    /// Attempts per chunk before giving up (default 3)
    #[arg(long)]
    retries: Option<u32>,

    /// Start fresh, ignore existing progress
    #[arg(long)]
    no_resume: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List the voices offered by the speech engine
    Voices,
    /// Show which pages of a document are already converted
    Status {
        /// Path to the PDF (or plain-text) file
        input: PathBuf,

        /// Output folder holding the progress file
        #[arg(short, long)]
        outdir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice index or name
        voice: String,
    },
    /// Set default speech rate
    SetRate {
        /// Words per minute
        value: u32,
    },
    /// Set default volume
    SetVolume {
        /// Value (0.0-1.0)
        value: f32,
    },
    /// Set default chunk size
    SetChunk {
        /// Max characters per chunk
        value: usize,
    },
    /// Set default output folder
    SetOutdir {
        /// Folder path
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    match &args.command {
        Some(Commands::Config { action }) => {
            handle_config_command(action)?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Voices) => {
            list_voices()?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Status { input, outdir }) => {
            return show_status(input, outdir.as_deref());
        }
        None => {}
    }

    let Some(input) = args.input.clone() else {
        anyhow::bail!("Input file path is required. Run 'pdf-speech --help' for usage.");
    };

    if !input.is_file() {
        error!("File not found: {}", input.display());
        return Ok(ExitCode::from(EXIT_MISSING_INPUT));
    }

    let config = PdfSpeechConfig::load().context("Failed to load configuration")?;
    convert(&input, &args, &config).await
}

/// Convert a document, resuming from its checkpoint.
async fn convert(input: &Path, args: &Args, config: &PdfSpeechConfig) -> Result<ExitCode> {
    let pipeline_config = pipeline_config(args.outdir.as_deref(), args.chunk, config);
    let settings = voice_settings(args, config);
    let policy = RetryPolicy::new(
        args.retries.unwrap_or(config.retries),
        Duration::from_millis(config.backoff_ms),
    );

    debug!("Input: {}", input.display());
    debug!("Output: {}", pipeline_config.output_dir.display());
    debug!("Settings: {:?}", settings);
    debug!("Retry policy: {:?}", policy);

    let pages = match extract::read_pages(input) {
        Ok(pages) => pages,
        Err(e) => {
            error!("Text extraction failed: {:#}", e);
            return Ok(ExitCode::from(EXIT_FAILED));
        }
    };

    if args.no_resume {
        let checkpoint = pipeline_config.checkpoint_path();
        if checkpoint.exists() {
            info!("Discarding previous progress ({})", checkpoint.display());
            std::fs::remove_file(&checkpoint)
                .with_context(|| format!("Failed to remove {}", checkpoint.display()))?;
        }
    }

    let factory = EspeakFactory::new(config.espeak_program.as_deref())?;
    debug!("Engine: {}", factory.program().display());
    let client = SynthesisClient::new(Arc::new(factory), &settings, policy)?;
    let mut pipeline = ConversionPipeline::new(pipeline_config, client);

    // The bar and debug logging fight over stderr
    let mut bar = BarSink::new();
    let mut log_sink = LogSink::new();
    let sink: &mut dyn ProgressSink = if args.debug { &mut log_sink } else { &mut bar };

    let outcome = tokio::select! {
        result = pipeline.run(&pages, sink) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(result) = outcome else {
        bar.abandon();
        warn!("Interrupted. Progress is saved; run again to resume.");
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    };

    match result {
        Ok(summary) => {
            info!(
                "{} page(s) rendered, {} skipped, {} empty. Output: {}",
                summary.rendered,
                summary.skipped,
                summary.empty,
                pipeline.config().output_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ConvertError::ExtractionEmpty) => {
            error!("No extractable text found in {}", input.display());
            Ok(ExitCode::from(EXIT_NO_TEXT))
        }
        Err(e) => {
            bar.abandon();
            match e.page() {
                Some(page) => error!("Failed on page {}: {}", page, e.root()),
                None => error!("Conversion failed: {}", e),
            }
            error!("Run the same command again to resume.");
            Ok(ExitCode::from(EXIT_FAILED))
        }
    }
}

fn pipeline_config(
    outdir: Option<&Path>,
    chunk: Option<usize>,
    config: &PdfSpeechConfig,
) -> PipelineConfig {
    let output_dir = outdir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_dir.clone());

    PipelineConfig::new(output_dir)
        .with_page_prefix(config.page_prefix.clone())
        .with_max_chars(chunk.unwrap_or(config.chunk_size))
}

/// CLI flags override the config file.
fn voice_settings(args: &Args, config: &PdfSpeechConfig) -> VoiceSettings {
    let settings = VoiceSettings::defaults()
        .with_rate(args.rate.unwrap_or(config.rate))
        .with_volume(args.volume.unwrap_or(config.volume));

    match args.voice.as_deref().or(config.voice.as_deref()) {
        Some(voice) => settings.with_voice(Voice::parse(voice)),
        None => settings,
    }
}

fn list_voices() -> Result<()> {
    let config = PdfSpeechConfig::load()?;
    let factory = EspeakFactory::new(config.espeak_program.as_deref())?;
    let voices = factory.voices().context("Failed to list voices")?;

    if voices.is_empty() {
        println!("No voices reported by {}", factory.program().display());
        return Ok(());
    }

    println!("Available voices:");
    for (i, voice) in voices.iter().enumerate() {
        println!("[{}] {} | {} | {}", i, voice.name, voice.id, voice.language);
    }
    Ok(())
}

fn show_status(input: &Path, outdir: Option<&Path>) -> Result<ExitCode> {
    if !input.is_file() {
        error!("File not found: {}", input.display());
        return Ok(ExitCode::from(EXIT_MISSING_INPUT));
    }

    let config = PdfSpeechConfig::load()?;
    let pipeline_config = pipeline_config(outdir, None, &config);
    let pages = extract::read_pages(input)?;
    if pages.is_empty() {
        error!("No extractable text found in {}", input.display());
        return Ok(ExitCode::from(EXIT_NO_TEXT));
    }

    let states = page_status(&pipeline_config, &pages);
    let done = states.iter().filter(|s| **s == PageState::Done).count();
    println!(
        "{}: {}/{} pages converted ({:.1}%)",
        input.display(),
        done,
        states.len(),
        done as f64 / states.len() as f64 * 100.0
    );

    let pending: Vec<String> = states
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == PageState::Pending)
        .map(|(i, _)| (i + 1).to_string())
        .collect();
    if !pending.is_empty() {
        println!("Pending pages: {}", pending.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = PdfSpeechConfig::load()?;
            println!("Configuration file: {:?}", PdfSpeechConfig::config_path()?);
            println!();
            match &config.voice {
                Some(voice) => println!("voice = \"{}\"", voice),
                None => println!("voice = (engine default)"),
            }
            println!("rate = {}", config.rate);
            println!("volume = {}", config.volume);
            println!("chunk_size = {}", config.chunk_size);
            println!("retries = {}", config.retries);
            println!("backoff_ms = {}", config.backoff_ms);
            println!("output_dir = \"{}\"", config.output_dir.display());
            println!("page_prefix = \"{}\"", config.page_prefix);
            match &config.espeak_program {
                Some(program) => println!("espeak_program = \"{}\"", program),
                None => println!("espeak_program = (espeak-ng on PATH)"),
            }
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = PdfSpeechConfig::load()?;
            config.voice = Some(voice.clone());
            config.save()?;
            println!("Default voice set to: {}", voice);
        }
        ConfigAction::SetRate { value } => {
            let mut config = PdfSpeechConfig::load()?;
            config.rate = (*value).max(1);
            config.save()?;
            println!("Default rate set to: {}", config.rate);
        }
        ConfigAction::SetVolume { value } => {
            let mut config = PdfSpeechConfig::load()?;
            config.volume = value.clamp(0.0, 1.0);
            config.save()?;
            println!("Default volume set to: {}", config.volume);
        }
        ConfigAction::SetChunk { value } => {
            let mut config = PdfSpeechConfig::load()?;
            config.chunk_size = (*value).max(1);
            config.save()?;
            println!("Default chunk size set to: {}", config.chunk_size);
        }
        ConfigAction::SetOutdir { path } => {
            let mut config = PdfSpeechConfig::load()?;
            config.output_dir = path.clone();
            config.save()?;
            println!("Default output folder set to: {}", path.display());
        }
    }
    Ok(())
}
