//! Subburn - Automated Caption Burn-In Workflow
//!
//! This is the main entry point for the Subburn application, which converts
//! a video file into a captioned video: ffmpeg extracts audio, a hosted
//! Whisper API produces a word-level transcript, a styled ASS caption track
//! is rendered and burned back onto the video.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subburn::cli::{Args, Commands};
use subburn::config::{Config, StyleMode};
use subburn::error::SubburnError;
use subburn::media::MediaProcessorFactory;
use subburn::pipeline::Pipeline;
use subburn::style::Styler;
use subburn::subtitle::generate_plain_document;
use subburn::transcribe::TranscriberFactory;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Credentials come from the environment; components only ever see the
    // assembled config value
    config.apply_env_credentials();

    // Execute command
    match args.command {
        Commands::Process {
            input,
            style_mode,
            workspace_root,
        } => {
            info!("Processing video file: {}", input.display());

            config.styling.mode = parse_style_mode(&style_mode)?;
            if let Some(root) = workspace_root {
                config.workspace.root = root.display().to_string();
            }

            let pipeline = Pipeline::new(config)?;
            let output_path = pipeline.process(&input).await?;
            println!("{}", output_path.display());
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());

            let media = MediaProcessorFactory::create_processor(config.media.clone());
            media.check_availability()?;
            media.extract_audio(&input, &output).await?;
        }
        Commands::Transcribe { input, output } => {
            info!("Transcribing audio: {}", input.display());

            let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone())?;
            let transcript = transcriber.transcribe(&input).await?;
            if transcript.is_empty() {
                return Err(SubburnError::Transcription(
                    "Transcription returned no words".to_string(),
                )
                .into());
            }

            let plain_document = generate_plain_document(&transcript, config.styling.font_size);
            let styler = Styler::new(config.styling.clone());
            let styled_document = styler.style(&plain_document).await;
            tokio::fs::write(&output, styled_document).await?;
            println!("{}", output.display());
        }
        Commands::Burn {
            video,
            captions,
            output,
        } => {
            info!("Burning captions onto video: {}", video.display());

            let media = MediaProcessorFactory::create_processor(config.media.clone());
            media.check_availability()?;
            media.burn_captions(&video, &captions, &output).await?;
        }
        Commands::Probe { input } => {
            let media = MediaProcessorFactory::create_processor(config.media.clone());
            let report = media.probe(&input).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "format": report.format,
                    "streams": report.streams,
                }))?
            );
        }
    }

    info!("Subburn workflow completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let subburn_dir = std::env::current_dir()?.join(".subburn");
    let log_dir = subburn_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subburn.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Parse styling mode from string
fn parse_style_mode(mode: &str) -> Result<StyleMode> {
    match mode.to_lowercase().as_str() {
        "rule" | "rules" | "rule-based" => Ok(StyleMode::RuleBased),
        "ai" | "ai-assisted" => Ok(StyleMode::AiAssisted),
        _ => Err(SubburnError::Config(format!(
            "Invalid style mode '{}'. Valid modes: rule, ai",
            mode
        ))
        .into()),
    }
}
