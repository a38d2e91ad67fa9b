use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full caption burn-in pipeline on a video file
    Process {
        /// Input video file (consumed by the pipeline)
        #[arg(short, long)]
        input: PathBuf,

        /// Styling strategy
        #[arg(long, default_value = "rule")]
        style_mode: String,

        /// Root directory for job workspaces
        #[arg(long)]
        workspace_root: Option<PathBuf>,
    },

    /// Extract the audio stream from a video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe an audio file into a plain caption document
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output caption document
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Burn a caption document onto a video file
    Burn {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// Caption document
        #[arg(short, long)]
        captions: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print container and stream metadata for a media file
    Probe {
        /// Input media file
        #[arg(short, long)]
        input: PathBuf,
    },
}
