// Media tool adapter
//
// A thin abstraction over the external media tool (ffmpeg/ffprobe):
// - Commands: command builder, bounded diagnostic capture, filter escaping
// - Processor: the concrete ffmpeg-backed implementation
//
// Transcoding failures are never transient from this layer's point of view,
// so nothing here retries; errors surface immediately to the pipeline.

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Structured report from the probe operation (ffprobe JSON output)
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub format: Option<serde_json::Value>,
    #[serde(default)]
    pub streams: Vec<serde_json::Value>,
}

/// Main trait for media tool operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Apply a uniform 1.2x zoom-then-crop scale, preserving dimensions
    async fn scale(&self, video_path: &Path, output_path: &Path) -> Result<()>;

    /// Extract the audio stream at highest variable quality
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Burn a caption document onto the video as pixel data
    async fn burn_captions(
        &self,
        video_path: &Path,
        caption_path: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Read container and stream metadata
    async fn probe(&self, video_path: &Path) -> Result<ProbeReport>;

    /// Check if the media tool binary is runnable
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (ffmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::FfmpegProcessor::new(config))
    }
}
