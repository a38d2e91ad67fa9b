use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

use super::{escape_filter_path, MediaCommand, MediaProcessorTrait, ProbeReport};
use crate::config::MediaConfig;
use crate::error::{Result, SubburnError};

/// Concrete implementation of the media tool adapter (ffmpeg-based)
pub struct FfmpegProcessor {
    config: MediaConfig,
}

impl FfmpegProcessor {
    /// Create a new ffmpeg-backed processor
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.tool_timeout_secs)
    }
}

#[async_trait]
impl MediaProcessorTrait for FfmpegProcessor {
    /// Scale the video up 1.2x and crop back to the original dimensions,
    /// leaving the audio stream untouched
    async fn scale(&self, video_path: &Path, output_path: &Path) -> Result<()> {
        info!(
            "Scaling video {} -> {}",
            video_path.display(),
            output_path.display()
        );

        MediaCommand::new(&self.config.ffmpeg_path, "Scale video")
            .overwrite()
            .input(video_path)
            .video_filter("scale=iw*1.2:ih*1.2,crop=iw/1.2:ih/1.2")
            .copy_audio()
            .output(output_path)
            .execute(self.timeout())
            .await?;

        info!("Video scaling completed");
        Ok(())
    }

    /// Extract the audio-only stream at highest variable quality
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!(
            "Extracting audio from {} to {}",
            video_path.display(),
            audio_path.display()
        );

        MediaCommand::new(&self.config.ffmpeg_path, "Extract audio")
            .overwrite()
            .input(video_path)
            .audio_quality(0)
            .map_audio()
            .output(audio_path)
            .execute(self.timeout())
            .await?;

        info!("Audio extraction completed");
        Ok(())
    }

    /// Burn the caption document into the video pixel data via the
    /// subtitles filter; the caption path is escaped for the filter parser
    async fn burn_captions(
        &self,
        video_path: &Path,
        caption_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Burning captions from {} into {} -> {}",
            caption_path.display(),
            video_path.display(),
            output_path.display()
        );

        let escaped = escape_filter_path(caption_path);

        MediaCommand::new(&self.config.ffmpeg_path, "Burn captions")
            .overwrite()
            .input(video_path)
            .video_filter(format!("subtitles='{}'", escaped))
            .copy_audio()
            .output(output_path)
            .execute(self.timeout())
            .await?;

        info!("Caption burn-in completed");
        Ok(())
    }

    /// Read container and stream metadata as a structured report
    async fn probe(&self, video_path: &Path) -> Result<ProbeReport> {
        debug!("Probing media file: {}", video_path.display());

        let stdout = MediaCommand::new(&self.config.ffprobe_path, "Probe media")
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(video_path.to_string_lossy().to_string())
            .execute(self.timeout())
            .await?;

        let report: ProbeReport = serde_json::from_str(&stdout)
            .map_err(|e| SubburnError::Tool(format!("Probe returned malformed JSON: {}", e)))?;

        Ok(report)
    }

    /// Check if the media tool is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .map_err(|e| SubburnError::Tool(format!("Media tool not found: {}", e)))?;

        if output.status.success() {
            info!("Media tool is available");
            Ok(())
        } else {
            Err(SubburnError::Tool(
                "Media tool version check failed".to_string(),
            ))
        }
    }
}
