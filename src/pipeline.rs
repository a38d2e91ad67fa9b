use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Result, SubburnError};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::style::Styler;
use crate::subtitle::generate_plain_document;
use crate::transcribe::{TranscriberFactory, TranscriberTrait};
use crate::workspace::JobWorkspace;

/// Pipeline orchestrator.
///
/// Runs one job as a strictly ordered stage sequence inside its own
/// workspace: scale, extract audio, transcribe, render and style captions,
/// burn. Every stage error aborts the rest of the pipeline and triggers the
/// failure cleanup path; on success only the burned video survives.
pub struct Pipeline {
    media: Box<dyn MediaProcessorTrait>,
    transcriber: Box<dyn TranscriberTrait>,
    styler: Styler,
    workspace_root: PathBuf,
    font_size: u32,
}

impl Pipeline {
    /// Assemble the pipeline from configuration, checking that the media
    /// tool is runnable up front
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        media.check_availability()?;

        let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone())?;
        let styler = Styler::new(config.styling.clone());

        Ok(Self {
            media,
            transcriber,
            styler,
            workspace_root: PathBuf::from(&config.workspace.root),
            font_size: config.styling.font_size,
        })
    }

    /// Assemble from explicit components; used by tests to substitute
    /// stub adapters
    pub fn assemble(
        media: Box<dyn MediaProcessorTrait>,
        transcriber: Box<dyn TranscriberTrait>,
        styler: Styler,
        workspace_root: PathBuf,
        font_size: u32,
    ) -> Self {
        Self {
            media,
            transcriber,
            styler,
            workspace_root,
            font_size,
        }
    }

    /// Process one video end-to-end, returning the burned output path.
    ///
    /// The input file is consumed: it is removed along with the other
    /// intermediates on success, and removed best-effort on failure.
    pub async fn process(&self, input_path: &Path) -> Result<PathBuf> {
        if !input_path.exists() {
            return Err(SubburnError::FileNotFound(
                input_path.display().to_string(),
            ));
        }

        info!("Starting video processing: {}", input_path.display());
        let workspace = JobWorkspace::create(&self.workspace_root).await?;

        match self.run_stages(input_path, &workspace).await {
            Ok(output_path) => {
                info!("Cleaning up intermediate artifacts");
                workspace.remove_intermediates(input_path).await;
                info!("Video processing completed successfully");
                Ok(output_path)
            }
            Err(e) => {
                error!("Video processing failed: {}", e);
                workspace.remove_all(input_path).await;
                Err(e)
            }
        }
    }

    async fn run_stages(&self, input_path: &Path, workspace: &JobWorkspace) -> Result<PathBuf> {
        info!("Stage 1/7: Scaling video");
        let scaled_path = workspace.scaled_video();
        self.media.scale(input_path, &scaled_path).await?;

        info!("Stage 2/7: Extracting audio");
        let audio_path = workspace.audio();
        self.media.extract_audio(&scaled_path, &audio_path).await?;

        info!("Stage 3/7: Transcribing audio");
        let transcript = self.transcriber.transcribe(&audio_path).await?;
        if transcript.is_empty() {
            return Err(SubburnError::Transcription(
                "Transcription returned no words".to_string(),
            ));
        }

        info!("Stage 4/7: Generating caption document");
        let plain_document = generate_plain_document(&transcript, self.font_size);

        info!("Stage 5/7: Styling captions");
        let styled_document = self.styler.style(&plain_document).await;

        info!("Stage 6/7: Saving caption document");
        let caption_path = workspace.captions();
        fs::write(&caption_path, styled_document).await?;

        info!("Stage 7/7: Burning captions onto video");
        let output_path = workspace.output();
        self.media
            .burn_captions(&scaled_path, &caption_path, &output_path)
            .await?;

        Ok(output_path)
    }
}
