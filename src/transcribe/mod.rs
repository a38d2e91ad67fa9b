// Transcription client
//
// One implementation today: a hosted OpenAI-compatible Whisper API reached
// over HTTP (whisper_api). The trait boundary exists so the pipeline can be
// exercised against a stub transcriber in tests.

pub mod whisper_api;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use whisper_api::*;

use crate::config::TranscriberConfig;
use crate::error::Result;

/// One transcribed token with word-level timing. Immutable once produced;
/// only the transcription client constructs these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// Start time in seconds (fractional)
    pub start: f64,
    /// End time in seconds (fractional), never before `start`
    pub end: f64,
}

/// Ordered word-level transcript for one job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub words: Vec<Word>,
    pub language: Option<String>,
    pub duration: Option<f64>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Main trait for transcription operations
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Transcribe an audio file into word-level timing data
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create the default transcriber implementation (hosted Whisper API)
    pub fn create_transcriber(config: TranscriberConfig) -> Result<Box<dyn TranscriberTrait>> {
        Ok(Box::new(whisper_api::WhisperApiTranscriber::new(config)?))
    }
}
