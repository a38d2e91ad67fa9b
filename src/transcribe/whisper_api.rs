// Hosted Whisper API implementation
//
// Talks to an OpenAI-compatible audio transcriptions endpoint (Groq-hosted
// Whisper in the default configuration) with a classified retry loop:
// credential and bad-request rejections abort immediately, everything else
// backs off exponentially up to the attempt limit.

use reqwest::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::{Transcript, TranscriberTrait, Word};
use crate::config::TranscriberConfig;
use crate::error::{Result, SubburnError};

/// Verbose JSON response shape from the transcription endpoint
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    words: Option<Vec<ApiWord>>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiWord {
    word: String,
    start: f64,
    end: f64,
}

/// Classified outcome of a single transcription attempt. The retry loop
/// branches on this instead of catching errors.
#[derive(Debug)]
enum AttemptFailure {
    /// Provider rejected the credentials; never retried
    Auth(String),
    /// Provider rejected the request shape; never retried
    InvalidInput(String),
    /// Timeout, transport error, non-2xx, or malformed body; retried
    Transient(String),
}

/// Hosted Whisper API transcriber
#[derive(Debug)]
pub struct WhisperApiTranscriber {
    config: TranscriberConfig,
    client: reqwest::Client,
}

impl WhisperApiTranscriber {
    pub fn new(config: TranscriberConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(SubburnError::Config(
                "Transcriber API key is not configured (set GROQ_API_KEY)".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Perform one upload attempt and classify the outcome
    async fn attempt(
        &self,
        audio_bytes: &[u8],
        file_name: &str,
    ) -> std::result::Result<Transcript, AttemptFailure> {
        let part = multipart::Part::bytes(audio_bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str("audio/mpeg")
            .map_err(|e| AttemptFailure::Transient(format!("Failed to build upload: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("language", self.config.language.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AttemptFailure::Transient(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::Auth(format!(
                "Invalid transcription API key: {}",
                body.trim()
            )));
        }
        if status == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::InvalidInput(format!(
                "Invalid audio file or request: {}",
                body.trim()
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::Transient(format!(
                "Transcription API returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| AttemptFailure::Transient(format!("Malformed response body: {}", e)))?;

        let Some(api_words) = body.words else {
            return Err(AttemptFailure::Transient(
                "Response is missing the word list".to_string(),
            ));
        };

        // A well-shaped but empty word list is not a retry trigger here;
        // the pipeline decides what an empty transcript means.
        let words = api_words
            .into_iter()
            .map(|w| Word {
                end: w.end.max(w.start),
                start: w.start,
                text: w.word,
            })
            .collect();

        Ok(Transcript {
            words,
            language: body.language,
            duration: body.duration,
        })
    }
}

#[async_trait::async_trait]
impl TranscriberTrait for WhisperApiTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let audio_bytes = tokio::fs::read(audio_path).await.map_err(|e| {
            SubburnError::Transcription(format!(
                "Failed to read audio file {}: {}",
                audio_path.display(),
                e
            ))
        })?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            info!("Transcription attempt {}/{}", attempt, max_attempts);

            match self.attempt(&audio_bytes, &file_name).await {
                Ok(transcript) => {
                    info!("Transcription successful: {} words", transcript.words.len());
                    return Ok(transcript);
                }
                Err(AttemptFailure::Auth(detail)) => {
                    return Err(SubburnError::Auth(detail));
                }
                Err(AttemptFailure::InvalidInput(detail)) => {
                    return Err(SubburnError::InvalidInput(detail));
                }
                Err(AttemptFailure::Transient(detail)) => {
                    warn!("Transcription attempt {} failed: {}", attempt, detail);
                    last_error = detail;

                    if attempt < max_attempts {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        info!("Retrying in {}s", delay.as_secs());
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(SubburnError::Transcription(format!(
            "Transcription failed after {} attempts: {}",
            max_attempts, last_error
        )))
    }
}
