use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SubburnError};

fn default_tool_timeout_secs() -> u64 {
    600
}

fn default_font_size() -> u32 {
    22
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
    pub transcriber: TranscriberConfig,
    pub styling: StylingConfig,
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Hard ceiling on a single tool invocation (seconds); hung encodes are
    /// killed and reported as tool failures
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Transcription endpoint (OpenAI-compatible audio transcriptions API)
    pub endpoint: String,
    /// Bearer API key; usually overlaid from GROQ_API_KEY at startup
    #[serde(default)]
    pub api_key: String,
    /// Speech model identifier
    pub model: String,
    /// Language hint passed to the provider
    pub language: String,
    /// Per-call network timeout in seconds, independent of retry backoff
    pub timeout_secs: u64,
    /// Maximum attempts for transient failures
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylingConfig {
    /// Styling strategy for caption events
    pub mode: StyleMode,
    /// Text-generation endpoint for AI-assisted styling
    pub endpoint: String,
    /// Provider API key; usually overlaid from GEMINI_API_KEY at startup
    #[serde(default)]
    pub api_key: String,
    /// Text-generation model identifier
    pub model: String,
    /// Caption font size in ASS units
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleMode {
    /// RuleBased: classify each word against closed tier lists
    RuleBased,
    /// AiAssisted: ask a text-generation provider to restyle the document,
    /// falling back to rules on any failure
    AiAssisted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root directory under which per-job workspaces are created
    pub root: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                ffmpeg_path: "ffmpeg".to_string(),
                ffprobe_path: "ffprobe".to_string(),
                tool_timeout_secs: default_tool_timeout_secs(),
            },
            transcriber: TranscriberConfig {
                endpoint: "https://api.groq.com/openai/v1/audio/transcriptions".to_string(),
                api_key: String::new(),
                model: "whisper-large-v3-turbo".to_string(),
                language: "en".to_string(),
                timeout_secs: 60,
                max_attempts: 3,
            },
            styling: StylingConfig {
                mode: StyleMode::RuleBased,
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                api_key: String::new(),
                model: "gemini-2.0-flash-exp".to_string(),
                font_size: default_font_size(),
            },
            workspace: WorkspaceConfig {
                root: "./temp".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubburnError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubburnError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubburnError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubburnError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Overlay provider credentials from the environment. Called once at
    /// assembly time; components only ever see the resulting config value.
    pub fn apply_env_credentials(&mut self) {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.is_empty() {
                self.transcriber.api_key = key;
            }
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.styling.api_key = key;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.transcriber.max_attempts, 3);
        assert_eq!(parsed.transcriber.timeout_secs, 60);
        assert_eq!(parsed.styling.font_size, 22);
        assert_eq!(parsed.media.tool_timeout_secs, 600);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let minimal = r#"
            [media]
            ffmpeg_path = "ffmpeg"
            ffprobe_path = "ffprobe"

            [transcriber]
            endpoint = "http://localhost:9999/v1/audio/transcriptions"
            model = "whisper-large-v3-turbo"
            language = "en"
            timeout_secs = 60
            max_attempts = 3

            [styling]
            mode = "RuleBased"
            endpoint = "http://localhost:9998"
            model = "gemini-2.0-flash-exp"

            [workspace]
            root = "./temp"
        "#;
        let config: Config = toml::from_str(minimal).unwrap();
        assert_eq!(config.media.tool_timeout_secs, 600);
        assert_eq!(config.styling.font_size, 22);
        assert!(config.transcriber.api_key.is_empty());
    }
}
