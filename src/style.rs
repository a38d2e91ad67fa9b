// Caption styling
//
// Each caption event is classified into one of three tiers that control its
// visual treatment: connector words stay static, hero words animate with a
// palette color, everything else animates without a color override. An
// optional AI-assisted mode asks a text-generation provider to restyle the
// whole document and falls back to the rules on any failure.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{StyleMode, StylingConfig};
use crate::error::{Result, SubburnError};

/// Visual treatment bucket for one caption event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Function words: static text, no animation
    Connector,
    /// High-impact words: animation plus a palette color
    Hero,
    /// Everything else: animation, no color override
    Default,
}

/// Closed list of function words rendered without animation
const CONNECTOR_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "am", "be", "been", "to", "of", "in", "on", "at",
    "by", "for", "with", "from", "and", "or", "but", "as", "if", "it", "this", "that", "these",
    "those",
];

/// Closed list of high-impact words rendered with animation and color
const HERO_WORDS: &[&str] = &[
    "amazing",
    "incredible",
    "awesome",
    "epic",
    "wow",
    "best",
    "worst",
    "never",
    "always",
    "love",
    "hate",
    "perfect",
    "terrible",
    "beautiful",
    "stunning",
    "shocking",
    "unbelievable",
    "extraordinary",
    "phenomenal",
];

/// Fixed hero color palette in ASS BGR notation:
/// impact yellow, electric cyan, bright green, vibrant red, orange
pub const COLOR_PALETTE: [&str; 5] = [
    "&H0000FFFF&",
    "&H00FFFF00&",
    "&H0000FF00&",
    "&H000000FF&",
    "&H0000A5FF&",
];

/// Classify a word into its styling tier (case-insensitive, whole word)
pub fn classify(word: &str) -> Tier {
    let normalized = word.trim().to_lowercase();
    if CONNECTOR_WORDS.contains(&normalized.as_str()) {
        Tier::Connector
    } else if HERO_WORDS.contains(&normalized.as_str()) {
        Tier::Hero
    } else {
        Tier::Default
    }
}

/// Palette index selection, injectable so tests can pin the choice.
/// Receives the palette size, returns an index below it.
pub type ColorPicker = Box<dyn Fn(usize) -> usize + Send + Sync>;

fn random_color_picker() -> ColorPicker {
    Box::new(|len| rand::random_range(0..len))
}

/// Gemini generateContent response shape (only the fields we read)
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// Styles plain caption documents according to the configured mode
pub struct Styler {
    config: StylingConfig,
    client: reqwest::Client,
    pick_color: ColorPicker,
}

impl Styler {
    /// Create a styler with pseudo-random hero color selection
    pub fn new(config: StylingConfig) -> Self {
        Self::with_color_picker(config, random_color_picker())
    }

    /// Create a styler with an explicit color picker
    pub fn with_color_picker(config: StylingConfig, pick_color: ColorPicker) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            config,
            client,
            pick_color,
        }
    }

    /// Style a plain caption document. AI-assisted mode degrades to
    /// rule-based styling on any provider failure; styling never fails
    /// the pipeline.
    pub async fn style(&self, plain_document: &str) -> String {
        if self.config.mode == StyleMode::AiAssisted && !self.config.api_key.is_empty() {
            match self.style_with_ai(plain_document).await {
                Ok(styled) => return styled,
                Err(e) => {
                    warn!("AI styling failed, falling back to rule-based: {}", e);
                }
            }
        }
        self.style_with_rules(plain_document)
    }

    /// Apply tier-based inline directives to every dialogue event
    pub fn style_with_rules(&self, plain_document: &str) -> String {
        plain_document
            .lines()
            .map(|line| {
                if line.starts_with("Dialogue:") {
                    self.style_line(line)
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Prefix one dialogue line's text with its tier directive. The text is
    /// everything after the last empty Effect field separator.
    fn style_line(&self, line: &str) -> String {
        let Some((prefix, text)) = line.rsplit_once(",,") else {
            return line.to_string();
        };

        let text = text.trim();
        let fs = self.config.font_size;

        let directive = match classify(text) {
            Tier::Connector => format!("{{\\an2\\bord(2)\\shad(1)\\fs{}}}", fs),
            Tier::Hero => {
                let color = COLOR_PALETTE[(self.pick_color)(COLOR_PALETTE.len())];
                format!(
                    "{{\\an2\\bord(2)\\shad(1)\\fs{}\\t(0,150,\\1c{}\\fscx120\\fscy120\\fscx100\\fscy100)}}",
                    fs, color
                )
            }
            Tier::Default => format!(
                "{{\\an2\\bord(2)\\shad(1)\\fs{}\\t(0,150,\\fscx120\\fscy120\\fscx100\\fscy100)}}",
                fs
            ),
        };

        format!("{},,{}{}", prefix, directive, text)
    }

    /// Ask the text-generation provider to restyle the whole document
    async fn style_with_ai(&self, plain_document: &str) -> Result<String> {
        debug!("Requesting AI-assisted caption styling");

        let prompt = build_styling_prompt(plain_document);
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&serde_json::json!({
                "contents": [ { "parts": [ { "text": prompt } ] } ],
                "generationConfig": {
                    "temperature": 0.3,
                    "maxOutputTokens": 8000
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubburnError::Styling(format!(
                "Styling provider returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        let styled = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| {
                SubburnError::Styling("Styling provider returned no completion".to_string())
            })?;

        Ok(strip_code_fences(styled).to_string())
    }
}

fn build_styling_prompt(plain_document: &str) -> String {
    format!(
        r#"You are a caption styling expert. Transform this plain .ass caption file into a dynamic, engaging version.

Rules:
1. Add {{\fs22}} to every word for consistent size
2. Add {{\an2\bord(2)\shad(1)}} for readability
3. Connector words (a, the, is): static text
4. Action words: add animation {{\t(0,150,\fscx120\fscy120\fscx100\fscy100)}}
5. Hero/impactful words: add animation + color {{\t(0,150,\1c&H00FFFF00&\fscx120\fscy120\fscx100\fscy100)}}

ONLY modify the text at the end of each Dialogue line. DO NOT change timestamps.

Input:
{}

Return ONLY the complete styled .ass file, no explanations."#,
        plain_document
    )
}

/// Remove a surrounding markdown code fence from a provider completion
fn strip_code_fences(text: &str) -> &str {
    let mut trimmed = text.trim();
    if trimmed.starts_with("```") {
        trimmed = match trimmed.find('\n') {
            Some(index) => &trimmed[index + 1..],
            None => "",
        };
    }
    if let Some(stripped) = trimmed.trim_end().strip_suffix("```") {
        trimmed = stripped;
    }
    trimmed.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(mode: StyleMode, endpoint: String, api_key: &str) -> StylingConfig {
        StylingConfig {
            mode,
            endpoint,
            api_key: api_key.to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            font_size: 22,
        }
    }

    fn rule_styler() -> Styler {
        Styler::with_color_picker(
            test_config(StyleMode::RuleBased, String::new(), ""),
            Box::new(|_| 0),
        )
    }

    #[test]
    fn test_classify_connector_words_case_insensitive() {
        for word in ["a", "THE", "Is", "from", "Those"] {
            assert_eq!(classify(word), Tier::Connector, "word: {}", word);
        }
    }

    #[test]
    fn test_classify_hero_words() {
        for word in ["amazing", "Incredible", "WOW", "phenomenal"] {
            assert_eq!(classify(word), Tier::Hero, "word: {}", word);
        }
    }

    #[test]
    fn test_classify_everything_else_is_default() {
        for word in ["hello", "world", "running", "Rust"] {
            assert_eq!(classify(word), Tier::Default, "word: {}", word);
        }
    }

    #[test]
    fn test_connector_line_gets_static_directive() {
        let styler = rule_styler();
        let styled = styler.style_line("Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,the");
        assert!(styled.ends_with("{\\an2\\bord(2)\\shad(1)\\fs22}the"), "got: {}", styled);
    }

    #[test]
    fn test_default_line_gets_animation_without_color() {
        let styler = rule_styler();
        let styled = styler.style_line("Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,Hello");
        assert!(styled.contains("\\t(0,150,\\fscx120"), "got: {}", styled);
        assert!(!styled.contains("\\1c&H"), "got: {}", styled);
    }

    #[test]
    fn test_hero_line_gets_pinned_palette_color() {
        let styler = Styler::with_color_picker(
            test_config(StyleMode::RuleBased, String::new(), ""),
            Box::new(|_| 2),
        );
        let styled =
            styler.style_line("Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,amazing");
        assert!(styled.contains(COLOR_PALETTE[2]), "got: {}", styled);
        assert!(styled.ends_with("amazing"), "got: {}", styled);
    }

    #[test]
    fn test_directives_have_balanced_braces_for_all_tiers() {
        let styler = rule_styler();
        for word in ["the", "amazing", "hello"] {
            let line = format!("Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,{}", word);
            let styled = styler.style_line(&line);
            let opens = styled.matches('{').count();
            let closes = styled.matches('}').count();
            assert_eq!(opens, closes, "unbalanced directive in: {}", styled);
            assert_eq!(opens, 1, "expected one directive block in: {}", styled);
        }
    }

    #[test]
    fn test_rules_leave_header_and_timestamps_untouched() {
        let styler = rule_styler();
        let plain = "[Script Info]\nTitle: Auto-Generated Captions\n\n[Events]\n\
                     Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,Hello\n";
        let styled = styler.style_with_rules(plain);
        assert!(styled.contains("[Script Info]"));
        assert!(styled.contains("Title: Auto-Generated Captions"));
        assert!(styled.contains("0,0:00:00.00,0:00:01.00,Default"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("plain text"), "plain text");
        assert_eq!(strip_code_fences("```ass\n[Script Info]\n```"), "[Script Info]");
        assert_eq!(strip_code_fences("```\ncontent\n```"), "content");
        assert_eq!(strip_code_fences("  ```ass\nA\nB\n```  "), "A\nB");
    }

    #[tokio::test]
    async fn test_ai_mode_returns_provider_document_without_fences() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash-exp:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [ {
                    "content": { "parts": [ { "text": "```ass\n[Script Info]\nstyled\n```" } ] }
                } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let styler = Styler::with_color_picker(
            test_config(StyleMode::AiAssisted, server.uri(), "test-key"),
            Box::new(|_| 0),
        );
        let styled = styler.style("[Script Info]\nplain").await;
        assert_eq!(styled, "[Script Info]\nstyled");
    }

    #[tokio::test]
    async fn test_ai_failure_falls_back_to_rules() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash-exp:generateContent"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let styler = Styler::with_color_picker(
            test_config(StyleMode::AiAssisted, server.uri(), "test-key"),
            Box::new(|_| 0),
        );
        let plain = "Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,Hello";
        let styled = styler.style(plain).await;
        assert!(styled.contains("\\t(0,150,"), "got: {}", styled);
        assert!(styled.ends_with("Hello"), "got: {}", styled);
    }

    #[tokio::test]
    async fn test_ai_mode_without_credential_uses_rules() {
        let styler = Styler::with_color_picker(
            test_config(StyleMode::AiAssisted, "http://localhost:9".to_string(), ""),
            Box::new(|_| 0),
        );
        let plain = "Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,the";
        let styled = styler.style(plain).await;
        assert!(styled.ends_with("{\\an2\\bord(2)\\shad(1)\\fs22}the"), "got: {}", styled);
    }
}
