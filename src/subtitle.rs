use tracing::debug;

use crate::transcribe::Transcript;

/// Generate a plain ASS caption document from a word-level transcript.
///
/// One `Dialogue:` event is emitted per word with non-empty trimmed text,
/// spanning exactly the word's `[start, end]` interval. Styling is applied
/// afterwards by the styler; this document carries no inline directives.
pub fn generate_plain_document(transcript: &Transcript, font_size: u32) -> String {
    let mut content = format!(
        "[Script Info]\n\
         Title: Auto-Generated Captions\n\
         ScriptType: v4.00+\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,Arial,{},&H00FFFFFF,&H0000FFFF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,2,2,10,10,75,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        font_size
    );

    let mut events = 0usize;
    for word in &transcript.words {
        let text = word.text.trim();
        if text.is_empty() {
            continue;
        }

        content.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_ass_time(word.start),
            format_ass_time(word.end),
            text
        ));
        events += 1;
    }

    debug!("Generated plain caption document with {} events", events);
    content
}

/// Format time in seconds to ASS time format (H:MM:SS.CC)
pub fn format_ass_time(seconds: f64) -> String {
    let h = (seconds / 3600.0).floor() as u64;
    let m = ((seconds % 3600.0) / 60.0).floor() as u64;
    let s = (seconds % 60.0).floor() as u64;
    let cs = ((seconds - seconds.floor()) * 100.0).round() as u64;

    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::Word;

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(1.25), "0:00:01.25");
        assert_eq!(format_ass_time(65.5), "0:01:05.50");
        assert_eq!(format_ass_time(3661.75), "1:01:01.75");
    }

    #[test]
    fn test_format_ass_time_is_monotonic() {
        let samples = [0.0, 0.01, 0.5, 1.0, 59.99, 60.0, 61.25, 3599.5, 3600.0, 7384.12];
        for pair in samples.windows(2) {
            let a = format_ass_time(pair[0]);
            let b = format_ass_time(pair[1]);
            assert!(a <= b, "{} ({}) > {} ({})", a, pair[0], b, pair[1]);
        }
    }

    #[test]
    fn test_plain_document_one_event_per_word() {
        let transcript = Transcript {
            words: vec![
                word("Hello", 0.0, 1.0),
                word("amazing", 1.0, 3.0),
                word("world", 3.0, 5.0),
            ],
            language: Some("en".to_string()),
            duration: Some(5.0),
        };

        let document = generate_plain_document(&transcript, 22);

        assert!(document.starts_with("[Script Info]"));
        assert!(document.contains("[V4+ Styles]"));
        assert!(document.contains("Style: Default,Arial,22,"));
        assert_eq!(document.matches("Dialogue:").count(), 3);
        assert!(document.contains("Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,Hello"));
        assert!(document.contains("Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,amazing"));
        assert!(document.contains("Dialogue: 0,0:00:03.00,0:00:05.00,Default,,0,0,0,,world"));
    }

    #[test]
    fn test_plain_document_drops_blank_words() {
        let transcript = Transcript {
            words: vec![word("  ", 0.0, 0.5), word("kept", 0.5, 1.0)],
            language: None,
            duration: None,
        };

        let document = generate_plain_document(&transcript, 22);
        assert_eq!(document.matches("Dialogue:").count(), 1);
        assert!(document.contains(",,kept"));
    }

    #[test]
    fn test_plain_document_respects_font_size() {
        let transcript = Transcript::default();
        let document = generate_plain_document(&transcript, 30);
        assert!(document.contains("Style: Default,Arial,30,"));
    }
}
