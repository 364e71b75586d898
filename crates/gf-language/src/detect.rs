// detect.rs — Heuristic language detection.
//
// Two-stage heuristic:
//   1. Any code point in the Cyrillic blocks (U+0400–U+052F) classifies
//      the text as Russian at a fixed high confidence.
//   2. Otherwise, common English function words and code keywords are
//      scored against the word count and normalized to 0–1.
// Empty text is compliant — nothing to translate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed confidence for the Cyrillic fast path.
const CYRILLIC_CONFIDENCE: f32 = 0.9;

/// Marker-word ratio at or above which text counts as English.
const ENGLISH_RATIO_THRESHOLD: f32 = 0.18;

/// Common English function words plus code/syntax keywords. Matching is
/// per lowercased word after stripping punctuation.
const ENGLISH_MARKERS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "to", "of", "and", "or",
    "not", "in", "on", "at", "by", "for", "with", "from", "as", "it", "this", "that", "these",
    "those", "have", "has", "had", "do", "does", "did", "will", "would", "should", "can", "could",
    "may", "must", "if", "then", "else", "when", "where", "which", "what", "who", "how", "all",
    "each", "more", "some", "no", "we", "you", "they", "i",
    // code/syntax keywords seen in commit messages and snippets
    "function", "return", "const", "let", "var", "class", "import", "export", "async", "await",
    "true", "false", "null", "new", "use", "fix", "add", "update", "remove",
];

/// Detected language classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Russian,
    Unknown,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Russian => write!(f, "russian"),
            Language::Unknown => write!(f, "unknown"),
        }
    }
}

/// Detection outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub language: Language,
    pub needs_translation: bool,
    pub confidence: f32,
}

fn is_cyrillic(c: char) -> bool {
    matches!(c as u32, 0x0400..=0x052F)
}

/// Classify a piece of text. Never fails; the worst case is a
/// low-confidence `Unknown`.
pub fn detect_language(text: &str) -> Detection {
    if text.trim().is_empty() {
        return Detection {
            language: Language::Unknown,
            needs_translation: false,
            confidence: 1.0,
        };
    }

    if text.chars().any(is_cyrillic) {
        return Detection {
            language: Language::Russian,
            needs_translation: true,
            confidence: CYRILLIC_CONFIDENCE,
        };
    }

    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return Detection {
            language: Language::Unknown,
            needs_translation: false,
            confidence: 1.0,
        };
    }

    let matches = words
        .iter()
        .filter(|w| ENGLISH_MARKERS.contains(&w.as_str()))
        .count();
    let ratio = matches as f32 / words.len() as f32;

    // Short all-ASCII fragments (titles, identifiers) carry almost no
    // function-word signal; they pass as English at modest confidence.
    if matches == 0 && words.len() < 3 && text.is_ascii() {
        return Detection {
            language: Language::English,
            needs_translation: false,
            confidence: 0.5,
        };
    }

    if ratio >= ENGLISH_RATIO_THRESHOLD {
        Detection {
            language: Language::English,
            needs_translation: false,
            confidence: (ratio * 2.5).min(1.0),
        }
    } else {
        Detection {
            language: Language::Unknown,
            needs_translation: true,
            confidence: (0.4 + (1.0 - ratio) * 0.6).min(1.0),
        }
    }
}
