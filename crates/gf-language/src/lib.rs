//! # gf-language
//!
//! English-only content policy: heuristic language detection plus a
//! validation pipeline that auto-translates flagged content through the
//! translation client.
//!
//! Detection is heuristic, not linguistic: a Cyrillic code point anywhere
//! forces a "russian" classification, everything else is scored against a
//! list of common English function words and code keywords.

pub mod detect;
pub mod gate;

pub use detect::{detect_language, Detection, Language};
pub use gate::{LanguageGate, Translate, ValidationContext, ValidationOutcome};
