//! Text transform pipeline: raw page text to speech-ready text.
//!
//! ```text
//!   raw ─┬─ dictionary ─ pronunciation ─ spacing ──▶ speech_text ─ prosody ──▶ marked_text
//!        └─ emotion detection ─────────────────────────────────────────────▶ expressive
//! ```
//!
//! The whole thing is a pure function of the raw text and the rule set.
//! It is not idempotent: feeding `marked_text` back in rewrites the markup.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use folio_core::{ExpressiveParams, VoiceParams};

use crate::rules::RuleSet;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)").expect("word pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space pattern"));

/// Output of [`TextTransformPipeline::transform`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedText {
    /// Text after dictionary, pronunciation and spacing stages.
    pub speech_text: String,

    /// `speech_text` with prosody markup; this is what the engine speaks.
    pub marked_text: String,

    /// Whitespace-separated tokens of `speech_text`. Markup never becomes a
    /// token.
    pub tokens: Vec<String>,

    /// Multipliers from emotion detection on the raw text.
    pub expressive: ExpressiveParams,
}

impl TransformedText {
    /// Final engine parameters: `base` scaled by the expressive factors.
    pub fn spoken_params(&self, base: &VoiceParams) -> VoiceParams {
        self.expressive.apply(base)
    }
}

/// Applies a [`RuleSet`] to raw text.
#[derive(Debug, Clone)]
pub struct TextTransformPipeline {
    rules: Arc<RuleSet>,
}

impl Default for TextTransformPipeline {
    fn default() -> Self {
        Self::new(RuleSet::standard())
    }
}

impl TextTransformPipeline {
    pub const fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    /// Version tag of the rule set in use.
    pub fn rules_version(&self) -> &str {
        &self.rules.version
    }

    /// Run every stage on `raw`.
    pub fn transform(&self, raw: &str) -> TransformedText {
        let speech_text = self.speech_text(raw);
        let marked_text = self.mark_prosody(&speech_text);
        let tokens = speech_text.split_whitespace().map(str::to_string).collect();

        TransformedText {
            speech_text,
            marked_text,
            tokens,
            expressive: self.detect_emotion(raw),
        }
    }

    /// Expressive multipliers for `raw`: the first matching emotion rule, or
    /// neutral when none match.
    pub fn detect_emotion(&self, raw: &str) -> ExpressiveParams {
        self.rules
            .detect_emotion(raw)
            .map_or_else(ExpressiveParams::neutral, |rule| ExpressiveParams {
                emotion: Some(rule.emotion().to_string()),
                pitch_factor: rule.pitch_factor,
                rate_factor: rule.rate_factor,
                volume_factor: rule.volume_factor,
            })
    }

    // ── Stages ─────────────────────────────────────────────────────

    fn speech_text(&self, raw: &str) -> String {
        let mut text = raw.to_string();

        for entry in &self.rules.dictionary {
            text = entry.apply(&text);
        }
        for rule in &self.rules.pronunciation {
            text = rule.apply(&text);
        }

        normalise_spacing(&text)
    }

    fn mark_prosody(&self, speech_text: &str) -> String {
        self.rules
            .prosody
            .iter()
            .fold(speech_text.to_string(), |text, rule| rule.apply(&text))
    }
}

/// Space out word tokens, then collapse and trim whitespace.
fn normalise_spacing(text: &str) -> String {
    let spaced = WORD.replace_all(text, " $1 ");
    WHITESPACE.replace_all(spaced.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> TextTransformPipeline {
        TextTransformPipeline::default()
    }

    #[test]
    fn titles_and_tricky_words() {
        let out = pipeline().transform("Dr. Smith said: \"genre\"");
        assert_eq!(out.speech_text, "Doctor Smith said : \" zhawn · ruh \"");
        assert_eq!(
            out.tokens,
            ["Doctor", "Smith", "said", ":", "\"", "zhawn", "·", "ruh", "\""]
        );
    }

    #[test]
    fn dictionary_is_case_sensitive_and_whole_word() {
        let out = pipeline().transform("MySQL is not SQL");
        // The sentence-pause rule also fires after "S.Q.L. ".
        assert_eq!(out.speech_text, "My S . Q . L .... is not S . Q . L .");
    }

    #[test]
    fn sentence_pause_and_prosody_markup() {
        let out = pipeline().transform("Hello. World");
        assert_eq!(out.speech_text, "Hello ... World");
        assert_eq!(out.marked_text, "Hello ... <break time=\"1s\"/> World");
        assert_eq!(out.tokens, ["Hello", "...", "World"]);
    }

    #[test]
    fn parenthetical_pauses() {
        let out = pipeline().transform("It works (mostly) fine");
        assert_eq!(out.speech_text, "It works ... mostly ... fine");
    }

    #[test]
    fn emphasis_and_question_markup() {
        let out = pipeline().transform("*Really*?");
        assert_eq!(out.speech_text, "* Really *?");
        assert_eq!(
            out.marked_text,
            "<emphasis> Really </emphasis><prosody pitch=\"high\">?</prosody>"
        );
    }

    #[test]
    fn markup_never_becomes_a_token() {
        let out = pipeline().transform("Wait, what? Yes.");
        assert!(out.marked_text.contains("<break"));
        assert!(out.tokens.iter().all(|t| !t.contains('<')));
    }

    #[test]
    fn transform_is_deterministic() {
        let text = "Prof. Jones queued the JSON cache! (Twice.)";
        assert_eq!(pipeline().transform(text), pipeline().transform(text));
    }

    #[test]
    fn transform_is_not_idempotent() {
        let once = pipeline().transform("Hello. World, again?");
        let twice = pipeline().transform(&once.marked_text);
        assert_ne!(twice.marked_text, once.marked_text);
    }

    #[test]
    fn excited_wins_over_angry() {
        let out = pipeline().transform("I am so angry!!!");
        assert_eq!(out.expressive.emotion.as_deref(), Some("excited"));
        assert!((out.expressive.pitch_factor - 1.3).abs() < f32::EPSILON);
    }

    #[test]
    fn shouted_praise_is_excited() {
        let out = pipeline().transform("I AM SO AMAZING!!!");
        assert_eq!(out.expressive.emotion.as_deref(), Some("excited"));
        assert!((out.expressive.rate_factor - 1.2).abs() < f32::EPSILON);
    }

    #[test]
    fn neutral_without_emotion() {
        let out = pipeline().transform("The rain fell.");
        assert_eq!(out.expressive, ExpressiveParams::neutral());
    }

    #[test]
    fn spoken_params_scale_base() {
        let out = pipeline().transform("She was crying");
        let spoken = out.spoken_params(&VoiceParams {
            voice: None,
            rate: 2.0,
            pitch: 1.0,
            volume: 1.0,
        });
        assert!((spoken.rate - 1.8).abs() < 1e-6);
        assert!((spoken.pitch - 0.8).abs() < 1e-6);
        assert!((spoken.volume - 0.8).abs() < 1e-6);
    }

    #[test]
    fn empty_rule_set_only_normalises_spacing() {
        let pipeline = TextTransformPipeline::new(Arc::new(RuleSet::empty("test")));
        let out = pipeline.transform("  Dr.   Who?  ");
        assert_eq!(out.speech_text, "Dr . Who ?");
        assert_eq!(out.marked_text, out.speech_text);
        assert_eq!(pipeline.rules_version(), "test");
    }

    #[test]
    fn empty_input() {
        let out = pipeline().transform("");
        assert_eq!(out.speech_text, "");
        assert!(out.tokens.is_empty());
    }
}
