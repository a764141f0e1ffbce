//! Versioned text rewrite tables.
//!
//! A [`RuleSet`] is plain ordered data: a dictionary of whole-word
//! substitutions, chained pronunciation rewrites, emotion detectors and
//! prosody markup rewrites. Order matters in every list; later rules see the
//! output of earlier ones, and the first matching emotion wins.

use std::sync::{Arc, LazyLock};

use regex::{NoExpand, Regex};

use crate::error::RuleError;

/// Version tag of [`RuleSet::standard`].
pub const STANDARD_RULES_VERSION: &str = "2024.1";

fn compile(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// ── Rule types ─────────────────────────────────────────────────────

/// Exact whole-word, case-sensitive token substitution.
#[derive(Debug, Clone)]
pub struct DictionaryEntry {
    term: String,
    replacement: String,
    matcher: Regex,
}

impl DictionaryEntry {
    /// Replace every whole-word occurrence of `term` with `replacement`.
    pub fn new(term: impl Into<String>, replacement: impl Into<String>) -> Result<Self, RuleError> {
        let term = term.into();
        let matcher = compile(&format!(r"\b{}\b", regex::escape(&term)))?;
        Ok(Self {
            term,
            replacement: replacement.into(),
            matcher,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Apply to `text`. The replacement is literal.
    pub fn apply(&self, text: &str) -> String {
        self.matcher
            .replace_all(text, NoExpand(&self.replacement))
            .into_owned()
    }
}

/// Regex rewrite. The replacement may reference capture groups
/// (`$1`, `${1}`).
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: Regex,
    replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, RuleError> {
        Ok(Self {
            pattern: compile(pattern)?,
            replacement: replacement.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Apply to every match in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

/// Detects an emotion in raw text and carries the prosody multipliers to use
/// when it is found.
#[derive(Debug, Clone)]
pub struct EmotionRule {
    emotion: String,
    pattern: Regex,
    pub pitch_factor: f32,
    pub rate_factor: f32,
    pub volume_factor: f32,
}

impl EmotionRule {
    pub fn new(
        emotion: impl Into<String>,
        pattern: &str,
        pitch_factor: f32,
        rate_factor: f32,
        volume_factor: f32,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            emotion: emotion.into(),
            pattern: compile(pattern)?,
            pitch_factor,
            rate_factor,
            volume_factor,
        })
    }

    pub fn emotion(&self) -> &str {
        &self.emotion
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

// ── Rule set ───────────────────────────────────────────────────────

/// Ordered, versioned rule tables for the text transform pipeline.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub version: String,
    pub dictionary: Vec<DictionaryEntry>,
    pub pronunciation: Vec<RewriteRule>,
    pub emotions: Vec<EmotionRule>,
    pub prosody: Vec<RewriteRule>,
}

static STANDARD: LazyLock<Arc<RuleSet>> = LazyLock::new(|| {
    // Every pattern below is a literal; failure here is a programming error.
    Arc::new(RuleSet::build_standard().expect("standard rule patterns compile"))
});

impl RuleSet {
    /// An empty rule set: the pipeline only normalises spacing.
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            dictionary: Vec::new(),
            pronunciation: Vec::new(),
            emotions: Vec::new(),
            prosody: Vec::new(),
        }
    }

    /// The built-in rule tables.
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD)
    }

    fn build_standard() -> Result<Self, RuleError> {
        let dictionary = [
            ("SQL", "S.Q.L."),
            ("MySQL", "My S.Q.L."),
            ("nginx", "engine x"),
            ("JSON", "Jason"),
            ("API", "A.P.I."),
            ("GUI", "G.U.I."),
            ("CLI", "C.L.I."),
            ("AWS", "A.W.S."),
            ("DNS", "D.N.S."),
            ("URL", "U.R.L."),
            ("YAML", "Yam·el"),
            ("JWT", "J.W.T."),
            ("GraphQL", "Graph·Q.L."),
            ("OAuth", "O·Auth"),
        ]
        .into_iter()
        .map(|(term, replacement)| DictionaryEntry::new(term, replacement))
        .collect::<Result<Vec<_>, _>>()?;

        let pronunciation = [
            // Titles
            (r"Mr\.", "Mister"),
            (r"Mrs\.", "Misses"),
            (r"Dr\.", "Doctor"),
            (r"Prof\.", "Professor"),
            // Numbers
            (r"(\d{4})", "$1"),
            (r"(\d+)th", "${1}th"),
            // Commonly mispronounced words
            ("genre", "zhawn·ruh"),
            ("epitome", "eh·pit·oh·mee"),
            ("paradigm", "pair·uh·dime"),
            ("albeit", "all·be·it"),
            ("cache", "cash"),
            ("facade", "fuh·saad"),
            ("segue", "seg·way"),
            ("subtle", "sut·tl"),
            ("queue", "kyoo"),
            // Technical terms
            ("regex", "redge·ex"),
            ("kubectl", "kube·control"),
            ("webpack", "web·pack"),
            // Pauses
            (r"([.!?]) ", "$1... "),
            (r"([,;:]) ", "$1 "),
            (r"\(([^)]+)\)", "... $1 ..."),
        ]
        .into_iter()
        .map(|(pattern, replacement)| RewriteRule::new(pattern, replacement))
        .collect::<Result<Vec<_>, _>>()?;

        let emotions = vec![
            EmotionRule::new("excited", r"(?i)!{2,}|[?!]+|AMAZING|WONDERFUL|EXCITED", 1.3, 1.2, 1.0)?,
            EmotionRule::new("sad", r"(?i)\b(?:sad|crying|tears|weeping|sorrow)\b", 0.8, 0.9, 0.8)?,
            EmotionRule::new("angry", r"(?i)\b(?:angry|furious|rage|mad)\b|!{3,}", 1.2, 1.3, 1.2)?,
            EmotionRule::new("whisper", r"(?i)\b(?:whispered|quietly|softly)\b", 1.0, 0.8, 0.6)?,
        ];

        let prosody = [
            (r"([.!?]) ", r#"$1 <break time="1s"/> "#),
            (r"([,;:]) ", r#"$1 <break time="0.5s"/> "#),
            (r"\*([^*]+)\*", "<emphasis>$1</emphasis>"),
            (r"\?", r#"<prosody pitch="high">?</prosody>"#),
        ]
        .into_iter()
        .map(|(pattern, replacement)| RewriteRule::new(pattern, replacement))
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: STANDARD_RULES_VERSION.to_string(),
            dictionary,
            pronunciation,
            emotions,
            prosody,
        })
    }

    /// First emotion rule matching `text`, if any.
    pub fn detect_emotion(&self, text: &str) -> Option<&EmotionRule> {
        self.emotions.iter().find(|rule| rule.matches(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_is_versioned_and_complete() {
        let rules = RuleSet::standard();
        assert_eq!(rules.version, "2024.1");
        assert_eq!(rules.dictionary.len(), 14);
        assert_eq!(rules.pronunciation.len(), 21);
        assert_eq!(rules.emotions.len(), 4);
        assert_eq!(rules.prosody.len(), 4);
    }

    #[test]
    fn dictionary_matches_whole_words_only() {
        let sql = DictionaryEntry::new("SQL", "S.Q.L.").unwrap();
        assert_eq!(sql.apply("SQL and MySQL"), "S.Q.L. and MySQL");
        assert_eq!(sql.apply("sql"), "sql");
    }

    #[test]
    fn dictionary_replacement_is_literal() {
        let entry = DictionaryEntry::new("USD", "$1 dollars").unwrap();
        assert_eq!(entry.apply("in USD"), "in $1 dollars");
    }

    #[test]
    fn dictionary_escapes_terms() {
        let entry = DictionaryEntry::new("Node.js", "Node J S").unwrap();
        assert_eq!(entry.apply("Node.js, not Nodexjs"), "Node J S, not Nodexjs");
    }

    #[test]
    fn ordinal_rule_keeps_suffix() {
        let rules = RuleSet::standard();
        let ordinal = &rules.pronunciation[5];
        assert_eq!(ordinal.apply("the 19th century"), "the 19th century");
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = RewriteRule::new("(unclosed", "x").unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
    }

    #[test]
    fn first_matching_emotion_wins() {
        let rules = RuleSet::standard();
        // Matches both excited (`!!`) and angry (`!!!`, "furious").
        let rule = rules.detect_emotion("I am furious!!!").unwrap();
        assert_eq!(rule.emotion(), "excited");
    }

    #[test]
    fn emotion_detection_is_case_insensitive() {
        let rules = RuleSet::standard();
        assert_eq!(rules.detect_emotion("She was SAD").unwrap().emotion(), "sad");
        assert_eq!(
            rules.detect_emotion("he whispered softly").unwrap().emotion(),
            "whisper"
        );
        assert!(rules.detect_emotion("A calm afternoon.").is_none());
    }
}
