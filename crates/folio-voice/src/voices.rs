//! Voice quality ranking for voice pickers.

use folio_core::VoiceInfo;

/// Voices scoring below this are hidden by default.
pub const DEFAULT_MIN_VOICE_SCORE: u32 = 2;

/// Name keywords that suggest a higher-quality voice, with their weights.
const NAME_KEYWORDS: [(&str, u32); 6] = [
    ("premium", 3),
    ("enhanced", 3),
    ("neural", 4),
    ("clear", 2),
    ("studio", 2),
    ("professional", 2),
];

/// Heuristic quality score for `voice`.
///
/// Local synthesis, quality keywords in the name (case-insensitive) and
/// English locales all add points.
pub fn score_voice(voice: &VoiceInfo) -> u32 {
    let name = voice.name.to_lowercase();
    let mut score = 0;

    if voice.local_service {
        score += 2;
    }

    score += NAME_KEYWORDS
        .iter()
        .filter(|(keyword, _)| name.contains(keyword))
        .map(|(_, weight)| weight)
        .sum::<u32>();

    if voice.lang.starts_with("en-") {
        score += 2;
        if voice.lang == "en-US" || voice.lang == "en-GB" {
            score += 1;
        }
    }

    score
}

/// Keep voices scoring at least `min_score`, best first.
///
/// The sort is stable: equally scored voices keep the engine's order.
pub fn rank_voices(voices: Vec<VoiceInfo>, min_score: u32) -> Vec<VoiceInfo> {
    let mut scored: Vec<(u32, VoiceInfo)> = voices
        .into_iter()
        .map(|voice| (score_voice(&voice), voice))
        .filter(|(score, _)| *score >= min_score)
        .collect();
    scored.sort_by(|(a, _), (b, _)| b.cmp(a));
    scored.into_iter().map(|(_, voice)| voice).collect()
}
