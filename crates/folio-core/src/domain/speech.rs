//! Speech-side domain types shared by the playback pipeline and its adapters.

use serde::{Deserialize, Serialize};

/// Voice selection plus the three prosody knobs every engine understands.
///
/// This is also the user's persisted audio preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceParams {
    /// Engine voice name. `None` lets the engine pick its default.
    pub voice: Option<String>,

    /// Speaking-rate multiplier (1.0 = engine normal).
    pub rate: f32,

    /// Pitch multiplier (1.0 = engine normal).
    pub pitch: f32,

    /// Volume (0.0–1.0 nominal; emotion factors may push it above 1.0).
    pub volume: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

impl VoiceParams {
    /// Use a specific engine voice.
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

/// Multipliers derived from emotion detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressiveParams {
    /// Name of the matched emotion rule, `None` when neutral.
    pub emotion: Option<String>,
    pub pitch_factor: f32,
    pub rate_factor: f32,
    pub volume_factor: f32,
}

impl ExpressiveParams {
    /// Neutral multipliers (all 1.0, no emotion).
    pub const fn neutral() -> Self {
        Self {
            emotion: None,
            pitch_factor: 1.0,
            rate_factor: 1.0,
            volume_factor: 1.0,
        }
    }

    /// Component-wise product of `base` with these factors. The voice is kept.
    #[must_use]
    pub fn apply(&self, base: &VoiceParams) -> VoiceParams {
        VoiceParams {
            voice: base.voice.clone(),
            rate: base.rate * self.rate_factor,
            pitch: base.pitch * self.pitch_factor,
            volume: base.volume * self.volume_factor,
        }
    }
}

impl Default for ExpressiveParams {
    fn default() -> Self {
        Self::neutral()
    }
}

/// A word highlight published to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordBoundary {
    /// The token being spoken.
    pub word: String,
    /// Engine-reported character offset.
    pub start_offset: usize,
    /// `start_offset` plus the token's length in characters.
    pub end_offset: usize,
}

/// A voice as reported by the speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Voice name (used to select it).
    pub name: String,
    /// BCP 47 language tag, e.g. `en-US`.
    pub lang: String,
    /// Whether synthesis runs locally rather than through a network service.
    pub local_service: bool,
}

impl VoiceInfo {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, lang: impl Into<String>, local_service: bool) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            local_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_apply_is_identity() {
        let base = VoiceParams {
            voice: Some("Alex".into()),
            rate: 1.5,
            pitch: 0.9,
            volume: 0.5,
        };
        assert_eq!(ExpressiveParams::neutral().apply(&base), base);
    }

    #[test]
    fn apply_multiplies_component_wise() {
        let factors = ExpressiveParams {
            emotion: Some("sad".into()),
            pitch_factor: 0.5,
            rate_factor: 2.0,
            volume_factor: 0.25,
        };
        let out = factors.apply(&VoiceParams::default());
        assert!((out.pitch - 0.5).abs() < f32::EPSILON);
        assert!((out.rate - 2.0).abs() < f32::EPSILON);
        assert!((out.volume - 0.25).abs() < f32::EPSILON);
    }
}
