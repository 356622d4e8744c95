//! Core types for the reel composition pipeline

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::effects::MotionEffect;
use crate::error::{Entity, PlanError, Result};
use crate::time::{Interval, Millis};

/// Reel frame size (9:16 portrait).
pub const REEL_WIDTH: u32 = 1080;
pub const REEL_HEIGHT: u32 = 1920;

/// Timed word from speech recognition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub start: Millis,
    pub end: Millis,
    pub text: String,
}

impl Word {
    pub fn span(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Sentence-level ASR segment with the words spoken inside it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechSegment {
    pub start: Millis,
    pub end: Millis,
    pub text: String,
    pub words: Vec<Word>,
}

impl SpeechSegment {
    pub fn span(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Transcription output containing timestamped segments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub segments: Vec<SpeechSegment>,
}

impl Transcript {
    /// Convert raw ASR output, nesting each word under the last segment that
    /// starts at or before it. A word that does not fit inside that segment
    /// is rejected.
    pub fn from_asr(data: &AsrData) -> Result<Self> {
        let mut segments = Vec::with_capacity(data.sentences.len());
        for (idx, sentence) in data.sentences.iter().enumerate() {
            let span = Interval::from_secs(sentence.start, sentence.end)
                .map_err(|err| err.at(Entity::Segment(idx)))?;
            segments.push(SpeechSegment {
                start: span.start,
                end: span.end,
                text: sentence.text.clone(),
                words: Vec::new(),
            });
        }

        let mut owner = 0usize;
        for (idx, raw) in data.words.iter().enumerate() {
            let span =
                Interval::from_secs(raw.start, raw.end).map_err(|err| err.at(Entity::Word(idx)))?;
            if segments.is_empty() {
                break;
            }
            while owner + 1 < segments.len() && segments[owner + 1].start <= span.start {
                owner += 1;
            }
            let segment = &segments[owner];
            if !segment.span().covers(&span) {
                return Err(PlanError::invalid_timestamp(
                    Entity::Word(idx),
                    format!(
                        "{} lies outside segment {} at {}",
                        span,
                        owner,
                        segment.span()
                    ),
                ));
            }
            segments[owner].words.push(Word {
                start: span.start,
                end: span.end,
                text: raw.word.clone(),
            });
        }

        Ok(Self { segments })
    }

    /// Flattened word stream across all segments.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.segments.iter().flat_map(|segment| segment.words.iter())
    }

    pub fn has_word_timings(&self) -> bool {
        self.words().next().is_some()
    }
}

/// ASR payload as produced by the speech service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AsrData {
    #[serde(default, alias = "segments")]
    pub sentences: Vec<AsrSentence>,
    #[serde(default)]
    pub words: Vec<AsrWord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AsrSentence {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AsrWord {
    pub start: f64,
    pub end: f64,
    #[serde(alias = "text")]
    pub word: String,
}

/// Still image consumed by the timeline, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageAsset {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }
}

/// Motion applied to a still over its segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    KenBurns,
    Pan,
    ZoomOut,
    Static,
}

impl EffectKind {
    /// Kinds a selection policy picks from by default.
    pub const MOTION: [EffectKind; 3] = [EffectKind::KenBurns, EffectKind::Pan, EffectKind::ZoomOut];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ken_burns" | "kenburns" => Some(Self::KenBurns),
            "pan" => Some(Self::Pan),
            "zoom_out" | "zoomout" => Some(Self::ZoomOut),
            "static" | "none" => Some(Self::Static),
            _ => None,
        }
    }
}

/// One visual span of the reel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSegment {
    pub image: Arc<ImageAsset>,
    pub start: Millis,
    pub end: Millis,
    pub effect: MotionEffect,
    /// Synthesized to cover silence rather than paired with a speech segment
    pub gap_fill: bool,
}

impl TimelineSegment {
    pub fn span(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }

    pub fn duration(&self) -> Millis {
        self.end.saturating_sub(self.start)
    }

    /// Same image and effect kind over a new span, re-parameterized to fit it.
    pub fn with_span(&self, start: Millis, end: Millis) -> Self {
        Self {
            image: Arc::clone(&self.image),
            start,
            end,
            effect: self.effect.with_duration(end.saturating_sub(start)),
            gap_fill: self.gap_fill,
        }
    }
}

/// On-screen caption text with its display window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionChunk {
    pub text: String,
    pub start: Millis,
    pub end: Millis,
    /// Number of ASR words joined into `text`
    pub word_count: usize,
    /// `text` wrapped for display
    pub lines: Vec<String>,
}

impl CaptionChunk {
    pub fn span(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Caption chunking settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Maximum words per chunk
    pub max_words: usize,
    /// Characters per display line
    pub wrap_width: usize,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            max_words: 3,
            wrap_width: 20,
        }
    }
}

impl CaptionConfig {
    pub fn new(max_words: usize) -> Self {
        Self {
            max_words,
            ..Self::default()
        }
    }
}

/// Everything the core needs for one synthesis run
#[derive(Debug, Clone)]
pub struct SynthesisInput {
    pub images: Vec<Arc<ImageAsset>>,
    pub transcript: Transcript,
    pub audio_duration: Millis,
}

impl SynthesisInput {
    pub fn new(images: Vec<ImageAsset>, transcript: Transcript, audio_duration: Millis) -> Self {
        Self {
            images: images.into_iter().map(Arc::new).collect(),
            transcript,
            audio_duration,
        }
    }

    pub(crate) fn ensure_not_empty(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(PlanError::EmptyInput("no images"));
        }
        if self.transcript.segments.is_empty() {
            return Err(PlanError::EmptyInput("no speech segments"));
        }
        if self.audio_duration.is_zero() {
            return Err(PlanError::EmptyInput("audio duration is zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asr(json: &str) -> AsrData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn nests_words_under_their_sentence() {
        let data = asr(r#"{
            "sentences": [
                {"start": 0.0, "end": 1.2, "text": " Hello there."},
                {"start": 1.5, "end": 2.4, "text": " Bye now."}
            ],
            "words": [
                {"start": 0.0, "end": 0.5, "word": " Hello"},
                {"start": 0.5, "end": 1.2, "word": " there."},
                {"start": 1.5, "end": 2.0, "word": " Bye"},
                {"start": 2.0, "end": 2.4, "word": " now."}
            ]
        }"#);
        let transcript = Transcript::from_asr(&data).unwrap();

        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].words.len(), 2);
        assert_eq!(transcript.segments[1].words.len(), 2);
        assert_eq!(transcript.segments[1].words[0].start.as_millis(), 1_500);
        assert_eq!(transcript.words().count(), 4);
    }

    #[test]
    fn words_only_payload_is_accepted() {
        let data = asr(r#"{"segments": [{"start": 0.0, "end": 1.0, "text": "hi"}]}"#);
        let transcript = Transcript::from_asr(&data).unwrap();
        assert!(!transcript.has_word_timings());
    }

    #[test]
    fn reports_the_bad_word_index() {
        let data = asr(r#"{
            "sentences": [{"start": 0.0, "end": 2.0, "text": "a b"}],
            "words": [
                {"start": 0.0, "end": 0.5, "word": "a"},
                {"start": 1.0, "end": 0.8, "word": "b"}
            ]
        }"#);
        let err = Transcript::from_asr(&data).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InvalidTimestamp {
                entity: Entity::Word(1),
                ..
            }
        ));
    }

    #[test]
    fn rejects_words_outside_their_sentence() {
        let data = asr(r#"{
            "sentences": [{"start": 2.0, "end": 3.0, "text": "early late"}],
            "words": [
                {"start": 0.0, "end": 0.5, "word": "early"},
                {"start": 5.0, "end": 6.0, "word": "late"}
            ]
        }"#);
        let err = Transcript::from_asr(&data).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InvalidTimestamp {
                entity: Entity::Word(0),
                ..
            }
        ));

        let data = asr(r#"{
            "sentences": [{"start": 0.0, "end": 1.0, "text": "in out"}],
            "words": [
                {"start": 0.0, "end": 0.5, "word": "in"},
                {"start": 0.5, "end": 1.2, "word": "out"}
            ]
        }"#);
        let err = Transcript::from_asr(&data).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InvalidTimestamp {
                entity: Entity::Word(1),
                ..
            }
        ));
    }

    #[test]
    fn parses_effect_names() {
        assert_eq!(EffectKind::parse("ken-burns"), Some(EffectKind::KenBurns));
        assert_eq!(EffectKind::parse("ZoomOut"), Some(EffectKind::ZoomOut));
        assert_eq!(EffectKind::parse("wobble"), None);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let input = SynthesisInput::new(Vec::new(), Transcript::default(), Millis::from_millis(1));
        assert_eq!(
            input.ensure_not_empty(),
            Err(PlanError::EmptyInput("no images"))
        );
    }
}
