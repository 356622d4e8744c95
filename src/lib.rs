//! reelplan - timeline synthesis for narrated image reels
//!
//! Turns an ordered image list, speech-recognition timestamps and an audio
//! duration into a [`CompositionPlan`]: gap-free visual segments with motion
//! effects plus time-synced caption chunks, exactly as long as the audio.

pub mod assets;
pub mod audio;
pub mod captions;
pub mod config;
pub mod effects;
pub mod error;
pub mod plan;
pub mod reconcile;
pub mod render;
pub mod subtitles;
pub mod time;
pub mod timeline;
pub mod types;

pub use error::{Entity, PlanError};
pub use plan::{synthesize, CompositionPlan, SynthesisConfig};
pub use time::{Interval, Millis, Timestamp};
pub use types::{
    CaptionChunk, EffectKind, ImageAsset, SpeechSegment, SynthesisInput, TimelineSegment,
    Transcript, Word,
};
