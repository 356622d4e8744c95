//! Composition plan - the single artifact handed to a renderer
//!
//! [`synthesize`] validates the inputs once, runs caption chunking and
//! timeline building over the same transcript, then reconciles both tracks
//! against the audio length. A plan is never edited in place: reconciling
//! or re-transcribing produces a new one.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::captions::{chunk_transcript, validate_word_spans, validate_words};
use crate::effects::EffectPolicy;
use crate::error::Result;
use crate::reconcile::reconcile_plan;
use crate::time::Millis;
use crate::timeline::{build_timeline, covered_until, validate_segments, TimelineConfig};
use crate::types::{CaptionChunk, CaptionConfig, SynthesisInput, TimelineSegment};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SynthesisConfig {
    pub captions: CaptionConfig,
    pub timeline: TimelineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionPlan {
    pub timeline: Vec<TimelineSegment>,
    pub captions: Vec<CaptionChunk>,
    pub total_duration: Millis,
}

impl CompositionPlan {
    /// Assemble a plan whose length is the end of its last visual segment.
    pub fn new(timeline: Vec<TimelineSegment>, captions: Vec<CaptionChunk>) -> Self {
        let total_duration = timeline.last().map(|seg| seg.end).unwrap_or(Millis::ZERO);
        Self {
            timeline,
            captions,
            total_duration,
        }
    }

    /// Timeline covers `[0, total_duration]` contiguously with no empty segments.
    pub fn is_partition(&self) -> bool {
        covered_until(&self.timeline) == Some(self.total_duration)
    }

    /// Index and segment showing at `t`.
    pub fn segment_at(&self, t: Millis) -> Option<(usize, &TimelineSegment)> {
        let idx = self.timeline.partition_point(|seg| seg.end <= t);
        self.timeline
            .get(idx)
            .filter(|seg| seg.span().contains(t))
            .map(|seg| (idx, seg))
    }

    /// Caption on screen at `t`, if any.
    pub fn caption_at(&self, t: Millis) -> Option<&CaptionChunk> {
        let idx = self.captions.partition_point(|chunk| chunk.end <= t);
        self.captions.get(idx).filter(|chunk| chunk.span().contains(t))
    }

    /// Map every timeline segment independently, in parallel, keeping order.
    ///
    /// A segment's pixels depend only on its own image and effect, so
    /// per-segment rendering work can fan out here.
    pub fn par_map_segments<R, F>(&self, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize, &TimelineSegment) -> R + Sync + Send,
    {
        self.timeline
            .par_iter()
            .enumerate()
            .map(|(idx, segment)| f(idx, segment))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the composition plan for one reel.
///
/// Structural problems in the input (empty tracks, inverted or overlapping
/// timings) fail before anything is built.
pub fn synthesize(
    input: &SynthesisInput,
    config: &SynthesisConfig,
    policy: &mut dyn EffectPolicy,
) -> Result<CompositionPlan> {
    input.ensure_not_empty()?;
    validate_segments(&input.transcript.segments)?;
    validate_words(input.transcript.words())?;
    validate_word_spans(&input.transcript.segments)?;

    let captions = chunk_transcript(&input.transcript, config.captions)?;
    let timeline = build_timeline(
        &input.images,
        &input.transcript.segments,
        input.audio_duration,
        policy,
        config.timeline,
    )?;

    let plan = reconcile_plan(
        &CompositionPlan::new(timeline, captions),
        input.audio_duration,
    );
    debug_assert!(plan.is_partition());

    info!(
        segments = plan.timeline.len(),
        captions = plan.captions.len(),
        duration = %plan.total_duration,
        "composition plan ready"
    );
    Ok(plan)
}
