//! Duration reconciliation - make the plan exactly as long as the audio
//!
//! The audio track is the timing ground truth. A longer plan is cut at the
//! audio end; a shorter one has its last visual segment stretched to reach
//! it. Captions are never stretched, only trimmed, so an extension stays
//! silent on the caption track.

use tracing::debug;

use crate::plan::CompositionPlan;
use crate::time::Millis;
use crate::types::{CaptionChunk, TimelineSegment};

/// Return a new plan whose total duration equals `audio`.
///
/// A plan with no visual segments has nothing to stretch and comes back
/// unchanged.
pub fn reconcile_plan(plan: &CompositionPlan, audio: Millis) -> CompositionPlan {
    if plan.timeline.is_empty() {
        debug!("empty timeline, nothing to reconcile");
        return plan.clone();
    }
    let planned = plan.total_duration;
    let timeline = if planned > audio {
        debug!(%planned, %audio, "truncating plan to audio length");
        truncate_timeline(&plan.timeline, audio)
    } else if planned < audio {
        debug!(%planned, %audio, "extending last segment to audio length");
        extend_timeline(&plan.timeline, audio)
    } else {
        plan.timeline.clone()
    };

    CompositionPlan {
        timeline,
        captions: trim_captions(&plan.captions, audio),
        total_duration: audio,
    }
}

fn truncate_timeline(timeline: &[TimelineSegment], limit: Millis) -> Vec<TimelineSegment> {
    timeline
        .iter()
        .filter_map(|segment| {
            let span = segment.span().clip_end(limit)?;
            Some(if span.end == segment.end {
                segment.clone()
            } else {
                segment.with_span(span.start, span.end)
            })
        })
        .collect()
}

fn extend_timeline(timeline: &[TimelineSegment], until: Millis) -> Vec<TimelineSegment> {
    let mut extended = timeline.to_vec();
    if let Some(last) = extended.last_mut() {
        *last = last.with_span(last.start, until);
    }
    extended
}

fn trim_captions(captions: &[CaptionChunk], limit: Millis) -> Vec<CaptionChunk> {
    captions
        .iter()
        .filter_map(|chunk| {
            let span = chunk.span().clip_end(limit)?;
            let mut chunk = chunk.clone();
            chunk.end = span.end;
            Some(chunk)
        })
        .collect()
}
