//! Timeline building - pair images with speech segments and fill the gaps
//!
//! Image `i` is shown over speech segment `i`. Silences between segments keep
//! the previous image on screen as a static gap-fill, and the tail after the
//! last paired segment is covered the same way, so the output partitions
//! `[0, end]` with no holes or overlaps.

mod builder;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::effects::{EffectPolicy, DEFAULT_ZOOM_DELTA};
use crate::error::{Entity, PlanError, Result};
use crate::time::Millis;
use crate::types::{ImageAsset, SpeechSegment, TimelineSegment};

use builder::TimelineBuilder;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    pub zoom_delta: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            zoom_delta: DEFAULT_ZOOM_DELTA,
        }
    }
}

/// Build the visual timeline for `segments`, covering at least `[0, total]`.
///
/// Segments running past `total` are kept; trimming to the audio is the
/// reconciler's job. Fewer images than segments is not an error: pairing
/// stops and the last image covers the remainder.
pub fn build_timeline(
    images: &[Arc<ImageAsset>],
    segments: &[SpeechSegment],
    total: Millis,
    policy: &mut dyn EffectPolicy,
    config: TimelineConfig,
) -> Result<Vec<TimelineSegment>> {
    let first_image = images
        .first()
        .ok_or(PlanError::EmptyInput("no images"))?;
    if segments.is_empty() {
        return Err(PlanError::EmptyInput("no speech segments"));
    }
    validate_segments(segments)?;

    let mut builder = TimelineBuilder::new(Arc::clone(first_image), config.zoom_delta);
    for (idx, segment) in segments.iter().enumerate() {
        let Some(image) = images.get(idx) else {
            warn!(
                images = images.len(),
                segments = segments.len(),
                "fewer images than speech segments, reusing the last image"
            );
            break;
        };
        builder.fill_to(segment.start);
        if segment.end > segment.start {
            let effect = policy.select(idx);
            builder.push_paired(Arc::clone(image), segment.start, segment.end, effect);
        } else {
            debug!(segment = idx, "skipping zero-length speech segment");
        }
    }
    builder.fill_to(total);

    let timeline = builder.finish();
    debug_assert!(covered_until(&timeline).is_some());
    debug!(
        segments = segments.len(),
        visual_segments = timeline.len(),
        "built timeline"
    );
    Ok(timeline)
}

/// Reject inverted, overlapping or out-of-order segments.
pub fn validate_segments(segments: &[SpeechSegment]) -> Result<()> {
    let mut previous_end = None;
    for (idx, segment) in segments.iter().enumerate() {
        if segment.end < segment.start {
            return Err(PlanError::invalid_timestamp(
                Entity::Segment(idx),
                format!("ends at {} before it starts at {}", segment.end, segment.start),
            ));
        }
        if let Some(previous_end) = previous_end {
            if segment.start < previous_end {
                return Err(PlanError::NonMonotonicSegments {
                    entity: Entity::Segment(idx),
                    start: segment.start,
                    previous_end,
                });
            }
        }
        previous_end = Some(segment.end);
    }
    Ok(())
}

/// End of the covered range when `timeline` partitions `[0, end]`, else `None`.
pub fn covered_until(timeline: &[TimelineSegment]) -> Option<Millis> {
    let mut cursor = Millis::ZERO;
    for segment in timeline {
        if segment.start != cursor || segment.end <= segment.start {
            return None;
        }
        cursor = segment.end;
    }
    (!timeline.is_empty()).then_some(cursor)
}
