use std::sync::Arc;

use crate::effects::MotionEffect;
use crate::time::Millis;
use crate::types::{EffectKind, ImageAsset, TimelineSegment};

/// Owns the timeline while it is being built; segments only ever append at
/// the cursor, which keeps them contiguous.
pub(super) struct TimelineBuilder {
    segments: Vec<TimelineSegment>,
    cursor: Millis,
    fallback_image: Arc<ImageAsset>,
    zoom_delta: f64,
}

impl TimelineBuilder {
    pub(super) fn new(fallback_image: Arc<ImageAsset>, zoom_delta: f64) -> Self {
        Self {
            segments: Vec::new(),
            cursor: Millis::ZERO,
            fallback_image,
            zoom_delta,
        }
    }

    /// Hold the most recent image (or the first one, before anything is
    /// shown) static from the cursor up to `until`.
    pub(super) fn fill_to(&mut self, until: Millis) {
        if until <= self.cursor {
            return;
        }
        let image = self
            .segments
            .last()
            .map(|segment| Arc::clone(&segment.image))
            .unwrap_or_else(|| Arc::clone(&self.fallback_image));
        let duration = until.saturating_sub(self.cursor);
        self.segments.push(TimelineSegment {
            effect: MotionEffect::still(&image, duration),
            image,
            start: self.cursor,
            end: until,
            gap_fill: true,
        });
        self.cursor = until;
    }

    pub(super) fn push_paired(
        &mut self,
        image: Arc<ImageAsset>,
        start: Millis,
        end: Millis,
        kind: EffectKind,
    ) {
        debug_assert_eq!(start, self.cursor);
        let duration = end.saturating_sub(start);
        self.segments.push(TimelineSegment {
            effect: MotionEffect::new(kind, &image, duration, self.zoom_delta),
            image,
            start,
            end,
            gap_fill: false,
        });
        self.cursor = end;
    }

    pub(super) fn finish(self) -> Vec<TimelineSegment> {
        self.segments
    }
}
