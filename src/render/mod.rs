//! Frame schedule - what a renderer paints at each output frame
//!
//! Frame `n` sits at `n / fps` seconds. Frame boundaries are computed in
//! integer units (`ms * fps` against `n * 1000`), so every frame lands in
//! exactly one timeline segment even when `1000 / fps` is not whole.

use serde::Serialize;

use crate::effects::EffectParams;
use crate::plan::CompositionPlan;
use crate::time::Millis;
use crate::types::CaptionChunk;

pub const DEFAULT_FPS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSample {
    pub frame: u64,
    /// Seconds from the start of the reel
    pub time: f64,
    /// Index into the plan's timeline
    pub segment: usize,
    pub params: EffectParams,
    /// Index into the plan's captions
    pub caption: Option<usize>,
}

/// Number of frames needed to cover `duration` at `fps`.
pub fn frame_count(duration: Millis, fps: u32) -> u64 {
    first_frame_at(duration, fps)
}

/// Per-frame schedule for the whole plan, computed per segment in parallel.
pub fn frame_schedule(plan: &CompositionPlan, fps: u32) -> Vec<FrameSample> {
    if fps == 0 {
        return Vec::new();
    }
    plan.par_map_segments(|idx, segment| {
        let first = first_frame_at(segment.start, fps);
        let last = first_frame_at(segment.end, fps);
        let start_secs = segment.start.as_secs_f64();
        (first..last)
            .map(|frame| {
                let time = frame as f64 / fps as f64;
                FrameSample {
                    frame,
                    time,
                    segment: idx,
                    params: segment.effect.params_at_secs(time - start_secs),
                    caption: caption_for_frame(&plan.captions, frame, fps),
                }
            })
            .collect::<Vec<_>>()
    })
    .into_iter()
    .flatten()
    .collect()
}

/// First frame whose timestamp is at or after `t`.
fn first_frame_at(t: Millis, fps: u32) -> u64 {
    (t.as_millis() * fps as u64).div_ceil(1000)
}

fn caption_for_frame(captions: &[CaptionChunk], frame: u64, fps: u32) -> Option<usize> {
    let scaled = frame * 1000;
    let fps = fps as u64;
    let idx = captions.partition_point(|chunk| chunk.end.as_millis() * fps <= scaled);
    captions
        .get(idx)
        .filter(|chunk| chunk.start.as_millis() * fps <= scaled)
        .map(|_| idx)
}
