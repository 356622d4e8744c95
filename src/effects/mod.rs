//! Motion effects - sampling windows into a still image over time
//!
//! A [`MotionEffect`] is pure data: the chosen kind, the frame it must fill
//! and the span it runs over. [`MotionEffect::params_at`] turns an elapsed
//! time into the crop window a renderer samples from the scaled image.

pub mod policy;

pub use policy::{EffectPolicy, FixedEffect, PolicyConfig, RoundRobin, SeededRandom};

use serde::Serialize;

use crate::time::Millis;
use crate::types::{EffectKind, ImageAsset};

/// Default zoom headroom: effects scale between 1.0 and 1.1.
pub const DEFAULT_ZOOM_DELTA: f64 = 0.1;

/// Window into the scaled image, in scaled-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
}

/// Sampling parameters for one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectParams {
    pub crop: CropRect,
    pub scale: f64,
}

impl EffectParams {
    /// Size of the source image after scaling.
    pub fn scaled_size(&self) -> (f64, f64) {
        (
            self.crop.width as f64 * self.scale,
            self.crop.height as f64 * self.scale,
        )
    }

    /// Whether the crop window lies inside the scaled image.
    pub fn fits_within_scaled(&self, tolerance: f64) -> bool {
        let (scaled_w, scaled_h) = self.scaled_size();
        self.crop.x >= -tolerance
            && self.crop.y >= -tolerance
            && self.crop.x + self.crop.width as f64 <= scaled_w + tolerance
            && self.crop.y + self.crop.height as f64 <= scaled_h + tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionEffect {
    pub kind: EffectKind,
    pub frame_width: u32,
    pub frame_height: u32,
    pub zoom_delta: f64,
    pub duration: Millis,
}

impl MotionEffect {
    pub fn new(kind: EffectKind, image: &ImageAsset, duration: Millis, zoom_delta: f64) -> Self {
        Self {
            kind,
            frame_width: image.width,
            frame_height: image.height,
            zoom_delta: if zoom_delta.is_finite() {
                zoom_delta.max(0.0)
            } else {
                DEFAULT_ZOOM_DELTA
            },
            duration,
        }
    }

    pub fn still(image: &ImageAsset, duration: Millis) -> Self {
        Self::new(EffectKind::Static, image, duration, 0.0)
    }

    pub fn with_duration(&self, duration: Millis) -> Self {
        Self { duration, ..*self }
    }

    /// Parameters at `t` into the segment; `t` is clamped to `[0, duration]`.
    pub fn params_at(&self, t: Millis) -> EffectParams {
        self.params_at_progress(self.progress(t.as_secs_f64()))
    }

    /// Same as [`params_at`](Self::params_at) for fractional seconds, as
    /// renderers sampling at a frame rate need.
    pub fn params_at_secs(&self, t: f64) -> EffectParams {
        self.params_at_progress(self.progress(t))
    }

    fn progress(&self, t: f64) -> f64 {
        let total = self.duration.as_secs_f64();
        if total <= 0.0 || !t.is_finite() {
            return 0.0;
        }
        (t / total).clamp(0.0, 1.0)
    }

    fn params_at_progress(&self, progress: f64) -> EffectParams {
        let w = self.frame_width as f64;
        let h = self.frame_height as f64;
        let delta = self.zoom_delta;

        let (scale, x, y) = match self.kind {
            EffectKind::KenBurns => {
                let zoom = 1.0 + delta * progress;
                (zoom, centered(w, zoom), centered(h, zoom))
            }
            EffectKind::ZoomOut => {
                let zoom = 1.0 + delta - delta * progress;
                (zoom, centered(w, zoom), centered(h, zoom))
            }
            EffectKind::Pan => {
                let zoom = 1.0 + delta;
                let max_pan = (w * zoom - w).max(0.0);
                (zoom, (progress * max_pan).min(max_pan), 0.0)
            }
            EffectKind::Static => (1.0, 0.0, 0.0),
        };

        EffectParams {
            crop: CropRect {
                x,
                y,
                width: self.frame_width,
                height: self.frame_height,
            },
            scale,
        }
    }
}

fn centered(extent: f64, zoom: f64) -> f64 {
    ((extent * zoom - extent) / 2.0).max(0.0)
}
