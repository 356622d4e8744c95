//! Time model shared by every stage of plan synthesis.
//!
//! Times are held as whole milliseconds so interval arithmetic is exact;
//! fractional seconds from ASR output are rounded once on the way in.

mod timestamp;

pub use timestamp::Timestamp;

use std::fmt::{self, Display, Formatter};
use std::ops::Add;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Entity, PlanError, Result};

/// Largest accepted time: a little over 31 years, far past any reel.
const MAX_SECONDS: f64 = 1.0e9;
pub(crate) const MAX_MILLIS: u64 = 1_000_000_000_000;

/// Non-negative point in time (or length of time) in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Convert fractional seconds, rounding to the nearest millisecond.
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() {
            return Err(PlanError::invalid_timestamp(
                Entity::Field,
                format!("{} is not a finite number of seconds", secs),
            ));
        }
        if secs < 0.0 {
            return Err(PlanError::invalid_timestamp(
                Entity::Field,
                format!("{} seconds is negative", secs),
            ));
        }
        if secs > MAX_SECONDS {
            return Err(PlanError::invalid_timestamp(
                Entity::Field,
                format!("{} seconds is out of range", secs),
            ));
        }
        Ok(Self((secs * 1000.0).round() as u64))
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, other: Millis) -> Option<Millis> {
        self.0.checked_sub(other.0).map(Millis)
    }

    pub fn saturating_sub(self, other: Millis) -> Millis {
        Millis(self.0.saturating_sub(other.0))
    }
}

impl Add for Millis {
    type Output = Millis;

    fn add(self, rhs: Millis) -> Millis {
        Millis(self.0.saturating_add(rhs.0))
    }
}

impl Display for Millis {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

// Wire format is fractional seconds, matching ASR output and renderer input.
impl Serialize for Millis {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_secs_f64())
    }
}

impl<'de> Deserialize<'de> for Millis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Millis::from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Clamp a signed millisecond difference at zero.
pub fn clamp_to_zero(signed_ms: i64) -> Millis {
    Millis(signed_ms.max(0) as u64)
}

/// Half-open span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: Millis,
    pub end: Millis,
}

impl Interval {
    pub fn new(start: Millis, end: Millis) -> Result<Self> {
        if end < start {
            return Err(PlanError::NegativeDuration { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn from_secs(start: f64, end: f64) -> Result<Self> {
        let start = Millis::from_secs_f64(start)?;
        let end = Millis::from_secs_f64(end)?;
        if end < start {
            return Err(PlanError::invalid_timestamp(
                Entity::Field,
                format!("end {} precedes start {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> Millis {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, t: Millis) -> bool {
        self.start <= t && t < self.end
    }

    /// Whether `other` lies entirely inside this span.
    pub fn covers(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The hole between this span and a later one, if they do not touch.
    pub fn gap(&self, next: &Interval) -> Option<Interval> {
        (next.start > self.end).then_some(Interval {
            start: self.end,
            end: next.start,
        })
    }

    /// Cut the span off at `limit`; `None` when it starts at or after it.
    pub fn clip_end(&self, limit: Millis) -> Option<Interval> {
        (self.start < limit).then(|| Interval {
            start: self.start,
            end: self.end.min(limit),
        })
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u64, end: u64) -> Interval {
        Interval::new(Millis::from_millis(start), Millis::from_millis(end)).unwrap()
    }

    #[test]
    fn rounds_fractional_seconds_to_millis() {
        assert_eq!(Millis::from_secs_f64(1.2345).unwrap().as_millis(), 1_235);
        assert_eq!(Millis::from_secs_f64(0.1 + 0.2).unwrap().as_millis(), 300);
        assert_eq!(Millis::from_secs_f64(0.0).unwrap(), Millis::ZERO);
    }

    #[test]
    fn rejects_negative_and_non_finite_seconds() {
        assert!(matches!(
            Millis::from_secs_f64(-0.5),
            Err(PlanError::InvalidTimestamp { .. })
        ));
        assert!(Millis::from_secs_f64(f64::NAN).is_err());
        assert!(Millis::from_secs_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn summing_many_frames_stays_exact() {
        // 120s of 33ms steps must not drift the way repeated f64 adds do
        let mut t = Millis::ZERO;
        for _ in 0..3_636 {
            t = t + Millis::from_secs_f64(0.033).unwrap();
        }
        assert_eq!(t.as_millis(), 119_988);
    }

    #[test]
    fn clamps_negative_differences() {
        assert_eq!(clamp_to_zero(-40), Millis::ZERO);
        assert_eq!(clamp_to_zero(40), Millis::from_millis(40));
        assert_eq!(
            Millis::from_millis(10).saturating_sub(Millis::from_millis(30)),
            Millis::ZERO
        );
        assert_eq!(
            Millis::from_millis(10).checked_sub(Millis::from_millis(30)),
            None
        );
    }

    #[test]
    fn interval_rejects_negative_duration() {
        let err = Interval::new(Millis::from_millis(20), Millis::from_millis(10)).unwrap_err();
        assert!(matches!(err, PlanError::NegativeDuration { .. }));
        assert!(Interval::from_secs(2.0, 1.0).is_err());
    }

    #[test]
    fn overlap_is_strict_for_abutting_spans() {
        assert!(!span(0, 1_000).overlaps(&span(1_000, 2_000)));
        assert!(span(0, 1_001).overlaps(&span(1_000, 2_000)));
        assert!(span(500, 700).overlaps(&span(0, 2_000)));
    }

    #[test]
    fn covers_nested_spans_only() {
        assert!(span(1_000, 3_000).covers(&span(1_000, 3_000)));
        assert!(span(1_000, 3_000).covers(&span(1_500, 2_000)));
        assert!(!span(1_000, 3_000).covers(&span(500, 2_000)));
        assert!(!span(1_000, 3_000).covers(&span(2_500, 3_001)));
    }

    #[test]
    fn gap_between_spans() {
        assert_eq!(span(0, 1_000).gap(&span(2_000, 3_000)), Some(span(1_000, 2_000)));
        assert_eq!(span(0, 1_000).gap(&span(1_000, 3_000)), None);
    }

    #[test]
    fn clip_end_cuts_straddling_spans() {
        assert_eq!(span(2_000, 4_000).clip_end(Millis::from_millis(3_000)), Some(span(2_000, 3_000)));
        assert_eq!(span(3_000, 4_000).clip_end(Millis::from_millis(3_000)), None);
        assert_eq!(span(0, 1_000).clip_end(Millis::from_millis(3_000)), Some(span(0, 1_000)));
    }

    #[test]
    fn serializes_as_seconds() {
        let json = serde_json::to_string(&Millis::from_millis(1_250)).unwrap();
        assert_eq!(json, "1.25");
        let back: Millis = serde_json::from_str("2.5").unwrap();
        assert_eq!(back.as_millis(), 2_500);
        assert!(serde_json::from_str::<Millis>("-1.0").is_err());
    }
}
