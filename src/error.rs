//! Error types for plan synthesis.
//!
//! Every variant names the invariant that failed and, where one exists, the
//! input entity it failed on. Boundary code (files, CLI) wraps these in
//! `anyhow` with context; the core never returns a partial plan.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::time::Millis;

/// Convenient alias for results returned by the synthesis core.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Input entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Segment(usize),
    Word(usize),
    /// A standalone time field (CLI value, SRT cue, audio duration).
    Field,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Segment(idx) => write!(f, "segment {}", idx),
            Entity::Word(idx) => write!(f, "word {}", idx),
            Entity::Field => write!(f, "time field"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// Malformed or out-of-range time value.
    #[error("invalid timestamp in {entity}: {reason}")]
    InvalidTimestamp { entity: Entity, reason: String },

    /// Nothing to build from: no images, no segments or zero audio.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Segments or words that overlap or run backwards.
    #[error("{entity} starts at {start} before the previous one ends at {previous_end}")]
    NonMonotonicSegments {
        entity: Entity,
        start: Millis,
        previous_end: Millis,
    },

    /// An interval whose end precedes its start.
    #[error("negative duration: interval {start}..{end}")]
    NegativeDuration { start: Millis, end: Millis },
}

impl PlanError {
    pub(crate) fn invalid_timestamp(entity: Entity, reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            entity,
            reason: reason.into(),
        }
    }

    /// Re-target an error produced while reading a field onto its owning entity.
    pub(crate) fn at(self, entity: Entity) -> Self {
        match self {
            Self::InvalidTimestamp { reason, .. } => Self::InvalidTimestamp { entity, reason },
            Self::NonMonotonicSegments {
                start,
                previous_end,
                ..
            } => Self::NonMonotonicSegments {
                entity,
                start,
                previous_end,
            },
            other => other,
        }
    }
}
