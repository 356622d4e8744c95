//! Caption chunking - group the word stream into short on-screen captions
//!
//! Single greedy pass, left to right: a chunk closes at `max_words` words, at
//! a sentence-ending mark, or when the next word looks like a sentence start.
//! Emitted chunks are never regrouped.

mod accumulator;

use tracing::debug;

use crate::error::{Entity, PlanError, Result};
use crate::types::{CaptionChunk, CaptionConfig, SpeechSegment, Transcript, Word};

use accumulator::CaptionAccumulator;

/// Chunk word-level timings into captions.
///
/// Fails on the first word whose end precedes its start or that starts
/// before the previous word ends.
pub fn chunk_captions(words: &[Word], config: CaptionConfig) -> Result<Vec<CaptionChunk>> {
    validate_words(words.iter())?;

    let mut accumulator = CaptionAccumulator::new(config);
    for (idx, word) in words.iter().enumerate() {
        accumulator.handle_word(word, words.get(idx + 1));
    }
    accumulator.finish_chunk();

    let chunks = accumulator.into_chunks();
    debug!(words = words.len(), chunks = chunks.len(), "chunked captions");
    Ok(chunks)
}

/// Captions for a whole transcript: word chunks when word timings exist,
/// otherwise one caption per speech segment.
pub fn chunk_transcript(transcript: &Transcript, config: CaptionConfig) -> Result<Vec<CaptionChunk>> {
    if transcript.has_word_timings() {
        let words: Vec<Word> = transcript.words().cloned().collect();
        return chunk_captions(&words, config);
    }
    Ok(sentence_captions(&transcript.segments, config))
}

/// One caption per non-empty segment.
pub fn sentence_captions(segments: &[SpeechSegment], config: CaptionConfig) -> Vec<CaptionChunk> {
    segments
        .iter()
        .filter(|segment| segment.end > segment.start)
        .filter_map(|segment| {
            let text = segment.text.trim();
            (!text.is_empty()).then(|| CaptionChunk {
                text: text.to_string(),
                start: segment.start,
                end: segment.end,
                word_count: text.split_whitespace().count(),
                lines: wrap_lines(text, config.wrap_width),
            })
        })
        .collect()
}

pub(crate) fn validate_words<'a>(words: impl Iterator<Item = &'a Word>) -> Result<()> {
    let mut previous_end = None;
    for (idx, word) in words.enumerate() {
        if word.end < word.start {
            return Err(PlanError::invalid_timestamp(
                Entity::Word(idx),
                format!("ends at {} before it starts at {}", word.end, word.start),
            ));
        }
        if let Some(previous_end) = previous_end {
            if word.start < previous_end {
                return Err(PlanError::NonMonotonicSegments {
                    entity: Entity::Word(idx),
                    start: word.start,
                    previous_end,
                });
            }
        }
        previous_end = Some(word.end);
    }
    Ok(())
}

/// Reject words whose span leaks out of the segment they belong to.
///
/// Word indices count across the flattened word stream.
pub(crate) fn validate_word_spans(segments: &[SpeechSegment]) -> Result<()> {
    let mut idx = 0usize;
    for (segment_idx, segment) in segments.iter().enumerate() {
        for word in &segment.words {
            if !segment.span().covers(&word.span()) {
                return Err(PlanError::invalid_timestamp(
                    Entity::Word(idx),
                    format!(
                        "{} lies outside segment {} at {}",
                        word.span(),
                        segment_idx,
                        segment.span()
                    ),
                ));
            }
            idx += 1;
        }
    }
    Ok(())
}

/// Greedy word wrap at `width` characters; zero disables wrapping.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + 1;
        if !current.is_empty() && needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
