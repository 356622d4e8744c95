//! SRT import/export at the boundary of the pipeline.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::{Entity, PlanError};
use crate::time::{Interval, Millis, Timestamp};
use crate::types::{CaptionChunk, SpeechSegment, Word};

/// Render caption chunks as SRT cues.
pub fn captions_to_srt(chunks: &[CaptionChunk]) -> String {
    cues_to_srt(
        chunks
            .iter()
            .map(|chunk| (chunk.start, chunk.end, chunk.text.as_str())),
    )
}

/// One cue per word, for word-by-word highlighting.
pub fn words_to_srt(words: &[Word]) -> String {
    cues_to_srt(
        words
            .iter()
            .map(|word| (word.start, word.end, word.text.trim())),
    )
}

fn cues_to_srt<'a>(cues: impl Iterator<Item = (Millis, Millis, &'a str)>) -> String {
    let mut out = String::new();
    for (idx, (start, end, text)) in cues.enumerate() {
        // Writing into a String cannot fail
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            idx + 1,
            Timestamp::from(start),
            Timestamp::from(end),
            text
        );
    }
    out
}

/// Parse SRT cues into speech segments (no word timings).
pub fn parse_srt(content: &str) -> std::result::Result<Vec<SpeechSegment>, PlanError> {
    let normalized = content.replace("\r\n", "\n");
    let mut segments = Vec::new();

    for block in normalized.split("\n\n") {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            continue;
        }
        let cue = segments.len();
        // Cue number line is optional
        let timing_idx = lines
            .iter()
            .position(|line| line.contains("-->"))
            .ok_or_else(|| {
                PlanError::invalid_timestamp(Entity::Segment(cue), "cue has no '-->' timing line")
            })?;
        let span = parse_timing_line(lines[timing_idx]).map_err(|err| err.at(Entity::Segment(cue)))?;
        segments.push(SpeechSegment {
            start: span.start,
            end: span.end,
            text: lines[timing_idx + 1..].join(" "),
            words: Vec::new(),
        });
    }

    Ok(segments)
}

fn parse_timing_line(line: &str) -> std::result::Result<Interval, PlanError> {
    let (start, end) = line
        .split_once("-->")
        .ok_or_else(|| PlanError::invalid_timestamp(Entity::Field, "missing '-->'"))?;
    // Some writers append positioning after the end time
    let end = end.split_whitespace().next().unwrap_or_default();
    let start: Millis = start.parse::<Timestamp>()?.into();
    let end: Millis = end.parse::<Timestamp>()?.into();
    Interval::new(start, end).map_err(|_| {
        PlanError::invalid_timestamp(
            Entity::Field,
            format!("end {} precedes start {}", end, start),
        )
    })
}

pub fn write_srt(path: &Path, chunks: &[CaptionChunk]) -> Result<()> {
    fs::write(path, captions_to_srt(chunks))
        .with_context(|| format!("Failed to write subtitles to {:?}", path))
}

pub fn read_srt(path: &Path) -> Result<Vec<SpeechSegment>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read subtitles from {:?}", path))?;
    parse_srt(&content).with_context(|| format!("Invalid SRT in {:?}", path))
}
