use crate::types::{CaptionChunk, CaptionConfig, Word};

use super::wrap_lines;

const SENTENCE_MARKS: [char; 3] = ['.', '?', '!'];

pub(super) struct CaptionAccumulator<'a> {
    chunks: Vec<CaptionChunk>,
    current: Vec<&'a Word>,
    config: CaptionConfig,
}

impl<'a> CaptionAccumulator<'a> {
    pub(super) fn new(config: CaptionConfig) -> Self {
        Self {
            chunks: Vec::new(),
            current: Vec::with_capacity(config.max_words),
            config,
        }
    }

    pub(super) fn handle_word(&mut self, word: &'a Word, next: Option<&Word>) {
        self.current.push(word);
        if self.should_close(word, next) {
            self.finish_chunk();
        }
    }

    pub(super) fn finish_chunk(&mut self) {
        let (first, last) = match (self.current.first(), self.current.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return,
        };
        let text = self
            .current
            .iter()
            .map(|word| word.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            // blank ASR tokens only: nothing to show
            self.current.clear();
            return;
        }
        self.chunks.push(CaptionChunk {
            lines: wrap_lines(&text, self.config.wrap_width),
            text,
            start: first.start,
            end: last.end,
            word_count: self.current.len(),
        });
        self.current.clear();
    }

    pub(super) fn into_chunks(self) -> Vec<CaptionChunk> {
        self.chunks
    }

    // Capacity is checked first so a missed sentence boundary can never grow
    // a chunk past max_words.
    fn should_close(&self, word: &Word, next: Option<&Word>) -> bool {
        if self.current.len() >= self.config.max_words.max(1) {
            return true;
        }
        if ends_sentence(&word.text) {
            return true;
        }
        match next {
            Some(next) => starts_sentence(&next.text),
            None => true,
        }
    }
}

fn ends_sentence(text: &str) -> bool {
    text.trim_end().ends_with(SENTENCE_MARKS)
}

/// Capitalized next word, read as the start of a new sentence. Proper nouns
/// mid-sentence trip this too.
fn starts_sentence(text: &str) -> bool {
    text.trim_start()
        .chars()
        .next()
        .is_some_and(char::is_uppercase)
}
