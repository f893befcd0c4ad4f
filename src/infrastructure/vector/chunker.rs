//! Text chunking
//!
//! Splits normalized document text into overlapping, character-bounded
//! windows, preferring to cut just after a sentence ending found in the
//! trailing fifth of a window.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::models::{Chunk, ChunkMetadata, RagConfig};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Two-character sentence endings searched for near the end of a window
const SENTENCE_ENDINGS: [[char; 2]; 6] = [
    ['.', ' '],
    ['!', ' '],
    ['?', ' '],
    ['.', '\n'],
    ['!', '\n'],
    ['?', '\n'],
];

/// Character-window text chunker
///
/// Sizes are in characters, never bytes, so multi-byte text is never split
/// inside a code point.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Create a chunker from a validated configuration
    pub fn new(config: &RagConfig) -> Self {
        Self {
            chunk_size: config.chunk_size(),
            chunk_overlap: config.chunk_overlap(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Collapse whitespace runs to one space, strip control characters, trim
    pub fn normalize(text: &str) -> String {
        let collapsed = WHITESPACE_RUN.replace_all(text, " ");
        let stripped: String = collapsed.chars().filter(|c| !c.is_control()).collect();
        stripped.trim().to_string()
    }

    /// Split `content` into chunks, each carrying a copy of `metadata`
    ///
    /// Returns an empty vector when the normalized content is empty.
    pub fn chunk(&self, content: &str, metadata: &ChunkMetadata) -> Vec<Chunk> {
        let normalized = Self::normalize(content);
        let chars: Vec<char> = normalized.chars().collect();

        if chars.is_empty() {
            return Vec::new();
        }

        if chars.len() <= self.chunk_size {
            let meta = metadata.clone().with_offsets(0, chars.len());
            let mut chunk = Chunk::new(normalized, meta);
            chunk.metadata.chunk_index = 0;
            chunk.metadata.chunk_count = 1;
            return vec![chunk];
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut start = 0;

        loop {
            let mut end = (start + self.chunk_size).min(chars.len());

            if end < chars.len() {
                if let Some(cut) = self.find_sentence_boundary(&chars[start..end]) {
                    end = start + cut;
                }
            }

            let window: String = chars[start..end].iter().collect();
            let content = window.trim();
            if !content.is_empty() {
                let mut meta = metadata.clone().with_offsets(start, end);
                meta.chunk_index = chunks.len();
                chunks.push(Chunk::new(content.to_string(), meta));
            }

            if end >= chars.len() {
                break;
            }
            start = end - self.chunk_overlap;
        }

        let count = chunks.len();
        for chunk in &mut chunks {
            chunk.metadata.chunk_count = count;
        }

        tracing::debug!(
            chunks = count,
            chars = chars.len(),
            chunk_size = self.chunk_size,
            "Chunked document"
        );

        chunks
    }

    /// Cut length for `window` ending just after its rightmost sentence end
    ///
    /// The ending's first character must sit strictly beyond 80% of the
    /// window, and the cut must exceed the overlap so the next window starts
    /// further right than this one.
    fn find_sentence_boundary(&self, window: &[char]) -> Option<usize> {
        let len = window.len();
        let best = window
            .windows(2)
            .enumerate()
            .filter(|(pos, _)| pos * 5 > len * 4)
            .filter(|(_, pair)| SENTENCE_ENDINGS.iter().any(|e| e[..] == **pair))
            .map(|(pos, _)| pos + 1)
            .last()?;

        let cut = best + 1;
        (cut > self.chunk_overlap).then_some(cut)
    }
}
