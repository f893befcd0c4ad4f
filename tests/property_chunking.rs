//! Property-based tests for chunking and similarity invariants
//!
//! Tests the following properties:
//! 1. Short text yields exactly one chunk equal to the normalized input
//! 2. Chunk windows tile the normalized text (round-trip)
//! 3. Chunk bounds: non-empty, at most chunk_size chars, index < count
//! 4. Overlap >= chunk_size is always rejected
//! 5. Cosine self-similarity is 1.0; similarity with a zero vector is 0.0

use proptest::prelude::*;
use ragline::domain::models::ChunkMetadata;
use ragline::infrastructure::vector::{cosine_similarity, Chunker};
use ragline::{ConfigError, RagConfig};

/// Prose-like text with sentence endings and irregular whitespace
fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 .,!?\n\t]{0,1500}").expect("Valid regex")
}

/// (chunk_size, chunk_overlap) with overlap < size
fn chunking_strategy() -> impl Strategy<Value = (usize, usize)> {
    (2usize..300).prop_flat_map(|size| (Just(size), 0..size))
}

fn metadata() -> ChunkMetadata {
    ChunkMetadata::for_document("Doc", "proptest", 0)
}

proptest! {
    #[test]
    fn proptest_short_text_single_chunk(text in "[a-z ]{1,200}") {
        let normalized = Chunker::normalize(&text);
        prop_assume!(!normalized.is_empty());

        let chunker = Chunker::new(&RagConfig::with_chunking(200, 20).unwrap());
        let chunks = chunker.chunk(&text, &metadata());

        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(chunks[0].metadata.chunk_index, 0);
        prop_assert_eq!(chunks[0].metadata.chunk_count, 1);
        prop_assert_eq!(&chunks[0].content, &normalized);
    }

    #[test]
    fn proptest_windows_reconstruct_normalized_text(
        text in text_strategy(),
        (size, overlap) in chunking_strategy(),
    ) {
        let chunker = Chunker::new(&RagConfig::with_chunking(size, overlap).unwrap());
        let normalized = Chunker::normalize(&text);
        let chars: Vec<char> = normalized.chars().collect();
        let chunks = chunker.chunk(&text, &metadata());

        if chars.is_empty() {
            prop_assert!(chunks.is_empty());
            return Ok(());
        }

        prop_assert_eq!(chunks[0].metadata.start_char, 0);
        prop_assert_eq!(chunks.last().unwrap().metadata.end_char, chars.len());

        let mut rebuilt = String::new();
        let mut covered = 0;
        for chunk in &chunks {
            let meta = &chunk.metadata;
            prop_assert!(meta.start_char <= covered, "Gap before chunk {}", meta.chunk_index);
            prop_assert!(meta.end_char > covered, "Chunk {} adds nothing", meta.chunk_index);

            let window: String = chars[meta.start_char..meta.end_char].iter().collect();
            prop_assert_eq!(window.trim(), chunk.content.as_str());

            rebuilt.extend(&chars[covered..meta.end_char]);
            covered = meta.end_char;
        }
        prop_assert_eq!(rebuilt, normalized);
    }

    #[test]
    fn proptest_chunk_bounds(
        text in text_strategy(),
        (size, overlap) in chunking_strategy(),
    ) {
        let chunker = Chunker::new(&RagConfig::with_chunking(size, overlap).unwrap());
        let chunks = chunker.chunk(&text, &metadata());

        let mut previous_start = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert!(!chunk.content.is_empty());
            prop_assert!(chunk.content.chars().count() <= size);
            prop_assert_eq!(chunk.metadata.chunk_index, i);
            prop_assert_eq!(chunk.metadata.chunk_count, chunks.len());
            prop_assert!(chunk.metadata.start_char >= previous_start);
            previous_start = chunk.metadata.start_char;
        }
    }

    #[test]
    fn proptest_overlap_not_below_size_rejected(size in 1usize..5000, extra in 0usize..100) {
        let result = RagConfig::with_chunking(size, size + extra);
        let is_invalid_overlap = matches!(result, Err(ConfigError::InvalidOverlap { .. }));
        prop_assert!(is_invalid_overlap);
    }

    #[test]
    fn proptest_cosine_self_similarity(v in prop::collection::vec(-100.0f32..100.0, 1..64)) {
        prop_assume!(v.iter().any(|x| x.abs() > 1e-3));

        let similarity = cosine_similarity(&v, &v);
        prop_assert!((similarity - 1.0).abs() < 1e-4, "self-similarity was {}", similarity);

        let zeros = vec![0.0; v.len()];
        prop_assert_eq!(cosine_similarity(&v, &zeros), 0.0);
    }
}
