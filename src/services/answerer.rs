//! Answer composition.
//!
//! Builds a bounded context from the top retrieved chunks and asks the
//! generative backend for an answer. Without a backend, or when it fails,
//! the answer is extracted from the context: the sentence sharing the most
//! words with the question.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::domain::models::{Answer, AnswerBackend, FallbackTier, Outcome, RagConfig, ScoredChunk};
use crate::domain::ports::GenerationBackend;

/// Number of leading chunks considered for the context
pub const MAX_CONTEXT_CHUNKS: usize = 3;

/// Minimum length (chars, trimmed) of a sentence eligible for extraction
const MIN_SENTENCE_CHARS: usize = 10;

pub const NO_CONTEXT_ANSWER: &str =
    "I don't have enough information in the knowledge base to answer this question.";

pub const NO_MATCH_ANSWER: &str = "The knowledge base contains related information, but I cannot generate a specific answer without AI capabilities.";

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

/// Composes answers from retrieved chunks
pub struct Answerer {
    backend: Option<Arc<dyn GenerationBackend>>,
    max_context_length: usize,
    temperature: f32,
}

impl Answerer {
    pub fn new(config: &RagConfig, backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self {
            backend,
            max_context_length: config.max_context_length(),
            temperature: config.temperature(),
        }
    }

    /// Answer `question` from `context_chunks` (most relevant first)
    pub async fn answer(&self, question: &str, context_chunks: &[ScoredChunk]) -> Outcome<Answer> {
        let (context, sources) = self.build_context(context_chunks);
        let context_docs_count = context_chunks.len();

        let reason = match &self.backend {
            Some(backend) => {
                let prompt = build_prompt(&context, question);
                match backend.complete(&prompt, self.temperature).await {
                    Ok(text) if !text.trim().is_empty() => {
                        return Outcome::Primary(Answer {
                            answer: text.trim().to_string(),
                            sources,
                            context_used: context,
                            context_docs_count,
                            backend: AnswerBackend::Generative {
                                model: backend.model().to_string(),
                            },
                            retrieval_fallback: None,
                        });
                    }
                    Ok(_) => "generation backend returned an empty completion".to_string(),
                    Err(e) => e.to_string(),
                }
            }
            None => "no generation backend configured".to_string(),
        };

        if self.backend.is_some() {
            tracing::warn!(reason = %reason, "Generation failed, using extractive answer");
        } else {
            tracing::debug!("Using extractive answer");
        }

        let answer = Answer {
            answer: extract_answer(question, &context),
            sources,
            context_used: context,
            context_docs_count,
            backend: AnswerBackend::Extractive,
            retrieval_fallback: None,
        };
        Outcome::degraded(answer, FallbackTier::ExtractiveAnswer, reason)
    }

    /// Context string and de-duplicated source titles
    ///
    /// Uses the first three non-empty chunks, whole chunks only; stops at the first chunk that would push the
    /// context past `max_context_length` characters.
    fn build_context(&self, chunks: &[ScoredChunk]) -> (String, Vec<String>) {
        let mut context = String::new();
        let mut context_chars = 0;
        let mut sources: Vec<String> = Vec::new();

        let non_empty = chunks.iter().filter(|c| !c.content.trim().is_empty());
        for chunk in non_empty.take(MAX_CONTEXT_CHUNKS) {
            let title = chunk.source_title();
            let part = format!("From '{}':\n{}", title, chunk.content);
            let separator = if context.is_empty() { 0 } else { 2 };
            let part_chars = part.chars().count();
            if context_chars + separator + part_chars > self.max_context_length {
                break;
            }

            if separator > 0 {
                context.push_str("\n\n");
            }
            context.push_str(&part);
            context_chars += separator + part_chars;

            if !sources.iter().any(|s| s == title) {
                sources.push(title.to_string());
            }
        }

        (context, sources)
    }
}

/// Prompt handed to the generative backend
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following context, please answer the question. If the context doesn't contain enough information, say so.\n\nContext:\n{}\n\nQuestion: {}\n\nAnswer:",
        context, question
    )
}

/// Pick the context sentence sharing the most words with the question
pub fn extract_answer(question: &str, context: &str) -> String {
    if context.trim().is_empty() {
        return NO_CONTEXT_ANSWER.to_string();
    }

    let question_words: HashSet<String> = question
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut best: Option<(usize, &str)> = None;
    for sentence in SENTENCE_END.split(context) {
        let sentence = sentence.trim();
        if sentence.chars().count() < MIN_SENTENCE_CHARS {
            continue;
        }

        let lowered = sentence.to_lowercase();
        let overlap = lowered
            .split_whitespace()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter(|w| question_words.contains(*w))
            .count();

        // First sentence wins ties
        if overlap > 0 && best.is_none_or(|(score, _)| overlap > score) {
            best = Some((overlap, sentence));
        }
    }

    match best {
        Some((_, sentence)) => format!("Based on the knowledge base: {}", sentence),
        None => NO_MATCH_ANSWER.to_string(),
    }
}
