//! Demo CLI command.
//!
//! Ingests three sample documents, prints knowledge base statistics, then
//! runs sample searches and questions against them.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::commands::build_pipeline;
use crate::cli::output::{output, truncate, CommandOutput, TableFormatter};
use crate::domain::models::{Answer, Config, DocumentInput, Fallback, KnowledgeBaseStats, ScoredChunk};

const SEARCH_RESULTS: usize = 2;

const SEARCH_QUERIES: [&str; 3] = [
    "How does vector search work?",
    "What is KotaDB performance?",
    "RAG implementation guide",
];

const QUESTIONS: [&str; 3] = [
    "What makes KotaDB fast?",
    "How do I use KotaDB for AI applications?",
    "What is the difference between text and vector search?",
];

/// The sample knowledge base: (title, content, source)
pub fn sample_documents() -> Vec<DocumentInput> {
    [
        (
            "KotaDB Overview",
            "KotaDB is a custom database designed for distributed human-AI cognition. \
             It features a unique storage engine with multiple index types including B+ trees for fast lookups, \
             trigram indices for full-text search, and vector indices for semantic search. \
             The system is built in Rust for performance and safety, offering sub-10ms query latency \
             and supporting over 3,600 operations per second. KotaDB requires zero external database \
             dependencies and provides ACID compliance through Write-Ahead Logging.",
            "documentation",
        ),
        (
            "Vector Search in KotaDB",
            "KotaDB implements vector search using HNSW (Hierarchical Navigable Small World) \
             algorithms for efficient similarity search. This enables semantic search capabilities for \
             AI applications, allowing users to find documents based on meaning rather than just keywords. \
             The vector index supports multiple embedding models and provides fast approximate nearest \
             neighbor search with configurable accuracy-speed tradeoffs.",
            "technical-guide",
        ),
        (
            "RAG Applications with KotaDB",
            "Retrieval-Augmented Generation (RAG) systems can leverage KotaDB as a \
             knowledge base backend. The database's fast vector search capabilities make it ideal \
             for retrieving relevant context documents for large language models. KotaDB's client \
             libraries provide easy integration with popular AI frameworks, enabling developers to \
             build production-ready RAG applications with minimal setup.",
            "ai-guide",
        ),
    ]
    .into_iter()
    .map(|(title, content, source)| DocumentInput::new(title, content).with_source(source))
    .collect()
}

#[derive(Debug, Serialize)]
pub struct DemoSearch {
    pub query: String,
    pub results: Vec<ScoredChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

#[derive(Debug, Serialize)]
pub struct DemoAnswer {
    pub question: String,
    #[serde(flatten)]
    pub answer: Answer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

#[derive(Debug, Serialize)]
pub struct DemoOutput {
    pub ingested_chunks: usize,
    pub stats: KnowledgeBaseStats,
    pub searches: Vec<DemoSearch>,
    pub answers: Vec<DemoAnswer>,
}

impl CommandOutput for DemoOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut lines = vec![
            "RAG Pipeline Demo".to_string(),
            "=".repeat(50),
            format!("\n1. Document ingestion: {} chunks stored", self.ingested_chunks),
            "\n2. Knowledge base statistics".to_string(),
            formatter.format_stats(&self.stats),
            "\n3. Semantic search".to_string(),
        ];

        for search in &self.searches {
            lines.push(format!("\nQuery: '{}'", search.query));
            for (i, result) in search.results.iter().enumerate() {
                lines.push(format!(
                    "   {}. {} (similarity: {:.3})",
                    i + 1,
                    result.title,
                    result.score.value()
                ));
                lines.push(format!("      Content preview: {}", truncate(&result.content, 100)));
            }
            if let Some(fallback) = &search.fallback {
                lines.push(format!("   (degraded: {})", fallback));
            }
        }

        lines.push("\n4. Question answering".to_string());
        for answer in &self.answers {
            lines.push(format!("\nQuestion: {}", answer.question));
            lines.push(format!("Answer: {}", answer.answer.answer));
            lines.push(format!("Sources: {}", answer.answer.sources.join(", ")));
            lines.push(format!("Context chunks used: {}", answer.answer.context_docs_count));
        }

        lines.push(format!("\n{}", "=".repeat(50)));
        lines.push("Demo complete".to_string());
        lines.join("\n")
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let pipeline = build_pipeline(config)?;

    let reports = pipeline.ingest_batch(sample_documents()).await;
    let ingested_chunks = reports.iter().map(|r| r.stored()).sum();

    let stats = pipeline
        .stats()
        .await
        .context("Failed to compute knowledge base stats")?;

    let mut searches = Vec::with_capacity(SEARCH_QUERIES.len());
    for query in SEARCH_QUERIES {
        let (results, fallback) = pipeline.search(query, Some(SEARCH_RESULTS)).await.into_parts();
        searches.push(DemoSearch {
            query: query.to_string(),
            results,
            fallback,
        });
    }

    let mut answers = Vec::with_capacity(QUESTIONS.len());
    for question in QUESTIONS {
        let (answer, fallback) = pipeline.ask(question).await.into_parts();
        answers.push(DemoAnswer {
            question: question.to_string(),
            answer,
            fallback,
        });
    }

    output(
        &DemoOutput {
            ingested_chunks,
            stats,
            searches,
            answers,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::EmbeddingProviderKind;

    #[test]
    fn test_sample_documents() {
        let docs = sample_documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1].title, "Vector Search in KotaDB");
        assert_eq!(docs[2].source.as_deref(), Some("ai-guide"));
        assert!(!docs[0].content.contains("  "), "Continuations should not leave runs of spaces");
    }

    #[tokio::test]
    async fn test_demo_knowledge_base() {
        let mut config = Config::default();
        config.embedding.provider = EmbeddingProviderKind::Statistical;
        let pipeline = build_pipeline(&config).unwrap();

        let reports = pipeline.ingest_batch(sample_documents()).await;
        assert!(reports.iter().all(|r| r.is_complete()));

        let stats = pipeline.stats().await.unwrap();
        // Each sample is shorter than one chunk
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.sources, vec!["ai-guide", "documentation", "technical-guide"]);

        let outcome = pipeline.search(SEARCH_QUERIES[0], Some(SEARCH_RESULTS)).await;
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value()[0].source_title(), "Vector Search in KotaDB");
    }
}
