//! Ask CLI command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::commands::{build_pipeline, ingest_documents, DocumentArgs};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Answer, AnswerBackend, Config, Fallback};

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,

    #[command(flatten)]
    pub documents: DocumentArgs,

    /// Also print the context handed to the answerer
    #[arg(long)]
    pub show_context: bool,
}

#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub question: String,
    #[serde(flatten)]
    pub answer: Answer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
    #[serde(skip)]
    pub show_context: bool,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        let backend = match &self.answer.backend {
            AnswerBackend::Generative { model } => format!("generated by {}", model),
            AnswerBackend::Extractive => "extractive".to_string(),
        };

        let mut lines = vec![
            format!("Question: {}", self.question),
            format!("Answer: {}", self.answer.answer),
            format!("Sources: {}", self.answer.sources.join(", ")),
            format!(
                "Context chunks used: {} ({})",
                self.answer.context_docs_count, backend
            ),
        ];
        if let Some(fallback) = &self.fallback {
            lines.push(format!("Note: degraded ({})", fallback));
        }
        if let Some(retrieval) = self
            .answer
            .retrieval_fallback
            .as_ref()
            .filter(|r| self.fallback.as_ref() != Some(*r))
        {
            lines.push(format!("Note: context from degraded retrieval ({})", retrieval));
        }
        if self.show_context && !self.answer.context_used.is_empty() {
            lines.push(format!("\nContext:\n{}", self.answer.context_used));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: AskArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    ingest_documents(&pipeline, &args.documents).await?;

    let (answer, fallback) = pipeline.ask(&args.question).await.into_parts();

    output(
        &AskOutput {
            question: args.question,
            answer,
            fallback,
            show_context: args.show_context,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FallbackTier;

    fn ask_output(fallback: Option<Fallback>) -> AskOutput {
        AskOutput {
            question: "What is it?".to_string(),
            answer: Answer {
                answer: "It is a database.".to_string(),
                sources: vec!["Overview".to_string()],
                context_used: "From 'Overview':\nIt is a database.".to_string(),
                context_docs_count: 1,
                backend: AnswerBackend::Extractive,
                retrieval_fallback: None,
            },
            fallback,
            show_context: false,
        }
    }

    #[test]
    fn test_human_output() {
        let text = ask_output(Some(Fallback::new(FallbackTier::ExtractiveAnswer, "no backend")))
            .to_human();

        assert!(text.contains("Answer: It is a database."));
        assert!(text.contains("Sources: Overview"));
        assert!(text.contains("Context chunks used: 1 (extractive)"));
        assert!(text.contains("extractive_answer: no backend"));
        assert!(!text.contains("Context:\n"));
        assert!(!text.contains("degraded retrieval"));
    }

    #[test]
    fn test_human_output_reports_degraded_retrieval() {
        let mut output = ask_output(Some(Fallback::new(FallbackTier::ExtractiveAnswer, "no backend")));
        output.answer.retrieval_fallback =
            Some(Fallback::new(FallbackTier::LexicalSearch, "store down"));

        let text = output.to_human();
        assert!(text.contains("context from degraded retrieval (lexical_search: store down)"));

        let json = output.to_json();
        assert_eq!(json["retrieval_fallback"]["tier"], "lexical_search");
    }

    #[test]
    fn test_json_output_flattens_answer() {
        let json = ask_output(None).to_json();

        assert_eq!(json["question"], "What is it?");
        assert_eq!(json["answer"], "It is a database.");
        assert_eq!(json["context_docs_count"], 1);
        assert_eq!(json["backend"]["kind"], "extractive");
        assert!(json.get("fallback").is_none());
        assert!(json.get("show_context").is_none());
    }
}
