//! Table output formatting for CLI commands
//!
//! Renders search results and knowledge base statistics with comfy-table.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{KnowledgeBaseStats, ScoredChunk};

use super::truncate;

/// Characters of chunk content shown per result row
const PREVIEW_CHARS: usize = 80;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format ranked chunks, most relevant first
    pub fn format_results(&self, results: &[ScoredChunk]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Preview").add_attribute(Attribute::Bold),
        ]);

        for (i, result) in results.iter().enumerate() {
            let score = if result.score.is_ranked() {
                format!("{:.3}", result.score.value())
            } else {
                format!("{:.3} (lexical)", result.score.value())
            };
            let score_cell = if self.use_colors {
                Cell::new(score).fg(score_color(result))
            } else {
                Cell::new(score)
            };

            table.add_row(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Right),
                Cell::new(&result.title),
                score_cell,
                Cell::new(truncate(&result.content, PREVIEW_CHARS)),
            ]);
        }

        table.to_string()
    }

    /// Format knowledge base statistics as a two-column table
    pub fn format_stats(&self, stats: &KnowledgeBaseStats) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let rows = [
            ("Total chunks", stats.total_chunks.to_string()),
            ("Unique sources", stats.unique_sources.to_string()),
            ("Sources", stats.sources.join(", ")),
            ("Total content length", stats.total_content_length.to_string()),
            ("Average chunk size", stats.average_chunk_size.to_string()),
        ];
        for (metric, value) in rows {
            table.add_row(vec![Cell::new(metric), Cell::new(value)]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

fn score_color(result: &ScoredChunk) -> Color {
    if !result.score.is_ranked() {
        return Color::DarkGrey;
    }
    match result.score.value() {
        s if s >= 0.5 => Color::Green,
        s if s >= 0.2 => Color::Yellow,
        _ => Color::Red,
    }
}
