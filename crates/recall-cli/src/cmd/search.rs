//! `recall search`: hybrid search over stored memories.
//!
//! Fuses FTS5/BM25 ranking with embedding similarity via reciprocal rank
//! fusion. When the vector leg cannot run the results are lexical only, and
//! when the FTS index is missing or rejects the query, substring matching
//! stands in.

use std::io::Write;

use clap::Args;
use recall_search::{
    ContentMode, LexicalMode, ResultRecord, SearchQuery, SearchReport, SkipReason, VectorOutcome,
};
use serde::Serialize;
use tracing::info;

use super::{Session, UsageError};
use crate::output::{OutputMode, render, rule};

#[derive(Args, Debug)]
#[command(
    about = "Search memories",
    long_about = "Search memories with hybrid ranking (lexical BM25 fused with embedding similarity).\n\n\
                  FTS5 syntax is supported for the lexical leg: stemming, prefix search ('auth*'), \
                  boolean operators (AND, OR, NOT).",
    after_help = "EXAMPLES:\n    # Search everything\n    recall search 'deploy checklist'\n\n\
                  # Only notes in one category, full content\n    recall search postgres --category infra --full\n\n\
                  # Show how each result was ranked\n    recall search postgres --explain --json"
)]
pub struct SearchArgs {
    /// Search query. FTS5 syntax supported.
    pub query: String,

    /// Maximum number of results (defaults to `search.default_limit`).
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Only return memories in this category.
    #[arg(long)]
    pub category: Option<String>,

    /// Return full content instead of the condensed form.
    #[arg(long)]
    pub full: bool,

    /// Skip the semantic leg.
    #[arg(long)]
    pub lexical: bool,

    /// Include per-leg ranks and how each leg behaved.
    #[arg(long)]
    pub explain: bool,
}

impl SearchArgs {
    /// Reject input that can never match, before config or store access.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::EmptyQuery`] for a blank query.
    pub fn check(&self) -> Result<(), UsageError> {
        if self.query.trim().is_empty() {
            return Err(UsageError::EmptyQuery);
        }
        Ok(())
    }

    fn to_query(&self, default_limit: usize) -> SearchQuery {
        SearchQuery::new(self.query.clone())
            .with_limit(self.limit.unwrap_or(default_limit))
            .with_category(self.category.clone())
            .with_content(if self.full {
                ContentMode::Full
            } else {
                ContentMode::Summary
            })
            .lexical_only(self.lexical)
    }
}

/// JSON envelope for search output.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub count: usize,
    pub results: Vec<ResultRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SearchReport>,
}

/// Execute `recall search <query>`.
///
/// # Errors
///
/// Returns an error if the query is blank, config or store resolution
/// fails, the store is unreachable, or output rendering fails.
pub fn run_search(args: &SearchArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    args.check()?;

    let coordinator = session.coordinator();
    let query = args.to_query(session.config.search.default_limit);
    let outcome = coordinator.search_with_report(&query)?;
    info!(
        results = outcome.results.len(),
        store = %session.store().display(),
        "search finished"
    );

    let mut results = outcome.results;
    if !args.explain {
        for r in &mut results {
            r.lexical_rank = None;
            r.vector_rank = None;
        }
    }

    let search_output = SearchOutput {
        query: args.query.clone(),
        count: results.len(),
        results,
        report: args.explain.then_some(outcome.report),
    };

    render(output, &search_output, render_search_human)
}

fn render_search_human(out: &SearchOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if out.results.is_empty() {
        writeln!(w, "No results for '{}'", out.query)?;
    } else {
        writeln!(w, "{} result(s) for '{}':", out.count, out.query)?;
        for (i, r) in out.results.iter().enumerate() {
            rule(w)?;
            writeln!(w, "{}. {}  [{}]  score={:.6}", i + 1, r.title, r.category, r.score)?;
            if !r.source.is_empty() {
                writeln!(w, "   source: {}", r.source)?;
            }
            if let Some(rank) = r.lexical_rank {
                writeln!(w, "   lexical rank: {}", rank + 1)?;
            }
            if let Some(rank) = r.vector_rank {
                writeln!(w, "   vector rank: {}", rank + 1)?;
            }
            if !r.summary.is_empty() {
                writeln!(w, "   {}", r.summary)?;
            }
            if !r.content.is_empty() {
                writeln!(w)?;
                for line in r.content.lines() {
                    writeln!(w, "   {line}")?;
                }
            }
        }
    }

    if let Some(report) = &out.report {
        rule(w)?;
        let lexical = match report.lexical_mode {
            LexicalMode::Ranked => "ranked (fts5)",
            LexicalMode::Substring => "substring fallback",
        };
        writeln!(w, "lexical: {lexical}, {} candidates", report.lexical_candidates)?;
        match report.vector {
            VectorOutcome::Ran => {
                writeln!(w, "vector:  ran, {} candidates", report.vector_candidates)?;
            }
            VectorOutcome::Skipped(reason) => {
                writeln!(w, "vector:  skipped ({})", skip_reason_text(reason))?;
            }
        }
    }
    Ok(())
}

const fn skip_reason_text(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Disabled => "semantic search disabled",
        SkipReason::NoEmbedder => "no embedding provider configured",
        SkipReason::CapabilityUnavailable => "store has no vector support",
        SkipReason::EmbeddingUnavailable => "embedding service gave no vector",
        SkipReason::SearchFailed => "vector query failed",
        SkipReason::ZeroLimit => "zero results requested",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: SearchArgs,
    }

    #[test]
    fn defaults_come_from_config() {
        let w = Wrapper::parse_from(["test", "watson"]);
        let q = w.args.to_query(7);
        assert_eq!(q.text, "watson");
        assert_eq!(q.limit, 7);
        assert_eq!(q.content, ContentMode::Summary);
        assert!(q.filter.category.is_none());
        assert!(!q.lexical_only);
    }

    #[test]
    fn flags_shape_the_query() {
        let w = Wrapper::parse_from([
            "test",
            "auth*",
            "-n",
            "3",
            "--category",
            "infra",
            "--full",
            "--lexical",
        ]);
        let q = w.args.to_query(5);
        assert_eq!(q.limit, 3);
        assert_eq!(q.filter.category.as_deref(), Some("infra"));
        assert_eq!(q.content, ContentMode::Full);
        assert!(q.lexical_only);
    }

    #[test]
    fn blank_query_is_a_usage_error() {
        let w = Wrapper::parse_from(["test", "  "]);
        assert!(matches!(w.args.check(), Err(UsageError::EmptyQuery)));
        assert!(Wrapper::parse_from(["test", "x"]).args.check().is_ok());
    }

    #[test]
    fn human_output_lists_results() {
        let out = SearchOutput {
            query: "baker".into(),
            count: 1,
            results: vec![ResultRecord {
                id: "1".into(),
                score: 0.032_522,
                title: "Baker Street".into(),
                summary: String::new(),
                category: "places".into(),
                source: "casebook.md".into(),
                content: "221B".into(),
                lexical_rank: Some(0),
                vector_rank: None,
            }],
            report: None,
        };
        let mut buf = Vec::new();
        render_search_human(&out, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("1. Baker Street  [places]  score=0.032522"));
        assert!(text.contains("source: casebook.md"));
        assert!(text.contains("lexical rank: 1"));
        assert!(!text.contains("vector rank"));
    }

    #[test]
    fn human_output_for_no_results() {
        let out = SearchOutput {
            query: "nothing".into(),
            count: 0,
            results: Vec::new(),
            report: None,
        };
        let mut buf = Vec::new();
        render_search_human(&out, &mut buf).expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "No results for 'nothing'\n");
    }

    #[test]
    fn explain_footer_names_skip_reason() {
        let out = SearchOutput {
            query: "q".into(),
            count: 0,
            results: Vec::new(),
            report: Some(SearchReport {
                lexical_mode: LexicalMode::Substring,
                lexical_candidates: 0,
                vector: VectorOutcome::Skipped(SkipReason::NoEmbedder),
                vector_candidates: 0,
                capability: recall_search::VectorCapability::Unprobed,
            }),
        };
        let mut buf = Vec::new();
        render_search_human(&out, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("lexical: substring fallback, 0 candidates"));
        assert!(text.contains("vector:  skipped (no embedding provider configured)"));
    }
}
