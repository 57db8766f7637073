//! Uniform output records.
//!
//! Every backend's rows become the same shape: missing text fields are empty
//! strings, scores carry six decimals, and content is cut to the display
//! length whichever content mode was asked for.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::backend::CandidateRecord;
use crate::fusion::rrf::FusedHit;
use crate::query::ContentMode;

/// Default maximum characters of content per result.
pub const DEFAULT_DISPLAY_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    /// Fused RRF score rounded to six decimals.
    pub score: f64,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub source: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexical_rank: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_rank: Option<usize>,
}

/// Build output records for `fused`, in order, from the cached leg rows.
///
/// Ids with no cached row are dropped; fusion only emits ids the legs
/// returned, so that only happens on a leg contract violation.
#[must_use]
pub fn shape(
    fused: &[FusedHit],
    cache: &HashMap<String, CandidateRecord>,
    mode: ContentMode,
    display_chars: usize,
) -> Vec<ResultRecord> {
    fused
        .iter()
        .filter_map(|hit| {
            let row = cache.get(&hit.id)?;
            Some(ResultRecord {
                id: hit.id.clone(),
                score: round_score(hit.score),
                title: row.title.clone().unwrap_or_default(),
                summary: row.summary.clone().unwrap_or_default(),
                category: row.category.clone().unwrap_or_default(),
                source: row.source.clone().unwrap_or_default(),
                content: truncate_chars(select_content(row, mode), display_chars),
                lexical_rank: hit.lexical_rank,
                vector_rank: hit.vector_rank,
            })
        })
        .collect()
}

/// Round to six decimal places.
#[must_use]
pub fn round_score(score: f64) -> f64 {
    (score * 1_000_000.0).round() / 1_000_000.0
}

fn select_content(row: &CandidateRecord, mode: ContentMode) -> &str {
    let full = row.content.as_deref().unwrap_or("");
    match mode {
        ContentMode::Full => full,
        ContentMode::Summary => row
            .content_pyramid
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(full),
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, content: Option<&str>, pyramid: Option<&str>) -> CandidateRecord {
        CandidateRecord {
            id: id.to_string(),
            title: Some(format!("title {id}")),
            summary: None,
            category: Some("notes".into()),
            source: None,
            content: content.map(String::from),
            content_pyramid: pyramid.map(String::from),
            native_score: -1.5,
        }
    }

    fn hit(id: &str, score: f64) -> FusedHit {
        FusedHit {
            id: id.to_string(),
            score,
            lexical_rank: Some(0),
            vector_rank: None,
        }
    }

    fn cache(rows: Vec<CandidateRecord>) -> HashMap<String, CandidateRecord> {
        rows.into_iter().map(|r| (r.id.clone(), r)).collect()
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let cache = cache(vec![row("1", None, None)]);
        let out = shape(&[hit("1", 1.0 / 61.0)], &cache, ContentMode::Summary, 800);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].summary, "");
        assert_eq!(out[0].source, "");
        assert_eq!(out[0].content, "");
        assert_eq!(out[0].title, "title 1");
    }

    #[test]
    fn score_has_six_decimals() {
        assert!((round_score(1.0 / 61.0) - 0.016_393).abs() < 1e-12);
        assert!((round_score(1.0 / 61.0 + 1.0 / 62.0) - 0.032_522).abs() < 1e-12);
    }

    #[test]
    fn summary_mode_prefers_pyramid() {
        let cache = cache(vec![
            row("1", Some("full text"), Some("condensed")),
            row("2", Some("full text"), Some("")),
            row("3", Some("full text"), None),
        ]);
        let fused = [hit("1", 0.3), hit("2", 0.2), hit("3", 0.1)];

        let summary = shape(&fused, &cache, ContentMode::Summary, 800);
        let contents: Vec<&str> = summary.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["condensed", "full text", "full text"]);

        let full = shape(&fused, &cache, ContentMode::Full, 800);
        assert!(full.iter().all(|r| r.content == "full text"));
    }

    #[test]
    fn truncates_in_both_modes() {
        let long = "x".repeat(2_000);
        let cache = cache(vec![row("1", Some(&long), Some(&long))]);
        for mode in [ContentMode::Summary, ContentMode::Full] {
            let out = shape(&[hit("1", 0.1)], &cache, mode, DEFAULT_DISPLAY_CHARS);
            assert_eq!(out[0].content.chars().count(), DEFAULT_DISPLAY_CHARS);
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 800), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn preserves_fused_order_and_ranks() {
        let cache = cache(vec![row("a", None, None), row("b", None, None)]);
        let fused = [
            FusedHit {
                id: "b".into(),
                score: 0.2,
                lexical_rank: None,
                vector_rank: Some(0),
            },
            hit("a", 0.1),
        ];
        let out = shape(&fused, &cache, ContentMode::Summary, 800);
        assert_eq!(out[0].id, "b");
        assert_eq!(out[0].vector_rank, Some(0));
        assert_eq!(out[0].lexical_rank, None);
        assert_eq!(out[1].id, "a");
    }

    #[test]
    fn json_omits_absent_ranks() {
        let cache = cache(vec![row("1", Some("c"), None)]);
        let out = shape(&[hit("1", 0.5)], &cache, ContentMode::Summary, 800);
        let json = serde_json::to_value(&out[0]).expect("serialize");
        assert_eq!(json["lexical_rank"], 0);
        assert!(json.get("vector_rank").is_none());
        assert_eq!(json["category"], "notes");
    }
}
