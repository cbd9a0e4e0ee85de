//! Keyword search via SQLite FTS5 (BM25 ranking).
//!
//! Builds sanitized MATCH queries and optional filter clauses, with a plain
//! substring fallback when the FTS5 query syntax rejects the user's input
//! (unbalanced quotes, bare operators, etc).

use chrono::{DateTime, Utc};

/// Characters FTS5's query syntax treats specially; escaping or stripping
/// these lets arbitrary user text be used as a MATCH argument safely.
const FTS5_SPECIAL: &[char] = &['"', '*', ':', '(', ')', '^', '-'];

/// Rewrites free text into a syntactically-safe FTS5 MATCH expression: each
/// token is double-quoted (escaping embedded quotes) and joined with
/// implicit AND, so special characters can't break out of a term.
pub fn sanitize_fts5_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|token| {
            let cleaned: String = token.chars().filter(|c| !FTS5_SPECIAL.contains(c)).collect();
            cleaned
        })
        .filter(|token| !token.is_empty())
        .map(|token| format!("\"{}\"", token.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Optional filters applied alongside an FTS5 MATCH clause.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    pub node_type: Option<String>,
    pub tags: Vec<String>,
    pub valid_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

/// A SQL fragment plus its positional parameters, built independently of any
/// particular `rusqlite` connection so it can be unit tested without a
/// database.
#[derive(Debug, Clone, Default)]
pub struct FilterClause {
    pub sql: String,
    pub params: Vec<String>,
}

impl KeywordFilter {
    /// Builds a `WHERE`-clause-appendable fragment (starting with `AND`) for
    /// the set filters. Empty when no filter is set.
    pub fn build_clause(&self) -> FilterClause {
        let mut parts = Vec::new();
        let mut params = Vec::new();

        if let Some(node_type) = &self.node_type {
            parts.push("node_type = ?".to_string());
            params.push(node_type.clone());
        }

        for tag in &self.tags {
            parts.push("tags LIKE ?".to_string());
            params.push(format!("%{}%", tag));
        }

        if let Some(valid_at) = self.valid_at {
            parts.push("(valid_from IS NULL OR valid_from <= ?)".to_string());
            params.push(valid_at.to_rfc3339());
            parts.push("(valid_until IS NULL OR valid_until > ?)".to_string());
            params.push(valid_at.to_rfc3339());
        }

        if let Some(source) = &self.source {
            parts.push("source = ?".to_string());
            params.push(source.clone());
        }

        if parts.is_empty() {
            return FilterClause::default();
        }

        FilterClause {
            sql: format!(" AND {}", parts.join(" AND ")),
            params,
        }
    }
}

/// Converts an FTS5 `bm25()` rank (negative, more negative = better match)
/// into a positive `[0, 1]`-ish relevance score comparable to cosine
/// similarity from vector search.
pub fn rank_to_score(bm25_rank: f64) -> f32 {
    // bm25() returns increasingly negative values for better matches.
    let magnitude = (-bm25_rank).max(0.0);
    (1.0 - (1.0 / (1.0 + magnitude))) as f32
}

/// Builds a `LIKE`-based fallback predicate for when the sanitized MATCH
/// query still fails to parse (callers catch the FTS5 syntax error and
/// retry with this instead).
pub fn like_fallback_pattern(query: &str) -> String {
    format!("%{}%", query.replace('%', "").replace('_', ""))
}
