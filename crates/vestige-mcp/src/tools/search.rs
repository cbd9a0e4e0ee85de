//! Search Tool
//!
//! Recall memories by keyword, semantic similarity, or hybrid fusion of the
//! two, reranked by recency, retention, importance, and keyword overlap.

use serde::Deserialize;
use serde_json::Value;

use vestige_core::{Clock, MatchType, RecallInput, SearchMode, VestigeEngine};

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Search query"
            },
            "limit": {
                "type": "integer",
                "description": "Maximum number of results",
                "default": 10,
                "minimum": 1,
                "maximum": 50
            },
            "searchMode": {
                "type": "string",
                "description": "keyword, semantic, or hybrid (default)",
                "enum": ["keyword", "semantic", "hybrid"],
                "default": "hybrid"
            },
            "minRetention": {
                "type": "number",
                "description": "Minimum derived retrievability, 0.0-1.0",
                "default": 0.0,
                "minimum": 0.0,
                "maximum": 1.0
            },
            "nodeType": {
                "type": "string",
                "description": "Restrict results to a single node type"
            },
            "tags": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Restrict results to nodes carrying any of these tags"
            }
        },
        "required": ["query"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    query: String,
    #[serde(default)]
    limit: Option<i32>,
    #[serde(default)]
    search_mode: Option<String>,
    #[serde(default)]
    min_retention: f64,
    #[serde(default)]
    node_type: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

fn parse_search_mode(s: &str) -> SearchMode {
    match s.to_lowercase().as_str() {
        "keyword" => SearchMode::Keyword,
        "semantic" => SearchMode::Semantic,
        _ => SearchMode::Hybrid,
    }
}

pub fn execute<C: Clock>(engine: &VestigeEngine<C>, args: Option<Value>) -> Result<Value, String> {
    let args: SearchArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("Invalid arguments: {}", e))?,
        None => return Err("Missing arguments".to_string()),
    };

    if args.query.trim().is_empty() {
        return Err("Query cannot be empty".to_string());
    }

    let input = RecallInput {
        query: args.query.clone(),
        limit: args.limit.unwrap_or(10).clamp(1, 50),
        min_retention: args.min_retention.clamp(0.0, 1.0),
        search_mode: args
            .search_mode
            .as_deref()
            .map(parse_search_mode)
            .unwrap_or_default(),
        valid_at: None,
        node_type: args.node_type,
        tags: args.tags,
    };

    let results = engine.recall(input, None).map_err(|e| e.to_string())?;

    let formatted: Vec<Value> = results
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.node.id,
                "content": r.node.content,
                "nodeType": r.node.node_type,
                "tags": r.node.tags,
                "combinedScore": r.combined_score,
                "keywordScore": r.keyword_score,
                "semanticScore": r.semantic_score,
                "matchType": match r.match_type {
                    MatchType::Keyword => "keyword",
                    MatchType::Semantic => "semantic",
                    MatchType::Both => "both",
                },
            })
        })
        .collect();

    Ok(serde_json::json!({
        "query": args.query,
        "total": formatted.len(),
        "results": formatted,
    }))
}
