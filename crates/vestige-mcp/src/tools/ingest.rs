//! Ingest Tool
//!
//! Add a new fact to memory. Importance is seeded from sentiment magnitude
//! and, when embeddings are enabled, the content is embedded and indexed for
//! semantic recall immediately.

use serde::Deserialize;
use serde_json::Value;

use vestige_core::{Clock, IngestInput, VestigeEngine};

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": "The content to remember"
            },
            "nodeType": {
                "type": "string",
                "description": "Type of knowledge: fact, concept, procedure, event, relationship, quote, code, question, insight, pattern, decision, manual",
                "default": "fact"
            },
            "tags": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Tags for categorization"
            },
            "source": {
                "type": "string",
                "description": "Source or reference for this knowledge"
            },
            "sentimentScore": {
                "type": "number",
                "description": "Sentiment polarity, -1.0 to 1.0",
                "default": 0.0
            },
            "sentimentMagnitude": {
                "type": "number",
                "description": "Sentiment intensity, 0.0 to 1.0. Boosts initial importance and stability growth.",
                "default": 0.0
            }
        },
        "required": ["content"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestArgs {
    content: String,
    #[serde(default)]
    node_type: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    sentiment_score: f64,
    #[serde(default)]
    sentiment_magnitude: f64,
}

pub fn execute<C: Clock>(engine: &VestigeEngine<C>, args: Option<Value>) -> Result<Value, String> {
    let args: IngestArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("Invalid arguments: {}", e))?,
        None => return Err("Missing arguments".to_string()),
    };

    if args.content.trim().is_empty() {
        return Err("Content cannot be empty".to_string());
    }
    if args.content.len() > 1_000_000 {
        return Err("Content too large (max 1MB)".to_string());
    }

    let input = IngestInput {
        content: args.content,
        node_type: args.node_type.unwrap_or_else(|| "fact".to_string()),
        source: args.source,
        sentiment_score: args.sentiment_score,
        sentiment_magnitude: args.sentiment_magnitude,
        tags: args.tags,
        ..Default::default()
    };

    let node = engine.ingest(input).map_err(|e| e.to_string())?;

    Ok(serde_json::json!({
        "success": true,
        "nodeId": node.id,
        "nodeType": node.node_type,
        "hasEmbedding": node.has_embedding.unwrap_or(false),
        "message": format!("Knowledge ingested successfully. Node ID: {}", node.id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vestige_core::{Storage, VirtualClock};

    fn test_engine() -> VestigeEngine<VirtualClock> {
        VestigeEngine::new(Storage::in_memory().unwrap(), VirtualClock::new(Utc::now()))
    }

    #[test]
    fn ingest_empty_content_fails() {
        let engine = test_engine();
        let args = serde_json::json!({ "content": "" });
        let result = execute(&engine, Some(args));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("empty"));
    }

    #[test]
    fn ingest_whitespace_only_content_fails() {
        let engine = test_engine();
        let args = serde_json::json!({ "content": "   \n\t  " });
        let result = execute(&engine, Some(args));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("empty"));
    }

    #[test]
    fn ingest_missing_arguments_fails() {
        let engine = test_engine();
        let result = execute(&engine, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Missing arguments"));
    }

    #[test]
    fn ingest_large_content_fails() {
        let engine = test_engine();
        let large_content = "x".repeat(1_000_001);
        let args = serde_json::json!({ "content": large_content });
        let result = execute(&engine, Some(args));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("too large"));
    }

    #[test]
    fn ingest_basic_content_succeeds() {
        let engine = test_engine();
        let args = serde_json::json!({ "content": "This is a test fact to remember." });
        let result = execute(&engine, Some(args));
        assert!(result.is_ok());
        let value = result.unwrap();
        assert_eq!(value["success"], true);
        assert!(value["nodeId"].is_string());
    }

    #[test]
    fn ingest_with_node_type_and_tags() {
        let engine = test_engine();
        let args = serde_json::json!({
            "content": "Error handling should use Result<T, E>.",
            "nodeType": "pattern",
            "tags": ["rust", "errors"],
        });
        let result = execute(&engine, Some(args));
        assert!(result.is_ok());
        assert_eq!(result.unwrap()["nodeType"], "pattern");
    }

    #[test]
    fn schema_has_required_fields() {
        let schema_value = schema();
        assert_eq!(schema_value["type"], "object");
        assert!(schema_value["properties"]["content"].is_object());
        assert!(
            schema_value["required"]
                .as_array()
                .unwrap()
                .contains(&serde_json::json!("content"))
        );
    }
}
