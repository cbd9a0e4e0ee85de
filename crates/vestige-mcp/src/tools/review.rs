//! Review Tool
//!
//! Mark a memory as reviewed, feeding a rating into the FSRS-6 scheduler and
//! the importance tracker's usage history in one step.

use serde::Deserialize;
use serde_json::Value;

use vestige_core::{Clock, Rating, VestigeEngine};

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": {
                "type": "string",
                "description": "The ID of the memory to review"
            },
            "rating": {
                "type": "integer",
                "description": "Review rating: 1=Again (forgot), 2=Hard, 3=Good, 4=Easy",
                "minimum": 1,
                "maximum": 4,
                "default": 3
            }
        },
        "required": ["id"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewArgs {
    id: String,
    rating: Option<i32>,
}

pub fn execute<C: Clock>(engine: &VestigeEngine<C>, args: Option<Value>) -> Result<Value, String> {
    let args: ReviewArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("Invalid arguments: {}", e))?,
        None => return Err("Missing arguments".to_string()),
    };

    uuid::Uuid::parse_str(&args.id).map_err(|_| "Invalid node ID format".to_string())?;

    let rating_value = args.rating.unwrap_or(3);
    if !(1..=4).contains(&rating_value) {
        return Err("Rating must be between 1 and 4".to_string());
    }
    let rating = Rating::from_i32(rating_value).ok_or_else(|| "Invalid rating value".to_string())?;

    let before = engine
        .storage()
        .get_node(&args.id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Node not found: {}", args.id))?;
    let before_retention = engine.storage().retrievability(&before, engine.clock().now());

    let node = engine.review(&args.id, rating).map_err(|e| e.to_string())?;
    let after_retention = engine.storage().retrievability(&node, engine.clock().now());

    let rating_name = match rating {
        Rating::Again => "Again",
        Rating::Hard => "Hard",
        Rating::Good => "Good",
        Rating::Easy => "Easy",
    };

    Ok(serde_json::json!({
        "success": true,
        "nodeId": node.id,
        "rating": rating_name,
        "fsrs": {
            "previousRetention": before_retention,
            "newRetention": after_retention,
            "previousStability": before.stability,
            "newStability": node.stability,
            "difficulty": node.difficulty,
            "reps": node.reps,
            "lapses": node.lapses,
        },
        "nextReview": node.next_review.map(|d| d.to_rfc3339()),
        "message": format!(
            "Memory reviewed with rating '{}'. Retention: {:.2} -> {:.2}",
            rating_name, before_retention, after_retention
        ),
    }))
}
