//! SQLite Storage Implementation
//!
//! Core storage layer: CRUD for knowledge nodes and graph edges, FSRS-6
//! review persistence, and the keyword/semantic/hybrid search primitives the
//! orchestrator composes into ranked results.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use crate::fsrs::{FSRSScheduler, FSRSState, LearningState, Rating};
use crate::memory::{EdgeType, IngestInput, KnowledgeEdge, KnowledgeNode, MemoryStats, NodeType};
use crate::search::{KeywordFilter, like_fallback_pattern, rank_to_score, sanitize_fts5_query};

#[cfg(feature = "vector-search")]
use crate::search::VectorIndex;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Node not found
    #[error("Node not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored timestamp failed to parse
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed storage with integrated vector search.
///
/// Uses separate reader/writer connections for interior mutability. All
/// methods take `&self`, making `Storage` `Send + Sync` so callers can share
/// it behind `Arc` instead of `Arc<Mutex<Storage>>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    scheduler: FSRSScheduler,
    #[cfg(feature = "vector-search")]
    vector_index: Mutex<VectorIndex>,
}

impl Storage {
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Opens (creating if necessary) the database at `db_path`, or the
    /// platform data directory's default path when `None`.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("dev", "vestige", "vestige").ok_or_else(|| {
                    StorageError::Init("could not determine project directories".to_string())
                })?;
                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(data_dir, perms);
                }
                data_dir.join("vestige.db")
            }
        };

        let writer_conn = Connection::open(&path)?;

        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        #[cfg(feature = "vector-search")]
        let vector_index = VectorIndex::new()
            .map_err(|e| StorageError::Init(format!("failed to create vector index: {e}")))?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            scheduler: FSRSScheduler::default(),
            #[cfg(feature = "vector-search")]
            vector_index: Mutex::new(vector_index),
        })
    }

    /// Opens an in-memory database, for tests.
    pub fn in_memory() -> Result<Self> {
        let writer_conn = Connection::open_in_memory()?;
        Self::configure_connection(&writer_conn)?;
        super::migrations::apply_migrations(&writer_conn)?;
        let reader_conn = Connection::open_in_memory()?;
        Self::configure_connection(&reader_conn)?;
        super::migrations::apply_migrations(&reader_conn)?;

        #[cfg(feature = "vector-search")]
        let vector_index = VectorIndex::new()
            .map_err(|e| StorageError::Init(format!("failed to create vector index: {e}")))?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            scheduler: FSRSScheduler::default(),
            #[cfg(feature = "vector-search")]
            vector_index: Mutex::new(vector_index),
        })
    }

    pub fn scheduler(&self) -> &FSRSScheduler {
        &self.scheduler
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("reader lock poisoned".into()))
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    fn parse_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("invalid timestamp '{value}': {e}"),
                    )),
                )
            })
    }

    fn parse_optional_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
        value.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
    }

    fn parse_json_list(value: &str) -> Vec<String> {
        serde_json::from_str(value).unwrap_or_default()
    }

    fn row_to_node(row: &rusqlite::Row) -> rusqlite::Result<KnowledgeNode> {
        let learning_state: String = row.get("learning_state")?;
        let learning_state = match learning_state.as_str() {
            "learning" => LearningState::Learning,
            "review" => LearningState::Review,
            "relearning" => LearningState::Relearning,
            _ => LearningState::New,
        };

        let has_embedding: i32 = row.get("has_embedding")?;

        Ok(KnowledgeNode {
            id: row.get("id")?,
            content: row.get("content")?,
            summary: row.get("summary")?,
            node_type: row.get("node_type")?,
            created_at: Self::parse_timestamp(&row.get::<_, String>("created_at")?)?,
            updated_at: Self::parse_timestamp(&row.get::<_, String>("updated_at")?)?,
            last_accessed: Self::parse_timestamp(&row.get::<_, String>("last_accessed")?)?,
            state: learning_state,
            stability: row.get("stability")?,
            difficulty: row.get("difficulty")?,
            reps: row.get("reps")?,
            lapses: row.get("lapses")?,
            scheduled_days: row.get("scheduled_days")?,
            last_review: Self::parse_optional_timestamp(row.get("last_review")?),
            next_review: Self::parse_optional_timestamp(row.get("next_review")?),
            sentiment_score: row.get("sentiment_score")?,
            sentiment_magnitude: row.get("sentiment_magnitude")?,
            confidence: row.get("confidence")?,
            is_contradicted: row.get::<_, i32>("is_contradicted")? == 1,
            contradiction_ids: Self::parse_json_list(&row.get::<_, String>("contradiction_ids")?),
            source_chain: Self::parse_json_list(&row.get::<_, String>("source_chain")?),
            source: row.get("source")?,
            source_platform: row.get("source_platform")?,
            tags: Self::parse_json_list(&row.get::<_, String>("tags")?),
            people: Self::parse_json_list(&row.get::<_, String>("people")?),
            concepts: Self::parse_json_list(&row.get::<_, String>("concepts")?),
            events: Self::parse_json_list(&row.get::<_, String>("events")?),
            valid_from: Self::parse_optional_timestamp(row.get("valid_from")?),
            valid_until: Self::parse_optional_timestamp(row.get("valid_until")?),
            utility_score: row.get("utility_score")?,
            access_count: row.get("access_count")?,
            times_useful: row.get("times_useful")?,
            has_embedding: Some(has_embedding == 1),
            embedding_model: row.get("embedding_model")?,
        })
    }

    // ========================================================================
    // INGEST / READ / UPDATE / DELETE
    // ========================================================================

    /// Creates a new memory. When `input.supersedes` names an existing node,
    /// that node is closed out (`valid_until = now`) and a `Supersedes` edge
    /// is recorded from the new node to it.
    pub fn ingest(&self, input: IngestInput, now: DateTime<Utc>) -> Result<KnowledgeNode> {
        let id = Uuid::new_v4().to_string();
        let next_review = now;
        let mut seen_tags = std::collections::HashSet::new();
        let deduped_tags: Vec<String> = input
            .tags
            .iter()
            .cloned()
            .filter(|tag| seen_tags.insert(tag.clone()))
            .collect();
        let tags_json = serde_json::to_string(&deduped_tags).unwrap_or_else(|_| "[]".into());
        let people_json = serde_json::to_string(&input.people).unwrap_or_else(|_| "[]".into());
        let concepts_json = serde_json::to_string(&input.concepts).unwrap_or_else(|_| "[]".into());
        let events_json = serde_json::to_string(&input.events).unwrap_or_else(|_| "[]".into());

        let mut source_chain: Vec<String> = Vec::new();
        if let Some(old_id) = &input.supersedes {
            source_chain.push(old_id.clone());
        }
        let source_chain_json = serde_json::to_string(&source_chain).unwrap_or_else(|_| "[]".into());

        {
            let writer = self.writer()?;
            writer.execute(
                "INSERT INTO knowledge_nodes (
                    id, content, node_type, created_at, updated_at, last_accessed,
                    learning_state, stability, difficulty, reps, lapses, scheduled_days,
                    next_review, sentiment_score, sentiment_magnitude, source, source_platform,
                    tags, people, concepts, events, valid_from, valid_until,
                    source_chain, has_embedding
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6,
                    'new', 0.0, 0.0, 0, 0, 0.0,
                    ?7, ?8, ?9, ?10, ?11,
                    ?12, ?13, ?14, ?15, ?16, ?17,
                    ?18, 0
                )",
                params![
                    id,
                    input.content,
                    input.node_type,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                    next_review.to_rfc3339(),
                    input.sentiment_score,
                    input.sentiment_magnitude,
                    input.source,
                    input.source_platform,
                    tags_json,
                    people_json,
                    concepts_json,
                    events_json,
                    input.valid_from.map(|d| d.to_rfc3339()),
                    input.valid_until.map(|d| d.to_rfc3339()),
                    source_chain_json,
                ],
            )?;

            if let Some(old_id) = &input.supersedes {
                let existing_contradictions: String = writer
                    .query_row(
                        "SELECT contradiction_ids FROM knowledge_nodes WHERE id = ?1",
                        params![old_id],
                        |row| row.get(0),
                    )
                    .optional()?
                    .unwrap_or_else(|| "[]".to_string());
                let mut contradiction_ids = Self::parse_json_list(&existing_contradictions);
                contradiction_ids.push(id.clone());
                let contradiction_ids_json =
                    serde_json::to_string(&contradiction_ids).unwrap_or_else(|_| "[]".into());

                writer.execute(
                    "UPDATE knowledge_nodes
                     SET valid_until = ?1, updated_at = ?2, is_contradicted = 1, contradiction_ids = ?3
                     WHERE id = ?4",
                    params![now.to_rfc3339(), now.to_rfc3339(), contradiction_ids_json, old_id],
                )?;
                let edge = KnowledgeEdge {
                    id: Uuid::new_v4().to_string(),
                    source_id: id.clone(),
                    target_id: old_id.clone(),
                    edge_type: EdgeType::Supersedes,
                    weight: 1.0,
                    valid_from: Some(now),
                    valid_until: None,
                    created_at: now,
                    created_by: Some("ingest".to_string()),
                    confidence: 1.0,
                    metadata: None,
                };
                Self::insert_edge(&writer, &edge)?;
            }
        }

        self.get_node(&id)?.ok_or(StorageError::NotFound(id))
    }

    pub fn get_node(&self, id: &str) -> Result<Option<KnowledgeNode>> {
        let reader = self.reader()?;
        let node = reader
            .prepare("SELECT * FROM knowledge_nodes WHERE id = ?1")?
            .query_row(params![id], Self::row_to_node)
            .optional()?;
        Ok(node)
    }

    pub fn update_node_content(&self, id: &str, new_content: &str, now: DateTime<Utc>) -> Result<()> {
        let writer = self.writer()?;
        let changed = writer.execute(
            "UPDATE knowledge_nodes SET content = ?1, updated_at = ?2 WHERE id = ?3",
            params![new_content, now.to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn delete_node(&self, id: &str) -> Result<bool> {
        let writer = self.writer()?;
        let changed = writer.execute("DELETE FROM knowledge_nodes WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn list_nodes(&self, limit: i32, offset: i32) -> Result<Vec<KnowledgeNode>> {
        let reader = self.reader()?;
        let mut stmt = reader
            .prepare("SELECT * FROM knowledge_nodes ORDER BY created_at DESC LIMIT ?1 OFFSET ?2")?;
        let rows = stmt.query_map(params![limit, offset], Self::row_to_node)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Nodes originating from a given platform/tool (`source_platform`).
    pub fn list_by_source_type(&self, source_platform: &str, limit: i32) -> Result<Vec<KnowledgeNode>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT * FROM knowledge_nodes WHERE source_platform = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![source_platform, limit], Self::row_to_node)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Nodes with at least one tag starting with `prefix`. Filtered in Rust
    /// since tags are stored as a JSON array, not a normalized table.
    pub fn search_by_tag_prefix(&self, prefix: &str, limit: i32) -> Result<Vec<KnowledgeNode>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM knowledge_nodes ORDER BY created_at DESC")?;
        let rows = stmt.query_map([], Self::row_to_node)?;
        let mut matches = Vec::new();
        for row in rows {
            let node = row?;
            if node.tags.iter().any(|t| t.starts_with(prefix)) {
                matches.push(node);
                if matches.len() as i32 >= limit {
                    break;
                }
            }
        }
        Ok(matches)
    }

    // ========================================================================
    // REVIEW (FSRS-6)
    // ========================================================================

    pub fn mark_reviewed(&self, id: &str, rating: Rating, now: DateTime<Utc>) -> Result<KnowledgeNode> {
        let node = self
            .get_node(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        let state = FSRSState {
            state: node.state,
            stability: node.stability,
            difficulty: node.difficulty,
            reps: node.reps.max(0) as u32,
            lapses: node.lapses.max(0) as u32,
            last_review: node.last_review,
            scheduled_days: node.scheduled_days,
        };

        let result = self.scheduler.review(&state, rating, now, node.sentiment_magnitude);

        let writer = self.writer()?;
        writer.execute(
            "UPDATE knowledge_nodes SET
                stability = ?1, difficulty = ?2, reps = ?3, lapses = ?4,
                learning_state = ?5, last_review = ?6, next_review = ?7,
                scheduled_days = ?8, last_accessed = ?9, updated_at = ?9
             WHERE id = ?10",
            params![
                result.state.stability,
                result.state.difficulty,
                result.state.reps,
                result.state.lapses,
                learning_state_name(result.state.state),
                now.to_rfc3339(),
                result.next_review.to_rfc3339(),
                result.state.scheduled_days,
                now.to_rfc3339(),
                id,
            ],
        )?;
        drop(writer);

        self.get_node(id)?.ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Retrievability of a node at `now`, derived from stability — never
    /// persisted (see `KnowledgeNode`'s doc comment on the dropped
    /// dual-strength model).
    pub fn retrievability(&self, node: &KnowledgeNode, now: DateTime<Utc>) -> f64 {
        let state = FSRSState {
            state: node.state,
            stability: node.stability,
            difficulty: node.difficulty,
            reps: node.reps.max(0) as u32,
            lapses: node.lapses.max(0) as u32,
            last_review: node.last_review,
            scheduled_days: node.scheduled_days,
        };
        self.scheduler.current_retrievability(&state, now)
    }

    /// Records access without grading a review: bumps `access_count` and, if
    /// `useful` is known, `times_useful`. Drives the testing-effect signal
    /// the importance tracker's usage factor consumes.
    pub fn record_access(&self, id: &str, now: DateTime<Utc>, useful: Option<bool>) -> Result<()> {
        let writer = self.writer()?;
        writer.execute(
            "UPDATE knowledge_nodes SET
                last_accessed = ?1,
                access_count = access_count + 1,
                times_useful = times_useful + ?2
             WHERE id = ?3",
            params![now.to_rfc3339(), useful.unwrap_or(false) as i32, id],
        )?;
        Ok(())
    }

    /// Scans all nodes and reports how many crossed their review threshold;
    /// does not mutate stability (that only changes on an explicit review).
    pub fn decay_tick(&self, now: DateTime<Utc>) -> Result<(i64, i64)> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT next_review FROM knowledge_nodes")?;
        let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

        let mut processed = 0i64;
        let mut newly_due = 0i64;
        for row in rows {
            processed += 1;
            if let Some(next_review) = row?.and_then(|s| Self::parse_optional_timestamp(Some(s))) {
                if next_review <= now {
                    newly_due += 1;
                }
            } else {
                newly_due += 1;
            }
        }
        Ok((processed, newly_due))
    }

    // ========================================================================
    // KEYWORD / SEMANTIC / HYBRID SEARCH
    // ========================================================================

    pub fn keyword_search(
        &self,
        query: &str,
        filter: &KeywordFilter,
        limit: i32,
    ) -> Result<Vec<(KnowledgeNode, f32)>> {
        let sanitized = sanitize_fts5_query(query);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }
        let clause = filter.build_clause();

        let reader = self.reader()?;
        let sql = format!(
            "SELECT n.*, bm25(knowledge_fts) AS rank FROM knowledge_nodes n
             JOIN knowledge_fts fts ON n.rowid = fts.rowid
             WHERE knowledge_fts MATCH ?1{}
             ORDER BY rank LIMIT ?2",
            clause.sql
        );

        let attempt: rusqlite::Result<Vec<(KnowledgeNode, f32)>> = (|| {
            let mut stmt = reader.prepare(&sql)?;
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(sanitized.clone())];
            for p in &clause.params {
                params_vec.push(Box::new(p.clone()));
            }
            params_vec.push(Box::new(limit));
            let param_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();
            stmt.query_map(param_refs.as_slice(), |row| {
                let rank: f64 = row.get("rank")?;
                Ok((Self::row_to_node(row)?, rank_to_score(rank)))
            })?
            .collect()
        })();

        match attempt {
            Ok(results) => Ok(results),
            Err(_) => self.keyword_search_fallback(&reader, query, filter, limit),
        }
    }

    fn keyword_search_fallback(
        &self,
        reader: &Connection,
        query: &str,
        filter: &KeywordFilter,
        limit: i32,
    ) -> Result<Vec<(KnowledgeNode, f32)>> {
        let pattern = like_fallback_pattern(query);
        let clause = filter.build_clause();
        let sql = format!(
            "SELECT * FROM knowledge_nodes WHERE content LIKE ?1{} ORDER BY created_at DESC LIMIT ?2",
            clause.sql
        );
        let mut stmt = reader.prepare(&sql)?;
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(pattern)];
        for p in &clause.params {
            params_vec.push(Box::new(p.clone()));
        }
        params_vec.push(Box::new(limit));
        let param_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), |row| Ok((Self::row_to_node(row)?, 0.5f32)))?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    #[cfg(feature = "vector-search")]
    pub fn semantic_search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<(KnowledgeNode, f32)>> {
        let index = self
            .vector_index
            .lock()
            .map_err(|_| StorageError::Init("vector index lock poisoned".into()))?;
        let neighbors = index
            .search(query_embedding, limit)
            .map_err(|e| StorageError::Init(format!("vector search failed: {e}")))?;
        drop(index);

        let mut results = Vec::with_capacity(neighbors.len());
        for (id, similarity) in neighbors {
            if let Some(node) = self.get_node(&id)? {
                results.push((node, similarity));
            }
        }
        Ok(results)
    }

    #[cfg(feature = "vector-search")]
    pub fn index_embedding(&self, node_id: &str, embedding: &[f32]) -> Result<()> {
        let mut index = self
            .vector_index
            .lock()
            .map_err(|_| StorageError::Init("vector index lock poisoned".into()))?;
        index
            .add(node_id, embedding)
            .map_err(|e| StorageError::Init(format!("failed to index embedding: {e}")))?;
        drop(index);

        let writer = self.writer()?;
        writer.execute(
            "INSERT INTO node_embeddings (node_id, embedding, dimensions, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(node_id) DO UPDATE SET embedding = excluded.embedding, dimensions = excluded.dimensions",
            params![
                node_id,
                embedding_to_bytes(embedding),
                embedding.len() as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        writer.execute(
            "UPDATE knowledge_nodes SET has_embedding = 1 WHERE id = ?1",
            params![node_id],
        )?;
        Ok(())
    }

    #[cfg(feature = "vector-search")]
    pub fn get_node_embedding(&self, node_id: &str) -> Result<Option<Vec<f32>>> {
        let reader = self.reader()?;
        let bytes: Option<Vec<u8>> = reader
            .prepare("SELECT embedding FROM node_embeddings WHERE node_id = ?1")?
            .query_row(params![node_id], |row| row.get(0))
            .optional()?;
        Ok(bytes.and_then(|b| bytes_to_embedding(&b)))
    }

    // ========================================================================
    // KNOWLEDGE GRAPH EDGES
    // ========================================================================

    fn insert_edge(writer: &Connection, edge: &KnowledgeEdge) -> Result<()> {
        writer.execute(
            "INSERT INTO knowledge_edges (
                id, source_id, target_id, edge_type, weight, valid_from, valid_until,
                created_at, created_by, confidence, metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                edge.id,
                edge.source_id,
                edge.target_id,
                edge.edge_type.to_string(),
                edge.weight,
                edge.valid_from.map(|d| d.to_rfc3339()),
                edge.valid_until.map(|d| d.to_rfc3339()),
                edge.created_at.to_rfc3339(),
                edge.created_by,
                edge.confidence,
                edge.metadata,
            ],
        )?;
        Ok(())
    }

    pub fn add_edge(&self, edge: &KnowledgeEdge) -> Result<()> {
        let writer = self.writer()?;
        Self::insert_edge(&writer, edge)
    }

    pub fn get_edges_for_node(&self, node_id: &str) -> Result<Vec<KnowledgeEdge>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT * FROM knowledge_edges WHERE source_id = ?1 OR target_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![node_id], Self::row_to_edge)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    fn row_to_edge(row: &rusqlite::Row) -> rusqlite::Result<KnowledgeEdge> {
        let edge_type: String = row.get("edge_type")?;
        Ok(KnowledgeEdge {
            id: row.get("id")?,
            source_id: row.get("source_id")?,
            target_id: row.get("target_id")?,
            edge_type: edge_type.parse().unwrap_or(EdgeType::Custom),
            weight: row.get("weight")?,
            valid_from: Self::parse_optional_timestamp(row.get("valid_from")?),
            valid_until: Self::parse_optional_timestamp(row.get("valid_until")?),
            created_at: Self::parse_timestamp(&row.get::<_, String>("created_at")?)?,
            created_by: row.get("created_by")?,
            confidence: row.get("confidence")?,
            metadata: row.get("metadata")?,
        })
    }

    // ========================================================================
    // STATISTICS
    // ========================================================================

    pub fn get_stats(&self, now: DateTime<Utc>) -> Result<MemoryStats> {
        let reader = self.reader()?;

        let total_nodes: i64 =
            reader.query_row("SELECT COUNT(*) FROM knowledge_nodes", [], |r| r.get(0))?;
        let nodes_with_embeddings: i64 = reader.query_row(
            "SELECT COUNT(*) FROM knowledge_nodes WHERE has_embedding = 1",
            [],
            |r| r.get(0),
        )?;
        let oldest: Option<String> =
            reader.query_row("SELECT MIN(created_at) FROM knowledge_nodes", [], |r| r.get(0))?;
        let newest: Option<String> =
            reader.query_row("SELECT MAX(created_at) FROM knowledge_nodes", [], |r| r.get(0))?;

        let mut nodes_due = 0i64;
        {
            let mut next_review_stmt = reader.prepare("SELECT next_review FROM knowledge_nodes")?;
            let rows = next_review_stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;
            for row in rows {
                let due = match row?.and_then(|s| Self::parse_optional_timestamp(Some(s))) {
                    Some(next_review) => next_review <= now,
                    None => true,
                };
                if due {
                    nodes_due += 1;
                }
            }
        }

        let mut total_retention = 0.0;
        {
            let mut node_stmt = reader.prepare("SELECT * FROM knowledge_nodes")?;
            let rows = node_stmt.query_map([], Self::row_to_node)?;
            let mut count = 0i64;
            for row in rows {
                let node = row?;
                total_retention += self.retrievability(&node, now);
                count += 1;
            }
            if count > 0 {
                total_retention /= count as f64;
            }
        }

        Ok(MemoryStats {
            total_nodes,
            nodes_due_for_review: nodes_due,
            average_retention: total_retention,
            oldest_memory: oldest.and_then(|s| Self::parse_optional_timestamp(Some(s))),
            newest_memory: newest.and_then(|s| Self::parse_optional_timestamp(Some(s))),
            nodes_with_embeddings,
            embedding_model: None,
        })
    }
}

fn learning_state_name(state: LearningState) -> &'static str {
    match state {
        LearningState::New => "new",
        LearningState::Learning => "learning",
        LearningState::Review => "review",
        LearningState::Relearning => "relearning",
    }
}

#[cfg(feature = "vector-search")]
fn embedding_to_bytes(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

#[cfg(feature = "vector-search")]
fn bytes_to_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}
