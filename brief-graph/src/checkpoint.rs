//! Conversation checkpoints

use crate::error::{GraphError, Result};
use async_trait::async_trait;
use brief_core::ConversationState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Snapshot of a conversation taken after a workflow node completed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub thread_id: String,
    pub checkpoint_id: String,
    pub state: ConversationState,
    pub step: usize,
    /// Node whose result this snapshot commits.
    pub node: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(thread_id: &str, state: ConversationState, step: usize, node: &str) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            checkpoint_id: uuid::Uuid::new_v4().to_string(),
            state,
            step,
            node: node.to_string(),
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String>;

    /// Latest checkpoint of a thread.
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>>;

    async fn load_by_id(&self, checkpoint_id: &str) -> Result<Option<Checkpoint>>;

    /// All checkpoints of a thread, oldest first.
    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>>;

    async fn delete(&self, thread_id: &str) -> Result<()>;
}

/// Checkpoints kept per thread unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 16;

/// In-process checkpointer. Only the newest `history_limit` checkpoints of a thread are kept.
pub struct MemoryCheckpointer {
    checkpoints: Arc<RwLock<HashMap<String, Vec<Checkpoint>>>>,
    history_limit: usize,
}

impl Default for MemoryCheckpointer {
    fn default() -> Self {
        Self { checkpoints: Arc::default(), history_limit: DEFAULT_HISTORY_LIMIT }
    }
}

impl MemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` checkpoints per thread; at least one is always kept.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }
}

#[async_trait]
impl Checkpointer for MemoryCheckpointer {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String> {
        let mut store = self.checkpoints.write().await;
        let history = store.entry(checkpoint.thread_id.clone()).or_default();
        history.push(checkpoint.clone());
        if history.len() > self.history_limit {
            let excess = history.len() - self.history_limit;
            history.drain(..excess);
        }
        Ok(checkpoint.checkpoint_id.clone())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        let store = self.checkpoints.read().await;
        Ok(store.get(thread_id).and_then(|checkpoints| checkpoints.last()).cloned())
    }

    async fn load_by_id(&self, checkpoint_id: &str) -> Result<Option<Checkpoint>> {
        let store = self.checkpoints.read().await;
        Ok(store.values().flatten().find(|c| c.checkpoint_id == checkpoint_id).cloned())
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>> {
        let store = self.checkpoints.read().await;
        Ok(store.get(thread_id).cloned().unwrap_or_default())
    }

    async fn delete(&self, thread_id: &str) -> Result<()> {
        self.checkpoints.write().await.remove(thread_id);
        Ok(())
    }
}

/// SQLite-backed checkpointer; rows are ordered by insertion.
#[cfg(feature = "sqlite")]
pub struct SqliteCheckpointer {
    pool: sqlx::SqlitePool,
    history_limit: usize,
}

#[cfg(feature = "sqlite")]
type CheckpointRow = (String, String, String, i64, String, String, String);

#[cfg(feature = "sqlite")]
impl SqliteCheckpointer {
    pub async fn new(database_url: &str) -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| GraphError::CheckpointError(e.to_string()))?
            .create_if_missing(true);
        // Every connection to an in-memory database sees its own empty database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| GraphError::CheckpointError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                thread_id TEXT NOT NULL,
                state TEXT NOT NULL,
                step INTEGER NOT NULL,
                node TEXT NOT NULL,
                metadata TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_conversation_checkpoints_thread
            ON conversation_checkpoints(thread_id, seq DESC)
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool, history_limit: DEFAULT_HISTORY_LIMIT })
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Private in-memory database, for tests.
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    fn from_row(row: CheckpointRow) -> Result<Checkpoint> {
        let (id, thread_id, state, step, node, metadata, created_at) = row;
        Ok(Checkpoint {
            checkpoint_id: id,
            thread_id,
            state: serde_json::from_str(&state)?,
            step: step as usize,
            node,
            metadata: serde_json::from_str(&metadata)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| GraphError::CheckpointError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl Checkpointer for SqliteCheckpointer {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String> {
        sqlx::query(
            r#"
            INSERT INTO conversation_checkpoints (id, thread_id, state, step, node, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&checkpoint.checkpoint_id)
        .bind(&checkpoint.thread_id)
        .bind(serde_json::to_string(&checkpoint.state)?)
        .bind(checkpoint.step as i64)
        .bind(&checkpoint.node)
        .bind(serde_json::to_string(&checkpoint.metadata)?)
        .bind(checkpoint.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM conversation_checkpoints
            WHERE thread_id = ? AND seq NOT IN (
                SELECT seq FROM conversation_checkpoints
                WHERE thread_id = ?
                ORDER BY seq DESC
                LIMIT ?
            )
            "#,
        )
        .bind(&checkpoint.thread_id)
        .bind(&checkpoint.thread_id)
        .bind(self.history_limit as i64)
        .execute(&self.pool)
        .await?;

        Ok(checkpoint.checkpoint_id.clone())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        let row: Option<CheckpointRow> = sqlx::query_as(
            r#"
            SELECT id, thread_id, state, step, node, metadata, created_at
            FROM conversation_checkpoints
            WHERE thread_id = ?
            ORDER BY seq DESC
            LIMIT 1
            "#,
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::from_row).transpose()
    }

    async fn load_by_id(&self, checkpoint_id: &str) -> Result<Option<Checkpoint>> {
        let row: Option<CheckpointRow> = sqlx::query_as(
            r#"
            SELECT id, thread_id, state, step, node, metadata, created_at
            FROM conversation_checkpoints
            WHERE id = ?
            "#,
        )
        .bind(checkpoint_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::from_row).transpose()
    }

    async fn list(&self, thread_id: &str) -> Result<Vec<Checkpoint>> {
        let rows: Vec<CheckpointRow> = sqlx::query_as(
            r#"
            SELECT id, thread_id, state, step, node, metadata, created_at
            FROM conversation_checkpoints
            WHERE thread_id = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn delete(&self, thread_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM conversation_checkpoints WHERE thread_id = ?")
            .bind(thread_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
