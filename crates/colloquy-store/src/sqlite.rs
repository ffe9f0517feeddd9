//! SQLite-backed conversation store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use colloquy_common::{ConversationId, StoreError, Turn};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::codec::{decode_history, encode_history};
use crate::{ConversationStore, ConversationSummary};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    history TEXT NOT NULL,
    seq INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_conversations_seq ON conversations(seq);
"#;

fn query_err(e: rusqlite::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

/// Conversation store over a single SQLite connection.
///
/// Each `save` runs in its own transaction, so readers see either the old
/// record or the new one, never a mix.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let open_err = |reason: String| StoreError::Open {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| open_err(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| open_err(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| open_err(e.to_string()))?;

        info!(path = %path.display(), "opened conversation store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(query_err)?;
        conn.execute_batch(SCHEMA).map_err(query_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Query("store connection lock poisoned".into()))
    }
}

impl ConversationStore for SqliteStore {
    fn save(&self, id: &ConversationId, title: &str, turns: &[Turn]) -> Result<(), StoreError> {
        let history = encode_history(turns)?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(query_err)?;

        // A strictly increasing write counter orders listings even when
        // several saves land in the same millisecond.
        let seq: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM conversations",
                [],
                |row| row.get(0),
            )
            .map_err(query_err)?;

        tx.execute(
            "INSERT INTO conversations (id, title, history, seq, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 history = excluded.history,
                 seq = excluded.seq,
                 updated_at = excluded.updated_at",
            params![id.as_str(), title, history, seq, now],
        )
        .map_err(query_err)?;

        tx.commit().map_err(query_err)?;
        debug!(conversation = %id, seq, "conversation saved");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, title, updated_at FROM conversations ORDER BY seq DESC")
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(query_err)?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, title, updated_at) = row.map_err(query_err)?;
            let updated_at = DateTime::parse_from_rfc3339(&updated_at)
                .map_err(|e| StoreError::Corrupt {
                    id: id.clone(),
                    reason: format!("bad updated_at '{updated_at}': {e}"),
                })?
                .with_timezone(&Utc);
            summaries.push(ConversationSummary {
                id: ConversationId::from(id),
                title,
                updated_at,
            });
        }
        Ok(summaries)
    }

    fn load(&self, id: &ConversationId) -> Result<Vec<Turn>, StoreError> {
        let conn = self.lock()?;
        let history: Option<String> = conn
            .query_row(
                "SELECT history FROM conversations WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_err)?;

        match history {
            Some(raw) => decode_history(id.as_str(), &raw),
            None => {
                debug!(conversation = %id, "no stored conversation, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn delete(&self, id: &ConversationId) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM conversations WHERE id = ?1",
            params![id.as_str()],
        )
        .map_err(query_err)?;
        Ok(())
    }
}
