//! Text encoding of conversation history.
//!
//! The persisted form is a JSON array of `{"role": .., "text": ..}` records,
//! one per text-bearing turn, in conversation order.

use colloquy_common::{Role, StoreError, Turn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct HistoryRecord {
    role: Role,
    text: String,
}

/// Encode the text turns of `turns`. Tool turns and empty texts are dropped.
pub fn encode_history(turns: &[Turn]) -> Result<String, StoreError> {
    let records: Vec<HistoryRecord> = turns
        .iter()
        .filter_map(|turn| {
            turn.as_text()
                .filter(|text| !text.is_empty())
                .map(|text| HistoryRecord {
                    role: turn.role,
                    text: text.to_string(),
                })
        })
        .collect();
    serde_json::to_string(&records).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Decode a stored history back into text turns, skipping empty ones.
pub fn decode_history(id: &str, raw: &str) -> Result<Vec<Turn>, StoreError> {
    let records: Vec<HistoryRecord> =
        serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
    Ok(records
        .into_iter()
        .filter(|r| !r.text.is_empty())
        .map(|r| Turn::text(r.role, r.text))
        .collect())
}
