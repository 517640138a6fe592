use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::FromRow;

/// An authorized API caller. The apikey token is opaque and rotatable; the
/// email ties the key 1:1 to an external membership identity. Keys are denied
/// rather than deleted.
#[derive(Debug, Clone, FromRow)]
pub struct Key {
    pub id: i32,
    pub apikey: String,
    pub email: String,
    pub denied: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Key {
    /// Client-facing shape; the denied flag and surrogate id stay internal.
    pub fn serialize(&self) -> Value {
        json!({
            "apikey": self.apikey,
            "email": self.email,
            "created_at": format_ts(&self.created_at),
            "last_updated": format_ts(&self.last_updated),
        })
    }
}

fn format_ts(value: &Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
