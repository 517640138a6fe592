pub mod key;
pub mod resource;
pub mod tag;
pub mod vote;

use chrono::{DateTime, Utc};
use serde::Serializer;

/// Wire format for server-assigned timestamps: `YYYY-MM-DD HH:MM:SS`, empty
/// string when unset.
pub fn serialize_timestamp<S>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_str(&ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => serializer.serialize_str(""),
    }
}
