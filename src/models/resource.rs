use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use super::serialize_timestamp;

/// A cataloged resource joined with its category name and language names,
/// in the shape every endpoint returns.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResourceView {
    pub id: i32,
    pub name: String,
    pub url: String,
    pub category: String,
    pub languages: Vec<String>,
    pub paid: bool,
    pub notes: Option<String>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub times_clicked: i32,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ResourceView {
    /// Search-index document: the wire form plus the provider's objectID.
    pub fn to_index_object(&self) -> Value {
        let mut object = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut object {
            map.insert("objectID".to_string(), Value::from(self.id));
        }
        object
    }

    /// Whether any field tracked by the bulk importer differs from the given
    /// candidate values. Language order is irrelevant.
    pub fn differs_from(
        &self,
        name: &str,
        category: &str,
        paid: bool,
        notes: Option<&str>,
        languages: &[String],
    ) -> bool {
        if self.name != name
            || self.category != category
            || self.paid != paid
            || self.notes.as_deref() != notes
        {
            return true;
        }
        let mut ours = self.languages.clone();
        let mut theirs = languages.to_vec();
        ours.sort();
        theirs.sort();
        ours != theirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ResourceView {
        ResourceView {
            id: 7,
            name: "Foo".to_string(),
            url: "https://x.test/1".to_string(),
            category: "Books".to_string(),
            languages: vec!["Python".to_string(), "Rust".to_string()],
            paid: false,
            notes: None,
            upvotes: 0,
            downvotes: 0,
            times_clicked: 0,
            created_at: None,
            last_updated: None,
        }
    }

    #[test]
    fn index_object_carries_object_id() {
        let object = view().to_index_object();
        assert_eq!(object["objectID"], serde_json::json!(7));
        assert_eq!(object["name"], serde_json::json!("Foo"));
    }

    #[test]
    fn unset_timestamps_serialize_as_empty_strings() {
        let value = serde_json::to_value(view()).unwrap();
        assert_eq!(value["created_at"], serde_json::json!(""));
        assert_eq!(value["last_updated"], serde_json::json!(""));
    }

    #[test]
    fn language_order_does_not_count_as_a_difference() {
        let v = view();
        let reversed = vec!["Rust".to_string(), "Python".to_string()];
        assert!(!v.differs_from("Foo", "Books", false, None, &reversed));
        assert!(v.differs_from("Foo", "Books", true, None, &reversed));
        assert!(v.differs_from("Foo", "Videos", false, None, &reversed));
    }
}
