use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{Map, Value};

/// Uniform JSON response shape shared by every endpoint outcome:
/// `{ apiVersion, status, status_code, data | errors, [pagination] }`.
///
/// Success and failure use the same top-level keys so clients can always
/// inspect the same structure.
#[derive(Debug, Clone)]
pub struct Envelope {
    version: f64,
    status: StatusCode,
    payload: Map<String, Value>,
}

impl Envelope {
    pub fn ok(version: f64) -> Self {
        Self {
            version,
            status: StatusCode::OK,
            payload: Map::new(),
        }
    }

    pub fn error(version: f64, status: StatusCode, errors: Value) -> Self {
        let mut payload = Map::new();
        payload.insert("errors".to_string(), errors);
        Self {
            version,
            status,
            payload,
        }
    }

    pub fn data(mut self, data: Value) -> Self {
        self.payload.insert("data".to_string(), data);
        self
    }

    /// Merge extra top-level keys (pagination details, search details).
    pub fn merge(mut self, extra: Map<String, Value>) -> Self {
        self.payload.extend(extra);
        self
    }

    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("apiVersion".to_string(), Value::from(self.version));
        body.insert(
            "status".to_string(),
            Value::from(self.status.canonical_reason().unwrap_or("unknown")),
        );
        body.insert(
            "status_code".to_string(),
            Value::from(self.status.as_u16()),
        );
        for (k, v) in &self.payload {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.to_value())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_shape_has_uniform_keys() {
        let body = Envelope::ok(1.0).data(json!([1, 2, 3])).to_value();
        assert_eq!(body["apiVersion"], json!(1.0));
        assert_eq!(body["status"], json!("OK"));
        assert_eq!(body["status_code"], json!(200));
        assert_eq!(body["data"], json!([1, 2, 3]));
        assert!(body.get("errors").is_none());
    }

    #[test]
    fn error_shape_replaces_data_with_errors() {
        let errors = json!([{ "code": "not-found", "message": "nope" }]);
        let body = Envelope::error(2.0, StatusCode::NOT_FOUND, errors.clone()).to_value();
        assert_eq!(body["status_code"], json!(404));
        assert_eq!(body["errors"], errors);
        assert!(body.get("data").is_none());
    }

    #[test]
    fn merged_pagination_keys_sit_at_top_level() {
        let mut details = Map::new();
        details.insert("page".to_string(), json!(2));
        details.insert("total_pages".to_string(), json!(7));
        let body = Envelope::ok(1.0).data(json!([])).merge(details).to_value();
        assert_eq!(body["page"], json!(2));
        assert_eq!(body["total_pages"], json!(7));
    }
}
