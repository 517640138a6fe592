use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::error::ApiError;

/// How a payload field is typed and coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// String column; also accepts numbers, which are coerced to text.
    Text,
    /// String column holding a URL; numbers are not accepted.
    UrlText,
    /// Boolean column; also accepts "true"/"false" in any case.
    Flag,
    /// List of language names; every element must be a string.
    Languages,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// Accepted resource payload fields. Anything else in the body is ignored.
pub const RESOURCE_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "name", kind: FieldKind::Text, required: true },
    FieldSpec { name: "url", kind: FieldKind::UrlText, required: true },
    FieldSpec { name: "category", kind: FieldKind::Text, required: true },
    FieldSpec { name: "paid", kind: FieldKind::Flag, required: true },
    FieldSpec { name: "notes", kind: FieldKind::Text, required: false },
    FieldSpec { name: "languages", kind: FieldKind::Languages, required: false },
];

/// Resolves a URL to the id of the resource that already owns it, if any.
#[async_trait]
pub trait UrlLookup: Send + Sync {
    async fn resource_id_for_url(&self, url: &str) -> Result<Option<i32>, ApiError>;
}

/// Human name for a JSON value's type, used in shape-mismatch errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn require_array(value: &Value) -> Result<&Vec<Value>, ApiError> {
    value.as_array().ok_or(ApiError::InvalidType {
        expected: "array of resource objects",
        actual: json_type_name(value),
    })
}

pub fn require_object(value: &Value) -> Result<&Map<String, Value>, ApiError> {
    value.as_object().ok_or(ApiError::InvalidType {
        expected: "object",
        actual: json_type_name(value),
    })
}

/// Text coercion mirror of the accept rule in [`FieldKind::Text`].
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Flag coercion mirror of the accept rule in [`FieldKind::Flag`].
pub fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Language values coerced to a vector, or None if the shape is wrong.
pub fn coerce_languages(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn field_accepts(kind: FieldKind, value: &Value) -> bool {
    match kind {
        FieldKind::Text => matches!(value, Value::String(_) | Value::Number(_)),
        FieldKind::UrlText => matches!(value, Value::String(_)),
        FieldKind::Flag => coerce_flag(value).is_some(),
        // Falsy values pass untouched and are treated as absent downstream.
        FieldKind::Languages => !json_truthy(value) || coerce_languages(value).is_some(),
    }
}

fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

struct FieldErrors {
    missing: Vec<&'static str>,
    invalid: Vec<&'static str>,
    /// Extra detail for a URL clash: the message, and the owning resource's
    /// id when one exists in the database.
    conflict: Option<(Option<i32>, String)>,
}

impl FieldErrors {
    fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    fn into_value(self) -> Value {
        let mut errors = Map::new();
        if !self.missing.is_empty() {
            errors.insert(
                "missing-params".to_string(),
                json!({
                    "params": self.missing,
                    "message": format!(
                        "The following params were missing: {}.",
                        self.missing.join(", ")
                    ),
                }),
            );
        }
        if !self.invalid.is_empty() {
            let mut detail = json!({
                "params": self.invalid,
                "message": format!(
                    "The following params were invalid: {}.",
                    self.invalid.join(", ")
                ),
            });
            if let Some((id, message)) = self.conflict {
                detail["message"] = Value::from(format!(
                    "The following params were invalid: {}. {message}",
                    self.invalid.join(", ")
                ));
                if let Some(id) = id {
                    detail["resource"] = Value::from(format!("/api/v1/resources/{id}"));
                }
            }
            errors.insert("invalid-params".to_string(), detail);
        }
        Value::Object(errors)
    }
}

async fn check_fields(
    payload: &Map<String, Value>,
    require_all: bool,
    existing_id: Option<i32>,
    urls: &dyn UrlLookup,
) -> Result<FieldErrors, ApiError> {
    let mut errors = FieldErrors {
        missing: Vec::new(),
        invalid: Vec::new(),
        conflict: None,
    };

    for spec in RESOURCE_FIELDS {
        match payload.get(spec.name) {
            None | Some(Value::Null) => {
                if require_all && spec.required {
                    errors.missing.push(spec.name);
                }
            }
            Some(value) => {
                if !field_accepts(spec.kind, value) {
                    errors.invalid.push(spec.name);
                }
            }
        }
    }

    if let Some(url) = payload.get("url").and_then(Value::as_str) {
        if let Some(owner) = urls.resource_id_for_url(url).await? {
            if existing_id != Some(owner) {
                errors.invalid.push("url");
                errors.conflict = Some((
                    Some(owner),
                    format!("Resource id {owner} already has this URL."),
                ));
            }
        }
    }

    Ok(errors)
}

/// Validates a single resource payload. Required fields are only enforced
/// when `require_all` is set (creations); updates may send any subset.
pub async fn validate_resource(
    payload: &Map<String, Value>,
    require_all: bool,
    existing_id: Option<i32>,
    urls: &dyn UrlLookup,
) -> Result<(), ApiError> {
    let errors = check_fields(payload, require_all, existing_id, urls).await?;
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors.into_value()))
    }
}

/// Validates a batch of resource payloads for creation. Per-item errors are
/// collected into one response, each annotated with the item's index. URLs
/// repeated within the batch fail the later occurrence.
pub async fn validate_resource_list(
    items: &[Value],
    max_batch_size: usize,
    urls: &dyn UrlLookup,
) -> Result<(), ApiError> {
    if items.len() > max_batch_size {
        return Err(ApiError::TooLong { max: max_batch_size });
    }

    let mut all_errors = Vec::new();
    let mut seen_urls: Vec<&str> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            all_errors.push(json!({
                "index": index,
                "invalid-type": {
                    "message": format!(
                        "Expected a JSON object but received a JSON {}",
                        json_type_name(item)
                    ),
                },
            }));
            continue;
        };

        let mut errors = check_fields(object, true, None, urls).await?;

        if let Some(url) = object.get("url").and_then(Value::as_str) {
            if seen_urls.contains(&url) {
                if !errors.invalid.contains(&"url") {
                    errors.invalid.push("url");
                }
                errors.conflict = Some((
                    None,
                    "This URL appears earlier in the same request.".to_string(),
                ));
            } else {
                seen_urls.push(url);
            }
        }

        if !errors.is_empty() {
            let mut value = errors.into_value();
            if let Value::Object(map) = &mut value {
                map.insert("index".to_string(), Value::from(index));
            }
            all_errors.push(value);
        }
    }

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(Value::Array(all_errors)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubUrls {
        taken: Vec<(String, i32)>,
    }

    #[async_trait]
    impl UrlLookup for StubUrls {
        async fn resource_id_for_url(&self, url: &str) -> Result<Option<i32>, ApiError> {
            Ok(self
                .taken
                .iter()
                .find(|(taken, _)| taken == url)
                .map(|(_, id)| *id))
        }
    }

    fn no_urls() -> StubUrls {
        StubUrls { taken: Vec::new() }
    }

    fn valid_payload() -> Map<String, Value> {
        json!({
            "name": "Rustlings",
            "url": "https://example.org/rustlings",
            "category": "Tutorials",
            "paid": false,
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[tokio::test]
    async fn valid_creation_payload_passes() {
        assert!(
            validate_resource(&valid_payload(), true, None, &no_urls())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn missing_required_fields_are_reported_together() {
        let payload = json!({ "name": "x" }).as_object().unwrap().clone();
        let err = validate_resource(&payload, true, None, &no_urls())
            .await
            .unwrap_err();
        let ApiError::Validation(value) = err else {
            panic!("expected validation error")
        };
        let params = value["missing-params"]["params"].as_array().unwrap();
        assert_eq!(params.len(), 3);
        assert!(params.contains(&json!("url")));
        assert!(params.contains(&json!("category")));
        assert!(params.contains(&json!("paid")));
    }

    #[tokio::test]
    async fn updates_do_not_require_fields() {
        let payload = json!({ "name": "renamed" }).as_object().unwrap().clone();
        assert!(
            validate_resource(&payload, false, Some(1), &no_urls())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn numbers_coerce_into_text_fields_but_not_urls() {
        let mut payload = valid_payload();
        payload.insert("name".to_string(), json!(42));
        assert!(
            validate_resource(&payload, true, None, &no_urls())
                .await
                .is_ok()
        );

        payload.insert("url".to_string(), json!(42));
        let err = validate_resource(&payload, true, None, &no_urls())
            .await
            .unwrap_err();
        let ApiError::Validation(value) = err else {
            panic!("expected validation error")
        };
        assert_eq!(value["invalid-params"]["params"], json!(["url"]));
    }

    #[tokio::test]
    async fn string_booleans_are_accepted_for_paid() {
        for candidate in ["true", "FALSE", "True"] {
            let mut payload = valid_payload();
            payload.insert("paid".to_string(), json!(candidate));
            assert!(
                validate_resource(&payload, true, None, &no_urls())
                    .await
                    .is_ok(),
                "{candidate} should coerce"
            );
        }

        let mut payload = valid_payload();
        payload.insert("paid".to_string(), json!("yes"));
        assert!(
            validate_resource(&payload, true, None, &no_urls())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn languages_must_be_a_list_of_strings() {
        let mut payload = valid_payload();
        payload.insert("languages".to_string(), json!(["Rust", 3]));
        assert!(
            validate_resource(&payload, true, None, &no_urls())
                .await
                .is_err()
        );

        payload.insert("languages".to_string(), json!(["Rust", "Go"]));
        assert!(
            validate_resource(&payload, true, None, &no_urls())
                .await
                .is_ok()
        );

        // Empty list reads as absent.
        payload.insert("languages".to_string(), json!([]));
        assert!(
            validate_resource(&payload, true, None, &no_urls())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn unknown_fields_are_ignored() {
        let mut payload = valid_payload();
        payload.insert("sparkles".to_string(), json!({ "lots": true }));
        assert!(
            validate_resource(&payload, true, None, &no_urls())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn url_conflicts_name_the_existing_resource() {
        let urls = StubUrls {
            taken: vec![("https://example.org/rustlings".to_string(), 17)],
        };
        let err = validate_resource(&valid_payload(), true, None, &urls)
            .await
            .unwrap_err();
        let ApiError::Validation(value) = err else {
            panic!("expected validation error")
        };
        let detail = &value["invalid-params"];
        assert_eq!(detail["params"], json!(["url"]));
        assert!(detail["message"]
            .as_str()
            .unwrap()
            .contains("Resource id 17 already has this URL."));
        assert_eq!(detail["resource"], json!("/api/v1/resources/17"));
    }

    #[tokio::test]
    async fn updating_own_url_is_not_a_conflict() {
        let urls = StubUrls {
            taken: vec![("https://example.org/rustlings".to_string(), 17)],
        };
        assert!(
            validate_resource(&valid_payload(), false, Some(17), &urls)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn batch_over_the_size_limit_is_rejected() {
        let items = vec![Value::Object(valid_payload()); 3];
        let err = validate_resource_list(&items, 2, &no_urls())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TooLong { max: 2 }));
    }

    #[tokio::test]
    async fn batch_errors_carry_item_indexes() {
        let items = vec![
            Value::Object(valid_payload()),
            json!({ "name": "no url" }),
            json!("not an object"),
        ];
        let err = validate_resource_list(&items, 10, &no_urls())
            .await
            .unwrap_err();
        let ApiError::Validation(Value::Array(errors)) = err else {
            panic!("expected validation error list")
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["index"], json!(1));
        assert_eq!(errors[1]["index"], json!(2));
    }

    #[tokio::test]
    async fn duplicate_urls_within_a_batch_fail_the_second_item() {
        let items = vec![
            Value::Object(valid_payload()),
            Value::Object(valid_payload()),
        ];
        let err = validate_resource_list(&items, 10, &no_urls())
            .await
            .unwrap_err();
        let ApiError::Validation(Value::Array(errors)) = err else {
            panic!("expected validation error list")
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["index"], json!(1));
        assert_eq!(errors[0]["invalid-params"]["params"], json!(["url"]));
    }

    #[test]
    fn type_names_match_json_vocabulary() {
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
        assert_eq!(json_type_name(&json!(null)), "null");
    }
}
