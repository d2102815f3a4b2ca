//! Shrinking full entity responses down to a summary.
//!
//! # Design
//! `shorten_entity` validates the outer shape strictly (an object whose
//! `data` holds exactly one entity carrying every required field) and then
//! projects leniently: summary leaves that are missing or not strings come
//! out as empty strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Fields an entity must carry, with a truthy value, to be shortened.
const REQUIRED_FIELDS: [&str; 5] = ["data", "id", "sources", "type", "meta"];

/// Minimal summary of an entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortEntity {
    pub data: ShortEntityData,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortEntityData {
    pub title: String,
    pub id: String,
}

/// Project an entity response (either the entity itself or a
/// `{"data": [entity]}` envelope) to its `ShortEntity`.
pub fn shorten_entity(response: &Value) -> Result<ShortEntity, ApiError> {
    let entity = working_entity(response)?;
    let data = entity.get("data");
    Ok(ShortEntity {
        data: ShortEntityData {
            title: string_at(data.and_then(|d| d.get("title"))),
            id: string_at(data.and_then(|d| d.get("id"))),
        },
        id: string_at(entity.get("id")),
        kind: string_at(entity.get("type")),
    })
}

/// Check the response shape and return the entity to project.
fn working_entity(response: &Value) -> Result<&Map<String, Value>, ApiError> {
    let outer = response
        .as_object()
        .ok_or_else(|| ApiError::ValidationError("expected a single entity object".to_string()))?;

    let data = outer.get("data").filter(|v| is_truthy(v)).ok_or_else(|| missing("data"))?;

    let entity = match data {
        Value::Array(items) if items.len() == 1 => items[0]
            .as_object()
            .ok_or_else(|| ApiError::ValidationError("data[0] is not an object".to_string()))?,
        Value::Array(items) => {
            return Err(ApiError::ValidationError(format!(
                "data must hold exactly one entity, found {}",
                items.len()
            )))
        }
        _ => outer,
    };

    for field in REQUIRED_FIELDS {
        if !entity.get(field).is_some_and(is_truthy) {
            return Err(missing(field));
        }
    }
    Ok(entity)
}

fn missing(field: &str) -> ApiError {
    ApiError::ValidationError(format!("missing or empty field `{field}`"))
}

fn string_at(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Empty strings, arrays and objects, zero, `false` and `null` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entity() -> Value {
        json!({
            "data": {"title": "T", "id": "x", "description": "long text"},
            "id": "e1",
            "sources": [{"source_id": "s1"}],
            "type": "indicator",
            "meta": {"tlp_color": "AMBER"},
        })
    }

    fn expected() -> ShortEntity {
        ShortEntity {
            data: ShortEntityData {
                title: "T".to_string(),
                id: "x".to_string(),
            },
            id: "e1".to_string(),
            kind: "indicator".to_string(),
        }
    }

    fn field_error(err: ApiError) -> String {
        match err {
            ApiError::ValidationError(msg) => msg,
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn shortens_bare_entity() {
        assert_eq!(shorten_entity(&entity()).unwrap(), expected());
    }

    #[test]
    fn shortens_single_element_envelope() {
        let wrapped = json!({"data": [entity()]});
        assert_eq!(shorten_entity(&wrapped).unwrap(), expected());
    }

    #[test]
    fn serializes_kind_as_type() {
        let json = serde_json::to_value(expected()).unwrap();
        assert_eq!(json, json!({"data": {"title": "T", "id": "x"}, "id": "e1", "type": "indicator"}));
    }

    #[test]
    fn missing_sources_is_named() {
        let mut e = entity();
        e.as_object_mut().unwrap().remove("sources");
        let msg = field_error(shorten_entity(&e).unwrap_err());
        assert!(msg.contains("sources"), "{msg}");
    }

    #[test]
    fn empty_meta_is_rejected() {
        let mut e = entity();
        e["meta"] = json!({});
        let msg = field_error(shorten_entity(&e).unwrap_err());
        assert!(msg.contains("meta"), "{msg}");
    }

    #[test]
    fn two_element_envelope_is_rejected() {
        let wrapped = json!({"data": [entity(), entity()]});
        let msg = field_error(shorten_entity(&wrapped).unwrap_err());
        assert!(msg.contains("exactly one"), "{msg}");
    }

    #[test]
    fn empty_envelope_is_rejected() {
        let msg = field_error(shorten_entity(&json!({"data": []})).unwrap_err());
        assert!(msg.contains("data"), "{msg}");
    }

    #[test]
    fn array_input_is_rejected() {
        let err = shorten_entity(&json!([entity()])).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[test]
    fn envelope_entity_must_be_complete() {
        let mut inner = entity();
        inner.as_object_mut().unwrap().remove("type");
        let msg = field_error(shorten_entity(&json!({"data": [inner]})).unwrap_err());
        assert!(msg.contains("type"), "{msg}");
    }

    #[test]
    fn missing_leaves_default_to_empty() {
        let e = json!({
            "data": {"description": "no title here"},
            "id": "e1",
            "sources": [1],
            "type": "report",
            "meta": {"k": "v"},
        });
        let short = shorten_entity(&e).unwrap();
        assert_eq!(short.data, ShortEntityData::default());
        assert_eq!(short.id, "e1");
        assert_eq!(short.kind, "report");
    }

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy}");
        }
        for truthy in [json!(true), json!(-1), json!("a"), json!([0]), json!({"a": null})] {
            assert!(is_truthy(&truthy), "{truthy}");
        }
    }
}
