//! Wire-level request types for the commit-now mutate endpoint.
//!
//! These structs serialize to the JSON body accepted by the cluster's
//! `/mutate?commitNow=true` endpoint. They are produced by
//! [`Quads::request`](crate::Quads::request) and consumed opaquely by the
//! transport layer.

use crate::filter::sanitize;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One self-contained transaction: an optional pre-mutation lookup query
/// plus the set/delete quad lists, committed immediately server-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Filtered-lookup query block binding upsert variables, present only
    /// when the batch registered at least one variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub set: Vec<NQuad>,
    pub delete: Vec<NQuad>,
    pub commit_now: bool,
}

/// One fact or edge on the wire. Exactly one of `object_value` / `object_id`
/// is populated; the builder guarantees this by constructing quads from the
/// sealed [`Object`](crate::Object) variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NQuad {
    pub subject: String,
    pub predicate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
}

/// Scalar object value of a quad.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Untyped value; only used as the `_STAR_ALL` wildcard on delete quads.
    Default(String),
}

/// Typed key/value metadata attached to a single quad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub key: String,
    pub value: String,
    pub kind: FacetKind,
}

impl Facet {
    /// String-valued facet. The value passes through the sanitization
    /// filter, like every other free-form string headed for the wire.
    pub fn string(key: &str, value: &str) -> Facet {
        Facet {
            key: key.to_string(),
            value: sanitize(value),
            kind: FacetKind::String,
        }
    }

    /// Datetime-valued facet, rendered as RFC 3339. Not sanitized.
    pub fn datetime(key: &str, value: DateTime<Utc>) -> Facet {
        Facet {
            key: key.to_string(),
            value: value.to_rfc3339(),
            kind: FacetKind::Datetime,
        }
    }
}

/// Facet value type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    String,
    Datetime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn string_facet_is_sanitized() {
        let f = Facet::string("note", "line\none{}");
        assert_eq!(f.value, "line one");
        assert_eq!(f.kind, FacetKind::String);
    }

    #[test]
    fn datetime_facet_renders_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let f = Facet::datetime("since", ts);
        assert_eq!(f.value, "2024-03-01T12:30:00+00:00");
        assert_eq!(f.kind, FacetKind::Datetime);
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let quad = NQuad {
            subject: "_:a".to_string(),
            predicate: "name".to_string(),
            object_value: Some(Value::Str("A".to_string())),
            object_id: None,
            facets: Vec::new(),
        };
        let json = serde_json::to_value(&quad).unwrap();
        assert_eq!(json["objectValue"]["str"], "A");
        assert!(json.get("objectId").is_none());
        assert!(json.get("facets").is_none());
    }
}
