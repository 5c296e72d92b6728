//! Body matching.
//!
//! A scalar pattern compares against the raw body text. A structured
//! pattern decodes the body by content type (see [`crate::decode`]) and
//! compares the decoded mapping key by key.

use super::matcher::ValueMatcher;
use crate::decode::decode_body;
use crate::error::Result;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Expected body shape.
#[derive(Debug, Clone)]
pub enum BodyPattern {
    /// Compared against the raw body text.
    Scalar(ValueMatcher),
    /// Compared against the decoded body. An empty mapping matches any body.
    Mapping(BTreeMap<String, BodyPattern>),
}

impl BodyPattern {
    /// Start a structured pattern. With no entries it matches any body.
    pub fn mapping() -> BodyMapping {
        BodyMapping::default()
    }

    /// Convert a JSON value: objects become nested mappings, everything
    /// else a literal.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => BodyPattern::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, BodyPattern::from_json(value)))
                    .collect(),
            ),
            other => BodyPattern::Scalar(ValueMatcher::Exact(other)),
        }
    }
}

/// Builder for a structured [`BodyPattern`].
#[derive(Debug, Clone, Default)]
pub struct BodyMapping {
    entries: BTreeMap<String, BodyPattern>,
}

impl BodyMapping {
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<BodyPattern>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> BodyPattern {
        BodyPattern::Mapping(self.entries)
    }
}

impl From<BodyMapping> for BodyPattern {
    fn from(mapping: BodyMapping) -> Self {
        mapping.build()
    }
}

impl From<ValueMatcher> for BodyPattern {
    fn from(matcher: ValueMatcher) -> Self {
        BodyPattern::Scalar(matcher)
    }
}

impl From<&str> for BodyPattern {
    fn from(value: &str) -> Self {
        BodyPattern::Scalar(value.into())
    }
}

impl From<String> for BodyPattern {
    fn from(value: String) -> Self {
        BodyPattern::Scalar(value.into())
    }
}

impl From<Regex> for BodyPattern {
    fn from(regex: Regex) -> Self {
        BodyPattern::Scalar(regex.into())
    }
}

impl From<Value> for BodyPattern {
    fn from(value: Value) -> Self {
        BodyPattern::from_json(value)
    }
}

impl fmt::Display for BodyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyPattern::Scalar(matcher) => write!(f, "{matcher}"),
            BodyPattern::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Matches a request body against a [`BodyPattern`].
#[derive(Debug, Clone)]
pub struct BodyMatcher {
    pattern: BodyPattern,
}

impl BodyMatcher {
    pub fn new(pattern: impl Into<BodyPattern>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &BodyPattern {
        &self.pattern
    }

    /// Check a body against the pattern.
    ///
    /// Returns an error when a structured pattern needs the body decoded and
    /// the decoder selected by `content_type` rejects it.
    pub fn matches(&self, body: Option<&str>, content_type: &str) -> Result<bool> {
        match &self.pattern {
            BodyPattern::Mapping(expected) => {
                if expected.is_empty() {
                    return Ok(true);
                }
                match decode_body(body.unwrap_or(""), content_type)? {
                    Value::Object(actual) => Ok(struct_match(&actual, expected)),
                    _ => Ok(false),
                }
            }
            // An absent body only satisfies a blank literal.
            BodyPattern::Scalar(matcher) => match body {
                None => Ok(matcher.is_blank()),
                Some(body) if body.is_empty() && matcher.is_blank() => Ok(true),
                Some(body) => Ok(matcher.matches_str(body)),
            },
        }
    }
}

/// Strict structural comparison: same key count, every actual key present
/// in the pattern, nested mappings compared recursively.
fn struct_match(actual: &Map<String, Value>, pattern: &BTreeMap<String, BodyPattern>) -> bool {
    if actual.len() != pattern.len() {
        return false;
    }

    actual.iter().all(|(key, actual_value)| match pattern.get(key) {
        None => false,
        Some(BodyPattern::Mapping(nested)) => match actual_value {
            Value::Object(actual_nested) => struct_match(actual_nested, nested),
            _ => false,
        },
        Some(BodyPattern::Scalar(matcher)) => matcher.matches(actual_value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use serde_json::json;

    fn digits() -> ValueMatcher {
        ValueMatcher::regex(r"^\d+$").unwrap()
    }

    #[test]
    fn test_empty_mapping_matches_any_body() {
        let matcher = BodyMatcher::new(BodyPattern::mapping());
        assert!(matcher.matches(Some("anything"), "").unwrap());
        assert!(matcher.matches(Some("{not json"), "application/json").unwrap());
        assert!(matcher.matches(None, "text/xml").unwrap());
    }

    #[test]
    fn test_json_mapping() {
        let matcher = BodyMatcher::new(json!({"a": "1"}));
        assert!(matcher.matches(Some(r#"{"a":"1"}"#), "application/json").unwrap());
        assert!(!matcher.matches(Some(r#"{"a":"1","b":"2"}"#), "application/json").unwrap());
        assert!(!matcher.matches(Some(r#"{"a":"2"}"#), "application/json").unwrap());
        assert!(!matcher.matches(Some(r#"{"b":"1"}"#), "application/json").unwrap());
    }

    #[test]
    fn test_pattern_keys_missing_from_actual_fail_on_arity() {
        let matcher = BodyMatcher::new(json!({"a": "1", "b": "2"}));
        assert!(!matcher.matches(Some(r#"{"a":"1"}"#), "application/json").unwrap());
    }

    #[test]
    fn test_regex_leaf() {
        let matcher = BodyMatcher::new(BodyPattern::mapping().entry("a", digits()));
        assert!(matcher.matches(Some(r#"{"a":"123"}"#), "application/json").unwrap());
        assert!(!matcher.matches(Some(r#"{"a":"12x"}"#), "application/json").unwrap());
        assert!(!matcher.matches(Some(r#"{"a":123}"#), "application/json").unwrap());
    }

    #[test]
    fn test_nested_mapping() {
        let pattern = BodyPattern::mapping().entry(
            "user",
            BodyPattern::mapping()
                .entry("name", "bob")
                .entry("id", digits()),
        );
        let matcher = BodyMatcher::new(pattern);
        assert!(matcher
            .matches(Some(r#"{"user":{"id":"7","name":"bob"}}"#), "text/json")
            .unwrap());
        assert!(!matcher
            .matches(Some(r#"{"user":{"id":"7","name":"bob","admin":"1"}}"#), "text/json")
            .unwrap());
        assert!(!matcher.matches(Some(r#"{"user":"bob"}"#), "text/json").unwrap());
    }

    #[test]
    fn test_literal_leaf_compares_non_mapping_values() {
        let matcher = BodyMatcher::new(json!({"tags": ["a", "b"], "count": 2}));
        assert!(matcher
            .matches(Some(r#"{"count":2,"tags":["a","b"]}"#), "application/json")
            .unwrap());
        assert!(!matcher
            .matches(Some(r#"{"count":2,"tags":["b","a"]}"#), "application/json")
            .unwrap());
    }

    #[test]
    fn test_non_mapping_json_never_matches() {
        let matcher = BodyMatcher::new(json!({"a": "1"}));
        assert!(!matcher.matches(Some(r#"["a", "1"]"#), "application/json").unwrap());
    }

    #[test]
    fn test_form_encoded_default_decoder() {
        let matcher = BodyMatcher::new(json!({"a": "1", "b": {"c": "2"}}));
        assert!(matcher.matches(Some("a=1&b[c]=2"), "").unwrap());
        assert!(matcher
            .matches(Some("b[c]=2&a=1"), "application/x-www-form-urlencoded")
            .unwrap());
        assert!(!matcher.matches(Some("a=1"), "").unwrap());
    }

    #[test]
    fn test_xml_decoder() {
        let matcher = BodyMatcher::new(json!({"order": {"id": "5", "item": ["x", "y"]}}));
        let xml = r#"<order><id>5</id><item>x</item><item>y</item></order>"#;
        assert!(matcher.matches(Some(xml), "application/xml").unwrap());
        assert!(matcher.matches(Some(xml), "text/xml").unwrap());
    }

    #[test]
    fn test_charset_suffix_falls_back_to_form_decoder() {
        let matcher = BodyMatcher::new(json!({"a": "1"}));
        // Decoded as a query string, the whole JSON text becomes one bare key.
        assert!(!matcher
            .matches(Some(r#"{"a":"1"}"#), "application/json; charset=utf-8")
            .unwrap());
    }

    #[test]
    fn test_decode_failure_propagates() {
        let matcher = BodyMatcher::new(json!({"a": "1"}));
        let err = matcher.matches(Some("{broken"), "application/json").unwrap_err();
        assert!(matches!(err, PatternError::Json(_)));

        let err = matcher.matches(Some("<unclosed>"), "text/xml").unwrap_err();
        assert!(matches!(err, PatternError::Xml(_)));
    }

    #[test]
    fn test_scalar_literal_and_regex() {
        let literal = BodyMatcher::new("hello world");
        assert!(literal.matches(Some("hello world"), "").unwrap());
        assert!(!literal.matches(Some("hello"), "").unwrap());

        let regex = BodyMatcher::new(Regex::new(r"\d{3}-\d{4}").unwrap());
        assert!(regex.matches(Some("Call me at 123-4567"), "").unwrap());
        assert!(!regex.matches(Some("No phone number"), "").unwrap());
    }

    #[test]
    fn test_scalar_pattern_never_decodes() {
        let literal = BodyMatcher::new("{broken");
        assert!(literal.matches(Some("{broken"), "application/json").unwrap());
    }

    #[test]
    fn test_blank_pattern_matches_blank_body() {
        let null = BodyMatcher::new(ValueMatcher::exact(Value::Null));
        assert!(null.matches(None, "").unwrap());
        assert!(null.matches(Some(""), "").unwrap());
        assert!(!null.matches(Some("x"), "").unwrap());

        let empty = BodyMatcher::new("");
        assert!(empty.matches(None, "").unwrap());
        assert!(!empty.matches(Some("x"), "").unwrap());
    }

    #[test]
    fn test_absent_body_fails_non_blank_scalars() {
        let any = BodyMatcher::new(ValueMatcher::regex(".*").unwrap());
        assert!(!any.matches(None, "").unwrap());
        assert!(any.matches(Some(""), "").unwrap());

        let empty = BodyMatcher::new(ValueMatcher::regex("^$").unwrap());
        assert!(!empty.matches(None, "").unwrap());

        let custom = BodyMatcher::new(ValueMatcher::custom(|_| true));
        assert!(!custom.matches(None, "").unwrap());
        assert!(custom.matches(Some("x"), "").unwrap());
    }

    #[test]
    fn test_nested_builder_entries() {
        let pattern = BodyPattern::mapping()
            .entry("a", "1")
            .entry("b", BodyPattern::mapping())
            .build();
        match pattern {
            BodyPattern::Mapping(entries) => {
                assert_eq!(entries.len(), 2);
                assert!(matches!(entries.get("b"), Some(BodyPattern::Mapping(m)) if m.is_empty()));
            }
            BodyPattern::Scalar(_) => panic!("expected a mapping"),
        }
    }

    #[test]
    fn test_display() {
        let pattern = BodyPattern::mapping()
            .entry("b", digits())
            .entry("a", BodyPattern::mapping().entry("c", "x"))
            .build();
        assert_eq!(pattern.to_string(), r#"{"a": {"c": "x"}, "b": /^\d+$/}"#);
        assert_eq!(BodyPattern::from("text").to_string(), r#""text""#);
    }
}
