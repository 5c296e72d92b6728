//! Content-type aware body decoding.
//!
//! Structured body patterns compare against the decoded body, so JSON, XML
//! and form-encoded payloads all decode into the same `serde_json::Value`
//! mapping shape before comparison.

use crate::error::{PatternError, Result};
use crate::query::parse_query_string;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use tracing::{debug, trace};

/// Decoder selected for a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Xml,
    /// URL-encoded query string; the fallback for every other content type.
    Form,
}

/// Lookup is by the exact header value. Parameters such as
/// `; charset=utf-8` are not stripped, so such values fall back to
/// [`BodyFormat::Form`].
static BODY_FORMATS: Lazy<HashMap<&'static str, BodyFormat>> = Lazy::new(|| {
    HashMap::from([
        ("text/xml", BodyFormat::Xml),
        ("application/xml", BodyFormat::Xml),
        ("application/json", BodyFormat::Json),
        ("text/json", BodyFormat::Json),
        ("application/javascript", BodyFormat::Json),
        ("text/javascript", BodyFormat::Json),
    ])
});

/// Select the decoder for a content type.
pub fn body_format(content_type: &str) -> BodyFormat {
    match BODY_FORMATS.get(content_type) {
        Some(format) => *format,
        None => {
            if !content_type.is_empty() {
                debug!(content_type, "Unrecognized content type, decoding body as form data");
            }
            BodyFormat::Form
        }
    }
}

/// Decode a body according to its content type.
pub fn decode_body(body: &str, content_type: &str) -> Result<Value> {
    let format = body_format(content_type);
    trace!(?format, "Decoding request body");
    match format {
        BodyFormat::Json => decode_json(body),
        BodyFormat::Xml => decode_xml(body),
        BodyFormat::Form => Ok(Value::Object(parse_query_string(body))),
    }
}

pub fn decode_json(body: &str) -> Result<Value> {
    Ok(serde_json::from_str(body)?)
}

/// Decode an XML document into a mapping keyed by the root element name.
///
/// Text-only elements become strings and empty elements `null`. Attributes
/// and child elements become keys; repeated children collect into an array
/// and text mixed with children is kept under `__content__`.
pub fn decode_xml(body: &str) -> Result<Value> {
    let package =
        sxd_document::parser::parse(body).map_err(|e| PatternError::Xml(format!("{e:?}")))?;
    let document = package.as_document();

    let mut root = Map::new();
    for child in document.root().children() {
        if let ChildOfRoot::Element(element) = child {
            root.insert(
                element.name().local_part().to_string(),
                element_value(element),
            );
        }
    }
    Ok(Value::Object(root))
}

fn element_value(element: Element<'_>) -> Value {
    let mut map = Map::new();
    for attribute in element.attributes() {
        map.insert(
            attribute.name().local_part().to_string(),
            Value::String(attribute.value().to_string()),
        );
    }

    let mut text = String::new();
    for child in element.children() {
        match child {
            ChildOfElement::Element(nested) => {
                let name = nested.name().local_part().to_string();
                let value = element_value(nested);
                match map.get_mut(&name) {
                    Some(Value::Array(items)) => items.push(value),
                    Some(existing) => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, value]);
                    }
                    None => {
                        map.insert(name, value);
                    }
                }
            }
            ChildOfElement::Text(t) => text.push_str(t.text()),
            _ => {}
        }
    }

    let text = text.trim();
    if map.is_empty() {
        if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        }
    } else {
        if !text.is_empty() {
            map.insert("__content__".to_string(), Value::String(text.to_string()));
        }
        Value::Object(map)
    }
}
