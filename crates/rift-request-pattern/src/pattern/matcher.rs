//! Matcher-as-value: the leaf of every pattern.
//!
//! A [`ValueMatcher`] is tested against an actual value by literal equality,
//! a regex test, or an arbitrary predicate. Header values, scalar bodies and
//! the leaves of structured body patterns all go through it.

use crate::error::Result;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// An arbitrary predicate over an actual value.
#[derive(Clone)]
pub struct ValuePredicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl ValuePredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    fn call(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for ValuePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValuePredicate(..)")
    }
}

/// Literal, regex or custom matcher for a single value.
#[derive(Debug, Clone)]
pub enum ValueMatcher {
    /// Literal equality. Strings only equal strings, numbers only numbers.
    Exact(Value),
    /// Regex test; never matches non-string values.
    Regex(Arc<Regex>),
    /// Arbitrary predicate.
    Custom(ValuePredicate),
}

impl ValueMatcher {
    pub fn exact(value: impl Into<Value>) -> Self {
        Self::Exact(value.into())
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::Regex(Arc::new(Regex::new(pattern)?)))
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Custom(ValuePredicate::new(predicate))
    }

    /// Check if an actual value matches.
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Exact(expected) => expected == actual,
            Self::Regex(regex) => actual.as_str().is_some_and(|s| regex.is_match(s)),
            Self::Custom(predicate) => predicate.call(actual),
        }
    }

    /// Check if a raw string matches.
    pub fn matches_str(&self, actual: &str) -> bool {
        match self {
            Self::Exact(Value::String(expected)) => expected == actual,
            Self::Exact(_) => false,
            Self::Regex(regex) => regex.is_match(actual),
            Self::Custom(predicate) => predicate.call(&Value::String(actual.to_string())),
        }
    }

    /// `null` and `""` literals are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Exact(Value::Null) => true,
            Self::Exact(Value::String(s)) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for ValueMatcher {
    fn from(value: &str) -> Self {
        Self::Exact(Value::String(value.to_string()))
    }
}

impl From<String> for ValueMatcher {
    fn from(value: String) -> Self {
        Self::Exact(Value::String(value))
    }
}

impl From<Value> for ValueMatcher {
    fn from(value: Value) -> Self {
        Self::Exact(value)
    }
}

impl From<Regex> for ValueMatcher {
    fn from(regex: Regex) -> Self {
        Self::Regex(Arc::new(regex))
    }
}

impl fmt::Display for ValueMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{value}"),
            Self::Regex(regex) => write!(f, "/{}/", regex.as_str()),
            Self::Custom(_) => f.write_str("<custom matcher>"),
        }
    }
}
