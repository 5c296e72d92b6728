//! HTTP method matching.

use std::fmt;

/// Matches a lowercase method token exactly, or any method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MethodMatcher {
    #[default]
    Any,
    Exact(String),
}

impl MethodMatcher {
    /// Build from a token. `"any"` (in any case) is the wildcard; other
    /// tokens are folded to lowercase.
    pub fn new(method: &str) -> Self {
        if method.eq_ignore_ascii_case("any") {
            MethodMatcher::Any
        } else {
            MethodMatcher::Exact(method.to_ascii_lowercase())
        }
    }

    pub fn matches(&self, method: &str) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Exact(expected) => expected == method,
        }
    }
}

impl From<&str> for MethodMatcher {
    fn from(method: &str) -> Self {
        Self::new(method)
    }
}

impl From<&hyper::Method> for MethodMatcher {
    fn from(method: &hyper::Method) -> Self {
        Self::new(method.as_str())
    }
}

impl fmt::Display for MethodMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodMatcher::Any => f.write_str("ANY"),
            MethodMatcher::Exact(method) => f.write_str(&method.to_ascii_uppercase()),
        }
    }
}
