//! Optional constraints applied at construction or refinement.

use super::body_matcher::BodyPattern;
use super::headers_matcher::HeadersMatcher;
use super::uri_matcher::QueryParams;

/// Body, header and query constraints for a [`super::RequestPattern`].
///
/// Only members that are set take effect.
#[derive(Debug, Clone, Default)]
pub struct PatternOptions {
    pub body: Option<BodyPattern>,
    pub headers: Option<HeadersMatcher>,
    pub query: Option<QueryParams>,
}

impl PatternOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: impl Into<BodyPattern>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn headers(mut self, headers: HeadersMatcher) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn query(mut self, query: impl Into<QueryParams>) -> Self {
        self.query = Some(query.into());
        self
    }
}
