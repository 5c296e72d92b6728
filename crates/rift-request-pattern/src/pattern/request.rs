//! The composed request pattern.

use super::body_matcher::BodyMatcher;
use super::headers_matcher::HeadersMatcher;
use super::method_matcher::MethodMatcher;
use super::options::PatternOptions;
use super::uri_matcher::UriMatcher;
use crate::error::Result;
use crate::signature::RequestSignature;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// An arbitrary predicate over the whole request signature, evaluated after
/// every other component.
#[derive(Clone)]
pub struct SignaturePredicate(Arc<dyn Fn(&RequestSignature) -> bool + Send + Sync>);

impl SignaturePredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&RequestSignature) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    fn call(&self, signature: &RequestSignature) -> bool {
        (self.0)(signature)
    }
}

impl fmt::Debug for SignaturePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignaturePredicate(..)")
    }
}

/// Method, URI, body and header constraints plus an optional predicate,
/// matched as a conjunction.
///
/// Build and refine with exclusive access, then share for matching:
///
/// ```
/// use rift_request_pattern::{PatternOptions, RequestPattern, RequestSignature};
///
/// let mut pattern = RequestPattern::parse("get", "http://example.com/search").unwrap();
/// pattern.with(PatternOptions::new().query("q=rust"), None);
///
/// let signature = RequestSignature::parse("GET", "http://example.com:80/search?q=rust").unwrap();
/// assert!(pattern.matches(&signature).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct RequestPattern {
    method: MethodMatcher,
    uri: UriMatcher,
    body: Option<BodyMatcher>,
    headers: Option<HeadersMatcher>,
    predicate: Option<SignaturePredicate>,
}

impl RequestPattern {
    pub fn new(method: impl Into<MethodMatcher>, uri: UriMatcher, options: PatternOptions) -> Self {
        let mut pattern = Self {
            method: method.into(),
            uri,
            body: None,
            headers: None,
            predicate: None,
        };
        pattern.apply(options);
        pattern
    }

    /// Shorthand for an exact-URI pattern with no other constraints.
    pub fn parse(method: &str, uri: &str) -> Result<Self> {
        Ok(Self::new(method, UriMatcher::exact(uri)?, PatternOptions::default()))
    }

    /// Refine the pattern. Options behave as at construction; the predicate
    /// replaces any previous one, and `None` clears it.
    pub fn with(
        &mut self,
        options: PatternOptions,
        predicate: Option<SignaturePredicate>,
    ) -> &mut Self {
        self.apply(options);
        self.predicate = predicate;
        self
    }

    fn apply(&mut self, options: PatternOptions) {
        if let Some(body) = options.body {
            self.body = Some(BodyMatcher::new(body));
        }
        if let Some(headers) = options.headers {
            self.headers = Some(headers);
        }
        if let Some(query) = options.query {
            self.uri.add_query_params(query);
        }
    }

    /// Check a request signature against every component, stopping at the
    /// first that fails.
    ///
    /// Errors only when a structured body pattern needs the body decoded and
    /// decoding fails.
    pub fn matches(&self, signature: &RequestSignature) -> Result<bool> {
        let failed = if !self.method.matches(&signature.method) {
            Some("method")
        } else if !self.uri.matches(&signature.uri) {
            Some("uri")
        } else if !self.body_matches(signature)? {
            Some("body")
        } else if !self
            .headers
            .as_ref()
            .is_none_or(|headers| headers.matches(signature.headers.as_ref()))
        {
            Some("headers")
        } else if !self
            .predicate
            .as_ref()
            .is_none_or(|predicate| predicate.call(signature))
        {
            Some("block")
        } else {
            None
        };

        match failed {
            Some(component) => {
                debug!(
                    component,
                    pattern = %self,
                    request = %signature,
                    "Request pattern did not match"
                );
                Ok(false)
            }
            None => {
                trace!(pattern = %self, "Request pattern matched");
                Ok(true)
            }
        }
    }

    fn body_matches(&self, signature: &RequestSignature) -> Result<bool> {
        match &self.body {
            Some(body) => body.matches(signature.body.as_deref(), &signature.content_type()),
            None => Ok(true),
        }
    }

    /// Human-readable description, e.g.
    /// `POST http://example.com/ with body {"a": "1"} with headers {"x": "y"} with given block`.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    pub fn method(&self) -> &MethodMatcher {
        &self.method
    }

    pub fn uri(&self) -> &UriMatcher {
        &self.uri
    }

    pub fn body(&self) -> Option<&BodyMatcher> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> Option<&HeadersMatcher> {
        self.headers.as_ref()
    }

    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }
}

impl fmt::Display for RequestPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)?;
        if let Some(body) = &self.body {
            write!(f, " with body {}", body.pattern())?;
        }
        if let Some(headers) = &self.headers {
            write!(f, " with headers {headers}")?;
        }
        if self.predicate.is_some() {
            f.write_str(" with given block")?;
        }
        Ok(())
    }
}
