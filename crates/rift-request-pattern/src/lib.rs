//! Request-pattern matching for HTTP mocking.
//!
//! A [`RequestPattern`] decides whether a captured [`RequestSignature`]
//! satisfies a declarative description of method, URI, headers and body.
//! Matching is a pure predicate: patterns are built and refined once, then
//! shared read-only and evaluated any number of times.
//!
//! ```
//! use rift_request_pattern::{
//!     BodyPattern, HeadersMatcher, PatternOptions, RequestPattern, RequestSignature, UriMatcher,
//!     ValueMatcher,
//! };
//!
//! let pattern = RequestPattern::new(
//!     "post",
//!     UriMatcher::regex(r"example\.com/users$").unwrap(),
//!     PatternOptions::new()
//!         .headers(HeadersMatcher::new([("Content-Type", "application/json")]))
//!         .body(BodyPattern::mapping().entry("id", ValueMatcher::regex(r"^\d+$").unwrap())),
//! );
//!
//! let request = RequestSignature::parse("POST", "http://example.com/users")
//!     .unwrap()
//!     .with_header("content-type", "application/json")
//!     .with_body(r#"{"id": "42"}"#);
//!
//! assert!(pattern.matches(&request).unwrap());
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod pattern;
pub mod query;
pub mod signature;
pub mod uri;

pub use config::PatternConfig;
pub use error::{PatternError, Result};
pub use pattern::{
    BodyMapping, BodyMatcher, BodyPattern, HeadersMatcher, MethodMatcher, PatternOptions,
    QueryParams, RequestPattern, SignaturePredicate, UriMatcher, ValueMatcher, ValuePredicate,
};
pub use signature::{HeaderValue, Headers, RequestSignature};
pub use uri::NormalizedUri;
