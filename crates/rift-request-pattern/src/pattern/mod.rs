//! Request patterns and their component matchers.
//!
//! A [`RequestPattern`] owns one matcher per request attribute and checks
//! them in a fixed order, short-circuiting on the first failure:
//!
//! 1. [`MethodMatcher`] - exact token or wildcard
//! 2. [`UriMatcher`] - normalized equality, or a regex over URI variations
//! 3. [`BodyMatcher`] - literal/regex, or structural match on the decoded body
//! 4. [`HeadersMatcher`] - case-insensitive subset of header values
//! 5. [`SignaturePredicate`] - arbitrary check on the whole signature
//!
//! Body, headers and predicate are optional; a missing one accepts anything.
//! Leaves of every pattern are [`ValueMatcher`]s.

mod body_matcher;
mod headers_matcher;
mod matcher;
mod method_matcher;
mod options;
mod request;
mod uri_matcher;

pub use body_matcher::{BodyMapping, BodyMatcher, BodyPattern};
pub use headers_matcher::HeadersMatcher;
pub use matcher::{ValueMatcher, ValuePredicate};
pub use method_matcher::MethodMatcher;
pub use options::PatternOptions;
pub use request::{RequestPattern, SignaturePredicate};
pub use uri_matcher::{QueryParams, UriMatcher};
