//! URI normalization and textual variations.
//!
//! [`NormalizedUri`] wraps a parsed [`url::Url`] together with its decoded
//! query mapping. Two normalized URIs are equal when scheme, userinfo, host,
//! effective port, path and query mapping agree, so `http://example.com:80/a`
//! and `http://example.com/a` compare equal.

use crate::error::{PatternError, Result};
use crate::query::{encode_query, parse_query_string, QueryMap};
use std::fmt;
use url::Url;

/// A URI in canonical form.
#[derive(Debug, Clone)]
pub struct NormalizedUri {
    url: Url,
    query: QueryMap,
}

impl NormalizedUri {
    /// Normalize a textual URI.
    ///
    /// A missing scheme defaults to `http`. Fragments are dropped, percent
    /// escapes of unreserved path characters are decoded and the remaining
    /// escapes use uppercase hex digits.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.starts_with('/') {
            return Err(PatternError::InvalidUri {
                uri: input.to_string(),
                source: url::ParseError::RelativeUrlWithoutBase,
            });
        }
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        let mut url = Url::parse(&candidate).map_err(|source| PatternError::InvalidUri {
            uri: input.to_string(),
            source,
        })?;
        url.set_fragment(None);
        let path = canonicalize_percent_encoding(url.path());
        url.set_path(&path);

        let query = url.query().map(parse_query_string).unwrap_or_default();
        Ok(Self { url, query })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Effective port: the explicit port, or the scheme's default.
    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> &QueryMap {
        &self.query
    }

    /// Merge parameters into the query mapping. Incoming keys win.
    pub fn merge_query(&mut self, params: QueryMap) {
        for (key, value) in params {
            self.query.insert(key, value);
        }
    }

    fn uses_default_port(&self) -> bool {
        self.url.port().is_none() && self.url.port_or_known_default().is_some()
    }

    fn render(&self, form: Form) -> String {
        let mut out = String::new();
        if form.with_scheme {
            out.push_str(self.url.scheme());
            out.push_str("://");
        }

        let username = self.url.username();
        if !username.is_empty() {
            out.push_str(username);
            if let Some(password) = self.url.password() {
                out.push(':');
                out.push_str(password);
            }
            out.push('@');
        }

        out.push_str(self.url.host_str().unwrap_or(""));

        match self.url.port() {
            Some(port) => out.push_str(&format!(":{port}")),
            None if form.explicit_port => {
                if let Some(port) = self.url.port_or_known_default() {
                    out.push_str(&format!(":{port}"));
                }
            }
            None => {}
        }

        let path = self.url.path();
        if form.root_slash || path != "/" {
            out.push_str(path);
        }

        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&encode_query(&self.query));
        }

        if form.decoded {
            if let Ok(decoded) = urlencoding::decode(&out) {
                return decoded.into_owned();
            }
        }
        out
    }
}

impl PartialEq for NormalizedUri {
    fn eq(&self, other: &Self) -> bool {
        self.url.scheme() == other.url.scheme()
            && self.url.username() == other.url.username()
            && self.url.password() == other.url.password()
            && self.url.host_str() == other.url.host_str()
            && self.url.port_or_known_default() == other.url.port_or_known_default()
            && self.url.path() == other.url.path()
            && self.query == other.query
    }
}

impl Eq for NormalizedUri {}

impl fmt::Display for NormalizedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Form::CANONICAL))
    }
}

impl std::str::FromStr for NormalizedUri {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Rendering switches for one textual variation.
#[derive(Debug, Clone, Copy)]
struct Form {
    explicit_port: bool,
    root_slash: bool,
    decoded: bool,
    with_scheme: bool,
}

impl Form {
    const CANONICAL: Form = Form {
        explicit_port: false,
        root_slash: true,
        decoded: false,
        with_scheme: true,
    };
}

/// Textual variations of a URI, tested by regex URI matchers.
///
/// Starting from the canonical string with an explicit port, each stage
/// adds a variant of every entry collected so far:
///
/// 1. root path (`/`) only: without the trailing slash
/// 2. default port only: without the port
/// 3. percent-decoded
/// 4. `http` scheme only: without the `http://` prefix
///
/// The result is de-duplicated and keeps first-seen order.
pub fn variations(uri: &NormalizedUri) -> Vec<String> {
    let mut forms = vec![Form {
        explicit_port: true,
        ..Form::CANONICAL
    }];

    if uri.path() == "/" {
        forms = expand(forms, |f| Form { root_slash: false, ..f });
    }
    if uri.uses_default_port() {
        forms = expand(forms, |f| Form { explicit_port: false, ..f });
    }
    forms = expand(forms, |f| Form { decoded: true, ..f });
    if uri.scheme() == "http" {
        forms = expand(forms, |f| Form { with_scheme: false, ..f });
    }

    let mut rendered: Vec<String> = Vec::with_capacity(forms.len());
    for form in forms {
        let text = uri.render(form);
        if !rendered.contains(&text) {
            rendered.push(text);
        }
    }
    rendered
}

fn expand(forms: Vec<Form>, variant: impl Fn(Form) -> Form) -> Vec<Form> {
    forms.into_iter().flat_map(|f| [f, variant(f)]).collect()
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// Decode escapes of unreserved characters and uppercase the hex digits of
/// every other escape. Input is an already-encoded (ASCII) path.
fn canonicalize_percent_encoding(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hex = &path[i + 1..i + 3];
            if let Ok(byte) = u8::from_str_radix(hex, 16) {
                if is_unreserved(byte) {
                    out.push(char::from(byte));
                } else {
                    out.push('%');
                    out.push_str(&hex.to_ascii_uppercase());
                }
                i += 3;
                continue;
            }
        }
        out.push(char::from(bytes[i]));
        i += 1;
    }
    out
}
