//! Transport schemes and structured scheme rewriting.

use std::fmt;

use url::{ParseError, Position, Url};

use crate::error::{Error, Result};

/// A URL transport scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plaintext `http`
    Http,
    /// Encrypted `https`
    Https,
}

impl Scheme {
    /// Returns the scheme for a secure or plaintext transport.
    pub fn for_transport(secure: bool) -> Self {
        if secure {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    /// Returns the scheme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Returns true for [`Scheme::Https`].
    pub fn is_secure(&self) -> bool {
        matches!(self, Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `input` is an absolute or scheme-relative URL.
///
/// Matches `^(https?:)?//`: `http://…`, `https://…` and `//…`. Such URLs
/// are treated as already resolved and are never rewritten.
///
/// # Examples
///
/// ```
/// use secure_routes::is_absolute_url;
///
/// assert!(is_absolute_url("https://cdn.example.com/app.js"));
/// assert!(is_absolute_url("//cdn.example.com/app.js"));
/// assert!(!is_absolute_url("/users/login"));
/// assert!(!is_absolute_url("ftp://files.example.com"));
/// ```
pub fn is_absolute_url(input: &str) -> bool {
    let rest = input
        .strip_prefix("https:")
        .or_else(|| input.strip_prefix("http:"))
        .unwrap_or(input);
    rest.starts_with("//")
}

/// Rebuilds `url` as `<scheme>://<host><path?query#fragment>`.
///
/// `url` may be absolute, in which case its scheme and authority are
/// discarded, or relative. `host` may carry a port. The host is normalized
/// the way [`Url`] parses it: lowercased, IDNA-encoded, and with a default
/// port such as `:443` on `https` dropped.
///
/// The path, query and fragment are set as components on the rebuilt URL,
/// so nothing in them can change the host.
///
/// # Errors
///
/// Returns [`Error::Url`] if `host` or `url` cannot be parsed, and
/// [`Error::DotSegments`] if the path of `url` contains `.` or `..`
/// segments.
///
/// # Examples
///
/// ```
/// use secure_routes::{rewrite_scheme, Scheme};
///
/// let url = rewrite_scheme("http://localhost/cart?step=2", Scheme::Https, "shop.example.com").unwrap();
/// assert_eq!(url, "https://shop.example.com/cart?step=2");
///
/// let url = rewrite_scheme("/cart", Scheme::Http, "shop.example.com:8080").unwrap();
/// assert_eq!(url, "http://shop.example.com:8080/cart");
/// ```
pub fn rewrite_scheme(url: &str, scheme: Scheme, host: &str) -> Result<String> {
    if has_dot_segments(url) {
        return Err(Error::DotSegments(url.to_string()));
    }

    let relative = relative_part(url)?;
    let (path, query, fragment) = split_relative(&relative);

    let mut rewritten = Url::parse(&format!("{}://{}", scheme, host))?;
    rewritten.set_path(path);
    rewritten.set_query(query);
    rewritten.set_fragment(fragment);

    tracing::debug!(
        from = %url,
        to = %rewritten,
        secure = scheme.is_secure(),
        "Rewrote URL scheme"
    );
    Ok(rewritten.into())
}

/// Returns the path, query and fragment of `url`, always starting with `/`.
fn relative_part(url: &str) -> Result<String> {
    if url.starts_with("//") {
        let placeholder = Url::parse("http://placeholder.invalid/")?;
        let parsed = placeholder.join(url)?;
        return Ok(parsed[Position::BeforePath..].to_string());
    }

    match Url::parse(url) {
        Ok(parsed) => Ok(parsed[Position::BeforePath..].to_string()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            if url.starts_with('/') {
                Ok(url.to_string())
            } else {
                Ok(format!("/{}", url))
            }
        }
        Err(err) => Err(err.into()),
    }
}

/// Splits `/path?query#fragment` into its components.
fn split_relative(relative: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match relative.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (relative, None),
    };
    match rest.split_once('?') {
        Some((path, query)) => (path, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

/// Returns true if the path of `url` has a `.` or `..` segment, including
/// percent-encoded spellings. Backslashes count as separators.
fn has_dot_segments(url: &str) -> bool {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].split(['/', '\\']).any(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment == "." || segment == ".."
    })
}
