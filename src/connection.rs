//! Aerospike connection string validation.
//!
//! A connection string has the form
//!
//! ```text
//! aerospike://[user[:password]@]host:port/namespace[/ignored/path...][?key=value&...]
//! ```
//!
//! [`AerospikeUrl::parse`] checks the structural parts one at a time and
//! stops at the first failure, so a value of [`AerospikeUrl`] always carries
//! a hostname, a port and a namespace.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use tracing::debug;
use url::{Host, ParseError, Url};

use crate::error::{AeroUrlError, AeroUrlResult};

/// The only accepted URL scheme.
pub const SCHEME: &str = "aerospike";

/// A validated aerospike connection URL.
#[derive(Clone, PartialEq, Eq)]
pub struct AerospikeUrl {
    hostname: String,
    port: u16,
    namespace: String,
    username: Option<String>,
    password: Option<String>,
    query: HashMap<String, String>,
    url: Url,
}

impl AerospikeUrl {
    /// Parse and validate a connection string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use aerospike_url::AerospikeUrl;
    ///
    /// let url = AerospikeUrl::parse("aerospike://127.0.0.1:3000/test?rack_id=2").unwrap();
    /// assert_eq!(url.hostname(), "127.0.0.1");
    /// assert_eq!(url.port(), 3000);
    /// assert_eq!(url.namespace(), "test");
    /// assert_eq!(url.query_param("rack_id"), Some("2"));
    /// ```
    pub fn parse(conn_str: &str) -> AeroUrlResult<Self> {
        if conn_str.trim().is_empty() {
            return Err(AeroUrlError::EmptyConnectionString);
        }

        let url = Url::parse(conn_str).map_err(|e| classify_parse_error(conn_str, e))?;

        if url.scheme() != SCHEME {
            return Err(AeroUrlError::invalid_scheme(url.scheme()));
        }

        let hostname = resolve_hostname(&url)?;
        let port = url.port().ok_or(AeroUrlError::EmptyPort)?;

        let raw = RawParts::split(conn_str);
        let namespace = resolve_namespace(&raw.path)?;

        let username = Some(decode(url.username())).filter(|user| !user.is_empty());
        let password = raw
            .userinfo
            .as_deref()
            .and_then(|userinfo| userinfo.split_once(':'))
            .map(|(_, password)| decode(password));

        // Later pairs overwrite earlier ones, so the last value for a key wins.
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

        debug!(
            hostname = %hostname,
            port,
            namespace = %namespace,
            params = query.len(),
            "Aerospike URL resolved"
        );

        Ok(Self {
            hostname,
            port,
            namespace,
            username,
            password,
            query,
            url,
        })
    }

    /// Get the hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Get the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the namespace taken from the first path segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the percent-decoded username from the userinfo, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Get the percent-decoded password from the userinfo, if any.
    ///
    /// `Some("")` means a password separator was present with nothing after it.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Get all decoded query parameters.
    #[must_use]
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Get a single query parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Check if the URL carries any query parameters.
    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }

    /// Get the underlying parsed URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl FromStr for AerospikeUrl {
    type Err = AeroUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for AerospikeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AerospikeUrl")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("namespace", &self.namespace)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("query", &self.query)
            .finish()
    }
}

/// Map URL syntax failures onto the structural errors they stand for.
///
/// The generic parser rejects some inputs before the scheme, host and port
/// checks get a chance to run; those are reported as the check that would
/// have failed. Anything else is passed through as an opaque syntax error.
fn classify_parse_error(conn_str: &str, err: ParseError) -> AeroUrlError {
    match err {
        ParseError::RelativeUrlWithoutBase => AeroUrlError::invalid_scheme(""),
        ParseError::EmptyHost | ParseError::InvalidPort => {
            let scheme = raw_scheme(conn_str);
            if !scheme.eq_ignore_ascii_case(SCHEME) {
                AeroUrlError::invalid_scheme(scheme)
            } else if err == ParseError::EmptyHost {
                AeroUrlError::EmptyHostname
            } else {
                AeroUrlError::invalid_port(raw_port(conn_str))
            }
        }
        other => AeroUrlError::Url(other),
    }
}

fn raw_scheme(conn_str: &str) -> &str {
    conn_str
        .trim()
        .split_once(':')
        .map_or("", |(scheme, _)| scheme)
}

fn raw_port(conn_str: &str) -> String {
    let rest = conn_str
        .trim()
        .split_once("://")
        .map_or(conn_str, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

    match host_port.rsplit_once(':') {
        Some((_, port)) if !port.ends_with(']') => port.to_string(),
        _ => String::new(),
    }
}

fn resolve_hostname(url: &Url) -> AeroUrlResult<String> {
    let hostname = match url.host() {
        Some(Host::Domain(domain)) => decode(domain),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => String::new(),
    };

    if hostname.is_empty() {
        return Err(AeroUrlError::EmptyHostname);
    }
    Ok(hostname)
}

/// Userinfo and path as written in the connection string.
///
/// [`Url`] resolves `.` and `..` path segments and drops an empty password,
/// so both are read from the input text once it is known to be a valid URL.
struct RawParts {
    userinfo: Option<String>,
    path: String,
}

impl RawParts {
    fn split(conn_str: &str) -> Self {
        // Same cleanup the URL parser applies before reading the input.
        let cleaned: String = conn_str
            .trim_matches(|c: char| c <= ' ')
            .chars()
            .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
            .collect();

        let rest = cleaned
            .split_once("://")
            .map_or(cleaned.as_str(), |(_, rest)| rest);
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        let path_end = tail.find(['?', '#']).unwrap_or(tail.len());

        Self {
            userinfo: authority
                .rsplit_once('@')
                .map(|(userinfo, _)| userinfo.to_string()),
            path: tail[..path_end].to_string(),
        }
    }
}

/// Extract the namespace from the first path segment.
///
/// Segments after the first are a compatibility suffix and are never looked at.
fn resolve_namespace(path: &str) -> AeroUrlResult<String> {
    let mut segments = path.split('/');
    // A path after an authority starts with '/', leaving an empty first item.
    segments.next();

    let segment = segments.next().ok_or(AeroUrlError::EmptyNamespace)?;
    let namespace = decode(segment);

    if namespace.trim().is_empty() {
        return Err(AeroUrlError::EmptyNamespace);
    }
    if namespace.chars().any(char::is_whitespace) {
        return Err(AeroUrlError::invalid_namespace(namespace));
    }
    Ok(namespace)
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
