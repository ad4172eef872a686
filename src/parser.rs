//! Client policy parsing from connection string query parameters.
//!
//! Every recognised key is looked up and converted on its own. A key that is
//! absent, blank or carries a value that does not convert leaves the field at
//! its default; callers never see a per-field error. Malformed values are
//! reported through `tracing` at `warn` level.

use std::fmt::Display;
use std::str::FromStr;

use tracing::{debug, trace, warn};

use crate::connection::AerospikeUrl;
use crate::duration::parse_duration;
use crate::policy::{AuthMode, ClientPolicy};

/// Query keys understood by [`ClientPolicyParser`].
pub mod keys {
    /// Authentication mode (`auth_mode_internal`, `auth_mode_external`, `auth_mode_pki`).
    pub const AUTH_MODE: &str = "auth_mode";
    /// Expected cluster name.
    pub const CLUSTER_NAME: &str = "cluster_name";
    /// Connection timeout duration.
    pub const TIMEOUT: &str = "timeout";
    /// Idle socket timeout duration.
    pub const IDLE_TIMEOUT: &str = "idle_timeout";
    /// Login timeout duration.
    pub const LOGIN_TIMEOUT: &str = "login_timeout";
    /// Per-node connection pool size.
    pub const CONNECTION_QUEUE_SIZE: &str = "connection_queue_size";
    /// Minimum connections per node.
    pub const MIN_CONNECTIONS_PER_NODE: &str = "min_connections_per_node";
    /// Maximum error rate per node.
    pub const MAX_ERROR_RATE: &str = "max_error_rate";
    /// Error rate window in tend iterations.
    pub const ERROR_RATE_WINDOW: &str = "error_rate_window";
    /// Cap connections at the queue size.
    pub const LIMIT_CONNECTIONS_TO_QUEUE_SIZE: &str = "limit_connections_to_queue_size";
    /// Concurrent opening connection limit.
    pub const OPENING_CONNECTION_THRESHOLD: &str = "opening_connection_threshold";
    /// Fail if no seed node is reachable.
    pub const FAIL_IF_NOT_CONNECTED: &str = "fail_if_not_connected";
    /// Cluster tend interval duration.
    pub const TEND_INTERVAL: &str = "tend_interval";
    /// Use `services-alternate` for peer discovery.
    pub const USE_SERVICES_ALTERNATE: &str = "use_services_alternate";
    /// Enable rack awareness.
    pub const RACK_AWARE: &str = "rack_aware";
    /// Rack id of the client.
    pub const RACK_ID: &str = "rack_id";
    /// Ignore node addresses on other subnets.
    pub const IGNORE_SUBNET_ALIASES: &str = "ignore_subnet_aliases";
    /// Only use the seed nodes.
    pub const SEED_ONLY_CLUSTER: &str = "seed_only_cluster";

    /// All recognised query keys.
    pub const ALL: [&str; 18] = [
        AUTH_MODE,
        CLUSTER_NAME,
        TIMEOUT,
        IDLE_TIMEOUT,
        LOGIN_TIMEOUT,
        CONNECTION_QUEUE_SIZE,
        MIN_CONNECTIONS_PER_NODE,
        MAX_ERROR_RATE,
        ERROR_RATE_WINDOW,
        LIMIT_CONNECTIONS_TO_QUEUE_SIZE,
        OPENING_CONNECTION_THRESHOLD,
        FAIL_IF_NOT_CONNECTED,
        TEND_INTERVAL,
        USE_SERVICES_ALTERNATE,
        RACK_AWARE,
        RACK_ID,
        IGNORE_SUBNET_ALIASES,
        SEED_ONLY_CLUSTER,
    ];
}

/// Parse a client policy from a validated URL.
///
/// Returns `None` when the URL has no query parameters, in which case the
/// client should be built with the library defaults.
#[must_use]
pub fn parse_policy(url: &AerospikeUrl) -> Option<ClientPolicy> {
    if !url.has_query() {
        return None;
    }
    Some(ClientPolicyParser::new(url).parse())
}

/// Outcome of looking up a single query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Field<T> {
    /// The key is missing or its value is blank.
    Absent,
    /// The value did not convert to the field type.
    Malformed { raw: String, reason: String },
    /// The converted value.
    Value(T),
}

/// Populates a [`ClientPolicy`] from the query parameters and userinfo of an
/// [`AerospikeUrl`], one field at a time.
#[derive(Debug)]
pub struct ClientPolicyParser<'a> {
    url: &'a AerospikeUrl,
    policy: ClientPolicy,
}

impl<'a> ClientPolicyParser<'a> {
    /// Create a parser starting from the default policy.
    #[must_use]
    pub fn new(url: &'a AerospikeUrl) -> Self {
        Self::with_policy(url, ClientPolicy::default())
    }

    /// Create a parser that layers the URL on top of an existing policy.
    #[must_use]
    pub fn with_policy(url: &'a AerospikeUrl, policy: ClientPolicy) -> Self {
        Self { url, policy }
    }

    /// Apply every recognised field and return the policy.
    #[must_use]
    pub fn parse(mut self) -> ClientPolicy {
        for key in self.url.query().keys() {
            if !keys::ALL.contains(&key.as_str()) {
                debug!(key = %key, "Ignoring unrecognised query parameter");
            }
        }

        self.auth_mode();
        self.user();
        self.password();
        self.cluster_name();
        self.timeout();
        self.idle_timeout();
        self.login_timeout();
        self.connection_queue_size();
        self.min_connections_per_node();
        self.max_error_rate();
        self.error_rate_window();
        self.limit_connections_to_queue_size();
        self.opening_connection_threshold();
        self.fail_if_not_connected();
        self.tend_interval();
        self.use_services_alternate();
        self.rack_aware();
        self.rack_id();
        self.ignore_other_subnet_aliases();
        self.seed_only_cluster();

        self.policy
    }

    /// Get the policy built so far.
    #[must_use]
    pub fn policy(&self) -> &ClientPolicy {
        &self.policy
    }

    /// Consume the parser and return the policy built so far.
    #[must_use]
    pub fn into_policy(self) -> ClientPolicy {
        self.policy
    }

    /// Parse `auth_mode`. The literal must match exactly.
    pub fn auth_mode(&mut self) {
        if let Some(mode) = self.try_parse(keys::AUTH_MODE, false, str::parse::<AuthMode>) {
            self.policy.auth_mode = mode;
        }
    }

    /// Take the user from the URL userinfo.
    pub fn user(&mut self) {
        if let Some(user) = self.url.username() {
            self.policy.user = Some(user.to_string());
        }
    }

    /// Take the password from the URL userinfo.
    pub fn password(&mut self) {
        if let Some(password) = self.url.password() {
            self.policy.password = Some(password.to_string());
        }
    }

    /// Parse `cluster_name`.
    pub fn cluster_name(&mut self) {
        if let Some(name) = self.try_parse(keys::CLUSTER_NAME, false, |v| {
            Ok::<_, std::convert::Infallible>(v.to_string())
        }) {
            self.policy.cluster_name = Some(name);
        }
    }

    /// Parse `timeout`.
    pub fn timeout(&mut self) {
        if let Some(timeout) = self.try_parse(keys::TIMEOUT, false, parse_duration) {
            self.policy.timeout = timeout;
        }
    }

    /// Parse `idle_timeout`.
    pub fn idle_timeout(&mut self) {
        if let Some(timeout) = self.try_parse(keys::IDLE_TIMEOUT, false, parse_duration) {
            self.policy.idle_timeout = timeout;
        }
    }

    /// Parse `login_timeout`.
    pub fn login_timeout(&mut self) {
        if let Some(timeout) = self.try_parse(keys::LOGIN_TIMEOUT, false, parse_duration) {
            self.policy.login_timeout = timeout;
        }
    }

    /// Parse `tend_interval`.
    pub fn tend_interval(&mut self) {
        if let Some(interval) = self.try_parse(keys::TEND_INTERVAL, false, parse_duration) {
            self.policy.tend_interval = interval;
        }
    }

    /// Parse `connection_queue_size`.
    pub fn connection_queue_size(&mut self) {
        if let Some(size) = self.try_number(keys::CONNECTION_QUEUE_SIZE) {
            self.policy.connection_queue_size = size;
        }
    }

    /// Parse `min_connections_per_node`.
    pub fn min_connections_per_node(&mut self) {
        if let Some(min) = self.try_number(keys::MIN_CONNECTIONS_PER_NODE) {
            self.policy.min_connections_per_node = min;
        }
    }

    /// Parse `max_error_rate`.
    pub fn max_error_rate(&mut self) {
        if let Some(rate) = self.try_number(keys::MAX_ERROR_RATE) {
            self.policy.max_error_rate = rate;
        }
    }

    /// Parse `error_rate_window`.
    pub fn error_rate_window(&mut self) {
        if let Some(window) = self.try_number(keys::ERROR_RATE_WINDOW) {
            self.policy.error_rate_window = window;
        }
    }

    /// Parse `opening_connection_threshold`.
    pub fn opening_connection_threshold(&mut self) {
        if let Some(threshold) = self.try_number(keys::OPENING_CONNECTION_THRESHOLD) {
            self.policy.opening_connection_threshold = threshold;
        }
    }

    /// Parse `rack_id`.
    pub fn rack_id(&mut self) {
        if let Some(rack_id) = self.try_number(keys::RACK_ID) {
            self.policy.rack_id = rack_id;
        }
    }

    /// Parse `limit_connections_to_queue_size`.
    pub fn limit_connections_to_queue_size(&mut self) {
        if let Some(flag) = self.try_bool(keys::LIMIT_CONNECTIONS_TO_QUEUE_SIZE) {
            self.policy.limit_connections_to_queue_size = flag;
        }
    }

    /// Parse `fail_if_not_connected`.
    pub fn fail_if_not_connected(&mut self) {
        if let Some(flag) = self.try_bool(keys::FAIL_IF_NOT_CONNECTED) {
            self.policy.fail_if_not_connected = flag;
        }
    }

    /// Parse `use_services_alternate`.
    pub fn use_services_alternate(&mut self) {
        if let Some(flag) = self.try_bool(keys::USE_SERVICES_ALTERNATE) {
            self.policy.use_services_alternate = flag;
        }
    }

    /// Parse `rack_aware`.
    pub fn rack_aware(&mut self) {
        if let Some(flag) = self.try_bool(keys::RACK_AWARE) {
            self.policy.rack_aware = flag;
        }
    }

    /// Parse `ignore_subnet_aliases`.
    pub fn ignore_other_subnet_aliases(&mut self) {
        if let Some(flag) = self.try_bool(keys::IGNORE_SUBNET_ALIASES) {
            self.policy.ignore_other_subnet_aliases = flag;
        }
    }

    /// Parse `seed_only_cluster`.
    pub fn seed_only_cluster(&mut self) {
        if let Some(flag) = self.try_bool(keys::SEED_ONLY_CLUSTER) {
            self.policy.seed_only_cluster = flag;
        }
    }

    fn try_number<T>(&self, key: &'static str) -> Option<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.try_parse(key, true, str::parse::<T>)
    }

    fn try_bool(&self, key: &'static str) -> Option<bool> {
        self.try_parse(key, true, parse_bool)
    }

    /// Look up `key` and convert it, collapsing the outcome to an option.
    fn try_parse<T, E, F>(&self, key: &'static str, trim: bool, convert: F) -> Option<T>
    where
        E: Display,
        F: FnOnce(&str) -> Result<T, E>,
    {
        match self.lookup(key, trim, convert) {
            Field::Absent => None,
            Field::Malformed { raw, reason } => {
                warn!(key, value = %raw, reason = %reason, "Ignoring malformed policy value");
                None
            }
            Field::Value(value) => {
                trace!(key, "Applied policy value");
                Some(value)
            }
        }
    }

    pub(crate) fn lookup<T, E, F>(&self, key: &str, trim: bool, convert: F) -> Field<T>
    where
        E: Display,
        F: FnOnce(&str) -> Result<T, E>,
    {
        let Some(raw) = self.url.query_param(key) else {
            return Field::Absent;
        };
        let value = if trim { raw.trim() } else { raw };
        if value.is_empty() {
            return Field::Absent;
        }

        match convert(value) {
            Ok(parsed) => Field::Value(parsed),
            Err(e) => Field::Malformed {
                raw: raw.to_string(),
                reason: e.to_string(),
            },
        }
    }
}

/// Error returned for boolean literals outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid boolean '{0}'")]
pub struct InvalidBool(String);

/// Parse a boolean literal: `1 t T TRUE true True` or `0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Result<bool, InvalidBool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(InvalidBool(other.to_string())),
    }
}
