//! Client policy configuration.
//!
//! [`ClientPolicy`] mirrors the tuning knobs of the Aerospike client policy.
//! Its [`Default`] carries the client library's own defaults, so a policy
//! parsed from a URL only differs from the default in the fields the URL sets.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Credential verification mechanism used when logging in to the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Credentials managed by the database itself.
    #[default]
    Internal,
    /// Credentials checked by an external service such as LDAP.
    External,
    /// Certificate based authentication; no password is sent.
    Pki,
}

impl AuthMode {
    /// Get the literal used for this mode in a connection string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "auth_mode_internal",
            Self::External => "auth_mode_external",
            Self::Pki => "auth_mode_pki",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an auth mode literal is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown auth mode '{0}'")]
pub struct UnknownAuthMode(pub String);

impl FromStr for AuthMode {
    type Err = UnknownAuthMode;

    /// Only the exact literals are accepted; no trimming or case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth_mode_internal" => Ok(Self::Internal),
            "auth_mode_external" => Ok(Self::External),
            "auth_mode_pki" => Ok(Self::Pki),
            other => Err(UnknownAuthMode(other.to_string())),
        }
    }
}

/// Tuning parameters handed to the database client when it is built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientPolicy {
    /// Authentication mode.
    pub auth_mode: AuthMode,

    /// User name for authentication.
    pub user: Option<String>,

    /// Password for authentication.
    pub password: Option<String>,

    /// Expected cluster name; nodes reporting another name are rejected.
    pub cluster_name: Option<String>,

    /// Initial connection timeout.
    pub timeout: Duration,

    /// Maximum time a pooled socket may sit idle. Zero disables reaping.
    pub idle_timeout: Duration,

    /// Login timeout.
    pub login_timeout: Duration,

    /// Size of the per-node connection pool.
    pub connection_queue_size: usize,

    /// Connections opened and kept per node at startup.
    pub min_connections_per_node: usize,

    /// Errors allowed per node within `error_rate_window` before back-off.
    pub max_error_rate: u32,

    /// Number of tend iterations that make up one error rate window.
    pub error_rate_window: u32,

    /// Refuse to open more connections than `connection_queue_size`.
    pub limit_connections_to_queue_size: bool,

    /// Maximum number of connections allowed to be opening at once per node.
    pub opening_connection_threshold: usize,

    /// Fail client construction if no seed node can be reached.
    pub fail_if_not_connected: bool,

    /// Interval between cluster tend iterations.
    pub tend_interval: Duration,

    /// Use the `services-alternate` info command for peer discovery.
    pub use_services_alternate: bool,

    /// Prefer reads from nodes in `rack_id`.
    pub rack_aware: bool,

    /// Rack the client is located in.
    pub rack_id: i32,

    /// Ignore node addresses that are on other subnets.
    pub ignore_other_subnet_aliases: bool,

    /// Only connect to the seed nodes, never discover peers.
    pub seed_only_cluster: bool,
}

impl Default for ClientPolicy {
    fn default() -> Self {
        Self {
            auth_mode: AuthMode::Internal,
            user: None,
            password: None,
            cluster_name: None,
            timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(55),
            login_timeout: Duration::from_secs(10),
            connection_queue_size: 100,
            min_connections_per_node: 0,
            max_error_rate: 100,
            error_rate_window: 1,
            limit_connections_to_queue_size: true,
            opening_connection_threshold: 0,
            fail_if_not_connected: true,
            tend_interval: Duration::from_secs(1),
            use_services_alternate: false,
            rack_aware: false,
            rack_id: 0,
            ignore_other_subnet_aliases: false,
            seed_only_cluster: false,
        }
    }
}

impl ClientPolicy {
    /// Create a policy with the client library's defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if credentials are configured.
    #[must_use]
    pub fn requires_authentication(&self) -> bool {
        self.user.is_some()
    }

    /// Set the authentication mode.
    #[must_use]
    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = mode;
        self
    }

    /// Set user and password.
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Set the expected cluster name.
    #[must_use]
    pub fn with_cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the login timeout.
    #[must_use]
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Set the tend interval.
    #[must_use]
    pub fn with_tend_interval(mut self, interval: Duration) -> Self {
        self.tend_interval = interval;
        self
    }

    /// Set the per-node connection pool size.
    #[must_use]
    pub fn with_connection_queue_size(mut self, size: usize) -> Self {
        self.connection_queue_size = size;
        self
    }

    /// Set the minimum connections per node.
    #[must_use]
    pub fn with_min_connections_per_node(mut self, min: usize) -> Self {
        self.min_connections_per_node = min;
        self
    }

    /// Set the error rate limit and its window.
    #[must_use]
    pub fn with_error_rate(mut self, max_error_rate: u32, window: u32) -> Self {
        self.max_error_rate = max_error_rate;
        self.error_rate_window = window;
        self
    }

    /// Enable rack awareness for the given rack.
    #[must_use]
    pub fn with_rack(mut self, rack_id: i32) -> Self {
        self.rack_aware = true;
        self.rack_id = rack_id;
        self
    }
}

impl fmt::Debug for ClientPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientPolicy")
            .field("auth_mode", &self.auth_mode)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cluster_name", &self.cluster_name)
            .field("timeout", &self.timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("login_timeout", &self.login_timeout)
            .field("connection_queue_size", &self.connection_queue_size)
            .field("min_connections_per_node", &self.min_connections_per_node)
            .field("max_error_rate", &self.max_error_rate)
            .field("error_rate_window", &self.error_rate_window)
            .field(
                "limit_connections_to_queue_size",
                &self.limit_connections_to_queue_size,
            )
            .field(
                "opening_connection_threshold",
                &self.opening_connection_threshold,
            )
            .field("fail_if_not_connected", &self.fail_if_not_connected)
            .field("tend_interval", &self.tend_interval)
            .field("use_services_alternate", &self.use_services_alternate)
            .field("rack_aware", &self.rack_aware)
            .field("rack_id", &self.rack_id)
            .field(
                "ignore_other_subnet_aliases",
                &self.ignore_other_subnet_aliases,
            )
            .field("seed_only_cluster", &self.seed_only_cluster)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_policy() {
        let policy = ClientPolicy::default();
        assert_eq!(policy.auth_mode, AuthMode::Internal);
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.idle_timeout, Duration::from_secs(55));
        assert_eq!(policy.login_timeout, Duration::from_secs(10));
        assert_eq!(policy.tend_interval, Duration::from_secs(1));
        assert_eq!(policy.connection_queue_size, 100);
        assert!(policy.limit_connections_to_queue_size);
        assert!(policy.fail_if_not_connected);
        assert!(!policy.requires_authentication());
    }

    #[test]
    fn test_auth_mode_literals() {
        assert_eq!("auth_mode_internal".parse(), Ok(AuthMode::Internal));
        assert_eq!("auth_mode_external".parse(), Ok(AuthMode::External));
        assert_eq!("auth_mode_pki".parse(), Ok(AuthMode::Pki));
        assert!(" auth_mode_pki".parse::<AuthMode>().is_err());
        assert!("AUTH_MODE_PKI".parse::<AuthMode>().is_err());
        assert_eq!(AuthMode::Pki.to_string(), "auth_mode_pki");
    }

    #[test]
    fn test_builder_methods() {
        let policy = ClientPolicy::new()
            .with_auth_mode(AuthMode::External)
            .with_credentials("admin", "secret")
            .with_cluster_name("prod")
            .with_timeout(Duration::from_secs(5))
            .with_error_rate(50, 2)
            .with_rack(3);

        assert_eq!(policy.auth_mode, AuthMode::External);
        assert_eq!(policy.user.as_deref(), Some("admin"));
        assert_eq!(policy.password.as_deref(), Some("secret"));
        assert_eq!(policy.cluster_name.as_deref(), Some("prod"));
        assert_eq!(policy.max_error_rate, 50);
        assert_eq!(policy.error_rate_window, 2);
        assert!(policy.rack_aware);
        assert_eq!(policy.rack_id, 3);
        assert!(policy.requires_authentication());
    }

    #[test]
    fn test_debug_redacts_password() {
        let policy = ClientPolicy::new().with_credentials("admin", "hunter2");
        let debug = format!("{policy:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let policy: ClientPolicy = toml::from_str(
            r#"
                auth_mode = "pki"
                cluster_name = "edge"
                rack_id = 4
            "#,
        )
        .expect("Failed to parse policy");

        assert_eq!(
            policy,
            ClientPolicy {
                auth_mode: AuthMode::Pki,
                cluster_name: Some("edge".into()),
                rack_id: 4,
                ..ClientPolicy::default()
            }
        );
    }

    #[test]
    fn test_serde_json_roundtrip_keeps_durations() {
        let policy = ClientPolicy::new().with_idle_timeout(Duration::from_millis(1500));
        let json = serde_json::to_string(&policy).unwrap();
        let back: ClientPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back.idle_timeout, Duration::from_millis(1500));
    }
}
