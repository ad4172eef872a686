//! Client factory.
//!
//! [`AerospikeClientFactory`] holds the resolved address and the optional
//! policy. Building a client is delegated to a [`ClientConnector`], the seam
//! where the actual database client library plugs in.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::connection::AerospikeUrl;
use crate::error::AeroUrlResult;
use crate::policy::ClientPolicy;

/// Construction entry points of a database client library.
///
/// Implementations wrap the library's "new client" and "new client with
/// policy" constructors. Their errors are returned to callers of
/// [`AerospikeClientFactory::build`] unchanged.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    /// The client handle produced.
    type Client: Send;

    /// The error raised when a client cannot be created.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a client with the library's default policy.
    async fn connect(&self, hostname: &str, port: u16) -> Result<Self::Client, Self::Error>;

    /// Create a client with an explicit policy.
    async fn connect_with_policy(
        &self,
        policy: &ClientPolicy,
        hostname: &str,
        port: u16,
    ) -> Result<Self::Client, Self::Error>;
}

/// Assembles hostname, port, namespace and client policy for building a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AerospikeClientFactory {
    hostname: String,
    port: u16,
    namespace: String,
    policy: Option<ClientPolicy>,
}

impl AerospikeClientFactory {
    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory holding the address parts of a validated URL.
    ///
    /// No policy is attached; see [`crate::parse`] for the full pipeline.
    #[must_use]
    pub fn from_url(url: &AerospikeUrl) -> Self {
        let mut factory = Self::new();
        factory.set_address(url.hostname(), url.port(), url.namespace());
        factory
    }

    /// Parse the connection string held in `AEROSPIKE_URL`.
    pub fn from_env() -> AeroUrlResult<Self> {
        crate::parse_from_env()
    }

    /// Set hostname, port and namespace at once.
    pub fn set_address(
        &mut self,
        hostname: impl Into<String>,
        port: u16,
        namespace: impl Into<String>,
    ) {
        self.hostname = hostname.into();
        self.port = port;
        self.namespace = namespace.into();
    }

    /// Set the hostname.
    pub fn set_hostname(&mut self, hostname: impl Into<String>) {
        self.hostname = hostname.into();
    }

    /// Get the hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Set the port.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Get the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Set the namespace.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    /// Get the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Set the client policy.
    pub fn set_client_policy(&mut self, policy: ClientPolicy) {
        self.policy = Some(policy);
    }

    /// Get the client policy, if one was set.
    #[must_use]
    pub fn client_policy(&self) -> Option<&ClientPolicy> {
        self.policy.as_ref()
    }

    /// Remove and return the client policy, reverting to library defaults.
    pub fn take_client_policy(&mut self) -> Option<ClientPolicy> {
        self.policy.take()
    }

    /// Build a client.
    ///
    /// Without a policy the connector's default constructor is used,
    /// otherwise the policy is passed along. Each call creates a new client.
    pub async fn build<C: ClientConnector>(&self, connector: &C) -> Result<C::Client, C::Error> {
        debug!(
            hostname = %self.hostname,
            port = self.port,
            with_policy = self.policy.is_some(),
            "Building Aerospike client"
        );

        let client = match &self.policy {
            None => connector.connect(&self.hostname, self.port).await?,
            Some(policy) => {
                connector
                    .connect_with_policy(policy, &self.hostname, self.port)
                    .await?
            }
        };

        info!(
            hostname = %self.hostname,
            port = self.port,
            namespace = %self.namespace,
            "Aerospike client created"
        );
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Default(String, u16),
        WithPolicy(ClientPolicy, String, u16),
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused: {0}")]
    struct Refused(String);

    #[derive(Default)]
    struct RecordingConnector {
        calls: Mutex<Vec<Call>>,
        refuse: bool,
    }

    #[async_trait]
    impl ClientConnector for RecordingConnector {
        type Client = usize;
        type Error = Refused;

        async fn connect(&self, hostname: &str, port: u16) -> Result<usize, Refused> {
            if self.refuse {
                return Err(Refused(format!("{hostname}:{port}")));
            }
            let mut calls = self.calls.lock();
            calls.push(Call::Default(hostname.to_string(), port));
            Ok(calls.len())
        }

        async fn connect_with_policy(
            &self,
            policy: &ClientPolicy,
            hostname: &str,
            port: u16,
        ) -> Result<usize, Refused> {
            if self.refuse {
                return Err(Refused(format!("{hostname}:{port}")));
            }
            let mut calls = self.calls.lock();
            calls.push(Call::WithPolicy(policy.clone(), hostname.to_string(), port));
            Ok(calls.len())
        }
    }

    #[test]
    fn test_setters() {
        let mut factory = AerospikeClientFactory::new();
        factory.set_address("10.0.0.1", 3000, "test");
        assert_eq!(factory.hostname(), "10.0.0.1");
        assert_eq!(factory.port(), 3000);
        assert_eq!(factory.namespace(), "test");

        factory.set_hostname("10.0.0.2");
        factory.set_port(3100);
        factory.set_namespace("prod");
        assert_eq!(factory.hostname(), "10.0.0.2");
        assert_eq!(factory.port(), 3100);
        assert_eq!(factory.namespace(), "prod");
        assert!(factory.client_policy().is_none());
    }

    #[test]
    fn test_policy_accessors() {
        let mut factory = AerospikeClientFactory::new();
        factory.set_client_policy(ClientPolicy::new().with_rack(1));
        assert_eq!(factory.client_policy().map(|p| p.rack_id), Some(1));

        let taken = factory.take_client_policy();
        assert!(taken.is_some());
        assert!(factory.client_policy().is_none());
    }

    #[test]
    fn test_from_url() {
        let url = AerospikeUrl::parse("aerospike://db.local:3000/users?rack_id=2").unwrap();
        let factory = AerospikeClientFactory::from_url(&url);
        assert_eq!(factory.hostname(), "db.local");
        assert_eq!(factory.port(), 3000);
        assert_eq!(factory.namespace(), "users");
        assert!(factory.client_policy().is_none());
    }

    #[tokio::test]
    async fn test_build_without_policy_uses_default_constructor() {
        let connector = RecordingConnector::default();
        let mut factory = AerospikeClientFactory::new();
        factory.set_address("127.0.0.1", 3000, "test");

        let client = factory.build(&connector).await.unwrap();
        assert_eq!(client, 1);
        assert_eq!(
            connector.calls.lock().as_slice(),
            &[Call::Default("127.0.0.1".into(), 3000)]
        );
    }

    #[tokio::test]
    async fn test_build_with_policy_passes_policy() {
        let connector = RecordingConnector::default();
        let policy = ClientPolicy::new().with_cluster_name("edge");
        let mut factory = AerospikeClientFactory::new();
        factory.set_address("127.0.0.1", 3000, "test");
        factory.set_client_policy(policy.clone());

        factory.build(&connector).await.unwrap();
        assert_eq!(
            connector.calls.lock().as_slice(),
            &[Call::WithPolicy(policy, "127.0.0.1".into(), 3000)]
        );
    }

    #[tokio::test]
    async fn test_build_is_repeatable() {
        let connector = RecordingConnector::default();
        let mut factory = AerospikeClientFactory::new();
        factory.set_address("127.0.0.1", 3000, "test");

        assert_eq!(factory.build(&connector).await.unwrap(), 1);
        assert_eq!(factory.build(&connector).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_build_passes_connector_error_through() {
        let connector = RecordingConnector {
            refuse: true,
            ..Default::default()
        };
        let mut factory = AerospikeClientFactory::new();
        factory.set_address("10.255.255.1", 3000, "test");

        let err = factory.build(&connector).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused: 10.255.255.1:3000");
    }
}
