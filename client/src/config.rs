//! Connection settings for a `Session`.

use rt_core::Auth;
use serde::Deserialize;

fn default_verify_tls() -> bool {
    true
}

/// Where the RT server lives and how to authenticate against it.
///
/// Deserializable so callers can embed it in their own configuration files:
///
/// ```
/// # use rt_client::ClientConfig;
/// let config: ClientConfig = serde_json::from_str(
///     r#"{"server": "https://rt.example.com", "auth": {"token": "1-23-abc"}}"#,
/// ).unwrap();
/// assert!(config.verify_tls);
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// Server root, optionally with scheme and port.
    pub server: String,
    #[serde(default)]
    pub auth: Auth,
    /// Verify the server's TLS certificate.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

impl ClientConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            auth: Auth::None,
            verify_tls: true,
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::token(token);
        self
    }

    pub fn login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Auth::login(username, password);
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }
}
