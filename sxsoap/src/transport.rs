//! HTTP transport: one blocking POST per SOAP call

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, trace};
use ureq::Agent;
use ureq::tls::TlsConfig;

use crate::error::TransportError;

/// Délai de connexion TCP par défaut
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(30);

pub const USER_AGENT: &str = concat!("sxsoap/", env!("CARGO_PKG_VERSION"));

pub const CONTENT_TYPE: &str = r#"text/xml; charset="utf-8""#;

/// HTTP Basic credentials sent with every call.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub login: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Valeur de l'en-tête `Authorization`
    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.login, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("login", &self.login)
            .field("password", &"********")
            .finish()
    }
}

/// How the server certificate is checked.
#[derive(Clone, Default)]
pub enum TlsMode {
    #[default]
    Verify,
    /// Accept any certificate; only for self-signed lab servers
    SkipVerify,
    Custom(TlsConfig),
}

impl fmt::Debug for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsMode::Verify => f.write_str("Verify"),
            TlsMode::SkipVerify => f.write_str("SkipVerify"),
            TlsMode::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl TlsMode {
    fn to_tls_config(&self) -> TlsConfig {
        match self {
            TlsMode::Verify => TlsConfig::default(),
            TlsMode::SkipVerify => TlsConfig::builder().disable_verification(true).build(),
            TlsMode::Custom(config) => config.clone(),
        }
    }
}

/// Client configuration, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    pub tls: TlsMode,
    pub dial_timeout: Duration,
    /// Deadline for the whole exchange, connection included
    pub request_timeout: Option<Duration>,
    pub basic_auth: Option<BasicAuth>,
    pub user_agent: String,
    pub extra_headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tls: TlsMode::default(),
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            request_timeout: None,
            basic_auth: None,
            user_agent: USER_AGENT.to_string(),
            extra_headers: Vec::new(),
        }
    }

    /// `false` désactive la vérification du certificat serveur
    pub fn tls_verify(mut self, verify: bool) -> Self {
        self.tls = if verify {
            TlsMode::Verify
        } else {
            TlsMode::SkipVerify
        };
        self
    }

    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.tls = TlsMode::Custom(config);
        self
    }

    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn basic_auth(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth::new(login, password));
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Agent HTTP configuré : timeouts et TLS, statuts 4xx/5xx non convertis en erreurs
    pub fn agent(&self) -> Agent {
        Agent::config_builder()
            .http_status_as_error(false)
            .max_idle_connections(0)
            .timeout_connect(Some(self.dial_timeout))
            .timeout_global(self.request_timeout)
            .tls_config(self.tls.to_tls_config())
            .build()
            .into()
    }
}

/// Blocking HTTP transport.
///
/// The agent does not treat 4xx/5xx as errors: SOAP servers answer faults
/// with a 500 and the body must still be read.
pub struct Transport {
    agent: Agent,
    url: String,
    user_agent: String,
    authorization: Option<String>,
    extra_headers: Vec<(String, String)>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("url", &self.url)
            .field("user_agent", &self.user_agent)
            .field("authorization", &self.authorization.as_ref().map(|_| "********"))
            .finish_non_exhaustive()
    }
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            agent: config.agent(),
            url: config.url.clone(),
            user_agent: config.user_agent.clone(),
            authorization: config.basic_auth.as_ref().map(BasicAuth::header_value),
            extra_headers: config.extra_headers.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Envoie `body` avec l'en-tête `SOAPAction` et renvoie le corps de la réponse
    ///
    /// Whatever the status code, a non-empty body is handed back for decoding.
    /// A non-2xx status with an empty body is reported as [`TransportError::Status`].
    pub fn post(&self, action: &str, body: &[u8]) -> Result<Vec<u8>, TransportError> {
        let mut request = self
            .agent
            .post(&self.url)
            .header("Content-Type", CONTENT_TYPE)
            .header("SOAPAction", action)
            .header("User-Agent", &self.user_agent)
            .header("Connection", "close");

        if let Some(authorization) = &self.authorization {
            request = request.header("Authorization", authorization);
        }
        for (name, value) in &self.extra_headers {
            request = request.header(name, value);
        }

        debug!(url = %self.url, action = %action, bytes = body.len(), "POST SOAP request");

        let mut response = request.send(body)?;
        let status = response.status();
        let payload = response.body_mut().read_to_vec()?;

        trace!(status = status.as_u16(), bytes = payload.len(), "SOAP response received");

        if payload.is_empty() && !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_header_value() {
        let auth = BasicAuth::new("alice", "open sesame");
        assert_eq!(auth.header_value(), "Basic YWxpY2U6b3BlbiBzZXNhbWU=");
    }

    #[test]
    fn basic_auth_debug_hides_password() {
        let debug = format!("{:?}", BasicAuth::new("alice", "open sesame"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("sesame"));
    }

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("https://ss.example.com/ws.asmx");

        assert_eq!(config.dial_timeout, Duration::from_secs(30));
        assert!(config.request_timeout.is_none());
        assert!(matches!(config.tls, TlsMode::Verify));
        assert!(config.basic_auth.is_none());
        assert!(config.user_agent.starts_with("sxsoap/"));
    }

    #[test]
    fn config_builder_chain() {
        let config = ClientConfig::new("http://localhost")
            .tls_verify(false)
            .dial_timeout(Duration::from_secs(2))
            .request_timeout(Duration::from_secs(10))
            .basic_auth("u", "p")
            .user_agent("tests/1.0")
            .header("X-Trace", "42");

        assert!(matches!(config.tls, TlsMode::SkipVerify));
        assert_eq!(config.dial_timeout, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.basic_auth, Some(BasicAuth::new("u", "p")));
        assert_eq!(config.user_agent, "tests/1.0");
        assert_eq!(config.extra_headers, vec![("X-Trace".to_string(), "42".to_string())]);
    }

    #[test]
    fn agent_keeps_no_idle_connections() {
        let config = ClientConfig::new("http://localhost").dial_timeout(Duration::from_secs(3));
        let agent = config.agent();

        assert_eq!(agent.config().max_idle_connections(), 0);
        assert!(!agent.config().http_status_as_error());
    }
}
