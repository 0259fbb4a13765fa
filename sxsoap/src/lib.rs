//! # sxsoap - client SOAP 1.1
//!
//! Ce crate implémente le transport RPC SOAP 1.1 sur lequel reposent toutes
//! les opérations du Secret Server.
//!
//! ## Fonctionnalités
//!
//! - ✅ Construction d'enveloppes SOAP (header optionnel + body transparent)
//! - ✅ Header WS-Security `UsernameToken` (profil `PasswordText`)
//! - ✅ Décodage en un seul passage : Fault ou contenu typé, jamais les deux
//! - ✅ Transport HTTP bloquant (timeout de connexion, vérification TLS configurable)
//! - ✅ Erreurs distinctes : transport, décodage, fault
//!
//! ## Architecture
//!
//! - [`Envelope`] / [`Body`] / [`Header`] : modèle de l'enveloppe
//! - [`Fault`] : erreur SOAP renvoyée par le serveur
//! - [`SecurityHeader`] : header WS-Security
//! - [`Transport`] : un POST HTTP par appel
//! - [`SoapClient`] : point d'entrée `call(action, request, response)`
//!
//! ## Example
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use sxsoap::{ClientConfig, SoapClient, SoapPayload};
//!
//! #[derive(Serialize)]
//! struct VersionGet {}
//!
//! impl SoapPayload for VersionGet {
//!     const ELEMENT: &'static str = "VersionGet";
//!     const NAMESPACE: &'static str = "urn:thesecretserver.com";
//! }
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct VersionGetResponse {
//!     #[serde(rename = "VersionGetResult", default)]
//!     result: Option<VersionGetResult>,
//! }
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct VersionGetResult {
//!     #[serde(rename = "Version", default)]
//!     version: String,
//! }
//!
//! let client = SoapClient::new(ClientConfig::new("https://secret.example.com/ws.asmx"));
//! let mut response = VersionGetResponse::default();
//! client.call("urn:thesecretserver.com/VersionGet", &VersionGet {}, &mut response)?;
//! # Ok::<(), sxsoap::SoapError>(())
//! ```

mod client;
mod envelope;
mod error;
mod fault;
mod security;
mod transport;

pub use client::SoapClient;
pub use envelope::{
    Body, Envelope, Header, HeaderItem, SOAP_ENV_NS, SOAP_PREFIX, SoapPayload, XmlWriter,
    write_payload,
};
pub use error::{DecodeError, EncodeError, ErrorKind, Result, SoapError, TransportError};
pub use fault::Fault;
pub use security::{PASSWORD_TEXT_TYPE, SecurityHeader, UsernameToken, WSSE_NS, WSU_NS};
pub use transport::{
    BasicAuth, CONTENT_TYPE, ClientConfig, DEFAULT_DIAL_TIMEOUT, TlsMode, Transport, USER_AGENT,
};

/// Re-export pour les appelants qui fournissent leur propre configuration TLS.
pub use ureq::tls::TlsConfig;
