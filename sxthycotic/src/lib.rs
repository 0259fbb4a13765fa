//! # sxthycotic - Secret Server
//!
//! Opérations du web service SOAP du Secret Server, construites sur
//! [`sxsoap`].
//!
//! - [`SecretServer`] : une méthode par opération déclarée dans [`operations`]
//! - [`SecretServer::login`] : `Authenticate` → token
//! - [`SecretServer::secret_field`] : `GetSecret` → valeur d'un champ
//! - [`Session`] : serveur + token, utilisé par les templates
//!
//! ```no_run
//! use sxsoap::ClientConfig;
//! use sxthycotic::{SecretServer, Session};
//!
//! let config = ClientConfig::new(SecretServer::endpoint("https://ss.example.com"));
//! let session = Session::login(SecretServer::new(config), "svc", "pw", "CORP")?;
//! let password = session.secret_field(1234, "Password")?;
//! # Ok::<(), sxthycotic::ThycoticError>(())
//! ```

mod error;
pub mod model;
pub mod operations;
mod service;

pub use error::{Result, ThycoticError, UNKNOWN_SECRET, UNKNOWN_SECRET_FIELD};
pub use service::{SecretServer, Session, WEB_SERVICE_PATH};
