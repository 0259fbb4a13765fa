//! Erreurs du client Key Vault

use thiserror::Error;

/// Valeur substituée quand un secret ne peut pas être lu
pub const UNKNOWN_SECRET: &str = "<unknown-secret>";

pub type Result<T> = std::result::Result<T, KeyVaultError>;

#[derive(Debug, Error)]
pub enum KeyVaultError {
    /// Variable d'environnement d'authentification absente
    #[error("environment variable {0} is not set")]
    MissingVariable(&'static str),

    #[error("invalid secret name {0:?}: should match [0-9a-zA-Z-]")]
    InvalidName(String),

    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("unexpected JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Le serveur d'identité a refusé les credentials
    #[error("authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("no secret {name}: {message}")]
    Secret {
        name: String,
        status: u16,
        message: String,
    },
}

impl KeyVaultError {
    /// Texte à substituer dans un template à la place de la valeur
    pub fn placeholder(&self) -> &'static str {
        UNKNOWN_SECRET
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, KeyVaultError::Secret { status: 404, .. })
    }
}
