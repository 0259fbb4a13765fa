//! Erreurs du client Secret Server

use sxsoap::SoapError;
use thiserror::Error;

/// Valeur substituée quand un secret est introuvable
pub const UNKNOWN_SECRET: &str = "<unknown-secret>";

/// Valeur substituée quand le secret existe mais pas le champ demandé
pub const UNKNOWN_SECRET_FIELD: &str = "<unknown-secret-field>";

pub type Result<T> = std::result::Result<T, ThycoticError>;

#[derive(Debug, Error)]
pub enum ThycoticError {
    #[error(transparent)]
    Soap(#[from] SoapError),

    /// Authenticate returned an empty token
    #[error("unauthorized{}", format_errors(.errors))]
    Unauthorized { errors: Vec<String> },

    #[error("no secret {id}: {source}")]
    SecretUnavailable {
        id: i32,
        #[source]
        source: SoapError,
    },

    #[error("no secret {id}{}", format_errors(.errors))]
    SecretNotFound { id: i32, errors: Vec<String> },

    #[error("secret {id} has no field {field}")]
    FieldNotFound { id: i32, field: String },
}

impl ThycoticError {
    /// Texte à substituer dans un template à la place de la valeur
    pub fn placeholder(&self) -> &'static str {
        match self {
            ThycoticError::FieldNotFound { .. } => UNKNOWN_SECRET_FIELD,
            _ => UNKNOWN_SECRET,
        }
    }
}

fn format_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(": {}", errors.join("; "))
    }
}
