//! Erreurs du client SOAP

use thiserror::Error;

use crate::fault::Fault;

/// Type Result personnalisé pour sxsoap
pub type Result<T> = std::result::Result<T, SoapError>;

/// Failure of the HTTP exchange itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, IO or timeout failure reported by the HTTP agent
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// Non-success HTTP status without any body to decode
    #[error("HTTP status {0} with an empty body")]
    Status(u16),
}

impl TransportError {
    /// Vérifie si l'erreur est un dépassement de délai (connexion ou global)
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(ureq::Error::Timeout(_)))
    }
}

/// Failure while producing the request envelope.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("XML serialization failed: {0}")]
    Serialize(String),

    #[error("XML write failed: {0}")]
    Write(String),
}

/// Failure while reading the response envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("root element is not a SOAP 1.1 Envelope")]
    MissingEnvelope,

    #[error("SOAP Envelope has no Body")]
    MissingBody,

    #[error("found multiple elements inside SOAP body; not wrapped-document/literal WS-I compliant")]
    MultipleBodyElements,

    #[error("cannot deserialize <{element}>: {message}")]
    Content { element: String, message: String },
}

/// Broad classification of a [`SoapError`], for callers deciding on retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Encode,
    Decode,
    Fault,
}

/// Erreurs possibles lors d'un appel RPC
#[derive(Debug, Error)]
pub enum SoapError {
    #[error("{action}: transport failure: {source}")]
    Transport {
        action: String,
        #[source]
        source: TransportError,
    },

    #[error("{action}: cannot encode request: {source}")]
    Encode {
        action: String,
        #[source]
        source: EncodeError,
    },

    #[error("{action}: cannot decode response: {source}")]
    Decode {
        action: String,
        #[source]
        source: DecodeError,
    },

    /// Fault SOAP renvoyé par le serveur ; le texte affiché est le `faultstring`
    #[error("{}", .fault.message)]
    Fault { action: String, fault: Fault },
}

impl SoapError {
    pub fn transport(action: &str, source: TransportError) -> Self {
        SoapError::Transport {
            action: action.to_string(),
            source,
        }
    }

    pub fn encode(action: &str, source: EncodeError) -> Self {
        SoapError::Encode {
            action: action.to_string(),
            source,
        }
    }

    pub fn decode(action: &str, source: DecodeError) -> Self {
        SoapError::Decode {
            action: action.to_string(),
            source,
        }
    }

    pub fn fault(action: &str, fault: Fault) -> Self {
        SoapError::Fault {
            action: action.to_string(),
            fault,
        }
    }

    /// SOAP action of the call that failed
    pub fn action(&self) -> &str {
        match self {
            SoapError::Transport { action, .. }
            | SoapError::Encode { action, .. }
            | SoapError::Decode { action, .. }
            | SoapError::Fault { action, .. } => action,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SoapError::Transport { .. } => ErrorKind::Transport,
            SoapError::Encode { .. } => ErrorKind::Encode,
            SoapError::Decode { .. } => ErrorKind::Decode,
            SoapError::Fault { .. } => ErrorKind::Fault,
        }
    }

    /// Le fault SOAP, si l'erreur en est un
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            SoapError::Fault { fault, .. } => Some(fault),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_decode(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }

    pub fn is_fault(&self) -> bool {
        self.kind() == ErrorKind::Fault
    }
}
