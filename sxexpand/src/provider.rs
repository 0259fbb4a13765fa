//! Secret store selected with `--provider`

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use sxazkv::{Credentials, KeyVault};
use sxsoap::ClientConfig;
use sxthycotic::{SecretServer, Session};
use tracing::error;

/// Nom d'un provider sur la ligne de commande
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Thycotic,
    Azkv,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Thycotic => "thycotic",
            ProviderKind::Azkv => "azkv",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "thycotic" => Ok(ProviderKind::Thycotic),
            "azkv" => Ok(ProviderKind::Azkv),
            other => Err(anyhow!("unknown provider {other:?}")),
        }
    }
}

/// Secret store behind the `thycotic` and `secret` template functions.
#[derive(Debug, Default)]
pub enum SecretProvider {
    #[default]
    None,
    Thycotic(Session),
    KeyVault(KeyVault),
}

impl SecretProvider {
    /// Login Secret Server ; `config.url` est l'URL de base du serveur
    pub fn thycotic(config: ClientConfig, username: &str, password: &str, domain: &str) -> Result<Self> {
        let mut config = config;
        config.url = SecretServer::endpoint(&config.url);
        let session = Session::login(SecretServer::new(config), username, password, domain)
            .map_err(|e| anyhow!("thycotic: login failed: {e}"))?;
        Ok(SecretProvider::Thycotic(session))
    }

    /// Login Key Vault (grant `client_credentials`)
    pub fn key_vault(config: &ClientConfig, credentials: &Credentials) -> Result<Self> {
        let vault = KeyVault::login(config, credentials)
            .map_err(|e| anyhow!("azure key vault: login failed: {e}"))?;
        Ok(SecretProvider::KeyVault(vault))
    }

    pub fn kind(&self) -> Option<ProviderKind> {
        match self {
            SecretProvider::None => None,
            SecretProvider::Thycotic(_) => Some(ProviderKind::Thycotic),
            SecretProvider::KeyVault(_) => Some(ProviderKind::Azkv),
        }
    }

    /// Valeur du champ, ou le placeholder si la lecture échoue
    pub fn thycotic_field(&self, id: i32, field: &str) -> String {
        let SecretProvider::Thycotic(session) = self else {
            return sxthycotic::UNKNOWN_SECRET.to_string();
        };
        session.secret_field(id, field).unwrap_or_else(|e| {
            error!("thycotic: {e}");
            e.placeholder().to_string()
        })
    }

    /// Valeur du secret, ou le placeholder si la lecture échoue
    pub fn vault_secret(&self, name: &str) -> String {
        let SecretProvider::KeyVault(vault) = self else {
            return sxazkv::UNKNOWN_SECRET.to_string();
        };
        vault.secret(name).unwrap_or_else(|e| {
            error!("azure key vault: {e}");
            e.placeholder().to_string()
        })
    }
}
