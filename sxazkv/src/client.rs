//! Client Key Vault : jeton OAuth2 puis lecture des secrets

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sxsoap::ClientConfig;
use tracing::{debug, info};
use ureq::Agent;
use ureq::http::Response;

use crate::credentials::Credentials;
use crate::error::{KeyVaultError, Result};

/// Scope demandé pour l'accès aux secrets
pub const VAULT_SCOPE: &str = "https://vault.azure.net/.default";

pub const API_VERSION: &str = "7.4";

static SECRET_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-zA-Z-]+$").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: String,
}

#[derive(Debug, Deserialize)]
struct VaultErrorResponse {
    error: VaultErrorBody,
}

#[derive(Debug, Deserialize)]
struct VaultErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// `true` si `name` est un nom de secret valide
pub fn is_valid_secret_name(name: &str) -> bool {
    SECRET_NAME.is_match(name)
}

/// Authenticated key vault client.
///
/// `config.url` is the vault URL, e.g. `https://name.vault.azure.net`.
/// The token is obtained once at login and reused for every lookup.
pub struct KeyVault {
    agent: Agent,
    vault_url: String,
    access_token: String,
}

impl fmt::Debug for KeyVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyVault")
            .field("vault_url", &self.vault_url)
            .field("access_token", &"********")
            .finish()
    }
}

impl KeyVault {
    /// Obtient un jeton (grant `client_credentials`) pour le vault
    pub fn login(config: &ClientConfig, credentials: &Credentials) -> Result<Self> {
        let agent = config.agent();
        let token_url = credentials.token_url();
        debug!(url = %token_url, client_id = %credentials.client_id, "Requesting key vault token");

        let mut response = agent.post(&token_url).send_form([
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", VAULT_SCOPE),
        ])?;

        let status = response.status();
        if !status.is_success() {
            let body = read_text(&mut response);
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(e) if !e.error_description.is_empty() => e.error_description,
                Ok(e) if !e.error.is_empty() => e.error,
                _ => body,
            };
            return Err(KeyVaultError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.body_mut().read_json()?;
        info!(vault = %config.url, expires_in = token.expires_in, "Logged in to key vault");

        Ok(Self {
            agent,
            vault_url: config.url.trim_end_matches('/').to_string(),
            access_token: token.access_token,
        })
    }

    pub fn vault_url(&self) -> &str {
        &self.vault_url
    }

    /// Valeur courante du secret `name`
    pub fn secret(&self, name: &str) -> Result<String> {
        if !is_valid_secret_name(name) {
            return Err(KeyVaultError::InvalidName(name.to_string()));
        }

        let url = format!("{}/secrets/{}", self.vault_url, name);
        debug!(url = %url, "Fetching key vault secret");

        let mut response = self
            .agent
            .get(&url)
            .query("api-version", API_VERSION)
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .call()?;

        let status = response.status();
        if !status.is_success() {
            let body = read_text(&mut response);
            let message = match serde_json::from_str::<VaultErrorResponse>(&body) {
                Ok(e) if e.error.message.is_empty() => e.error.code,
                Ok(e) => e.error.message,
                Err(_) => body,
            };
            return Err(KeyVaultError::Secret {
                name: name.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let bundle: SecretBundle = response.body_mut().read_json()?;
        Ok(bundle.value)
    }
}

fn read_text(response: &mut Response<ureq::Body>) -> String {
    response
        .body_mut()
        .read_to_string()
        .unwrap_or_default()
        .trim()
        .to_string()
}
