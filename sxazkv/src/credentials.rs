//! Credentials de l'application, lus dans l'environnement

use std::collections::HashMap;
use std::fmt;

use crate::error::{KeyVaultError, Result};

pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";

/// Variables obligatoires, dans l'ordre où elles sont vérifiées
pub const REQUIRED_VARIABLES: [&str; 3] = [ENV_TENANT_ID, ENV_CLIENT_ID, ENV_CLIENT_SECRET];

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Client-credentials of a registered application.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub authority_host: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Lit les credentials dans une table de variables
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |name: &'static str| {
            vars.get(name)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or(KeyVaultError::MissingVariable(name))
        };

        Ok(Self {
            tenant_id: get(ENV_TENANT_ID)?,
            client_id: get(ENV_CLIENT_ID)?,
            client_secret: get(ENV_CLIENT_SECRET)?,
            authority_host: get(ENV_AUTHORITY_HOST)
                .unwrap_or_else(|_| DEFAULT_AUTHORITY_HOST.to_string()),
        })
    }

    /// Endpoint OAuth2 v2.0 du tenant
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"********")
            .field("authority_host", &self.authority_host)
            .finish()
    }
}
