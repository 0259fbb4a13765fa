//! # sxazkv - Key Vault
//!
//! Lecture de secrets dans un Key Vault, avec une authentification
//! `client_credentials` prise dans l'environnement (`AZURE_TENANT_ID`,
//! `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`).
//!
//! ```no_run
//! use sxazkv::{Credentials, KeyVault};
//! use sxsoap::ClientConfig;
//!
//! let credentials = Credentials::from_env()?;
//! let vault = KeyVault::login(&ClientConfig::new("https://name.vault.azure.net"), &credentials)?;
//! let value = vault.secret("db-password")?;
//! # Ok::<(), sxazkv::KeyVaultError>(())
//! ```

mod client;
mod credentials;
mod error;

pub use client::{API_VERSION, KeyVault, VAULT_SCOPE, is_valid_secret_name};
pub use credentials::{
    Credentials, DEFAULT_AUTHORITY_HOST, ENV_AUTHORITY_HOST, ENV_CLIENT_ID, ENV_CLIENT_SECRET,
    ENV_TENANT_ID, REQUIRED_VARIABLES,
};
pub use error::{KeyVaultError, Result, UNKNOWN_SECRET};
