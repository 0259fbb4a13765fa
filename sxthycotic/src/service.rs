//! Client Secret Server : login et lecture d'un champ de secret

use sxsoap::{ClientConfig, SecurityHeader, SoapClient};
use tracing::{debug, info, warn};

use crate::error::{Result, ThycoticError};
use crate::model::{Authenticate, GetSecret};

/// Chemin du web service sous l'URL de base du serveur
pub const WEB_SERVICE_PATH: &str = "/SecretServer/webservices/sswebservice.asmx";

/// Façade des opérations du Secret Server.
///
/// The operation methods (`authenticate`, `get_secret`, ...) are generated in
/// [`crate::operations`].
#[derive(Debug)]
pub struct SecretServer {
    client: SoapClient,
}

impl SecretServer {
    /// `config.url` doit déjà pointer sur le web service, voir [`SecretServer::endpoint`]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: SoapClient::new(config),
        }
    }

    /// URL du web service pour un serveur donné (`https://host:port`)
    pub fn endpoint(base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), WEB_SERVICE_PATH)
    }

    pub fn client(&self) -> &SoapClient {
        &self.client
    }

    /// Ajoute un header WS-Security à tous les appels suivants
    pub fn use_ws_security(&mut self, username: &str, password: &str) {
        self.client
            .add_header(SecurityHeader::new(username, password, "1"));
    }

    /// Authentifie le compte et renvoie le token de session
    ///
    /// An empty token means the server refused the credentials: the error
    /// strings it returned are carried by [`ThycoticError::Unauthorized`].
    pub fn login(&self, username: &str, password: &str, domain: &str) -> Result<String> {
        let response = self.authenticate(&Authenticate {
            username: username.to_string(),
            password: password.to_string(),
            organization: String::new(),
            domain: domain.to_string(),
        })?;

        let result = response.result.unwrap_or_default();
        if result.token.is_empty() {
            warn!(username = %username, domain = %domain, "Secret Server login refused");
            return Err(ThycoticError::Unauthorized {
                errors: result.errors.messages,
            });
        }

        info!(username = %username, domain = %domain, url = %self.client.url(), "Logged in to Secret Server");
        Ok(result.token)
    }

    /// Valeur du champ `field` du secret `id`
    pub fn secret_field(&self, token: &str, id: i32, field: &str) -> Result<String> {
        let request = GetSecret {
            token: token.to_string(),
            secret_id: id,
            load_settings_and_permissions: false,
        };
        let response = self
            .get_secret(&request)
            .map_err(|e| match e {
                ThycoticError::Soap(source) => ThycoticError::SecretUnavailable { id, source },
                other => other,
            })?;

        let result = response.result.unwrap_or_default();
        let Some(secret) = result.secret else {
            return Err(ThycoticError::SecretNotFound {
                id,
                errors: result.errors.messages,
            });
        };

        debug!(id, field = %field, items = secret.items.items.len(), "Secret fetched");
        secret
            .field(field)
            .map(|item| item.value.clone())
            .ok_or_else(|| ThycoticError::FieldNotFound {
                id,
                field: field.to_string(),
            })
    }
}

/// Session authentifiée : un serveur et son token
#[derive(Debug)]
pub struct Session {
    server: SecretServer,
    token: String,
}

impl Session {
    pub fn login(server: SecretServer, username: &str, password: &str, domain: &str) -> Result<Self> {
        let token = server.login(username, password, domain)?;
        Ok(Self { server, token })
    }

    pub fn server(&self) -> &SecretServer {
        &self.server
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret_field(&self, id: i32, field: &str) -> Result<String> {
        self.server.secret_field(&self.token, id, field)
    }
}
