//! Table des opérations du web service
//!
//! Chaque opération est un triplet (action, requête, réponse) déclaré avec
//! [`define_operations!`] ; la macro génère l'implémentation de
//! [`SoapPayload`](sxsoap::SoapPayload) pour la requête et la méthode
//! correspondante sur [`SecretServer`].

use crate::model::*;
use crate::service::SecretServer;

/// Namespace de tous les messages du web service
pub const NAMESPACE: &str = "urn:thesecretserver.com";

/// Déclare des opérations SOAP du Secret Server
///
/// # Syntaxe
///
/// ```ignore
/// define_operations! {
///     /// doc
///     fn method_name = "OperationName" (RequestType) -> ResponseType;
/// }
/// ```
macro_rules! define_operations {
    (
        $(
            $(#[$meta:meta])*
            fn $method:ident = $name:literal ($request:ty) -> $response:ty;
        )*
    ) => {
        $(
            impl sxsoap::SoapPayload for $request {
                const ELEMENT: &'static str = $name;
                const NAMESPACE: &'static str = NAMESPACE;
            }
        )*

        /// (nom, action SOAP) de chaque opération déclarée
        pub const OPERATIONS: &[(&str, &str)] = &[
            $( ($name, concat!("urn:thesecretserver.com/", $name)), )*
        ];

        impl SecretServer {
            $(
                $(#[$meta])*
                pub fn $method(&self, request: &$request) -> crate::error::Result<$response> {
                    let action = concat!("urn:thesecretserver.com/", $name);
                    Ok(self.client().invoke(action, request)?)
                }
            )*
        }
    };
}

define_operations! {
    /// Authentifie un compte et renvoie un token de session
    fn authenticate = "Authenticate" (Authenticate) -> AuthenticateResponse;

    fn authenticate_radius = "AuthenticateRADIUS" (AuthenticateRADIUS) -> AuthenticateRADIUSResponse;

    fn get_token_is_valid = "GetTokenIsValid" (GetTokenIsValid) -> GetTokenIsValidResponse;

    /// Lit un secret et tous ses champs
    fn get_secret = "GetSecret" (GetSecret) -> GetSecretResponse;

    fn get_secret_legacy = "GetSecretLegacy" (GetSecretLegacy) -> GetSecretLegacyResponse;

    fn search_secrets = "SearchSecrets" (SearchSecrets) -> SearchSecretsResponse;

    fn version_get = "VersionGet" (VersionGet) -> VersionGetResponse;

    fn who_am_i = "WhoAmI" (WhoAmI) -> WhoAmIResponse;
}

/// Action SOAP d'une opération déclarée
pub fn action(name: &str) -> Option<&'static str> {
    OPERATIONS
        .iter()
        .find(|(operation, _)| *operation == name)
        .map(|(_, action)| *action)
}
