//! Messages du web service Secret Server (`urn:thesecretserver.com`)
//!
//! Only the operations used for login and secret lookup are modelled.
//! Responses tolerate unknown and missing elements.

use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

// ============ Requests ============

#[derive(Debug, Clone, Default, Serialize)]
pub struct Authenticate {
    #[serde(rename = "username", skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(rename = "password", skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(rename = "organization", skip_serializing_if = "String::is_empty")]
    pub organization: String,
    #[serde(rename = "domain", skip_serializing_if = "String::is_empty")]
    pub domain: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthenticateRADIUS {
    #[serde(rename = "username", skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(rename = "password", skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(rename = "organization", skip_serializing_if = "String::is_empty")]
    pub organization: String,
    #[serde(rename = "domain", skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(rename = "radiusPassword", skip_serializing_if = "String::is_empty")]
    pub radius_password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetTokenIsValid {
    #[serde(rename = "token")]
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetSecret {
    #[serde(rename = "token")]
    pub token: String,
    #[serde(rename = "secretId")]
    pub secret_id: i32,
    #[serde(rename = "loadSettingsAndPermissions", skip_serializing_if = "is_false")]
    pub load_settings_and_permissions: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetSecretLegacy {
    #[serde(rename = "token")]
    pub token: String,
    #[serde(rename = "secretId")]
    pub secret_id: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchSecrets {
    #[serde(rename = "token")]
    pub token: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    #[serde(rename = "includeDeleted", skip_serializing_if = "is_false")]
    pub include_deleted: bool,
    #[serde(rename = "includeRestricted", skip_serializing_if = "is_false")]
    pub include_restricted: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionGet {}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WhoAmI {
    #[serde(rename = "token")]
    pub token: String,
}

// ============ Responses ============

/// `<Errors><string>..</string></Errors>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorList {
    #[serde(rename = "string", default)]
    pub messages: Vec<String>,
}

impl ErrorList {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthenticateResult {
    #[serde(rename = "Errors", default)]
    pub errors: ErrorList,
    #[serde(rename = "Token", default)]
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthenticateResponse {
    #[serde(rename = "AuthenticateResult", default)]
    pub result: Option<AuthenticateResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthenticateRADIUSResponse {
    #[serde(rename = "AuthenticateRADIUSResult", default)]
    pub result: Option<AuthenticateResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenIsValidResult {
    #[serde(rename = "Errors", default)]
    pub errors: ErrorList,
    #[serde(rename = "MaxOfflineSeconds", default)]
    pub max_offline_seconds: i32,
    #[serde(rename = "Version", default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GetTokenIsValidResponse {
    #[serde(rename = "GetTokenIsValidResult", default)]
    pub result: Option<TokenIsValidResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecretError {
    #[serde(rename = "ErrorCode", default)]
    pub code: String,
    #[serde(rename = "ErrorMessage", default)]
    pub message: String,
    #[serde(rename = "AllowsResponse", default)]
    pub allows_response: bool,
}

/// Champ d'un secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecretItem {
    #[serde(rename = "Value", default)]
    pub value: String,
    #[serde(rename = "Id", default)]
    pub id: i32,
    #[serde(rename = "FieldId", default)]
    pub field_id: i32,
    #[serde(rename = "FieldName", default)]
    pub field_name: String,
    #[serde(rename = "IsFile", default)]
    pub is_file: bool,
    #[serde(rename = "IsNotes", default)]
    pub is_notes: bool,
    #[serde(rename = "IsPassword", default)]
    pub is_password: bool,
    #[serde(rename = "FieldDisplayName", default)]
    pub field_display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecretItems {
    #[serde(rename = "SecretItem", default)]
    pub items: Vec<SecretItem>,
}

// Nillable elements (CheckOutMinutesRemaining, IsCheckedOut, ...) are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Secret {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Items", default)]
    pub items: SecretItems,
    #[serde(rename = "Id", default)]
    pub id: i32,
    #[serde(rename = "SecretTypeId", default)]
    pub secret_type_id: i32,
    #[serde(rename = "FolderId", default)]
    pub folder_id: i32,
    #[serde(rename = "IsWebLauncher", default)]
    pub is_web_launcher: bool,
    #[serde(rename = "CheckOutUserDisplayName", default)]
    pub check_out_user_display_name: String,
    #[serde(rename = "IsRestricted", default)]
    pub is_restricted: bool,
    #[serde(rename = "OutOfSyncReason", default)]
    pub out_of_sync_reason: String,
    #[serde(rename = "Active", default)]
    pub active: bool,
}

impl Secret {
    /// Premier champ dont le `FieldName` vaut `name`
    pub fn field(&self, name: &str) -> Option<&SecretItem> {
        self.items.items.iter().find(|item| item.field_name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GetSecretResult {
    #[serde(rename = "Errors", default)]
    pub errors: ErrorList,
    #[serde(rename = "SecretError", default)]
    pub secret_error: Option<SecretError>,
    #[serde(rename = "Secret", default)]
    pub secret: Option<Secret>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GetSecretResponse {
    #[serde(rename = "GetSecretResult", default)]
    pub result: Option<GetSecretResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GetSecretLegacyResponse {
    #[serde(rename = "GetSecretLegacyResult", default)]
    pub result: Option<GetSecretResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecretSummary {
    #[serde(rename = "SecretId", default)]
    pub secret_id: i32,
    #[serde(rename = "SecretName", default)]
    pub secret_name: String,
    #[serde(rename = "SecretTypeName", default)]
    pub secret_type_name: String,
    #[serde(rename = "SecretTypeId", default)]
    pub secret_type_id: i32,
    #[serde(rename = "FolderId", default)]
    pub folder_id: i32,
    #[serde(rename = "IsRestricted", default)]
    pub is_restricted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecretSummaries {
    #[serde(rename = "SecretSummary", default)]
    pub items: Vec<SecretSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchSecretsResult {
    #[serde(rename = "Errors", default)]
    pub errors: ErrorList,
    #[serde(rename = "SecretSummaries", default)]
    pub summaries: SecretSummaries,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchSecretsResponse {
    #[serde(rename = "SearchSecretsResult", default)]
    pub result: Option<SearchSecretsResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VersionGetResult {
    #[serde(rename = "Errors", default)]
    pub errors: ErrorList,
    #[serde(rename = "Version", default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VersionGetResponse {
    #[serde(rename = "VersionGetResult", default)]
    pub result: Option<VersionGetResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInfoResult {
    #[serde(rename = "Errors", default)]
    pub errors: ErrorList,
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
    #[serde(rename = "UserName", default)]
    pub user_name: String,
    #[serde(rename = "KnownAs", default)]
    pub known_as: String,
    #[serde(rename = "UserId", default)]
    pub user_id: i32,
    #[serde(rename = "DomainId", default)]
    pub domain_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WhoAmIResponse {
    #[serde(rename = "WhoAmIResult", default)]
    pub result: Option<UserInfoResult>,
}
