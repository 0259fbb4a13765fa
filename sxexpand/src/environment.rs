//! OS environment as seen by the `env` template function

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub type Environment = HashMap<String, String>;

/// Texte qui remplace une valeur masquée
pub const MASK: &str = "********";

/// Variables dont le nom correspond sont toujours masquées
static SENSITIVE_KEYS: Lazy<Regex> = Lazy::new(|| Regex::new("AZURE_.*").expect("valid regex"));

/// Capture l'environnement du processus
///
/// Variables whose name or value is not valid UTF-8 are skipped.
pub fn os_environment() -> Environment {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Masque toute variable dont la valeur est `secret`
pub fn sanitize_value(env: &mut Environment, secret: &str) {
    if secret.is_empty() {
        return;
    }
    for (key, value) in env.iter_mut() {
        if value == secret {
            debug!(variable = %key, "Masking variable holding the password");
            *value = MASK.to_string();
        }
    }
}

/// Masque toute variable dont le nom correspond à `pattern`
pub fn sanitize_key(env: &mut Environment, pattern: &Regex) {
    for (key, value) in env.iter_mut() {
        if pattern.is_match(key) {
            *value = MASK.to_string();
        }
    }
}

/// Masquage appliqué avant toute expansion
pub fn sanitize(mut env: Environment, password: &str) -> Environment {
    sanitize_value(&mut env, password);
    sanitize_key(&mut env, &SENSITIVE_KEYS);
    env
}
