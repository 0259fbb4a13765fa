use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

/// Table des valeurs exposée aux templates sous `.Values`
pub type Values = Mapping;

/// Lit un fichier YAML de valeurs
///
/// Without a path the result is an empty mapping. An empty document is an
/// empty mapping too.
pub fn read_values(path: Option<&Path>) -> Result<Values> {
    let Some(path) = path else {
        debug!("No values file given");
        return Ok(Values::new());
    };

    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let values = parse_values(&text).with_context(|| format!("parsing {}", path.display()))?;
    info!(values_file = %path.display(), keys = values.len(), "Loaded values file");
    Ok(values)
}

/// Parse un document YAML qui doit être un mapping (ou vide)
pub fn parse_values(text: &str) -> Result<Values> {
    match serde_yaml::from_str::<Value>(text)? {
        Value::Null => Ok(Values::new()),
        Value::Mapping(map) => Ok(map),
        other => Err(anyhow!(
            "expected a mapping at top level, found {}",
            kind(&other)
        )),
    }
}

/// Fusionne `src` dans `dst`, les valeurs de `src` gagnent
///
/// Nested mappings are merged key by key; any other value (scalar,
/// sequence, or a mapping meeting a non-mapping) replaces the one in `dst`.
pub fn merge(src: &Values, dst: &mut Values) {
    for (key, value) in src {
        if let (Some(Value::Mapping(dmap)), Value::Mapping(smap)) = (dst.get_mut(key), value) {
            merge(smap, dmap);
            continue;
        }
        dst.insert(key.clone(), value.clone());
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
