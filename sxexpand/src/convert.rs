//! Conversions between YAML/JSON documents and template values

use std::collections::HashMap;

use gtmpl_value::Value;
use serde_json::Value as Json;
use serde_yaml::Value as Yaml;

/// YAML → valeur de template
pub fn from_yaml(value: &Yaml) -> Value {
    match value {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => Value::Array(seq.iter().map(from_yaml).collect()),
        Yaml::Mapping(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (yaml_key(k), from_yaml(v)))
                .collect::<HashMap<_, _>>(),
        ),
        Yaml::Tagged(tagged) => from_yaml(&tagged.value),
    }
}

/// Valeurs `.Values` : un mapping YAML
pub fn mapping_to_value(map: &serde_yaml::Mapping) -> Value {
    Value::Map(
        map.iter()
            .map(|(k, v)| (yaml_key(k), from_yaml(v)))
            .collect(),
    )
}

fn yaml_key(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// JSON → valeur de template
pub fn from_json(value: &Json) -> Value {
    match value {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        Json::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect(),
        ),
    }
}

/// Valeur de template → JSON, pour `toJson` et `toYaml`
///
/// Functions and missing values serialize as `null`.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::String(s) => Json::String(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::from(i)
            } else if let Some(u) = n.as_u64() {
                Json::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Json::Number)
                    .unwrap_or(Json::Null)
            }
        }
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Map(map) | Value::Object(map) => {
            let mut object = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                object.insert(key.clone(), to_json(&map[key]));
            }
            Json::Object(object)
        }
        _ => Json::Null,
    }
}
