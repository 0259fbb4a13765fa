//! Fonctions disponibles dans les templates
//!
//! Template functions are plain `fn` pointers; the state they need (sanitized
//! environment, secret store, template directory) is published for the
//! duration of one render through a thread-local [`Scope`].

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gtmpl::Template;
use gtmpl_value::{FuncError, Value};

use crate::convert;
use crate::environment::Environment;
use crate::paths;
use crate::provider::{ProviderKind, SecretProvider};

pub const EXPANDENV_NOT_SUPPORTED: &str = "<expandenv is not supported>";

type TemplateFunc = fn(&[Value]) -> Result<Value, FuncError>;

/// Fonctions toujours enregistrées
const DEFAULT_FUNCTIONS: &[(&str, TemplateFunc)] = &[
    ("env", env),
    ("expandenv", expandenv),
    ("toYaml", to_yaml),
    ("fromYaml", from_yaml),
    ("toJson", to_json),
    ("fromJson", from_json),
    ("filebase", filebase),
    ("filedir", filedir),
    ("fileclean", fileclean),
    ("fileext", fileext),
    ("fileGet", file_get),
    ("fileGlob", file_glob),
    ("asConfig", as_config),
    ("asSecrets", as_secrets),
    ("toToml", to_toml),
    ("indent", indent),
    ("nindent", nindent),
    ("quote", quote),
    ("squote", squote),
    ("default", default),
    ("upper", upper),
    ("lower", lower),
    ("trim", trim),
    ("replace", replace),
    ("b64enc", b64enc),
    ("b64dec", b64dec),
];

/// État partagé avec les fonctions pendant un rendu
pub(crate) struct Scope {
    pub env: Arc<Environment>,
    pub provider: Arc<SecretProvider>,
    pub base_dir: PathBuf,
}

thread_local! {
    static SCOPE: RefCell<Option<Rc<Scope>>> = const { RefCell::new(None) };
}

/// Restaure la portée précédente en sortie de rendu
pub(crate) struct ScopeGuard {
    previous: Option<Rc<Scope>>,
}

pub(crate) fn enter(scope: Scope) -> ScopeGuard {
    let previous = SCOPE.with(|current| current.borrow_mut().replace(Rc::new(scope)));
    ScopeGuard { previous }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        SCOPE.with(|current| *current.borrow_mut() = previous);
    }
}

fn scope(name: &str) -> Result<Rc<Scope>, FuncError> {
    SCOPE
        .with(|current| current.borrow().clone())
        .ok_or_else(|| fail(name, "called outside of a template expansion"))
}

/// Enregistre les fonctions ; celles des secrets seulement pour `provider`
pub fn register(template: &mut Template, provider: Option<ProviderKind>) {
    for (name, func) in function_table(provider) {
        template.add_func(name, func);
    }
}

/// Noms des fonctions enregistrées pour `provider`
pub fn function_names(provider: Option<ProviderKind>) -> Vec<&'static str> {
    function_table(provider).into_iter().map(|(name, _)| name).collect()
}

fn function_table(provider: Option<ProviderKind>) -> Vec<(&'static str, TemplateFunc)> {
    let mut table = DEFAULT_FUNCTIONS.to_vec();
    match provider {
        Some(ProviderKind::Thycotic) => table.push(("thycotic", thycotic)),
        Some(ProviderKind::Azkv) => table.push(("secret", secret)),
        None => {}
    }
    table
}

// ============ Arguments ============

fn fail(name: &str, message: impl std::fmt::Display) -> FuncError {
    FuncError::Generic(format!("{name}: {message}"))
}

fn expect_args(name: &str, args: &[Value], count: usize) -> Result<(), FuncError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(fail(
            name,
            format!("expected {count} argument(s), got {}", args.len()),
        ))
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Nil | Value::NoValue => String::new(),
        other => other.to_string(),
    }
}

fn string_arg(name: &str, args: &[Value], count: usize) -> Result<String, FuncError> {
    expect_args(name, args, count)?;
    Ok(text(&args[count - 1]))
}

fn int_value(name: &str, value: &Value) -> Result<i64, FuncError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| fail(name, format!("{n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| fail(name, format!("{s:?} is not an integer"))),
        other => Err(fail(name, format!("{other} is not an integer"))),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Nil | Value::NoValue => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Map(map) | Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// ============ Environment ============

fn env(args: &[Value]) -> Result<Value, FuncError> {
    let name = string_arg("env", args, 1)?;
    let scope = scope("env")?;
    Ok(Value::String(scope.env.get(&name).cloned().unwrap_or_default()))
}

fn expandenv(_args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(EXPANDENV_NOT_SUPPORTED.to_string()))
}

// ============ Serialization ============

fn to_yaml(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("toYaml", args, 1)?;
    let yaml = serde_yaml::to_string(&convert::to_json(&args[0])).map_err(|e| fail("toYaml", e))?;
    Ok(Value::String(yaml.trim_end_matches('\n').to_string()))
}

fn from_yaml(args: &[Value]) -> Result<Value, FuncError> {
    let text = string_arg("fromYaml", args, 1)?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|e| fail("fromYaml", e))?;
    Ok(convert::from_yaml(&yaml))
}

fn to_json(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("toJson", args, 1)?;
    let json = serde_json::to_string(&convert::to_json(&args[0])).map_err(|e| fail("toJson", e))?;
    Ok(Value::String(json))
}

fn to_toml(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("toToml", args, 1)?;
    let toml = toml::to_string(&convert::to_json(&args[0])).map_err(|e| fail("toToml", e))?;
    Ok(Value::String(toml))
}

fn from_json(args: &[Value]) -> Result<Value, FuncError> {
    let text = string_arg("fromJson", args, 1)?;
    let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| fail("fromJson", e))?;
    Ok(convert::from_json(&json))
}

// ============ Files ============

fn filebase(args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(paths::base(&string_arg("filebase", args, 1)?)))
}

fn filedir(args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(paths::dir(&string_arg("filedir", args, 1)?)))
}

fn fileclean(args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(paths::clean(&string_arg("fileclean", args, 1)?)))
}

fn fileext(args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(paths::ext(&string_arg("fileext", args, 1)?)))
}

// File access is not sanitized: any path readable by the process can be included.
fn file_get(args: &[Value]) -> Result<Value, FuncError> {
    let name = string_arg("fileGet", args, 1)?;
    let scope = scope("fileGet")?;
    let path = scope.base_dir.join(&name);
    fs::read_to_string(&path)
        .map(Value::String)
        .map_err(|e| fail("fileGet", format!("{}: {e}", path.display())))
}

/// `fileGlob "pattern"` : chemin relatif → contenu, pour chaque fichier trouvé
fn file_glob(args: &[Value]) -> Result<Value, FuncError> {
    let pattern = string_arg("fileGlob", args, 1)?;
    let scope = scope("fileGlob")?;
    let full = scope.base_dir.join(&pattern);
    let full = full
        .to_str()
        .ok_or_else(|| fail("fileGlob", format!("{pattern:?} is not valid UTF-8")))?;

    let mut files = HashMap::new();
    for path in glob::glob(full).map_err(|e| fail("fileGlob", e))?.flatten() {
        if !path.is_file() {
            continue;
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| fail("fileGlob", format!("{}: {e}", path.display())))?;
        let name = path
            .strip_prefix(&scope.base_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        files.insert(name, Value::String(content));
    }
    Ok(Value::Map(files))
}

/// Table de fichiers indexée par nom de base, triée
fn file_map(name: &str, args: &[Value]) -> Result<BTreeMap<String, String>, FuncError> {
    expect_args(name, args, 1)?;
    match &args[0] {
        Value::Map(files) | Value::Object(files) => Ok(files
            .iter()
            .map(|(path, content)| (paths::base(path), text(content)))
            .collect()),
        other => Err(fail(name, format!("expected a file map, got {other}"))),
    }
}

fn yaml_block(name: &str, files: BTreeMap<String, String>) -> Result<Value, FuncError> {
    let yaml = serde_yaml::to_string(&files).map_err(|e| fail(name, e))?;
    Ok(Value::String(yaml.trim_end_matches('\n').to_string()))
}

/// `asConfig` : bloc YAML `nom: contenu`, à la manière d'une ConfigMap
fn as_config(args: &[Value]) -> Result<Value, FuncError> {
    yaml_block("asConfig", file_map("asConfig", args)?)
}

/// `asSecrets` : comme `asConfig`, contenus encodés en base64
fn as_secrets(args: &[Value]) -> Result<Value, FuncError> {
    let files = file_map("asSecrets", args)?
        .into_iter()
        .map(|(name, content)| (name, STANDARD.encode(content)))
        .collect();
    yaml_block("asSecrets", files)
}

// ============ Strings ============

fn indent_text(spaces: i64, text: &str) -> String {
    let pad = " ".repeat(spaces.max(0) as usize);
    format!("{pad}{}", text.replace('\n', &format!("\n{pad}")))
}

fn indent(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("indent", args, 2)?;
    let spaces = int_value("indent", &args[0])?;
    Ok(Value::String(indent_text(spaces, &text(&args[1]))))
}

fn nindent(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("nindent", args, 2)?;
    let spaces = int_value("nindent", &args[0])?;
    Ok(Value::String(format!("\n{}", indent_text(spaces, &text(&args[1])))))
}

fn quote(args: &[Value]) -> Result<Value, FuncError> {
    let quoted: Vec<String> = args
        .iter()
        .filter(|v| !matches!(v, Value::Nil | Value::NoValue))
        .map(|v| format!("\"{}\"", text(v).replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    Ok(Value::String(quoted.join(" ")))
}

fn squote(args: &[Value]) -> Result<Value, FuncError> {
    let quoted: Vec<String> = args
        .iter()
        .filter(|v| !matches!(v, Value::Nil | Value::NoValue))
        .map(|v| format!("'{}'", text(v)))
        .collect();
    Ok(Value::String(quoted.join(" ")))
}

/// `default DEFAULT GIVEN` : GIVEN s'il n'est pas vide
fn default(args: &[Value]) -> Result<Value, FuncError> {
    match args {
        [fallback] => Ok(fallback.clone()),
        [fallback, given] if is_empty(given) => Ok(fallback.clone()),
        [_, given] => Ok(given.clone()),
        _ => Err(fail("default", format!("expected 1 or 2 arguments, got {}", args.len()))),
    }
}

fn upper(args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(string_arg("upper", args, 1)?.to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(string_arg("lower", args, 1)?.to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(string_arg("trim", args, 1)?.trim().to_string()))
}

/// `replace OLD NEW TEXT`
fn replace(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("replace", args, 3)?;
    let (old, new, subject) = (text(&args[0]), text(&args[1]), text(&args[2]));
    Ok(Value::String(subject.replace(&old, &new)))
}

fn b64enc(args: &[Value]) -> Result<Value, FuncError> {
    Ok(Value::String(STANDARD.encode(string_arg("b64enc", args, 1)?)))
}

fn b64dec(args: &[Value]) -> Result<Value, FuncError> {
    let encoded = string_arg("b64dec", args, 1)?;
    let bytes = STANDARD.decode(encoded.trim()).map_err(|e| fail("b64dec", e))?;
    String::from_utf8(bytes)
        .map(Value::String)
        .map_err(|e| fail("b64dec", e))
}

// ============ Secrets ============

/// `thycotic ID "Field"`
fn thycotic(args: &[Value]) -> Result<Value, FuncError> {
    expect_args("thycotic", args, 2)?;
    let id = int_value("thycotic", &args[0])?;
    let id = i32::try_from(id).map_err(|_| fail("thycotic", format!("secret id {id} out of range")))?;
    let field = text(&args[1]);
    let scope = scope("thycotic")?;
    Ok(Value::String(scope.provider.thycotic_field(id, &field)))
}

/// `secret "name"`
fn secret(args: &[Value]) -> Result<Value, FuncError> {
    let name = string_arg("secret", args, 1)?;
    let scope = scope("secret")?;
    Ok(Value::String(scope.provider.vault_secret(&name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    fn as_text(value: Result<Value, FuncError>) -> String {
        match value {
            Ok(Value::String(s)) => s,
            Ok(other) => panic!("expected a string, got {other}"),
            Err(_) => panic!("function failed"),
        }
    }

    #[test]
    fn secret_functions_follow_provider() {
        assert!(!function_names(None).contains(&"thycotic"));
        assert!(!function_names(None).contains(&"secret"));
        assert!(function_names(Some(ProviderKind::Thycotic)).contains(&"thycotic"));
        assert!(!function_names(Some(ProviderKind::Thycotic)).contains(&"secret"));
        assert!(function_names(Some(ProviderKind::Azkv)).contains(&"secret"));
    }

    #[test]
    fn indent_and_nindent() {
        assert_eq!(as_text(indent(&[Value::from(2i64), s("a\nb")])), "  a\n  b");
        assert_eq!(as_text(nindent(&[Value::from(4i64), s("x")])), "\n    x");
    }

    #[test]
    fn quoting() {
        assert_eq!(as_text(quote(&[s("a\"b"), Value::Nil, s("c")])), r#""a\"b" "c""#);
        assert_eq!(as_text(squote(&[s("x")])), "'x'");
    }

    #[test]
    fn default_uses_fallback_for_empty_values() {
        assert_eq!(as_text(default(&[s("dflt"), s("")])), "dflt");
        assert_eq!(as_text(default(&[s("dflt"), Value::NoValue])), "dflt");
        assert_eq!(as_text(default(&[s("dflt"), s("given")])), "given");
    }

    #[test]
    fn string_helpers() {
        assert_eq!(as_text(upper(&[s("abc")])), "ABC");
        assert_eq!(as_text(trim(&[s("  x \n")])), "x");
        assert_eq!(as_text(replace(&[s(" "), s("-"), s("a b c")])), "a-b-c");
        assert_eq!(as_text(b64enc(&[s("pipo")])), "cGlwbw==");
        assert_eq!(as_text(b64dec(&[s("cGlwbw==")])), "pipo");
    }

    #[test]
    fn serialization_helpers() {
        let parsed = from_json(&[s(r#"{"a":[1,2],"b":"x"}"#)]).unwrap();
        assert_eq!(as_text(to_json(&[parsed.clone()])), r#"{"a":[1,2],"b":"x"}"#);
        assert_eq!(as_text(to_yaml(&[parsed])), "a:\n- 1\n- 2\nb: x");
    }

    #[test]
    fn files_as_config_and_secrets() {
        let files = Value::Map(HashMap::from([
            ("conf/b.txt".to_string(), s("pipo")),
            ("a.txt".to_string(), s("x")),
        ]));

        assert_eq!(as_text(as_secrets(&[files.clone()])), "a.txt: eA==\nb.txt: cGlwbw==");
        assert_eq!(as_text(as_config(&[files])), "a.txt: x\nb.txt: pipo");
        assert!(as_config(&[s("not a map")]).is_err());
    }

    #[test]
    fn values_to_toml() {
        let parsed = from_json(&[s(r#"{"name":"x","port":1}"#)]).unwrap();
        assert_eq!(as_text(to_toml(&[parsed])), "name = \"x\"\nport = 1\n");
    }

    #[test]
    fn expandenv_is_disabled() {
        assert_eq!(as_text(expandenv(&[s("$HOME")])), "<expandenv is not supported>");
    }

    #[test]
    fn env_requires_a_scope() {
        assert!(env(&[s("HOME")]).is_err());

        let _guard = enter(Scope {
            env: Arc::new(Environment::from([("HOME".to_string(), "/home/pipo".to_string())])),
            provider: Arc::new(SecretProvider::None),
            base_dir: PathBuf::from("."),
        });
        assert_eq!(as_text(env(&[s("HOME")])), "/home/pipo");
        assert_eq!(as_text(env(&[s("MISSING")])), "");
    }

    #[test]
    fn wrong_arity_is_an_error() {
        assert!(upper(&[]).is_err());
        assert!(replace(&[s("a"), s("b")]).is_err());
    }
}
