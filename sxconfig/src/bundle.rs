use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::values::{Values, merge};

/// Fichier passé avec `-a` : une liste de templates et des valeurs communes
///
/// ```yaml
/// templates:
/// - file: hello.tpl
///   values:
///     team:
///       lead: klukkluk
/// values:
///   who: world
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,

    #[serde(default, deserialize_with = "nullable_values")]
    pub values: Values,
}

/// Entrée de la liste `templates`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TemplateEntry {
    /// Chemin relatif au répertoire du bundle
    pub file: String,

    #[serde(default, deserialize_with = "nullable_values")]
    pub values: Values,
}

/// Template prêt à être expansé : chemin résolu et valeurs fusionnées
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub path: PathBuf,
    pub values: Values,
}

fn nullable_values<'de, D>(deserializer: D) -> std::result::Result<Values, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Values>::deserialize(deserializer)?.unwrap_or_default())
}

impl Bundle {
    pub fn parse(text: &str) -> Result<Self> {
        let bundle: Option<Bundle> = serde_yaml::from_str(text)?;
        Ok(bundle.unwrap_or_default())
    }

    /// Valeurs de chaque template, dans l'ordre de la liste
    ///
    /// For each entry: copy of the bundle values, then the entry values,
    /// then `cli_values`, each layer winning over the previous one.
    pub fn resolve(&self, base_dir: &Path, cli_values: &Values) -> Vec<ResolvedTemplate> {
        self.templates
            .iter()
            .map(|entry| {
                let mut values = self.values.clone();
                merge(&entry.values, &mut values);
                merge(cli_values, &mut values);
                ResolvedTemplate {
                    path: base_dir.join(&entry.file),
                    values,
                }
            })
            .collect()
    }
}

/// Lit le fichier bundle
pub fn read_bundle(path: &Path) -> Result<Bundle> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let bundle = Bundle::parse(&text).with_context(|| format!("parsing {}", path.display()))?;

    info!(bundle_file = %path.display(), templates = bundle.templates.len(), "Loaded bundle file");
    for entry in &bundle.templates {
        debug!(file = %entry.file, keys = entry.values.len(), "Bundle template");
    }
    Ok(bundle)
}

/// Répertoire auquel les chemins du bundle sont relatifs
pub fn bundle_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::parse_values;

    const BUNDLE: &str = r#"
templates:
- file: tpl/example.txt
  values:
    team:
      lead: pipo
- file: other.txt
values:
  audience: all
  team:
    lead: klukkluk
"#;

    #[test]
    fn parse_bundle() {
        let bundle = Bundle::parse(BUNDLE).unwrap();

        assert_eq!(bundle.templates.len(), 2);
        assert_eq!(bundle.templates[0].file, "tpl/example.txt");
        assert!(bundle.templates[1].values.is_empty());
        assert_eq!(bundle.values.len(), 2);
    }

    #[test]
    fn resolve_layers_values() {
        let bundle = Bundle::parse(BUNDLE).unwrap();
        let cli = parse_values("audience: everyone\n").unwrap();

        let resolved = bundle.resolve(Path::new("/srv/bundle"), &cli);

        assert_eq!(resolved[0].path, Path::new("/srv/bundle/tpl/example.txt"));
        assert_eq!(
            resolved[0].values,
            parse_values("audience: everyone\nteam:\n  lead: pipo\n").unwrap()
        );
        assert_eq!(
            resolved[1].values,
            parse_values("audience: everyone\nteam:\n  lead: klukkluk\n").unwrap()
        );
    }

    #[test]
    fn resolve_does_not_leak_between_templates() {
        let bundle = Bundle::parse(BUNDLE).unwrap();
        let resolved = bundle.resolve(Path::new("."), &Values::new());

        assert_eq!(
            resolved[1].values,
            parse_values("audience: all\nteam:\n  lead: klukkluk\n").unwrap()
        );
        assert_eq!(bundle.values, parse_values("audience: all\nteam:\n  lead: klukkluk\n").unwrap());
    }

    #[test]
    fn empty_and_null_sections() {
        assert_eq!(Bundle::parse("").unwrap(), Bundle::default());

        let bundle = Bundle::parse("templates:\n- file: a.txt\n  values:\nvalues:\n").unwrap();
        assert_eq!(bundle.templates[0].file, "a.txt");
        assert!(bundle.values.is_empty());
    }

    #[test]
    fn bundle_dir_of_bare_file_name() {
        assert_eq!(bundle_dir(Path::new("all.yaml")), PathBuf::from("."));
        assert_eq!(bundle_dir(Path::new("conf/all.yaml")), PathBuf::from("conf"));
    }
}
