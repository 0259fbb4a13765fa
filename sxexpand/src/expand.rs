//! Expansion d'un template ou d'un bundle

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use gtmpl::{Context, Template};
use gtmpl_value::Value;
use sxconfig::{Bundle, Values, bundle_dir, read_bundle, read_values};
use tracing::{debug, info};

use crate::convert::mapping_to_value;
use crate::environment::Environment;
use crate::functions::{self, Scope};
use crate::provider::SecretProvider;

/// Ce qu'il faut expanser, tel que donné sur la ligne de commande
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// `-t` : un seul template
    pub template: Option<PathBuf>,
    /// `-a` : un bundle, ignoré quand `template` est donné
    pub bundle: Option<PathBuf>,
    /// `--set-file` : valeurs qui écrasent toutes les autres
    pub set_file: Option<PathBuf>,
}

/// Expanse des templates avec un environnement et un provider fixés
pub struct Expander {
    env: Arc<Environment>,
    provider: Arc<SecretProvider>,
}

impl Expander {
    /// `env` doit déjà être masqué (voir [`crate::sanitize`])
    pub fn new(env: Environment, provider: SecretProvider) -> Self {
        Self {
            env: Arc::new(env),
            provider: Arc::new(provider),
        }
    }

    pub fn provider(&self) -> &SecretProvider {
        &self.provider
    }

    /// Expanse `text` ; `name` ne sert qu'aux messages d'erreur
    pub fn render(&self, name: &str, text: &str, base_dir: &Path, values: &Values) -> Result<String> {
        if !actions_closed(text) {
            return Err(anyhow!("parsing of '{name}' failed: unclosed action"));
        }

        let mut template = Template::default();
        functions::register(&mut template, self.provider.kind());
        template
            .parse(text)
            .map_err(|e| anyhow!("parsing of '{name}' failed: {e}"))?;

        let data = Value::Object(HashMap::from([(
            "Values".to_string(),
            mapping_to_value(values),
        )]));

        let _scope = functions::enter(Scope {
            env: Arc::clone(&self.env),
            provider: Arc::clone(&self.provider),
            base_dir: base_dir.to_path_buf(),
        });
        template
            .render(&Context::from(data))
            .map_err(|e| anyhow!("{name}: {e}"))
    }

    /// Lit, expanse et écrit un fichier template
    pub fn expand_file(&self, path: &Path, values: &Values, out: &mut dyn Write) -> Result<()> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let base_dir = bundle_dir(path);

        debug!(template = %path.display(), "Expanding template");
        let expanded = self.render(&path.display().to_string(), &text, &base_dir, values)?;
        out.write_all(expanded.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;

        info!(template = %path.display(), bytes = expanded.len(), "Template expanded");
        Ok(())
    }

    /// Expanse chaque template du bundle, dans l'ordre
    ///
    /// Stops at the first failing template; output of the templates already
    /// expanded has been written.
    pub fn expand_bundle(
        &self,
        bundle: &Bundle,
        base_dir: &Path,
        cli_values: &Values,
        out: &mut dyn Write,
    ) -> Result<()> {
        for resolved in bundle.resolve(base_dir, cli_values) {
            self.expand_file(&resolved.path, &resolved.values, out)?;
        }
        Ok(())
    }

    /// Point d'entrée de la ligne de commande
    pub fn run(&self, request: &Request, out: &mut dyn Write) -> Result<()> {
        let cli_values = read_values(request.set_file.as_deref())?;

        match (&request.template, &request.bundle) {
            (Some(template), _) => self
                .expand_file(template, &cli_values, out)
                .context("expanding"),
            (None, Some(bundle_path)) => {
                let bundle = read_bundle(bundle_path)?;
                self.expand_bundle(&bundle, &bundle_dir(bundle_path), &cli_values, out)
                    .with_context(|| format!("expanding {}", bundle_path.display()))
            }
            (None, None) => Err(anyhow!("-t or -a should be defined.")),
        }
    }
}

/// `true` si chaque `{{` a son `}}`
///
/// Quoted strings and `/* */` comments inside an action may contain `}}`.
/// The template parser never returns on an unterminated action, so this runs
/// before it.
fn actions_closed(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while let Some(open) = find(&bytes[i..], b"{{") {
        match action_end(&bytes[i + open + 2..]) {
            Some(len) => i += open + 2 + len,
            None => return false,
        }
    }
    true
}

/// Longueur de l'action jusqu'à `}}` inclus
fn action_end(action: &[u8]) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < action.len() {
        let b = action[i];
        match quote {
            Some(q) if b == b'\\' && q != b'`' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if action[i..].starts_with(b"/*") => {
                i += 2 + find(&action[i + 2..], b"*/")? + 1;
            }
            None if action[i..].starts_with(b"}}") => return Some(i + 2),
            None if matches!(b, b'"' | b'`' | b'\'') => quote = Some(b),
            None => {}
        }
        i += 1;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
