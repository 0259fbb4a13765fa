//! # sxconfig - valeurs des templates
//!
//! - [`read_values`] : fichier `--set-file`, un mapping YAML
//! - [`read_bundle`] : fichier `-a`, liste de templates + valeurs communes
//! - [`merge`] : fusion récursive, l'enfant gagne

mod bundle;
mod values;

pub use bundle::{Bundle, ResolvedTemplate, TemplateEntry, bundle_dir, read_bundle};
pub use values::{Values, merge, parse_values, read_values};

pub use serde_yaml::Value;
