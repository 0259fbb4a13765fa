//! # sxexpand - expansion des templates
//!
//! Templates use the Go `text/template` syntax. They see the merged values
//! under `.Values` and a set of functions:
//!
//! - ✅ `env` sur un environnement masqué (mot de passe, variables `AZURE_*`)
//! - ✅ `toYaml`, `fromYaml`, `toJson`, `fromJson`
//! - ✅ `filebase`, `filedir`, `fileclean`, `fileext`, `fileGet`
//! - ✅ un sous-ensemble de sprig (`indent`, `quote`, `default`, ...)
//! - ✅ `thycotic ID "Field"` avec `--provider=thycotic`
//! - ✅ `secret "name"` avec `--provider=azkv`
//!
//! ## Exemple
//!
//! ```no_run
//! use sxexpand::{Expander, Request, SecretProvider, os_environment, sanitize};
//!
//! let env = sanitize(os_environment(), "");
//! let expander = Expander::new(env, SecretProvider::None);
//! let request = Request {
//!     template: Some("deploy.yaml.tpl".into()),
//!     ..Default::default()
//! };
//! expander.run(&request, &mut std::io::stdout())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod convert;
mod environment;
mod expand;
pub mod functions;
pub mod paths;
mod provider;

pub use environment::{Environment, MASK, os_environment, sanitize, sanitize_key, sanitize_value};
pub use expand::{Expander, Request};
pub use provider::{ProviderKind, SecretProvider};
