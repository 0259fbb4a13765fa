//! Ligne de commande et validation des options

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use sxazkv::REQUIRED_VARIABLES;
use sxexpand::{Environment, ProviderKind, Request};
use sxsoap::{ClientConfig, DEFAULT_DIAL_TIMEOUT};

const AFTER_LONG_HELP: &str = r#"sxtmplt reads template files and expands {{ }} occurrences. Output goes to stdout.

Examples:
sxtmplt -t <templatefile> to expand a single template file.

sxtmplt -a <listfile> takes a yaml file with templates and values fields like this:
    templates:
    - file: hello.tpl
      values:
        team:
          lead: klukkluk
    values:
      who: world
      team:
        lead: pipo
Assuming 'hello.tpl' contains: {{ .Values.team.lead }} says hello {{ .Values.who }}!
running sxtmplt -a test.yaml produces: klukkluk says hello world!

Functions:
Go text/template syntax with a subset of sprig (indent, nindent, quote, squote,
default, upper, lower, trim, replace, b64enc, b64dec).
Other functions:
    thycotic - With --provider=thycotic occurrences like {{ thycotic 1234 "Password" }}
    are replaced with the corresponding Thycotic secret value (1234 is the secret ID,
    an int32, and "Password" the field name). Authentication uses -u -p and -d.

    secret - With --provider=azkv occurrences like {{ secret "name-of-secret" }} are
    replaced with the value of https://name-of-keyvault.vault.azure.net/secrets/name-of-secret.
    Name-of-secret should match [0-9a-zA-Z-]. Authentication uses --url and the
    AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET environment variables.

    env "NAME" - Environment variable; values equal to -p and AZURE_* variables
    read as ********.

    toYaml, fromYaml, toJson, fromJson, toToml

    filebase, filedir, fileclean, fileext

    fileGet "filename" - Content of a file relative to the template directory.

    fileGlob "pattern" - Map of relative path to content for the matching files.
    {{ fileGlob "conf/*" | asConfig }} renders them as a yaml block keyed by file
    name; asSecrets does the same with base64-encoded contents.

Beware: file access is not sanitized.
"#;

#[derive(Parser, Debug)]
#[command(name = "sxtmplt", version, about = "Expand templates with values and secrets")]
#[command(after_long_help = AFTER_LONG_HELP)]
pub struct Cli {
    /// Provider is thycotic | azkv when secrets need to be fetched
    #[arg(long, env = "SXTMPLT_PROVIDER")]
    pub provider: Option<String>,

    /// Url of the secret store; for azkv use https://name-of-keyvault.vault.azure.net
    #[arg(long, env = "SXTMPLT_URL")]
    pub url: Option<String>,

    /// For provider=thycotic; username of the account used to retrieve secrets
    #[arg(short = 'u', long = "username", env = "SXTMPLT_USERNAME")]
    pub username: Option<String>,

    /// For provider=thycotic; password of the account used to retrieve secrets
    #[arg(short = 'p', long = "password", env = "SXTMPLT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// For provider=thycotic; domain of the account used to retrieve secrets
    #[arg(short = 'd', long = "domain", env = "SXTMPLT_DOMAIN")]
    pub domain: Option<String>,

    /// Filename of the template to expand
    #[arg(short = 't', long = "template", env = "SXTMPLT_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Filename of a yaml file that lists templates and the values to expand
    #[arg(short = 'a', long = "all", env = "SXTMPLT_ALL")]
    pub all: Option<PathBuf>,

    /// Filename of a yaml file with values
    #[arg(long, env = "SXTMPLT_SET_FILE")]
    pub set_file: Option<PathBuf>,

    /// Do not verify the TLS certificate of the secret store
    #[arg(long, env = "SXTMPLT_INSECURE_SKIP_VERIFY")]
    pub insecure_skip_verify: bool,

    /// Connect timeout in seconds
    #[arg(long, env = "SXTMPLT_DIAL_TIMEOUT", default_value_t = DEFAULT_DIAL_TIMEOUT.as_secs())]
    pub dial_timeout: u64,

    /// Overall timeout of one request in seconds
    #[arg(long, env = "SXTMPLT_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl Cli {
    /// Vérifie les options ; le message d'erreur est destiné à l'utilisateur
    pub fn validate(&self, env: &Environment) -> Result<Option<ProviderKind>, String> {
        if self.template.is_none() && self.all.is_none() {
            return Err("-t or -a should be defined.".to_string());
        }

        match self.provider.as_deref().unwrap_or("") {
            "thycotic" => {
                if !is_set(&self.username) || !is_set(&self.password) || !is_set(&self.domain) {
                    return Err("provider=thycotic requires -u -p and -d to be set.".to_string());
                }
                if !is_set(&self.url) {
                    return Err("provider=thycotic requires -url to be set.".to_string());
                }
                Ok(Some(ProviderKind::Thycotic))
            }
            "azkv" => {
                if let Some(missing) = REQUIRED_VARIABLES.iter().find(|v| !env.contains_key(**v)) {
                    return Err(format!(
                        "provider=azkv requires environment variable {missing} to be set."
                    ));
                }
                if !is_set(&self.url) {
                    return Err("provider=azkv requires -url to be set.".to_string());
                }
                Ok(Some(ProviderKind::Azkv))
            }
            "" => {
                if is_set(&self.username) || is_set(&self.password) {
                    return Err(
                        "Since v0.6.0 you need to set -provider=thycotic in combination with -u and -p."
                            .to_string(),
                    );
                }
                Ok(None)
            }
            _ => Err("-provider should be set to 'thycotic' or 'azkv' or not be set.".to_string()),
        }
    }

    /// Configuration HTTP commune aux deux providers
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.url.clone().unwrap_or_default())
            .tls_verify(!self.insecure_skip_verify)
            .dial_timeout(Duration::from_secs(self.dial_timeout));
        if let Some(secs) = self.request_timeout {
            config = config.request_timeout(Duration::from_secs(secs));
        }
        config
    }

    pub fn request(&self) -> Request {
        Request {
            template: self.template.clone(),
            bundle: self.all.clone(),
            set_file: self.set_file.clone(),
        }
    }

    /// Filtre tracing quand `RUST_LOG` n'est pas défini
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["sxtmplt"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn azure_env() -> Environment {
        REQUIRED_VARIABLES
            .iter()
            .map(|name| (name.to_string(), "x".to_string()))
            .collect()
    }

    #[test]
    fn template_or_bundle_required() {
        let err = cli(&[]).validate(&Environment::new()).unwrap_err();
        assert_eq!(err, "-t or -a should be defined.");
    }

    #[test]
    fn no_provider() {
        assert_eq!(cli(&["-t", "x.tpl"]).validate(&Environment::new()), Ok(None));
    }

    #[test]
    fn credentials_without_provider() {
        let err = cli(&["-t", "x.tpl", "-u", "svc", "-p", "pw"])
            .validate(&Environment::new())
            .unwrap_err();
        assert_eq!(
            err,
            "Since v0.6.0 you need to set -provider=thycotic in combination with -u and -p."
        );
    }

    #[test]
    fn thycotic_requirements() {
        let env = Environment::new();

        let err = cli(&["-a", "all.yaml", "--provider", "thycotic", "-u", "svc", "-p", "pw"])
            .validate(&env)
            .unwrap_err();
        assert_eq!(err, "provider=thycotic requires -u -p and -d to be set.");

        let err = cli(&["-a", "all.yaml", "--provider", "thycotic", "-u", "svc", "-p", "pw", "-d", "CORP"])
            .validate(&env)
            .unwrap_err();
        assert_eq!(err, "provider=thycotic requires -url to be set.");

        let ok = cli(&[
            "-a", "all.yaml", "--provider", "thycotic", "-u", "svc", "-p", "pw", "-d", "CORP",
            "--url", "https://ss.example.com",
        ])
        .validate(&env);
        assert_eq!(ok, Ok(Some(ProviderKind::Thycotic)));
    }

    #[test]
    fn azkv_requirements() {
        let args = ["-t", "x.tpl", "--provider", "azkv", "--url", "https://v.vault.azure.net"];

        let err = cli(&args).validate(&Environment::new()).unwrap_err();
        assert_eq!(err, "provider=azkv requires environment variable AZURE_TENANT_ID to be set.");

        assert_eq!(cli(&args).validate(&azure_env()), Ok(Some(ProviderKind::Azkv)));

        let err = cli(&["-t", "x.tpl", "--provider", "azkv"])
            .validate(&azure_env())
            .unwrap_err();
        assert_eq!(err, "provider=azkv requires -url to be set.");
    }

    #[test]
    fn unknown_provider() {
        let err = cli(&["-t", "x.tpl", "--provider", "vault"])
            .validate(&Environment::new())
            .unwrap_err();
        assert_eq!(err, "-provider should be set to 'thycotic' or 'azkv' or not be set.");
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(cli(&[]).log_level(), "warn");
        assert_eq!(cli(&["-vv"]).log_level(), "debug");
        assert_eq!(cli(&["-v", "-v", "-v", "-v"]).log_level(), "trace");
    }

    #[test]
    fn timeouts_reach_client_config() {
        let config = cli(&["--url", "https://x", "--dial-timeout", "5", "--request-timeout", "60"]).client_config();
        assert_eq!(config.dial_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.url, "https://x");
    }
}
