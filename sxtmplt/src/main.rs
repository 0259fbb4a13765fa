//! sxtmplt : expansion de templates avec des secrets Thycotic ou Key Vault
//!
//! ```text
//! sxtmplt -t deploy.yaml.tpl --set-file values.yaml
//! sxtmplt -a all.yaml --provider thycotic --url https://ss.example.com -u svc -p ... -d CORP
//! sxtmplt -a all.yaml --provider azkv --url https://name.vault.azure.net
//! ```

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use sxazkv::Credentials;
use sxexpand::{Environment, Expander, ProviderKind, SecretProvider, os_environment, sanitize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

fn login(cli: &Cli, kind: Option<ProviderKind>, env: &Environment) -> Result<SecretProvider> {
    let config = cli.client_config();
    match kind {
        Some(ProviderKind::Thycotic) => SecretProvider::thycotic(
            config,
            cli.username.as_deref().unwrap_or(""),
            cli.password(),
            cli.domain.as_deref().unwrap_or(""),
        ),
        Some(ProviderKind::Azkv) => {
            let credentials = Credentials::from_vars(env)?;
            SecretProvider::key_vault(&config, &credentials)
        }
        None => Ok(SecretProvider::None),
    }
}

fn run(cli: &Cli, kind: Option<ProviderKind>, env: Environment) -> Result<()> {
    let provider = login(cli, kind, &env)?;
    let expander = Expander::new(sanitize(env, cli.password()), provider);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    expander.run(&cli.request(), &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = os_environment();

    let kind = match cli.validate(&env) {
        Ok(kind) => kind,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(cli.log_level());
    info!(
        provider = kind.map(|k| k.as_str()).unwrap_or(""),
        url = cli.url.as_deref().unwrap_or(""),
        template = ?cli.template,
        all = ?cli.all,
        set_file = ?cli.set_file,
        "Starting sxtmplt {}",
        env!("CARGO_PKG_VERSION")
    );

    match run(&cli, kind, env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
