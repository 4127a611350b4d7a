use super::Host;
use super::common::{LoggingArgs, init_logging};
use crate::Result;
use crate::config::Config;
use crate::ingest::{RunOptions, run};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ohno::{IntoAppError, bail};
use std::io::Write;

const LOG_TARGET: &str = "   collect";

#[derive(Parser, Debug)]
pub struct CollectArgs {
    /// Directory holding the store, the archived payloads and the configuration file
    #[arg(value_name = "DATASTORE")]
    pub datastore: Utf8PathBuf,

    /// GitHub personal access token, used instead of the one in the configuration file
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Collect traffic for every repository the token can see into the datastore
pub async fn collect<H: Host>(host: &mut H, args: &CollectArgs) -> Result<()> {
    init_logging(&args.logging);

    let config = resolve_config(host, &args.datastore, args.github_token.as_deref())?;

    let summary = run(
        args.datastore.as_std_path(),
        &config.access_token,
        RunOptions::new(config.client_settings()),
        host.output(),
    )
    .await?;

    if !summary.failures.is_empty() {
        let mut err = host.error();
        let _ = writeln!(err, "\nFailed to process {} of {} repositories", summary.failures.len(), summary.repositories());
        for failure in &summary.failures {
            let _ = writeln!(err, "  {}: {:#}", failure.repo, failure.error);
        }
    }

    Ok(())
}

/// Settings for this run.
///
/// An explicit token takes precedence over the configuration file. Without a configuration file
/// the token comes from the arguments or from the user, and a new file is written so later runs
/// don't need it.
fn resolve_config<H: Host>(host: &mut H, datastore: &Utf8Path, token_arg: Option<&str>) -> Result<Config> {
    if let Some(mut config) = Config::load(datastore)? {
        if let Some(token) = token_arg {
            config.access_token = token.to_string();
        }
        return Ok(config);
    }

    let token = match token_arg {
        Some(token) => token.to_string(),
        None => prompt_token(host)?,
    };

    let config = Config::with_token(token);
    config.save(datastore)?;
    log::info!(target: LOG_TARGET, "Saved configuration to '{}'", Config::path(datastore));

    Ok(config)
}

fn prompt_token<H: Host>(host: &mut H) -> Result<String> {
    {
        let mut out = host.output();
        let _ = write!(out, "GitHub access token: ");
        let _ = out.flush();
    }

    let line = host.read_line().into_app_err("reading access token")?;
    let token = line.trim();
    if token.is_empty() {
        bail!("no access token given");
    }

    Ok(token.to_string())
}
