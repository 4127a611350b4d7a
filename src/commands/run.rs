//! Command dispatch logic for gtc

use super::{CollectArgs, Host, ServeArgs, collect, serve};
use crate::Result;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "gtc", version, author, long_about = None)]
#[command(about = "Collect and view GitHub repository traffic statistics")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: GtcSubcommand,
}

#[derive(Subcommand, Debug)]
enum GtcSubcommand {
    /// Collect traffic for every repository the token can see
    Collect(CollectArgs),
    /// Serve charts and tables of collected traffic
    Serve(ServeArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match Cli::parse_from(args).command {
        GtcSubcommand::Collect(collect_args) => collect(host, &collect_args).await,
        GtcSubcommand::Serve(serve_args) => serve(host, &serve_args).await,
    }
}
