use super::Host;
use super::common::{LoggingArgs, init_logging};
use crate::Result;
use crate::viewer;
use camino::Utf8PathBuf;
use clap::Parser;
use core::net::{IpAddr, Ipv4Addr, SocketAddr};
use ohno::bail;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Directory a collector writes into
    #[arg(value_name = "DATASTORE")]
    pub datastore: Utf8PathBuf,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', value_name = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Run the read-only viewer over a datastore
pub async fn serve<H: Host>(host: &mut H, args: &ServeArgs) -> Result<()> {
    init_logging(&args.logging);

    if !args.datastore.is_dir() {
        bail!("datastore '{}' does not exist", args.datastore);
    }

    let listener = viewer::bind(SocketAddr::new(args.bind, args.port)).await?;
    if let Ok(addr) = listener.local_addr() {
        let _ = writeln!(host.output(), "Serving '{}' on http://{addr}", args.datastore);
    }

    viewer::serve(listener, args.datastore.as_std_path()).await
}
