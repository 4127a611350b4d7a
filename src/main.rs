//! Collects GitHub repository traffic statistics into a local time-series store.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use github_traffic_collector::{Host, run};
use std::io::{self, BufRead, Write, stderr, stdin, stdout};

/// Host backed by the process's standard streams
#[derive(Debug, Clone, Default)]
struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let _ = stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
