//! Command-line interface of gtc
//!
//! - **collect**: resolve the access token, then run a collection over every repository the token
//!   can see, reporting repositories that failed on the error output
//! - **serve**: run the read-only viewer over a datastore

mod collect;
mod common;
mod host;
mod run;
mod serve;

pub use collect::{CollectArgs, collect};
pub use common::{LogLevel, LoggingArgs};
pub use host::Host;
pub use run::run;
pub use serve::{ServeArgs, serve};
