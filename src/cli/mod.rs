pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// OpenPGP public key directory: WKD, VKS and HKP lookups over keys synced
/// from a webkey service.
#[derive(Parser, Debug)]
#[command(name = "webkey", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root directory of the key store
    #[arg(long, global = true, env = "WEBKEY_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync OpenPGP public keys from a webkey service
    Sync {
        /// The webkey service url (prompted for when omitted)
        #[arg(long, visible_alias = "url", env = "WEBKEY_SERVICE_URL")]
        webkey_service_url: Option<String>,
    },

    /// Serve WKD, VKS and HKP lookups from the key store
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:11371
        #[arg(long, env = "WEBKEY_BIND")]
        bind: Option<String>,
    },
}
