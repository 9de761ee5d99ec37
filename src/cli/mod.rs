//! CLI parser and dispatch.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "leadforge")]
#[command(about = "Outreach campaign backend with multi-strategy profile acquisition")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, short = 'c', global = true, env = "LEADFORGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Bind address: a port, a host, or host:port.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Acquire one profile and print it as JSON.
    Acquire {
        /// Profile URL.
        url: String,

        /// Session credential; falls back to the configured default.
        #[arg(long, env = "SESSION_COOKIE", hide_env_values = true)]
        session_cookie: Option<String>,

        /// Skip browser strategies and use only the direct API path.
        #[arg(long)]
        api_only: bool,

        /// Allow the persistent browser profile to run without a cookie.
        #[arg(long)]
        persistent: bool,

        /// Also generate an outreach message for the acquired profile.
        #[arg(long)]
        message: bool,
    },

    /// Inspect the configured proxy pool.
    Proxies {
        /// Print a random sample of this size instead of the full list.
        #[arg(long, default_value_t = 0)]
        sample: usize,
    },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            commands::cmd_serve(&settings, &bind).await
        }
        Commands::Acquire {
            url,
            session_cookie,
            api_only,
            persistent,
            message,
        } => {
            commands::cmd_acquire(
                &settings,
                &url,
                session_cookie.as_deref(),
                api_only,
                persistent,
                message,
            )
            .await
        }
        Commands::Proxies { sample } => commands::cmd_proxies(&settings, sample),
    }
}
