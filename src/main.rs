use anyhow::Result;
use clap::{Parser, Subcommand};

use guildwatch::cli;
use guildwatch::config;
use guildwatch::state::ViewFilter;

#[derive(Debug, Parser)]
#[command(name = "guildwatch")]
#[command(about = "Presence and guild dashboard for a chat-bot status API")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll the bot API and serve the live dashboard
    Dashboard {
        /// Listen address (default from config: 127.0.0.1:3000)
        #[arg(long)]
        addr: Option<String>,
        /// Base URL of the bot status API
        #[arg(long)]
        api_url: Option<String>,
        /// Poll period in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Do not open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Serve a local directory with permissive CORS headers
    Serve {
        /// Listen address (default from config: 127.0.0.1:3001)
        #[arg(long)]
        addr: Option<String>,
        /// Directory to serve
        #[arg(long)]
        root: Option<String>,
    },
    /// Fetch once and print the current snapshot
    Status {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Status filter: all, online, idle, dnd, offline
        #[arg(long, default_value = "all")]
        filter: ViewFilter,
        /// Base URL of the bot status API
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Check configuration, API reachability and recent poll history
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.guildwatch/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `poller.interval_ms 2000`
    Set { key: String, value: String },
    /// Overwrite the global config with defaults
    Reset,
    /// Show config and log file locations
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();
    let mut cfg = config::load();

    match app.command {
        Commands::Dashboard {
            addr,
            api_url,
            interval_ms,
            no_open,
        } => {
            if let Some(addr) = addr {
                cfg.dashboard.addr = addr;
            }
            if let Some(url) = api_url {
                cfg.api.url = url;
            }
            if let Some(ms) = interval_ms.filter(|ms| *ms > 0) {
                cfg.poller.interval_ms = ms;
            }
            if no_open {
                cfg.dashboard.open_browser = false;
            }
            cli::run_dashboard(&cfg)
        }
        Commands::Serve { addr, root } => {
            if let Some(addr) = addr {
                cfg.static_server.addr = addr;
            }
            if let Some(root) = root {
                cfg.static_server.root = root;
            }
            cli::run_serve(&cfg)
        }
        Commands::Status {
            format,
            filter,
            api_url,
        } => {
            if let Some(url) = api_url {
                cfg.api.url = url;
            }
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_status(&cfg, fmt, filter)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
            ConfigAction::Path => cli::run_config_path(),
        },
    }
}
