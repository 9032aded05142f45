//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `guildwatch dashboard`: poll the API and serve the dashboard
//! - `guildwatch serve`: static file server
//! - `guildwatch status`: fetch once and print the snapshot
//! - `guildwatch health`: config, API reachability and tick history
//! - `guildwatch config show|init|set|reset|path`: configuration management

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::analytics::{logger, reporter};
use crate::api::{ApiClient, DashboardApi};
use crate::config::{self, GuildwatchConfig};
use crate::fetcher::{self, Poller};
use crate::model::{PresenceStatus, UserPresence};
use crate::render::format_time;
use crate::state::{AppState, Connectivity, ViewFilter};
use crate::stats::{StatCards, guild_counts};
use crate::web::{self, Dashboard, files::SiteRoot};

/// Output format for `guildwatch status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// guildwatch dashboard
// ---------------------------------------------------------------------------

/// Start the poller and serve the dashboard until the process is stopped.
pub fn run_dashboard(cfg: &GuildwatchConfig) -> Result<()> {
    let client = ApiClient::from_config(&cfg.api);
    println!(
        "{} {} every {} ms",
        "Polling".bold().cyan(),
        client.base_url(),
        cfg.poller.interval_ms
    );

    let state = Arc::new(Mutex::new(AppState::new(cfg.role_map())));
    let poller = Poller::spawn(
        client,
        Arc::clone(&state),
        Duration::from_millis(cfg.poller.interval_ms),
        cfg.logging.enabled,
    )?;

    let dashboard = Dashboard {
        state,
        refresh_ms: cfg.poller.interval_ms,
    };
    let result = web::serve_dashboard(&cfg.dashboard.addr, &dashboard, cfg.dashboard.open_browser);

    poller.stop();
    result
}

// ---------------------------------------------------------------------------
// guildwatch serve
// ---------------------------------------------------------------------------

/// Serve the configured directory.
pub fn run_serve(cfg: &GuildwatchConfig) -> Result<()> {
    let site = SiteRoot::from_config(&cfg.static_server);
    web::files::serve_files(&cfg.static_server.addr, &site)
}

// ---------------------------------------------------------------------------
// guildwatch status
// ---------------------------------------------------------------------------

/// Run a single fetch cycle and print the resulting snapshot.
pub fn run_status(cfg: &GuildwatchConfig, format: OutputFormat, filter: ViewFilter) -> Result<()> {
    let client = ApiClient::from_config(&cfg.api);
    let report = fetcher::fetch_cycle(&client);
    if cfg.logging.enabled {
        logger::log_tick(&report, 0);
    }

    let error = report.error.clone();
    let mut state = AppState::new(cfg.role_map());
    state.apply(report);
    state.set_filter(filter);

    match format {
        OutputFormat::Json => print_status_json(&state)?,
        OutputFormat::Csv => print_status_csv(&state),
        OutputFormat::Table => print_status_table(&state, error.as_deref()),
    }

    Ok(())
}

fn print_status_table(state: &AppState, error: Option<&str>) {
    println!("{}", "guildwatch Status".bold().cyan());
    println!("{}", "=".repeat(60));

    let connectivity = match state.connectivity {
        Connectivity::Online => "API connected".green(),
        Connectivity::Offline => "API disconnected".red(),
        Connectivity::Unknown => "unknown".normal(),
    };
    println!("  {} {}", "API:    ".bold(), connectivity);
    if let Some(err) = error {
        println!("  {} {}", "Error:  ".bold(), err.red());
    }

    let cards = StatCards::compute(&state.users, &state.guilds);
    println!(
        "  {} {} online, {} idle, {} dnd, {} offline ({} total)",
        "Users:  ".bold(),
        cards.counts.online.to_string().green(),
        cards.counts.idle.to_string().yellow(),
        cards.counts.dnd.to_string().red(),
        cards.counts.offline.to_string().dimmed(),
        cards.total_users
    );
    println!("  {} {}", "Servers:".bold(), cards.servers);
    println!();

    let counts = guild_counts(&state.users);
    if !counts.is_empty() {
        println!("{}", "Users per Server".bold().cyan());
        for (guild, count) in counts {
            println!("  {:<30} {:>5}", truncate(&guild, 30), count);
        }
        println!();
    }

    let selected = state.filter.select(&state.users);
    println!(
        "{}",
        format!("Users ({})", state.filter.label()).bold().cyan()
    );
    if selected.is_empty() {
        println!("  {}", "No users match this filter".yellow());
        return;
    }

    println!(
        "  {:<24} {:<10} {:<20} {:<24} Last seen",
        "User", "Status", "Server", "Activity"
    );
    println!("  {}", "-".repeat(88));
    for (i, user) in selected.into_iter().enumerate() {
        let line = format!(
            "  {:<24} {:<10} {:<20} {:<24} {}",
            truncate(&user.username, 24),
            user.status.as_str(),
            truncate(&user.guild, 20),
            truncate(&activity_summary(user), 24),
            format_time(&user.last_seen),
        );
        let line = colorize_status(&line, user.status);
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_status_json(state: &AppState) -> Result<()> {
    let cards = StatCards::compute(&state.users, &state.guilds);
    let users: Vec<&UserPresence> = state.filter.select(&state.users);
    let value = serde_json::json!({
        "connectivity": state.connectivity,
        "filter": state.filter,
        "stats": cards,
        "guild_counts": guild_counts(&state.users)
            .into_iter()
            .map(|(guild, users)| serde_json::json!({ "guild": guild, "users": users }))
            .collect::<Vec<_>>(),
        "users": users,
        "guilds": state.guilds,
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_status_csv(state: &AppState) {
    println!("id,username,status,guild,activities,last_seen");
    for user in state.filter.select(&state.users) {
        println!(
            "{},{},{},{},{},{}",
            csv_field(&user.id),
            csv_field(&user.username),
            user.status,
            csv_field(&user.guild),
            csv_field(&activity_summary(user)),
            user.last_seen.to_rfc3339(),
        );
    }
}

// ---------------------------------------------------------------------------
// guildwatch health
// ---------------------------------------------------------------------------

/// Check configuration, API reachability and recent tick history.
pub fn run_health(cfg: &GuildwatchConfig) -> Result<()> {
    println!("{}", "guildwatch Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.guildwatch/config.toml found"
        } else {
            "not found (run `guildwatch config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".guildwatch.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = ApiClient::from_config(&cfg.api);
    match client.fetch_health() {
        Ok(health) => {
            print_health_item("API", health.success, &format!("reachable at {}", client.base_url()));
            print_health_item(
                "Bot",
                health.is_connected(),
                if health.is_connected() {
                    "connected"
                } else {
                    "not connected"
                },
            );
        }
        Err(e) => print_health_item("API", false, &format!("{e:#}")),
    }

    let entries = logger::read_recent_entries(100);
    if entries.is_empty() {
        print_health_item("Tick log", false, "no ticks recorded yet");
    } else {
        let summary = reporter::summarize(&entries);
        print_health_item(
            "Tick log",
            summary.failed == 0,
            &format!(
                "last {} ticks: {:.0}% connected, {} failed, avg {} ms",
                summary.ticks,
                summary.availability_pct(),
                summary.failed,
                summary.avg_duration_ms
            ),
        );
        if let Some(at) = &summary.last_timestamp {
            print_health_item("Last tick", true, at);
        }
        if let Some(err) = summary.last_error {
            print_health_item("Last error", false, &err);
        }
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// guildwatch config show | init | set | reset | path
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective guildwatch Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");
    Ok(())
}

/// Write the annotated default config file.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Print where configuration and logs live.
pub fn run_config_path() -> Result<()> {
    let show = |p: Option<std::path::PathBuf>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unknown)".to_string())
    };
    println!("{:<16} {}", "Global config:".bold(), show(config::global_config_file()));
    println!("{:<16} {}", "Project config:".bold(), show(config::project_config_file()));
    println!("{:<16} {}", "Tick log:".bold(), show(logger::tick_log_path()));
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Activity names joined with `, `, or `-` when there are none.
fn activity_summary(user: &UserPresence) -> String {
    if user.activities.is_empty() {
        "-".to_string()
    } else {
        user.activities
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn colorize_status(line: &str, status: PresenceStatus) -> colored::ColoredString {
    match status {
        PresenceStatus::Online => line.green(),
        PresenceStatus::Idle => line.yellow(),
        PresenceStatus::Dnd => line.red(),
        PresenceStatus::Offline => line.normal(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
