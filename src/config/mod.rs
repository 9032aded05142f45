/// Configuration system for guildwatch.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::GuildwatchConfig::default()`]
/// 2. **User global config**: `~/.guildwatch/config.toml`
/// 3. **Project local config**: `.guildwatch.toml` in the current working directory
/// 4. **Environment variables**: `GUILDWATCH_*` overrides
///
/// Command-line flags are applied on top of the result by `main`.
///
/// # Usage
///
/// ```rust,ignore
/// use guildwatch::config;
///
/// let cfg = config::load();
/// let client = ApiClient::from_config(&cfg.api);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::GuildwatchConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars. Each file only
/// overrides the keys it sets.
pub fn load() -> GuildwatchConfig {
    let layers = [global_config_path(), project_config_path()]
        .into_iter()
        .filter_map(load_toml_file);

    let mut config = merge_layers(layers);
    apply_env_overrides(&mut config);
    config.normalize();

    config
}

/// Read a TOML file as a raw value tree (if it exists).
///
/// Malformed files are ignored so a bad edit never stops the dashboard from
/// starting with defaults.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            eprintln!("guildwatch: ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}

/// Merge config layers in order (later layers win) and deserialize once.
fn merge_layers(layers: impl IntoIterator<Item = toml::Value>) -> GuildwatchConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());
    for layer in layers {
        merge_value(&mut merged, layer);
    }

    match merged.try_into() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("guildwatch: ignoring invalid config, using defaults: {e}");
            GuildwatchConfig::default()
        }
    }
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value (arrays included) replaces the base value.
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.guildwatch/`, home of the global config and the tick log.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".guildwatch"))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".guildwatch.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Supported variables:
/// - `GUILDWATCH_API_URL`: remote API base URL
/// - `GUILDWATCH_INTERVAL_MS`: poll period
/// - `GUILDWATCH_DASHBOARD_ADDR`: dashboard listen address
/// - `GUILDWATCH_STATIC_ADDR`: static server listen address
/// - `GUILDWATCH_STATIC_ROOT`: static server root directory
/// - `GUILDWATCH_LOGGING`: tick log on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut GuildwatchConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable lookup.
fn apply_overrides(config: &mut GuildwatchConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("GUILDWATCH_API_URL")
        && !val.is_empty()
    {
        config.api.url = val;
    }
    if let Some(val) = var("GUILDWATCH_INTERVAL_MS")
        && let Ok(ms) = val.parse::<u64>()
        && ms > 0
    {
        config.poller.interval_ms = ms;
    }
    if let Some(val) = var("GUILDWATCH_DASHBOARD_ADDR")
        && !val.is_empty()
    {
        config.dashboard.addr = val;
    }
    if let Some(val) = var("GUILDWATCH_STATIC_ADDR")
        && !val.is_empty()
    {
        config.static_server.addr = val;
    }
    if let Some(val) = var("GUILDWATCH_STATIC_ROOT")
        && !val.is_empty()
    {
        config.static_server.root = val;
    }
    if let Some(val) = var("GUILDWATCH_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.guildwatch/config.toml`.
///
/// Returns an error if the file already exists and `force` is false.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.guildwatch/ directory")?;
    }

    fs::write(&path, GuildwatchConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `poller.interval_ms`. When no global file
/// exists yet, the defaults are written first.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&GuildwatchConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that would no longer deserialize.
    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    toml::from_str::<GuildwatchConfig>(&output)
        .with_context(|| format!("invalid value for '{key}': {value}"))?
        .validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("empty config key segment in '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("'{key}' cannot be set from the command line"),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
