/// Configuration schema and defaults for guildwatch.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[api]`, `[poller]`, `[dashboard]`, `[static_server]`, `[logging]` and the
/// `[[roles]]` array.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use anyhow::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level guildwatch configuration.
///
/// Maps directly to the `~/.guildwatch/config.toml` and `.guildwatch.toml`
/// file schemas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildwatchConfig {
    pub api: ApiConfig,
    pub poller: PollerConfig,
    pub dashboard: DashboardConfig,
    pub static_server: StaticServerConfig,
    pub logging: LoggingConfig,
    /// Roles shown in the role-grouped view, in display order.
    pub roles: Vec<RoleEntry>,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Remote bot status API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; `/api/status`, `/api/guilds` and `/health` are appended.
    pub url: String,
    /// Per-request timeout in milliseconds. `0` keeps the transport default.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "https://apibot-production-8cbb.up.railway.app".to_string(),
            timeout_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// [poller]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Period between fetch cycles.
    pub interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listen address for the dashboard server.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [static_server]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticServerConfig {
    pub addr: String,
    /// Directory that request paths are resolved against.
    pub root: String,
    /// Document served for `/`.
    pub default_document: String,
}

impl Default for StaticServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3001".to_string(),
            root: ".".to_string(),
            default_document: "index.html".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append one JSONL entry per fetch cycle to `~/.guildwatch/tick-log.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// [[roles]]
// ---------------------------------------------------------------------------

/// A role identifier and the label it is displayed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub id: String,
    pub label: String,
}

impl RoleEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The built-in role map.
pub fn default_roles() -> Vec<RoleEntry> {
    vec![
        RoleEntry::new("1313924720021737542", "Altos cargos"),
        RoleEntry::new("1313921807329263688", "Capo"),
        RoleEntry::new("1313923097748963388", "Solado"),
        RoleEntry::new("1313923578617528381", "Recluta"),
        RoleEntry::new("1314399223923347508", "Reco"),
    ]
}

impl GuildwatchConfig {
    /// Effective role map: the configured roles, or the built-in ones when
    /// none are configured.
    pub fn role_map(&self) -> Vec<RoleEntry> {
        if self.roles.is_empty() {
            default_roles()
        } else {
            self.roles.clone()
        }
    }

    /// Reject values the poller or servers cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poller.interval_ms == 0 {
            anyhow::bail!("poller.interval_ms must be greater than 0");
        }
        Ok(())
    }

    /// Replace invalid values with their defaults.
    pub fn normalize(&mut self) {
        if self.poller.interval_ms == 0 {
            self.poller.interval_ms = PollerConfig::default().interval_ms;
        }
    }

    /// Annotated default config written by `guildwatch config init`.
    pub fn default_toml() -> String {
        r#"# guildwatch configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Command-line flags
#   2. Environment variables (GUILDWATCH_*)
#   3. Project config (.guildwatch.toml in current directory)
#   4. User global config (~/.guildwatch/config.toml)
#   5. Built-in defaults

[api]
url = "https://apibot-production-8cbb.up.railway.app"
timeout_ms = 0          # 0 = transport default

[poller]
interval_ms = 5000

[dashboard]
addr = "127.0.0.1:3000"
open_browser = true

[static_server]
addr = "127.0.0.1:3001"
root = "."
default_document = "index.html"

[logging]
enabled = true          # JSONL tick log at ~/.guildwatch/tick-log.jsonl

# Roles listed in the role-grouped view. Leave empty to use the built-in map.
[[roles]]
id = "1313924720021737542"
label = "Altos cargos"

[[roles]]
id = "1313921807329263688"
label = "Capo"

[[roles]]
id = "1313923097748963388"
label = "Solado"

[[roles]]
id = "1313923578617528381"
label = "Recluta"

[[roles]]
id = "1314399223923347508"
label = "Reco"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
