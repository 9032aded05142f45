//! Wire types of the remote bot status API.
//!
//! Field names follow the API's camelCase JSON. Snapshots built from these
//! types are never mutated locally, only filtered and aggregated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// A user's current availability.
///
/// Only the four values below are accepted; anything else fails to parse and
/// the whole payload is treated as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    Offline,
}

impl PresenceStatus {
    /// All statuses, in the order they are counted and charted.
    pub const ALL: [PresenceStatus; 4] = [Self::Online, Self::Idle, Self::Dnd, Self::Offline];

    /// Wire name (`online`, `idle`, `dnd`, `offline`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Offline => "offline",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Idle => "Idle",
            Self::Dnd => "Do Not Disturb",
            Self::Offline => "Offline",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Online => "🟢",
            Self::Idle => "🟡",
            Self::Dnd => "🔴",
            Self::Offline => "⚫",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a user is currently doing (game, stream, custom status).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
}

/// One monitored user as reported by `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresence {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub status: PresenceStatus,
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Display name of the guild the user was seen in.
    pub guild: String,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub role_ids: Vec<String>,
}

impl UserPresence {
    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|r| r == role_id)
    }
}

// ---------------------------------------------------------------------------
// Guilds
// ---------------------------------------------------------------------------

/// A chat server the bot is a member of, as reported by `GET /api/guilds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guild {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub member_count: u64,
    /// Number of channels.
    pub channels: u64,
    /// Number of roles.
    pub roles: u64,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

/// `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub users: Vec<UserPresence>,
}

/// `GET /api/guilds`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildsResponse {
    pub success: bool,
    #[serde(default)]
    pub guilds: Vec<Guild>,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    #[serde(default)]
    pub bot_connected: bool,
}

impl HealthResponse {
    /// The bot counts as connected only when both flags are set.
    pub fn is_connected(&self) -> bool {
        self.success && self.bot_connected
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
