//! In-memory view state of the dashboard.
//!
//! [`AppState`] is created once at startup, updated by every fetch cycle and
//! read by the renderers. It is the only mutable state in the process.

use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::schema::RoleEntry;
use crate::fetcher::CycleReport;
use crate::model::{Guild, PresenceStatus, UserPresence};
use crate::stats::Charts;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Status filter applied to the user table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewFilter {
    #[default]
    All,
    Only(PresenceStatus),
}

impl ViewFilter {
    /// The five selectable filters, in button order.
    pub const ALL: [ViewFilter; 5] = [
        Self::All,
        Self::Only(PresenceStatus::Online),
        Self::Only(PresenceStatus::Idle),
        Self::Only(PresenceStatus::Dnd),
        Self::Only(PresenceStatus::Offline),
    ];

    pub fn matches(self, status: PresenceStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.label(),
        }
    }

    /// Users matching this filter, in snapshot order.
    pub fn select(self, users: &[UserPresence]) -> Vec<&UserPresence> {
        users.iter().filter(|u| self.matches(u.status)).collect()
    }
}

impl FromStr for ViewFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "online" => Ok(Self::Only(PresenceStatus::Online)),
            "idle" => Ok(Self::Only(PresenceStatus::Idle)),
            "dnd" => Ok(Self::Only(PresenceStatus::Dnd)),
            "offline" => Ok(Self::Only(PresenceStatus::Offline)),
            other => anyhow::bail!(
                "unknown filter '{other}' (expected all, online, idle, dnd or offline)"
            ),
        }
    }
}

impl Serialize for ViewFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

/// Outcome of the most recent fetch cycle as shown by the status dot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// No cycle has completed yet.
    #[default]
    Unknown,
    Online,
    Offline,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppState {
    pub users: Vec<UserPresence>,
    pub guilds: Vec<Guild>,
    pub filter: ViewFilter,
    pub connectivity: Connectivity,
    /// Local time of the last completed cycle, successful or not.
    pub last_updated: Option<DateTime<Local>>,
    /// Chart widgets, rebuilt from `users` whenever the snapshot changes.
    pub charts: Charts,
    pub roles: Vec<RoleEntry>,
}

impl AppState {
    pub fn new(roles: Vec<RoleEntry>) -> Self {
        Self {
            users: Vec::new(),
            guilds: Vec::new(),
            filter: ViewFilter::default(),
            connectivity: Connectivity::default(),
            last_updated: None,
            charts: Charts::new(),
            roles,
        }
    }

    /// Apply the result of one fetch cycle.
    ///
    /// Each snapshot present in the report replaces the held one wholesale;
    /// absent snapshots are left untouched. Connectivity and the
    /// last-updated time are always overwritten.
    pub fn apply(&mut self, report: CycleReport) {
        if let Some(users) = report.users {
            self.users = users;
            self.charts.update(&self.users);
        }
        if let Some(guilds) = report.guilds {
            self.guilds = guilds;
        }
        self.connectivity = if report.connected {
            Connectivity::Online
        } else {
            Connectivity::Offline
        };
        self.last_updated = Some(Local::now());
    }

    pub fn set_filter(&mut self, filter: ViewFilter) {
        self.filter = filter;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
