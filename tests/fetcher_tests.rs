/// Fetch-cycle tests.
///
/// Drive `fetch_cycle` and `AppState::apply` with an in-memory API to check
/// snapshot replacement, connectivity and abort behaviour.
use std::cell::RefCell;

use anyhow::Result;
use chrono::Utc;
use guildwatch::api::DashboardApi;
use guildwatch::config::schema::default_roles;
use guildwatch::fetcher::fetch_cycle;
use guildwatch::model::{
    Guild, GuildsResponse, HealthResponse, PresenceStatus, StatusResponse, UserPresence,
};
use guildwatch::state::{AppState, Connectivity};

// ---------------------------------------------------------------------------
// Fake API
// ---------------------------------------------------------------------------

/// Canned answer for one endpoint: `Err` simulates a network failure.
type Canned<T> = std::result::Result<T, &'static str>;

struct FakeApi {
    status: Canned<StatusResponse>,
    guilds: Canned<GuildsResponse>,
    health: Canned<HealthResponse>,
    calls: RefCell<Vec<&'static str>>,
}

impl FakeApi {
    fn healthy(users: Vec<UserPresence>, guilds: Vec<Guild>) -> Self {
        Self {
            status: Ok(StatusResponse {
                success: true,
                users,
            }),
            guilds: Ok(GuildsResponse {
                success: true,
                guilds,
            }),
            health: Ok(HealthResponse {
                success: true,
                bot_connected: true,
            }),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

fn answer<T: Clone>(canned: &Canned<T>) -> Result<T> {
    canned.clone().map_err(|e| anyhow::anyhow!(e))
}

impl DashboardApi for FakeApi {
    fn fetch_status(&self) -> Result<StatusResponse> {
        self.calls.borrow_mut().push("status");
        answer(&self.status)
    }
    fn fetch_guilds(&self) -> Result<GuildsResponse> {
        self.calls.borrow_mut().push("guilds");
        answer(&self.guilds)
    }
    fn fetch_health(&self) -> Result<HealthResponse> {
        self.calls.borrow_mut().push("health");
        answer(&self.health)
    }
}

fn user(name: &str, status: PresenceStatus) -> UserPresence {
    UserPresence {
        id: name.to_string(),
        username: name.to_string(),
        avatar: String::new(),
        status,
        activities: Vec::new(),
        guild: "Lobby".to_string(),
        last_seen: Utc::now(),
        role_ids: Vec::new(),
    }
}

fn guild(name: &str) -> Guild {
    Guild {
        name: name.to_string(),
        icon: None,
        member_count: 1,
        channels: 1,
        roles: 1,
    }
}

/// A state that already holds one user and one guild from an earlier tick.
fn seeded_state() -> AppState {
    let mut state = AppState::new(default_roles());
    let api = FakeApi::healthy(vec![user("old", PresenceStatus::Idle)], vec![guild("Old")]);
    state.apply(fetch_cycle(&api));
    state
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn successful_cycle_replaces_both_snapshots() {
    let mut state = seeded_state();
    let api = FakeApi::healthy(
        vec![
            user("a", PresenceStatus::Online),
            user("b", PresenceStatus::Dnd),
        ],
        vec![guild("New"), guild("Other")],
    );

    let report = fetch_cycle(&api);
    assert!(report.connected);
    assert!(report.error.is_none());
    assert_eq!(api.calls(), ["status", "guilds", "health"]);

    state.apply(report);
    let names: Vec<_> = state.users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(state.guilds.len(), 2);
    assert_eq!(state.connectivity, Connectivity::Online);
    assert_eq!(state.charts.status.data, vec![1, 0, 1, 0]);
}

#[test]
fn bot_not_connected_means_offline() {
    let mut state = seeded_state();
    let mut api = FakeApi::healthy(vec![user("a", PresenceStatus::Online)], vec![]);
    api.health = Ok(HealthResponse {
        success: true,
        bot_connected: false,
    });

    state.apply(fetch_cycle(&api));
    assert_eq!(state.connectivity, Connectivity::Offline);
    // Snapshots from successful endpoints still land.
    assert_eq!(state.users[0].username, "a");
    assert!(state.guilds.is_empty());
}

#[test]
fn unsuccessful_status_keeps_previous_users() {
    let mut state = seeded_state();
    let mut api = FakeApi::healthy(vec![user("new", PresenceStatus::Online)], vec![guild("New")]);
    api.status = Ok(StatusResponse {
        success: false,
        users: vec![user("ignored", PresenceStatus::Online)],
    });

    let report = fetch_cycle(&api);
    assert_eq!(api.calls(), ["status", "guilds", "health"]);
    state.apply(report);

    assert_eq!(state.users[0].username, "old");
    assert_eq!(state.guilds[0].name, "New");
    assert_eq!(state.connectivity, Connectivity::Offline);
}

#[test]
fn network_failure_aborts_rest_of_cycle() {
    let mut state = seeded_state();
    let before = state.last_updated;
    let mut api = FakeApi::healthy(vec![user("new", PresenceStatus::Online)], vec![guild("New")]);
    api.guilds = Err("connection reset");

    let report = fetch_cycle(&api);
    assert_eq!(api.calls(), ["status", "guilds"]);
    assert!(!report.connected);
    assert!(report.error.as_deref().unwrap().contains("connection reset"));

    state.apply(report);
    // Status succeeded before the failure, guilds did not.
    assert_eq!(state.users[0].username, "new");
    assert_eq!(state.guilds[0].name, "Old");
    assert_eq!(state.connectivity, Connectivity::Offline);
    assert!(state.last_updated >= before);
}

#[test]
fn next_cycle_after_failure_starts_fresh() {
    let mut state = seeded_state();
    let mut down = FakeApi::healthy(vec![], vec![]);
    down.status = Err("timeout");
    state.apply(fetch_cycle(&down));
    assert_eq!(state.connectivity, Connectivity::Offline);
    assert_eq!(down.calls(), ["status"]);

    let up = FakeApi::healthy(vec![user("back", PresenceStatus::Online)], vec![guild("G")]);
    state.apply(fetch_cycle(&up));
    assert_eq!(up.calls(), ["status", "guilds", "health"]);
    assert_eq!(state.connectivity, Connectivity::Online);
    assert_eq!(state.users[0].username, "back");
}
