//! HTTP servers for guildwatch.
//!
//! Both servers are synchronous `tiny_http` loops handling one request at a
//! time:
//! - the dashboard server renders the shared [`AppState`] as HTML fragments
//!   and a JSON snapshot (`guildwatch dashboard`, default
//!   `http://127.0.0.1:3000`);
//! - the static file server in [`files`] serves a local directory with
//!   permissive CORS headers (`guildwatch serve`, default
//!   `http://127.0.0.1:3001`).
//!
//! Handlers return a [`Reply`], converted to a `tiny_http::Response` only
//! when it is sent.

pub mod files;
mod frontend;

use std::io::Cursor;
use std::sync::PoisonError;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::fetcher::SharedState;
use crate::model::{Guild, UserPresence};
use crate::render;
use crate::state::{AppState, Connectivity, ViewFilter};
use crate::stats::{StatCards, guild_counts};

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// A response ready to be written to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", content_type.to_string())],
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, "text/html; charset=utf-8", body)
    }

    pub fn json<T: Serialize>(data: &T) -> Result<Self> {
        let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
        Ok(Self::new(200, "application/json; charset=utf-8", body))
    }

    pub fn json_error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status, "application/json; charset=utf-8", body)
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// First value of the named header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut response =
            Response::from_data(self.body).with_status_code(StatusCode(self.status));
        for (name, value) in self.headers {
            // Header values are built from fixed strings and ASCII MIME types.
            if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                response.add_header(header);
            }
        }
        response
    }
}

/// Strip the query string from a request URL.
pub(crate) fn request_path(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Extract a query parameter from a request URL.
pub(crate) fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then_some(v)
    })
}

// ---------------------------------------------------------------------------
// Dashboard server
// ---------------------------------------------------------------------------

/// What the dashboard handlers need besides the request itself.
#[derive(Clone)]
pub struct Dashboard {
    pub state: SharedState,
    /// How often the page re-fetches its fragments.
    pub refresh_ms: u64,
}

/// Start the dashboard server on the given address.
///
/// Blocks the current thread. Errors are handled per request without
/// stopping the server.
pub fn serve_dashboard(addr: &str, dashboard: &Dashboard, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("guildwatch dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let reply = dashboard
            .dispatch(&method, &url)
            .unwrap_or_else(|e| Reply::json_error(500, &format!("{e:#}")));
        let status = reply.status;
        let _ = request.respond(reply.into_response());

        access_log(&method, &url, status);
    }

    Ok(())
}

impl Dashboard {
    /// Route a request to its handler.
    pub fn dispatch(&self, method: &Method, url: &str) -> Result<Reply> {
        match (method, request_path(url)) {
            (&Method::Get, "/") | (&Method::Get, "/index.html") => {
                let body = self.with_state(render::render_dashboard_body);
                Ok(Reply::html(frontend::render_page(&body, self.refresh_ms)))
            }
            (&Method::Get, "/fragments/dashboard") => {
                Ok(Reply::html(self.with_state(render::render_dashboard_body)))
            }
            (&Method::Get, "/fragments/users") => self.users_fragment(url),
            (&Method::Get, "/api/snapshot") => self.with_state(|s| Reply::json(&Snapshot::of(s))),
            _ => Ok(Reply::json_error(404, "not found")),
        }
    }

    /// `GET /fragments/users?filter=X`: select a filter and re-render the
    /// user table only.
    fn users_fragment(&self, url: &str) -> Result<Reply> {
        let filter = match query_param(url, "filter").map(str::parse::<ViewFilter>) {
            Some(Ok(filter)) => Some(filter),
            Some(Err(e)) => return Ok(Reply::json_error(400, &e.to_string())),
            None => None,
        };

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(filter) = filter {
            state.set_filter(filter);
        }
        Ok(Reply::html(render::render_user_rows(&state.users, state.filter)))
    }

    fn with_state<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }
}

/// `GET /api/snapshot` body.
#[derive(Serialize)]
struct Snapshot<'a> {
    connectivity: Connectivity,
    last_updated: Option<String>,
    filter: ViewFilter,
    stats: StatCards,
    guild_counts: Vec<GuildCount>,
    users: &'a [UserPresence],
    guilds: &'a [Guild],
}

#[derive(Serialize)]
struct GuildCount {
    guild: String,
    users: usize,
}

impl<'a> Snapshot<'a> {
    fn of(state: &'a AppState) -> Self {
        Self {
            connectivity: state.connectivity,
            last_updated: state.last_updated.map(|t| t.to_rfc3339()),
            filter: state.filter,
            stats: StatCards::compute(&state.users, &state.guilds),
            guild_counts: guild_counts(&state.users)
                .into_iter()
                .map(|(guild, users)| GuildCount { guild, users })
                .collect(),
            users: &state.users,
            guilds: &state.guilds,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Brief access log line.
pub(crate) fn access_log(method: &Method, url: &str, status: u16) {
    println!(
        "{} {} {} {}",
        chrono::Local::now().format("%H:%M:%S"),
        method,
        url,
        status
    );
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::config::schema::default_roles;
    use crate::fetcher::CycleReport;
    use crate::model::PresenceStatus;

    fn dashboard() -> Dashboard {
        Dashboard {
            state: Arc::new(Mutex::new(AppState::new(default_roles()))),
            refresh_ms: 5_000,
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
            last_seen: chrono::Utc::now(),
            role_ids: Vec::new(),
        }
    }

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("/fragments/users?filter=dnd", "filter"), Some("dnd"));
        assert_eq!(query_param("/x?a=1&filter=idle", "filter"), Some("idle"));
        assert_eq!(query_param("/x?a=1", "filter"), None);
        assert_eq!(query_param("/x", "filter"), None);
        assert_eq!(request_path("/x?a=1"), "/x");
    }

    #[test]
    fn index_embeds_body_and_refresh_interval() {
        let reply = dashboard().dispatch(&Method::Get, "/").unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("content-type"), Some("text/html; charset=utf-8"));
        let html = reply.body_text();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("No servers"));
        assert!(html.contains("const REFRESH_MS = 5000;"));
    }

    #[test]
    fn users_fragment_sets_filter() {
        let dashboard = dashboard();
        dashboard.state.lock().unwrap().apply(CycleReport {
            users: Some(vec![
                user("ana", PresenceStatus::Online),
                user("bo", PresenceStatus::Dnd),
            ]),
            guilds: None,
            connected: true,
            error: None,
        });

        let reply = dashboard
            .dispatch(&Method::Get, "/fragments/users?filter=dnd")
            .unwrap();
        let html = reply.body_text();
        assert!(html.contains("<strong>bo</strong>"));
        assert!(!html.contains("<strong>ana</strong>"));

        // The filter sticks for later renders.
        let html = dashboard
            .dispatch(&Method::Get, "/fragments/users")
            .unwrap()
            .body_text();
        assert!(!html.contains("<strong>ana</strong>"));
        assert_eq!(
            dashboard.state.lock().unwrap().filter,
            ViewFilter::Only(PresenceStatus::Dnd)
        );
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let reply = dashboard()
            .dispatch(&Method::Get, "/fragments/users?filter=busy")
            .unwrap();
        assert_eq!(reply.status, 400);
        assert!(reply.body_text().contains("unknown filter"));
    }

    #[test]
    fn snapshot_reports_counts() {
        let dashboard = dashboard();
        dashboard.state.lock().unwrap().apply(CycleReport {
            users: Some(vec![user("ana", PresenceStatus::Online)]),
            guilds: Some(Vec::new()),
            connected: false,
            error: None,
        });
        let reply = dashboard.dispatch(&Method::Get, "/api/snapshot").unwrap();
        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(json["connectivity"], "offline");
        assert_eq!(json["filter"], "all");
        assert_eq!(json["stats"]["online"], 1);
        assert_eq!(json["stats"]["total_users"], 1);
        assert_eq!(json["guild_counts"][0]["guild"], "Lobby");
        assert!(json["users"][0]["lastSeen"].is_string());
    }

    #[test]
    fn unknown_route_is_404() {
        let reply = dashboard().dispatch(&Method::Post, "/").unwrap();
        assert_eq!(reply.status, 404);
    }
}
