/// API client tests against a local stub server.
///
/// A `tiny_http` server on an ephemeral port answers the three bot API
/// endpoints with canned JSON so the real `ureq` client and the fetch
/// cycle can be exercised without network access.
use std::thread;

use guildwatch::api::{ApiClient, DashboardApi};
use guildwatch::config::schema::ApiConfig;
use guildwatch::fetcher::fetch_cycle;
use guildwatch::model::PresenceStatus;
use tiny_http::{Header, Response, Server};

const STATUS_BODY: &str = r#"{
  "success": true,
  "users": [
    {
      "id": "1",
      "username": "ana",
      "avatar": "https://cdn.example/1.png",
      "status": "dnd",
      "activities": [{"name": "Chess"}],
      "guild": "Lobby",
      "lastSeen": "2024-05-01T12:00:00Z",
      "roleIds": ["1288964466958602292"]
    }
  ]
}"#;

const GUILDS_BODY: &str = r#"{
  "success": true,
  "guilds": [
    {"name": "Lobby", "icon": null, "memberCount": 12, "channels": 4, "roles": 2}
  ]
}"#;

/// Start a stub API answering `requests` calls, routed by path.
fn stub_api(health: &'static str, requests: usize) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    thread::spawn(move || {
        for request in server.incoming_requests().take(requests) {
            let (status, body): (u16, &str) = match request.url() {
                "/api/status" => (200, STATUS_BODY),
                "/api/guilds" => (200, GUILDS_BODY),
                "/health" => (200, health),
                _ => (404, r#"{"error":"not found"}"#),
            };
            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    format!("http://{addr}/")
}

fn client(url: String) -> ApiClient {
    ApiClient::from_config(&ApiConfig {
        url,
        timeout_ms: 2_000,
    })
}

#[test]
fn decodes_status_payload() {
    let api = client(stub_api(r#"{"success":true,"botConnected":true}"#, 1));
    let status = api.fetch_status().unwrap();
    assert!(status.success);
    let user = &status.users[0];
    assert_eq!(user.username, "ana");
    assert_eq!(user.status, PresenceStatus::Dnd);
    assert_eq!(user.activities[0].name, "Chess");
    assert!(user.has_role("1288964466958602292"));
}

#[test]
fn trailing_slash_in_base_url_is_dropped() {
    let api = client(stub_api(r#"{"success":true,"botConnected":true}"#, 0));
    assert!(!api.base_url().ends_with('/'));
}

#[test]
fn full_cycle_against_stub() {
    let api = client(stub_api(r#"{"success":true,"botConnected":true}"#, 3));
    let report = fetch_cycle(&api);
    assert!(report.error.is_none(), "{:?}", report.error);
    assert!(report.connected);
    assert_eq!(report.users.unwrap().len(), 1);
    let guilds = report.guilds.unwrap();
    assert_eq!(guilds[0].member_count, 12);
    assert!(guilds[0].icon.is_none());
}

#[test]
fn disconnected_bot_is_reported() {
    let api = client(stub_api(r#"{"success":true,"botConnected":false}"#, 3));
    let report = fetch_cycle(&api);
    assert!(report.error.is_none());
    assert!(!report.connected);
    assert!(report.users.is_some());
}

#[test]
fn unreachable_api_is_an_error() {
    let api = client("http://127.0.0.1:1".to_string());
    let report = fetch_cycle(&api);
    assert!(!report.connected);
    assert!(report.error.unwrap().contains("/api/status"));
}
