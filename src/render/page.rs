use std::fmt::Write;

use super::{render_charts, render_guild_grid, render_role_cards, render_user_rows};
use crate::state::{AppState, Connectivity, ViewFilter};
use crate::stats::StatCards;

/// Status dot and text for the API connectivity indicator.
pub fn render_connectivity(connectivity: Connectivity) -> String {
    let (class, text) = match connectivity {
        Connectivity::Online => ("online", "API connected"),
        Connectivity::Offline => ("offline", "API disconnected"),
        Connectivity::Unknown => ("unknown", "Connecting…"),
    };
    format!(r#"<span class="status-dot {class}"></span><span class="api-text">{text}</span>"#)
}

/// The six summary cards.
pub fn render_stat_cards(cards: &StatCards) -> String {
    let items = [
        ("online", "🟢 Online", cards.counts.online),
        ("idle", "🟡 Idle", cards.counts.idle),
        ("dnd", "🔴 Do Not Disturb", cards.counts.dnd),
        ("offline", "⚫ Offline", cards.counts.offline),
        ("servers", "🏢 Servers", cards.servers),
        ("total", "👥 Total users", cards.total_users),
    ];

    let mut html = String::new();
    for (id, label, value) in items {
        let _ = write!(
            html,
            r#"<div class="stat-card {id}"><div class="stat-label">{label}</div><div class="stat-value" id="{id}-count">{value}</div></div>
"#
        );
    }
    html
}

fn render_filter_buttons(active: ViewFilter) -> String {
    let mut html = String::new();
    for filter in ViewFilter::ALL {
        let class = if filter == active {
            "filter-btn active"
        } else {
            "filter-btn"
        };
        let _ = write!(
            html,
            r#"<button class="{class}" data-filter="{}">{}</button>"#,
            filter.as_str(),
            filter.label()
        );
    }
    html
}

/// Everything below the page header, rendered from the current state.
pub fn render_dashboard_body(state: &AppState) -> String {
    let cards = StatCards::compute(&state.users, &state.guilds);
    let last_updated = state
        .last_updated
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        r#"<div class="status-bar">
<div id="api-status">{connectivity}</div>
<div class="last-update">Last update: <span id="last-update">{last_updated}</span></div>
</div>
<section class="stats-grid">
{cards}</section>
<section class="charts-grid">
{charts}</section>
<section class="panel">
<div class="panel-header"><h2>Users</h2><div class="filters">{filters}</div></div>
<table class="users-table">
<thead><tr><th>User</th><th>Status</th><th>Activity</th><th>Server</th><th>Last seen</th></tr></thead>
<tbody id="users-tbody">{rows}</tbody>
</table>
</section>
<section class="panel">
<h2>Servers</h2>
<div class="servers-grid" id="servers-grid">{guilds}</div>
</section>
<section class="panel">
<h2>Roles</h2>
<div class="servers-grid" id="roles-grid">{roles}</div>
</section>
"#,
        connectivity = render_connectivity(state.connectivity),
        cards = render_stat_cards(&cards),
        charts = render_charts(&state.charts),
        filters = render_filter_buttons(state.filter),
        rows = render_user_rows(&state.users, state.filter),
        guilds = render_guild_grid(&state.guilds),
        roles = render_role_cards(&state.users, &state.roles),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::default_roles;
    use crate::model::PresenceStatus;

    #[test]
    fn connectivity_text_per_state() {
        assert!(render_connectivity(Connectivity::Online).contains("status-dot online"));
        assert!(render_connectivity(Connectivity::Offline).contains("API disconnected"));
        assert!(render_connectivity(Connectivity::Unknown).contains("Connecting"));
    }

    #[test]
    fn stat_cards_show_each_value() {
        let mut cards = StatCards::default();
        cards.counts.dnd = 3;
        cards.servers = 2;
        cards.total_users = 7;
        let html = render_stat_cards(&cards);
        assert!(html.contains(r#"id="dnd-count">3<"#));
        assert!(html.contains(r#"id="servers-count">2<"#));
        assert!(html.contains(r#"id="total-count">7<"#));
    }

    #[test]
    fn empty_state_renders_every_placeholder() {
        let state = AppState::new(default_roles());
        let html = render_dashboard_body(&state);
        assert!(html.contains("No users match this filter"));
        assert!(html.contains("No servers"));
        assert!(html.contains("No users with this role"));
        assert!(html.contains(r#"<span id="last-update">-</span>"#));
    }

    #[test]
    fn active_filter_button_is_marked() {
        let mut state = AppState::new(Vec::new());
        state.set_filter(ViewFilter::Only(PresenceStatus::Idle));
        let html = render_dashboard_body(&state);
        assert!(html.contains(r#"<button class="filter-btn active" data-filter="idle">"#));
        assert!(html.contains(r#"<button class="filter-btn" data-filter="all">"#));
    }
}
