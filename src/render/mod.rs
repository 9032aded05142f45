//! HTML renderers for the dashboard.
//!
//! Every renderer is a pure function of the snapshot it is given and returns
//! a markup fragment. Empty inputs render an explicit placeholder rather
//! than an empty container.

mod charts;
mod guilds;
mod page;
mod roles;
mod users;

use chrono::{DateTime, Local, Utc};

use crate::model::PresenceStatus;

pub use charts::{render_bar_chart, render_charts, render_doughnut_chart};
pub use guilds::render_guild_grid;
pub use page::{render_connectivity, render_dashboard_body, render_stat_cards};
pub use roles::render_role_cards;
pub use users::render_user_rows;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Emoji and label for a status, e.g. `🟢 Online`.
pub fn status_badge_text(status: PresenceStatus) -> String {
    format!("{} {}", status.emoji(), status.label())
}

/// Last-seen time in local `HH:MM:SS`.
pub fn format_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
