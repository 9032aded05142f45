use std::fmt::Write;

use super::{escape, format_time, status_badge_text};
use crate::model::UserPresence;
use crate::state::ViewFilter;

const EMPTY_ROW: &str =
    r#"<tr><td colspan="5" class="loading">No users match this filter</td></tr>"#;

/// Table body rows for the users matching `filter`, in snapshot order.
pub fn render_user_rows(users: &[UserPresence], filter: ViewFilter) -> String {
    let selected = filter.select(users);
    if selected.is_empty() {
        return EMPTY_ROW.to_string();
    }

    let mut html = String::new();
    for user in selected {
        render_row(&mut html, user);
    }
    html
}

fn render_row(out: &mut String, user: &UserPresence) {
    let name = escape(&user.username);
    let activities = if user.activities.is_empty() {
        r#"<small class="muted">-</small>"#.to_string()
    } else {
        user.activities
            .iter()
            .map(|a| format!("<small>{}</small>", escape(&a.name)))
            .collect::<Vec<_>>()
            .join("<br>")
    };

    let _ = write!(
        out,
        r#"<tr>
<td><div class="avatar-user"><img src="{avatar}" alt="{name}" class="user-avatar"><strong>{name}</strong></div></td>
<td><span class="status-badge {status}">{badge}</span></td>
<td>{activities}</td>
<td>{guild}</td>
<td><small>{last_seen}</small></td>
</tr>
"#,
        avatar = escape(&user.avatar),
        status = user.status.as_str(),
        badge = status_badge_text(user.status),
        guild = escape(&user.guild),
        last_seen = format_time(&user.last_seen),
    );
}
