use std::fmt::Write;

use super::{escape, status_badge_text};
use crate::config::schema::RoleEntry;
use crate::model::UserPresence;

/// One card per configured role, listing the users that hold it.
pub fn render_role_cards(users: &[UserPresence], roles: &[RoleEntry]) -> String {
    let mut html = String::new();
    for role in roles {
        let members: Vec<&UserPresence> = users.iter().filter(|u| u.has_role(&role.id)).collect();
        let label = escape(&role.label);

        if members.is_empty() {
            let _ = write!(
                html,
                r#"<div class="server-card role-card">
<h3>{label}</h3>
<div class="loading">No users with this role</div>
</div>
"#
            );
            continue;
        }

        let mut list = String::new();
        for user in members {
            let name = escape(&user.username);
            let _ = write!(
                list,
                r#"<div class="role-member"><img src="{avatar}" alt="{name}" class="role-avatar"><div><strong>{name}</strong><br><small class="muted">{badge}</small></div></div>
"#,
                avatar = escape(&user.avatar),
                badge = status_badge_text(user.status),
            );
        }

        let _ = write!(
            html,
            r#"<div class="server-card role-card">
<h3>{label}</h3>
<div class="role-members">{list}</div>
</div>
"#
        );
    }
    html
}
