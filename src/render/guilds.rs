use std::fmt::Write;

use super::escape;
use crate::model::Guild;

const EMPTY_GRID: &str = r#"<div class="loading">No servers</div>"#;

/// One card per guild.
pub fn render_guild_grid(guilds: &[Guild]) -> String {
    if guilds.is_empty() {
        return EMPTY_GRID.to_string();
    }

    let mut html = String::new();
    for guild in guilds {
        let name = escape(&guild.name);
        let icon = match guild.icon.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => format!(
                r#"<img src="{}" alt="{name}" class="server-icon">"#,
                escape(url)
            ),
            None => r#"<div class="server-icon placeholder">🏢</div>"#.to_string(),
        };

        let _ = write!(
            html,
            r#"<div class="server-card">
{icon}
<h3>{name}</h3>
<div class="server-info">👥 {members} members</div>
<div class="server-info">#️⃣ {channels} channels</div>
<div class="server-info">🏷️ {roles} roles</div>
</div>
"#,
            members = guild.member_count,
            channels = guild.channels,
            roles = guild.roles,
        );
    }
    html
}
