//! Embedded HTML/CSS/JS shell for the dashboard.
//!
//! The server renders every fragment; the script only swaps them in on a
//! timer and sends filter selections. No external assets, no CDN.

const BODY_SLOT: &str = "{{BODY}}";
const REFRESH_SLOT: &str = "{{REFRESH_MS}}";

/// Full page with the current dashboard body and refresh period filled in.
pub fn render_page(body: &str, refresh_ms: u64) -> String {
    INDEX_HTML
        .replace(REFRESH_SLOT, &refresh_ms.to_string())
        .replace(BODY_SLOT, body)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>guildwatch</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e0e0e0;
  --text-muted: #8b949e;
  --accent: #00d4ff;
  --green: #00e676;
  --yellow: #ffc107;
  --red: #ff5722;
  --grey: #9e9e9e;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 16px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; color: var(--accent); }

/* Status bar */
.status-bar {
  display: flex;
  justify-content: space-between;
  align-items: center;
  margin-bottom: 24px;
  color: var(--text-muted);
}
#api-status { display: flex; align-items: center; gap: 8px; }
.status-dot { width: 10px; height: 10px; border-radius: 50%; background: var(--grey); }
.status-dot.online { background: var(--green); box-shadow: 0 0 8px var(--green); }
.status-dot.offline { background: var(--red); }

/* Stat cards */
.stats-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
  gap: 16px;
  margin-bottom: 24px;
}
.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  text-align: center;
}
.stat-label { font-size: 12px; color: var(--text-muted); text-transform: uppercase; }
.stat-value { font-size: 30px; font-weight: 700; color: var(--accent); }
.stat-card.online .stat-value { color: var(--green); }
.stat-card.idle .stat-value { color: var(--yellow); }
.stat-card.dnd .stat-value { color: var(--red); }
.stat-card.offline .stat-value { color: var(--grey); }

/* Charts */
.charts-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
  gap: 16px;
  margin-bottom: 24px;
}
.chart-card, .panel {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
}
.panel { margin-bottom: 24px; }
h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
.doughnut {
  width: 180px;
  height: 180px;
  border-radius: 50%;
  margin: 0 auto 16px;
  display: flex;
  align-items: center;
  justify-content: center;
}
.doughnut-hole {
  width: 110px;
  height: 110px;
  border-radius: 50%;
  background: var(--surface);
  display: flex;
  align-items: center;
  justify-content: center;
  font-size: 24px;
  font-weight: 700;
}
.legend { list-style: none; display: flex; flex-wrap: wrap; gap: 12px; justify-content: center; }
.swatch { display: inline-block; width: 12px; height: 12px; border-radius: 2px; margin-right: 6px; }
.bar-row { display: flex; align-items: center; gap: 8px; margin-bottom: 8px; }
.bar-label { width: 140px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.bar-track { flex: 1; background: rgba(255,255,255,0.05); border-radius: 4px; height: 18px; }
.bar { height: 100%; background: rgba(0, 212, 255, 0.5); border: 1px solid var(--accent); border-radius: 4px; }
.bar-value { width: 40px; text-align: right; }

/* Users table */
.panel-header { display: flex; justify-content: space-between; align-items: center; }
.filters { display: flex; gap: 4px; }
.filter-btn {
  padding: 6px 12px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  cursor: pointer;
}
.filter-btn.active { background: var(--accent); color: #000; border-color: var(--accent); }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 10px; text-align: left; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; font-size: 12px; text-transform: uppercase; }
.avatar-user { display: flex; align-items: center; gap: 10px; }
.user-avatar, .role-avatar { width: 32px; height: 32px; border-radius: 50%; border: 2px solid var(--accent); }
.status-badge { padding: 2px 10px; border-radius: 12px; font-size: 12px; background: rgba(255,255,255,0.05); }
.status-badge.online { color: var(--green); }
.status-badge.idle { color: var(--yellow); }
.status-badge.dnd { color: var(--red); }
.status-badge.offline { color: var(--grey); }
.muted { color: #666; }
.loading { text-align: center; color: var(--text-muted); padding: 16px; }

/* Server and role cards */
.servers-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
  gap: 16px;
}
.server-card {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  text-align: center;
}
.server-icon { width: 64px; height: 64px; border-radius: 50%; margin: 0 auto 8px; }
.server-icon.placeholder { font-size: 2em; line-height: 64px; }
.server-info { color: var(--text-muted); font-size: 13px; }
.role-members { text-align: left; padding-top: 8px; }
.role-member { display: flex; align-items: center; gap: 10px; margin: 8px 0; }
</style>
</head>
<body>
<div class="app">
<header><h1>guildwatch</h1><span class="subtitle">bot presence dashboard</span></header>
<main id="dashboard">{{BODY}}</main>
</div>
<script>
const REFRESH_MS = {{REFRESH_MS}};
const dashboard = document.getElementById('dashboard');

async function refresh() {
  try {
    const res = await fetch('/fragments/dashboard');
    if (res.ok) dashboard.innerHTML = await res.text();
  } catch (e) {
    console.error('refresh failed', e);
  }
}

dashboard.addEventListener('click', async e => {
  const btn = e.target.closest('.filter-btn');
  if (!btn) return;
  const res = await fetch('/fragments/users?filter=' + encodeURIComponent(btn.dataset.filter));
  if (!res.ok) return;
  document.getElementById('users-tbody').innerHTML = await res.text();
  document.querySelectorAll('.filter-btn').forEach(b => b.classList.toggle('active', b === btn));
});

setInterval(refresh, REFRESH_MS);
</script>
</body>
</html>
"##;
