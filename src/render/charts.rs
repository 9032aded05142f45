use std::fmt::Write;

use super::escape;
use crate::stats::{ChartWidget, Charts};

/// Segment colours of the status doughnut, in `PresenceStatus::ALL` order.
const STATUS_COLORS: [&str; 4] = ["#00e676", "#ffc107", "#ff5722", "#9e9e9e"];
const EMPTY_RING: &str = "#2a2f3a";

/// Both charts side by side.
pub fn render_charts(charts: &Charts) -> String {
    format!(
        r#"<div class="chart-card">{}</div>
<div class="chart-card">{}</div>
"#,
        render_doughnut_chart(&charts.status),
        render_bar_chart(&charts.guilds)
    )
}

/// Proportion chart drawn with a CSS conic gradient, plus a legend.
pub fn render_doughnut_chart(chart: &ChartWidget) -> String {
    let total = chart.total();
    let gradient = if total == 0 {
        EMPTY_RING.to_string()
    } else {
        let mut stops = Vec::new();
        let mut start = 0.0_f64;
        for (i, (_, value)) in chart.points().enumerate() {
            let end = start + value as f64 * 100.0 / total as f64;
            stops.push(format!(
                "{} {start:.2}% {end:.2}%",
                STATUS_COLORS[i % STATUS_COLORS.len()]
            ));
            start = end;
        }
        format!("conic-gradient({})", stops.join(", "))
    };

    let mut legend = String::new();
    for (i, (label, value)) in chart.points().enumerate() {
        let _ = write!(
            legend,
            r#"<li><span class="swatch" style="background:{}"></span>{} <strong>{value}</strong></li>"#,
            STATUS_COLORS[i % STATUS_COLORS.len()],
            escape(label)
        );
    }

    format!(
        r#"<h2>{title}</h2>
<div class="doughnut" style="background:{gradient}"><div class="doughnut-hole">{total}</div></div>
<ul class="legend">{legend}</ul>"#,
        title = escape(&chart.title),
    )
}

/// Horizontal bar chart, bars scaled to the largest value.
pub fn render_bar_chart(chart: &ChartWidget) -> String {
    let title = escape(&chart.title);
    if chart.data.is_empty() {
        return format!(r#"<h2>{title}</h2><div class="loading">No data</div>"#);
    }

    let max = chart.max().max(1);
    let mut bars = String::new();
    for (label, value) in chart.points() {
        let width = value as f64 * 100.0 / max as f64;
        let _ = write!(
            bars,
            r#"<div class="bar-row"><span class="bar-label">{}</span><div class="bar-track"><div class="bar" style="width:{width:.1}%"></div></div><span class="bar-value">{value}</span></div>
"#,
            escape(label)
        );
    }

    format!(r#"<h2>{title}</h2><div class="bar-chart">{bars}</div>"#)
}
