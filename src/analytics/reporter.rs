//! Summaries over the tick log, used by `guildwatch health`.

use crate::analytics::logger::TickLogEntry;

/// Aggregate view of a window of ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    pub ticks: usize,
    pub connected: usize,
    pub failed: usize,
    pub avg_duration_ms: u64,
    pub last_error: Option<String>,
    pub last_timestamp: Option<String>,
}

impl TickSummary {
    /// Share of ticks that ended connected, 0.0 when there are none.
    pub fn availability_pct(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            (self.connected as f64 / self.ticks as f64) * 100.0
        }
    }
}

pub fn summarize(entries: &[TickLogEntry]) -> TickSummary {
    if entries.is_empty() {
        return TickSummary::default();
    }

    let total_ms: u64 = entries.iter().map(|e| e.duration_ms).sum();
    TickSummary {
        ticks: entries.len(),
        connected: entries.iter().filter(|e| e.connected).count(),
        failed: entries.iter().filter(|e| e.error.is_some()).count(),
        avg_duration_ms: total_ms / entries.len() as u64,
        last_error: entries.iter().rev().find_map(|e| e.error.clone()),
        last_timestamp: entries.last().map(|e| e.timestamp.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(connected: bool, error: Option<&str>, duration_ms: u64) -> TickLogEntry {
        TickLogEntry {
            timestamp: format!("t{duration_ms}"),
            duration_ms,
            users: None,
            guilds: None,
            connected,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn summarize_counts_outcomes() {
        let entries = vec![
            entry(true, None, 100),
            entry(false, Some("timeout"), 300),
            entry(false, None, 200),
            entry(true, None, 200),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.connected, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.avg_duration_ms, 200);
        assert_eq!(summary.last_error.as_deref(), Some("timeout"));
        assert_eq!(summary.last_timestamp.as_deref(), Some("t200"));
        assert!((summary.availability_pct() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_window_is_zeroed() {
        let summary = summarize(&[]);
        assert_eq!(summary, TickSummary::default());
        assert_eq!(summary.availability_pct(), 0.0);
    }
}
