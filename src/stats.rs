//! Aggregates derived from the user snapshot and the two chart widgets they
//! feed.
//!
//! Nothing here keeps history: every update recomputes from the current
//! snapshot and overwrites the previous values.

use serde::Serialize;

use crate::model::{Guild, PresenceStatus, UserPresence};

// ---------------------------------------------------------------------------
// Per-status counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub online: usize,
    pub idle: usize,
    pub dnd: usize,
    pub offline: usize,
}

impl StatusCounts {
    pub fn from_users(users: &[UserPresence]) -> Self {
        let mut counts = Self::default();
        for user in users {
            *counts.slot_mut(user.status) += 1;
        }
        counts
    }

    pub fn get(&self, status: PresenceStatus) -> usize {
        match status {
            PresenceStatus::Online => self.online,
            PresenceStatus::Idle => self.idle,
            PresenceStatus::Dnd => self.dnd,
            PresenceStatus::Offline => self.offline,
        }
    }

    fn slot_mut(&mut self, status: PresenceStatus) -> &mut usize {
        match status {
            PresenceStatus::Online => &mut self.online,
            PresenceStatus::Idle => &mut self.idle,
            PresenceStatus::Dnd => &mut self.dnd,
            PresenceStatus::Offline => &mut self.offline,
        }
    }

    pub fn total(&self) -> usize {
        self.online + self.idle + self.dnd + self.offline
    }

    /// Counts in [`PresenceStatus::ALL`] order.
    pub fn as_array(&self) -> [usize; 4] {
        PresenceStatus::ALL.map(|s| self.get(s))
    }
}

// ---------------------------------------------------------------------------
// Per-guild counts
// ---------------------------------------------------------------------------

/// Number of users seen in each guild, keyed by guild display name.
///
/// Entries appear in the order each name is first seen. Two guilds sharing a
/// display name are counted together.
pub fn guild_counts(users: &[UserPresence]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for user in users {
        match counts.iter_mut().find(|(name, _)| *name == user.guild) {
            Some((_, count)) => *count += 1,
            None => counts.push((user.guild.clone(), 1)),
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Summary cards
// ---------------------------------------------------------------------------

/// Numbers shown in the header cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatCards {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub total_users: usize,
    pub servers: usize,
}

impl StatCards {
    pub fn compute(users: &[UserPresence], guilds: &[Guild]) -> Self {
        Self {
            counts: StatusCounts::from_users(users),
            total_users: users.len(),
            servers: guilds.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart widgets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    /// Share of a whole (status distribution).
    Doughnut,
    /// One bar per label (users per guild).
    HorizontalBar,
}

/// A labelled data series displayed as a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartWidget {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub data: Vec<usize>,
}

impl ChartWidget {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            labels: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Replace the series. Labels and data are paired by position.
    pub fn update(&mut self, labels: Vec<String>, data: Vec<usize>) {
        debug_assert_eq!(labels.len(), data.len());
        self.labels = labels;
        self.data = data;
    }

    pub fn total(&self) -> usize {
        self.data.iter().sum()
    }

    pub fn max(&self) -> usize {
        self.data.iter().copied().max().unwrap_or(0)
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(String::as_str).zip(self.data.iter().copied())
    }
}

/// The two dashboard charts, constructed once and updated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub status: ChartWidget,
    pub guilds: ChartWidget,
}

impl Charts {
    pub fn new() -> Self {
        let mut status = ChartWidget::new(ChartKind::Doughnut, "Status distribution");
        status.update(status_labels(), vec![0; PresenceStatus::ALL.len()]);
        Self {
            status,
            guilds: ChartWidget::new(ChartKind::HorizontalBar, "Users per server"),
        }
    }

    /// Push the current snapshot's aggregates into both charts.
    pub fn update(&mut self, users: &[UserPresence]) {
        let counts = StatusCounts::from_users(users);
        self.status
            .update(status_labels(), counts.as_array().to_vec());

        let (labels, data): (Vec<String>, Vec<usize>) = guild_counts(users).into_iter().unzip();
        self.guilds.update(labels, data);
    }
}

impl Default for Charts {
    fn default() -> Self {
        Self::new()
    }
}

fn status_labels() -> Vec<String> {
    PresenceStatus::ALL
        .iter()
        .map(|s| s.label().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(status: PresenceStatus, guild: &str) -> UserPresence {
        UserPresence {
            id: "1".to_string(),
            username: "u".to_string(),
            avatar: String::new(),
            status,
            activities: Vec::new(),
            guild: guild.to_string(),
            last_seen: Utc::now(),
            role_ids: Vec::new(),
        }
    }

    #[test]
    fn status_counts_example() {
        let users = vec![
            user(PresenceStatus::Online, "a"),
            user(PresenceStatus::Online, "a"),
            user(PresenceStatus::Dnd, "b"),
        ];
        let counts = StatusCounts::from_users(&users);
        assert_eq!(
            counts,
            StatusCounts {
                online: 2,
                idle: 0,
                dnd: 1,
                offline: 0
            }
        );
        assert_eq!(counts.total(), users.len());
        assert_eq!(counts.as_array(), [2, 0, 1, 0]);
    }

    #[test]
    fn guild_counts_keep_first_seen_order_and_sum_to_total() {
        let users = vec![
            user(PresenceStatus::Idle, "Zeta"),
            user(PresenceStatus::Online, "Alpha"),
            user(PresenceStatus::Offline, "Zeta"),
            user(PresenceStatus::Online, "Mid"),
        ];
        let counts = guild_counts(&users);
        assert_eq!(
            counts,
            vec![
                ("Zeta".to_string(), 2),
                ("Alpha".to_string(), 1),
                ("Mid".to_string(), 1)
            ]
        );
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), users.len());
    }

    #[test]
    fn empty_snapshot_yields_zeroes() {
        assert_eq!(StatusCounts::from_users(&[]).total(), 0);
        assert!(guild_counts(&[]).is_empty());
    }

    #[test]
    fn chart_update_overwrites_previous_series() {
        let mut charts = Charts::new();
        assert_eq!(charts.status.data, vec![0, 0, 0, 0]);
        assert_eq!(charts.status.labels[2], "Do Not Disturb");

        charts.update(&[
            user(PresenceStatus::Online, "a"),
            user(PresenceStatus::Idle, "b"),
        ]);
        assert_eq!(charts.guilds.labels, vec!["a", "b"]);

        charts.update(&[user(PresenceStatus::Offline, "c")]);
        assert_eq!(charts.status.data, vec![0, 0, 0, 1]);
        assert_eq!(charts.guilds.labels, vec!["c"]);
        assert_eq!(charts.guilds.data, vec![1]);
        assert_eq!(charts.guilds.total(), 1);
    }

    #[test]
    fn stat_cards_count_servers_from_guild_snapshot() {
        let guild = Guild {
            name: "g".to_string(),
            icon: None,
            member_count: 10,
            channels: 2,
            roles: 3,
        };
        let cards = StatCards::compute(&[user(PresenceStatus::Online, "g")], &[guild]);
        assert_eq!(cards.total_users, 1);
        assert_eq!(cards.servers, 1);
        assert_eq!(cards.counts.online, 1);
    }
}
