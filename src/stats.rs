// 📊 Dashboard aggregates
// Pure functions over the unit list: totals and percentages per status,
// globally and per section (A, B, C).

use crate::entities::{Status, Unit, SECTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,

    /// Rounded to the nearest integer; 0 when the group is empty
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStats {
    pub total: usize,
    pub by_status: Vec<StatusCount>,
}

impl GroupStats {
    pub fn count(&self, status: Status) -> usize {
        self.get(status).map(|s| s.count).unwrap_or(0)
    }

    pub fn percentage(&self, status: Status) -> u32 {
        self.get(status).map(|s| s.percentage).unwrap_or(0)
    }

    fn get(&self, status: Status) -> Option<&StatusCount> {
        self.by_status.iter().find(|s| s.status == status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStats {
    pub section: &'static str,
    pub stats: GroupStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub overall: GroupStats,
    pub sections: Vec<SectionStats>,
}

/// Percentage rounded half-up, 0 for an empty group
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

pub fn group_stats<'a>(units: impl IntoIterator<Item = &'a Unit>) -> GroupStats {
    let mut counts = [0usize; 3];
    let mut total = 0;

    for unit in units {
        total += 1;
        if let Some(i) = Status::ALL.iter().position(|s| *s == unit.status) {
            counts[i] += 1;
        }
    }

    GroupStats {
        total,
        by_status: Status::ALL
            .iter()
            .zip(counts)
            .map(|(status, count)| StatusCount {
                status: *status,
                count,
                percentage: percentage(count, total),
            })
            .collect(),
    }
}

/// Everything the dashboard shows. Units outside A/B/C only count overall.
pub fn dashboard(units: &[Unit]) -> DashboardStats {
    DashboardStats {
        overall: group_stats(units),
        sections: SECTIONS
            .iter()
            .map(|&section| SectionStats {
                section,
                stats: group_stats(units.iter().filter(|u| u.section == section)),
            })
            .collect(),
    }
}
