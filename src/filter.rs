// 🔎 Unit list filters
// Four independent equality predicates, AND-ed. Empty = no constraint.

use crate::entities::{Status, Unit};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub section: String,
    pub status: Option<Status>,
    pub typology: String,
    pub company: String,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.section.is_empty()
            && self.status.is_none()
            && self.typology.is_empty()
            && self.company.is_empty()
    }

    /// Exact, case-sensitive match on every non-empty field
    pub fn matches(&self, unit: &Unit) -> bool {
        (self.section.is_empty() || unit.section == self.section)
            && self.status.map_or(true, |s| unit.status == s)
            && (self.typology.is_empty() || unit.typology == self.typology)
            && (self.company.is_empty() || unit.company == self.company)
    }

    pub fn clear(&mut self) {
        *self = FilterState::default();
    }
}

/// Units matching the filter, in store order
pub fn apply<'a>(units: &'a [Unit], filter: &FilterState) -> Vec<&'a Unit> {
    units.iter().filter(|u| filter.matches(u)).collect()
}

/// Advance a text filter through `options`, wrapping back to "" (all)
pub fn cycle_option(current: &str, options: &[&str]) -> String {
    match options.iter().position(|o| *o == current) {
        Some(i) if i + 1 < options.len() => options[i + 1].to_string(),
        Some(_) => String::new(),
        None if current.is_empty() => options.first().map(|o| o.to_string()).unwrap_or_default(),
        None => String::new(),
    }
}

/// Advance the status filter: all → Libre → Bloqueada → Reservada → all
pub fn cycle_status(current: Option<Status>) -> Option<Status> {
    match current {
        None => Some(Status::ALL[0]),
        Some(s) => {
            let i = Status::ALL.iter().position(|x| *x == s).unwrap_or(0);
            Status::ALL.get(i + 1).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn unit(section: &str, typology: &str, status: Status, company: &str) -> Unit {
        let mut u = Unit::new(section, "1", "A", Utc::now());
        u.typology = typology.to_string();
        u.status = status;
        u.company = company.to_string();
        u
    }

    fn sample() -> Vec<Unit> {
        vec![
            unit("A", "2D", Status::Free, ""),
            unit("A", "3D", Status::Reserved, "VALLENOVA"),
            unit("B", "2D", Status::Blocked, "PROMOTOR"),
            unit("C", "1D", Status::Reserved, "PROMOTOR"),
            unit("A", "2D", Status::Reserved, "PROMOTOR"),
        ]
    }

    #[test]
    fn test_empty_filter_returns_everything_in_order() {
        let units = sample();
        let result = apply(&units, &FilterState::default());

        assert_eq!(result.len(), units.len());
        for (a, b) in result.iter().zip(units.iter()) {
            assert_eq!(a.id, b.id);
        }
    }

    #[test]
    fn test_filters_are_anded() {
        let units = sample();
        let filter = FilterState {
            section: "A".to_string(),
            status: Some(Status::Reserved),
            typology: String::new(),
            company: "PROMOTOR".to_string(),
        };

        let result = apply(&units, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, units[4].id);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let units = sample();
        let filter = FilterState {
            typology: "2d".to_string(),
            ..Default::default()
        };

        assert!(apply(&units, &filter).is_empty());
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let units = sample();
        let filter = FilterState {
            typology: "2D".to_string(),
            ..Default::default()
        };

        let once: Vec<Unit> = apply(&units, &filter).into_iter().cloned().collect();
        let twice: Vec<Unit> = apply(&once, &filter).into_iter().cloned().collect();

        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_cycle_option() {
        let options = ["A", "B", "C"];
        assert_eq!(cycle_option("", &options), "A");
        assert_eq!(cycle_option("A", &options), "B");
        assert_eq!(cycle_option("C", &options), "");
        assert_eq!(cycle_option("Z", &options), "");
    }

    #[test]
    fn test_cycle_status() {
        let mut s = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            s = cycle_status(s);
            seen.push(s);
        }
        assert_eq!(
            seen,
            vec![Some(Status::Free), Some(Status::Blocked), Some(Status::Reserved), None]
        );
    }

    #[test]
    fn test_clear() {
        let mut filter = FilterState {
            section: "B".to_string(),
            ..Default::default()
        };
        assert!(!filter.is_empty());
        filter.clear();
        assert!(filter.is_empty());
    }
}
