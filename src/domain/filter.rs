//! List filtering and dashboard statistics.
//!
//! Both operate on records already loaded from the store.

use chrono::NaiveDate;
use serde::Serialize;

use super::models::{Application, ApplicationStatus};

/// Criteria for narrowing a list of applications. Empty criteria match all.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Case-insensitive substring of company name or job title.
    pub search: String,
    pub status: Option<ApplicationStatus>,
    /// Earliest application date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest application date, inclusive.
    pub date_to: Option<NaiveDate>,
}

impl FilterOptions {
    /// Whether any criterion is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
            || self.status.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
    }

    /// Whether a single application satisfies every criterion.
    #[must_use]
    pub fn matches(&self, app: &Application) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty()
            && !app.company_name.to_lowercase().contains(&search)
            && !app.job_title.to_lowercase().contains(&search)
        {
            return false;
        }

        if self.status.is_some_and(|status| app.status != status) {
            return false;
        }

        let date = app.application_date.date_naive();
        if self.date_from.is_some_and(|from| date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| date > to) {
            return false;
        }

        true
    }

    /// Keep the matching applications, preserving order.
    #[must_use]
    pub fn apply(&self, applications: Vec<Application>) -> Vec<Application> {
        applications.into_iter().filter(|a| self.matches(a)).collect()
    }
}

/// Counts per status for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub applied: usize,
    pub interview: usize,
    pub offer: usize,
    pub rejected: usize,
    pub withdrawn: usize,
}

impl Stats {
    #[must_use]
    pub fn from_applications(applications: &[Application]) -> Self {
        applications.iter().fold(
            Self {
                total: applications.len(),
                ..Self::default()
            },
            |mut stats, app| {
                match app.status {
                    ApplicationStatus::Applied => stats.applied += 1,
                    ApplicationStatus::Interview => stats.interview += 1,
                    ApplicationStatus::Offer => stats.offer += 1,
                    ApplicationStatus::Rejected => stats.rejected += 1,
                    ApplicationStatus::Withdrawn => stats.withdrawn += 1,
                }
                stats
            },
        )
    }

    /// Count for one status.
    #[must_use]
    pub const fn count(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::Applied => self.applied,
            ApplicationStatus::Interview => self.interview,
            ApplicationStatus::Offer => self.offer,
            ApplicationStatus::Rejected => self.rejected,
            ApplicationStatus::Withdrawn => self.withdrawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NewApplication;
    use chrono::{TimeZone, Utc};

    fn app(company: &str, title: &str, day: u32, status: ApplicationStatus) -> Application {
        let date = Utc.with_ymd_and_hms(2024, 3, day, 15, 30, 0).unwrap();
        let mut input = NewApplication::new(company, title, date);
        input.status = status;
        input
            .into_application(format!("{company}-{day}"), date)
            .unwrap()
    }

    fn sample() -> Vec<Application> {
        vec![
            app("Acme", "Backend Engineer", 1, ApplicationStatus::Applied),
            app("Globex", "Data Scientist", 10, ApplicationStatus::Interview),
            app("Initech", "Engineer", 20, ApplicationStatus::Rejected),
        ]
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = FilterOptions::default();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(sample()).len(), 3);
    }

    #[test]
    fn test_any_criterion_activates_filter() {
        let blank_search = FilterOptions {
            search: "   ".into(),
            ..FilterOptions::default()
        };
        assert!(!blank_search.is_active());

        let by_status = FilterOptions {
            status: Some(ApplicationStatus::Offer),
            ..FilterOptions::default()
        };
        let by_date = FilterOptions {
            date_to: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..FilterOptions::default()
        };
        assert!(by_status.is_active());
        assert!(by_date.is_active());
    }

    #[test]
    fn test_search_is_case_insensitive_on_company_and_title() {
        let filter = FilterOptions {
            search: "ENGINEER".into(),
            ..FilterOptions::default()
        };
        let names: Vec<_> = filter
            .apply(sample())
            .into_iter()
            .map(|a| a.company_name)
            .collect();
        assert_eq!(names, vec!["Acme", "Initech"]);

        let filter = FilterOptions {
            search: "glob".into(),
            ..FilterOptions::default()
        };
        assert_eq!(filter.apply(sample()).len(), 1);
    }

    #[test]
    fn test_status_filter() {
        let filter = FilterOptions {
            status: Some(ApplicationStatus::Interview),
            ..FilterOptions::default()
        };
        let result = filter.apply(sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].company_name, "Globex");
    }

    #[test]
    fn test_date_range_is_inclusive_by_day() {
        let filter = FilterOptions {
            date_from: NaiveDate::from_ymd_opt(2024, 3, 10),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 20),
            ..FilterOptions::default()
        };
        let names: Vec<_> = filter
            .apply(sample())
            .into_iter()
            .map(|a| a.company_name)
            .collect();
        assert_eq!(names, vec!["Globex", "Initech"]);
    }

    #[test]
    fn test_stats_counts_each_status() {
        let stats = Stats::from_applications(&sample());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.interview, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.offer, 0);
        assert_eq!(stats.count(ApplicationStatus::Withdrawn), 0);
    }
}
