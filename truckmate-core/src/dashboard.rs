//! Admin dashboard pipeline: filter, sort and bucket assessment records.
//!
//! Everything here is pure. The displayed list is always recomputed from the
//! fetched feed and the current [`DashboardQuery`]; records are never mutated.
//!
//! A record without a priority score is bucketed as [`PriorityCategory::Low`]
//! and sorts below every scored record.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::types::{AssessmentRecord, DashboardFeed, UrgencyLevel};

/// Scores below this are low priority.
pub const MEDIUM_PRIORITY_THRESHOLD: f64 = 3.0;
/// Scores at or above this are high priority.
pub const HIGH_PRIORITY_THRESHOLD: f64 = 7.0;

/// Priority bucket derived from a record's priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityCategory {
    Low,
    Medium,
    High,
}

impl PriorityCategory {
    pub const ALL: [PriorityCategory; 3] = [
        PriorityCategory::Low,
        PriorityCategory::Medium,
        PriorityCategory::High,
    ];

    /// Bucket a priority score. Total over every `f64`; NaN and absent are Low.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s >= HIGH_PRIORITY_THRESHOLD => PriorityCategory::High,
            Some(s) if s >= MEDIUM_PRIORITY_THRESHOLD => PriorityCategory::Medium,
            _ => PriorityCategory::Low,
        }
    }

    pub fn of(record: &AssessmentRecord) -> Self {
        Self::from_score(record.priority_score)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityCategory::Low => "low",
            PriorityCategory::Medium => "medium",
            PriorityCategory::High => "high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PriorityCategory::Low => "Low",
            PriorityCategory::Medium => "Medium",
            PriorityCategory::High => "High",
        }
    }
}

impl fmt::Display for PriorityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(PriorityCategory::Low),
            "medium" => Ok(PriorityCategory::Medium),
            "high" => Ok(PriorityCategory::High),
            other => Err(format!("unknown priority: {other} (expected low, medium, high)")),
        }
    }
}

/// Recency window for the date filter. Wall-clock, not calendar-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    #[default]
    All,
    /// Within 7 x 24h of now
    Week,
    /// Within 30 x 24h of now
    Month,
}

impl DateWindow {
    pub fn span(&self) -> Option<Duration> {
        match self {
            DateWindow::All => None,
            DateWindow::Week => Some(Duration::days(7)),
            DateWindow::Month => Some(Duration::days(30)),
        }
    }

    /// True if `date` is no further than the window's span before `now`.
    /// Future dates always pass.
    pub fn contains(&self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.span() {
            None => true,
            Some(span) => now.signed_duration_since(date) <= span,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateWindow::All => "All Dates",
            DateWindow::Week => "Last Week",
            DateWindow::Month => "Last Month",
        }
    }
}

impl FromStr for DateWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DateWindow::All),
            "week" => Ok(DateWindow::Week),
            "month" => Ok(DateWindow::Month),
            other => Err(format!("unknown date window: {other} (expected all, week, month)")),
        }
    }
}

/// Column the table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Priority,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Date => "Sort by Date",
            SortKey::Priority => "Sort by Priority",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "priority" => Ok(SortKey::Priority),
            other => Err(format!("unknown sort key: {other} (expected date, priority)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

/// Parse `"all"` as `None`, anything else with `T::from_str`.
pub fn parse_filter<T: FromStr<Err = String>>(s: &str) -> Result<Option<T>, String> {
    if s.trim().eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// Filter and sort controls. `None` filters mean "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardQuery {
    pub priority: Option<PriorityCategory>,
    pub urgency: Option<UrgencyLevel>,
    pub window: DateWindow,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl DashboardQuery {
    /// True if the record passes every active filter.
    pub fn matches(&self, record: &AssessmentRecord, now: DateTime<Utc>) -> bool {
        if let Some(priority) = self.priority {
            if PriorityCategory::of(record) != priority {
                return false;
            }
        }
        if let Some(urgency) = self.urgency {
            if record.urgency_level != Some(urgency) {
                return false;
            }
        }
        self.window.contains(record.assessment_date, now)
    }

    fn compare(&self, a: &AssessmentRecord, b: &AssessmentRecord) -> Ordering {
        let ordering = match self.sort_by {
            SortKey::Date => a.assessment_date.cmp(&b.assessment_date),
            SortKey::Priority => compare_scores(a.priority_score, b.priority_score),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// all -> low -> medium -> high -> all
    pub fn cycle_priority(&mut self) {
        self.priority = match self.priority {
            None => Some(PriorityCategory::Low),
            Some(PriorityCategory::Low) => Some(PriorityCategory::Medium),
            Some(PriorityCategory::Medium) => Some(PriorityCategory::High),
            Some(PriorityCategory::High) => None,
        };
    }

    /// all -> low -> medium -> high -> all
    pub fn cycle_urgency(&mut self) {
        self.urgency = match self.urgency {
            None => Some(UrgencyLevel::Low),
            Some(UrgencyLevel::Low) => Some(UrgencyLevel::Medium),
            Some(UrgencyLevel::Medium) => Some(UrgencyLevel::High),
            Some(UrgencyLevel::High) => None,
        };
    }

    /// all -> week -> month -> all
    pub fn cycle_window(&mut self) {
        self.window = match self.window {
            DateWindow::All => DateWindow::Week,
            DateWindow::Week => DateWindow::Month,
            DateWindow::Month => DateWindow::All,
        };
    }

    pub fn toggle_sort_key(&mut self) {
        self.sort_by = match self.sort_by {
            SortKey::Date => SortKey::Priority,
            SortKey::Priority => SortKey::Date,
        };
    }

    pub fn toggle_order(&mut self) {
        self.order = self.order.toggled();
    }

    pub fn priority_label(&self) -> String {
        match self.priority {
            None => "All Priorities".to_string(),
            Some(p) => format!("{} Priority", p.display_name()),
        }
    }

    pub fn urgency_label(&self) -> String {
        match self.urgency {
            None => "All Urgencies".to_string(),
            Some(u) => format!("{} Urgency", u.display_name()),
        }
    }
}

/// Absent scores order below every present score; NaN compares equal.
fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter then stable-sort `records` under `query`.
pub fn apply<'a>(
    records: &'a [AssessmentRecord],
    query: &DashboardQuery,
    now: DateTime<Utc>,
) -> Vec<&'a AssessmentRecord> {
    let mut rows: Vec<&AssessmentRecord> =
        records.iter().filter(|r| query.matches(r, now)).collect();
    rows.sort_by(|a, b| query.compare(a, b));
    rows
}

/// Per-bucket record counts for the priority chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl BucketCounts {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AssessmentRecord>,
    {
        let mut counts = BucketCounts::default();
        for record in records {
            match PriorityCategory::of(record) {
                PriorityCategory::Low => counts.low += 1,
                PriorityCategory::Medium => counts.medium += 1,
                PriorityCategory::High => counts.high += 1,
            }
        }
        counts
    }

    pub fn get(&self, category: PriorityCategory) -> u64 {
        match category {
            PriorityCategory::Low => self.low,
            PriorityCategory::Medium => self.medium,
            PriorityCategory::High => self.high,
        }
    }

    pub fn total(&self) -> u64 {
        self.low + self.medium + self.high
    }
}

/// Everything the admin screen renders for one (feed, query) pair.
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub rows: Vec<&'a AssessmentRecord>,
    pub counts: BucketCounts,
    pub total_assessments: i64,
    pub high_priority_assessments: i64,
}

impl<'a> DashboardView<'a> {
    pub fn compute(feed: &'a DashboardFeed, query: &DashboardQuery, now: DateTime<Utc>) -> Self {
        let rows = apply(&feed.assessments, query, now);
        let counts = BucketCounts::from_records(rows.iter().copied());
        Self {
            rows,
            counts,
            total_assessments: feed.total_assessments,
            high_priority_assessments: feed.high_priority_assessments,
        }
    }
}
