//! Listing filter, sort-key, and dashboard-bucket types.
//!
//! Raw query parameters are parsed here exactly once; everything past this
//! boundary works with typed values. Unparseable status or date inputs are
//! silently dropped, and an unknown sort key falls back to creation time
//! descending.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use ticketdesk_core::types::SortDirection;

use super::status::TicketStatus;

/// Optional listing filters, combined with logical AND.
///
/// Text filters are case-insensitive substring matches; status and
/// creation date are exact (date comparison ignores time of day).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFilter {
    pub reference_number: Option<String>,
    pub title: Option<String>,
    /// Target department display name.
    pub department_name: Option<String>,
    /// Sender department display name.
    pub from_department_name: Option<String>,
    /// Creator username.
    pub created_by: Option<String>,
    /// Assignee username.
    pub assigned_to: Option<String>,
    pub status: Option<TicketStatus>,
    pub created_on: Option<NaiveDate>,
}

impl TicketFilter {
    /// Build a filter from raw optional query-parameter strings.
    ///
    /// Blank strings are treated as absent, values are trimmed, and
    /// unparseable status/date inputs are ignored rather than rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn from_params(
        reference_number: Option<&str>,
        title: Option<&str>,
        department_name: Option<&str>,
        from_department_name: Option<&str>,
        created_by: Option<&str>,
        assigned_to: Option<&str>,
        status: Option<&str>,
        created_at: Option<&str>,
    ) -> Self {
        Self {
            reference_number: non_blank(reference_number),
            title: non_blank(title),
            department_name: non_blank(department_name),
            from_department_name: non_blank(from_department_name),
            created_by: non_blank(created_by),
            assigned_to: non_blank(assigned_to),
            status: status.and_then(|s| TicketStatus::from_str(s.trim()).ok()),
            created_on: created_at.and_then(|s| s.trim().parse::<NaiveDate>().ok()),
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The whitelist of sortable listing columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketSortKey {
    ReferenceNumber,
    Title,
    Department,
    FromDepartment,
    CreatedBy,
    AssignedTo,
    Status,
    CreatedAt,
}

impl TicketSortKey {
    /// Parse a sort key from its query-parameter form. Unknown or absent
    /// keys return `None`; callers fall back to [`TicketSort::default`].
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ticketnumber" | "reference_number" => Some(Self::ReferenceNumber),
            "title" => Some(Self::Title),
            "department" => Some(Self::Department),
            "fromdepartment" | "from_department" => Some(Self::FromDepartment),
            "createdby" | "created_by" => Some(Self::CreatedBy),
            "assignedto" | "assigned_to" => Some(Self::AssignedTo),
            "status" => Some(Self::Status),
            "createdat" | "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/// A resolved sort specification: whitelisted key plus direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TicketSort {
    pub key: TicketSortKey,
    pub direction: SortDirection,
}

impl Default for TicketSort {
    /// Listings fall back to newest-first.
    fn default() -> Self {
        Self {
            key: TicketSortKey::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TicketSort {
    /// Resolve raw `sort`/`dir` parameters, applying the default fallback
    /// for unknown or absent keys.
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Self {
        match sort.and_then(TicketSortKey::parse) {
            Some(key) => Self {
                key,
                direction: SortDirection::parse(dir),
            },
            None => Self::default(),
        }
    }
}

/// Dashboard narrowing bucket. `InProgress` merges `AssignedToDepartment`
/// and `InProgress`, which end users always see as one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    New,
    InProgress,
    Closed,
}

impl StatusBucket {
    /// Whether a ticket status falls inside this bucket.
    pub fn contains(self, status: TicketStatus) -> bool {
        match self {
            Self::New => status == TicketStatus::New,
            Self::InProgress => matches!(
                status,
                TicketStatus::AssignedToDepartment | TicketStatus::InProgress
            ),
            Self::Closed => status == TicketStatus::Closed,
        }
    }

    /// Parse a bucket from its query-parameter form; unknown input means
    /// no narrowing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().replace('_', "").as_str() {
            "new" => Some(Self::New),
            "inprogress" => Some(Self::InProgress),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_whitespace_filters_are_absent() {
        let f = TicketFilter::from_params(
            Some("  "),
            Some(" printer broken "),
            None,
            Some(""),
            None,
            None,
            None,
            None,
        );
        assert_eq!(f.reference_number, None);
        assert_eq!(f.title.as_deref(), Some("printer broken"));
        assert_eq!(f.from_department_name, None);
    }

    #[test]
    fn test_unparseable_status_is_silently_ignored() {
        let f = TicketFilter::from_params(
            None,
            None,
            None,
            None,
            None,
            None,
            Some("definitely-not-a-status"),
            None,
        );
        assert_eq!(f.status, None);

        let f = TicketFilter::from_params(None, None, None, None, None, None, Some("Closed"), None);
        assert_eq!(f.status, Some(TicketStatus::Closed));
    }

    #[test]
    fn test_unparseable_date_is_silently_ignored() {
        let f =
            TicketFilter::from_params(None, None, None, None, None, None, None, Some("yesterday"));
        assert_eq!(f.created_on, None);

        let f =
            TicketFilter::from_params(None, None, None, None, None, None, None, Some("2025-06-01"));
        assert_eq!(
            f.created_on,
            Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        );
    }

    #[test]
    fn test_sort_key_whitelist() {
        assert_eq!(
            TicketSortKey::parse("ticketNumber"),
            Some(TicketSortKey::ReferenceNumber)
        );
        assert_eq!(
            TicketSortKey::parse("fromdepartment"),
            Some(TicketSortKey::FromDepartment)
        );
        assert_eq!(TicketSortKey::parse("DROP TABLE tickets"), None);
    }

    #[test]
    fn test_unknown_sort_falls_back_to_created_desc() {
        let sort = TicketSort::from_params(Some("bogus"), Some("asc"));
        assert_eq!(sort.key, TicketSortKey::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort = TicketSort::from_params(None, None);
        assert_eq!(sort.key, TicketSortKey::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_explicit_sort_uses_given_direction() {
        let sort = TicketSort::from_params(Some("title"), Some("desc"));
        assert_eq!(sort.key, TicketSortKey::Title);
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort = TicketSort::from_params(Some("status"), None);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_in_progress_bucket_merges_two_statuses() {
        let bucket = StatusBucket::InProgress;
        assert!(bucket.contains(TicketStatus::AssignedToDepartment));
        assert!(bucket.contains(TicketStatus::InProgress));
        assert!(!bucket.contains(TicketStatus::New));
        assert!(!bucket.contains(TicketStatus::Closed));
    }

    #[test]
    fn test_bucket_parse() {
        assert_eq!(StatusBucket::parse("in_progress"), Some(StatusBucket::InProgress));
        assert_eq!(StatusBucket::parse("InProgress"), Some(StatusBucket::InProgress));
        assert_eq!(StatusBucket::parse("closed"), Some(StatusBucket::Closed));
        assert_eq!(StatusBucket::parse("everything"), None);
    }
}
