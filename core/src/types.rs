//! Typed search specification and the tagged values that flow into SQL.
//!
//! # Design
//! Every field that ends up spliced into SQL text is an enum with a fixed
//! `as_sql` spelling. Free text (user ids, content) only ever travels as a
//! `SqlParam`, so the compiler never needs to quote anything.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Date used when `start_date` is omitted. MySQL accepts it for `DATE` columns
/// even though its documented range starts at 1000-01-01.
pub const DEFAULT_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1, 1, 1) {
    Some(date) => date,
    None => panic!("0001-01-01 is a valid date"),
};

/// Date used when `end_date` is omitted.
pub const DEFAULT_END_DATE: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31) {
    Some(date) => date,
    None => panic!("9999-12-31 is a valid date"),
};

/// Longest accepted user identifier, in characters.
pub const MAX_USER_ID_CHARS: usize = 10;

/// Longest accepted `todo_content` filter, in characters.
pub const MAX_CONTENT_CHARS: usize = 100;

/// Largest accepted `limit`.
pub const MAX_LIMIT: u32 = 1000;

/// Which rows a search is partitioned by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    /// Rows of `todo_list` owned by the session user.
    Personal { user_id: String },
    /// Rows of `group_todo_list` for a group, optionally narrowed to members.
    /// `user_ids` is never `Some(vec![])` and holds no duplicates.
    Group {
        group_id: i64,
        user_ids: Option<Vec<String>>,
    },
}

impl OwnerScope {
    pub fn is_group(&self) -> bool {
        matches!(self, OwnerScope::Group { .. })
    }
}

/// A date column usable both as the range filter and as the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateColumn {
    #[default]
    ImplementationDate,
    DueDate,
}

impl DateColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            DateColumn::ImplementationDate => "implementation_date",
            DateColumn::DueDate => "due_date",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "implementation_date" => Some(DateColumn::ImplementationDate),
            "due_date" => Some(DateColumn::DueDate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Case-insensitive match on `ASC` / `DESC`.
    pub fn from_param(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

/// Tri-state filter on `complete_flag`. `Any` emits no predicate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompleteFilter {
    #[default]
    Any,
    Incomplete,
    Complete,
}

impl CompleteFilter {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            CompleteFilter::Any => None,
            CompleteFilter::Incomplete => Some(false),
            CompleteFilter::Complete => Some(true),
        }
    }
}

/// Validated, immutable description of one search request.
///
/// Built only by [`crate::params::parse_search`]; the compiler assumes every
/// invariant the parser enforces (`start_date <= end_date`, bounded lengths,
/// deduplicated group users).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub owner: OwnerScope,
    pub date_type: DateColumn,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub complete: CompleteFilter,
    pub content: Option<String>,
    pub sort: DateColumn,
    pub sort_type: SortDirection,
    pub limit: Option<u32>,
}

impl SearchSpec {
    /// A specification with every optional filter at its default.
    pub fn new(owner: OwnerScope) -> Self {
        Self {
            owner,
            date_type: DateColumn::default(),
            start_date: DEFAULT_START_DATE,
            end_date: DEFAULT_END_DATE,
            complete: CompleteFilter::default(),
            content: None,
            sort: DateColumn::default(),
            sort_type: SortDirection::default(),
            limit: None,
        }
    }
}

/// A value bound to one `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Date(NaiveDate),
    Bool(bool),
}

impl Serialize for SqlParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlParam::Text(text) => serializer.serialize_str(text),
            SqlParam::Int(value) => serializer.serialize_i64(*value),
            SqlParam::Date(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
            SqlParam::Bool(value) => serializer.serialize_bool(*value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dates_render_as_iso() {
        assert_eq!(DEFAULT_START_DATE.to_string(), "0001-01-01");
        assert_eq!(DEFAULT_END_DATE.to_string(), "9999-12-31");
    }

    #[test]
    fn sort_direction_is_case_insensitive() {
        assert_eq!(SortDirection::from_param("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::from_param("DeSc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::from_param("ASC"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::from_param("descending"), None);
    }

    #[test]
    fn date_column_rejects_other_columns() {
        assert_eq!(DateColumn::from_param("due_date"), Some(DateColumn::DueDate));
        assert_eq!(DateColumn::from_param("posted_date"), None);
        assert_eq!(DateColumn::from_param("DUE_DATE"), None);
    }

    #[test]
    fn sql_params_serialize_untagged() {
        let params = vec![
            SqlParam::Int(7),
            SqlParam::Text("u1".to_string()),
            SqlParam::Date(DEFAULT_START_DATE),
            SqlParam::Bool(true),
        ];
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!([7, "u1", "0001-01-01", true]));
    }
}
