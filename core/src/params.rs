//! Search-request parser: query-string pairs in, [`SearchSpec`] out.
//!
//! # Design
//! All request validation lives here so the compiler can assume its input is
//! well formed. Input is the raw `(name, value)` pair list in request order,
//! which keeps repeated `user_id` parameters and their ordering intact.
//!
//! Rules shared by every parameter:
//! - unknown names are ignored;
//! - an empty value is the same as an absent one;
//! - for single-valued parameters the first occurrence wins.

use chrono::NaiveDate;

use crate::error::ParamError;
use crate::types::{
    CompleteFilter, DateColumn, OwnerScope, SearchSpec, SortDirection, MAX_CONTENT_CHARS,
    MAX_LIMIT, MAX_USER_ID_CHARS,
};

/// Who the search is for, before validation.
#[derive(Debug, Clone, Copy)]
pub enum SearchOwner<'a> {
    /// Personal search; the user id comes from the session.
    Personal { user_id: &'a str },
    /// Group search; `group_id` has already been through [`parse_group_id`].
    Group { group_id: i64 },
}

/// Validate and normalize one search request.
pub fn parse_search(
    query: &[(String, String)],
    owner: SearchOwner<'_>,
) -> Result<SearchSpec, ParamError> {
    let owner = match owner {
        SearchOwner::Personal { user_id } => OwnerScope::Personal {
            user_id: validate_user_id(user_id)?.to_string(),
        },
        SearchOwner::Group { group_id } => OwnerScope::Group {
            group_id,
            user_ids: parse_user_ids(query)?,
        },
    };

    let mut spec = SearchSpec::new(owner);

    if let Some(value) = first(query, "date_type") {
        spec.date_type = parse_date_column("date_type", value)?;
    }
    if let Some(value) = first(query, "start_date") {
        spec.start_date = parse_date("start_date", value)?;
    }
    if let Some(value) = first(query, "end_date") {
        spec.end_date = parse_date("end_date", value)?;
    }
    if spec.start_date > spec.end_date {
        return Err(ParamError::OutOfRange {
            param: "start_date",
            reason: format!(
                "start date {} is after end date {}",
                spec.start_date, spec.end_date
            ),
        });
    }

    if let Some(value) = first(query, "complete_flag") {
        spec.complete = match value {
            "true" => CompleteFilter::Complete,
            "false" => CompleteFilter::Incomplete,
            other => return Err(unknown("complete_flag", other)),
        };
    }
    if let Some(value) = first(query, "todo_content") {
        spec.content = Some(parse_content(value)?);
    }
    if let Some(value) = first(query, "sort") {
        spec.sort = parse_date_column("sort", value)?;
    }
    if let Some(value) = first(query, "sort_type") {
        spec.sort_type =
            SortDirection::from_param(value).ok_or_else(|| unknown("sort_type", value))?;
    }
    if let Some(value) = first(query, "limit") {
        spec.limit = Some(parse_limit(value)?);
    }

    Ok(spec)
}

/// Parse the `{group_id}` path segment as a positive integer.
pub fn parse_group_id(raw: &str) -> Result<i64, ParamError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ParamError::OutOfRange {
            param: "group_id",
            reason: format!("{raw:?} is not a positive integer"),
        }),
    }
}

fn first<'q>(query: &'q [(String, String)], name: &str) -> Option<&'q str> {
    query
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

fn unknown(param: &'static str, value: &str) -> ParamError {
    ParamError::UnknownEnumValue {
        param,
        value: value.to_string(),
    }
}

fn parse_date_column(param: &'static str, value: &str) -> Result<DateColumn, ParamError> {
    DateColumn::from_param(value).ok_or_else(|| unknown(param, value))
}

/// Strict `YYYY-MM-DD`; chrono alone would also take unpadded fields.
fn parse_date(param: &'static str, value: &str) -> Result<NaiveDate, ParamError> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(malformed(param, value));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| malformed(param, value))
}

fn malformed(param: &'static str, value: &str) -> ParamError {
    ParamError::MalformedDate {
        param,
        value: value.to_string(),
    }
}

fn parse_content(value: &str) -> Result<String, ParamError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParamError::EmptyRequired {
            param: "todo_content",
        });
    }
    if trimmed.chars().count() > MAX_CONTENT_CHARS {
        return Err(ParamError::OutOfRange {
            param: "todo_content",
            reason: format!("must be at most {MAX_CONTENT_CHARS} characters"),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_limit(value: &str) -> Result<u32, ParamError> {
    match value.parse::<u32>() {
        Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(ParamError::OutOfRange {
            param: "limit",
            reason: format!("{value:?} is not an integer between 1 and {MAX_LIMIT}"),
        }),
    }
}

fn validate_user_id(user_id: &str) -> Result<&str, ParamError> {
    if user_id.is_empty() {
        return Err(ParamError::EmptyRequired { param: "user_id" });
    }
    if user_id.chars().count() > MAX_USER_ID_CHARS {
        return Err(ParamError::OutOfRange {
            param: "user_id",
            reason: format!("must be at most {MAX_USER_ID_CHARS} characters"),
        });
    }
    Ok(user_id)
}

/// Every non-empty `user_id`, deduplicated in first-seen order.
fn parse_user_ids(query: &[(String, String)]) -> Result<Option<Vec<String>>, ParamError> {
    let mut user_ids: Vec<String> = Vec::new();
    for (_, value) in query
        .iter()
        .filter(|(key, value)| key == "user_id" && !value.is_empty())
    {
        let user_id = validate_user_id(value)?;
        if !user_ids.iter().any(|seen| seen == user_id) {
            user_ids.push(user_id.to_string());
        }
    }
    Ok((!user_ids.is_empty()).then_some(user_ids))
}
