//! Result shaper: store rows in, response envelope out.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Message returned when a search matches nothing.
pub const NO_CONTENT_MESSAGE: &str = "条件に一致するtodoは見つかりませんでした。";

/// Weekday glyphs indexed by days-from-Sunday.
const WEEKDAY_GLYPHS: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

/// One row as read from `todo_list` / `group_todo_list`, columns in select
/// order. `user_id` is only populated for group searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: i64,
    pub posted_date: NaiveDateTime,
    pub updated_date: NaiveDateTime,
    pub implementation_date: NaiveDate,
    pub due_date: NaiveDate,
    pub todo_content: String,
    pub complete_flag: bool,
    pub user_id: Option<String>,
}

/// A calendar day that serializes as `MM/DD(曜)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDate(pub NaiveDate);

impl DisplayDate {
    pub fn render(&self) -> String {
        let glyph = WEEKDAY_GLYPHS[self.0.weekday().num_days_from_sunday() as usize];
        format!("{}({glyph})", self.0.format("%m/%d"))
    }
}

impl Serialize for DisplayDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: i64,
    pub posted_date: NaiveDateTime,
    pub updated_date: NaiveDateTime,
    pub implementation_date: DisplayDate,
    pub due_date: DisplayDate,
    pub todo_content: String,
    pub complete_flag: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            posted_date: row.posted_date,
            updated_date: row.updated_date,
            implementation_date: DisplayDate(row.implementation_date),
            due_date: DisplayDate(row.due_date),
            todo_content: row.todo_content,
            complete_flag: row.complete_flag,
            user_id: row.user_id,
        }
    }
}

/// Body of a successful search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Found { search_todo_list: Vec<Todo> },
    NoContent { message: &'static str },
}

/// Wrap rows into the list envelope, or the no-content envelope when empty.
pub fn shape(rows: Vec<TodoRow>) -> SearchResponse {
    if rows.is_empty() {
        return SearchResponse::NoContent {
            message: NO_CONTENT_MESSAGE,
        };
    }
    SearchResponse::Found {
        search_todo_list: rows.into_iter().map(Todo::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, user_id: Option<&str>) -> TodoRow {
        let posted = NaiveDate::from_ymd_opt(2020, 6, 28)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        TodoRow {
            id,
            posted_date: posted,
            updated_date: posted,
            implementation_date: NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2020, 7, 5).unwrap(),
            todo_content: "買い物".to_string(),
            complete_flag: false,
            user_id: user_id.map(String::from),
        }
    }

    #[test]
    fn display_date_uses_sunday_first_glyphs() {
        // 2020-07-05 was a Sunday, 2020-07-11 a Saturday
        let sunday = DisplayDate(NaiveDate::from_ymd_opt(2020, 7, 5).unwrap());
        let saturday = DisplayDate(NaiveDate::from_ymd_opt(2020, 7, 11).unwrap());
        assert_eq!(sunday.render(), "07/05(日)");
        assert_eq!(saturday.render(), "07/11(土)");
        assert_eq!(
            DisplayDate(NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()).render(),
            "07/01(水)"
        );
    }

    #[test]
    fn empty_rows_give_no_content_envelope() {
        let json = serde_json::to_string(&shape(Vec::new())).unwrap();
        assert_eq!(json, r#"{"message":"条件に一致するtodoは見つかりませんでした。"}"#);
    }

    #[test]
    fn personal_rows_omit_user_id() {
        let json = serde_json::to_value(shape(vec![row(1, None)])).unwrap();
        let todo = &json["search_todo_list"][0];
        assert_eq!(todo["id"], 1);
        assert_eq!(todo["posted_date"], "2020-06-28T09:30:00");
        assert_eq!(todo["implementation_date"], "07/01(水)");
        assert_eq!(todo["due_date"], "07/05(日)");
        assert_eq!(todo["todo_content"], "買い物");
        assert_eq!(todo["complete_flag"], false);
        assert!(todo.get("user_id").is_none());
    }

    #[test]
    fn group_rows_keep_owner_and_order() {
        let response = shape(vec![row(2, Some("u2")), row(1, Some("u1"))]);
        let SearchResponse::Found { search_todo_list } = response else {
            panic!("expected list envelope");
        };
        let owners: Vec<_> = search_todo_list
            .iter()
            .map(|todo| todo.user_id.as_deref())
            .collect();
        assert_eq!(owners, vec![Some("u2"), Some("u1")]);
    }
}
