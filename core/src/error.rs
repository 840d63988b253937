//! Error types for the search core.
//!
//! # Design
//! `ParamError` is the caller's fault and always maps to 400 at the HTTP
//! boundary; every variant names the parameter that triggered it.
//! `CompileError` means the compiler and the parser disagree about what is
//! valid, which is a programmer error and maps to 500.

use thiserror::Error;

/// Categorized failure from the search-request parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("{param}: {value:?} is not a valid YYYY-MM-DD date")]
    MalformedDate { param: &'static str, value: String },

    #[error("{param}: {value:?} is not an accepted value")]
    UnknownEnumValue { param: &'static str, value: String },

    #[error("{param}: {reason}")]
    OutOfRange { param: &'static str, reason: String },

    #[error("{param}: must not be empty")]
    EmptyRequired { param: &'static str },
}

impl ParamError {
    /// Name of the query or path parameter that failed validation.
    pub fn param(&self) -> &'static str {
        match self {
            ParamError::MalformedDate { param, .. }
            | ParamError::UnknownEnumValue { param, .. }
            | ParamError::OutOfRange { param, .. }
            | ParamError::EmptyRequired { param } => param,
        }
    }
}

/// Internal inconsistency detected while rendering SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("identifier {0:?} is not on the column allow-list")]
    IdentifierNotAllowed(String),

    #[error("query has {placeholders} placeholders but {params} bound parameters")]
    PlaceholderMismatch { placeholders: usize, params: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_error_message_names_parameter() {
        let err = ParamError::MalformedDate {
            param: "start_date",
            value: "2020-13-40".to_string(),
        };
        assert_eq!(err.param(), "start_date");
        assert_eq!(
            err.to_string(),
            r#"start_date: "2020-13-40" is not a valid YYYY-MM-DD date"#
        );
    }

    #[test]
    fn empty_required_message() {
        let err = ParamError::EmptyRequired { param: "todo_content" };
        assert_eq!(err.to_string(), "todo_content: must not be empty");
    }
}
