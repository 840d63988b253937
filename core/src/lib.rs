//! Pure core of the todo search endpoint.
//!
//! # Overview
//! Turns a search request into parameterized SQL and turns the resulting rows
//! into a response body, without touching the network or the database
//! (host-does-IO pattern). The caller runs the query.
//!
//! # Design
//! - [`params`] validates query-string pairs into a [`SearchSpec`].
//! - [`query`] renders a `SearchSpec` into a [`CompiledQuery`]: SQL text with
//!   `?` placeholders plus the bound values in order.
//! - [`shape`] maps [`TodoRow`]s into the list or no-content envelope.
//! - Nothing here holds state between calls, so every function is safe to
//!   call from any number of request tasks at once.

pub mod error;
pub mod params;
pub mod query;
pub mod shape;
pub mod types;

pub use error::{CompileError, ParamError};
pub use params::{parse_group_id, parse_search, SearchOwner};
pub use query::{compile, CompiledQuery};
pub use shape::{shape, SearchResponse, Todo, TodoRow, NO_CONTENT_MESSAGE};
pub use types::{
    CompleteFilter, DateColumn, OwnerScope, SearchSpec, SortDirection, SqlParam,
    DEFAULT_END_DATE, DEFAULT_START_DATE,
};
