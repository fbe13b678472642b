//! OData Query Builder Module
//!
//! Translates a UI-level [`QueryRequest`] into OData V4 query options and
//! unwraps the response envelope back into a [`QueryResult`]. Everything here
//! is pure: no I/O and no failure paths for well-formed input.

pub mod builder;
pub mod collection;
pub mod filters;
pub mod orderby;
pub mod query;
pub mod result;

pub use builder::{QueryOptions, build_filter, build_odata_query, build_selection_query};
pub use collection::{CollectionSpec, SelectionSpec, StatusField, StatusKind};
pub use filters::{Filter, FilterValue, escape_string};
pub use orderby::{OrderBy, SortDirection};
pub use query::{QueryRequest, QueryRequestBuilder};
pub use result::{QueryResult, RowDecodeError, decode_rows, parse_odata_response, parse_selection_response};
