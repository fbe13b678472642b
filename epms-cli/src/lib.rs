//! EPMS procurement client
//!
//! OData query building, authenticated HTTP access and role-gated navigation
//! for the EPMS backend, plus the `epms-cli` command-line front end.

pub mod api;
pub mod cli;
pub mod config;
pub mod navigation;

pub use api::{ApiClient, ApiError, AuthContext, ProcurementApi, QueryRequest, QueryResult};
pub use config::Config;
