//! Procurement backend API
//!
//! Layers, bottom up: the OData query builder and response parser
//! ([`query`]), the authenticated request pipeline ([`client`]), typed
//! per-collection clients ([`collections`]) and the [`ProcurementApi`] facade
//! that ties them to one session.

pub mod auth;
pub mod client;
pub mod collections;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod query;
pub mod service;

pub use auth::{AuthContext, AuthSession, AuthUser, FileSessionStore, MemorySessionStore, SessionStore};
pub use client::ApiClient;
pub use collections::{CollectionClient, Outcome};
pub use error::ApiError;
pub use messages::user_message;
pub use models::{Material, PoStatus, PurchaseOrderSummary, Vendor};
pub use query::{
    CollectionSpec, Filter, FilterValue, OrderBy, QueryOptions, QueryRequest, QueryResult,
    SortDirection,
};
pub use service::{EntitySetInfo, ProcurementApi};
