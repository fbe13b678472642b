//! Typed query clients, one per entity set
//!
//! A [`CollectionClient`] glues the query builder, one GET through the request
//! pipeline and the response parser into a single awaitable call. There is no
//! caching and no retry: each call is one attempt and failures go back to the
//! caller.

use super::client::ApiClient;
use super::constants::ODATA_BASE;
use super::error::ApiError;
use super::query::{
    CollectionSpec, Filter, QueryOptions, QueryRequest, QueryResult, build_odata_query,
    build_selection_query, decode_rows, parse_odata_response, parse_selection_response,
};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;

/// Terminal state of a cancellable call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    /// The caller lost interest before the response arrived
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Query client for one entity set with rows decoded as `T`
pub struct CollectionClient<T> {
    api: ApiClient,
    spec: CollectionSpec,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionClient<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            spec: self.spec.clone(),
            _row: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for CollectionClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionClient")
            .field("entity_set", &self.spec.entity_set)
            .finish()
    }
}

impl<T: DeserializeOwned> CollectionClient<T> {
    pub fn new(api: ApiClient, spec: CollectionSpec) -> Self {
        Self {
            api,
            spec,
            _row: PhantomData,
        }
    }

    pub fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    /// `/odata/<EntitySet>`
    pub fn path(&self) -> String {
        format!("{}/{}", ODATA_BASE, self.spec.entity_set)
    }

    fn path_with(&self, options: &QueryOptions) -> String {
        format!("{}{}", self.path(), options.to_query_string())
    }

    /// Fetch one page
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResult<T>, ApiError> {
        let raw = self.query_raw(request).await?;
        raw.decode().map_err(|source| ApiError::Decode {
            entity_set: self.spec.entity_set.clone(),
            source,
        })
    }

    /// Fetch one page without schema validation
    pub async fn query_raw(&self, request: &QueryRequest) -> Result<QueryResult<Value>, ApiError> {
        let options = build_odata_query(request, &self.spec);
        debug!("Querying {} with {:?}", self.spec.entity_set, options.params());

        let body = self.api.get_json(&self.path_with(&options)).await?;
        let result = parse_odata_response(&body);
        debug!(
            "{}: {} rows of {} total",
            self.spec.entity_set,
            result.len(),
            result.total
        );
        Ok(result)
    }

    /// Like [`query`](Self::query), resolving to [`Outcome::Cancelled`] as
    /// soon as `cancel` fires. The in-flight request is dropped.
    pub async fn query_cancellable(
        &self,
        request: &QueryRequest,
        cancel: &CancellationToken,
    ) -> Result<Outcome<QueryResult<T>>, ApiError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Query on {} cancelled", self.spec.entity_set);
                Ok(Outcome::Cancelled)
            }
            result = self.query(request) => result.map(Outcome::Completed),
        }
    }

    /// Fetch the whole collection for a picker: fixed `$top` and ordering,
    /// the collection's fixed filter unless `predicate` replaces it
    pub async fn list_all_for_selection(
        &self,
        predicate: Option<&Filter>,
    ) -> Result<Vec<T>, ApiError> {
        let selection = self
            .spec
            .selection
            .as_ref()
            .ok_or_else(|| ApiError::SelectionUnavailable(self.spec.entity_set.clone()))?;
        let options = build_selection_query(selection, predicate);

        let body = self.api.get_json(&self.path_with(&options)).await?;
        let rows = parse_selection_response(&body);
        debug!("{}: loaded {} rows for selection", self.spec.entity_set, rows.len());

        decode_rows(rows).map_err(|source| ApiError::Decode {
            entity_set: self.spec.entity_set.clone(),
            source,
        })
    }
}
