//! Procurement backend facade
//!
//! One [`ProcurementApi`] per process. It owns the request pipeline and hands
//! out the typed collection clients.

use super::auth::{AuthContext, AuthUser};
use super::client::ApiClient;
use super::collections::CollectionClient;
use super::constants::{LOGIN_PATH, ODATA_METADATA_PATH, PROFILE_PASSWORD_PATH};
use super::error::ApiError;
use super::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, Material, PurchaseOrderSummary, Vendor,
    unwrap_result,
};
use super::query::CollectionSpec;
use anyhow::Context;
use log::debug;
use serde::Serialize;
use std::sync::Arc;

/// An entity set advertised by the service document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySetInfo {
    pub name: String,
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProcurementApi {
    client: ApiClient,
    orders: CollectionClient<PurchaseOrderSummary>,
    vendors: CollectionClient<Vendor>,
    materials: CollectionClient<Material>,
}

impl ProcurementApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            orders: CollectionClient::new(client.clone(), CollectionSpec::purchase_orders()),
            vendors: CollectionClient::new(client.clone(), CollectionSpec::vendors()),
            materials: CollectionClient::new(client.clone(), CollectionSpec::materials()),
            client,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        self.client.auth()
    }

    pub fn orders(&self) -> &CollectionClient<PurchaseOrderSummary> {
        &self.orders
    }

    pub fn vendors(&self) -> &CollectionClient<Vendor> {
        &self.vendors
    }

    pub fn materials(&self) -> &CollectionClient<Material> {
        &self.materials
    }

    /// Raw EDMX service document
    pub async fn metadata(&self) -> Result<String, ApiError> {
        self.client.get_text(ODATA_METADATA_PATH).await
    }

    /// Entity sets listed in the service document
    pub async fn entity_sets(&self) -> anyhow::Result<Vec<EntitySetInfo>> {
        let edmx = self.metadata().await?;
        parse_entity_sets(&edmx)
    }

    /// Exchange credentials for a token and start a session.
    ///
    /// The session is only replaced once the token has been decoded; any
    /// failure leaves the previous session in place.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthUser, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        debug!("Logging in as {}", username);

        let body = self.client.post_json(LOGIN_PATH, &request).await?;
        let response: LoginResponse =
            serde_json::from_value(unwrap_result(body)).map_err(|source| ApiError::InvalidBody {
                path: LOGIN_PATH.to_string(),
                source,
            })?;

        let token = response
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or(ApiError::MissingToken)?;

        self.auth().login(&token).map_err(ApiError::Session)
    }

    /// Replace the signed-in user's password.
    ///
    /// The current token still carries the old claims (including a pending
    /// password change), so the session is ended on success and the user has
    /// to log in again.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ApiError> {
        let request = ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        self.client.put_json(PROFILE_PASSWORD_PATH, &request).await?;
        debug!("Password changed; ending session");
        self.logout()
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.auth().logout().map_err(ApiError::Session)
    }
}

/// Extract `EntitySet` declarations from an EDMX document
pub fn parse_entity_sets(edmx: &str) -> anyhow::Result<Vec<EntitySetInfo>> {
    let document = roxmltree::Document::parse(edmx).context("Failed to parse EDMX metadata")?;

    let sets = document
        .descendants()
        .filter(|node| node.has_tag_name("EntitySet"))
        .filter_map(|node| {
            let name = node.attribute("Name")?;
            Some(EntitySetInfo {
                name: name.to_string(),
                entity_type: node.attribute("EntityType").map(str::to_string),
            })
        })
        .collect();

    Ok(sets)
}
