//! Wire models for the procurement backend

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Purchase order lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoStatus {
    Created,
    Pending,
    Approved,
    Received,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl PoStatus {
    pub const ALL: [PoStatus; 6] = [
        Self::Created,
        Self::Pending,
        Self::Approved,
        Self::Received,
        Self::Rejected,
        Self::Cancelled,
    ];

    /// Wire value used in `$filter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Received => "RECEIVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "Draft",
            Self::Pending => "Pending Approval",
            Self::Approved => "Approved",
            Self::Received => "Received",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Row of the `PurchaseOrders` entity set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderSummary {
    pub id: i64,
    pub po_number: String,
    #[serde(default)]
    pub vendor_name: Option<String>,
    pub status: PoStatus,
    #[serde(default)]
    pub grand_total: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default)]
    pub item_count: Option<u32>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Row of the `Vendors` entity set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: i64,
    #[serde(default)]
    pub vendor_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Row of the `Materials` entity set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: i64,
    pub material_code: String,
    pub description: String,
    #[serde(default)]
    pub material_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `PUT /api/profile/password`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Successful login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Unwrap the backend's `{ code, message, result }` wrapper. Bodies without a
/// `result` key are returned as they are.
pub fn unwrap_result(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_purchase_order_row() {
        let row: PurchaseOrderSummary = serde_json::from_value(json!({
            "id": 12,
            "poNumber": "PO-2024-0012",
            "vendorName": "Acme Steel",
            "status": "PENDING",
            "grandTotal": 1520.5,
            "approvedBy": "mgr",
        }))
        .unwrap();
        assert_eq!(row.status, PoStatus::Pending);
        assert_eq!(row.grand_total, Some(1520.5));
        assert_eq!(row.extra.get("approvedBy"), Some(&json!("mgr")));
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let row: PurchaseOrderSummary = serde_json::from_value(json!({
            "id": 1,
            "poNumber": "PO-1",
            "status": "ON_HOLD",
        }))
        .unwrap();
        assert_eq!(row.status, PoStatus::Unknown);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(PoStatus::parse("approved"), Some(PoStatus::Approved));
        assert_eq!(PoStatus::parse("ON_HOLD"), None);
        assert_eq!(PoStatus::Created.label(), "Draft");
    }

    #[test]
    fn test_material_requires_code() {
        let missing_code = json!({ "id": 3, "description": "Bolt M8" });
        assert!(serde_json::from_value::<Material>(missing_code).is_err());
    }

    #[test]
    fn test_unwrap_result() {
        assert_eq!(
            unwrap_result(json!({ "code": 1000, "result": { "token": "t" } })),
            json!({ "token": "t" })
        );
        assert_eq!(unwrap_result(json!({ "token": "t" })), json!({ "token": "t" }));
    }
}
