//! Per-collection query configuration

use super::filters::{Filter, FilterValue};
use super::orderby::OrderBy;

/// How a status value is typed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Quoted string literal, e.g. `status eq 'PENDING'`
    Text,
    /// Bare boolean, e.g. `isActive eq true`
    Boolean,
}

/// The single discriminated field a status filter applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusField {
    pub name: String,
    pub kind: StatusKind,
}

impl StatusField {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StatusKind::Text,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StatusKind::Boolean,
        }
    }

    /// Equality clause for `value`
    pub fn to_filter(&self, value: &str) -> Filter {
        let literal = match self.kind {
            StatusKind::Text => FilterValue::String(value.to_string()),
            StatusKind::Boolean => match value.to_ascii_lowercase().as_str() {
                "true" => FilterValue::Bool(true),
                "false" => FilterValue::Bool(false),
                // Let the backend reject it rather than guessing
                _ => FilterValue::String(value.to_string()),
            },
        };
        Filter::Eq(self.name.clone(), literal)
    }
}

/// Fixed query used to populate pickers with a whole collection
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSpec {
    pub top: u32,
    pub order_by: OrderBy,
    pub filter: Filter,
}

/// Everything the builder needs to know about one entity set
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    /// Entity set name, e.g. `PurchaseOrders`
    pub entity_set: String,
    /// Ordering used when the request carries no sort
    pub default_order: OrderBy,
    pub status_field: Option<StatusField>,
    /// Fields the keyword is matched against with `contains`
    pub keyword_fields: Vec<String>,
    pub selection: Option<SelectionSpec>,
}

impl CollectionSpec {
    pub fn new(entity_set: impl Into<String>, default_order: OrderBy) -> Self {
        Self {
            entity_set: entity_set.into(),
            default_order,
            status_field: None,
            keyword_fields: Vec::new(),
            selection: None,
        }
    }

    pub fn with_status_field(mut self, field: StatusField) -> Self {
        self.status_field = Some(field);
        self
    }

    pub fn with_keyword_fields(mut self, fields: &[&str]) -> Self {
        self.keyword_fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    pub fn with_selection(mut self, selection: SelectionSpec) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Purchase orders, newest first, searchable by PO number and vendor name
    pub fn purchase_orders() -> Self {
        Self::new("PurchaseOrders", OrderBy::desc("createdAt"))
            .with_status_field(StatusField::text("status"))
            .with_keyword_fields(&["poNumber", "vendorName"])
    }

    /// Vendors, searchable by name and vendor code
    pub fn vendors() -> Self {
        Self::new("Vendors", OrderBy::desc("createdAt"))
            .with_status_field(StatusField::text("status"))
            .with_keyword_fields(&["name", "vendorCode"])
            .with_selection(SelectionSpec {
                top: 500,
                order_by: OrderBy::asc("name"),
                filter: Filter::eq("status", "ACTIVE"),
            })
    }

    /// Materials, filtered on the `isActive` flag, searchable by description
    /// and material code
    pub fn materials() -> Self {
        Self::new("Materials", OrderBy::desc("createdAt"))
            .with_status_field(StatusField::boolean("isActive"))
            .with_keyword_fields(&["description", "materialCode"])
            .with_selection(SelectionSpec {
                top: 1000,
                order_by: OrderBy::asc("description"),
                filter: Filter::eq("isActive", true),
            })
    }
}
