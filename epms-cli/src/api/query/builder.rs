//! Translation of a [`QueryRequest`] into OData V4 query options

use super::collection::{CollectionSpec, SelectionSpec};
use super::filters::Filter;
use super::query::QueryRequest;
use std::fmt;

/// Concrete OData query options for one request.
///
/// Values are kept decoded; [`QueryOptions::to_query_string`] percent-encodes
/// them on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub top: u32,
    pub skip: Option<u64>,
    pub count: bool,
    pub order_by: String,
    pub filter: Option<String>,
}

impl QueryOptions {
    /// Options in wire order as `(name, decoded value)` pairs
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("$top", self.top.to_string())];
        if let Some(skip) = self.skip {
            params.push(("$skip", skip.to_string()));
        }
        if self.count {
            params.push(("$count", "true".to_string()));
        }
        params.push(("$orderby", self.order_by.clone()));
        if let Some(ref filter) = self.filter {
            params.push(("$filter", filter.clone()));
        }
        params
    }

    /// Decoded value of a single option
    pub fn get(&self, name: &str) -> Option<String> {
        self.params()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// `?$top=..&$skip=..` with every value percent-encoded
    pub fn to_query_string(&self) -> String {
        let encoded: Vec<String> = self
            .params()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect();
        format!("?{}", encoded.join("&"))
    }
}

impl fmt::Display for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Build the paged query for `request` against `collection`.
///
/// Always emits `$top`, `$skip`, `$count=true` and `$orderby`; `$filter` only
/// when at least one clause is active. Clauses are AND-ed in the order status,
/// keyword group, custom filter.
pub fn build_odata_query(request: &QueryRequest, collection: &CollectionSpec) -> QueryOptions {
    let order_by = request
        .sort
        .as_ref()
        .filter(|order| !order.field.trim().is_empty())
        .unwrap_or(&collection.default_order)
        .to_odata();

    QueryOptions {
        top: request.effective_page_size(),
        skip: Some(request.offset()),
        count: true,
        order_by,
        filter: build_filter(request, collection).map(|f| f.to_odata()),
    }
}

/// Build the `$filter` for `request`, `None` when nothing narrows the result
pub fn build_filter(request: &QueryRequest, collection: &CollectionSpec) -> Option<Filter> {
    let mut clauses = Vec::new();

    if let (Some(status), Some(field)) = (request.normalized_status(), &collection.status_field) {
        clauses.push(field.to_filter(status));
    }

    if let Some(keyword) = request.normalized_keyword() {
        if !collection.keyword_fields.is_empty() {
            clauses.push(Filter::contains_any(
                collection.keyword_fields.iter().cloned(),
                keyword,
            ));
        }
    }

    if let Some(ref custom) = request.custom_filter {
        clauses.push(custom.clone());
    }

    let filter = Filter::and(clauses);
    if filter.is_empty() { None } else { Some(filter) }
}

/// Build the unpaged picker query: fixed `$top`, `$orderby` and `$filter`,
/// no `$skip` and no `$count`
pub fn build_selection_query(selection: &SelectionSpec, predicate: Option<&Filter>) -> QueryOptions {
    let filter = predicate.unwrap_or(&selection.filter);
    QueryOptions {
        top: selection.top,
        skip: None,
        count: false,
        order_by: selection.order_by.to_odata(),
        filter: if filter.is_empty() {
            None
        } else {
            Some(filter.to_odata())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::OrderBy;

    fn orders() -> CollectionSpec {
        CollectionSpec::purchase_orders()
    }

    #[test]
    fn test_first_page_has_zero_skip() {
        let options = build_odata_query(&QueryRequest::new(1, 10), &orders());
        assert_eq!(options.get("$top").as_deref(), Some("10"));
        assert_eq!(options.get("$skip").as_deref(), Some("0"));
        assert!(options.to_query_string().starts_with("?$top=10&$skip=0&$count=true"));
    }

    #[test]
    fn test_second_page_skips_one_page() {
        let options = build_odata_query(&QueryRequest::new(2, 10), &orders());
        assert_eq!(options.get("$skip").as_deref(), Some("10"));
    }

    #[test]
    fn test_third_page_of_twenty() {
        let options = build_odata_query(&QueryRequest::new(3, 20), &orders());
        assert_eq!(options.get("$top").as_deref(), Some("20"));
        assert_eq!(options.get("$skip").as_deref(), Some("40"));
    }

    #[test]
    fn test_offset_formula_over_a_range() {
        for page in 1..=12u32 {
            for page_size in [1u32, 5, 10, 25, 100] {
                let options = build_odata_query(&QueryRequest::new(page, page_size), &orders());
                let expected = (page as u64 - 1) * page_size as u64;
                assert_eq!(options.skip, Some(expected));
                assert_eq!(options.top, page_size);
            }
        }
    }

    #[test]
    fn test_zero_page_never_goes_negative() {
        let options = build_odata_query(&QueryRequest::new(0, 0), &orders());
        assert_eq!(options.skip, Some(0));
        assert_eq!(options.top, 1);
    }

    #[test]
    fn test_default_ordering_is_never_omitted() {
        for collection in [
            CollectionSpec::purchase_orders(),
            CollectionSpec::vendors(),
            CollectionSpec::materials(),
        ] {
            let options = build_odata_query(&QueryRequest::default(), &collection);
            assert_eq!(options.get("$orderby").as_deref(), Some("createdAt desc"));
        }
    }

    #[test]
    fn test_blank_sort_field_falls_back_to_default() {
        let request = QueryRequest::builder().sort(OrderBy::asc(" ")).build();
        let options = build_odata_query(&request, &orders());
        assert_eq!(options.order_by, "createdAt desc");
    }

    #[test]
    fn test_sort_direction_mapping() {
        let request = QueryRequest::builder().sort(OrderBy::desc("grandTotal")).build();
        assert_eq!(build_odata_query(&request, &orders()).order_by, "grandTotal desc");

        let request = QueryRequest::builder().sort(OrderBy::asc("grandTotal")).build();
        assert_eq!(build_odata_query(&request, &orders()).order_by, "grandTotal asc");
    }

    #[test]
    fn test_no_filter_without_clauses() {
        let options = build_odata_query(&QueryRequest::default(), &orders());
        assert!(options.filter.is_none());
        assert!(!options.to_query_string().contains("$filter"));
    }

    #[test]
    fn test_keyword_quote_is_doubled() {
        let request = QueryRequest::builder().keyword("O'Brien").build();
        let filter = build_odata_query(&request, &orders()).filter.unwrap();
        assert_eq!(
            filter,
            "contains(poNumber, 'O''Brien') or contains(vendorName, 'O''Brien')"
        );
    }

    #[test]
    fn test_status_and_keyword_are_combined() {
        let request = QueryRequest::builder().status("PENDING").keyword("abc").build();
        let filter = build_odata_query(&request, &orders()).filter.unwrap();
        assert_eq!(
            filter,
            "status eq 'PENDING' and (contains(poNumber, 'abc') or contains(vendorName, 'abc'))"
        );
    }

    #[test]
    fn test_keyword_uses_collection_fields() {
        let request = QueryRequest::builder().keyword(" bolt ").build();
        let filter = build_odata_query(&request, &CollectionSpec::materials())
            .filter
            .unwrap();
        assert_eq!(
            filter,
            "contains(description, 'bolt') or contains(materialCode, 'bolt')"
        );
    }

    #[test]
    fn test_boolean_status_on_materials() {
        let request = QueryRequest::builder().status("true").keyword("steel").build();
        let filter = build_odata_query(&request, &CollectionSpec::materials())
            .filter
            .unwrap();
        assert_eq!(
            filter,
            "isActive eq true and (contains(description, 'steel') or contains(materialCode, 'steel'))"
        );
    }

    #[test]
    fn test_custom_filter_alone_and_combined() {
        let custom = Filter::raw("isActive eq true and basePrice gt 100");
        let request = QueryRequest::builder().custom_filter(custom.clone()).build();
        let options = build_odata_query(&request, &CollectionSpec::materials());
        assert_eq!(
            options.filter.as_deref(),
            Some("isActive eq true and basePrice gt 100")
        );

        let request = QueryRequest::builder()
            .status("ACTIVE")
            .custom_filter(custom)
            .build();
        let options = build_odata_query(&request, &CollectionSpec::vendors());
        assert_eq!(
            options.filter.as_deref(),
            Some("status eq 'ACTIVE' and (isActive eq true and basePrice gt 100)")
        );
    }

    #[test]
    fn test_query_string_is_percent_encoded() {
        let request = QueryRequest::builder().keyword("a&b").build();
        let query = build_odata_query(&request, &orders()).to_query_string();
        assert_eq!(
            query,
            "?$top=10&$skip=0&$count=true&$orderby=createdAt%20desc\
             &$filter=contains%28poNumber%2C%20%27a%26b%27%29%20or%20contains%28vendorName%2C%20%27a%26b%27%29"
        );
    }

    #[test]
    fn test_builder_is_deterministic() {
        let request = QueryRequest::builder()
            .page(4)
            .page_size(25)
            .status("REJECTED")
            .keyword("x")
            .build();
        assert_eq!(
            build_odata_query(&request, &orders()).to_query_string(),
            build_odata_query(&request, &orders()).to_query_string()
        );
    }

    #[test]
    fn test_selection_query_shape() {
        let vendors = CollectionSpec::vendors();
        let options = build_selection_query(vendors.selection.as_ref().unwrap(), None);
        assert_eq!(options.skip, None);
        assert!(!options.count);
        assert_eq!(
            options.params(),
            vec![
                ("$top", "500".to_string()),
                ("$orderby", "name asc".to_string()),
                ("$filter", "status eq 'ACTIVE'".to_string()),
            ]
        );
    }

    #[test]
    fn test_selection_predicate_replaces_fixed_filter() {
        let materials = CollectionSpec::materials();
        let predicate = Filter::eq("materialType", "ROH");
        let options = build_selection_query(materials.selection.as_ref().unwrap(), Some(&predicate));
        assert_eq!(options.top, 1000);
        assert_eq!(options.filter.as_deref(), Some("materialType eq 'ROH'"));
    }
}
