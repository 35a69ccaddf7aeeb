//! Search-index facet mapping.
//!
//! Translates a `FilterState` into the hosted index's filter syntax and
//! derives the available-values map for the prompt from facet counts.

use crate::types::{AvailableFilters, FilterState};
use crate::url_params::format_number;
use serde::Serialize;
use std::collections::HashMap;

/// Facet attribute name -> value -> hit count, as returned with search results
pub type FacetCounts = HashMap<String, HashMap<String, u64>>;

/// (filter field, index attribute) pairs
pub const FACET_ATTRIBUTES: [(&str, &str); 5] = [
    ("gender", "gender.title"),
    ("category", "category.title"),
    ("subCategory", "sub_category.title"),
    ("color", "sku.color.title"),
    ("size", "sku.size.title"),
];

pub const PRICE_ATTRIBUTE: &str = "price";
pub const DEFAULT_SORT: &str = "newest";

/// Index ordering for a search-page sort value; unknown values sort newest first
pub fn index_sort(sort_by: &str) -> &'static str {
    match sort_by {
        "price-asc" => "price_asc",
        "price-desc" => "price_desc",
        "rating" => "rating_desc",
        "popular" => "popularity_desc",
        _ => DEFAULT_SORT,
    }
}

/// Index query parameters for one filter state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuery {
    pub query: String,
    /// One OR-group per facet; groups are ANDed
    pub facet_filters: Vec<Vec<String>>,
    pub numeric_filters: Vec<String>,
    /// 0-based
    pub page: u32,
    pub sort_by: String,
}

fn attribute_for(field: &str) -> &'static str {
    FACET_ATTRIBUTES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, attr)| *attr)
        .unwrap_or("")
}

fn facet_group<T: AsRef<str>>(field: &str, values: &Option<Vec<T>>) -> Option<Vec<String>> {
    let attribute = attribute_for(field);
    values.as_ref().map(|values| {
        values
            .iter()
            .map(|v| format!("{}:{}", attribute, v.as_ref()))
            .collect()
    })
}

/// Build the index query for a filter state
pub fn to_index_query(filters: &FilterState) -> IndexQuery {
    let genders = filters
        .gender
        .as_ref()
        .map(|g| g.iter().map(|g| g.as_str()).collect::<Vec<_>>());

    let facet_filters: Vec<Vec<String>> = [
        facet_group("gender", &genders),
        facet_group("category", &filters.category),
        facet_group("subCategory", &filters.sub_category),
        facet_group("color", &filters.color),
        facet_group("size", &filters.size),
    ]
    .into_iter()
    .flatten()
    .filter(|group| !group.is_empty())
    .collect();

    let mut bounds = Vec::new();
    if let Some(min) = filters.min_price {
        bounds.push(format!("{} >= {}", PRICE_ATTRIBUTE, format_number(min)));
    }
    if let Some(max) = filters.max_price {
        bounds.push(format!("{} <= {}", PRICE_ATTRIBUTE, format_number(max)));
    }
    let numeric_filters = if bounds.is_empty() {
        Vec::new()
    } else {
        vec![bounds.join(" AND ")]
    };

    IndexQuery {
        query: filters.query.clone().unwrap_or_default(),
        facet_filters,
        numeric_filters,
        page: filters.page.unwrap_or(1).saturating_sub(1),
        sort_by: index_sort(filters.sort_by.as_deref().unwrap_or(DEFAULT_SORT)).to_string(),
    }
}

/// Available filter values per facet, taken from the facet counts of a search
/// response. Values are sorted; facets missing from the response are omitted.
pub fn available_filters_from_facets(facets: &FacetCounts) -> AvailableFilters {
    let mut available = AvailableFilters::new();
    for (field, attribute) in FACET_ATTRIBUTES {
        if let Some(counts) = facets.get(attribute) {
            let mut values: Vec<String> = counts.keys().cloned().collect();
            values.sort();
            available.insert(field.to_string(), values);
        }
    }
    available
}
