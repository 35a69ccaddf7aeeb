//! Applied-filter documents as the storefront widgets exchange them: facet
//! lists plus a `price` range object with `$gte`/`$lte` bounds.

use crate::types::{one_or_many, FilterState, Gender};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(rename = "$gte", default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(rename = "$lte", default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
}

/// Filter widget state. Carries no query, sort order or page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Vec<Gender>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<String>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceRange>,
}

impl From<&FilterState> for AppliedFilters {
    fn from(filters: &FilterState) -> Self {
        let price = if filters.min_price.is_some() || filters.max_price.is_some() {
            Some(PriceRange {
                gte: filters.min_price,
                lte: filters.max_price,
            })
        } else {
            None
        };

        Self {
            gender: filters.gender.clone(),
            category: filters.category.clone(),
            sub_category: filters.sub_category.clone(),
            color: filters.color.clone(),
            size: filters.size.clone(),
            price,
        }
    }
}

impl From<&AppliedFilters> for FilterState {
    fn from(applied: &AppliedFilters) -> Self {
        let price = applied.price.clone().unwrap_or_default();
        FilterState {
            gender: applied.gender.clone(),
            category: applied.category.clone(),
            sub_category: applied.sub_category.clone(),
            color: applied.color.clone(),
            size: applied.size.clone(),
            min_price: price.gte,
            max_price: price.lte,
            ..Default::default()
        }
        .normalized()
    }
}

impl AppliedFilters {
    /// Replace the facets of `filters` with this widget state, keeping its
    /// query, sort order and page
    pub fn apply_to(&self, filters: &FilterState) -> FilterState {
        let mut next = FilterState::from(self);
        next.query = filters.query.clone();
        next.keep_view_of(filters);
        next
    }
}
