//! Core type definitions for filter extraction

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Facet names the remote prompt advertises when the caller supplies none
pub const DEFAULT_FACETS: [&str; 5] = ["gender", "category", "subCategory", "color", "size"];

/// Facet name -> values known to exist in the catalog
pub type AvailableFilters = BTreeMap<String, Vec<String>>;

/// Build the default facet map (every facet present, no known values)
pub fn default_available_filters() -> AvailableFilters {
    DEFAULT_FACETS
        .iter()
        .map(|name| (name.to_string(), Vec::new()))
        .collect()
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
            Gender::Unisex => "Unisex",
        }
    }

    /// The gender a "show the other one" suggestion toggles to
    pub fn toggled(&self) -> Gender {
        match self {
            Gender::Men => Gender::Women,
            _ => Gender::Men,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "men" | "man" | "male" | "mens" => Ok(Gender::Men),
            "women" | "woman" | "female" | "womens" => Ok(Gender::Women),
            "unisex" => Ok(Gender::Unisex),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// Accept either a single value or a list where a list is expected
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value: Option<OneOrMany<T>> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        OneOrMany::One(item) => vec![item],
        OneOrMany::Many(items) => items,
    }))
}

/// Active search refinement. Absent fields are unconstrained.
///
/// List fields are sets: once normalized they are never empty and never hold
/// duplicates, so "is this facet active" is answered by presence alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterState {
    #[serde(rename = "q", alias = "query", default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
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
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// Result ordering chosen on the search page, e.g. "price-asc"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// 1-based result page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl FilterState {
    /// No query and no facet. Sort order and page are view state and do not count.
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && !self.has_facets()
    }

    /// True when the free-text query is the only thing set
    pub fn has_only_query(&self) -> bool {
        self.query.is_some() && !self.has_facets()
    }

    fn has_facets(&self) -> bool {
        self.gender.is_some()
            || self.category.is_some()
            || self.sub_category.is_some()
            || self.color.is_some()
            || self.size.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
    }

    /// Drop empty lists and blank queries, dedup list values keeping first occurrence
    pub fn normalize(&mut self) {
        if self.query.as_deref().map_or(false, |q| q.trim().is_empty()) {
            self.query = None;
        }
        if self.sort_by.as_deref().map_or(false, |s| s.trim().is_empty()) {
            self.sort_by = None;
        }
        if self.page == Some(0) {
            self.page = None;
        }
        normalize_list(&mut self.gender);
        normalize_list(&mut self.category);
        normalize_list(&mut self.sub_category);
        normalize_list(&mut self.color);
        normalize_list(&mut self.size);
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Take sort order and page from `current` where this state leaves them unset
    pub fn keep_view_of(&mut self, current: &FilterState) {
        if self.sort_by.is_none() {
            self.sort_by = current.sort_by.clone();
        }
        if self.page.is_none() {
            self.page = current.page;
        }
    }

    /// Check numeric bounds. Range ordering is the caller's concern.
    pub fn validate(&self) -> Result<(), String> {
        for (name, bound) in [("minPrice", self.min_price), ("maxPrice", self.max_price)] {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    return Err(format!("{} must be a non-negative number, got {}", name, value));
                }
            }
        }
        Ok(())
    }
}

fn normalize_list<T: PartialEq>(field: &mut Option<Vec<T>>) {
    if let Some(values) = field.as_mut() {
        let mut seen: Vec<T> = Vec::with_capacity(values.len());
        for value in values.drain(..) {
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        *values = seen;
    }
    if field.as_ref().map_or(false, |v| v.is_empty()) {
        *field = None;
    }
}

/// Insert `value` into a list field unless already present
pub fn union_into<T: PartialEq>(field: &mut Option<Vec<T>>, value: T) {
    let values = field.get_or_insert_with(Vec::new);
    if !values.contains(&value) {
        values.push(value);
    }
}

/// One extraction call's input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub user_query: String,
    #[serde(default)]
    pub current_filters: FilterState,
    #[serde(default)]
    pub available_filters: Option<AvailableFilters>,
    #[serde(default)]
    pub history: Vec<String>, // recent user turns, oldest first
}

impl ExtractionRequest {
    pub fn new(user_query: impl Into<String>, current_filters: FilterState) -> Self {
        Self {
            user_query: user_query.into(),
            current_filters,
            available_filters: None,
            history: Vec::new(),
        }
    }

    pub fn with_available_filters(mut self, available: AvailableFilters) -> Self {
        self.available_filters = Some(available);
        self
    }

    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Remote,
    Local,
}

/// Output of one extraction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub filters: FilterState, // full new state, not a diff
    pub confidence: f64,
    pub explanation: String,
    pub response: String,
    pub suggestions: Vec<String>,
    pub source: ExtractionSource,
}
