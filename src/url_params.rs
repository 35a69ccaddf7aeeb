//! Mapping between `FilterState` and address-bar query parameters

use crate::types::{FilterState, Gender};
use tracing::debug;

pub const SEARCH_PATH: &str = "/search";

/// Render a price without a trailing ".0" for whole amounts
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn push_list<T: AsRef<str>>(params: &mut Vec<(String, String)>, key: &str, values: &Option<Vec<T>>) {
    if let Some(values) = values {
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        params.push((key.to_string(), joined));
    }
}

/// Ordered key/value pairs for a filter state; absent fields are omitted,
/// list values comma-joined
pub fn filters_to_url_params(filters: &FilterState) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if let Some(query) = &filters.query {
        params.push(("q".to_string(), query.clone()));
    }
    let genders = filters
        .gender
        .as_ref()
        .map(|g| g.iter().map(|g| g.as_str()).collect::<Vec<_>>());
    push_list(&mut params, "gender", &genders);
    push_list(&mut params, "category", &filters.category);
    push_list(&mut params, "subCategory", &filters.sub_category);
    push_list(&mut params, "color", &filters.color);
    push_list(&mut params, "size", &filters.size);
    if let Some(min) = filters.min_price {
        params.push(("minPrice".to_string(), format_number(min)));
    }
    if let Some(max) = filters.max_price {
        params.push(("maxPrice".to_string(), format_number(max)));
    }
    if let Some(sort_by) = &filters.sort_by {
        params.push(("sortBy".to_string(), sort_by.clone()));
    }
    if let Some(page) = filters.page {
        params.push(("page".to_string(), page.to_string()));
    }

    params
}

fn split_list(raw: &str) -> Option<Vec<String>> {
    let values: Vec<String> = raw
        .split(',')
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn parse_price(key: &str, raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            debug!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}

/// Inverse of `filters_to_url_params`. Unknown keys, unknown genders and
/// unparseable prices are skipped.
pub fn filters_from_url_params<K, V>(params: &[(K, V)]) -> FilterState
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut filters = FilterState::default();

    for (key, value) in params {
        let value = value.as_ref();
        match key.as_ref() {
            "q" => filters.query = Some(value.to_string()),
            "gender" => {
                filters.gender = split_list(value).map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.parse::<Gender>().ok())
                        .collect()
                })
            }
            "category" => filters.category = split_list(value),
            "subCategory" => filters.sub_category = split_list(value),
            "color" => filters.color = split_list(value),
            "size" => filters.size = split_list(value),
            "minPrice" => filters.min_price = parse_price("minPrice", value),
            "maxPrice" => filters.max_price = parse_price("maxPrice", value),
            "sortBy" => filters.sort_by = Some(value.trim().to_string()),
            "page" => {
                filters.page = value.trim().parse::<u32>().ok();
                if filters.page.is_none() {
                    debug!("Ignoring unparseable page={:?}", value);
                }
            }
            other => debug!("Ignoring URL parameter {}", other),
        }
    }

    filters.normalized()
}

/// Parse a raw query string (`a=b&c=d`, optional leading `?`)
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Search page URL for a filter state: `/search?...`, or `/search` when empty
pub fn build_search_url(filters: &FilterState) -> String {
    let params = filters_to_url_params(filters);
    if params.is_empty() {
        return SEARCH_PATH.to_string();
    }

    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("{}?{}", SEARCH_PATH, query.join("&"))
}
