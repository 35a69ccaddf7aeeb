//! User-facing text for keyword extraction results: the response sentence,
//! follow-up suggestions, and INR amount formatting.

use crate::types::FilterState;
use crate::vocabulary::{adjacent_category_suggestions, BROWSE_SUGGESTIONS};

pub const MAX_SUGGESTIONS: usize = 3;
pub const NO_FILTER_RESPONSE: &str = "Here are the products matching your search.";

/// Format a rupee amount with Indian digit grouping (1,00,000), no symbol
pub fn format_inr(amount: f64) -> String {
    let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
    let rounded = (amount * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let paise = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let grouped = group_indian(whole);
    if paise == 0 {
        grouped
    } else if paise % 10 == 0 {
        format!("{}.{}", grouped, paise / 10)
    } else {
        format!("{}.{:02}", grouped, paise)
    }
}

fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (h, t) = rest.split_at(rest.len() - 2);
        groups.push(t);
        rest = h;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

fn join_values<T: AsRef<str>>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.as_ref())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Describe the price bounds, if any, as "between ₹X and ₹Y" / "under ₹X" / "over ₹X"
pub fn price_clause(filters: &FilterState) -> Option<String> {
    match (filters.min_price, filters.max_price) {
        (Some(min), Some(max)) => Some(format!(
            "between ₹{} and ₹{}",
            format_inr(min),
            format_inr(max)
        )),
        (None, Some(max)) => Some(format!("under ₹{}", format_inr(max))),
        (Some(min), None) => Some(format!("over ₹{}", format_inr(min))),
        (None, None) => None,
    }
}

/// Build the sentence shown to the shopper for a resulting filter state
pub fn response_message(filters: &FilterState) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(genders) = &filters.gender {
        let names: Vec<&str> = genders.iter().map(|g| g.as_str()).collect();
        parts.push(format!("{} clothing", join_values(&names)));
    }
    if let Some(categories) = &filters.category {
        parts.push(join_values(categories));
    }
    if let Some(colors) = &filters.color {
        parts.push(format!("{} colored", join_values(colors)));
    }
    if let Some(sizes) = &filters.size {
        parts.push(format!("size {}", join_values(sizes)));
    }
    if let Some(price) = price_clause(filters) {
        parts.push(price);
    }

    if parts.is_empty() {
        return NO_FILTER_RESPONSE.to_string();
    }

    format!("Here are the {} which you requested.", parts.join(" "))
}

/// Up to three follow-up queries, in fixed priority order:
/// gender toggle, adjacent categories, price narrowing, color.
pub fn suggestions(filters: &FilterState) -> Vec<String> {
    if filters.is_empty() || filters.has_only_query() {
        return BROWSE_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
    }

    let mut out: Vec<String> = Vec::new();

    if let Some([gender]) = filters.gender.as_deref() {
        out.push(format!("Also show {}", gender.toggled()));
    }

    if let Some([category]) = filters.category.as_deref() {
        out.extend(
            adjacent_category_suggestions(category)
                .iter()
                .map(|s| s.to_string()),
        );
    }

    if let Some(max) = filters.max_price {
        out.push(format!("Make it under ₹{}", format_inr((max * 0.7).round())));
    } else if let Some(min) = filters.min_price {
        out.push(format!("Make it under ₹{}", format_inr((min * 1.5).round())));
    } else {
        out.push("Show under ₹1,000".to_string());
        out.push("Show premium items".to_string());
    }

    if filters.color.is_none() {
        out.push("Show black items".to_string());
        out.push("Show blue items".to_string());
    }

    out.truncate(MAX_SUGGESTIONS);
    out
}
