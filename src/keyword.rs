//! Rule-based filter extraction.
//!
//! Total over any input: this is the terminal fallback, so every branch ends
//! in a well-formed `ExtractionResult`. Rules run in a fixed order:
//! clear, carry query, gender, category, sub-category, price, color, size.

use crate::narration::{response_message, suggestions};
use crate::types::{union_into, ExtractionResult, ExtractionSource, FilterState};
use crate::vocabulary::*;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub const KEYWORD_CONFIDENCE: f64 = 0.7;
pub const CLEAR_CONFIDENCE: f64 = 0.9;

// Amounts may carry grouping commas ("1,000", "1,00,000").
static MAX_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:under|less than|below|make it under|reduce to)\s*₹?(\d[\d,]*)").unwrap()
});
static MIN_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:over|above|more than|make it over|increase to)\s*₹?(\d[\d,]*)").unwrap()
});
static RANGE_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:between|from)\s*₹?(\d[\d,]*)\s*(?:and|to)\s*₹?(\d[\d,]*)").unwrap()
});

/// How a matched facet value combines with what is already set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Replace,
    Union,
}

/// Keyword-matching extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn name(&self) -> &'static str {
        "keyword"
    }

    /// True when the query asks to drop every filter
    pub fn is_clear_command(user_query: &str) -> bool {
        QueryText::new(user_query).contains_any(CLEAR_PHRASES)
    }

    /// Result returned for a clear/reset command
    pub fn cleared() -> ExtractionResult {
        ExtractionResult {
            filters: FilterState::default(),
            confidence: CLEAR_CONFIDENCE,
            explanation: "All filters cleared".to_string(),
            response: "I've cleared all filters. You can now start a new search.".to_string(),
            suggestions: CLEARED_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            source: ExtractionSource::Local,
        }
    }

    /// Apply the keyword rules to `user_query` on top of `current_filters`
    pub fn extract(
        &self,
        user_query: &str,
        current_filters: Option<&FilterState>,
    ) -> ExtractionResult {
        let text = QueryText::new(user_query);

        if text.contains_any(CLEAR_PHRASES) {
            debug!("Keyword extraction: clear command");
            return Self::cleared();
        }

        let mut filters = current_filters.cloned().unwrap_or_default();

        if filters.query.is_none() {
            filters.query = Some(user_query.to_string());
        }

        apply_gender(&text, &mut filters);
        apply_category(&text, &mut filters);
        apply_sub_category(&text, &mut filters);
        apply_price(&text, &mut filters);
        apply_color(&text, &mut filters);
        apply_size(&text, &mut filters);

        filters.normalize();

        let response = response_message(&filters);
        let suggestions = suggestions(&filters);

        debug!(
            "Keyword extraction: {} -> {:?}",
            user_query, filters
        );

        ExtractionResult {
            filters,
            confidence: KEYWORD_CONFIDENCE,
            explanation: "Filters extracted using keyword matching".to_string(),
            response,
            suggestions,
            source: ExtractionSource::Local,
        }
    }
}

fn apply_gender(text: &QueryText, filters: &mut FilterState) {
    let Some(gender) = first_match(GENDER_RULES, text) else {
        return;
    };
    match gender_edit(text) {
        Edit::Union => union_into(&mut filters.gender, gender),
        Edit::Replace => filters.gender = Some(vec![gender]),
    }
}

// Gender has no explicit replace phrases: additive words union, anything else replaces.
fn gender_edit(text: &QueryText) -> Edit {
    if text.contains_any(ADDITIVE_MODIFIERS) {
        Edit::Union
    } else {
        Edit::Replace
    }
}

fn apply_category(text: &QueryText, filters: &mut FilterState) {
    let Some(category) = first_match(CATEGORY_RULES, text) else {
        return;
    };
    match category_edit(text) {
        Edit::Union => union_into(&mut filters.category, category.to_string()),
        Edit::Replace => filters.category = Some(vec![category.to_string()]),
    }
}

// Replace phrases win over additive ones.
fn category_edit(text: &QueryText) -> Edit {
    if text.contains_any(REPLACE_MODIFIERS) {
        Edit::Replace
    } else if text.contains_any(ADDITIVE_MODIFIERS) {
        Edit::Union
    } else {
        Edit::Replace
    }
}

fn apply_sub_category(text: &QueryText, filters: &mut FilterState) {
    if let Some(sub_category) = first_match(SUB_CATEGORY_RULES, text) {
        filters.sub_category = Some(vec![sub_category.to_string()]);
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<u64>().ok().map(|v| v as f64)
}

/// Three independent scans; a later scan overwrites an earlier one's bound.
fn apply_price(text: &QueryText, filters: &mut FilterState) {
    if let Some(caps) = MAX_PRICE_RE.captures(&text.lowered) {
        if let Some(max) = parse_amount(&caps[1]) {
            filters.max_price = Some(max);
        }
    }

    if let Some(caps) = MIN_PRICE_RE.captures(&text.lowered) {
        if let Some(min) = parse_amount(&caps[1]) {
            filters.min_price = Some(min);
        }
    }

    if let Some(caps) = RANGE_PRICE_RE.captures(&text.lowered) {
        if let (Some(min), Some(max)) = (parse_amount(&caps[1]), parse_amount(&caps[2])) {
            filters.min_price = Some(min);
            filters.max_price = Some(max);
        }
    }
}

fn apply_color(text: &QueryText, filters: &mut FilterState) {
    let colors = all_matches(COLOR_RULES, text);
    if !colors.is_empty() {
        filters.color = Some(colors.into_iter().map(String::from).collect());
    }
}

fn apply_size(text: &QueryText, filters: &mut FilterState) {
    let sizes = all_matches(SIZE_RULES, text);
    if !sizes.is_empty() {
        filters.size = Some(sizes.into_iter().map(String::from).collect());
    }
}
