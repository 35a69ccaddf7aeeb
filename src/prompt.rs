//! Prompt construction for model-backed extraction

use crate::types::{default_available_filters, AvailableFilters, ExtractionRequest, FilterState};

pub const NO_FILTERS_MARKER: &str = "No current filters applied";

/// Output shape the model is asked to fill in, with the catalog's canonical values
const RESPONSE_TEMPLATE: &str = r#"{
  "filters": {
    "q": "free-text search terms, only when no facet captures them",
    "gender": ["Men", "Women", "Unisex"],
    "category": ["Tops", "Bottoms", "Dresses", "Outerwear"],
    "subCategory": ["T-shirts", "Shirts", "Blouses", "Jeans", "Shorts", "Jackets", "Coats", "Polos", "Trousers"],
    "color": ["Rust Orange", "Mustard Yellow", "Pastel Pink", "Navy Blue", "White", "Beige", "Burgundy", "Olive Green", "Charcoal Gray", "Black", "Red"],
    "size": ["XS", "S", "M", "L", "XL", "XXL"],
    "minPrice": 0,
    "maxPrice": 0
  },
  "confidence": 0.95,
  "explanation": "Brief explanation of extracted filters",
  "response": "Conversational response describing what was found (use INR ₹). Do not use the word filter in the response",
  "suggestions": ["Suggestion 1 (use INR ₹)", "Suggestion 2", "Suggestion 3"]
}"#;

fn current_filters_section(filters: &FilterState) -> String {
    if filters.is_empty() {
        return NO_FILTERS_MARKER.to_string();
    }
    match serde_json::to_string_pretty(filters) {
        Ok(json) => format!("Current active filters: {}", json),
        Err(_) => NO_FILTERS_MARKER.to_string(),
    }
}

fn available_filters_section(available: Option<&AvailableFilters>) -> String {
    let available = available.cloned().unwrap_or_else(default_available_filters);
    let json = serde_json::to_string_pretty(&available).unwrap_or_else(|_| "{}".to_string());
    format!("Available filter options: {}", json)
}

fn history_section(history: &[String]) -> Option<String> {
    if history.is_empty() {
        return None;
    }
    let lines: Vec<String> = history.iter().map(|h| format!("- {}", h)).collect();
    Some(format!("Recent conversation (oldest first):\n{}", lines.join("\n")))
}

/// Build the full instruction prompt for one extraction request
pub fn build_prompt(req: &ExtractionRequest) -> String {
    let mut context = vec![
        current_filters_section(&req.current_filters),
        available_filters_section(req.available_filters.as_ref()),
    ];
    if let Some(history) = history_section(&req.history) {
        context.push(history);
    }

    format!(
        r#"You are an AI assistant that extracts product search filters from natural language queries for a fashion apparel store.

All prices and currency must be in INR (₹). Never use $ or USD. Use the ₹ symbol and Indian number grouping (e.g. ₹1,000, ₹50,000, ₹1,00,000).

User Query: "{query}"

{context}

Extract the filters from the user query and respond with a single RAW JSON object.

IMPORTANT: interpret the user query as a modification of the current filters, not as a new search:
- Additive language ("also show men", "add", "include") adds the value to the existing list for that field.
- Replacement language ("change to", "switch to", "instead") overwrites that field.
- Price changes ("make it under ₹300") update only the named bound.
- Clear or reset language ("clear all filters", "reset", "remove all") returns an empty filters object and nothing else.
- Removal of one field ("remove color filter") drops only that field and keeps every other field.
- Prefer values from the available filter options over values that are not listed.

Respond with exactly this shape (the filter values shown are the allowed examples; include only the fields that apply):
{template}"#,
        query = req.user_query,
        context = context.join("\n\n"),
        template = RESPONSE_TEMPLATE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;

    #[test]
    fn test_prompt_marks_empty_filters() {
        let req = ExtractionRequest::new("show me tops", FilterState::default());
        let prompt = build_prompt(&req);
        assert!(prompt.contains("User Query: \"show me tops\""));
        assert!(prompt.contains(NO_FILTERS_MARKER));
        assert!(prompt.contains("\"subCategory\": []"));
        assert!(!prompt.contains("Recent conversation"));
    }

    #[test]
    fn test_prompt_embeds_current_filters_and_history() {
        let current = FilterState {
            gender: Some(vec![Gender::Women]),
            max_price: Some(500.0),
            ..Default::default()
        };
        let req = ExtractionRequest::new("also show men", current)
            .with_history(vec!["women under 500".to_string()]);
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Current active filters"));
        assert!(prompt.contains("\"Women\""));
        assert!(prompt.contains("\"maxPrice\": 500.0"));
        assert!(prompt.contains("- women under 500"));
    }

    #[test]
    fn test_prompt_uses_supplied_facets() {
        let mut available = AvailableFilters::new();
        available.insert("color".to_string(), vec!["Burgundy".to_string()]);
        let req = ExtractionRequest::new("red", FilterState::default()).with_available_filters(available);
        let prompt = build_prompt(&req);
        assert!(prompt.contains("\"Burgundy\""));
        assert!(prompt.contains("INR"));
        assert!(!prompt.contains("\"size\": []"));
    }
}
