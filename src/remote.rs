//! Model-backed filter extraction: prompt, one completion call, then
//! locate, parse and validate the JSON answer

use crate::completion::CompletionClient;
use crate::error::ExtractError;
use crate::narration::MAX_SUGGESTIONS;
use crate::prompt::build_prompt;
use crate::types::{ExtractionRequest, ExtractionResult, ExtractionSource, FilterState};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_EXPLANATION: &str = "Filters extracted from query";
pub const DEFAULT_RESPONSE: &str = "Here are the products matching your criteria.";

static FENCED_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap());

/// Model answer before defaults are applied. `filters` stays raw JSON until
/// it is validated against the filter schema.
#[derive(Debug, Deserialize)]
struct RawAnswer {
    #[serde(default)]
    filters: Option<serde_json::Value>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    suggestions: Option<Vec<String>>,
}

/// Find the JSON object in completion text: a ```json fence first,
/// otherwise the span from the first `{` to the last `}`
pub fn locate_json(text: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON_RE.captures(text) {
        if let Some(body) = caps.get(1) {
            return Some(body.as_str());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn validate_filters(raw: Option<serde_json::Value>) -> Result<FilterState, ExtractError> {
    let filters = match raw {
        None | Some(serde_json::Value::Null) => FilterState::default(),
        Some(value) if !value.is_object() => {
            return Err(ExtractError::Schema(format!("filters must be an object, got {}", value)));
        }
        Some(value) => serde_json::from_value::<FilterState>(value)
            .map_err(|e| ExtractError::Schema(e.to_string()))?,
    };
    filters.validate().map_err(ExtractError::Schema)?;
    Ok(filters.normalized())
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// Parse completion text into a result, filling in defaults for missing fields
pub fn parse_completion(text: &str) -> Result<ExtractionResult, ExtractError> {
    let json = locate_json(text).ok_or(ExtractError::NoJson)?;
    let answer: RawAnswer = serde_json::from_str(json)?;

    let filters = validate_filters(answer.filters)?;

    // A zero confidence counts as unset, like a blank explanation or response.
    let confidence = answer
        .confidence
        .filter(|c| c.is_finite() && *c != 0.0)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    let mut suggestions: Vec<String> = answer
        .suggestions
        .unwrap_or_default()
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    suggestions.truncate(MAX_SUGGESTIONS);

    Ok(ExtractionResult {
        filters,
        confidence,
        explanation: non_blank(answer.explanation).unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
        response: non_blank(answer.response).unwrap_or_else(|| DEFAULT_RESPONSE.to_string()),
        suggestions,
        source: ExtractionSource::Remote,
    })
}

/// Remote extraction strategy over any completion backend
pub struct RemoteExtractor {
    client: Box<dyn CompletionClient>,
}

impl RemoteExtractor {
    pub fn new(client: Box<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn backend_name(&self) -> &'static str {
        self.client.name()
    }

    pub async fn extract(&self, req: &ExtractionRequest) -> Result<ExtractionResult, ExtractError> {
        let prompt = build_prompt(req);
        debug!(
            "Remote extraction via {}: prompt of {} chars",
            self.client.name(),
            prompt.len()
        );

        let text = self.client.complete(&prompt).await?;
        parse_completion(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletion;
    use crate::types::Gender;

    #[test]
    fn test_locate_fenced_json() {
        let text = "Sure!\n```json\n{\"filters\": {}}\n```\nAnything else?";
        assert_eq!(locate_json(text), Some("{\"filters\": {}}"));
    }

    #[test]
    fn test_locate_bare_json() {
        let text = "Result: {\"confidence\": 0.8} done";
        assert_eq!(locate_json(text), Some("{\"confidence\": 0.8}"));
        assert_eq!(locate_json("no braces here"), None);
        assert_eq!(locate_json("} backwards {"), None);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let result = parse_completion("{}").unwrap();
        assert!(result.filters.is_empty());
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(result.explanation, DEFAULT_EXPLANATION);
        assert_eq!(result.response, DEFAULT_RESPONSE);
        assert!(result.suggestions.is_empty());
        assert_eq!(result.source, ExtractionSource::Remote);
    }

    #[test]
    fn test_full_answer() {
        let text = r#"```json
{
  "filters": {"gender": ["Women", "Women"], "category": ["Dresses"], "color": [], "maxPrice": 2000},
  "confidence": 0.92,
  "explanation": "women's dresses under 2000",
  "response": "Here are women's dresses under ₹2,000.",
  "suggestions": ["Also show Men", "Show red dresses", "Make it under ₹1,500", "One too many"]
}
```"#;
        let result = parse_completion(text).unwrap();
        assert_eq!(result.filters.gender, Some(vec![Gender::Women]));
        assert_eq!(result.filters.color, None);
        assert_eq!(result.filters.max_price, Some(2000.0));
        assert_eq!(result.confidence, 0.92);
        assert_eq!(result.suggestions.len(), 3);
    }

    #[test]
    fn test_zero_and_blank_fields_take_defaults() {
        let result =
            parse_completion(r#"{"confidence": 0, "explanation": "", "response": "  "}"#).unwrap();
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(result.explanation, DEFAULT_EXPLANATION);
        assert_eq!(result.response, DEFAULT_RESPONSE);
    }

    #[test]
    fn test_confidence_clamped() {
        let result = parse_completion(r#"{"confidence": 7}"#).unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_schema_violation() {
        let err = parse_completion(r#"{"filters": {"price": {"$lte": 500}}}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Schema(_)));

        let err = parse_completion(r#"{"filters": {"maxPrice": -1}}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Schema(_)));

        let err = parse_completion(r#"{"filters": ["Tops"]}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Schema(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_completion("{not json}").unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
        let err = parse_completion("I could not help with that").unwrap_err();
        assert!(matches!(err, ExtractError::NoJson));
    }

    #[tokio::test]
    async fn test_extract_through_mock() {
        let extractor = RemoteExtractor::new(Box::new(MockCompletion::canned(
            r#"{"filters": {"size": "M"}, "response": "Size M it is."}"#,
        )));
        let req = ExtractionRequest::new("medium please", FilterState::default());
        let result = extractor.extract(&req).await.unwrap();
        assert_eq!(result.filters.size, Some(vec!["M".to_string()]));
        assert_eq!(result.response, "Size M it is.");
    }

    #[tokio::test]
    async fn test_extract_propagates_backend_error() {
        let extractor = RemoteExtractor::new(Box::new(MockCompletion::failing(503)));
        let req = ExtractionRequest::new("tops", FilterState::default());
        let err = extractor.extract(&req).await.unwrap_err();
        assert!(matches!(err, ExtractError::Status { status: 503, .. }));
    }
}
