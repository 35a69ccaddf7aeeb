//! EcoFit filter assistant
//!
//! Turns free-text shopper input into structured catalog filters with
//! conversational refinement:
//! - Model-backed extraction with strict output validation
//! - Keyword fallback that never fails
//! - Add / replace / clear edit semantics over the current filter state
//! - Response text, follow-up suggestions, URL and search-index mapping

pub mod types;
pub mod error;
pub mod config;
pub mod vocabulary;
pub mod keyword;
pub mod narration;
pub mod prompt;
pub mod completion;
pub mod gemini;
pub mod remote;
pub mod engine;
pub mod url_params;
pub mod applied;
pub mod facets;
pub mod chat;
pub mod server;

pub use types::*;
pub use error::ExtractError;
pub use config::EngineConfig;
pub use engine::{FilterEngine, SharedFilterEngine};
pub use keyword::KeywordExtractor;
pub use completion::{CompletionClient, MockCompletion};
pub use gemini::GeminiClient;
pub use remote::RemoteExtractor;
pub use url_params::{build_search_url, filters_from_url_params, filters_to_url_params};
pub use applied::{AppliedFilters, PriceRange};
pub use chat::{ChatSession, ChatTurn, ChatError};
