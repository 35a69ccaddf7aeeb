//! Chat-turn orchestration around the filter engine.
//!
//! One extraction per message, no overlapping turns, and a rolling window of
//! recent utterances handed to the engine as conversational context.

use crate::engine::SharedFilterEngine;
use crate::types::{AvailableFilters, ExtractionRequest, ExtractionResult};
use crate::url_params::{build_search_url, filters_from_url_params};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// How many past user messages are kept as context
pub const HISTORY_WINDOW: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChatError {
    #[error("a message is already being processed")]
    Busy,

    #[error("message is empty")]
    EmptyMessage,
}

/// Outcome of one chat turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub result: ExtractionResult,
    /// Search page to open, set when the turn produced any filters
    pub navigate_to: Option<String>,
}

/// Clears the busy flag when the turn ends, including on cancellation
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatSession {
    engine: SharedFilterEngine,
    history: Mutex<VecDeque<String>>,
    busy: AtomicBool,
    available_filters: Option<AvailableFilters>,
}

impl ChatSession {
    pub fn new(engine: SharedFilterEngine) -> Self {
        Self {
            engine,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_WINDOW)),
            busy: AtomicBool::new(false),
            available_filters: None,
        }
    }

    pub fn with_available_filters(mut self, available: AvailableFilters) -> Self {
        self.available_filters = Some(available);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Recent user messages, oldest first
    pub fn history(&self) -> Vec<String> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.iter().cloned().collect()
    }

    fn remember(&self, message: &str) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.len() == HISTORY_WINDOW {
            history.pop_front();
        }
        history.push_back(message.to_string());
    }

    /// Handle one user message against the filters of the page currently shown
    pub async fn send<K, V>(&self, message: &str, page_params: &[(K, V)]) -> Result<ChatTurn, ChatError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Rejecting message while another is pending");
            return Err(ChatError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let current_filters = filters_from_url_params(page_params);
        let mut req = ExtractionRequest::new(message, current_filters).with_history(self.history());
        req.available_filters = self.available_filters.clone();

        self.remember(message);

        let result = self.engine.extract_filters(&req).await;
        let navigate_to = if result.filters.is_empty() {
            None
        } else {
            Some(build_search_url(&result.filters))
        };

        info!("Chat turn handled: navigate_to={:?}", navigate_to);

        Ok(ChatTurn { result, navigate_to })
    }
}
