//! Application state.
//!
//! Everything the screens derive from but nothing persists: where the user
//! is, what they searched for, how the table is sorted and the last AI
//! narrative. The busy flag is [`AiGateway::is_busy`] on the gateway that
//! serves this state, so there is one source for it.

use crate::models::{SortField, SortState, Student, View};
use crate::services::{AiGateway, InsightOutcome, query};

/// Derived, non-persisted application state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    /// Current view.
    pub view: View,
    /// Search term applied to the records table.
    pub search_term: String,
    /// Sort applied to the records table.
    pub sort: SortState,
    /// Last AI narrative shown to the user.
    pub insights: Option<String>,
}

impl AppState {
    /// Creates the initial state: overview, no search, name ascending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to another view. Search and sort survive navigation.
    pub fn navigate(&mut self, view: View) {
        tracing::debug!(from = %self.view, to = %view, "Navigating");
        self.view = view;
    }

    /// Replaces the search term.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Applies a header click: same field flips the order, another field
    /// resets to ascending.
    pub fn select_sort_field(&mut self, field: SortField) {
        self.sort.toggle(field);
    }

    /// Records the outcome of an insight request.
    pub fn set_insights(&mut self, outcome: InsightOutcome) {
        self.insights = Some(outcome.into_message());
    }

    /// Asks `gateway` for a fresh narrative over `records` and keeps its
    /// message. The gateway reports busy until this returns.
    pub fn refresh_insights(&mut self, gateway: &AiGateway, records: &[Student]) -> &str {
        self.set_insights(gateway.request_insights(records));
        self.insights.as_deref().unwrap_or_default()
    }

    /// Returns the records table as currently filtered and sorted.
    #[must_use]
    pub fn visible<'a>(&self, records: &'a [Student]) -> Vec<&'a Student> {
        query::view_sorted(records, &self.search_term, self.sort)
    }
}
