//! Top-level navigation views.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four top-level screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Headline figures and charts.
    #[default]
    Overview,
    /// The searchable, sortable records table.
    Records,
    /// AI narrative insights.
    Ai,
    /// Data management (sample generation, reset).
    Settings,
}

impl View {
    /// Returns all views in navigation order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Overview, Self::Records, Self::Ai, Self::Settings]
    }

    /// Returns the view name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Records => "records",
            Self::Ai => "ai",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
