//! Search backend selection from the `SEARCH_API` environment variable.

use serde::Serialize;
use tracing::warn;

/// Web search backend used by research agents. Defaults to Tavily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEngine {
    #[default]
    Tavily,
    DuckDuckGo,
    BraveSearch,
    Arxiv,
    Searx,
    Wikipedia,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tavily => "tavily",
            Self::DuckDuckGo => "duckduckgo",
            Self::BraveSearch => "brave_search",
            Self::Arxiv => "arxiv",
            Self::Searx => "searx",
            Self::Wikipedia => "wikipedia",
        }
    }

    /// Parses a backend name, falling back to Tavily for unknown values.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };
        match raw.to_lowercase().as_str() {
            "tavily" => Self::Tavily,
            "duckduckgo" => Self::DuckDuckGo,
            "brave_search" => Self::BraveSearch,
            "arxiv" => Self::Arxiv,
            "searx" => Self::Searx,
            "wikipedia" => Self::Wikipedia,
            other => {
                warn!(value = other, "unknown search engine, using tavily");
                Self::default()
            }
        }
    }
}

impl std::fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
