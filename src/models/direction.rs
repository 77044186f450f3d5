//! Language and layout direction
//!
//! Hebrew pages run right-to-left, so the timeline sits near the right
//! edge; English pages get it near the left edge.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GliderError;

/// Site language, as passed in by the host page
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "he")]
    Hebrew,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn direction(self) -> Direction {
        match self {
            Language::Hebrew => Direction::End,
            Language::English => Direction::Start,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Hebrew => "he",
            Language::English => "en",
        }
    }
}

impl FromStr for Language {
    type Err = GliderError;

    /// Accepts bare codes and region-tagged ones ("he", "he-IL", "en-US")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s.split(['-', '_']).next().unwrap_or("").to_ascii_lowercase();
        match primary.as_str() {
            "he" | "iw" => Ok(Language::Hebrew),
            "en" => Ok(Language::English),
            _ => Err(GliderError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Which edge of the container the timeline hugs
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Left edge (left-to-right text)
    Start,
    /// Right edge (right-to-left text)
    End,
}

impl Direction {
    /// Horizontal position of the line and dots, percent of container width
    pub fn x_percent(self, edge_inset: f64) -> f64 {
        match self {
            Direction::Start => edge_inset,
            Direction::End => 100.0 - edge_inset,
        }
    }

    /// CSS side name ("left" / "right")
    pub fn side(self) -> &'static str {
        match self {
            Direction::Start => "left",
            Direction::End => "right",
        }
    }
}
