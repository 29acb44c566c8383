//! File categories used to filter the registry view.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// MIME fragments that mark a file as a document.
const DOCUMENT_MARKERS: [&str; 5] = ["pdf", "document", "text", "sheet", "presentation"];

/// Closed set of view categories. Purely derived from `mime_type`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Documents,
    Images,
    Music,
    Videos,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::All,
        Category::Documents,
        Category::Images,
        Category::Music,
        Category::Videos,
    ];

    /// Whether a file with the given MIME type belongs to this category.
    pub fn matches(self, mime_type: &str) -> bool {
        match self {
            Category::All => true,
            Category::Documents => DOCUMENT_MARKERS
                .iter()
                .any(|marker| mime_type.contains(marker)),
            Category::Images => mime_type.starts_with("image/"),
            Category::Music => mime_type.starts_with("audio/"),
            Category::Videos => mime_type.starts_with("video/"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Documents => "documents",
            Category::Images => "images",
            Category::Music => "music",
            Category::Videos => "videos",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category `{}`", s))
    }
}
