//! Type definitions for package management

use serde::{Deserialize, Serialize};

/// Package manager type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageManagerType {
    /// Windows Package Manager
    Winget,
}

impl std::fmt::Display for PackageManagerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageManagerType::Winget => write!(f, "winget"),
        }
    }
}

/// Which catalog query produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Exact full-name search
    Exact,
    /// Broader search on the first word of the name
    FirstWord,
}

/// A resolved catalog match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMatch {
    /// Package identifier, e.g. `Git.Git`
    pub id: String,
    /// Relevance score of the chosen row
    pub score: usize,
    /// Query that found it
    pub query: QueryKind,
}
