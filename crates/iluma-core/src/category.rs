use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Top-level product grouping exposed by the upstream product API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Terea,
    Iqos,
    Devices,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Terea, Category::Iqos, Category::Devices];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Terea => "terea",
            Category::Iqos => "iqos",
            Category::Devices => "devices",
        }
    }

    /// Resolves a path segment to a category, falling back to `terea` for
    /// anything unrecognized.
    #[must_use]
    pub fn from_slug_or_default(slug: &str) -> Self {
        slug.parse().unwrap_or_else(|_| {
            tracing::warn!(slug, "unknown category, falling back to terea");
            Category::Terea
        })
    }

    /// `true` for categories whose `brand` filter reads `category.category_name`.
    #[must_use]
    pub fn is_hardware(self) -> bool {
        matches!(self, Category::Iqos | Category::Devices)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "terea" => Ok(Category::Terea),
            "iqos" => Ok(Category::Iqos),
            "devices" => Ok(Category::Devices),
            _ => Err(CoreError::UnknownCategory(s.to_string())),
        }
    }
}
