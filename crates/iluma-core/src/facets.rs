use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Checkbox,
    Multiselect,
    Range,
}

impl std::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetKind::Checkbox => write!(f, "checkbox"),
            FacetKind::Multiselect => write!(f, "multiselect"),
            FacetKind::Range => write!(f, "range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
}

/// One control of the filter sidebar. `id` is the filter key it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetDef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FacetKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FacetOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFacets {
    pub title: String,
    pub filters: Vec<FacetDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetsFile {
    pub categories: BTreeMap<String, CategoryFacets>,
}

impl FacetsFile {
    #[must_use]
    pub fn for_category(&self, category: Category) -> Option<&CategoryFacets> {
        self.categories.get(category.as_str())
    }
}

/// Load and validate the filter facet definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_facets(path: &Path) -> Result<FacetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FacetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let facets_file: FacetsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::FacetsFileParse)?;

    validate_facets(&facets_file)?;

    Ok(facets_file)
}

fn validate_facets(facets_file: &FacetsFile) -> Result<(), ConfigError> {
    for (key, facets) in &facets_file.categories {
        if key.parse::<Category>().is_err() {
            return Err(ConfigError::Validation(format!(
                "unknown category '{key}'; expected terea, iqos or devices"
            )));
        }

        let mut seen_ids = HashSet::new();
        for facet in &facets.filters {
            if facet.id.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{key}' has a filter with an empty id"
                )));
            }
            if !seen_ids.insert(facet.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate filter id '{}' in category '{key}'",
                    facet.id
                )));
            }
            validate_facet(key, facet)?;
        }
    }

    Ok(())
}

fn validate_facet(category: &str, facet: &FacetDef) -> Result<(), ConfigError> {
    match facet.kind {
        FacetKind::Checkbox | FacetKind::Multiselect => {
            if facet.options.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{} filter '{}' in category '{category}' has no options",
                    facet.kind, facet.id
                )));
            }
        }
        FacetKind::Range => {
            let (Some(min), Some(max)) = (facet.min, facet.max) else {
                return Err(ConfigError::Validation(format!(
                    "range filter '{}' in category '{category}' needs min and max",
                    facet.id
                )));
            };
            if min >= max {
                return Err(ConfigError::Validation(format!(
                    "range filter '{}' in category '{category}' has min {min} >= max {max}",
                    facet.id
                )));
            }
            if facet.step.is_some_and(|step| step <= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "range filter '{}' in category '{category}' has a non-positive step",
                    facet.id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "facets_test.rs"]
mod tests;
