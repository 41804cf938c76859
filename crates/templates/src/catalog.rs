use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Category, TemplateError};

/// One catalog entry as it appears in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TemplateNode {
    /// Plain list of templates.
    Flat(Vec<String>),
    /// Named buckets of templates.
    Buckets(BTreeMap<String, Vec<String>>),
    /// Anything else; rendering from it fails with `NotAnArray`.
    Other(serde_json::Value),
}

impl TemplateNode {
    /// Template list for `bucket` (or the flat list when `bucket` is `None`).
    pub fn list(&self, bucket: Option<&str>) -> Option<&[String]> {
        match (self, bucket) {
            (Self::Flat(list), None) => Some(list),
            (Self::Buckets(buckets), Some(name)) => buckets.get(name).map(Vec::as_slice),
            _ => None,
        }
    }
}

/// Parsed template catalog keyed by category key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, TemplateNode>,
}

impl Catalog {
    /// Entry for a category key.
    pub fn get(&self, key: &str) -> Option<&TemplateNode> {
        self.entries.get(key)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every problem that would make a built-in category fail to render.
    pub fn problems(&self) -> Vec<TemplateError> {
        let mut problems = Vec::new();
        for category in Category::ALL {
            let Some(node) = self.get(category.key()) else {
                problems.push(TemplateError::UnknownCategory(category.key().to_string()));
                continue;
            };
            let buckets: Vec<Option<&str>> = if category.bucket_names().is_empty() {
                vec![None]
            } else {
                category.bucket_names().iter().copied().map(Some).collect()
            };
            for bucket in buckets {
                match node.list(bucket) {
                    None => problems.push(TemplateError::NotAnArray {
                        category: category.key(),
                        bucket: bucket.map(str::to_string),
                    }),
                    Some([]) => problems.push(TemplateError::EmptyBucket {
                        category: category.key(),
                        bucket: bucket.map(str::to_string),
                    }),
                    Some(_) => {}
                }
            }
        }
        problems
    }
}

/// Parse a catalog from JSON text.
pub fn catalog_from_str(input: &str) -> Result<Catalog, TemplateError> {
    Ok(serde_json::from_str(input)?)
}

/// Read and parse a catalog file.
pub fn catalog_from_file(path: &Path) -> Result<Catalog, TemplateError> {
    let data = fs::read_to_string(path)?;
    catalog_from_str(&data)
}

/// Load a catalog, falling back to an empty one (with a warning) when the file is
/// missing or malformed. Commands whose category is then absent log and send nothing.
pub fn load_catalog_or_empty(path: &Path) -> Catalog {
    match catalog_from_file(path) {
        Ok(catalog) => {
            debug!(path = %path.display(), entries = catalog.len(), "loaded template catalog");
            catalog
        }
        Err(err) => {
            warn!(path = %path.display(), "Failed to load template catalog: {err}. Using empty catalog");
            Catalog::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = r#"{
        "rng": {"low": ["a"], "medium": ["b"], "high": ["c"]},
        "throw": {"low": ["a"], "medium": ["b"], "high": ["c"]},
        "cf": {"heads": ["h"], "tails": ["t"]},
        "dice": {"low": ["a"], "medium": ["b"], "high": ["c"]},
        "simp": {"low": ["a"], "medium": ["b"], "high": ["c"]},
        "sus": {"low": ["a"], "medium": ["b"], "high": ["c"]},
        "8ballResponses": ["yes"],
        "meow": ["meow"],
        "extraNotes": "ignored"
    }"#;

    #[test]
    fn complete_catalog_has_no_problems() {
        let catalog = catalog_from_str(COMPLETE).unwrap();
        assert!(catalog.problems().is_empty(), "{:?}", catalog.problems());
        assert!(matches!(catalog.get("extraNotes"), Some(TemplateNode::Other(_))));
    }

    #[test]
    fn problems_name_each_gap() {
        let catalog = catalog_from_str(
            r#"{"rng": {"low": [], "medium": ["b"]}, "meow": {"low": ["x"]}}"#,
        )
        .unwrap();
        let problems = catalog.problems();
        assert!(problems.iter().any(|p| matches!(p, TemplateError::EmptyBucket { category: "rng", bucket: Some(b) } if b == "low")));
        assert!(problems.iter().any(|p| matches!(p, TemplateError::NotAnArray { category: "rng", bucket: Some(b) } if b == "high")));
        assert!(problems.iter().any(|p| matches!(p, TemplateError::NotAnArray { category: "meow", bucket: None })));
        assert!(problems.iter().any(|p| matches!(p, TemplateError::UnknownCategory(k) if k == "cf")));
    }

    #[test]
    fn missing_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = load_catalog_or_empty(&dir.path().join("missing.json"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(load_catalog_or_empty(&path).is_empty());
        assert!(matches!(catalog_from_file(&path), Err(TemplateError::Parse(_))));
    }

    #[test]
    fn shipped_catalog_is_complete() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/templates.json");
        let catalog = catalog_from_file(&path).unwrap();
        assert!(catalog.problems().is_empty(), "{:?}", catalog.problems());
    }
}
