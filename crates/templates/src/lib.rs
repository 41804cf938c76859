#![warn(missing_docs)]
//! Randomized chat message templates.
//!
//! A catalog maps category keys to either a flat list of templates or a set of named
//! buckets. Each [`Category`] knows how to pick its bucket from the render variables;
//! one template is then drawn uniformly and its `${name}` placeholders filled in.

mod catalog;
mod substitute;

pub use catalog::{catalog_from_file, catalog_from_str, load_catalog_or_empty, Catalog, TemplateNode};
pub use substitute::substitute;

use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Template categories used by the built-in commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `!rng` rolls.
    Rng,
    /// `!throw` intensity.
    Throw,
    /// `!cf` heads/tails.
    Coinflip,
    /// `!dice` rolls.
    Dice,
    /// `!simp` percentage.
    Simp,
    /// `!sus` percentage.
    Sus,
    /// `!8ball` answers.
    EightBall,
    /// `!meow` total.
    Meow,
}

/// How a category resolves the template list it draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector {
    /// The catalog entry is the list.
    Flat,
    /// Numeric variable picks `low` (≤ first), `medium` (≤ second) or `high`.
    Threshold {
        variable: &'static str,
        low: i64,
        medium: i64,
    },
    /// The variable's value names the bucket.
    Named { variable: &'static str },
}

impl Category {
    /// Every category, in catalog order.
    pub const ALL: [Category; 8] = [
        Category::Rng,
        Category::Throw,
        Category::Coinflip,
        Category::Dice,
        Category::Simp,
        Category::Sus,
        Category::EightBall,
        Category::Meow,
    ];

    /// Key of this category in the catalog file.
    pub fn key(self) -> &'static str {
        match self {
            Category::Rng => "rng",
            Category::Throw => "throw",
            Category::Coinflip => "cf",
            Category::Dice => "dice",
            Category::Simp => "simp",
            Category::Sus => "sus",
            Category::EightBall => "8ballResponses",
            Category::Meow => "meow",
        }
    }

    /// Reverse of [`Category::key`].
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    /// Bucket names the catalog must provide for this category; empty for flat lists.
    pub fn bucket_names(self) -> &'static [&'static str] {
        match self.selector() {
            Selector::Flat => &[],
            Selector::Threshold { .. } => &["low", "medium", "high"],
            Selector::Named { .. } => &["heads", "tails"],
        }
    }

    fn selector(self) -> Selector {
        match self {
            Category::Rng => Selector::Threshold {
                variable: "rng",
                low: 30,
                medium: 70,
            },
            Category::Throw => Selector::Threshold {
                variable: "throwIntensity",
                low: 30,
                medium: 70,
            },
            Category::Simp | Category::Sus => Selector::Threshold {
                variable: "percentage",
                low: 33,
                medium: 66,
            },
            Category::Dice => Selector::Threshold {
                variable: "result",
                low: 2,
                medium: 4,
            },
            Category::Coinflip => Selector::Named { variable: "result" },
            Category::EightBall | Category::Meow => Selector::Flat,
        }
    }

    /// Bucket to draw from given `vars`, or `None` for flat categories.
    pub fn bucket(self, vars: &Vars) -> Result<Option<String>, TemplateError> {
        match self.selector() {
            Selector::Flat => Ok(None),
            Selector::Threshold {
                variable,
                low,
                medium,
            } => {
                let value = vars.number(variable).ok_or(TemplateError::MissingSelector {
                    category: self.key(),
                    variable,
                })?;
                let bucket = if value <= low {
                    "low"
                } else if value <= medium {
                    "medium"
                } else {
                    "high"
                };
                Ok(Some(bucket.to_string()))
            }
            Selector::Named { variable } => vars
                .get(variable)
                .map(|name| Some(name.to_string()))
                .ok_or(TemplateError::MissingSelector {
                    category: self.key(),
                    variable,
                }),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Named values available to a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars {
    values: BTreeMap<String, String>,
}

impl Vars {
    /// Empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: &str, value: impl ToString) {
        self.values.insert(name.to_string(), value.to_string());
    }

    /// Raw value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value parsed as an integer.
    pub fn number(&self, name: &str) -> Option<i64> {
        self.get(name)?.trim().parse().ok()
    }
}

/// Template lookup and rendering failures.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The catalog has no entry for the category.
    #[error("no templates for category `{0}`")]
    UnknownCategory(String),
    /// The entry (or bucket) is not a list of strings.
    #[error("templates for `{category}`{} are not an array of strings", bucket_suffix(.bucket))]
    NotAnArray {
        /// Category key.
        category: &'static str,
        /// Bucket, when the category is bucketed.
        bucket: Option<String>,
    },
    /// The resolved list has no templates.
    #[error("templates for `{category}`{} are empty", bucket_suffix(.bucket))]
    EmptyBucket {
        /// Category key.
        category: &'static str,
        /// Bucket, when the category is bucketed.
        bucket: Option<String>,
    },
    /// The variable that selects the bucket is missing or malformed.
    #[error("`{category}` needs variable `{variable}` to pick a bucket")]
    MissingSelector {
        /// Category key.
        category: &'static str,
        /// Selector variable.
        variable: &'static str,
    },
    /// Reading the catalog file failed.
    #[error("failed to read template catalog: {0}")]
    Io(#[from] std::io::Error),
    /// The catalog file is not valid JSON.
    #[error("failed to parse template catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

fn bucket_suffix(bucket: &Option<String>) -> String {
    bucket
        .as_ref()
        .map(|name| format!(" (bucket `{name}`)"))
        .unwrap_or_default()
}

/// Renders templates from a catalog.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    catalog: Catalog,
}

impl TemplateEngine {
    /// Wrap a loaded catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve the template list for `category` under `vars`.
    pub fn templates(&self, category: Category, vars: &Vars) -> Result<&[String], TemplateError> {
        let node = self
            .catalog
            .get(category.key())
            .ok_or_else(|| TemplateError::UnknownCategory(category.key().to_string()))?;
        let bucket = category.bucket(vars)?;
        let list = node.list(bucket.as_deref()).ok_or_else(|| TemplateError::NotAnArray {
            category: category.key(),
            bucket: bucket.clone(),
        })?;
        if list.is_empty() {
            return Err(TemplateError::EmptyBucket {
                category: category.key(),
                bucket,
            });
        }
        Ok(list)
    }

    /// Draw one template uniformly and substitute `vars` into it.
    pub fn render<R: Rng + ?Sized>(
        &self,
        category: Category,
        vars: &Vars,
        rng: &mut R,
    ) -> Result<String, TemplateError> {
        let list = self.templates(category, vars)?;
        let template = &list[rng.gen_range(0..list.len())];
        Ok(substitute(template, vars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn engine() -> TemplateEngine {
        let catalog = catalog_from_str(
            r#"{
                "rng": {"low": ["low ${rng}"], "medium": ["mid ${rng}"], "high": ["high ${rng}"]},
                "cf": {"heads": ["${playerName} got heads"], "tails": ["${playerName} got tails"]},
                "dice": {"low": ["l"], "medium": ["m"], "high": []},
                "simp": ["not bucketed"],
                "8ballResponses": ["yes", "no", "maybe"],
                "meow": ["meow #${total}"]
            }"#,
        )
        .unwrap();
        TemplateEngine::new(catalog)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn rng_thresholds_pick_buckets() {
        let engine = engine();
        let mut rng = rng();
        for (roll, expected) in [(0, "low 0"), (30, "low 30"), (31, "mid 31"), (70, "mid 70"), (71, "high 71"), (100, "high 100")] {
            let vars = Vars::new().with("rng", roll);
            assert_eq!(engine.render(Category::Rng, &vars, &mut rng).unwrap(), expected);
        }
    }

    #[test]
    fn coinflip_uses_named_bucket() {
        let engine = engine();
        let vars = Vars::new().with("playerName", "steve").with("result", "tails");
        assert_eq!(
            engine.render(Category::Coinflip, &vars, &mut rng()).unwrap(),
            "steve got tails"
        );
    }

    #[test]
    fn flat_category_draws_every_entry() {
        let engine = engine();
        let mut rng = rng();
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(engine.render(Category::EightBall, &Vars::new(), &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn missing_category_is_unknown() {
        let err = engine()
            .render(Category::Throw, &Vars::new().with("throwIntensity", 5), &mut rng())
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownCategory(key) if key == "throw"));
    }

    #[test]
    fn empty_bucket_is_an_error() {
        let err = engine()
            .render(Category::Dice, &Vars::new().with("result", 6), &mut rng())
            .unwrap_err();
        assert!(matches!(err, TemplateError::EmptyBucket { category: "dice", .. }));
    }

    #[test]
    fn bucketed_category_with_flat_entry_is_not_an_array() {
        let err = engine()
            .render(Category::Simp, &Vars::new().with("percentage", 50), &mut rng())
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotAnArray { category: "simp", .. }));
    }

    #[test]
    fn missing_selector_is_reported() {
        let err = engine()
            .render(Category::Rng, &Vars::new(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, TemplateError::MissingSelector { variable: "rng", .. }));
    }

    #[test]
    fn category_keys_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_key(category.key()), Some(category));
        }
        assert_eq!(Category::from_key("nope"), None);
    }
}
