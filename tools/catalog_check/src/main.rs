use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use sbechat_templates::{catalog_from_file, Catalog, Category};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Template catalog checker for sbechat", long_about = None)]
struct Args {
    /// Catalog to check
    #[arg(default_value = "data/templates.json")]
    input: PathBuf,

    /// Write a JSON summary to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Only print problems
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    categories: Vec<CategorySummary>,
    unused_keys: Vec<String>,
    problems: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CategorySummary {
    key: &'static str,
    buckets: Vec<BucketSummary>,
}

#[derive(Debug, Serialize)]
struct BucketSummary {
    name: Option<&'static str>,
    templates: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let catalog = catalog_from_file(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let report = summarize(&catalog);

    if !args.quiet {
        for category in &report.categories {
            let counts: Vec<String> = category
                .buckets
                .iter()
                .map(|b| match b.name {
                    Some(name) => format!("{name}={}", b.templates),
                    None => b.templates.to_string(),
                })
                .collect();
            println!("{:<16} {}", category.key, counts.join(" "));
        }
        for key in &report.unused_keys {
            println!("{key:<16} (not used by any command)");
        }
    }
    for problem in &report.problems {
        eprintln!("problem: {problem}");
    }

    if let Some(path) = &args.report {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {parent:?}"))?;
            }
        }
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    if !report.problems.is_empty() {
        bail!(
            "{} problem(s) in {}",
            report.problems.len(),
            args.input.display()
        );
    }
    Ok(())
}

fn summarize(catalog: &Catalog) -> Report {
    let categories = Category::ALL
        .iter()
        .map(|category| {
            let node = catalog.get(category.key());
            let count = |bucket: Option<&str>| {
                node.and_then(|n| n.list(bucket)).map_or(0, <[String]>::len)
            };
            let buckets = if category.bucket_names().is_empty() {
                vec![BucketSummary {
                    name: None,
                    templates: count(None),
                }]
            } else {
                category
                    .bucket_names()
                    .iter()
                    .map(|name| BucketSummary {
                        name: Some(*name),
                        templates: count(Some(*name)),
                    })
                    .collect()
            };
            CategorySummary {
                key: category.key(),
                buckets,
            }
        })
        .collect();
    let unused_keys = catalog
        .keys()
        .filter(|key| Category::from_key(key).is_none())
        .map(str::to_string)
        .collect();
    let problems = catalog.problems().iter().map(|p| p.to_string()).collect();
    Report {
        categories,
        unused_keys,
        problems,
    }
}
