use std::path::Path;

use sbechat_dispatch::{builtin_registry, DispatchSettings};
use sbechat_stats::StatsSettings;
use sbechat_templates::{catalog_from_file, Category};

fn repo_file(relative: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn shipped_config_matches_defaults() {
    let text = std::fs::read_to_string(repo_file("config/sbechat.toml")).expect("config exists");
    let doc: toml::Table = toml::from_str(&text).expect("config is valid TOML");

    let dispatch: DispatchSettings = doc["dispatch"]
        .clone()
        .try_into()
        .expect("dispatch table");
    assert_eq!(dispatch, DispatchSettings::default());

    let stats: StatsSettings = doc["stats"].clone().try_into().expect("stats table");
    assert_eq!(stats.base_url, StatsSettings::default().base_url);
    assert_eq!(stats.timeout_ms, 10_000);
}

#[test]
fn shipped_config_lists_every_command_toggle() {
    let text = std::fs::read_to_string(repo_file("config/sbechat.toml")).expect("config exists");
    let doc: toml::Table = toml::from_str(&text).expect("config is valid TOML");
    let toggles = doc["dispatch"]["commands"]
        .as_table()
        .expect("commands table");
    let registry = builtin_registry();
    for name in registry.canonical_names() {
        let key = registry.by_canonical(name).expect("registered").config_key;
        assert!(toggles.contains_key(key), "config is missing {key}");
    }
}

#[test]
fn shipped_catalog_is_clean() {
    let catalog = catalog_from_file(&repo_file("data/templates.json")).expect("catalog parses");
    assert!(catalog.problems().is_empty(), "{:?}", catalog.problems());
    for category in Category::ALL {
        assert!(catalog.get(category.key()).is_some(), "{category} missing");
    }
}
