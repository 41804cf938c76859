#![warn(missing_docs)]
//! Shared fixtures for dispatcher and integration tests: scratch stores, a
//! deterministic template catalog, a canned stats provider, and outbox helpers.

use async_trait::async_trait;
use sbechat_core::Outbound;
use sbechat_stats::{FetchError, StatsProvider, StatsQuery};
use sbechat_store::Store;
use sbechat_templates::{catalog_from_str, Catalog};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// One template per bucket, each naming its bucket, so rendered output is predictable.
pub const SAMPLE_CATALOG: &str = r#"{
    "rng": {
        "low": ["${playerName} rng low ${rng}${dropString}"],
        "medium": ["${playerName} rng medium ${rng}${dropString}"],
        "high": ["${playerName} rng high ${rng}${dropString}"]
    },
    "throw": {
        "low": ["${playerName} throw low ${throwIntensity}"],
        "medium": ["${playerName} throw medium ${throwIntensity}"],
        "high": ["${playerName} throw high ${throwIntensity}"]
    },
    "cf": {
        "heads": ["${playerName} cf heads"],
        "tails": ["${playerName} cf tails"]
    },
    "dice": {
        "low": ["${playerName} dice low ${result}"],
        "medium": ["${playerName} dice medium ${result}"],
        "high": ["${playerName} dice high ${result}"]
    },
    "simp": {
        "low": ["${playerName} simp low ${percentage}"],
        "medium": ["${playerName} simp medium ${percentage}"],
        "high": ["${playerName} simp high ${percentage}"]
    },
    "sus": {
        "low": ["${playerName} sus low ${percentage}"],
        "medium": ["${playerName} sus medium ${percentage}"],
        "high": ["${playerName} sus high ${percentage}"]
    },
    "8ballResponses": ["8ball answer"],
    "meow": ["meow total ${total}"]
}"#;

/// Parsed [`SAMPLE_CATALOG`].
pub fn sample_catalog() -> Catalog {
    match catalog_from_str(SAMPLE_CATALOG) {
        Ok(catalog) => catalog,
        Err(err) => panic!("sample catalog must parse: {err}"),
    }
}

/// A store backed by a file in a fresh temp dir. Keep the dir alive for the test.
pub fn scratch_store() -> (TempDir, Store) {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    };
    let store = Store::open(dir.path().join("data").join("store.json"));
    (dir, store)
}

/// Everything currently queued on the outbox.
pub fn drain(rx: &mut UnboundedReceiver<Outbound>) -> Vec<Outbound> {
    let mut out = Vec::new();
    while let Ok(item) = rx.try_recv() {
        out.push(item);
    }
    out
}

/// Text of every `Chat` item, in order.
pub fn chat_lines(items: &[Outbound]) -> Vec<&str> {
    items
        .iter()
        .filter_map(|item| match item {
            Outbound::Chat(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Text of every `Notice` item, in order.
pub fn notices(items: &[Outbound]) -> Vec<&str> {
    items
        .iter()
        .filter_map(|item| match item {
            Outbound::Notice(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// [`StatsProvider`] answering from a table keyed by query kind.
///
/// Kinds without an entry fail with `NotFound`. Every query is recorded.
#[derive(Debug, Clone, Default)]
pub struct CannedStats {
    responses: HashMap<&'static str, Value>,
    calls: Arc<Mutex<Vec<StatsQuery>>>,
}

impl CannedStats {
    /// Provider with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries of `kind` (see [`StatsQuery::kind`]) with `value`.
    pub fn with(mut self, kind: &'static str, value: Value) -> Self {
        self.responses.insert(kind, value);
        self
    }

    /// Queries received so far.
    pub fn calls(&self) -> Vec<StatsQuery> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl StatsProvider for CannedStats {
    async fn fetch(&self, query: &StatsQuery) -> Result<Value, FetchError> {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(query.clone()),
            Err(poisoned) => poisoned.into_inner().push(query.clone()),
        }
        self.responses
            .get(query.kind())
            .cloned()
            .ok_or_else(|| FetchError::NotFound(query.to_string()))
    }
}
