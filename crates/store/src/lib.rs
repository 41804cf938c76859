#![warn(missing_docs)]
//! Persistent bot state: counters, moderation lists, quotes and operator progress.
//!
//! Everything lives in a single JSON document that is rewritten wholesale after every
//! mutation, so an abrupt exit loses at most the mutation in flight. Writes that fail
//! are logged and leave the in-memory record authoritative until the next successful
//! save.

pub mod achievements;

pub use achievements::{
    AchievementDefinition, Progress, Trigger, TriggerKind, ACHIEVEMENTS, COMMAND_MASTER_REQUIRED,
};

use anyhow::{Context, Result};
use sbechat_core::{Millis, Username};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default location of the store relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "data/store.json";

/// Progress state tracked for the local operator only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerData {
    /// Number of times the operator said "meow".
    pub personal_meow_count: u64,
    /// Ids of unlocked achievements.
    pub unlocked_achievements: BTreeSet<String>,
    /// Canonical names of commands the operator has used.
    pub used_commands: BTreeSet<String>,
    /// Whether the operator has sent at least one chat line.
    pub first_message_sent: bool,
}

/// The on-disk document.
///
/// Every field defaults when missing, so older files gain new keys on load without
/// losing existing values. Keys this build does not know are kept in `extra` and
/// written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistentRecord {
    /// Global meow counter across all chat participants.
    pub total_meows: u64,
    /// Last time the automatic meow reply fired.
    pub last_meow_response: Millis,
    /// Whether the first-install welcome has been shown.
    #[serde(rename = "firstInstall")]
    pub first_install_done: bool,
    /// Users whose commands and meows are ignored.
    pub blacklisted_users: BTreeSet<Username>,
    /// Users whose chat is suppressed entirely.
    pub blocked_users: BTreeSet<Username>,
    /// Quotes served by `!quote`.
    pub quotes: Vec<String>,
    /// Operator progress.
    pub player_data: PlayerData,
    /// Unknown keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// File-backed store. Owns the record and its path.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    record: PersistentRecord,
}

impl Store {
    /// Open the store at `path`.
    ///
    /// A missing file yields defaults. An unreadable or unparsable file is logged,
    /// copied aside to `<path>.corrupt`, and replaced by defaults on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match load_record(&path) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(path = %path.display(), "store not found; starting fresh");
                PersistentRecord::default()
            }
            Err(err) => {
                warn!(path = %path.display(), "Failed to load store: {err:#}. Using defaults");
                let backup = corrupt_backup_path(&path);
                if let Err(err) = fs::copy(&path, &backup) {
                    warn!(backup = %backup.display(), %err, "Failed to back up unreadable store");
                }
                PersistentRecord::default()
            }
        };
        Self { path, record }
    }

    /// Wrap an existing record without touching the disk until the first mutation.
    pub fn from_record(path: impl Into<PathBuf>, record: PersistentRecord) -> Self {
        Self {
            path: path.into(),
            record,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of the whole record.
    pub fn record(&self) -> &PersistentRecord {
        &self.record
    }

    /// Write the record to disk via a temp file + rename.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create store directory")?;
            }
        }
        let json =
            serde_json::to_string_pretty(&self.record).context("Failed to serialize store")?;
        let tmp = temp_path(&self.path);
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn commit(&self) {
        if let Err(err) = self.save() {
            warn!(path = %self.path.display(), "Failed to persist store: {err:#}");
        }
    }

    // Blacklist

    /// Add a user to the blacklist. Returns `false` if already present or empty.
    pub fn add_to_blacklist(&mut self, name: &str) -> bool {
        let name = Username::new(name);
        if name.is_empty() || !self.record.blacklisted_users.insert(name) {
            return false;
        }
        self.commit();
        true
    }

    /// Remove a user from the blacklist. Returns `false` if they were not listed.
    pub fn remove_from_blacklist(&mut self, name: &str) -> bool {
        if !self.record.blacklisted_users.remove(&Username::new(name)) {
            return false;
        }
        self.commit();
        true
    }

    /// Case-insensitive blacklist membership.
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.record.blacklisted_users.contains(&Username::new(name))
    }

    /// Blacklisted names, sorted.
    pub fn blacklist(&self) -> Vec<String> {
        self.record
            .blacklisted_users
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    // Block list

    /// Add a user to the block list. Returns `false` if already present or empty.
    pub fn add_to_blocked(&mut self, name: &str) -> bool {
        let name = Username::new(name);
        if name.is_empty() || !self.record.blocked_users.insert(name) {
            return false;
        }
        self.commit();
        true
    }

    /// Remove a user from the block list. Returns `false` if they were not listed.
    pub fn remove_from_blocked(&mut self, name: &str) -> bool {
        if !self.record.blocked_users.remove(&Username::new(name)) {
            return false;
        }
        self.commit();
        true
    }

    /// Case-insensitive block-list membership.
    pub fn is_blocked(&self, name: &str) -> bool {
        self.record.blocked_users.contains(&Username::new(name))
    }

    /// Blocked names, sorted.
    pub fn blocked_users(&self) -> Vec<String> {
        self.record
            .blocked_users
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    // Meows

    /// Bump the global meow counter, returning the new total.
    pub fn increment_total_meows(&mut self) -> u64 {
        self.record.total_meows = self.record.total_meows.saturating_add(1);
        self.commit();
        self.record.total_meows
    }

    /// Global meow counter.
    pub fn total_meows(&self) -> u64 {
        self.record.total_meows
    }

    /// Bump the operator's meow counter, returning the new count.
    pub fn increment_personal_meows(&mut self) -> u64 {
        let data = &mut self.record.player_data;
        data.personal_meow_count = data.personal_meow_count.saturating_add(1);
        self.commit();
        self.record.player_data.personal_meow_count
    }

    /// Operator's meow counter.
    pub fn personal_meows(&self) -> u64 {
        self.record.player_data.personal_meow_count
    }

    /// Whether at least `window_ms` passed since the last automatic meow reply.
    pub fn can_auto_respond_meow(&self, now: Millis, window_ms: u64) -> bool {
        now.since(self.record.last_meow_response) >= window_ms
    }

    /// Remember when the automatic meow reply last fired.
    pub fn record_meow_response(&mut self, now: Millis) {
        self.record.last_meow_response = now;
        self.commit();
    }

    /// Last automatic meow reply.
    pub fn last_meow_response(&self) -> Millis {
        self.record.last_meow_response
    }

    // One-shot flags

    /// Mark the first-install welcome as shown. Returns `true` only the first time.
    pub fn mark_first_install(&mut self) -> bool {
        if self.record.first_install_done {
            return false;
        }
        self.record.first_install_done = true;
        self.commit();
        true
    }

    /// Whether the first-install welcome has been shown.
    pub fn first_install_done(&self) -> bool {
        self.record.first_install_done
    }

    /// Mark that the operator sent a chat line. Returns `true` only the first time.
    pub fn mark_first_message(&mut self) -> bool {
        if self.record.player_data.first_message_sent {
            return false;
        }
        self.record.player_data.first_message_sent = true;
        self.commit();
        true
    }

    // Commands and achievements

    /// Record a command the operator used. Returns `true` if it was new.
    pub fn add_used_command(&mut self, name: &str) -> bool {
        if !self
            .record
            .player_data
            .used_commands
            .insert(name.to_lowercase())
        {
            return false;
        }
        self.commit();
        true
    }

    /// Commands the operator has used.
    pub fn used_commands(&self) -> &BTreeSet<String> {
        &self.record.player_data.used_commands
    }

    /// Persist an unlocked achievement. Returns `true` if it was not unlocked before.
    pub fn unlock_achievement(&mut self, id: &str) -> bool {
        if !self
            .record
            .player_data
            .unlocked_achievements
            .insert(id.to_string())
        {
            return false;
        }
        self.commit();
        true
    }

    /// Whether an achievement is unlocked.
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.record.player_data.unlocked_achievements.contains(id)
    }

    // Quotes

    /// Append a quote. Blank quotes are rejected.
    pub fn add_quote(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.record.quotes.push(text.to_string());
        self.commit();
        true
    }

    /// Remove the quote at `index` (zero-based).
    pub fn remove_quote(&mut self, index: usize) -> Option<String> {
        if index >= self.record.quotes.len() {
            return None;
        }
        let removed = self.record.quotes.remove(index);
        self.commit();
        Some(removed)
    }

    /// Stored quotes in insertion order.
    pub fn quotes(&self) -> &[String] {
        &self.record.quotes
    }
}

fn load_record(path: &Path) -> Result<Option<PersistentRecord>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).context("Failed to read store"),
    };
    let record = serde_json::from_str(&contents).context("Failed to parse store")?;
    Ok(Some(record))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    path.with_file_name(name)
}
