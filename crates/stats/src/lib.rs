#![warn(missing_docs)]
//! Skyblock statistics lookups.
//!
//! Commands that report remote data go through a [`StatsProvider`], which resolves a
//! [`StatsQuery`] to a JSON document. The [`format`] module turns those documents into
//! single chat lines. [`tax`] is the one stats command computed locally.

pub mod format;
mod http;
pub mod tax;

pub use http::{HttpStatsProvider, StatsSettings};

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A remote data request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsQuery {
    /// Profile networth.
    Networth {
        /// Minecraft username.
        player: String,
    },
    /// Slayer levels and XP.
    Slayer {
        /// Minecraft username.
        player: String,
    },
    /// Skill levels.
    Skills {
        /// Minecraft username.
        player: String,
    },
    /// Skyblock level.
    Level {
        /// Minecraft username.
        player: String,
    },
    /// Accessory bag magical power.
    MagicalPower {
        /// Minecraft username.
        player: String,
    },
    /// Dungeon secrets found.
    Secrets {
        /// Minecraft username.
        player: String,
    },
    /// Catacombs level, class levels and floor stats.
    Dungeons {
        /// Minecraft username.
        player: String,
    },
    /// Current mayor and running election.
    Election,
    /// Cheapest BIN auction matching a search.
    LowestBin {
        /// Free-text item search.
        query: String,
    },
}

impl StatsQuery {
    /// Short kind name used in logs and endpoint paths.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Networth { .. } => "networth",
            Self::Slayer { .. } => "slayer",
            Self::Skills { .. } => "skills",
            Self::Level { .. } => "level",
            Self::MagicalPower { .. } => "magical-power",
            Self::Secrets { .. } => "secrets",
            Self::Dungeons { .. } => "dungeons",
            Self::Election => "election",
            Self::LowestBin { .. } => "lowest-bin",
        }
    }

    /// Player the query is about, if any.
    pub fn player(&self) -> Option<&str> {
        match self {
            Self::Networth { player }
            | Self::Slayer { player }
            | Self::Skills { player }
            | Self::Level { player }
            | Self::MagicalPower { player }
            | Self::Secrets { player }
            | Self::Dungeons { player } => Some(player),
            Self::Election | Self::LowestBin { .. } => None,
        }
    }
}

impl fmt::Display for StatsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowestBin { query } => write!(f, "{} '{query}'", self.kind()),
            _ => match self.player() {
                Some(player) => write!(f, "{} for {player}", self.kind()),
                None => f.write_str(self.kind()),
            },
        }
    }
}

/// Why a lookup produced no chat output. Logged locally, never sent to chat.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("stats service returned HTTP {0}")]
    Status(u16),
    /// The document did not have the expected shape.
    #[error("unexpected payload: {0}")]
    Payload(String),
    /// The service has no data for the subject.
    #[error("no data found for {0}")]
    NotFound(String),
    /// The configured endpoint cannot be used as a base URL.
    #[error("invalid stats endpoint: {0}")]
    InvalidUrl(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Source of stats documents. Implementations must be shareable across spawned tasks.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Resolve `query` to its JSON document.
    async fn fetch(&self, query: &StatsQuery) -> Result<Value, FetchError>;
}
