use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sbechat_core::Outbound;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct TranscriptRecord<'a> {
    at: String,
    kind: &'static str,
    text: &'a str,
}

/// Appends one JSON object per outbound message.
pub struct Transcript {
    writer: BufWriter<File>,
}

impl Transcript {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open transcript {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn record(&mut self, item: &Outbound) -> Result<()> {
        let kind = match item {
            Outbound::Chat(_) => "chat",
            Outbound::ClientCommand(_) => "command",
            Outbound::Notice(_) => "notice",
        };
        let record = TranscriptRecord {
            at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
            text: item.text(),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
