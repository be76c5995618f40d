//! Shared human/JSON output layer for the CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and renders one summary
//! value: pretty-printed JSON for machines, a closure-formatted block for
//! humans.

use std::io::{self, Write};

use serde::Serialize;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Render a left-aligned key/value line in human output.
pub fn kv(w: &mut dyn Write, key: &str, value: impl std::fmt::Display) -> io::Result<()> {
    writeln!(w, "{:<16} {value}", format!("{key}:"))
}

/// Write `value` to stdout in the selected mode.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut w = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut w, value)?;
            writeln!(w)?;
        }
        OutputMode::Human => human(value, &mut w)?,
    }
    Ok(())
}
