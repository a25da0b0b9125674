//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: labelled text for humans, or the same wire-contract JSON
//! bodies the service API speaks (`--json`).

use serde::Serialize;
use std::io::{self, Write};

use taskpipe_core::api::ErrorResponse;
use taskpipe_core::error::Error;

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON, matching the service wire contract.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In human mode,
/// the provided `human_fn` closure produces the text output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a structured error to stderr in the requested format.
///
/// JSON mode emits the same [`ErrorResponse`] body the service API returns.
pub fn render_error(mode: OutputMode, error: &ErrorResponse) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, error)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "error: {} ({})", error.message, error.error_code)?;
        }
    }
    Ok(())
}

/// Render a domain error and convert it into a non-zero exit.
pub fn fail(mode: OutputMode, error: &Error) -> anyhow::Result<()> {
    render_error(mode, &ErrorResponse::from(error))?;
    anyhow::bail!("{error}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_mode_is_json() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Human.is_json());
    }

    #[test]
    fn fail_is_always_an_err() {
        let result = fail(OutputMode::Human, &Error::NotFound);
        assert!(result.is_err());
    }
}
