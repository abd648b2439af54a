//! Logger parameter string parsing.
//!
//! Build engines hand loggers a single opaque parameter string of the form
//! `name1=value1;name2=value2`. Recognized names configure the output path
//! and verbosity; everything else is retained in an opaque bag so callers
//! can fetch parameters this crate is not aware of.
//!
//! Names are trimmed and ASCII-uppercased before storage and lookup; the
//! normalization is part of the contract, not a lookup side effect.

use std::collections::HashMap;
use std::path::PathBuf;

use bmd_core::{ProtocolError, Verbosity};

/// Parsed logger parameters.
#[derive(Debug, Clone, Default)]
pub struct LoggerParams {
    /// Value of `LOGFILE`/`L`, when present.
    pub logfile: Option<PathBuf>,
    /// Value of `VERBOSITY`/`V`, when present.
    pub verbosity: Option<Verbosity>,
    bag: HashMap<String, String>,
}

impl LoggerParams {
    /// Parses a semicolon-delimited parameter string.
    ///
    /// Malformed entries — no `=`, or an empty name or value — are skipped
    /// and processing continues; they are a local, recoverable condition.
    /// An invalid `VERBOSITY` value is fatal: it is a configuration the
    /// caller asked for and cannot be honored.
    pub fn parse(parameters: &str) -> Result<Self, ProtocolError> {
        let mut params = Self::default();

        for entry in parameters.split(';') {
            if entry.trim().is_empty() {
                continue;
            }
            let Some((name, value)) = entry.split_once('=') else {
                tracing::debug!(entry, "skipping parameter without '='");
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() {
                tracing::debug!(entry, "skipping parameter with empty name or value");
                continue;
            }

            let key = name.to_ascii_uppercase();
            params.bag.insert(key.clone(), value.to_string());
            match key.as_str() {
                "LOGFILE" | "L" => params.logfile = Some(PathBuf::from(value)),
                "VERBOSITY" | "V" => params.verbosity = Some(value.parse()?),
                _ => {}
            }
        }

        Ok(params)
    }

    /// Fetches a raw parameter value by name, uppercasing the name first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bag
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }
}
