//! Verbosity levels gating optional report detail.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// How much optional detail the report includes.
///
/// Levels are ordered; emission sites ask [`Verbosity::is_at_least`] rather
/// than comparing variants directly. Failure, error, and warning markers are
/// emitted at every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Verbosity {
    Quiet,
    Minimal,
    #[default]
    Normal,
    Detailed,
    Diagnostic,
}

impl Verbosity {
    /// Returns true when the current level is `level` or chattier.
    #[must_use]
    pub fn is_at_least(self, level: Self) -> bool {
        self >= level
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Minimal => "minimal",
            Self::Normal => "normal",
            Self::Detailed => "detailed",
            Self::Diagnostic => "diagnostic",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = ProtocolError;

    /// Parses a level name or its single-letter abbreviation.
    ///
    /// Input is trimmed and ASCII-uppercased before matching; that
    /// normalization is part of the configuration contract, not an
    /// implementation accident.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QUIET" | "Q" => Ok(Self::Quiet),
            "MINIMAL" | "M" => Ok(Self::Minimal),
            "NORMAL" | "N" => Ok(Self::Normal),
            "DETAILED" | "D" => Ok(Self::Detailed),
            "DIAGNOSTIC" | "DIAG" => Ok(Self::Diagnostic),
            _ => Err(ProtocolError::InvalidVerbosity {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for Verbosity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Verbosity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
