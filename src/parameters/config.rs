//! Configuration options for dependency linking.

use serde::{Deserialize, Serialize};

/// How a bound expression is matched against another parameter's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The id occurs anywhere in the raw expression text. An id that is a substring
    /// of another token (e.g. `size` inside `sizeMax`) also matches.
    Substring,

    /// The id equals one of the identifier tokens of the expression.
    Token,
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Substring
    }
}

/// Configuration options for linking a design space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkConfig {
    /// How bound expressions reference parameters. Default: Substring
    pub match_mode: MatchMode,

    /// Reject dependency cycles right after linking. Default: true
    pub detect_cycles: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            detect_cycles: true,
        }
    }
}

impl LinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn with_cycle_detection(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }
}
