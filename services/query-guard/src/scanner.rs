// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Denylist scanner for injection markers and repetitive context strings.
//!
//! This is a heuristic filter, not a parser. A miss proves nothing about
//! the safety of the input; anything that later interprets the text must
//! still treat it as data.

use crate::config::ConfigHandle;
use crate::sanitizer::normalize_unicode;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Named denylist patterns. All are matched case-insensitively.
pub const SECURITY_PATTERNS: &[(&str, &str)] = &[
    ("script_tag", r"<\s*/?\s*script\b"),
    ("javascript_uri", r"javascript\s*:"),
    ("vbscript_uri", r"vbscript\s*:"),
    ("file_uri", r"file\s*://"),
    ("event_handler", r"\bon[a-z]+\s*="),
    ("base64_data_uri", r"data:[^,\s]*;\s*base64\s*,"),
    ("hex_escape", r"\\x[0-9a-f]{2}"),
    ("null_byte", r"\x00"),
];

/// A compiled denylist entry.
struct SecurityPattern {
    name: &'static str,
    regex: Regex,
}

/// Pattern-based detector for injection attempts and spam-shaped context.
pub struct SecurityScanner {
    patterns: Vec<SecurityPattern>,
    config: ConfigHandle,
}

impl SecurityScanner {
    /// Compile [`SECURITY_PATTERNS`]. The repetition threshold is read from
    /// `config` on every call so runtime updates apply immediately.
    pub fn new(config: ConfigHandle) -> Result<Self, regex::Error> {
        Self::with_patterns(SECURITY_PATTERNS, config)
    }

    /// Compile a custom pattern table.
    pub fn with_patterns(
        patterns: &[(&'static str, &str)],
        config: ConfigHandle,
    ) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|&(name, pattern)| -> Result<SecurityPattern, regex::Error> {
                Ok(SecurityPattern {
                    name,
                    regex: Regex::new(&format!("(?i){pattern}"))?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, config })
    }

    /// Name of the first pattern matching `input`, checked both as given
    /// and after NFKC normalization.
    pub fn find_security_risk(&self, input: &str) -> Option<&'static str> {
        let normalized = normalize_unicode(input);
        let hit = self
            .patterns
            .iter()
            .find(|p| p.regex.is_match(input) || p.regex.is_match(&normalized))
            .map(|p| p.name);
        if let Some(name) = hit {
            debug!(pattern = name, "Security pattern matched");
        }
        hit
    }

    pub fn contains_security_risks(&self, input: &str) -> bool {
        self.find_security_risk(input).is_some()
    }

    /// Accept a context string only if it is not dominated by repeated words
    /// and carries no security markers.
    pub fn validate_context(&self, context: &str) -> bool {
        let threshold = self.config.snapshot().repetition_ratio_threshold;
        let ratio = unique_word_ratio(context);
        if ratio <= threshold {
            debug!(ratio, threshold, "Context rejected as repetitive");
            return false;
        }
        !self.contains_security_risks(context)
    }
}

/// Unique words over total words. Text with no words counts as fully unique.
pub fn unique_word_ratio(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 1.0;
    }
    let unique: HashSet<&str> = words.iter().copied().collect();
    unique.len() as f64 / words.len() as f64
}
