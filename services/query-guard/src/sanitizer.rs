// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Best-effort text normalization.
//!
//! Sanitization never changes whether an input is valid; it only removes
//! characters that have no business in a free-text query.

use unicode_normalization::UnicodeNormalization;

/// Normalize free text and cap it at `max_chars` characters.
///
/// Steps, in order: drop control characters, collapse whitespace runs to a
/// single space and trim, truncate. Truncation runs last so the cap applies
/// to the normalized text; a space exposed at the cut is trimmed so that
/// sanitizing twice gives the same result as sanitizing once.
pub fn sanitize_input(input: &str, max_chars: usize) -> String {
    let without_controls: String = input.chars().filter(|c| !c.is_control()).collect();
    let collapsed = without_controls.split_whitespace().collect::<Vec<_>>().join(" ");

    match collapsed.char_indices().nth(max_chars) {
        Some((cut, _)) => collapsed[..cut].trim_end().to_string(),
        None => collapsed,
    }
}

/// NFKC normalization, folding compatibility look-alikes (full-width
/// letters, ligatures, circled digits) onto their canonical forms.
pub fn normalize_unicode(input: &str) -> String {
    input.nfkc().collect()
}
