// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::constants::pattern::{MATCH_ALL, NO_RULE};

/// Matches `text` against a glob `pattern`.
///
/// The glob pattern language supports `*` as a multiple character wildcard (including empty
/// string) and `?` as a single character wildcard. An empty pattern only matches an empty text.
///
/// Patterns without `*`, or with a single trailing `*`, are matched with one linear scan.
/// Anything else falls back to a dynamic programming matcher in `O(|pattern| * |text|)`.
pub fn wildcard_match(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    if pattern == NO_RULE {
        return text.is_empty();
    }
    if pattern == MATCH_ALL {
        return true;
    }
    if case_insensitive {
        let pattern = pattern.to_lowercase();
        match_with_kind(PatternKind::of(&pattern), &pattern, &text.to_lowercase())
    } else {
        match_with_kind(PatternKind::of(pattern), pattern, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    Empty,
    MatchAll,
    /// No `*`, or a single `*` as the last character
    Linear,
    /// At least one `*` before the last character
    Wildcard,
}

impl PatternKind {
    fn of(pattern: &str) -> Self {
        if pattern == NO_RULE {
            return PatternKind::Empty;
        }
        if pattern == MATCH_ALL {
            return PatternKind::MatchAll;
        }
        match pattern.find('*') {
            None => PatternKind::Linear,
            Some(idx) if idx == pattern.len() - 1 => PatternKind::Linear,
            Some(_) => PatternKind::Wildcard,
        }
    }
}

fn match_with_kind(kind: PatternKind, pattern: &str, text: &str) -> bool {
    match kind {
        PatternKind::Empty => text.is_empty(),
        PatternKind::MatchAll => true,
        PatternKind::Linear => linear_match(pattern, text),
        PatternKind::Wildcard => dp_match(pattern, text),
    }
}

fn linear_match(pattern: &str, text: &str) -> bool {
    let mut text = text.chars();
    for p in pattern.chars() {
        match p {
            // only ever the last pattern character here
            '*' => return true,
            '?' => {
                if text.next().is_none() {
                    return false;
                }
            }
            literal => {
                if text.next() != Some(literal) {
                    return false;
                }
            }
        }
    }
    text.next().is_none()
}

/// `res[i]` holds whether the pattern prefix processed so far matches `text[..i]`.
fn dp_match(pattern: &str, text: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let len = text.len();

    let mut res = vec![false; len + 1];
    res[0] = true;

    for p in pattern.chars() {
        if p == '*' {
            if let Some(first) = res.iter().position(|&matched| matched) {
                res[first..].fill(true);
            }
        } else {
            for i in (0..len).rev() {
                res[i + 1] = res[i] && (p == '?' || p == text[i]);
            }
        }
        res[0] = res[0] && p == '*';

        if !res.contains(&true) {
            return false;
        }
    }

    res[len]
}

/// A compiled glob pattern, matched case insensitively.
///
/// The pattern is lowercased and classified once so that matching a subject only folds the
/// subject.
#[derive(Clone, PartialEq, Eq)]
pub struct GlobMatcher {
    /// The original glob pattern
    pattern: String,
    /// Lowercased pattern for case-insensitive matching
    pattern_lower: String,
    kind: PatternKind,
}

impl fmt::Debug for GlobMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobMatcher")
            .field("pattern", &self.pattern)
            .field("kind", &self.kind)
            .finish()
    }
}

impl GlobMatcher {
    /// Creates a new GlobMatcher with the given pattern
    pub fn new(pattern: &str) -> Self {
        let pattern_lower = pattern.to_lowercase();
        GlobMatcher {
            pattern: pattern.to_string(),
            kind: PatternKind::of(&pattern_lower),
            pattern_lower,
        }
    }

    /// Returns the original pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Checks if the given subject matches the glob pattern.
    /// The match is case insensitive.
    pub fn matches(&self, subject: &str) -> bool {
        match self.kind {
            PatternKind::Empty => subject.is_empty(),
            PatternKind::MatchAll => true,
            kind => match_with_kind(kind, &self.pattern_lower, &subject.to_lowercase()),
        }
    }
}
