//! Path-pattern classification and segment-wildcard matching.
//!
//! Raw rule paths compile once, at ACL build time, into one of three
//! shapes: an exact path, a prefix pattern (trailing `*`), or a
//! segment-wildcard pattern (`+` segments, optionally combined with a
//! trailing glob). Requests are then matched with plain segment
//! comparisons; nothing is recompiled per request.

use std::cmp::Ordering;

use crate::error::AclError;

/// A classified rule path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PathPattern {
    /// Matches one path string exactly.
    Exact(String),
    /// Matches any path sharing the literal prefix (the `*` is stripped).
    Prefix(String),
    /// Contains `+` segments; see `SegmentPattern`.
    Segments(SegmentPattern),
}

/// One pattern segment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SegmentToken {
    Literal(String),
    /// `+`: consumes exactly one path segment.
    Wildcard,
    /// Final-position glob: the remaining path segments, re-joined with
    /// `/`, must start with this string. Produced by patterns such as
    /// `a/+/b/end*` (tail `"end"`) and `a/+/*` (tail `""`).
    GlobTail(String),
}

/// A compiled segment-wildcard pattern with its precomputed specificity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SegmentPattern {
    raw: String,
    tokens: Vec<SegmentToken>,
    /// Byte length of the longest literal run from the start of the raw
    /// pattern, used to rank candidates against each other and against
    /// prefix patterns.
    specificity: usize,
    literal_segments: usize,
    glob_len: Option<usize>,
}

impl PathPattern {
    /// Classify a raw rule path, stripping a single leading `/`.
    ///
    /// Structurally invalid patterns are fatal: a `*` anywhere but the
    /// final character, or a `+` that does not occupy a whole segment.
    pub(crate) fn classify(path: &str) -> Result<PathPattern, AclError> {
        let path = path.strip_prefix('/').unwrap_or(path);

        if let Some(position) = path.find('*') {
            if position != path.len() - 1 {
                return Err(AclError::InvalidPathPattern {
                    pattern: path.to_string(),
                    reason: "'*' is only valid as the final character".to_string(),
                });
            }
        }

        let is_prefix = path.ends_with('*');
        let body = if is_prefix {
            &path[..path.len() - 1]
        } else {
            path
        };

        let segments: Vec<&str> = body.split('/').collect();
        let mut has_wildcard = false;
        for (index, segment) in segments.iter().enumerate() {
            if *segment == "+" {
                if is_prefix && index == segments.len() - 1 {
                    // "a/+*" would make the final segment both a wildcard
                    // and a glob.
                    return Err(AclError::InvalidPathPattern {
                        pattern: path.to_string(),
                        reason: "'+' segment cannot carry a trailing glob".to_string(),
                    });
                }
                has_wildcard = true;
            } else if segment.contains('+') {
                return Err(AclError::InvalidPathPattern {
                    pattern: path.to_string(),
                    reason: "'+' must occupy a whole path segment".to_string(),
                });
            }
        }

        if !has_wildcard {
            return Ok(if is_prefix {
                PathPattern::Prefix(body.to_string())
            } else {
                PathPattern::Exact(body.to_string())
            });
        }

        let mut tokens = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let last = index == segments.len() - 1;
            tokens.push(match (*segment, is_prefix && last) {
                ("+", false) => SegmentToken::Wildcard,
                (literal, false) => SegmentToken::Literal(literal.to_string()),
                (tail, true) => SegmentToken::GlobTail(tail.to_string()),
            });
        }

        let specificity = tokens
            .iter()
            .map_while(|t| match t {
                SegmentToken::Literal(literal) => Some(literal.len() + 1),
                _ => None,
            })
            .sum();
        let literal_segments = tokens
            .iter()
            .filter(|t| matches!(t, SegmentToken::Literal(_)))
            .count();
        let glob_len = tokens.last().and_then(|t| match t {
            SegmentToken::GlobTail(tail) => Some(tail.len()),
            _ => None,
        });

        Ok(PathPattern::Segments(SegmentPattern {
            raw: path.to_string(),
            tokens,
            specificity,
            literal_segments,
            glob_len,
        }))
    }
}

impl SegmentPattern {
    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn specificity(&self) -> usize {
        self.specificity
    }

    /// Match against a path pre-split on `/`. Splitting preserves empty
    /// segments, so `a/+/` only matches paths with a trailing slash.
    pub(crate) fn matches(&self, segments: &[&str]) -> bool {
        if self.glob_len.is_some() {
            if segments.len() < self.tokens.len() {
                return false;
            }
        } else if segments.len() != self.tokens.len() {
            return false;
        }

        for (index, token) in self.tokens.iter().enumerate() {
            match token {
                SegmentToken::Literal(literal) => {
                    if segments[index] != literal {
                        return false;
                    }
                }
                SegmentToken::Wildcard => {}
                SegmentToken::GlobTail(tail) => {
                    return segments[index..].join("/").starts_with(tail.as_str());
                }
            }
        }
        true
    }

    /// Rank two matching candidates; `Greater` means `self` is more
    /// specific and wins.
    ///
    /// Ordered by: longer leading literal run, more literal segments, no
    /// trailing glob, longer glob tail. The final raw-pattern comparisons
    /// only make the choice deterministic for pathological rule sets.
    pub(crate) fn cmp_specificity(&self, other: &SegmentPattern) -> Ordering {
        self.specificity
            .cmp(&other.specificity)
            .then(self.literal_segments.cmp(&other.literal_segments))
            .then(self.glob_len.is_none().cmp(&other.glob_len.is_none()))
            .then(self.glob_len.unwrap_or(0).cmp(&other.glob_len.unwrap_or(0)))
            .then(self.raw.len().cmp(&other.raw.len()))
            .then(other.raw.cmp(&self.raw))
    }
}
