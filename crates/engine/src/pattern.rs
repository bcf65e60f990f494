//! Exclusion pattern matching
//!
//! Two kinds of patterns are supported:
//!
//! - Plain globs (`*.tmp`, `~*`, `Thumbs.db`) are matched against the final
//!   path segment only. `*` and `?` never cross a `/`.
//! - Patterns containing `**` (`**/.git/**`, `data/**/*.bak`) are matched
//!   segment by segment against the whole path relative to the layer root,
//!   where a `**` segment stands for zero or more whole segments.
//!
//! A `**` pattern is also tried against the bare file name, so `**/foo`
//! catches `foo` at any depth. Backslashes are treated as separators in both
//! paths and patterns. A pattern that does not compile never matches.
//!
//! ```
//! use laminate_engine::pattern::is_excluded;
//!
//! assert!(is_excluded("data/~car.ini", &["~*"]));
//! assert!(is_excluded("a/b/c", &["a/**/c"]));
//! assert!(is_excluded("a/c", &["a/**/c"]));
//! assert!(!is_excluded("data/car.ini", &["*.tmp"]));
//! ```

use glob::{MatchOptions, Pattern};
use laminate_core::path::RelPath;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One segment of a `**` pattern
#[derive(Debug, Clone)]
enum Segment {
    /// `**`: zero or more whole path segments
    AnyDepth,
    /// A glob confined to a single path segment
    Glob(Pattern),
}

#[derive(Debug, Clone)]
enum CompiledPattern {
    /// Matched against the file name only
    FileName(Pattern),
    /// Matched against every segment of the relative path
    Segments(Vec<Segment>),
}

impl CompiledPattern {
    fn compile(raw: &str) -> Option<Self> {
        let normalized = raw.replace('\\', "/");

        if !normalized.contains("**") {
            return Pattern::new(&normalized).ok().map(Self::FileName);
        }

        let mut segments = Vec::new();
        for part in normalized.split('/').filter(|s| !s.is_empty()) {
            if part == "**" {
                // Adjacent `**` segments are equivalent to one
                if !matches!(segments.last(), Some(Segment::AnyDepth)) {
                    segments.push(Segment::AnyDepth);
                }
            } else {
                // `**` glued to other characters cannot span segments
                let single = part.replace("**", "*");
                segments.push(Segment::Glob(Pattern::new(&single).ok()?));
            }
        }

        if segments.is_empty() {
            None
        } else {
            Some(Self::Segments(segments))
        }
    }

    fn matches(&self, segments: &[&str]) -> bool {
        match self {
            Self::FileName(pattern) => segments
                .last()
                .is_some_and(|name| pattern.matches_with(name, MATCH_OPTIONS)),
            Self::Segments(pattern) => {
                match_segments(pattern, segments)
                    || segments
                        .last()
                        .is_some_and(|name| match_segments(pattern, &[name]))
            }
        }
    }
}

/// Anchored match of a segment pattern against path segments
///
/// `reachable[j]` holds whether the pattern prefix consumed so far can
/// match the first `j` path segments.
fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let mut reachable = vec![false; path.len() + 1];
    reachable[0] = true;

    for segment in pattern {
        let mut next = vec![false; path.len() + 1];
        match segment {
            Segment::AnyDepth => {
                let mut seen = false;
                for (j, slot) in next.iter_mut().enumerate() {
                    seen |= reachable[j];
                    *slot = seen;
                }
            }
            Segment::Glob(glob) => {
                for j in 1..=path.len() {
                    next[j] = reachable[j - 1] && glob.matches_with(path[j - 1], MATCH_OPTIONS);
                }
            }
        }
        reachable = next;
    }

    reachable[path.len()]
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty()).collect()
}

/// A compiled, immutable set of exclusion patterns
///
/// Built once per run and shared read-only by every variant.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<CompiledPattern>,
}

impl ExclusionSet {
    /// Compile a list of patterns
    ///
    /// Patterns that fail to compile are dropped; they could never match.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                let compiled = CompiledPattern::compile(raw);
                if compiled.is_none() {
                    tracing::debug!(pattern = raw, "Ignoring exclusion pattern that cannot match");
                }
                compiled
            })
            .collect();

        Self { patterns }
    }

    /// Number of active patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern is active
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check a path relative to a layer root
    pub fn is_excluded(&self, path: &RelPath) -> bool {
        self.is_excluded_str(&path.to_slash_string())
    }

    /// Check a path given as a string, with either separator
    pub fn is_excluded_str(&self, path: &str) -> bool {
        let segments = split_segments(path);
        if segments.is_empty() {
            return false;
        }
        self.patterns.iter().any(|p| p.matches(&segments))
    }
}

/// Decide whether `path` is excluded by any of `patterns`
///
/// Convenience form of [`ExclusionSet`] for one-off checks.
pub fn is_excluded<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    ExclusionSet::new(patterns).is_excluded_str(path)
}
