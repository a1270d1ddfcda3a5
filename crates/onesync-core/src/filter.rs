//! Ignore rules for the local mirror
//!
//! Rules are glob patterns, one per line in an ignore file. Matching follows
//! the familiar gitignore shape without negation:
//! - `#` starts a comment, blank lines are skipped
//! - a trailing `/` restricts the rule to directories
//! - a rule containing `/` (other than a trailing one) is anchored at the
//!   local root and matched against the whole relative path
//! - any other rule is matched against the entry name at every depth

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: Pattern,
    dir_only: bool,
    anchored: bool,
}

impl IgnoreRule {
    fn matches(&self, relative: &str, name: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        let subject = if self.anchored { relative } else { name };
        self.pattern.matches_with(subject, MATCH_OPTIONS)
    }
}

/// Compiled set of ignore rules
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    rules: Vec<IgnoreRule>,
}

impl PathFilter {
    /// A filter that ignores nothing
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile rules from lines of text
    ///
    /// Invalid patterns are logged and skipped.
    pub fn from_rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .filter_map(|line| Self::compile(line.as_ref()))
            .collect();
        Self { rules }
    }

    /// Read and compile every ignore file in `files`
    ///
    /// A file that cannot be read is logged and skipped.
    pub fn load(files: &[PathBuf]) -> Self {
        let mut filter = Self::empty();
        for file in files {
            match std::fs::read_to_string(file) {
                Ok(content) => {
                    let loaded = Self::from_rules(content.lines());
                    debug!(path = %file.display(), rules = loaded.len(), "Loaded ignore file");
                    filter.rules.extend(loaded.rules);
                }
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Failed to read ignore file, skipping");
                }
            }
        }
        filter
    }

    /// Number of compiled rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rule was compiled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check whether an entry, given relative to the local root, is ignored
    #[must_use]
    pub fn is_ignored(&self, relative_path: &Path, is_dir: bool) -> bool {
        if self.rules.is_empty() {
            return false;
        }

        let relative: Vec<&str> = relative_path
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .filter(|c| *c != "/")
            .collect();
        let Some(name) = relative.last() else {
            return false;
        };
        let joined = relative.join("/");

        self.rules
            .iter()
            .any(|rule| rule.matches(&joined, name, is_dir))
    }

    fn compile(line: &str) -> Option<IgnoreRule> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (body, dir_only) = match line.strip_suffix('/') {
            Some(body) => (body, true),
            None => (line, false),
        };
        let anchored = body.contains('/');
        let body = body.trim_start_matches('/');
        if body.is_empty() {
            return None;
        }

        match Pattern::new(body) {
            Ok(pattern) => Some(IgnoreRule {
                pattern,
                dir_only,
                anchored,
            }),
            Err(e) => {
                warn!(pattern = %line, error = %e, "Skipping invalid ignore pattern");
                None
            }
        }
    }
}
