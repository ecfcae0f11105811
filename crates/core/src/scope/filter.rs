use crate::config::ConfigError;
use glob::{MatchOptions, Pattern};

/// `*` and `?` stay within one path segment.
pub(crate) const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Optional include and exclude shell globs.
///
/// Folder listings are checked with [`PathFilter::accepts`]. Changed and
/// deleted files go through [`PathFilter::accepts_file`], which also tries
/// the full file path and, for patterns without a `/`, the bare file name.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Option<Pattern>,
    exclude: Option<Pattern>,
}

impl PathFilter {
    /// Empty patterns are treated as absent.
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn include_pattern(&self) -> Option<&str> {
        self.include.as_ref().map(Pattern::as_str)
    }

    pub fn exclude_pattern(&self) -> Option<&str> {
        self.exclude.as_ref().map(Pattern::as_str)
    }

    /// Include is checked first, then exclude.
    pub fn accepts(&self, path: &str) -> bool {
        self.accepts_with(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
    }

    /// Accepts a file inside `folder` when the include pattern matches the
    /// folder or the file, unless the exclude pattern matches either.
    pub fn accepts_file(&self, folder: &str, path: &str) -> bool {
        self.accepts_with(|pattern| {
            pattern.matches_with(folder, MATCH_OPTIONS) || matches_file(pattern, path)
        })
    }

    fn accepts_with(&self, matches: impl Fn(&Pattern) -> bool) -> bool {
        if let Some(include) = &self.include {
            if !matches(include) {
                return false;
            }
        }

        if let Some(exclude) = &self.exclude {
            if matches(exclude) {
                return false;
            }
        }

        true
    }
}

/// A pattern without `/` is also tried against the file name, so `*.md`
/// catches `apps/web/README.md`.
fn matches_file(pattern: &Pattern, path: &str) -> bool {
    if pattern.matches_with(path, MATCH_OPTIONS) {
        return true;
    }
    if pattern.as_str().contains('/') {
        return false;
    }
    let name = path.rsplit_once('/').map_or(path, |(_, name)| name);
    pattern.matches_with(name, MATCH_OPTIONS)
}

/// Drops a leading `./` and trailing `/` so patterns line up with
/// repository-relative folder paths.
pub(crate) fn normalize_pattern(pattern: &str) -> &str {
    let mut pattern = pattern.trim();
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    pattern.trim_end_matches('/')
}

fn compile(pattern: Option<&str>) -> Result<Option<Pattern>, ConfigError> {
    let pattern = match pattern.map(normalize_pattern) {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(None),
    };

    Pattern::new(pattern)
        .map(Some)
        .map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            error: e.to_string(),
        })
}
