//! Relative path rewriting applied to relocated artifacts

use std::fmt;
use std::sync::Arc;

/// What a filter function decided for one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// Keep the artifact at its current relative path
    Keep,
    /// Drop the artifact silently
    Drop,
    /// Move the artifact to a new relative path
    Rename(String),
}

/// Filter applied to each artifact's relative path after ancestor stripping.
///
/// Paths are always handled with `/` separators.
#[derive(Clone)]
pub enum PathFilter {
    /// Directory prefix replacements, first match wins
    Map(Vec<(String, String)>),
    /// Arbitrary decision function
    Func(Arc<dyn Fn(&str) -> FilterDecision + Send + Sync>),
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl PathFilter {
    /// Build a filter from a closure
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str) -> FilterDecision + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }

    /// Apply the filter; `None` means the artifact is dropped
    pub fn apply(&self, relative: &str) -> Option<String> {
        match self {
            Self::Map(entries) => {
                for (from, to) in entries {
                    if let Some(rest) = strip_dir_prefix(relative, from) {
                        let to = to.trim_end_matches('/');
                        return Some(if to.is_empty() {
                            rest.to_string()
                        } else {
                            format!("{}/{}", to, rest)
                        });
                    }
                }
                Some(relative.to_string())
            }
            Self::Func(f) => match f(relative) {
                FilterDecision::Keep => Some(relative.to_string()),
                FilterDecision::Drop => None,
                FilterDecision::Rename(path) => Some(path),
            },
        }
    }
}

/// Strip `prefix` from `path` only on a whole-segment boundary
fn strip_dir_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return Some(path);
    }
    path.strip_prefix(prefix)?.strip_prefix('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_replaces_directory_prefix() {
        let filter = PathFilter::Map(vec![("foo/bar".to_string(), "qux".to_string())]);
        assert_eq!(filter.apply("foo/bar/baz.js"), Some("qux/baz.js".to_string()));
        assert_eq!(filter.apply("foo/barn/baz.js"), Some("foo/barn/baz.js".to_string()));
    }

    #[test]
    fn test_map_to_root() {
        let filter = PathFilter::Map(vec![("lib".to_string(), String::new())]);
        assert_eq!(filter.apply("lib/a.js"), Some("a.js".to_string()));
    }

    #[test]
    fn test_func_decisions() {
        let filter = PathFilter::func(|path| {
            if path.ends_with(".d.ts") {
                FilterDecision::Drop
            } else if path == "a.js" {
                FilterDecision::Rename("renamed.js".to_string())
            } else {
                FilterDecision::Keep
            }
        });
        assert_eq!(filter.apply("a.d.ts"), None);
        assert_eq!(filter.apply("a.js"), Some("renamed.js".to_string()));
        assert_eq!(filter.apply("b.js"), Some("b.js".to_string()));
    }
}
