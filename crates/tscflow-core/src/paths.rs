//! Path reconciliation
//!
//! The compiler writes its output into the session workspace, mirroring the
//! directory layout of the inputs. This module maps those physical paths back
//! onto the caller's destination tree:
//!
//! 1. Compute the directory segments every input shares (the common ancestor).
//! 2. Strip that ancestor from each discovered output's workspace-relative path.
//! 3. Run the optional [`PathFilter`] and join the result onto the destination root.
//!
//! A single root-level input forces an empty ancestor, so flat input sets give
//! flat output. In single-file mode none of this applies: the one output path
//! comes straight from configuration.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::config::PathFilter;
use crate::session::SourceFileRef;

/// Directory segments of a relative file path (the file name is dropped)
pub fn dir_segments(relative_path: &Path) -> Vec<String> {
    let parent = relative_path.parent().unwrap_or_else(|| Path::new(""));
    segments(parent)
}

/// Normal components of a relative path as strings
fn segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Longest run of leading directory segments shared by every entry.
///
/// Any root-level entry (no segments) makes the result empty, as does a
/// disagreement at the first position.
pub fn common_ancestor(dirs: &[Vec<String>]) -> Vec<String> {
    let Some((first, rest)) = dirs.split_first() else {
        return Vec::new();
    };
    if dirs.iter().any(|d| d.is_empty()) {
        return Vec::new();
    }

    let mut prefix: &[String] = first;
    for dir in rest {
        let shared = prefix
            .iter()
            .zip(dir.iter())
            .take_while(|(a, b)| a == b)
            .count();
        if shared == 0 {
            return Vec::new();
        }
        prefix = &prefix[..shared];
    }
    prefix.to_vec()
}

/// Render a path with `/` separators regardless of host conventions
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push_str(&p.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            Component::CurDir => push_segment(&mut out, "."),
            Component::ParentDir => push_segment(&mut out, ".."),
            Component::Normal(s) => push_segment(&mut out, &s.to_string_lossy()),
        }
    }
    out
}

fn push_segment(out: &mut String, segment: &str) {
    if !out.is_empty() && !out.ends_with('/') {
        out.push('/');
    }
    out.push_str(segment);
}

/// Resolve `.` and `..` lexically without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Express `target` relative to the directory `from_dir`.
///
/// Both paths should be absolute. When they live on different roots (another
/// drive on Windows) the normalized target is returned unchanged.
pub fn relative_to(from_dir: &Path, target: &Path) -> PathBuf {
    let from = normalize(from_dir);
    let to = normalize(target);

    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();

    let roots_differ = match (from_parts.first(), to_parts.first()) {
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) => a != b,
        (Some(Component::Prefix(_)), _) | (_, Some(Component::Prefix(_))) => true,
        _ => false,
    };
    if roots_differ {
        return to;
    }

    let shared = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in shared..from_parts.len() {
        rel.push("..");
    }
    for part in &to_parts[shared..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

/// Where one workspace output ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Path relative to the destination root, `/`-separated
    pub relative: String,
    /// Absolute destination path
    pub logical: PathBuf,
}

/// Maps workspace-relative output paths onto the destination tree
#[derive(Debug, Clone)]
pub struct PathReconciler {
    dest_root: PathBuf,
    ancestor: Vec<String>,
    filter: Option<PathFilter>,
}

impl PathReconciler {
    /// Reconciler for a multi-file compile of `inputs`
    pub fn for_inputs(inputs: &[SourceFileRef], dest_root: PathBuf) -> Self {
        let dirs: Vec<Vec<String>> = inputs
            .iter()
            .map(|input| dir_segments(&input.relative_path))
            .collect();
        Self {
            dest_root,
            ancestor: common_ancestor(&dirs),
            filter: None,
        }
    }

    /// Reconciler for single-file output: nothing is stripped
    pub fn single_file(dest_root: PathBuf) -> Self {
        Self {
            dest_root,
            ancestor: Vec::new(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<PathFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// The shared ancestor segments that get stripped
    pub fn ancestor(&self) -> &[String] {
        &self.ancestor
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Strip the shared ancestor from a workspace-relative path.
    ///
    /// Paths whose directory does not start with the ancestor are returned
    /// unchanged.
    pub fn strip_ancestor(&self, workspace_relative: &Path) -> Vec<String> {
        let all = segments(workspace_relative);
        let dir_len = all.len().saturating_sub(1);
        let n = self.ancestor.len();
        if n > 0 && n <= dir_len && all[..n] == self.ancestor[..] {
            all[n..].to_vec()
        } else {
            all
        }
    }

    /// Relocate one output; `None` when the path filter drops it or the
    /// filtered path would climb out of the destination root
    pub fn relocate(&self, workspace_relative: &Path) -> Option<Relocation> {
        let relative = self.strip_ancestor(workspace_relative).join("/");
        let relative = match &self.filter {
            Some(filter) => filter.apply(&relative)?,
            None => relative,
        };
        let parts: Vec<&str> = relative
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if parts.is_empty() || parts.contains(&"..") {
            warn!(
                "Dropping output '{}': path leaves {}",
                relative,
                self.dest_root.display()
            );
            return None;
        }
        let logical = parts
            .iter()
            .fold(self.dest_root.clone(), |acc, s| acc.join(s));
        Some(Relocation {
            relative: parts.join("/"),
            logical,
        })
    }
}
