//! Resolving a file pattern to an ordered carrier file list
//!
//! Matching files are put into natural order (digit runs compare
//! numerically, so `disk2` sorts before `disk10`). Payload striping and
//! recovery must visit the files in the same order regardless of how the
//! filesystem enumerates them.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{StegError, StegResult};

/// Resolve `pattern` to the ordered list of matching files.
///
/// By default the pattern is a glob (`?`/`*` wildcards). With `use_regex`
/// the file stem is treated as a regular expression, anchored and suffixed
/// with the archive extension, and matched against the names in the
/// pattern's directory.
pub fn resolve_pattern(pattern: &str, use_regex: bool) -> StegResult<Vec<PathBuf>> {
    let mut files = if use_regex {
        regex_matches(pattern)?
    } else {
        glob_matches(pattern)?
    };
    if files.is_empty() {
        return Err(StegError::NoMatch(pattern.to_owned()));
    }
    files.sort_by(|a, b| natural_order(&a.to_string_lossy(), &b.to_string_lossy()));
    Ok(files)
}

fn glob_matches(pattern: &str) -> StegResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| StegError::BadPattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(paths
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect())
}

fn regex_matches(pattern: &str) -> StegResult<Vec<PathBuf>> {
    let path = Path::new(pattern);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stem = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Anchor the stem and fix the archive suffix so `disk.*` cannot stray
    // beyond `.7z` files
    let regex = Regex::new(&format!("^{stem}\\.7z$")).map_err(|e| StegError::BadPattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })?;

    let entries = fs::read_dir(directory).map_err(|source| StegError::Io {
        path: directory.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StegError::Io {
            path: directory.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if regex.is_match(&name) && entry.path().is_file() {
            files.push(directory.join(name));
        }
    }
    Ok(files)
}

/// Natural string ordering: runs of ASCII digits compare as numbers, other
/// runs compare lexicographically
pub fn natural_order(a: &str, b: &str) -> Ordering {
    let chunks_a = chunks(a);
    let chunks_b = chunks(b);
    for (x, y) in chunks_a.iter().zip(&chunks_b) {
        let ordering = match (x.numeric, y.numeric) {
            (true, true) => compare_numeric(x.text, y.text),
            _ => x.text.cmp(y.text),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    chunks_a.len().cmp(&chunks_b.len())
}

struct Chunk<'a> {
    numeric: bool,
    text: &'a str,
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (index, character) in s.char_indices() {
        let numeric = character.is_ascii_digit();
        if current != Some(numeric) {
            if index > start {
                out.push(Chunk {
                    numeric: current == Some(true),
                    text: &s[start..index],
                });
            }
            start = index;
            current = Some(numeric);
        }
    }
    if start < s.len() {
        out.push(Chunk {
            numeric: current == Some(true),
            text: &s[start..],
        });
    }
    out
}

/// Compare digit runs without parsing them into a fixed-width integer
fn compare_numeric(x: &str, y: &str) -> Ordering {
    let stripped_x = x.trim_start_matches('0');
    let stripped_y = y.trim_start_matches('0');
    stripped_x
        .len()
        .cmp(&stripped_y.len())
        .then_with(|| stripped_x.cmp(stripped_y))
        .then_with(|| x.len().cmp(&y.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sorted(mut names: Vec<&str>) -> Vec<&str> {
        names.sort_by(|a, b| natural_order(a, b));
        names
    }

    #[test]
    fn digit_runs_compare_numerically() {
        assert_eq!(
            sorted(vec!["part10.7z", "part2.7z", "part1.7z"]),
            vec!["part1.7z", "part2.7z", "part10.7z"]
        );
    }

    #[test]
    fn mixed_text_falls_back_to_lexicographic() {
        assert_eq!(
            sorted(vec!["b.7z", "a10.7z", "a9.7z"]),
            vec!["a9.7z", "a10.7z", "b.7z"]
        );
    }

    #[test]
    fn leading_zeros_break_ties_by_length() {
        assert_eq!(sorted(vec!["a01", "a1", "a001"]), vec!["a1", "a01", "a001"]);
    }

    #[test]
    fn prefixes_sort_first() {
        assert_eq!(natural_order("disk", "disk1"), Ordering::Less);
        assert_eq!(natural_order("disk1", "disk1"), Ordering::Equal);
    }
}
