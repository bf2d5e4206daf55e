pub mod invisible;

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

const UNITS: [(u64, &str); 6] = [
    (1_000, "kB"),
    (1_000_000, "MB"),
    (1_000_000_000, "GB"),
    (1_000_000_000_000, "TB"),
    (1_000_000_000_000_000, "PB"),
    (1_000_000_000_000_000_000, "EB"),
];

/// Formats `bytes` with SI units (powers of 1000), truncating rather than rounding to
/// `max_decimals` decimals. `None` keeps every decimal.
pub fn human_bytes(bytes: u64, max_decimals: Option<usize>) -> String {
    let Some(&(unit_value, unit)) = UNITS.iter().rev().find(|(value, _)| bytes >= *value) else {
        return format!("{} B", bytes);
    };

    let number = (bytes as f64 / unit_value as f64).to_string();
    format!("{} {}", trim_decimals(&number, max_decimals), unit)
}

fn trim_decimals(number: &str, max_decimals: Option<usize>) -> &str {
    let (Some(max_decimals), Some(dot)) = (max_decimals, number.find('.')) else {
        return number;
    };
    let end = if max_decimals == 0 { dot } else { dot + max_decimals + 1 };
    &number[..end.min(number.len())]
}

/// Path of a file or folder as shown to the user: relative to `root` unless the root is
/// `/`, with the root itself shown as `.`.
pub fn display_path(identifier: &OsStr, root: &Path) -> String {
    let path = Path::new(identifier);
    if root == Path::new("/") {
        return path.to_string_lossy().into_owned();
    }

    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Lexically removes `.` components and folds `..` into its parent, like Go's
/// `filepath.Clean`. Symlinks are not consulted. `..` directly under the root is dropped.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

const ELLIPSIS: &str = "...";

/// Cuts `text` so that it and its ellipsis fit in `width` characters. Returns the kept
/// prefix and the ellipsis to draw after it: empty when nothing was cut, shortened when
/// `width` is below three.
pub fn truncate_chars(text: &str, width: usize) -> (&str, &'static str) {
    if text.chars().count() <= width {
        return (text, "");
    }

    let dots = width.min(ELLIPSIS.len());
    let end = text
        .char_indices()
        .nth(width - dots)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    (&text[..end], &ELLIPSIS[..dots])
}
