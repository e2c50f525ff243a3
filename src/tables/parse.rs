use crate::tables::TableError;
use std::fs;
use std::path::Path;

/// Reads a table file, decoding invalid UTF-8 lossily rather than rejecting it.
pub fn read_table(path: &Path) -> Result<String, TableError> {
    let bytes = fs::read(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(err) => {
            let bytes = err.into_bytes();
            tracing::warn!(
                target: "npcgen::tables",
                path = %path.display(),
                "table contained invalid UTF-8; decoding lossy"
            );
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Trimmed, 1-based numbered lines that are neither blank nor comments.
pub fn content_lines<'a>(
    content: &'a str,
    comment_marks: &'a [char],
) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    content
        .lines()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, raw.trim()))
        .filter(move |(_, line)| {
            !line.is_empty() && !line.starts_with(|ch: char| comment_marks.contains(&ch))
        })
}

/// Splits `key=value`, trimming both sides. `None` when there is no `=` or the key
/// is empty.
pub fn key_value(field: &str) -> Option<(&str, &str)> {
    let (key, value) = field.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// Comma-separated list with blank entries dropped.
pub fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Exactly six comma-separated numbers, or `None`.
pub fn six<T: std::str::FromStr>(value: &str) -> Option<[T; 6]> {
    let parsed: Vec<T> = value
        .split(',')
        .map(|part| part.trim().parse::<T>())
        .collect::<Result<_, _>>()
        .ok()?;
    parsed.try_into().ok()
}

pub fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_lines_skip_blank_and_comments() {
        let content = "# header\n\n  alpha  \n; note\nbeta\n";
        let lines: Vec<_> = content_lines(content, &['#']).collect();
        assert_eq!(lines, vec![(3, "alpha"), (4, "; note"), (5, "beta")]);
        let lines: Vec<_> = content_lines(content, &['#', ';']).collect();
        assert_eq!(lines, vec![(3, "alpha"), (5, "beta")]);
    }

    #[test]
    fn six_requires_exact_count() {
        assert_eq!(six::<i32>("1,2,3,4,5,6"), Some([1, 2, 3, 4, 5, 6]));
        assert_eq!(six::<i32>("1,2,3"), None);
        assert_eq!(six::<i32>("1,2,3,4,5,x"), None);
        assert_eq!(six::<f32>(" 1.5, 1,1,1,1, 0.5"), Some([1.5, 1.0, 1.0, 1.0, 1.0, 0.5]));
    }

    #[test]
    fn helpers_trim_and_unquote() {
        assert_eq!(key_value(" weight = 40 "), Some(("weight", "40")));
        assert_eq!(key_value("=40"), None);
        assert_eq!(key_value("weight"), None);
        assert_eq!(comma_list("pistol, ,smg,"), vec!["pistol", "smg"]);
        assert_eq!(unquote("\"Hoi, %name%.\""), "Hoi, %name%.");
        assert_eq!(unquote("\"open"), "\"open");
    }
}
