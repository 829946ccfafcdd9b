const FILE_HEADER: &str = "diff --git ";
const DEFAULT_EXCLUDED: [&str; 7] = ["svg", "png", "jpg", "jpeg", "gif", "ico", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedExtensions(Vec<String>);

impl ExcludedExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }

    pub fn parse(value: &str) -> Self {
        Self::new(value.split(','))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn matches(&self, path: &str) -> bool {
        let Some((_, ext)) = path.rsplit_once('.') else {
            return false;
        };
        if ext.contains('/') {
            return false;
        }
        let ext = ext.to_lowercase();
        self.0.iter().any(|excluded| *excluded == ext)
    }
}

impl Default for ExcludedExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED)
    }
}

/// Removes every per-file hunk whose path has an excluded extension. Anything
/// before the first file header is kept as is.
pub fn filter_diff(diff: &str, excluded: &ExcludedExtensions) -> String {
    let mut filtered = String::with_capacity(diff.len());
    let mut skipping = false;

    for line in diff.split_inclusive('\n') {
        if let Some(header) = line.strip_prefix(FILE_HEADER) {
            let (old_path, new_path) = header_paths(header.trim_end());
            skipping = old_path.is_some_and(|path| excluded.matches(path))
                || new_path.is_some_and(|path| excluded.matches(path));
        }
        if !skipping {
            filtered.push_str(line);
        }
    }

    filtered
}

// Paths with special characters arrive quoted: `"a/\303\251.svg" "b/\303\251.svg"`.
fn header_paths(header: &str) -> (Option<&str>, Option<&str>) {
    let split = header
        .split_once(" \"b/")
        .or_else(|| header.split_once(" b/"));
    match split {
        Some((old, new)) => (Some(unquote_path(old)), Some(new.trim_end_matches('"'))),
        None => (Some(unquote_path(header)), None),
    }
}

fn unquote_path(path: &str) -> &str {
    let path = path.strip_prefix('"').unwrap_or(path);
    let path = path.strip_suffix('"').unwrap_or(path);
    path.strip_prefix("a/").unwrap_or(path)
}
