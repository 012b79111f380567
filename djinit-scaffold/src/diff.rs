//! Unified diffs for dry-run previews of edited files.

use similar::TextDiff;

/// Unified diff from `old` to `new` with `a/<label>` / `b/<label>` headers.
/// Empty when the two are identical.
pub fn unified_diff(label: &str, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    let old_header = format!("a/{label}");
    let new_header = format!("b/{label}");
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_has_no_diff() {
        assert_eq!(unified_diff("base.py", "a\n", "a\n"), "");
    }

    #[test]
    fn added_line_shows_in_hunk() {
        let old = "USER_DEFINED_APPS = [\n]\n";
        let new = "USER_DEFINED_APPS = [\n    \"users\",\n]\n";
        let diff = unified_diff("config/settings/base.py", old, new);
        assert!(diff.contains("--- a/config/settings/base.py"));
        assert!(diff.contains("+++ b/config/settings/base.py"));
        assert!(diff.contains("@@"));
        assert!(diff.contains("+    \"users\","));
    }
}
