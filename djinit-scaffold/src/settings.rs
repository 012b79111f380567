//! Text edits on `settings/base.py`'s `USER_DEFINED_APPS` list.
//!
//! The list is located line by line: it opens on the first line starting
//! with `USER_DEFINED_APPS` and holding an `=`, and closes on the first line that is
//! just `]`. Everything else in the file is left byte-for-byte intact.

pub const APPS_LIST: &str = "USER_DEFINED_APPS";

const INDENT: &str = "    ";

fn opens_list(line: &str) -> bool {
    line.trim_start().starts_with(APPS_LIST) && line.contains('=')
}

fn closes_list(line: &str) -> bool {
    line.trim() == "]"
}

/// `    "apps.users",` → `apps.users`; `None` for lines that are not a
/// quoted entry.
fn entry_value(line: &str) -> Option<&str> {
    let item = line.trim().trim_end_matches(',').trim_end();
    ['"', '\'']
        .iter()
        .find_map(|q| item.strip_prefix(*q)?.strip_suffix(*q))
}

/// Line indices `(open, close)` of a multi-line list. `None` for a missing
/// or single-line list.
fn list_bounds(lines: &[&str]) -> Option<(usize, usize)> {
    let open = lines.iter().position(|l| opens_list(l))?;
    if lines[open].split_once('[').is_some_and(|(_, rest)| rest.contains(']')) {
        return None;
    }
    let close = lines[open + 1..].iter().position(|l| closes_list(l))? + open + 1;
    Some((open, close))
}

/// Quoted entries currently in the list, in file order.
pub fn existing_apps(content: &str) -> Vec<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let Some((open, close)) = list_bounds(&lines) else {
        return Vec::new();
    };
    lines[open + 1..close]
        .iter()
        .filter_map(|l| entry_value(l))
        .map(str::to_string)
        .collect()
}

pub fn contains_app(content: &str, app: &str) -> bool {
    existing_apps(content).iter().any(|a| a == app)
}

/// Insert one `    "<app>",` line per app just before the closing `]`.
///
/// A one-line `USER_DEFINED_APPS = []` is expanded into the multi-line form.
/// Returns `None` when the file has no list to insert into.
pub fn insert_apps<S: AsRef<str>>(content: &str, apps: &[S]) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let entries: Vec<String> = apps
        .iter()
        .map(|a| format!("{INDENT}\"{}\",", a.as_ref()))
        .collect();

    if let Some((open, close)) = list_bounds(&lines) {
        let mut out: Vec<String> = Vec::with_capacity(lines.len() + entries.len());
        out.extend(lines[..close].iter().map(|l| l.to_string()));
        out.extend(entries);
        out.extend(lines[close..].iter().map(|l| l.to_string()));
        tracing::debug!(open, close, "inserted apps into {APPS_LIST}");
        return Some(out.join("\n"));
    }

    let open = lines.iter().position(|l| opens_list(l))?;
    let (head, _) = lines[open].split_once('[')?;
    if lines[open][head.len()..].replace(' ', "") != "[]" {
        return None;
    }
    let mut out: Vec<String> = lines[..open].iter().map(|l| l.to_string()).collect();
    out.push(format!("{head}["));
    out.extend(entries);
    out.push("]".to_string());
    out.extend(lines[open + 1..].iter().map(|l| l.to_string()));
    Some(out.join("\n"))
}

/// Rewrite the entry `old` to `new`, keeping its indentation and quote
/// style. Returns `None` when `old` is not in the list.
pub fn replace_app(content: &str, old: &str, new: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let (open, close) = list_bounds(&lines)?;
    let idx = (open + 1..close).find(|&i| entry_value(lines[i]) == Some(old))?;

    let line = lines[idx];
    let indent_len = line.len() - line.trim_start().len();
    let quote = if line.trim_start().starts_with('\'') { '\'' } else { '"' };
    let replacement = format!("{}{quote}{new}{quote},", &line[..indent_len]);

    let mut out: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    out[idx] = replacement;
    Some(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const BASE: &str = indoc! {r#"
        DJANGO_APPS = [
            "django.contrib.admin",
        ]

        USER_DEFINED_APPS = [
            "users.apps.UsersConfig",
            'orders',
        ]

        INSTALLED_APPS = DJANGO_APPS + USER_DEFINED_APPS
    "#};

    #[test]
    fn lists_existing_entries_only_from_user_list() {
        assert_eq!(existing_apps(BASE), vec!["users.apps.UsersConfig", "orders"]);
        assert!(contains_app(BASE, "orders"));
        assert!(!contains_app(BASE, "django.contrib.admin"));
    }

    #[test]
    fn inserts_before_closing_bracket() {
        let out = insert_apps(BASE, &["blog.apps.BlogConfig"]).unwrap();
        assert!(out.contains(indoc! {r#"
            USER_DEFINED_APPS = [
                "users.apps.UsersConfig",
                'orders',
                "blog.apps.BlogConfig",
            ]
        "#}));
        assert!(out.ends_with("INSTALLED_APPS = DJANGO_APPS + USER_DEFINED_APPS\n"));
    }

    #[test]
    fn expands_one_line_empty_list() {
        let out = insert_apps("X = 1\nUSER_DEFINED_APPS = []\n", &["a", "b"]).unwrap();
        assert_eq!(out, "X = 1\nUSER_DEFINED_APPS = [\n    \"a\",\n    \"b\",\n]\n");
    }

    #[test]
    fn missing_list_yields_none() {
        assert_eq!(insert_apps("INSTALLED_APPS = []\n", &["a"]), None);
        assert_eq!(insert_apps("USER_DEFINED_APPS = OTHER\n", &["a"]), None);
        assert!(existing_apps("nothing here").is_empty());
    }

    #[test]
    fn replaces_entry_keeping_quote_style() {
        let out = replace_app(BASE, "orders", "orders.apps.OrdersConfig").unwrap();
        assert!(out.contains("    'orders.apps.OrdersConfig',\n"));
        assert!(!contains_app(&out, "orders"));
        assert_eq!(replace_app(BASE, "missing", "x"), None);
    }
}
