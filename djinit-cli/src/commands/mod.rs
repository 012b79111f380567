pub mod app;
pub mod render;
pub mod secret;
pub mod setup;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use djinit_scaffold::WriteResult;
use djinit_template::TemplateEngine;

/// Embedded templates, overridden by files under `templates` when given.
pub(crate) fn load_engine(templates: Option<&Path>) -> Result<TemplateEngine> {
    let engine = TemplateEngine::new(templates).with_context(|| match templates {
        Some(dir) => format!("failed to load templates from '{}'", dir.display()),
        None => "failed to load bundled templates".to_string(),
    })?;
    tracing::debug!(count = engine.template_names().len(), "templates loaded");
    Ok(engine)
}

/// One line per file: `✎` written, `~` would write, `·` unchanged.
pub(crate) fn print_writes(root: &Path, writes: &[WriteResult]) {
    for r in writes {
        let shown = display_relative(root, r.path());
        match r {
            WriteResult::Written { .. } => println!("  {}  {shown}", "✎".green()),
            WriteResult::WouldWrite { .. } => println!("  {}  {shown}", "~".yellow()),
            WriteResult::Unchanged { .. } => println!("  {}  {shown}", "·".bright_black()),
        }
    }
}

/// `(changed, unchanged)` counts, where dry-run writes count as changed.
pub(crate) fn count_writes(writes: &[WriteResult]) -> (usize, usize) {
    let unchanged = writes
        .iter()
        .filter(|r| matches!(r, WriteResult::Unchanged { .. }))
        .count();
    (writes.len() - unchanged, unchanged)
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(PathBuf::from)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
