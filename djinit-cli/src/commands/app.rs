//! `djinit app <names>...` — add apps to the project in the current directory.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use djinit_core::{
    types::AppName,
    validate::{parse_app_names, validate_app_name},
};
use djinit_scaffold::{create_app, Registration};

use super::{count_writes, load_engine, print_writes};

/// Arguments for `djinit app`.
#[derive(Args, Debug)]
pub struct AppArgs {
    /// App names, space- or comma-separated.
    #[arg(required = true, num_args = 1..)]
    pub names: Vec<String>,

    /// Show what would be written, plus the settings diff.
    #[arg(long)]
    pub dry_run: bool,

    /// Directory of `*-tpl` files overriding the bundled templates.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl AppArgs {
    pub fn run(self) -> Result<()> {
        let names = parse_app_names(&self.names);
        if names.is_empty() {
            bail!("no app names given");
        }
        let apps = names
            .iter()
            .map(|name| validate_app_name(name).map(AppName::from))
            .collect::<Result<Vec<_>, _>>()?;

        let root = std::env::current_dir().context("cannot read current directory")?;
        let engine = load_engine(self.templates.as_deref())?;
        let prefix = if self.dry_run { "[dry-run] " } else { "" };

        for app in &apps {
            let outcome = create_app(&root, app, &engine, self.dry_run)
                .with_context(|| format!("failed to create app '{app}'"))?;

            let (changed, unchanged) = count_writes(&outcome.writes);
            println!(
                "{prefix}{} App '{app}' created as {} ({changed} written, {unchanged} unchanged)",
                "✓".green().bold(),
                outcome.module_path
            );
            print_writes(&root, &outcome.writes);

            match &outcome.registration {
                Registration::Added => {
                    println!("  registered {} in USER_DEFINED_APPS", outcome.config_path)
                }
                Registration::Upgraded { from } => println!(
                    "  upgraded USER_DEFINED_APPS entry {from} → {}",
                    outcome.config_path
                ),
                Registration::AlreadyPresent => println!(
                    "  {} already in USER_DEFINED_APPS",
                    outcome.config_path
                ),
            }
            if let Some(diff) = outcome.settings_diff.as_deref().filter(|d| !d.is_empty()) {
                print!("{diff}");
                if !diff.ends_with('\n') {
                    println!();
                }
            }
        }

        if !self.dry_run {
            println!();
            println!("{}", "Next steps:".bold());
            println!("  python manage.py makemigrations");
            println!("  python manage.py migrate");
        }
        Ok(())
    }
}
