//! `djinit setup <dir> --project <name> ...` — create a Django project.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use djinit_core::{
    types::{AppName, DatabaseType, ProjectSettings},
    validate::{parse_app_names, validate_app_name, validate_name, validate_project_name},
    NameKind,
};
use djinit_scaffold::create_project;

use super::{count_writes, load_engine, print_writes};

/// Arguments for `djinit setup`.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Directory to create the project in (created if missing).
    pub dir: PathBuf,

    /// Project name, used in README, pyproject.toml and docs.
    #[arg(long, short = 'p')]
    pub project: String,

    /// App to create; repeat or comma-separate for several.
    #[arg(long = "app", short = 'a', value_name = "NAME")]
    pub apps: Vec<String>,

    /// Python package holding settings, urls, wsgi and asgi.
    /// Defaults to the project name.
    #[arg(long, short = 'm')]
    pub module: Option<String>,

    /// Put apps under this package (e.g. `apps`).
    #[arg(long, value_name = "DIR")]
    pub nested_dir: Option<String>,

    /// Production database backend.
    #[arg(long, default_value = "postgresql")]
    pub database: DatabaseType,

    /// Configure the database from individual DB_* variables instead of DATABASE_URL.
    #[arg(long)]
    pub no_database_url: bool,

    /// Directory of `*-tpl` files overriding the bundled templates.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Show what would be written without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl SetupArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.project_settings()?;
        let engine = load_engine(self.templates.as_deref())?;

        if !self.dry_run {
            std::fs::create_dir_all(&self.dir)
                .with_context(|| format!("cannot create '{}'", self.dir.display()))?;
        }

        let writes = create_project(&self.dir, &settings, &engine, self.dry_run)
            .with_context(|| format!("setup failed for '{}'", settings.project_name))?;

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        let (changed, unchanged) = count_writes(&writes);
        println!(
            "{prefix}{} Project '{}' ready in {} ({changed} written, {unchanged} unchanged)",
            "✓".green().bold(),
            settings.project_name,
            self.dir.display()
        );
        print_writes(&self.dir, &writes);

        if !self.dry_run {
            println!();
            println!("{}", "Next steps:".bold());
            println!("  cd {}", self.dir.display());
            println!("  python -m venv .venv && source .venv/bin/activate");
            println!("  pip install -r requirements.txt");
            println!("  cp .env.sample .env");
            println!("  python manage.py migrate");
            println!("  python manage.py runserver");
        }
        Ok(())
    }

    fn project_settings(&self) -> Result<ProjectSettings> {
        let project = validate_project_name(&self.project)?;
        let module = match &self.module {
            Some(module) => validate_name(module, NameKind::Project)
                .context("invalid --module")?,
            None => project.clone(),
        };
        let apps = parse_app_names(&self.apps)
            .iter()
            .map(|name| validate_app_name(name).map(AppName::from))
            .collect::<Result<Vec<_>, _>>()?;
        let nested_dir = self
            .nested_dir
            .as_deref()
            .map(|d| d.trim().trim_matches('/').to_string())
            .filter(|d| !d.is_empty());

        let mut settings = ProjectSettings::new(project);
        settings.module_name = module;
        settings.apps = apps;
        settings.nested_dir = nested_dir;
        settings.use_database_url = !self.no_database_url;
        settings.database_type = self.database;
        Ok(settings)
    }
}
