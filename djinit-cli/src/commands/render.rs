//! `djinit render <file>` — render any template file and print it.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::Value;

use djinit_template::{render, Context};

/// Arguments for `djinit render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template file to render.
    pub template: PathBuf,

    /// JSON or YAML (`.yaml`/`.yml`) file holding a top-level mapping.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Extra variable; the value is parsed as JSON, else taken as a string.
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, Value)>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let text = std::fs::read_to_string(&self.template)
            .with_context(|| format!("cannot read template '{}'", self.template.display()))?;

        let mut ctx = match &self.context {
            Some(path) => load_context(path)?,
            None => Context::new(),
        };
        for (key, value) in self.set {
            ctx.insert(key, value);
        }

        println!("{}", render(&text, &ctx));
        Ok(())
    }
}

fn load_context(path: &Path) -> Result<Context> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read context '{}'", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let value: Value = if is_yaml {
        serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid YAML in '{}'", path.display()))?
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid JSON in '{}'", path.display()))?
    };
    Context::from_serialize(&value)
        .with_context(|| format!("context file '{}' must hold a mapping", path.display()))
}

fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignment_values_parse_as_json_first() {
        assert_eq!(parse_assignment("n=3").unwrap(), ("n".to_string(), json!(3)));
        assert_eq!(parse_assignment("on=true").unwrap().1, json!(true));
        assert_eq!(parse_assignment("xs=[1,2]").unwrap().1, json!([1, 2]));
        assert_eq!(parse_assignment("name=shop").unwrap().1, json!("shop"));
        assert_eq!(parse_assignment("eq=a=b").unwrap().1, json!("a=b"));
        assert_eq!(parse_assignment("empty=").unwrap().1, json!(""));
    }

    #[test]
    fn malformed_assignment_is_rejected() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }
}
