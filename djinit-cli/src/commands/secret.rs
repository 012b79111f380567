//! `djinit secret` — generate Django SECRET_KEY values.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use djinit_core::secret::{generate_secret_keys, DEFAULT_KEY_COUNT, DEFAULT_KEY_LENGTH};

/// Arguments for `djinit secret`.
#[derive(Args, Debug)]
pub struct SecretArgs {
    /// Number of keys to generate.
    #[arg(long, short = 'c', default_value_t = DEFAULT_KEY_COUNT)]
    pub count: usize,

    /// Characters per key.
    #[arg(long, short = 'l', default_value_t = DEFAULT_KEY_LENGTH)]
    pub length: usize,
}

#[derive(Tabled)]
struct KeyRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "SECRET_KEY")]
    key: String,
}

impl SecretArgs {
    pub fn run(self) -> Result<()> {
        if self.count == 0 || self.length == 0 {
            bail!("--count and --length must be at least 1");
        }
        let rows: Vec<KeyRow> = generate_secret_keys(self.count, self.length)
            .into_iter()
            .enumerate()
            .map(|(i, key)| KeyRow { index: i + 1, key })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!();
        println!("{}", "Usage:".bold());
        println!("  Put one key in your .env file:  SECRET_KEY=<key>");
        println!("  Use a different key per environment and never commit it.");
        Ok(())
    }
}
