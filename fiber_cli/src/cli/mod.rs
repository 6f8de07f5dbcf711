//! Subcommand implementations.

pub mod calc;
pub mod consent;
pub mod counter;
pub mod stripes;
pub mod tools;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::Serialize;

use fiber_core::settings::Settings;
use fiber_core::store::DirectoryBackend;

/// Settings and paths resolved once in `main`.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn backend(&self) -> DirectoryBackend {
        DirectoryBackend::new(&self.data_dir)
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// `name=value` pair from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub value: String,
}

/// clap value parser for [`Assignment`]
pub fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    Ok(Assignment {
        field: field.to_string(),
        value: value.trim().to_string(),
    })
}
