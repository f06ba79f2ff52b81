use super::{is_batch, read_json};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_editor::{to_json, Importer, Project, ProjectRegistry};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Args)]
pub struct RenumberArgs {
    /// Exported document or batch
    pub file: String,

    /// Offset added to every positive ident number (overrides config)
    #[arg(short, long)]
    pub addition: Option<i64>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<String>,
}

pub fn renumber(args: RenumberArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let addition = args.addition.unwrap_or(config.addition);
    let json = read_json(&PathBuf::from(cwd).join(&args.file))?;

    let renumbered = renumber_json(&json, addition, &config)?;
    let text = serde_json::to_string_pretty(&renumbered)?;

    match args.output {
        Some(output) => {
            fs::write(PathBuf::from(cwd).join(&output), text)?;
            eprintln!(
                "  {} Renumbered {} by {} → {}",
                "✓".green(),
                args.file,
                addition,
                output
            );
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Import into a fresh registry with `addition`, then export again
pub fn renumber_json(json: &Value, addition: i64, config: &Config) -> Result<Value> {
    debug!(project = %config.project, addition, "Renumbering export");
    let mut registry = ProjectRegistry::new();
    registry.load_project(&config.project, Vec::new())?;

    if is_batch(json) {
        let mut project = Project::new(config.project.as_str(), config.editor.clone());
        project.import(&mut registry, json, addition)?;
        Ok(project.export())
    } else {
        let document = Importer::new(config.project.as_str())
            .with_addition(addition)
            .import_document(&mut registry, json)?;
        Ok(to_json(&document))
    }
}
