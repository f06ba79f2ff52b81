use super::{is_batch, read_json};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use quire_editor::{node_to_json, Importer, LocationPath};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Exported document or batch
    pub file: String,

    /// Location path, e.g. `body/0/2` or `@nav#1/0`
    pub path: String,

    /// Ident number of the document to show when `file` is a batch
    #[arg(short, long)]
    pub ident: Option<i64>,
}

pub fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let json = read_json(&PathBuf::from(cwd).join(&args.file))?;
    let record = node_at(&json, &args.path, args.ident, &config)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Tagged record of the node at `path`
pub fn node_at(json: &Value, path: &str, ident: Option<i64>, config: &Config) -> Result<Value> {
    let path: LocationPath = path.parse()?;
    let importer = Importer::new(config.project.as_str());

    let document = if is_batch(json) {
        let mut documents = importer.decode_batch(json)?.documents;
        let position = match ident {
            Some(number) => documents
                .iter()
                .position(|doc| doc.ident.number == number)
                .ok_or_else(|| anyhow!("No document {} in batch", number))?,
            None if documents.is_empty() => return Err(anyhow!("Batch has no documents")),
            None => 0,
        };
        documents.swap_remove(position)
    } else {
        importer.decode_document(json)?
    };

    let node = document.resolve(&path)?;
    Ok(node_to_json(node, &document.ident.project))
}
