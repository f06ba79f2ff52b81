use super::{is_batch, read_json};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use quire_common::section_references;
use quire_editor::{Document, Importer, Project, ProjectRegistry};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// File or directory of exported JSON (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: String,
}

/// Findings for one file that decoded successfully
#[derive(Debug, Default)]
pub struct FileReport {
    pub documents: usize,
    pub problems: Vec<String>,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let target = PathBuf::from(cwd).join(&args.path);

    let files = if target.is_file() {
        vec![target.clone()]
    } else {
        find_json_files(&target)?
    };

    if files.is_empty() {
        println!("{}", "⚠️  No .json files found".yellow());
        return Ok(());
    }

    println!("{}", "🔍 Checking documents...".bright_blue().bold());

    let mut error_count = 0;
    for file in &files {
        let relative_path = file.strip_prefix(&target).unwrap_or(file);
        match check_file(file, &config) {
            Ok(report) if report.problems.is_empty() => {
                println!(
                    "  {} {} ({} documents)",
                    "✓".green(),
                    relative_path.display(),
                    report.documents
                );
            }
            Ok(report) => {
                error_count += 1;
                eprintln!("  {} {}", "✗".red(), relative_path.display());
                for problem in report.problems {
                    eprintln!("      {}", problem);
                }
            }
            Err(e) => {
                error_count += 1;
                eprintln!("  {} {} - {}", "✗".red(), relative_path.display(), e);
            }
        }
    }

    println!();
    if error_count == 0 {
        println!("{} Checked {} files", "✅".green(), files.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} files have problems", error_count, files.len()))
    }
}

/// Decode one file, which rejects malformed records and duplicate names.
/// Batches are also loaded as a project, which checks ident collisions,
/// section names and cycles, and are then searched for placeholders naming
/// a section the batch does not contain.
pub fn check_file(path: &Path, config: &Config) -> Result<FileReport> {
    debug!(file = %path.display(), "Checking file");
    let json = read_json(path)?;
    let importer = Importer::new(config.project.as_str());

    if is_batch(&json) {
        let batch = importer.decode_batch(&json)?;
        let mut registry = ProjectRegistry::new();
        let project = Project::load(
            &mut registry,
            config.project.as_str(),
            config.editor.clone(),
            batch,
        )?;
        let sections = project.sections();
        let documents: Vec<&Document> = project.pages().chain(sections.documents()).collect();
        let problems = documents
            .iter()
            .flat_map(|doc| {
                section_references(doc.roots())
                    .into_iter()
                    .filter(move |section| !sections.contains(section))
                    .map(move |section| {
                        format!("{} ({}): placeholder for missing section {:?}", doc.name, doc.ident, section)
                    })
            })
            .collect();

        return Ok(FileReport {
            documents: documents.len(),
            problems,
        });
    }

    // a lone document carries no sections to check placeholders against
    importer.decode_document(&json)?;
    Ok(FileReport {
        documents: 1,
        problems: Vec::new(),
    })
}

fn find_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json")
            && path.file_name().and_then(|s| s.to_str()) != Some(crate::config::DEFAULT_CONFIG_NAME)
        {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_editor::{export_batch, to_json, ComponentKind, Ident, Node, Roots, Widget};
    use serde_json::json;
    use std::fs;

    fn page_with_widgets(names: &[&str]) -> Document {
        let mut body = Node::element("body");
        for name in names {
            body = body.with_child(Node::Widget(Widget::new(
                ComponentKind::new("widgets", "Box"),
                *name,
                0,
            )));
        }
        Document::new(
            Ident::new("site", 1),
            "home",
            Roots::Page {
                head: Node::element("head"),
                body,
            },
        )
    }

    #[test]
    fn test_clean_document_has_no_problems() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("home.json");
        fs::write(&file, to_json(&page_with_widgets(&["a", "b"])).to_string()).unwrap();

        let report = check_file(&file, &Config::default()).unwrap();
        assert_eq!(report.documents, 1);
        assert!(report.problems.is_empty());
    }

    #[test]
    fn test_duplicate_names_fail() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("home.json");
        fs::write(&file, to_json(&page_with_widgets(&["a", "a"])).to_string()).unwrap();

        let err = check_file(&file, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("\"a\""));
    }

    #[test]
    fn test_missing_section_is_reported_for_batches() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("site.json");
        let page = Document::new(
            Ident::new("site", 1),
            "home",
            Roots::Page {
                head: Node::element("head"),
                body: Node::element("body").with_child(Node::placeholder("footer", "f")),
            },
        );
        fs::write(&file, export_batch("site", [], [&page]).to_string()).unwrap();

        let report = check_file(&file, &Config::default()).unwrap();
        assert_eq!(report.documents, 1);
        assert_eq!(report.problems.len(), 1);
        assert!(report.problems[0].contains("\"footer\""));
    }

    #[test]
    fn test_newer_major_version_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("future.json");
        let mut json = to_json(&page_with_widgets(&[]));
        json["format"] = json!("2.0.0");
        fs::write(&file, json.to_string()).unwrap();

        assert!(check_file(&file, &Config::default()).is_err());
    }

    #[test]
    fn test_find_json_files_skips_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join(crate::config::DEFAULT_CONFIG_NAME), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = find_json_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a.json")]);
    }
}
