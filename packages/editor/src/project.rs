//! # Project
//!
//! Pages, folders and sections of one project, with the editor config that
//! governs them. Ident allocation goes through a [`ProjectRegistry`] owned
//! by the caller.

use crate::catalog::WidgetCatalog;
use crate::config::EditorConfig;
use crate::document::{Applied, Document};
use crate::errors::EditorError;
use crate::mutations::{EditContext, Mutation, MutationError};
use crate::registry::{DocumentHandle, DocumentKind, ProjectRegistry};
use crate::sections::{SectionError, SectionStore};
use crate::serializer::{export_batch, Batch, Importer};
use crate::token::ChangeToken;
use quire_common::duplicate_names;
use quire_tree::{Ident, Node, Roots};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// Folder in the page hierarchy; `parent` is `None` only for the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub ident: Ident,
    pub name: String,
    pub brief: String,
    pub parent: Option<Ident>,
}

impl Folder {
    pub fn handle(&self) -> DocumentHandle {
        DocumentHandle::new(self.ident.clone(), DocumentKind::Folder, self.name.clone())
    }
}

#[derive(Debug)]
pub struct Project {
    name: String,
    config: EditorConfig,
    folders: BTreeMap<i64, Folder>,
    pages: BTreeMap<i64, Document>,
    sections: SectionStore,
}

impl Project {
    pub fn new(name: impl Into<String>, config: EditorConfig) -> Self {
        Self {
            name: name.into(),
            config,
            folders: BTreeMap::new(),
            pages: BTreeMap::new(),
            sections: SectionStore::new(),
        }
    }

    /// Cold start: rebuild a project and its ident state from persisted
    /// folders and documents.
    ///
    /// Rejects two sections sharing a name and any document that claims a
    /// name twice.
    pub fn load(
        registry: &mut ProjectRegistry,
        name: impl Into<String>,
        config: EditorConfig,
        batch: Batch,
    ) -> Result<Self, EditorError> {
        let mut project = Self::new(name, config);

        let mut sections = SectionStore::new();
        let mut pages = BTreeMap::new();
        for document in batch.documents {
            check_names(document.roots())?;
            if document.roots().is_section() {
                if sections.contains(&document.name) {
                    return Err(SectionError::AlreadyExists(document.name).into());
                }
                sections.put(document)?;
            } else {
                pages.insert(document.ident.number, document);
            }
        }

        registry.load_project(&project.name, handles(&batch.folders, &pages, &sections))?;

        project.folders = batch
            .folders
            .into_iter()
            .map(|folder| (folder.ident.number, folder))
            .collect();
        project.pages = pages;
        project.sections = sections;
        Ok(project)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn page(&self, number: i64) -> Option<&Document> {
        self.pages.get(&number)
    }

    pub fn pages(&self) -> impl Iterator<Item = &Document> {
        self.pages.values()
    }

    pub fn folder(&self, number: i64) -> Option<&Folder> {
        self.folders.get(&number)
    }

    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    pub fn sections(&self) -> &SectionStore {
        &self.sections
    }

    fn ident(&self, number: i64) -> Ident {
        Ident::new(self.name.as_str(), number)
    }

    pub fn create_page(
        &mut self,
        registry: &mut ProjectRegistry,
        name: impl Into<String>,
        roots: Roots,
    ) -> Result<Ident, EditorError> {
        let name = name.into();
        if roots.is_section() {
            return Err(EditorError::NotAPage(name));
        }
        check_names(&roots)?;

        let ident = registry.allocate(&self.name)?;
        let page = Document::new(ident.clone(), name, roots);
        registry.bind(page.handle())?;

        info!(ident = %ident, name = %page.name, "Created page");
        self.pages.insert(ident.number, page);
        Ok(ident)
    }

    pub fn create_section(
        &mut self,
        registry: &mut ProjectRegistry,
        name: impl Into<String>,
        root: Node,
    ) -> Result<Ident, EditorError> {
        let name = name.into();
        if self.sections.contains(&name) {
            return Err(SectionError::AlreadyExists(name).into());
        }
        let roots = Roots::section(root);
        check_names(&roots)?;

        let ident = registry.allocate(&self.name)?;
        let section = Document::new(ident.clone(), name, roots);
        let handle = section.handle();

        if let Err(err) = self.sections.put(section) {
            registry.unreserve(&[ident]);
            return Err(err.into());
        }
        registry.bind(handle)?;

        info!(ident = %ident, "Created section");
        Ok(ident)
    }

    pub fn add_folder(
        &mut self,
        registry: &mut ProjectRegistry,
        name: impl Into<String>,
        brief: impl Into<String>,
        parent: Ident,
    ) -> Result<Ident, EditorError> {
        if !parent.is_root() && !self.folders.contains_key(&parent.number) {
            return Err(EditorError::UnknownDocument(parent));
        }

        let ident = registry.allocate(&self.name)?;
        let folder = Folder {
            ident: ident.clone(),
            name: name.into(),
            brief: brief.into(),
            parent: Some(parent),
        };
        registry.bind(folder.handle())?;
        self.folders.insert(ident.number, folder);
        Ok(ident)
    }

    /// Remove a page and retire its number
    pub fn remove_page(&mut self, registry: &mut ProjectRegistry, number: i64) -> Option<Document> {
        let page = self.pages.remove(&number)?;
        registry.release(&page.ident);
        info!(ident = %page.ident, "Removed page");
        Some(page)
    }

    pub fn apply_to_page(
        &mut self,
        number: i64,
        presented: &ChangeToken,
        mutation: Mutation,
        catalog: Option<&dyn WidgetCatalog>,
    ) -> Result<Applied, EditorError> {
        let unknown = self.ident(number);
        let page = self
            .pages
            .get_mut(&number)
            .ok_or(EditorError::UnknownDocument(unknown))?;

        let mut ctx = EditContext::new(&self.config).with_sections(&self.sections);
        if let Some(catalog) = catalog {
            ctx = ctx.with_catalog(catalog);
        }
        Ok(page.apply(presented, mutation, &ctx)?)
    }

    pub fn apply_to_section(
        &mut self,
        name: &str,
        presented: &ChangeToken,
        mutation: Mutation,
        catalog: Option<&dyn WidgetCatalog>,
    ) -> Result<Applied, EditorError> {
        Ok(self
            .sections
            .apply(name, presented, mutation, &self.config, catalog)?)
    }

    /// Delete a section no placeholder refers to and retire its number
    pub fn delete_section(
        &mut self,
        registry: &mut ProjectRegistry,
        name: &str,
    ) -> Result<Document, EditorError> {
        let section = self.sections.delete(name, self.pages.values())?;
        registry.release(&section.ident);
        info!(section = name, "Deleted section");
        Ok(section)
    }

    /// Remove every placeholder for `section` from pages and other
    /// sections. A section whose whole root is such a placeholder gets the
    /// configured marker text instead. Each touched document gets a fresh
    /// token. Returns the number of placeholders removed.
    pub fn unlink_placeholders(&mut self, section: &str) -> usize {
        let marker = self.config.placeholder_marker.as_str();
        let documents = self
            .pages
            .values_mut()
            .chain(self.sections.documents_mut().filter(|doc| doc.name != section));

        let removed: usize = documents
            .map(|doc| doc.rewrite(|roots| strip_placeholders(roots, section, marker)))
            .sum();

        info!(section, removed, "Unlinked placeholders");
        removed
    }

    /// Roots of a page with every placeholder transcluded
    pub fn expand_page(&self, number: i64) -> Option<Roots> {
        self.pages
            .get(&number)
            .map(|page| self.sections.expand_roots(page.roots()))
    }

    /// Every folder, page and section as one batch
    pub fn export(&self) -> Value {
        export_batch(
            &self.name,
            self.folders.values(),
            self.pages.values().chain(self.sections.documents()),
        )
    }

    /// Import a batch exported from any project, offsetting its numbers by
    /// `addition`. Nothing is added unless every folder, page and section
    /// of the batch is accepted.
    pub fn import(
        &mut self,
        registry: &mut ProjectRegistry,
        json: &Value,
        addition: i64,
    ) -> Result<Vec<Ident>, EditorError> {
        let importer = Importer::new(self.name.as_str()).with_addition(addition);
        let batch = importer.decode_batch(json)?;

        let mut sections = self.sections.clone();
        for document in batch.documents.iter().filter(|doc| doc.roots().is_section()) {
            if sections.contains(&document.name) {
                return Err(SectionError::AlreadyExists(document.name.clone()).into());
            }
            sections.put(document.clone())?;
        }

        importer.claim(registry, &batch)?;

        let idents = batch.numbers().into_iter().map(|n| self.ident(n)).collect();
        self.sections = sections;
        for folder in batch.folders {
            self.folders.insert(folder.ident.number, folder);
        }
        for document in batch.documents {
            if !document.roots().is_section() {
                self.pages.insert(document.ident.number, document);
            }
        }
        Ok(idents)
    }
}

fn handles(
    folders: &[Folder],
    pages: &BTreeMap<i64, Document>,
    sections: &SectionStore,
) -> Vec<DocumentHandle> {
    folders
        .iter()
        .map(Folder::handle)
        .chain(pages.values().map(Document::handle))
        .chain(sections.documents().map(Document::handle))
        .collect()
}

/// Every name claimed in `roots` must be unique
fn check_names(roots: &Roots) -> Result<(), MutationError> {
    match duplicate_names(roots).into_iter().next() {
        Some(name) => Err(MutationError::NameCollision(name)),
        None => Ok(()),
    }
}

fn strip_placeholders(roots: &mut Roots, section: &str, marker: &str) -> usize {
    roots
        .iter_mut()
        .map(|(_, root)| {
            if is_placeholder_for(root, section) {
                // a root cannot be removed, only replaced
                *root = Node::text(marker);
                1
            } else {
                strip_node(root, section)
            }
        })
        .sum()
}

fn is_placeholder_for(node: &Node, section: &str) -> bool {
    matches!(node, Node::SectionPlaceholder { section: name, .. } if name == section)
}

fn strip_node(node: &mut Node, section: &str) -> usize {
    match node {
        Node::Element { children, .. } => strip_list(children, section),
        Node::Widget(widget) => widget
            .containers
            .iter_mut()
            .map(|container| strip_list(container, section))
            .sum(),
        _ => 0,
    }
}

fn strip_list(list: &mut Vec<Node>, section: &str) -> usize {
    let before = list.len();
    list.retain(|node| !is_placeholder_for(node, section));
    let removed = before - list.len();
    removed + list.iter_mut().map(|node| strip_node(node, section)).sum::<usize>()
}
