//! # Section Store
//!
//! Named reusable subtrees. A `SectionPlaceholder` in a page stands in for
//! the section of that name and is replaced by it at render time
//! ([`SectionStore::expand`]).
//!
//! ## Invariants
//!
//! 1. **Acyclic**: no section reaches itself through placeholders, checked
//!    on every [`SectionStore::put`]
//! 2. **No dangling deletes**: a section referenced by any placeholder
//!    cannot be deleted until the placeholders are unlinked

use crate::catalog::WidgetCatalog;
use crate::config::EditorConfig;
use crate::document::{Applied, Document};
use crate::mutations::{EditContext, Mutation, MutationError};
use crate::token::ChangeToken;
use quire_common::{section_references, subtree_section_references, walk_node_mut, VisitorMut};
use quire_tree::{Node, RootName, Roots};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SectionError {
    #[error("Registering section {0} would make it transclude itself")]
    CycleDetected(String),

    #[error("Section {section} is still referenced by {referrers:?}")]
    ReferencedElsewhere {
        section: String,
        referrers: Vec<String>,
    },

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Section {0} already exists")]
    AlreadyExists(String),

    #[error("Document {0} is not a section")]
    NotASection(String),
}

#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    sections: BTreeMap<String, Document>,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Document> {
        self.sections.get(name)
    }

    /// Root node of the named section
    pub fn tree(&self, name: &str) -> Option<&Node> {
        self.sections
            .get(name)
            .and_then(|doc| doc.roots().get(RootName::Section))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.sections.values()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Register or replace a section under its document name.
    ///
    /// Fails without touching the store if the section would reach itself
    /// through placeholders. Returns the replaced section, if any.
    pub fn put(&mut self, section: Document) -> Result<Option<Document>, SectionError> {
        let Some(root) = section.roots().get(RootName::Section) else {
            return Err(SectionError::NotASection(section.name.clone()));
        };
        if self.reaches(root, &section.name) {
            return Err(SectionError::CycleDetected(section.name.clone()));
        }

        debug!(section = %section.name, ident = %section.ident, "Registered section");
        Ok(self.sections.insert(section.name.clone(), section))
    }

    /// Remove a section no placeholder refers to. `others` are the
    /// documents (pages) outside the store that may hold placeholders.
    pub fn delete<'a>(
        &mut self,
        name: &str,
        others: impl IntoIterator<Item = &'a Document>,
    ) -> Result<Document, SectionError> {
        if !self.contains(name) {
            return Err(SectionError::UnknownSection(name.to_string()));
        }

        let referrers = self.referrers(name, others);
        if !referrers.is_empty() {
            return Err(SectionError::ReferencedElsewhere {
                section: name.to_string(),
                referrers,
            });
        }

        self.sections
            .remove(name)
            .ok_or_else(|| SectionError::UnknownSection(name.to_string()))
    }

    /// Names of the documents (`others` and other sections) holding a
    /// placeholder for `name`
    pub fn referrers<'a>(
        &self,
        name: &str,
        others: impl IntoIterator<Item = &'a Document>,
    ) -> Vec<String> {
        let mut referrers: Vec<String> = others
            .into_iter()
            .filter(|doc| section_references(doc.roots()).contains(name))
            .map(|doc| doc.name.clone())
            .collect();
        referrers.extend(
            self.sections
                .values()
                .filter(|doc| doc.name != name)
                .filter(|doc| section_references(doc.roots()).contains(name))
                .map(|doc| doc.name.clone()),
        );
        referrers
    }

    /// Token-guarded edit of a section.
    ///
    /// Inserted placeholders are replaced or rejected per the placeholder
    /// policy, so an edit never adds a transclusion edge.
    pub fn apply(
        &mut self,
        name: &str,
        presented: &ChangeToken,
        mutation: Mutation,
        config: &EditorConfig,
        catalog: Option<&dyn WidgetCatalog>,
    ) -> Result<Applied, MutationError> {
        let section = self
            .sections
            .get_mut(name)
            .ok_or_else(|| MutationError::UnknownSection(name.to_string()))?;

        let mut ctx = EditContext::new(config);
        if let Some(catalog) = catalog {
            ctx = ctx.with_catalog(catalog);
        }
        section.apply(presented, mutation, &ctx)
    }

    pub(crate) fn documents_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        self.sections.values_mut()
    }

    /// Clone of `node` with placeholders replaced by the sections they
    /// name. Placeholders for missing sections stay as they are.
    pub fn expand(&self, node: &Node) -> Node {
        let mut expanded = node.clone();
        Expander {
            store: self,
            active: Vec::new(),
        }
        .visit_node_mut(&mut expanded);
        expanded
    }

    pub fn expand_roots(&self, roots: &Roots) -> Roots {
        let mut expanded = roots.clone();
        let mut expander = Expander {
            store: self,
            active: Vec::new(),
        };
        expander.visit_roots_mut(&mut expanded);
        expanded
    }

    /// Whether `target` is reachable from the placeholders in `root`,
    /// following stored sections (the stored entry for `target` itself is
    /// ignored since `root` is replacing it)
    fn reaches(&self, root: &Node, target: &str) -> bool {
        let mut pending: Vec<String> = subtree_section_references(root).into_iter().collect();
        let mut seen = BTreeSet::new();

        while let Some(name) = pending.pop() {
            if name == target {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(tree) = self.tree(&name) {
                pending.extend(subtree_section_references(tree));
            }
        }
        false
    }
}

struct Expander<'a> {
    store: &'a SectionStore,
    /// Sections being expanded, outermost first
    active: Vec<String>,
}

impl VisitorMut for Expander<'_> {
    fn visit_node_mut(&mut self, node: &mut Node) {
        if let Node::SectionPlaceholder { section, .. } = node {
            let name = section.clone();
            if self.active.contains(&name) {
                return;
            }
            let Some(tree) = self.store.tree(&name) else {
                return;
            };
            *node = tree.clone();
            self.active.push(name);
            self.visit_node_mut(node);
            self.active.pop();
            return;
        }
        walk_node_mut(self, node);
    }
}
