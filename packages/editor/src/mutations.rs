//! # Tree Mutations
//!
//! Structural and in-place edits of a document's roots, addressed by
//! [`LocationPath`].
//!
//! ## Guarantees
//!
//! 1. **Validated first**: every check (path resolution, index bounds, node
//!    kind, name uniqueness, placeholder policy) runs before the tree is
//!    written, so a failed mutation leaves the tree untouched
//! 2. **Unique names**: inserted widgets and placeholders never share a name
//!    with anything already in the document (renamed or rejected per
//!    [`NamePolicy`])
//! 3. **No transclusion through copies**: placeholders inserted into a
//!    section are replaced or rejected per [`PlaceholderPolicy`]
//!
//! ## Move
//! - `delete(source)` then `insert(dest_parent, dest_index)`; the
//!   destination is resolved against the tree after removal
//! - If the insert fails the removed node is put back where it was
//!
//! Token checks live in [`crate::Document::apply`]; functions here operate
//! on bare [`Roots`].

use crate::catalog::{CatalogError, WidgetCatalog};
use crate::config::{EditorConfig, NamePolicy, PlaceholderPolicy};
use crate::sections::SectionStore;
use crate::token::ChangeToken;
use quire_common::{claimed_names, walk_node_mut, VisitorMut};
use quire_tree::{
    Attributes, ComponentKind, FieldValue, LocationError, LocationPath, Node, NodeKind, Roots,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::warn;

/// Edit operations (the admin UI's wire form)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Insert `node` at `index` in the child list named by `parent`
    Insert {
        parent: LocationPath,
        index: usize,
        node: Node,
    },

    /// Build a widget through the catalog and insert it
    InsertWidget {
        parent: LocationPath,
        index: usize,
        kind: ComponentKind,
        name: String,
        #[serde(default)]
        fields: BTreeMap<String, FieldValue>,
    },

    /// Remove a node, returning it (cut)
    Delete { path: LocationPath },

    /// Delete then insert, as one transaction
    Move {
        source: LocationPath,
        dest_parent: LocationPath,
        dest_index: usize,
    },

    /// Exchange two neighbouring children
    SwapAdjacent {
        parent: LocationPath,
        first: usize,
        second: usize,
    },

    /// Replace the attribute map of an element
    EditAttributes {
        path: LocationPath,
        attributes: Attributes,
    },

    /// Replace the text of a text literal, comment or symbol
    EditText { path: LocationPath, text: String },

    EditTextBlock {
        path: LocationPath,
        textref: String,
        failure_message: String,
        escape: bool,
        linebreaks: bool,
    },

    SetHideIfEmpty { path: LocationPath, hide: bool },

    /// Merge field bindings into a widget
    SetWidgetFields {
        path: LocationPath,
        fields: BTreeMap<String, FieldValue>,
    },

    /// Rename a widget or placeholder; collisions always fail
    RenameWidget { path: LocationPath, name: String },

    /// Build a validator through the catalog and attach it to a widget
    AddValidator {
        path: LocationPath,
        kind: ComponentKind,
        message: String,
        #[serde(default)]
        args: BTreeMap<String, String>,
    },

    RemoveValidator { path: LocationPath, index: usize },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Insert { .. } => "insert",
            Mutation::InsertWidget { .. } => "insert_widget",
            Mutation::Delete { .. } => "delete",
            Mutation::Move { .. } => "move",
            Mutation::SwapAdjacent { .. } => "swap_adjacent",
            Mutation::EditAttributes { .. } => "edit_attributes",
            Mutation::EditText { .. } => "edit_text",
            Mutation::EditTextBlock { .. } => "edit_text_block",
            Mutation::SetHideIfEmpty { .. } => "set_hide_if_empty",
            Mutation::SetWidgetFields { .. } => "set_widget_fields",
            Mutation::RenameWidget { .. } => "rename_widget",
            Mutation::AddValidator { .. } => "add_validator",
            Mutation::RemoveValidator { .. } => "remove_validator",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Stale change token {presented} (document is at {current})")]
    StaleToken {
        presented: ChangeToken,
        current: ChangeToken,
    },

    #[error("A document root cannot be deleted")]
    RootCannotBeDeleted,

    #[error("Name already in use: {0}")]
    NameCollision(String),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Expected {expected}, found {found} node")]
    WrongNodeKind {
        expected: &'static str,
        found: NodeKind,
    },

    #[error("Children {first} and {second} are not adjacent")]
    NotAdjacent { first: usize, second: usize },

    #[error("Section placeholder {0} cannot be inserted into a section")]
    PlaceholderInSection(String),

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Validator {index} out of range ({count} attached)")]
    BadValidatorIndex { index: usize, count: usize },

    #[error("No widget catalog available")]
    NoCatalog,

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// What a successful mutation did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Path of the inserted node and `(requested, assigned)` renames
    Inserted {
        path: LocationPath,
        renamed: Vec<(String, String)>,
    },
    /// The removed subtree
    Removed { node: Node },
    /// Path of the node at its new position
    Moved { path: LocationPath },
    Swapped,
    Edited,
}

/// Collaborators a mutation may consult
#[derive(Clone, Copy)]
pub struct EditContext<'a> {
    pub config: &'a EditorConfig,
    /// When set, inserted placeholders must name an existing section
    pub sections: Option<&'a SectionStore>,
    pub catalog: Option<&'a dyn WidgetCatalog>,
}

impl<'a> EditContext<'a> {
    pub fn new(config: &'a EditorConfig) -> Self {
        Self {
            config,
            sections: None,
            catalog: None,
        }
    }

    pub fn with_sections(mut self, sections: &'a SectionStore) -> Self {
        self.sections = Some(sections);
        self
    }

    pub fn with_catalog(mut self, catalog: &'a dyn WidgetCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

/// Where inserted content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// New content (paste, creation): policies apply
    External,
    /// Content moved within the same document
    Internal,
}

/// Apply a mutation to bare roots. All-or-nothing.
pub fn apply_to_roots(
    roots: &mut Roots,
    mutation: Mutation,
    ctx: &EditContext<'_>,
) -> Result<Outcome, MutationError> {
    match mutation {
        Mutation::Insert {
            parent,
            index,
            node,
        } => insert(roots, &parent, index, node, ctx, Origin::External),

        Mutation::InsertWidget {
            parent,
            index,
            kind,
            name,
            fields,
        } => {
            let catalog = ctx.catalog.ok_or(MutationError::NoCatalog)?;
            let widget = catalog.instantiate(&kind, &name, &fields)?;
            insert(roots, &parent, index, Node::Widget(widget), ctx, Origin::External)
        }

        Mutation::Delete { path } => delete(roots, &path).map(|node| Outcome::Removed { node }),

        Mutation::Move {
            source,
            dest_parent,
            dest_index,
        } => move_node(roots, &source, &dest_parent, dest_index, ctx),

        Mutation::SwapAdjacent {
            parent,
            first,
            second,
        } => swap_adjacent(roots, &parent, first, second),

        Mutation::EditAttributes { path, attributes } => {
            let node = roots.resolve_mut(&path)?;
            let kind = node.kind();
            let current = node.attributes_mut().ok_or(MutationError::WrongNodeKind {
                expected: "element",
                found: kind,
            })?;
            *current = attributes;
            Ok(Outcome::Edited)
        }

        Mutation::EditText { path, text } => {
            match roots.resolve_mut(&path)? {
                Node::TextLiteral { text: current }
                | Node::Comment { text: current }
                | Node::HtmlSymbol { text: current } => *current = text,
                other => {
                    return Err(MutationError::WrongNodeKind {
                        expected: "text, comment or symbol",
                        found: other.kind(),
                    })
                }
            }
            Ok(Outcome::Edited)
        }

        Mutation::EditTextBlock {
            path,
            textref,
            failure_message,
            escape,
            linebreaks,
        } => {
            let node = roots.resolve_mut(&path)?;
            if node.kind() != NodeKind::TextBlockRef {
                return Err(MutationError::WrongNodeKind {
                    expected: "text block",
                    found: node.kind(),
                });
            }
            *node = Node::TextBlockRef {
                textref,
                failure_message,
                escape,
                linebreaks,
            };
            Ok(Outcome::Edited)
        }

        Mutation::SetHideIfEmpty { path, hide } => match roots.resolve_mut(&path)? {
            Node::Element { hide_if_empty, .. } => {
                *hide_if_empty = hide;
                Ok(Outcome::Edited)
            }
            other => Err(MutationError::WrongNodeKind {
                expected: "element",
                found: other.kind(),
            }),
        },

        Mutation::SetWidgetFields { path, fields } => {
            let widget = widget_at(roots, &path)?;
            widget.fields.extend(fields);
            Ok(Outcome::Edited)
        }

        Mutation::RenameWidget { path, name } => rename(roots, &path, name),

        Mutation::AddValidator {
            path,
            kind,
            message,
            args,
        } => {
            let catalog = ctx.catalog.ok_or(MutationError::NoCatalog)?;
            let validator = catalog.validator(&kind, &message, &args)?;
            widget_at(roots, &path)?.validators.push(validator);
            Ok(Outcome::Edited)
        }

        Mutation::RemoveValidator { path, index } => {
            let widget = widget_at(roots, &path)?;
            let count = widget.validators.len();
            if index >= count {
                return Err(MutationError::BadValidatorIndex { index, count });
            }
            widget.validators.remove(index);
            Ok(Outcome::Edited)
        }
    }
}

fn widget_at<'a>(
    roots: &'a mut Roots,
    path: &LocationPath,
) -> Result<&'a mut quire_tree::Widget, MutationError> {
    let node = roots.resolve_mut(path)?;
    let kind = node.kind();
    node.as_widget_mut().ok_or(MutationError::WrongNodeKind {
        expected: "widget",
        found: kind,
    })
}

fn insert(
    roots: &mut Roots,
    parent: &LocationPath,
    index: usize,
    node: Node,
    ctx: &EditContext<'_>,
    origin: Origin,
) -> Result<Outcome, MutationError> {
    let list_address = roots.list_address(parent)?;
    let len = roots.list(&list_address)?.len();
    if index > len {
        return Err(LocationError::IndexOutOfRange { index, len }.into());
    }

    let mut node = node;
    if origin == Origin::External {
        check_placeholders(roots, &mut node, ctx)?;
    }
    let renamed = claim_names(roots, &mut node, ctx.config.name_policy)?;

    roots.list_mut(&list_address)?.insert(index, node);

    Ok(Outcome::Inserted {
        path: parent.clone().child(index),
        renamed,
    })
}

fn delete(roots: &mut Roots, path: &LocationPath) -> Result<Node, MutationError> {
    let address = roots.address(path)?;
    let (list_address, index) = address
        .split_last()
        .ok_or(MutationError::RootCannotBeDeleted)?;
    Ok(roots.list_mut(&list_address)?.remove(index))
}

fn move_node(
    roots: &mut Roots,
    source: &LocationPath,
    dest_parent: &LocationPath,
    dest_index: usize,
    ctx: &EditContext<'_>,
) -> Result<Outcome, MutationError> {
    let address = roots.address(source)?;
    let (origin_list, origin_index) = address
        .split_last()
        .ok_or(MutationError::RootCannotBeDeleted)?;

    let node = roots.list_mut(&origin_list)?.remove(origin_index);

    match insert(roots, dest_parent, dest_index, node.clone(), ctx, Origin::Internal) {
        Ok(Outcome::Inserted { path, .. }) => Ok(Outcome::Moved { path }),
        Ok(other) => Ok(other),
        Err(err) => {
            match roots.list_mut(&origin_list) {
                Ok(list) => list.insert(origin_index, node),
                Err(rollback) => panic!("move rollback lost its origin list: {rollback}"),
            }
            Err(err)
        }
    }
}

fn swap_adjacent(
    roots: &mut Roots,
    parent: &LocationPath,
    first: usize,
    second: usize,
) -> Result<Outcome, MutationError> {
    if first.abs_diff(second) != 1 {
        return Err(MutationError::NotAdjacent { first, second });
    }

    let list_address = roots.list_address(parent)?;
    let list = roots.list_mut(&list_address)?;
    let len = list.len();
    let highest = first.max(second);
    if highest >= len {
        return Err(LocationError::IndexOutOfRange {
            index: highest,
            len,
        }
        .into());
    }

    list.swap(first, second);
    Ok(Outcome::Swapped)
}

fn rename(roots: &mut Roots, path: &LocationPath, name: String) -> Result<Outcome, MutationError> {
    let current = {
        let node = roots.resolve(path)?;
        node.claimed_name()
            .ok_or(MutationError::WrongNodeKind {
                expected: "widget or placeholder",
                found: node.kind(),
            })?
            .to_string()
    };

    if current == name {
        return Ok(Outcome::Edited);
    }
    if claimed_names(roots).contains(&name) {
        return Err(MutationError::NameCollision(name));
    }

    match roots.resolve_mut(path)? {
        Node::Widget(widget) => widget.name = name,
        Node::SectionPlaceholder { placename, .. } => *placename = name,
        other => {
            return Err(MutationError::WrongNodeKind {
                expected: "widget or placeholder",
                found: other.kind(),
            })
        }
    }
    Ok(Outcome::Edited)
}

/// Apply placeholder rules to content about to be inserted
fn check_placeholders(
    roots: &Roots,
    node: &mut Node,
    ctx: &EditContext<'_>,
) -> Result<(), MutationError> {
    if roots.is_section() {
        let mut stripper = PlaceholderStripper {
            policy: ctx.config.placeholder_policy,
            marker: &ctx.config.placeholder_marker,
            rejected: None,
        };
        stripper.visit_node_mut(node);
        if let Some(placename) = stripper.rejected {
            return Err(MutationError::PlaceholderInSection(placename));
        }
        return Ok(());
    }

    if let Some(sections) = ctx.sections {
        for section in quire_common::subtree_section_references(node) {
            if !sections.contains(&section) {
                return Err(MutationError::UnknownSection(section));
            }
        }
    }
    Ok(())
}

struct PlaceholderStripper<'a> {
    policy: PlaceholderPolicy,
    marker: &'a str,
    rejected: Option<String>,
}

impl VisitorMut for PlaceholderStripper<'_> {
    fn visit_node_mut(&mut self, node: &mut Node) {
        if let Node::SectionPlaceholder { placename, .. } = node {
            match self.policy {
                PlaceholderPolicy::Reject => {
                    if self.rejected.is_none() {
                        self.rejected = Some(placename.clone());
                    }
                }
                PlaceholderPolicy::ReplaceWithMarker => {
                    *node = Node::text(self.marker);
                }
            }
            return;
        }
        walk_node_mut(self, node);
    }
}

/// Make every name claimed inside `node` unique against `roots` (and
/// against each other)
fn claim_names(
    roots: &Roots,
    node: &mut Node,
    policy: NamePolicy,
) -> Result<Vec<(String, String)>, MutationError> {
    let mut claimer = NameClaimer {
        taken: claimed_names(roots).into_iter().collect(),
        policy,
        renamed: Vec::new(),
        collision: None,
    };
    claimer.visit_node_mut(node);

    if let Some(name) = claimer.collision {
        return Err(MutationError::NameCollision(name));
    }
    for (from, to) in &claimer.renamed {
        warn!(from = %from, to = %to, "Renamed inserted node to keep names unique");
    }
    Ok(claimer.renamed)
}

struct NameClaimer {
    taken: HashSet<String>,
    policy: NamePolicy,
    renamed: Vec<(String, String)>,
    collision: Option<String>,
}

impl NameClaimer {
    fn claim(&mut self, name: &mut String) {
        if self.taken.insert(name.clone()) {
            return;
        }
        match self.policy {
            NamePolicy::Reject => {
                if self.collision.is_none() {
                    self.collision = Some(name.clone());
                }
            }
            NamePolicy::Rename => {
                let fresh = unique_name(name, &self.taken);
                self.taken.insert(fresh.clone());
                self.renamed.push((std::mem::replace(name, fresh.clone()), fresh));
            }
        }
    }
}

impl VisitorMut for NameClaimer {
    fn visit_node_mut(&mut self, node: &mut Node) {
        match node {
            Node::Widget(widget) => self.claim(&mut widget.name),
            Node::SectionPlaceholder { placename, .. } => self.claim(placename),
            _ => {}
        }
        walk_node_mut(self, node);
    }
}

fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    let mut n = 1;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
