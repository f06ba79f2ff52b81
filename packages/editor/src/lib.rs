//! # Quire Editor
//!
//! Editing engine for pages and sections.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ tree: Node model, Roots, LocationPath       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Token-guarded, all-or-nothing mutations  │
//! │  - Section store and transclusion           │
//! │  - Ident registry, projects                 │
//! │  - Persisted JSON form, batch import        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Optimistic concurrency**: every mutation presents the document's
//!    current [`ChangeToken`]; a stale token is refused and nothing changes
//! 2. **Paths are ephemeral**: a [`quire_tree::LocationPath`] is only valid
//!    until the next mutation of its document
//! 3. **All or nothing**: mutations and batch imports either fully apply
//!    or leave no trace
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_editor::{Document, EditContext, EditorConfig, Mutation};
//!
//! let config = EditorConfig::default();
//! let token = doc.token().clone();
//!
//! let applied = doc.apply(
//!     &token,
//!     Mutation::Insert {
//!         parent: "body".parse()?,
//!         index: 1,
//!         node: Node::text("x"),
//!     },
//!     &EditContext::new(&config),
//! )?;
//!
//! // Present `applied.token` with the next mutation
//! ```

mod catalog;
mod config;
mod document;
mod errors;
mod mutations;
mod project;
mod registry;
mod sections;
mod serializer;
mod token;

pub use catalog::{CatalogError, StaticCatalog, WidgetCatalog, WidgetSpec};
pub use config::{EditorConfig, NamePolicy, PlaceholderPolicy};
pub use document::{Applied, Document};
pub use errors::EditorError;
pub use mutations::{apply_to_roots, EditContext, Mutation, MutationError, Outcome};
pub use project::{Folder, Project};
pub use registry::{DocumentHandle, DocumentKind, IdentError, ProjectRegistry};
pub use sections::{SectionError, SectionStore};
pub use serializer::{
    export_batch, from_json, node_to_json, to_json, Batch, FormatVersion, ImportError, Importer,
    FORMAT_VERSION,
};
pub use token::ChangeToken;

// Re-export the tree model for convenience
pub use quire_tree::{
    ComponentKind, FieldValue, Ident, LocationError, LocationPath, Node, NodeKind, RootName,
    Roots, Validator, Widget,
};
