//! Error types for the editor

use quire_tree::{Ident, LocationError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Section error: {0}")]
    Section(#[from] crate::sections::SectionError),

    #[error("Ident error: {0}")]
    Ident(#[from] crate::registry::IdentError),

    #[error("Import error: {0}")]
    Import(#[from] crate::serializer::ImportError),

    #[error("Unknown document: {0}")]
    UnknownDocument(Ident),

    #[error("Document {0} is not a page")]
    NotAPage(String),
}
