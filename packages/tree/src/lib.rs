//! # Quire Tree
//!
//! Content tree model shared by the editing engine:
//!
//! - [`Node`]: the closed set of node variants (elements, text, symbols,
//!   comments, text block references, section placeholders, widgets)
//! - [`Ident`]: `(project, number)` document identifiers
//! - [`Roots`]: the named roots a page, SVG page or section owns
//! - [`LocationPath`]: addresses of nodes, resolved against [`Roots`]

pub mod error;
pub mod ident;
pub mod location;
pub mod node;
pub mod roots;

pub use error::{LocationError, LocationResult};
pub use ident::{Ident, IdentParseError};
pub use location::{Hop, ListAddress, LocationPath, NodeAddress, RootName, RootSelector};
pub use node::{
    Attributes, ComponentKind, FieldValue, Node, NodeKind, TextBlockSource, Validator, Widget,
};
pub use roots::Roots;
