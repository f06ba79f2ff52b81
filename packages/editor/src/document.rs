//! # Document
//!
//! A page or section together with its editing state.
//!
//! ## Lifecycle
//!
//! ```text
//! create/import → edit (token-checked) → export
//!                   ↓
//!          fresh token + version bump
//! ```
//!
//! Every successful [`Document::apply`] replaces the change token, so an
//! editor holding an old token is refused instead of overwriting a
//! concurrent change. Failed mutations keep the token.

use crate::mutations::{apply_to_roots, EditContext, Mutation, MutationError, Outcome};
use crate::registry::{DocumentHandle, DocumentKind};
use crate::token::ChangeToken;
use quire_tree::{Ident, LocationPath, LocationResult, Node, Roots};
use tracing::{debug, instrument, warn};

/// Editable page or section
#[derive(Debug, Clone)]
pub struct Document {
    pub ident: Ident,
    pub name: String,
    pub brief: String,

    roots: Roots,
    token: ChangeToken,

    /// Increments on each successful mutation
    version: u64,
}

/// Result of a successful mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Token to present with the next mutation
    pub token: ChangeToken,
    pub version: u64,
    pub outcome: Outcome,
}

impl Document {
    pub fn new(ident: Ident, name: impl Into<String>, roots: Roots) -> Self {
        Self {
            ident,
            name: name.into(),
            brief: String::new(),
            roots,
            token: ChangeToken::fresh(),
            version: 0,
        }
    }

    pub fn with_brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = brief.into();
        self
    }

    pub fn kind(&self) -> DocumentKind {
        match self.roots {
            Roots::Page { .. } => DocumentKind::Page,
            Roots::Svg { .. } => DocumentKind::SvgPage,
            Roots::Section { .. } => DocumentKind::Section,
        }
    }

    pub fn handle(&self) -> DocumentHandle {
        DocumentHandle::new(self.ident.clone(), self.kind(), self.name.clone())
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn token(&self) -> &ChangeToken {
        &self.token
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn resolve(&self, path: &LocationPath) -> LocationResult<&Node> {
        self.roots.resolve(path)
    }

    /// Deep copy of the subtree at `path`. The document is not changed.
    pub fn copy(&self, path: &LocationPath) -> LocationResult<Node> {
        self.roots.resolve(path).cloned()
    }

    /// Same identity and content, ignoring token and version
    pub fn content_eq(&self, other: &Document) -> bool {
        self.ident == other.ident
            && self.name == other.name
            && self.brief == other.brief
            && self.roots == other.roots
    }

    pub fn check_token(&self, presented: &ChangeToken) -> Result<(), MutationError> {
        if presented != &self.token {
            warn!(
                ident = %self.ident,
                presented = %presented,
                current = %self.token,
                "Rejected stale change token"
            );
            return Err(MutationError::StaleToken {
                presented: presented.clone(),
                current: self.token.clone(),
            });
        }
        Ok(())
    }

    /// Apply a mutation if `presented` matches the current token
    #[instrument(skip_all, fields(ident = %self.ident, op = mutation.name()))]
    pub fn apply(
        &mut self,
        presented: &ChangeToken,
        mutation: Mutation,
        ctx: &EditContext<'_>,
    ) -> Result<Applied, MutationError> {
        self.check_token(presented)?;

        let outcome = apply_to_roots(&mut self.roots, mutation, ctx)?;
        self.bump();

        debug!(version = self.version, token = %self.token, "Applied mutation");

        Ok(Applied {
            token: self.token.clone(),
            version: self.version,
            outcome,
        })
    }

    /// Rewrite the roots outside the token protocol. `f` reports how many
    /// changes it made; the token is replaced only if it made any.
    pub(crate) fn rewrite(&mut self, f: impl FnOnce(&mut Roots) -> usize) -> usize {
        let changes = f(&mut self.roots);
        if changes > 0 {
            self.bump();
        }
        changes
    }

    fn bump(&mut self) {
        self.token = ChangeToken::fresh();
        self.version += 1;
    }
}
