//! # Ident Registry
//!
//! Allocates and validates `(project, number)` idents for pages, folders
//! and sections.
//!
//! State is per project and lives as long as the loaded project: it is
//! rebuilt from persisted documents with [`ProjectRegistry::load_project`]
//! on cold start and torn down with [`ProjectRegistry::unload_project`] or
//! [`ProjectRegistry::reset`].
//!
//! Numbers are never reused within a process lifetime: a released number is
//! retired, and allocation only moves forward from the highest number seen.

use quire_tree::Ident;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, info};

/// What a live ident refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Page,
    SvgPage,
    Folder,
    Section,
}

/// Registry entry for a live document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub ident: Ident,
    pub kind: DocumentKind,
    pub name: String,
}

impl DocumentHandle {
    pub fn new(ident: Ident, kind: DocumentKind, name: impl Into<String>) -> Self {
        Self {
            ident,
            kind,
            name: name.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentError {
    #[error("Ident {0} is already in use")]
    Collision(Ident),

    #[error("Ident {0} was retired and cannot be reused")]
    Retired(Ident),

    #[error("Ident {0} is in the administrative namespace")]
    ReservedNamespace(Ident),

    #[error("Ident {0} is not in the administrative namespace")]
    NotAdmin(Ident),

    #[error("Ident {0} has not been reserved")]
    NotReserved(Ident),

    #[error("Project {0} is not loaded")]
    UnknownProject(String),
}

#[derive(Debug, Clone)]
enum Slot {
    Reserved,
    Bound(DocumentHandle),
}

#[derive(Debug, Default)]
struct ProjectIdents {
    watermark: i64,
    live: BTreeMap<i64, Slot>,
    retired: BTreeSet<i64>,
}

impl ProjectIdents {
    fn check_free(&self, ident: &Ident) -> Result<(), IdentError> {
        if self.live.contains_key(&ident.number) {
            return Err(IdentError::Collision(ident.clone()));
        }
        if self.retired.contains(&ident.number) {
            return Err(IdentError::Retired(ident.clone()));
        }
        Ok(())
    }

    fn mark_live(&mut self, number: i64, slot: Slot) {
        self.watermark = self.watermark.max(number);
        self.live.insert(number, slot);
    }
}

/// Process-wide ident state for every loaded project
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    projects: HashMap<String, ProjectIdents>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a project's ident state from its persisted documents.
    ///
    /// Replaces any state already held for `project`. The root folder
    /// (number 0) is registered if `handles` does not contain it.
    pub fn load_project(
        &mut self,
        project: &str,
        handles: impl IntoIterator<Item = DocumentHandle>,
    ) -> Result<(), IdentError> {
        let mut idents = ProjectIdents::default();

        for handle in handles {
            if idents.live.contains_key(&handle.ident.number) {
                return Err(IdentError::Collision(handle.ident));
            }
            let number = handle.ident.number;
            idents.mark_live(number, Slot::Bound(handle));
        }

        if !idents.live.contains_key(&Ident::ROOT_NUMBER) {
            let root = DocumentHandle::new(Ident::root(project), DocumentKind::Folder, "root");
            idents.mark_live(Ident::ROOT_NUMBER, Slot::Bound(root));
        }

        info!(
            project,
            documents = idents.live.len(),
            watermark = idents.watermark,
            "Loaded project idents"
        );
        self.projects.insert(project.to_string(), idents);
        Ok(())
    }

    /// Drop a project's state; returns false if it was not loaded
    pub fn unload_project(&mut self, project: &str) -> bool {
        self.projects.remove(project).is_some()
    }

    /// Forget every project
    pub fn reset(&mut self) {
        self.projects.clear();
    }

    pub fn is_loaded(&self, project: &str) -> bool {
        self.projects.contains_key(project)
    }

    fn project(&self, project: &str) -> Result<&ProjectIdents, IdentError> {
        self.projects
            .get(project)
            .ok_or_else(|| IdentError::UnknownProject(project.to_string()))
    }

    fn project_mut(&mut self, project: &str) -> Result<&mut ProjectIdents, IdentError> {
        self.projects
            .get_mut(project)
            .ok_or_else(|| IdentError::UnknownProject(project.to_string()))
    }

    /// Next free number above everything seen in the project
    pub fn allocate(&mut self, project: &str) -> Result<Ident, IdentError> {
        let idents = self.project_mut(project)?;
        let number = idents.watermark.max(Ident::ROOT_NUMBER) + 1;
        idents.mark_live(number, Slot::Reserved);
        debug!(project, number, "Allocated ident");
        Ok(Ident::new(project, number))
    }

    /// Claim an explicit, non-negative number
    pub fn reserve(&mut self, project: &str, number: i64) -> Result<Ident, IdentError> {
        self.reserve_all(project, &[number])
            .map(|mut idents| idents.remove(0))
    }

    /// Claim a batch of explicit numbers, all or nothing.
    ///
    /// Every number is checked before any is marked live; a number that
    /// appears twice in the batch is a collision.
    pub fn reserve_all(&mut self, project: &str, numbers: &[i64]) -> Result<Vec<Ident>, IdentError> {
        let idents = self.project_mut(project)?;

        let mut seen = BTreeSet::new();
        for &number in numbers {
            let ident = Ident::new(project, number);
            if ident.is_admin() {
                return Err(IdentError::ReservedNamespace(ident));
            }
            if !seen.insert(number) {
                return Err(IdentError::Collision(ident));
            }
            idents.check_free(&ident)?;
        }

        for &number in numbers {
            idents.mark_live(number, Slot::Reserved);
        }
        debug!(project, count = numbers.len(), "Reserved idents");

        Ok(numbers
            .iter()
            .map(|&number| Ident::new(project, number))
            .collect())
    }

    /// Claim a number in the negative administrative namespace
    pub fn reserve_admin(&mut self, project: &str, number: i64) -> Result<Ident, IdentError> {
        let idents = self.project_mut(project)?;
        let ident = Ident::new(project, number);
        if !ident.is_admin() {
            return Err(IdentError::NotAdmin(ident));
        }
        idents.check_free(&ident)?;
        idents.live.insert(number, Slot::Reserved);
        Ok(ident)
    }

    /// Attach a document to a reserved (or already bound) ident
    pub fn bind(&mut self, handle: DocumentHandle) -> Result<(), IdentError> {
        let idents = self.project_mut(&handle.ident.project)?;
        match idents.live.get_mut(&handle.ident.number) {
            Some(slot) => {
                *slot = Slot::Bound(handle);
                Ok(())
            }
            None => Err(IdentError::NotReserved(handle.ident)),
        }
    }

    /// Give back reservations that were never bound (rollback of a failed
    /// creation). Bound idents are left alone. The numbers are not retired.
    pub fn unreserve(&mut self, idents: &[Ident]) {
        for ident in idents {
            if let Some(project) = self.projects.get_mut(&ident.project) {
                if matches!(project.live.get(&ident.number), Some(Slot::Reserved)) {
                    project.live.remove(&ident.number);
                }
            }
        }
    }

    /// Live document for `ident`; absence is not an error
    pub fn resolve(&self, ident: &Ident) -> Option<&DocumentHandle> {
        match self.projects.get(&ident.project)?.live.get(&ident.number)? {
            Slot::Bound(handle) => Some(handle),
            Slot::Reserved => None,
        }
    }

    /// Remove a document and retire its number
    pub fn release(&mut self, ident: &Ident) -> Option<DocumentHandle> {
        let idents = self.projects.get_mut(&ident.project)?;
        let slot = idents.live.remove(&ident.number)?;
        idents.retired.insert(ident.number);
        debug!(ident = %ident, "Released ident");
        match slot {
            Slot::Bound(handle) => Some(handle),
            Slot::Reserved => None,
        }
    }

    /// Highest number seen in the project
    pub fn watermark(&self, project: &str) -> Option<i64> {
        self.project(project).ok().map(|idents| idents.watermark)
    }

    /// Numbers currently live (reserved or bound) in the project
    pub fn live_numbers(&self, project: &str) -> Vec<i64> {
        self.project(project)
            .map(|idents| idents.live.keys().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> ProjectRegistry {
        let mut registry = ProjectRegistry::new();
        registry.load_project("site", Vec::new()).unwrap();
        registry
    }

    #[test]
    fn test_root_folder_registered_on_load() {
        let registry = loaded();
        let root = registry.resolve(&Ident::root("site")).unwrap();
        assert_eq!(root.kind, DocumentKind::Folder);
    }

    #[test]
    fn test_allocate_starts_above_root() {
        let mut registry = loaded();
        assert_eq!(registry.allocate("site").unwrap().number, 1);
        assert_eq!(registry.allocate("site").unwrap().number, 2);
    }

    #[test]
    fn test_allocate_requires_loaded_project() {
        let mut registry = ProjectRegistry::new();
        assert_eq!(
            registry.allocate("nowhere"),
            Err(IdentError::UnknownProject("nowhere".to_string()))
        );
    }

    #[test]
    fn test_reserve_collision() {
        let mut registry = loaded();
        registry.reserve("site", 5).unwrap();
        assert_eq!(
            registry.reserve("site", 5),
            Err(IdentError::Collision(Ident::new("site", 5)))
        );
    }

    #[test]
    fn test_reserve_raises_watermark() {
        let mut registry = loaded();
        registry.reserve("site", 40).unwrap();
        assert_eq!(registry.allocate("site").unwrap().number, 41);
    }

    #[test]
    fn test_reserve_all_is_all_or_nothing() {
        let mut registry = loaded();
        registry.reserve("site", 3).unwrap();

        let result = registry.reserve_all("site", &[10, 11, 3, 12]);
        assert_eq!(result, Err(IdentError::Collision(Ident::new("site", 3))));
        assert_eq!(registry.live_numbers("site"), vec![0, 3]);
    }

    #[test]
    fn test_reserve_all_rejects_duplicates_in_batch() {
        let mut registry = loaded();
        let result = registry.reserve_all("site", &[7, 8, 7]);
        assert_eq!(result, Err(IdentError::Collision(Ident::new("site", 7))));
        assert_eq!(registry.live_numbers("site"), vec![0]);
    }

    #[test]
    fn test_released_numbers_are_never_reused() {
        let mut registry = loaded();
        let ident = registry.allocate("site").unwrap();
        registry
            .bind(DocumentHandle::new(ident.clone(), DocumentKind::Page, "index"))
            .unwrap();

        let handle = registry.release(&ident).unwrap();
        assert_eq!(handle.name, "index");
        assert!(registry.resolve(&ident).is_none());
        assert_eq!(registry.reserve("site", ident.number), Err(IdentError::Retired(ident.clone())));
        assert!(registry.allocate("site").unwrap().number > ident.number);
    }

    #[test]
    fn test_admin_namespace_is_separate() {
        let mut registry = loaded();
        assert!(matches!(
            registry.reserve("site", -2),
            Err(IdentError::ReservedNamespace(_))
        ));
        assert!(registry.reserve_admin("site", -2).is_ok());
        assert!(matches!(
            registry.reserve_admin("site", 2),
            Err(IdentError::NotAdmin(_))
        ));
        // admin numbers do not move the watermark
        assert_eq!(registry.allocate("site").unwrap().number, 1);
    }

    #[test]
    fn test_resolve_only_returns_bound_documents() {
        let mut registry = loaded();
        let ident = registry.reserve("site", 9).unwrap();
        assert!(registry.resolve(&ident).is_none());

        registry
            .bind(DocumentHandle::new(ident.clone(), DocumentKind::Section, "footer"))
            .unwrap();
        assert_eq!(registry.resolve(&ident).map(|h| h.kind), Some(DocumentKind::Section));
    }

    #[test]
    fn test_bind_requires_reservation() {
        let mut registry = loaded();
        let handle = DocumentHandle::new(Ident::new("site", 4), DocumentKind::Page, "p");
        assert!(matches!(registry.bind(handle), Err(IdentError::NotReserved(_))));
    }

    #[test]
    fn test_unreserve_rolls_back_pending_reservations() {
        let mut registry = loaded();
        let idents = registry.reserve_all("site", &[20, 21]).unwrap();
        registry.unreserve(&idents);
        assert_eq!(registry.live_numbers("site"), vec![0]);
        assert!(registry.reserve("site", 20).is_ok());
    }

    #[test]
    fn test_load_rebuilds_watermark_and_detects_duplicates() {
        let mut registry = ProjectRegistry::new();
        let handles = vec![
            DocumentHandle::new(Ident::new("site", 3), DocumentKind::Page, "a"),
            DocumentHandle::new(Ident::new("site", 17), DocumentKind::Page, "b"),
        ];
        registry.load_project("site", handles).unwrap();
        assert_eq!(registry.watermark("site"), Some(17));
        assert_eq!(registry.allocate("site").unwrap().number, 18);

        let duplicated = vec![
            DocumentHandle::new(Ident::new("other", 3), DocumentKind::Page, "a"),
            DocumentHandle::new(Ident::new("other", 3), DocumentKind::Page, "b"),
        ];
        assert!(registry.load_project("other", duplicated).is_err());
        assert!(!registry.is_loaded("other"));
    }

    #[test]
    fn test_reset_tears_down_everything() {
        let mut registry = loaded();
        registry.reset();
        assert!(!registry.is_loaded("site"));
        assert!(!registry.unload_project("site"));
    }
}
