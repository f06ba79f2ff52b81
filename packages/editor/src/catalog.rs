//! Outbound seam to the widget and validator registries.
//!
//! The engine never knows concrete widget types. It asks a
//! [`WidgetCatalog`] to build a widget for a `(module, class_name)` pair
//! and a field map, and trusts the container count it gets back.

use quire_tree::{ComponentKind, FieldValue, Validator, Widget};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Unknown widget type: {0}")]
    UnknownWidget(ComponentKind),

    #[error("Unknown validator type: {0}")]
    UnknownValidator(ComponentKind),

    #[error("Widget {kind} has no field {field:?}")]
    UnknownField { kind: ComponentKind, field: String },
}

/// Widget/validator factory
pub trait WidgetCatalog {
    fn instantiate(
        &self,
        kind: &ComponentKind,
        name: &str,
        fields: &BTreeMap<String, FieldValue>,
    ) -> Result<Widget, CatalogError>;

    fn validator(
        &self,
        kind: &ComponentKind,
        message: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<Validator, CatalogError>;
}

/// Shape of a widget type known to a [`StaticCatalog`]
#[derive(Debug, Clone, Default)]
pub struct WidgetSpec {
    pub containers: usize,
    pub defaults: BTreeMap<String, FieldValue>,
}

/// In-memory catalog, populated up front
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    widgets: HashMap<ComponentKind, WidgetSpec>,
    validators: HashSet<ComponentKind>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_widget(mut self, kind: ComponentKind, spec: WidgetSpec) -> Self {
        self.widgets.insert(kind, spec);
        self
    }

    pub fn with_validator(mut self, kind: ComponentKind) -> Self {
        self.validators.insert(kind);
        self
    }
}

impl WidgetCatalog for StaticCatalog {
    fn instantiate(
        &self,
        kind: &ComponentKind,
        name: &str,
        fields: &BTreeMap<String, FieldValue>,
    ) -> Result<Widget, CatalogError> {
        let spec = self
            .widgets
            .get(kind)
            .ok_or_else(|| CatalogError::UnknownWidget(kind.clone()))?;

        let mut widget = Widget::new(kind.clone(), name, spec.containers);
        widget.fields = spec.defaults.clone();

        for (field, value) in fields {
            if !spec.defaults.contains_key(field) {
                return Err(CatalogError::UnknownField {
                    kind: kind.clone(),
                    field: field.clone(),
                });
            }
            widget.fields.insert(field.clone(), value.clone());
        }

        Ok(widget)
    }

    fn validator(
        &self,
        kind: &ComponentKind,
        message: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<Validator, CatalogError> {
        if !self.validators.contains(kind) {
            return Err(CatalogError::UnknownValidator(kind.clone()));
        }
        let mut validator = Validator::new(kind.clone(), message);
        validator.args = args.clone();
        Ok(validator)
    }
}
