//! # Persisted Form
//!
//! Hand-written JSON encoder/decoder for documents, folders and batches.
//!
//! ## Format
//!
//! ```text
//! document = {"format": "1.0.0", "ident": 7, "kind": "page",
//!             "name": "...", "brief": "...",
//!             "roots": {"head": record, "body": record}}
//! record   = [tag, {fields}]             // tag = NodeKind::tag()
//! batch    = {"format": "1.0.0", "folders": [folder...],
//!             "documents": [document...]}
//! ```
//!
//! Ident numbers are written relative to the exporting project. On import
//! they are moved to the importing project and offset by the addition
//! number; numbers `<= 0` (root folder, administrative namespace) are
//! never offset. Links to documents of other projects are written as
//! `[project, number]` and kept as they are; the ident of an exported
//! document or folder itself is always a plain number.
//!
//! Decoding rejects documents that claim a widget name or placename twice.
//!
//! Import is all-or-nothing: a batch is fully decoded and every number is
//! reserved in one [`ProjectRegistry::reserve_all`] call before anything is
//! bound.

use crate::document::Document;
use crate::project::Folder;
use crate::registry::{DocumentHandle, IdentError, ProjectRegistry};
use quire_common::duplicate_names;
use quire_tree::{
    ComponentKind, FieldValue, Ident, Node, NodeKind, Roots, Validator, Widget,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{info, instrument};

/// Version written by this build
pub const FORMAT_VERSION: FormatVersion = FormatVersion::new(1, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FormatVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// `major.minor.patch`
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('.').map(|part| part.parse::<u32>().ok());
        let version = Self::new(parts.next()??, parts.next()??, parts.next()??);
        parts.next().is_none().then_some(version)
    }

    /// Same major and no newer minor than [`FORMAT_VERSION`]
    pub fn is_readable(&self) -> bool {
        self.major == FORMAT_VERSION.major && self.minor <= FORMAT_VERSION.minor
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error("Format version {found} cannot be read (this build reads {supported})")]
    VersionIncompatible { found: String, supported: String },

    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    #[error("Ident collision: {0}")]
    IdentCollision(Ident),

    #[error("Ident {0} belongs to another project and cannot name an imported document")]
    ForeignIdent(Ident),

    #[error("Ident number {number} overflows when offset by {addition}")]
    IdentOverflow { number: i64, addition: i64 },

    #[error("Document {document} uses the name {name:?} more than once")]
    DuplicateName { document: String, name: String },

    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Ident error: {0}")]
    Ident(IdentError),
}

impl From<IdentError> for ImportError {
    fn from(err: IdentError) -> Self {
        match err {
            IdentError::Collision(ident) => ImportError::IdentCollision(ident),
            other => ImportError::Ident(other),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::MalformedJson(err.to_string())
    }
}

fn malformed(message: impl Into<String>) -> ImportError {
    ImportError::MalformedJson(message.into())
}

// ============================================================================
// Encoding
// ============================================================================

/// Persisted form of one document
pub fn to_json(document: &Document) -> Value {
    let mut value = Encoder::new(&document.ident.project).document(document);
    if let Value::Object(obj) = &mut value {
        obj.insert("format".to_string(), json!(FORMAT_VERSION.to_string()));
    }
    value
}

/// Persisted form of folders and documents of `project`
pub fn export_batch<'a>(
    project: &str,
    folders: impl IntoIterator<Item = &'a Folder>,
    documents: impl IntoIterator<Item = &'a Document>,
) -> Value {
    let encoder = Encoder::new(project);
    json!({
        "format": FORMAT_VERSION.to_string(),
        "folders": folders.into_iter().map(|f| encoder.folder(f)).collect::<Vec<_>>(),
        "documents": documents.into_iter().map(|d| encoder.document(d)).collect::<Vec<_>>(),
    })
}

/// Tagged record of a single subtree, idents relative to `project`
pub fn node_to_json(node: &Node, project: &str) -> Value {
    Encoder::new(project).node(node)
}

struct Encoder<'a> {
    project: &'a str,
}

impl<'a> Encoder<'a> {
    fn new(project: &'a str) -> Self {
        Self { project }
    }

    fn ident(&self, ident: &Ident) -> Value {
        if ident.belongs_to(self.project) {
            json!(ident.number)
        } else {
            json!([ident.project, ident.number])
        }
    }

    fn document(&self, document: &Document) -> Value {
        let (kind, roots) = match document.roots() {
            Roots::Page { head, body } => (
                "page",
                json!({ "head": self.node(head), "body": self.node(body) }),
            ),
            Roots::Svg { svg } => ("svg", json!({ "svg": self.node(svg) })),
            Roots::Section { section } => ("section", json!({ "section": self.node(section) })),
        };

        json!({
            "ident": self.ident(&document.ident),
            "kind": kind,
            "name": document.name,
            "brief": document.brief,
            "roots": roots,
        })
    }

    fn folder(&self, folder: &Folder) -> Value {
        json!({
            "ident": self.ident(&folder.ident),
            "name": folder.name,
            "brief": folder.brief,
            "parent": folder.parent.as_ref().map(|parent| self.ident(parent)),
        })
    }

    fn node(&self, node: &Node) -> Value {
        let fields = match node {
            Node::Element {
                tag,
                attributes,
                hide_if_empty,
                children,
            } => json!({
                "tag": tag,
                "attributes": attributes,
                "hide_if_empty": hide_if_empty,
                "children": children.iter().map(|c| self.node(c)).collect::<Vec<_>>(),
            }),
            Node::ClosedElement { tag, attributes } => json!({
                "tag": tag,
                "attributes": attributes,
            }),
            Node::TextLiteral { text } | Node::HtmlSymbol { text } | Node::Comment { text } => {
                json!({ "text": text })
            }
            Node::TextBlockRef {
                textref,
                failure_message,
                escape,
                linebreaks,
            } => json!({
                "textref": textref,
                "failure_message": failure_message,
                "escape": escape,
                "linebreaks": linebreaks,
            }),
            Node::SectionPlaceholder {
                section,
                placename,
                brief,
            } => json!({
                "section": section,
                "placename": placename,
                "brief": brief,
            }),
            Node::Widget(widget) => self.widget(widget),
        };
        json!([node.kind().tag(), fields])
    }

    fn widget(&self, widget: &Widget) -> Value {
        let fields: Map<String, Value> = widget
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), self.field_value(value)))
            .collect();

        json!({
            "module": widget.kind.module,
            "class": widget.kind.class_name,
            "name": widget.name,
            "brief": widget.brief,
            "fields": fields,
            "containers": widget
                .containers
                .iter()
                .map(|container| container.iter().map(|c| self.node(c)).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "validators": widget.validators.iter().map(validator_to_json).collect::<Vec<_>>(),
        })
    }

    fn field_value(&self, value: &FieldValue) -> Value {
        match value {
            FieldValue::Text(text) => json!(["text", text]),
            FieldValue::Bool(b) => json!(["bool", b]),
            FieldValue::Int(n) => json!(["int", n]),
            FieldValue::Ident(ident) => json!(["ident", self.ident(ident)]),
            FieldValue::List(items) => json!(["list", items]),
        }
    }
}

fn validator_to_json(validator: &Validator) -> Value {
    json!({
        "module": validator.kind.module,
        "class": validator.kind.class_name,
        "message": validator.message,
        "displayed": validator.displayed,
        "args": validator.args,
        "allowed": validator.allowed_values,
    })
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode one persisted document into `project`, without renumbering
pub fn from_json(json: &Value, project: &str) -> Result<Document, ImportError> {
    Importer::new(project).decode_document(json)
}

/// Decoded batch, idents already moved into the importing project
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub folders: Vec<Folder>,
    pub documents: Vec<Document>,
}

impl Batch {
    pub fn handles(&self) -> Vec<DocumentHandle> {
        self.folders
            .iter()
            .map(Folder::handle)
            .chain(self.documents.iter().map(Document::handle))
            .collect()
    }

    pub fn numbers(&self) -> Vec<i64> {
        self.folders
            .iter()
            .map(|folder| folder.ident.number)
            .chain(self.documents.iter().map(|doc| doc.ident.number))
            .collect()
    }
}

/// Decoder bound to an importing project and an addition number
#[derive(Debug, Clone)]
pub struct Importer {
    project: String,
    addition: i64,
}

impl Importer {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            addition: 0,
        }
    }

    pub fn with_addition(mut self, addition: i64) -> Self {
        self.addition = addition;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn addition(&self) -> i64 {
        self.addition
    }

    fn renumber(&self, number: i64) -> Result<i64, ImportError> {
        if number <= Ident::ROOT_NUMBER {
            return Ok(number);
        }
        number
            .checked_add(self.addition)
            .ok_or(ImportError::IdentOverflow {
                number,
                addition: self.addition,
            })
    }

    /// Decode a single document (with its format header). Pure: the
    /// registry is not consulted.
    pub fn decode_document(&self, json: &Value) -> Result<Document, ImportError> {
        check_format(object(json, "document")?)?;
        self.document(json)
    }

    /// Decode a batch. Pure: the registry is not consulted.
    pub fn decode_batch(&self, json: &Value) -> Result<Batch, ImportError> {
        let obj = object(json, "batch")?;
        check_format(obj)?;

        let folders = optional_array(obj, "folders")?
            .iter()
            .map(|folder| self.folder(folder))
            .collect::<Result<Vec<_>, _>>()?;
        let documents = optional_array(obj, "documents")?
            .iter()
            .map(|document| self.document(document))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Batch { folders, documents })
    }

    /// Decode, then claim every ident of the batch at once and bind it
    #[instrument(skip_all, fields(project = %self.project, addition = self.addition))]
    pub fn import_batch(
        &self,
        registry: &mut ProjectRegistry,
        json: &Value,
    ) -> Result<Batch, ImportError> {
        let batch = self.decode_batch(json)?;
        self.claim(registry, &batch)?;

        info!(
            folders = batch.folders.len(),
            documents = batch.documents.len(),
            "Imported batch"
        );
        Ok(batch)
    }

    pub fn import_document(
        &self,
        registry: &mut ProjectRegistry,
        json: &Value,
    ) -> Result<Document, ImportError> {
        let document = self.decode_document(json)?;
        self.check_owned(&document.ident)?;
        registry.reserve(&self.project, document.ident.number)?;
        registry.bind(document.handle())?;
        Ok(document)
    }

    /// Reserve every ident of an already decoded batch in one call, then
    /// bind them. Every ident must belong to the importing project; this is
    /// checked before anything is reserved.
    pub fn claim(&self, registry: &mut ProjectRegistry, batch: &Batch) -> Result<(), ImportError> {
        let handles = batch.handles();
        for handle in &handles {
            self.check_owned(&handle.ident)?;
        }

        registry.reserve_all(&self.project, &batch.numbers())?;
        for handle in handles {
            registry.bind(handle)?;
        }
        Ok(())
    }

    fn check_owned(&self, ident: &Ident) -> Result<(), ImportError> {
        if ident.belongs_to(&self.project) {
            Ok(())
        } else {
            Err(ImportError::ForeignIdent(ident.clone()))
        }
    }

    /// Identity of an imported document or folder: always a plain number
    /// of the exporting project, moved into the importing one
    fn own_ident(&self, value: &Value) -> Result<Ident, ImportError> {
        match value {
            Value::Number(_) => self.ident(value),
            Value::Array(_) => Err(ImportError::ForeignIdent(self.ident(value)?)),
            _ => Err(malformed(format!("bad ident {value}"))),
        }
    }

    fn ident(&self, value: &Value) -> Result<Ident, ImportError> {
        match value {
            Value::Number(_) => {
                let number = value
                    .as_i64()
                    .ok_or_else(|| malformed(format!("ident {value} is not an integer")))?;
                Ok(Ident::new(self.project.as_str(), self.renumber(number)?))
            }
            Value::Array(pair) => match pair.as_slice() {
                [project, number] => {
                    let project = project
                        .as_str()
                        .ok_or_else(|| malformed("foreign ident project is not a string"))?;
                    let number = number
                        .as_i64()
                        .ok_or_else(|| malformed("foreign ident number is not an integer"))?;
                    Ok(Ident::new(project, number))
                }
                _ => Err(malformed(format!("bad ident {value}"))),
            },
            _ => Err(malformed(format!("bad ident {value}"))),
        }
    }

    fn document(&self, value: &Value) -> Result<Document, ImportError> {
        let obj = object(value, "document")?;
        let ident = self.own_ident(field(obj, "ident")?)?;
        let name = str_field(obj, "name")?;
        let brief = optional_str(obj, "brief")?;
        let kind = str_field(obj, "kind")?;
        let roots = object(field(obj, "roots")?, "roots")?;

        let root = |key: &str| -> Result<Node, ImportError> { self.node(field(roots, key)?) };
        let roots = match kind.as_str() {
            "page" => Roots::Page {
                head: root("head")?,
                body: root("body")?,
            },
            "svg" => Roots::Svg { svg: root("svg")? },
            "section" => Roots::Section {
                section: root("section")?,
            },
            other => return Err(malformed(format!("unknown document kind {other:?}"))),
        };

        if let Some(duplicate) = duplicate_names(&roots).into_iter().next() {
            return Err(ImportError::DuplicateName {
                document: name,
                name: duplicate,
            });
        }

        Ok(Document::new(ident, name, roots).with_brief(brief))
    }

    fn folder(&self, value: &Value) -> Result<Folder, ImportError> {
        let obj = object(value, "folder")?;
        let parent = match obj.get("parent") {
            None | Some(Value::Null) => None,
            Some(parent) => Some(self.ident(parent)?),
        };
        Ok(Folder {
            ident: self.own_ident(field(obj, "ident")?)?,
            name: str_field(obj, "name")?,
            brief: optional_str(obj, "brief")?,
            parent,
        })
    }

    /// Decode a tagged record
    pub fn node(&self, value: &Value) -> Result<Node, ImportError> {
        let record = value
            .as_array()
            .filter(|record| record.len() == 2)
            .ok_or_else(|| malformed(format!("node record must be [tag, fields], got {value}")))?;
        let tag = record[0]
            .as_str()
            .ok_or_else(|| malformed("node tag is not a string"))?;
        let kind =
            NodeKind::from_tag(tag).ok_or_else(|| ImportError::UnknownNodeKind(tag.to_string()))?;
        let obj = object(&record[1], tag)?;

        let node = match kind {
            NodeKind::Element => Node::Element {
                tag: str_field(obj, "tag")?,
                attributes: string_map(obj, "attributes")?,
                hide_if_empty: optional_bool(obj, "hide_if_empty", false)?,
                children: self.nodes(optional_array(obj, "children")?)?,
            },
            NodeKind::ClosedElement => Node::ClosedElement {
                tag: str_field(obj, "tag")?,
                attributes: string_map(obj, "attributes")?,
            },
            NodeKind::TextLiteral => Node::TextLiteral {
                text: str_field(obj, "text")?,
            },
            NodeKind::HtmlSymbol => Node::HtmlSymbol {
                text: str_field(obj, "text")?,
            },
            NodeKind::Comment => Node::Comment {
                text: str_field(obj, "text")?,
            },
            NodeKind::TextBlockRef => Node::TextBlockRef {
                textref: str_field(obj, "textref")?,
                failure_message: optional_str(obj, "failure_message")?,
                escape: optional_bool(obj, "escape", true)?,
                linebreaks: optional_bool(obj, "linebreaks", true)?,
            },
            NodeKind::SectionPlaceholder => Node::SectionPlaceholder {
                section: str_field(obj, "section")?,
                placename: str_field(obj, "placename")?,
                brief: optional_str(obj, "brief")?,
            },
            NodeKind::Widget => Node::Widget(self.widget(obj)?),
        };
        Ok(node)
    }

    fn nodes(&self, values: &[Value]) -> Result<Vec<Node>, ImportError> {
        values.iter().map(|value| self.node(value)).collect()
    }

    fn widget(&self, obj: &Map<String, Value>) -> Result<Widget, ImportError> {
        let kind = ComponentKind::new(str_field(obj, "module")?, str_field(obj, "class")?);
        let mut widget = Widget::new(kind, str_field(obj, "name")?, 0);
        widget.brief = optional_str(obj, "brief")?;

        if let Some(fields) = obj.get("fields") {
            for (name, value) in object(fields, "widget fields")? {
                widget.fields.insert(name.clone(), self.field_value(value)?);
            }
        }

        widget.containers = optional_array(obj, "containers")?
            .iter()
            .map(|container| {
                let nodes = container
                    .as_array()
                    .ok_or_else(|| malformed("widget container is not an array"))?;
                self.nodes(nodes)
            })
            .collect::<Result<_, _>>()?;

        widget.validators = optional_array(obj, "validators")?
            .iter()
            .map(validator_from_json)
            .collect::<Result<_, _>>()?;

        Ok(widget)
    }

    fn field_value(&self, value: &Value) -> Result<FieldValue, ImportError> {
        let (tag, payload) = match value.as_array().map(Vec::as_slice) {
            Some([tag, payload]) => (
                tag.as_str()
                    .ok_or_else(|| malformed("field tag is not a string"))?,
                payload,
            ),
            _ => return Err(malformed(format!("field record must be [kind, value], got {value}"))),
        };

        let bad = || malformed(format!("bad {tag} field value {payload}"));
        match tag {
            "text" => payload.as_str().map(|s| FieldValue::Text(s.to_string())).ok_or_else(bad),
            "bool" => payload.as_bool().map(FieldValue::Bool).ok_or_else(bad),
            "int" => payload.as_i64().map(FieldValue::Int).ok_or_else(bad),
            "ident" => self.ident(payload).map(FieldValue::Ident),
            "list" => payload
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .map(FieldValue::List)
                .ok_or_else(bad),
            other => Err(malformed(format!("unknown field kind {other:?}"))),
        }
    }
}

fn validator_from_json(value: &Value) -> Result<Validator, ImportError> {
    let obj = object(value, "validator")?;
    let kind = ComponentKind::new(str_field(obj, "module")?, str_field(obj, "class")?);
    let mut validator = Validator::new(kind, optional_str(obj, "message")?);
    validator.displayed = optional_bool(obj, "displayed", true)?;
    validator.args = string_map(obj, "args")?;
    validator.allowed_values = optional_array(obj, "allowed")?
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed("allowed value is not a string"))
        })
        .collect::<Result<_, _>>()?;
    Ok(validator)
}

fn check_format(obj: &Map<String, Value>) -> Result<(), ImportError> {
    let found = str_field(obj, "format")?;
    match FormatVersion::parse(&found) {
        Some(version) if version.is_readable() => Ok(()),
        _ => Err(ImportError::VersionIncompatible {
            found,
            supported: FORMAT_VERSION.to_string(),
        }),
    }
}

fn object<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>, ImportError> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("{what} must be an object")))
}

fn field<'v>(obj: &'v Map<String, Value>, key: &str) -> Result<&'v Value, ImportError> {
    obj.get(key)
        .ok_or_else(|| malformed(format!("missing field {key:?}")))
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Result<String, ImportError> {
    field(obj, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| malformed(format!("field {key:?} must be a string")))
}

fn optional_str(obj: &Map<String, Value>, key: &str) -> Result<String, ImportError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(_) => str_field(obj, key),
    }
}

fn optional_bool(obj: &Map<String, Value>, key: &str, default: bool) -> Result<bool, ImportError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| malformed(format!("field {key:?} must be a boolean"))),
    }
}

fn optional_array<'v>(obj: &'v Map<String, Value>, key: &str) -> Result<&'v [Value], ImportError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(value) => value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| malformed(format!("field {key:?} must be an array"))),
    }
}

fn string_map(obj: &Map<String, Value>, key: &str) -> Result<BTreeMap<String, String>, ImportError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(value) => Ok(serde_json::from_value(value.clone())?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_version_parse() {
        assert_eq!(FormatVersion::parse("1.2.3"), Some(FormatVersion::new(1, 2, 3)));
        assert_eq!(FormatVersion::parse("1.2"), None);
        assert_eq!(FormatVersion::parse("1.2.3.4"), None);
        assert_eq!(FormatVersion::parse("one.0.0"), None);
    }

    #[test]
    fn test_version_compatibility() {
        assert!(FormatVersion::new(1, 0, 9).is_readable());
        assert!(!FormatVersion::new(1, 1, 0).is_readable());
        assert!(!FormatVersion::new(2, 0, 0).is_readable());
        assert!(!FormatVersion::new(0, 9, 0).is_readable());
    }

    #[test]
    fn test_unknown_node_kind_is_an_error() {
        let importer = Importer::new("site");
        let err = importer
            .node(&json!(["Marquee", { "text": "hi" }]))
            .unwrap_err();
        assert_eq!(err, ImportError::UnknownNodeKind("Marquee".to_string()));
    }

    #[test]
    fn test_foreign_idents_are_kept() {
        let importer = Importer::new("site").with_addition(100);
        assert_eq!(importer.ident(&json!(5)).unwrap(), Ident::new("site", 105));
        assert_eq!(importer.ident(&json!(0)).unwrap(), Ident::new("site", 0));
        assert_eq!(importer.ident(&json!(-3)).unwrap(), Ident::new("site", -3));
        assert_eq!(
            importer.ident(&json!(["other", 5])).unwrap(),
            Ident::new("other", 5)
        );
    }

    #[test]
    fn test_renumber_overflow_is_an_error() {
        let importer = Importer::new("site").with_addition(1);
        assert_eq!(
            importer.ident(&json!(i64::MAX)).unwrap_err(),
            ImportError::IdentOverflow {
                number: i64::MAX,
                addition: 1
            }
        );
    }

    #[test]
    fn test_document_identity_must_be_local() {
        let importer = Importer::new("site");
        assert_eq!(importer.own_ident(&json!(7)).unwrap(), Ident::new("site", 7));
        assert_eq!(
            importer.own_ident(&json!(["other", 5])).unwrap_err(),
            ImportError::ForeignIdent(Ident::new("other", 5))
        );
    }

    #[test]
    fn test_node_record_shape() {
        let node = Node::element("p").with_child(Node::text("hi"));
        assert_eq!(
            node_to_json(&node, "site"),
            json!(["Element", {
                "tag": "p",
                "attributes": {},
                "hide_if_empty": false,
                "children": [["Text", { "text": "hi" }]],
            }])
        );
    }

    #[test]
    fn test_field_values_round_trip_with_renumbering() {
        let encoder = Encoder::new("site");
        let local = encoder.field_value(&FieldValue::Ident(Ident::new("site", 4)));
        let foreign = encoder.field_value(&FieldValue::Ident(Ident::new("docs", 4)));
        assert_eq!(local, json!(["ident", 4]));
        assert_eq!(foreign, json!(["ident", ["docs", 4]]));

        let importer = Importer::new("copy").with_addition(10);
        assert_eq!(
            importer.field_value(&local).unwrap(),
            FieldValue::Ident(Ident::new("copy", 14))
        );
        assert_eq!(
            importer.field_value(&foreign).unwrap(),
            FieldValue::Ident(Ident::new("docs", 4))
        );
    }
}
