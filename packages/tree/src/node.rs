use crate::ident::Ident;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute map of an element (sorted, so output order is deterministic)
pub type Attributes = BTreeMap<String, String>;

/// Content tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// HTML element with an ordered child list
    Element {
        tag: String,
        attributes: Attributes,
        hide_if_empty: bool,
        children: Vec<Node>,
    },

    /// Void element (`<br />`, `<img />`), never has children
    ClosedElement { tag: String, attributes: Attributes },

    /// Raw text
    TextLiteral { text: String },

    /// Reference into the external text block store
    TextBlockRef {
        textref: String,
        failure_message: String,
        escape: bool,
        linebreaks: bool,
    },

    /// Named or escaped symbol such as `&nbsp;`
    HtmlSymbol { text: String },

    /// Comment
    Comment { text: String },

    /// Stands in for a named section, resolved when rendered or edited
    SectionPlaceholder {
        section: String,
        placename: String,
        brief: String,
    },

    /// Pluggable widget with numbered containers
    Widget(Widget),
}

/// Discriminant of [`Node`], used in errors and as the persisted record tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    ClosedElement,
    TextLiteral,
    TextBlockRef,
    HtmlSymbol,
    Comment,
    SectionPlaceholder,
    Widget,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Element,
        NodeKind::ClosedElement,
        NodeKind::TextLiteral,
        NodeKind::TextBlockRef,
        NodeKind::HtmlSymbol,
        NodeKind::Comment,
        NodeKind::SectionPlaceholder,
        NodeKind::Widget,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Element => "Element",
            NodeKind::ClosedElement => "ClosedElement",
            NodeKind::TextLiteral => "Text",
            NodeKind::TextBlockRef => "TextBlock",
            NodeKind::HtmlSymbol => "Symbol",
            NodeKind::Comment => "Comment",
            NodeKind::SectionPlaceholder => "SectionPlaceholder",
            NodeKind::Widget => "Widget",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// `(module, class_name)` pair naming a widget or validator implementation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKind {
    pub module: String,
    pub class_name: String,
}

impl ComponentKind {
    pub fn new(module: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            class_name: class_name.into(),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.class_name)
    }
}

/// Value bound to a widget field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Int(i64),
    /// Link to another document
    Ident(Ident),
    List(Vec<String>),
}

/// Validator attached to a widget field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub kind: ComponentKind,
    pub message: String,
    pub displayed: bool,
    pub args: BTreeMap<String, String>,
    pub allowed_values: Vec<String>,
}

impl Validator {
    pub fn new(kind: ComponentKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            displayed: true,
            args: BTreeMap::new(),
            allowed_values: Vec::new(),
        }
    }
}

/// Widget instance. `name` is unique within the owning document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub kind: ComponentKind,
    pub name: String,
    pub brief: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub containers: Vec<Vec<Node>>,
    pub validators: Vec<Validator>,
}

impl Widget {
    pub fn new(kind: ComponentKind, name: impl Into<String>, containers: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            brief: String::new(),
            fields: BTreeMap::new(),
            containers: vec![Vec::new(); containers],
            validators: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// Outbound lookup of text blocks by reference key
pub trait TextBlockSource {
    fn text(&self, textref: &str) -> Option<String>;
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element {
            tag: tag.into(),
            attributes: Attributes::new(),
            hide_if_empty: false,
            children: Vec::new(),
        }
    }

    pub fn closed_element(tag: impl Into<String>) -> Self {
        Node::ClosedElement {
            tag: tag.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::TextLiteral { text: text.into() }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Node::Comment { text: text.into() }
    }

    pub fn symbol(text: impl Into<String>) -> Self {
        Node::HtmlSymbol { text: text.into() }
    }

    pub fn text_block(textref: impl Into<String>) -> Self {
        Node::TextBlockRef {
            textref: textref.into(),
            failure_message: String::new(),
            escape: true,
            linebreaks: true,
        }
    }

    pub fn placeholder(section: impl Into<String>, placename: impl Into<String>) -> Self {
        Node::SectionPlaceholder {
            section: section.into(),
            placename: placename.into(),
            brief: String::new(),
        }
    }

    /// Builder: append a child (no-op for nodes without a child list)
    pub fn with_child(mut self, child: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Builder: set an attribute on an element or closed element
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(attributes) = self.attributes_mut() {
            attributes.insert(name.into(), value.into());
        }
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element { .. } => NodeKind::Element,
            Node::ClosedElement { .. } => NodeKind::ClosedElement,
            Node::TextLiteral { .. } => NodeKind::TextLiteral,
            Node::TextBlockRef { .. } => NodeKind::TextBlockRef,
            Node::HtmlSymbol { .. } => NodeKind::HtmlSymbol,
            Node::Comment { .. } => NodeKind::Comment,
            Node::SectionPlaceholder { .. } => NodeKind::SectionPlaceholder,
            Node::Widget(_) => NodeKind::Widget,
        }
    }

    /// Whether this variant owns an ordered child list
    pub fn accepts_children(&self) -> bool {
        matches!(self, Node::Element { .. })
    }

    /// Number of containers (0 for everything but widgets)
    pub fn container_count(&self) -> usize {
        match self {
            Node::Widget(widget) => widget.containers.len(),
            _ => 0,
        }
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Node::Element { attributes, .. } | Node::ClosedElement { attributes, .. } => {
                Some(attributes)
            }
            _ => None,
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Node::Element { attributes, .. } | Node::ClosedElement { attributes, .. } => {
                Some(attributes)
            }
            _ => None,
        }
    }

    pub fn as_widget(&self) -> Option<&Widget> {
        match self {
            Node::Widget(widget) => Some(widget),
            _ => None,
        }
    }

    pub fn as_widget_mut(&mut self) -> Option<&mut Widget> {
        match self {
            Node::Widget(widget) => Some(widget),
            _ => None,
        }
    }

    /// Name this node claims in the document's name space
    /// (widget name or placeholder placename)
    pub fn claimed_name(&self) -> Option<&str> {
        match self {
            Node::Widget(widget) => Some(&widget.name),
            Node::SectionPlaceholder { placename, .. } => Some(placename),
            _ => None,
        }
    }

    /// Text to display for a text block, falling back to the failure message
    pub fn display_text(&self, source: &dyn TextBlockSource) -> Option<String> {
        match self {
            Node::TextBlockRef {
                textref,
                failure_message,
                ..
            } => Some(
                source
                    .text(textref)
                    .unwrap_or_else(|| failure_message.clone()),
            ),
            Node::TextLiteral { text } => Some(text.clone()),
            _ => None,
        }
    }
}
