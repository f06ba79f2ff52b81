//! # Location Paths
//!
//! A [`LocationPath`] addresses one node of a document:
//!
//! ```text
//! body/0/2        third child of the first child of <body>
//! body#1/0        first node in container 1 of the body root (a widget)
//! @menu#0/3/1     inside container 0 of the widget named "menu"
//! ```
//!
//! Paths are ephemeral: any mutation of the document may invalidate them.
//! Resolution goes through [`NodeAddress`]/[`ListAddress`], the canonical
//! hop-by-hop form that starts at a document root.

use crate::error::{LocationError, LocationResult};
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed roots a document may own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RootName {
    Head,
    Body,
    Svg,
    Section,
}

impl RootName {
    pub fn as_str(self) -> &'static str {
        match self {
            RootName::Head => "head",
            RootName::Body => "body",
            RootName::Svg => "svg",
            RootName::Section => "section",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "head" => Some(RootName::Head),
            "body" => Some(RootName::Body),
            "svg" => Some(RootName::Svg),
            "section" => Some(RootName::Section),
            _ => None,
        }
    }
}

impl fmt::Display for RootName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where resolution starts: a document root or a widget found by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootSelector {
    Root(RootName),
    Widget(String),
}

impl From<RootName> for RootSelector {
    fn from(name: RootName) -> Self {
        RootSelector::Root(name)
    }
}

/// Address of a node: root selector, optional container of the root
/// widget, then child indices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationPath {
    pub root: RootSelector,
    pub container: Option<usize>,
    pub indices: Vec<usize>,
}

impl LocationPath {
    pub fn new(root: impl Into<RootSelector>, container: Option<usize>, indices: Vec<usize>) -> Self {
        Self {
            root: root.into(),
            container,
            indices,
        }
    }

    /// Path to a document root
    pub fn root(name: RootName) -> Self {
        Self::new(name, None, Vec::new())
    }

    /// Path to a named widget
    pub fn widget(name: impl Into<String>) -> Self {
        Self::new(RootSelector::Widget(name.into()), None, Vec::new())
    }

    /// Builder: address container `index` of the root widget
    pub fn in_container(mut self, index: usize) -> Self {
        self.container = Some(index);
        self
    }

    /// Builder: descend into child `index`
    pub fn child(mut self, index: usize) -> Self {
        self.indices.push(index);
        self
    }

    /// True when the index list is empty
    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }

    /// Syntactic parent and the index within it; `None` at the root
    pub fn parent(&self) -> Option<(LocationPath, usize)> {
        let (last, rest) = self.indices.split_last()?;
        Some((
            LocationPath {
                root: self.root.clone(),
                container: self.container,
                indices: rest.to_vec(),
            },
            *last,
        ))
    }

    fn hops(&self) -> Vec<Hop> {
        self.indices
            .iter()
            .enumerate()
            .map(|(position, &index)| Hop {
                slot: if position == 0 { self.container } else { None },
                index,
            })
            .collect()
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            RootSelector::Root(name) => write!(f, "{}", name)?,
            RootSelector::Widget(name) => write!(f, "@{}", name)?,
        }
        if let Some(container) = self.container {
            write!(f, "#{}", container)?;
        }
        for index in &self.indices {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for LocationPath {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('/');
        let head = segments.next().unwrap_or_default();

        let (root, container) = match head.split_once('#') {
            Some((root, container)) => {
                let container = container
                    .parse::<usize>()
                    .map_err(|_| LocationError::malformed(s))?;
                (root, Some(container))
            }
            None => (head, None),
        };

        let root = if let Some(name) = root.strip_prefix('@') {
            if name.is_empty() {
                return Err(LocationError::malformed(s));
            }
            RootSelector::Widget(name.to_string())
        } else {
            RootName::parse(root)
                .map(RootSelector::Root)
                .ok_or_else(|| LocationError::malformed(s))?
        };

        let indices = segments
            .map(|segment| segment.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| LocationError::malformed(s))?;

        Ok(LocationPath {
            root,
            container,
            indices,
        })
    }
}

impl TryFrom<String> for LocationPath {
    type Error = LocationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LocationPath> for String {
    fn from(path: LocationPath) -> Self {
        path.to_string()
    }
}

/// One descent: through container `slot` of a widget, or the child list of
/// an element when `slot` is `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hop {
    pub slot: Option<usize>,
    pub index: usize,
}

/// Canonical address of a node, starting at a document root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub root: RootName,
    pub hops: Vec<Hop>,
}

impl NodeAddress {
    pub fn is_root(&self) -> bool {
        self.hops.is_empty()
    }

    /// The list holding this node and its index there; `None` for a root
    pub fn split_last(&self) -> Option<(ListAddress, usize)> {
        let (last, rest) = self.hops.split_last()?;
        Some((
            ListAddress {
                root: self.root,
                hops: rest.to_vec(),
                slot: last.slot,
            },
            last.index,
        ))
    }

    /// True if `other` is this node or lies inside it
    pub fn contains(&self, other: &NodeAddress) -> bool {
        self.root == other.root && other.hops.starts_with(&self.hops)
    }
}

/// Canonical address of a child list: an element's children or one
/// container of a widget
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListAddress {
    pub root: RootName,
    pub hops: Vec<Hop>,
    pub slot: Option<usize>,
}

impl ListAddress {
    pub fn owner(&self) -> NodeAddress {
        NodeAddress {
            root: self.root,
            hops: self.hops.clone(),
        }
    }

    pub fn child(&self, index: usize) -> NodeAddress {
        let mut hops = self.hops.clone();
        hops.push(Hop {
            slot: self.slot,
            index,
        });
        NodeAddress {
            root: self.root,
            hops,
        }
    }
}

impl Node {
    /// The list a hop descends into
    pub fn child_list(&self, slot: Option<usize>) -> LocationResult<&Vec<Node>> {
        match (self, slot) {
            (Node::Element { children, .. }, None) => Ok(children),
            (Node::Widget(widget), Some(index)) => {
                widget
                    .containers
                    .get(index)
                    .ok_or(LocationError::BadContainerIndex {
                        index,
                        count: widget.containers.len(),
                    })
            }
            (other, Some(_)) => Err(LocationError::NotAWidget { kind: other.kind() }),
            (other, None) => Err(LocationError::NotAContainer { kind: other.kind() }),
        }
    }

    pub fn child_list_mut(&mut self, slot: Option<usize>) -> LocationResult<&mut Vec<Node>> {
        match (self, slot) {
            (Node::Element { children, .. }, None) => Ok(children),
            (Node::Widget(widget), Some(index)) => {
                let count = widget.containers.len();
                widget
                    .containers
                    .get_mut(index)
                    .ok_or(LocationError::BadContainerIndex { index, count })
            }
            (other, Some(_)) => Err(LocationError::NotAWidget { kind: other.kind() }),
            (other, None) => Err(LocationError::NotAContainer { kind: other.kind() }),
        }
    }

    fn step(&self, hop: &Hop) -> LocationResult<&Node> {
        let list = self.child_list(hop.slot)?;
        list.get(hop.index).ok_or(LocationError::IndexOutOfRange {
            index: hop.index,
            len: list.len(),
        })
    }

    fn step_mut(&mut self, hop: &Hop) -> LocationResult<&mut Node> {
        let list = self.child_list_mut(hop.slot)?;
        let len = list.len();
        list.get_mut(hop.index)
            .ok_or(LocationError::IndexOutOfRange { index: hop.index, len })
    }
}

/// Depth-first search for a widget by name, recording hops
pub(crate) fn find_widget(node: &Node, name: &str, hops: &mut Vec<Hop>) -> bool {
    match node {
        Node::Widget(widget) => {
            if widget.name == name {
                return true;
            }
            for (slot, container) in widget.containers.iter().enumerate() {
                for (index, child) in container.iter().enumerate() {
                    hops.push(Hop {
                        slot: Some(slot),
                        index,
                    });
                    if find_widget(child, name, hops) {
                        return true;
                    }
                    hops.pop();
                }
            }
            false
        }
        Node::Element { children, .. } => {
            for (index, child) in children.iter().enumerate() {
                hops.push(Hop { slot: None, index });
                if find_widget(child, name, hops) {
                    return true;
                }
                hops.pop();
            }
            false
        }
        _ => false,
    }
}

/// Walk `hops` from `root`
pub(crate) fn descend<'a>(root: &'a Node, hops: &[Hop]) -> LocationResult<&'a Node> {
    let mut node = root;
    for hop in hops {
        node = node.step(hop)?;
    }
    Ok(node)
}

pub(crate) fn descend_mut<'a>(root: &'a mut Node, hops: &[Hop]) -> LocationResult<&'a mut Node> {
    let mut node = root;
    for hop in hops {
        node = node.step_mut(hop)?;
    }
    Ok(node)
}

/// Hops a path contributes after its root selector
pub(crate) fn path_hops(path: &LocationPath) -> Vec<Hop> {
    path.hops()
}
