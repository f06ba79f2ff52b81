use crate::error::{LocationError, LocationResult};
use crate::location::{
    descend, descend_mut, find_widget, path_hops, ListAddress, LocationPath, NodeAddress,
    RootName, RootSelector,
};
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// The named roots of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Roots {
    /// HTML page with head and body
    Page { head: Node, body: Node },
    /// SVG page
    Svg { svg: Node },
    /// Reusable section with a single root
    Section { section: Node },
}

impl Roots {
    /// Empty HTML page
    pub fn page() -> Self {
        Roots::Page {
            head: Node::element("head"),
            body: Node::element("body"),
        }
    }

    /// Empty SVG page
    pub fn svg() -> Self {
        Roots::Svg {
            svg: Node::element("svg")
                .with_attribute("xmlns", "http://www.w3.org/2000/svg")
                .with_attribute("version", "1.1"),
        }
    }

    pub fn section(root: Node) -> Self {
        Roots::Section { section: root }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Roots::Section { .. })
    }

    pub fn names(&self) -> &'static [RootName] {
        match self {
            Roots::Page { .. } => &[RootName::Head, RootName::Body],
            Roots::Svg { .. } => &[RootName::Svg],
            Roots::Section { .. } => &[RootName::Section],
        }
    }

    pub fn get(&self, name: RootName) -> Option<&Node> {
        match (self, name) {
            (Roots::Page { head, .. }, RootName::Head) => Some(head),
            (Roots::Page { body, .. }, RootName::Body) => Some(body),
            (Roots::Svg { svg }, RootName::Svg) => Some(svg),
            (Roots::Section { section }, RootName::Section) => Some(section),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, name: RootName) -> Option<&mut Node> {
        match (self, name) {
            (Roots::Page { head, .. }, RootName::Head) => Some(head),
            (Roots::Page { body, .. }, RootName::Body) => Some(body),
            (Roots::Svg { svg }, RootName::Svg) => Some(svg),
            (Roots::Section { section }, RootName::Section) => Some(section),
            _ => None,
        }
    }

    /// `(name, root)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (RootName, &Node)> {
        self.names()
            .iter()
            .filter_map(move |&name| self.get(name).map(|node| (name, node)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RootName, &mut Node)> {
        let roots: Vec<(RootName, &mut Node)> = match self {
            Roots::Page { head, body } => vec![(RootName::Head, head), (RootName::Body, body)],
            Roots::Svg { svg } => vec![(RootName::Svg, svg)],
            Roots::Section { section } => vec![(RootName::Section, section)],
        };
        roots.into_iter()
    }

    fn root(&self, name: RootName) -> LocationResult<&Node> {
        self.get(name)
            .ok_or_else(|| LocationError::not_found(format!("root {}", name)))
    }

    fn root_mut(&mut self, name: RootName) -> LocationResult<&mut Node> {
        self.get_mut(name)
            .ok_or_else(|| LocationError::not_found(format!("root {}", name)))
    }

    /// Canonical address of the widget called `name`
    pub fn find_widget(&self, name: &str) -> Option<NodeAddress> {
        self.iter().find_map(|(root, node)| {
            let mut hops = Vec::new();
            find_widget(node, name, &mut hops).then_some(NodeAddress { root, hops })
        })
    }

    fn base(&self, selector: &RootSelector) -> LocationResult<NodeAddress> {
        match selector {
            RootSelector::Root(name) => {
                self.root(*name)?;
                Ok(NodeAddress {
                    root: *name,
                    hops: Vec::new(),
                })
            }
            RootSelector::Widget(name) => self
                .find_widget(name)
                .ok_or_else(|| LocationError::not_found(format!("widget {}", name))),
        }
    }

    /// Canonicalize and validate a path to a node.
    ///
    /// A container address with no indices resolves to the widget owning
    /// the container (after checking the container exists).
    pub fn address(&self, path: &LocationPath) -> LocationResult<NodeAddress> {
        let mut address = self.base(&path.root)?;
        if path.indices.is_empty() {
            if let Some(slot) = path.container {
                self.node(&address)?.child_list(Some(slot))?;
            }
            return Ok(address);
        }
        address.hops.extend(path_hops(path));
        self.node(&address)?;
        Ok(address)
    }

    /// Canonicalize and validate a path naming a child list: the children
    /// of the element at `path`, or the container when `path` selects one
    /// and has no indices.
    pub fn list_address(&self, path: &LocationPath) -> LocationResult<ListAddress> {
        let base = self.base(&path.root)?;
        let list = if path.indices.is_empty() {
            ListAddress {
                root: base.root,
                hops: base.hops,
                slot: path.container,
            }
        } else {
            let mut hops = base.hops;
            hops.extend(path_hops(path));
            ListAddress {
                root: base.root,
                hops,
                slot: None,
            }
        };
        self.list(&list)?;
        Ok(list)
    }

    pub fn node(&self, address: &NodeAddress) -> LocationResult<&Node> {
        descend(self.root(address.root)?, &address.hops)
    }

    pub fn node_mut(&mut self, address: &NodeAddress) -> LocationResult<&mut Node> {
        descend_mut(self.root_mut(address.root)?, &address.hops)
    }

    pub fn list(&self, address: &ListAddress) -> LocationResult<&Vec<Node>> {
        descend(self.root(address.root)?, &address.hops)?.child_list(address.slot)
    }

    pub fn list_mut(&mut self, address: &ListAddress) -> LocationResult<&mut Vec<Node>> {
        descend_mut(self.root_mut(address.root)?, &address.hops)?.child_list_mut(address.slot)
    }

    /// Resolve a path to the node it names
    pub fn resolve(&self, path: &LocationPath) -> LocationResult<&Node> {
        let address = self.address(path)?;
        self.node(&address)
    }

    pub fn resolve_mut(&mut self, path: &LocationPath) -> LocationResult<&mut Node> {
        let address = self.address(path)?;
        self.node_mut(&address)
    }
}
