//! Collectors built on [`Visitor`]

use crate::visitor::{walk_node, Visitor};
use quire_tree::{Node, Roots};
use std::collections::{BTreeMap, BTreeSet};

/// Gathers every name claimed in the document name space: widget names
/// and section placeholder placenames
#[derive(Debug, Default)]
pub struct NameCollector {
    pub names: Vec<String>,
}

impl Visitor for NameCollector {
    fn visit_node(&mut self, node: &Node) {
        if let Some(name) = node.claimed_name() {
            self.names.push(name.to_string());
        }
        walk_node(self, node);
    }
}

/// Gathers the section names referenced by placeholders
#[derive(Debug, Default)]
pub struct SectionRefCollector {
    pub sections: BTreeSet<String>,
}

impl Visitor for SectionRefCollector {
    fn visit_node(&mut self, node: &Node) {
        if let Node::SectionPlaceholder { section, .. } = node {
            self.sections.insert(section.clone());
        }
        walk_node(self, node);
    }
}

/// Names claimed anywhere in `roots`, in document order
pub fn claimed_names(roots: &Roots) -> Vec<String> {
    let mut collector = NameCollector::default();
    collector.visit_roots(roots);
    collector.names
}

/// Names claimed more than once in `roots`
pub fn duplicate_names(roots: &Roots) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for name in claimed_names(roots) {
        *counts.entry(name).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect()
}

/// Sections referenced by placeholders anywhere in `roots`
pub fn section_references(roots: &Roots) -> BTreeSet<String> {
    let mut collector = SectionRefCollector::default();
    collector.visit_roots(roots);
    collector.sections
}

/// Sections referenced by placeholders inside a single subtree
pub fn subtree_section_references(node: &Node) -> BTreeSet<String> {
    let mut collector = SectionRefCollector::default();
    collector.visit_node(node);
    collector.sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_tree::{ComponentKind, Widget};

    fn widget(name: &str) -> Widget {
        Widget::new(ComponentKind::new("widgets", "Box"), name, 1)
    }

    fn sample() -> Roots {
        let mut outer = widget("outer");
        outer.containers[0].push(Node::Widget(widget("inner")));
        outer.containers[0].push(Node::placeholder("footer", "foot"));

        Roots::Page {
            head: Node::element("head"),
            body: Node::element("body")
                .with_child(Node::Widget(outer))
                .with_child(Node::Widget(widget("inner")))
                .with_child(Node::placeholder("header", "top")),
        }
    }

    #[test]
    fn test_claimed_names_reach_into_containers() {
        assert_eq!(claimed_names(&sample()), vec!["outer", "inner", "foot", "inner", "top"]);
    }

    #[test]
    fn test_duplicate_names() {
        assert_eq!(duplicate_names(&sample()), vec!["inner".to_string()]);
        assert!(duplicate_names(&Roots::page()).is_empty());
    }

    #[test]
    fn test_section_references() {
        let sections: Vec<_> = section_references(&sample()).into_iter().collect();
        assert_eq!(sections, vec!["footer", "header"]);
    }
}
