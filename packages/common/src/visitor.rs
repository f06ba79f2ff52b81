use quire_tree::{FieldValue, Node, Roots, Validator, Widget};

/// Visitor pattern for traversing content trees immutably
///
/// Default implementations walk the whole tree, including every widget
/// container. Override specific visit_* methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_roots(&mut self, roots: &Roots) {
        walk_roots(self, roots);
    }

    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_widget(&mut self, widget: &Widget) {
        walk_widget(self, widget);
    }

    fn visit_field(&mut self, _name: &str, _value: &FieldValue) {
        // Leaf, nothing to walk
    }

    fn visit_validator(&mut self, _validator: &Validator) {
        // Leaf, nothing to walk
    }
}

/// Mutable visitor pattern for transforming content trees
///
/// `visit_node_mut` may replace the node it is given; the default walk
/// then descends into whatever is there.
pub trait VisitorMut: Sized {
    fn visit_roots_mut(&mut self, roots: &mut Roots) {
        walk_roots_mut(self, roots);
    }

    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }

    fn visit_widget_mut(&mut self, widget: &mut Widget) {
        walk_widget_mut(self, widget);
    }

    fn visit_field_mut(&mut self, _name: &str, _value: &mut FieldValue) {
        // Leaf, nothing to walk
    }
}

// Default walk implementations for immutable visitor

pub fn walk_roots<V: Visitor>(visitor: &mut V, roots: &Roots) {
    for (_, root) in roots.iter() {
        visitor.visit_node(root);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    match node {
        Node::Element { children, .. } => {
            for child in children {
                visitor.visit_node(child);
            }
        }
        Node::Widget(widget) => visitor.visit_widget(widget),
        Node::ClosedElement { .. }
        | Node::TextLiteral { .. }
        | Node::TextBlockRef { .. }
        | Node::HtmlSymbol { .. }
        | Node::Comment { .. }
        | Node::SectionPlaceholder { .. } => {
            // Leaf nodes
        }
    }
}

pub fn walk_widget<V: Visitor>(visitor: &mut V, widget: &Widget) {
    for (name, value) in &widget.fields {
        visitor.visit_field(name, value);
    }
    for validator in &widget.validators {
        visitor.visit_validator(validator);
    }
    for container in &widget.containers {
        for child in container {
            visitor.visit_node(child);
        }
    }
}

// Default walk implementations for mutable visitor

pub fn walk_roots_mut<V: VisitorMut>(visitor: &mut V, roots: &mut Roots) {
    for (_, root) in roots.iter_mut() {
        visitor.visit_node_mut(root);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    match node {
        Node::Element { children, .. } => {
            for child in children {
                visitor.visit_node_mut(child);
            }
        }
        Node::Widget(widget) => visitor.visit_widget_mut(widget),
        Node::ClosedElement { .. }
        | Node::TextLiteral { .. }
        | Node::TextBlockRef { .. }
        | Node::HtmlSymbol { .. }
        | Node::Comment { .. }
        | Node::SectionPlaceholder { .. } => {
            // Leaf nodes
        }
    }
}

pub fn walk_widget_mut<V: VisitorMut>(visitor: &mut V, widget: &mut Widget) {
    for (name, value) in widget.fields.iter_mut() {
        visitor.visit_field_mut(name, value);
    }
    for container in &mut widget.containers {
        for child in container {
            visitor.visit_node_mut(child);
        }
    }
}
