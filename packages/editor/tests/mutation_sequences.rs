//! Tests for longer mutation sequences
//!
//! This tests:
//! - Move + rename + delete chains
//! - Move rollback when the destination is invalid
//! - Token chaining across many edits
//! - Document integrity after operations

use quire_common::duplicate_names;
use quire_editor::{
    ChangeToken, ComponentKind, Document, EditContext, EditorConfig, Ident, LocationError,
    LocationPath, Mutation, MutationError, Node, Outcome, Roots, Widget,
};

fn path(s: &str) -> LocationPath {
    s.parse().unwrap()
}

fn menu(name: &str) -> Node {
    Node::Widget(Widget::new(ComponentKind::new("links", "NavList"), name, 1))
}

fn doc() -> Document {
    Document::new(
        Ident::new("site", 1),
        "home",
        Roots::Page {
            head: Node::element("head"),
            body: Node::element("body")
                .with_child(Node::element("div").with_child(Node::text("Child 1")))
                .with_child(Node::element("div").with_child(Node::text("Child 2")))
                .with_child(menu("menu")),
        },
    )
}

fn run(doc: &mut Document, token: ChangeToken, mutation: Mutation) -> (ChangeToken, Outcome) {
    let config = EditorConfig::default();
    let applied = doc
        .apply(&token, mutation, &EditContext::new(&config))
        .unwrap();
    (applied.token, applied.outcome)
}

#[test]
fn test_move_then_delete_sequence() {
    let mut doc = doc();
    let token = doc.token().clone();

    // Move the second div into the first
    let (token, outcome) = run(
        &mut doc,
        token,
        Mutation::Move {
            source: path("body/1"),
            dest_parent: path("body/0"),
            dest_index: 1,
        },
    );
    assert_eq!(outcome, Outcome::Moved { path: path("body/0/1") });
    assert_eq!(doc.resolve(&path("body/0")).unwrap().children().map(Vec::len), Some(2));

    // Delete the first div, taking the moved one with it
    let (_, outcome) = run(&mut doc, token, Mutation::Delete { path: path("body/0") });
    let Outcome::Removed { node } = outcome else {
        panic!("expected removed node");
    };
    assert_eq!(node.children().map(Vec::len), Some(2));
    assert_eq!(doc.resolve(&path("body")).unwrap().children().map(Vec::len), Some(1));
}

#[test]
fn test_move_into_container_keeps_names() {
    let mut doc = doc();
    let token = doc.token().clone();

    let (token, _) = run(
        &mut doc,
        token,
        Mutation::Insert {
            parent: path("body"),
            index: 0,
            node: menu("inner"),
        },
    );

    // After the insert the outer menu sits at body/3
    let (_, outcome) = run(
        &mut doc,
        token,
        Mutation::Move {
            source: path("body/0"),
            dest_parent: path("@menu#0"),
            dest_index: 0,
        },
    );

    assert_eq!(outcome, Outcome::Moved { path: path("@menu#0/0") });
    let moved = doc.resolve(&path("@menu#0/0")).unwrap();
    assert_eq!(moved.as_widget().map(|w| w.name.as_str()), Some("inner"));
    assert!(duplicate_names(doc.roots()).is_empty());
}

#[test]
fn test_failed_move_rolls_back() {
    let config = EditorConfig::default();
    let mut doc = doc();
    let token = doc.token().clone();
    let before = doc.roots().clone();

    let err = doc
        .apply(
            &token,
            Mutation::Move {
                source: path("body/0"),
                dest_parent: path("body/0"),
                dest_index: 5,
            },
            &EditContext::new(&config),
        )
        .unwrap_err();

    assert_eq!(
        err,
        MutationError::Location(LocationError::IndexOutOfRange { index: 5, len: 1 })
    );
    assert_eq!(doc.roots(), &before);
    assert_eq!(doc.token(), &token);
    assert_eq!(doc.version(), 0);
}

#[test]
fn test_move_root_is_rejected() {
    let config = EditorConfig::default();
    let mut doc = doc();
    let token = doc.token().clone();

    let err = doc
        .apply(
            &token,
            Mutation::Move {
                source: path("head"),
                dest_parent: path("body"),
                dest_index: 0,
            },
            &EditContext::new(&config),
        )
        .unwrap_err();
    assert_eq!(err, MutationError::RootCannotBeDeleted);
}

#[test]
fn test_rename_then_address_by_new_name() {
    let mut doc = doc();
    let token = doc.token().clone();

    let (token, _) = run(
        &mut doc,
        token,
        Mutation::RenameWidget {
            path: path("body/2"),
            name: "main_nav".to_string(),
        },
    );
    let (_, _) = run(
        &mut doc,
        token,
        Mutation::Insert {
            parent: path("@main_nav#0"),
            index: 0,
            node: Node::text("Home"),
        },
    );

    assert!(doc.resolve(&path("@menu")).is_err());
    assert_eq!(doc.resolve(&path("@main_nav#0/0")).unwrap(), &Node::text("Home"));
}

#[test]
fn test_every_edit_issues_a_new_token() {
    let mut doc = doc();
    let mut token = doc.token().clone();
    let mut seen = vec![token.clone()];

    for i in 0..10 {
        let (next, _) = run(
            &mut doc,
            token,
            Mutation::EditText {
                path: path("body/0/0"),
                text: format!("edit {i}"),
            },
        );
        assert!(!seen.contains(&next));
        seen.push(next.clone());
        token = next;
    }

    assert_eq!(doc.version(), 10);
    assert_eq!(doc.resolve(&path("body/0/0")).unwrap(), &Node::text("edit 9"));
}
