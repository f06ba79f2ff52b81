//! Persisted form: round trips, version checks and all-or-nothing import

use quire_editor::{
    export_batch, from_json, to_json, ComponentKind, Document, DocumentHandle, DocumentKind,
    FieldValue, Ident,
    ImportError, Importer, Node, ProjectRegistry, Roots, Validator, Widget,
};
use serde_json::json;

fn rich_page() -> Document {
    let mut nav = Widget::new(ComponentKind::new("links", "NavList"), "nav", 2)
        .with_field("target", FieldValue::Ident(Ident::new("site", 4)))
        .with_field("external", FieldValue::Ident(Ident::new("docs", 9)))
        .with_field("labels", FieldValue::List(vec!["a".to_string(), "b".to_string()]))
        .with_field("depth", FieldValue::Int(-2))
        .with_field("open", FieldValue::Bool(true));
    nav.brief = "Main navigation".to_string();
    nav.containers[1].push(Node::text("inside"));
    let mut validator = Validator::new(ComponentKind::new("basic", "OneOf"), "Pick one");
    validator.allowed_values = vec!["x".to_string(), "y".to_string()];
    validator.args.insert("strict".to_string(), "yes".to_string());
    validator.displayed = false;
    nav.validators.push(validator);

    Document::new(
        Ident::new("site", 3),
        "home",
        Roots::Page {
            head: Node::element("head").with_child(Node::element("title").with_child(Node::text("Home"))),
            body: Node::element("body")
                .with_attribute("class", "page")
                .with_child(Node::closed_element("br"))
                .with_child(Node::symbol("&nbsp;"))
                .with_child(Node::comment("note"))
                .with_child(Node::text_block("welcome"))
                .with_child(Node::placeholder("footer", "footer_slot"))
                .with_child(Node::Widget(nav)),
        },
    )
    .with_brief("Landing page")
}

#[test]
fn test_round_trip_preserves_content() {
    let page = rich_page();
    let decoded = from_json(&to_json(&page), "site").unwrap();

    assert!(decoded.content_eq(&page));
    assert_ne!(decoded.token(), page.token());
    assert_eq!(decoded.version(), 0);
}

#[test]
fn test_round_trip_svg_and_section() {
    for doc in [
        Document::new(Ident::new("site", 5), "logo", Roots::svg()),
        Document::new(
            Ident::new("site", 6),
            "footer",
            Roots::section(Node::element("footer").with_child(Node::text("bye"))),
        ),
    ] {
        let decoded = from_json(&to_json(&doc), "site").unwrap();
        assert!(decoded.content_eq(&doc));
        assert_eq!(decoded.kind(), doc.kind());
    }
}

#[test]
fn test_newer_versions_are_rejected() {
    let mut json = to_json(&rich_page());

    json["format"] = json!("1.0.7");
    assert!(from_json(&json, "site").is_ok());

    for version in ["2.0.0", "1.1.0", "0.9.0", "garbage"] {
        json["format"] = json!(version);
        assert!(matches!(
            from_json(&json, "site"),
            Err(ImportError::VersionIncompatible { .. })
        ));
    }
}

#[test]
fn test_unknown_nested_node_kind_fails_whole_document() {
    let mut json = to_json(&rich_page());
    json["roots"]["body"][1]["children"][0] = json!(["Blink", { "text": "!" }]);

    assert_eq!(
        from_json(&json, "site").unwrap_err(),
        ImportError::UnknownNodeKind("Blink".to_string())
    );
}

#[test]
fn test_missing_fields_are_malformed() {
    let json = json!({ "format": "1.0.0", "ident": 1, "kind": "page", "name": "x" });
    assert!(matches!(
        from_json(&json, "site"),
        Err(ImportError::MalformedJson(_))
    ));
}

#[test]
fn test_batch_collision_imports_nothing() {
    let mut registry = ProjectRegistry::new();
    registry.load_project("site", Vec::new()).unwrap();
    registry.reserve("site", 12).unwrap();
    let before = registry.live_numbers("site");

    let first = Document::new(Ident::new("site", 1), "one", Roots::page());
    let second = Document::new(Ident::new("site", 2), "two", Roots::page());
    let batch = export_batch("site", [], [&first, &second]);

    let err = Importer::new("site")
        .with_addition(10)
        .import_batch(&mut registry, &batch)
        .unwrap_err();

    assert_eq!(err, ImportError::IdentCollision(Ident::new("site", 12)));
    assert_eq!(registry.live_numbers("site"), before);
    assert!(registry.resolve(&Ident::new("site", 11)).is_none());
}

#[test]
fn test_batch_import_binds_renumbered_idents() {
    let mut registry = ProjectRegistry::new();
    registry.load_project("copy", Vec::new()).unwrap();

    let page = rich_page();
    let batch = export_batch("site", [], [&page]);

    let imported = Importer::new("copy")
        .with_addition(20)
        .import_batch(&mut registry, &batch)
        .unwrap();

    let doc = &imported.documents[0];
    assert_eq!(doc.ident, Ident::new("copy", 23));
    assert_eq!(
        registry.resolve(&doc.ident).map(|h| h.kind),
        Some(DocumentKind::Page)
    );

    let nav = doc
        .resolve(&"@nav".parse().unwrap())
        .unwrap()
        .as_widget()
        .unwrap();
    assert_eq!(nav.fields["target"], FieldValue::Ident(Ident::new("copy", 24)));
    assert_eq!(nav.fields["external"], FieldValue::Ident(Ident::new("docs", 9)));
    assert_eq!(nav.fields["depth"], FieldValue::Int(-2));

    // Allocation continues above the imported numbers
    assert_eq!(registry.allocate("copy").unwrap(), Ident::new("copy", 24));
}

#[test]
fn test_batch_with_duplicate_numbers_collides() {
    let mut registry = ProjectRegistry::new();
    registry.load_project("site", Vec::new()).unwrap();

    let a = Document::new(Ident::new("site", 4), "a", Roots::page());
    let b = Document::new(Ident::new("site", 4), "b", Roots::page());
    let batch = export_batch("site", [], [&a, &b]);

    assert_eq!(
        Importer::new("site").import_batch(&mut registry, &batch).unwrap_err(),
        ImportError::IdentCollision(Ident::new("site", 4))
    );
    assert_eq!(registry.live_numbers("site"), vec![0]);
}

#[test]
fn test_foreign_document_identity_imports_nothing() {
    let mut registry = ProjectRegistry::new();
    registry.load_project("site", Vec::new()).unwrap();
    registry
        .load_project(
            "other",
            vec![DocumentHandle::new(
                Ident::new("other", 5),
                DocumentKind::Section,
                "footer",
            )],
        )
        .unwrap();

    let local = Document::new(Ident::new("site", 1), "one", Roots::page());
    let mut batch = export_batch("site", [], [&local]);
    batch["documents"]
        .as_array_mut()
        .unwrap()
        .push(json!({
            "ident": ["other", 5],
            "kind": "page",
            "name": "p",
            "roots": {
                "head": ["Element", { "tag": "head" }],
                "body": ["Element", { "tag": "body" }],
            },
        }));

    let err = Importer::new("site")
        .import_batch(&mut registry, &batch)
        .unwrap_err();

    assert_eq!(err, ImportError::ForeignIdent(Ident::new("other", 5)));
    assert_eq!(registry.live_numbers("site"), vec![0]);
    assert_eq!(
        registry.resolve(&Ident::new("other", 5)).map(|h| h.kind),
        Some(DocumentKind::Section)
    );
}

#[test]
fn test_duplicate_widget_names_are_rejected_on_decode() {
    let nav = || Node::Widget(Widget::new(ComponentKind::new("links", "NavList"), "nav", 1));
    let mut json = to_json(&Document::new(
        Ident::new("site", 2),
        "home",
        Roots::Page {
            head: Node::element("head"),
            body: Node::element("body").with_child(nav()),
        },
    ));
    // Written by hand: the engine never produces a second "nav"
    json["roots"]["body"][1]["children"]
        .as_array_mut()
        .unwrap()
        .push(json!(["SectionPlaceholder", { "section": "footer", "placename": "nav" }]));

    assert_eq!(
        from_json(&json, "site").unwrap_err(),
        ImportError::DuplicateName {
            document: "home".to_string(),
            name: "nav".to_string(),
        }
    );
}

#[test]
fn test_addition_overflow_is_rejected() {
    let mut registry = ProjectRegistry::new();
    registry.load_project("site", Vec::new()).unwrap();
    let mut json = to_json(&Document::new(Ident::new("site", 1), "one", Roots::page()));
    json["ident"] = json!(i64::MAX);

    let err = Importer::new("site")
        .with_addition(1)
        .import_document(&mut registry, &json)
        .unwrap_err();

    assert_eq!(
        err,
        ImportError::IdentOverflow {
            number: i64::MAX,
            addition: 1
        }
    );
    assert_eq!(registry.live_numbers("site"), vec![0]);
}
