//! Content-model properties of the schema engine.

use proptest::prelude::*;

use docx_oxml::Error;
use docx_oxml::oxml::text::{B, R_PR};
use docx_oxml::oxml::{AttrKind, AttrSpec, ChildSpec, ElementSchema, OxmlElement, Paragraph, Run};
use docx_oxml::xml::{NodeId, QName, XmlTree};

const RPR_TAGS: [&str; 4] = ["rStyle", "b", "i", "vertAlign"];

static SPACING: ElementSchema = ElementSchema {
    tag: QName::w("spacing"),
    children: &[],
    attributes: &[
        AttrSpec::with_default(QName::w("before"), AttrKind::Int, "0"),
        AttrSpec::optional(QName::w("after"), AttrKind::Int),
    ],
};

fn child_tags(tree: &XmlTree, node: NodeId) -> Vec<String> {
    tree.children(node)
        .iter()
        .filter_map(|&c| tree.name(c).map(|n| n.local.to_string()))
        .collect()
}

proptest! {
    #[test]
    fn prop_children_land_in_declared_order(
        order in Just(RPR_TAGS.to_vec()).prop_shuffle(),
        take in 1usize..=4,
    ) {
        let mut tree = XmlTree::new(R_PR.tag);
        let root = tree.root();
        for tag in &order[..take] {
            R_PR.get_or_add(&mut tree, root, QName::w(tag)).unwrap();
        }

        let expected: Vec<String> = RPR_TAGS
            .iter()
            .filter(|t| order[..take].contains(*t))
            .map(|t| t.to_string())
            .collect();
        prop_assert_eq!(child_tags(&tree, root), expected);
    }

    #[test]
    fn prop_get_or_add_is_idempotent(tag in prop::sample::select(RPR_TAGS.to_vec()), repeats in 1usize..5) {
        let mut tree = XmlTree::new(R_PR.tag);
        let root = tree.root();
        let first = R_PR.get_or_add(&mut tree, root, QName::w(tag)).unwrap();
        for _ in 0..repeats {
            prop_assert_eq!(R_PR.get_or_add(&mut tree, root, QName::w(tag)).unwrap(), first);
        }
        prop_assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn prop_int_attribute_round_trips(value in any::<i64>()) {
        let mut tree = XmlTree::new(SPACING.tag);
        let root = tree.root();
        let after = QName::w("after");

        SPACING.set_attr(&mut tree, root, after, Some(&value)).unwrap();
        prop_assert_eq!(SPACING.get_attr::<i64>(&tree, root, after).unwrap(), Some(value));
        let expected = value.to_string();
        prop_assert_eq!(tree.attribute(root, after), Some(expected.as_str()));

        SPACING.set_attr::<i64>(&mut tree, root, after, None).unwrap();
        prop_assert_eq!(tree.attribute(root, after), None);
        prop_assert_eq!(SPACING.get_attr::<i64>(&tree, root, after).unwrap(), None);
    }
}

#[test]
fn test_int_attribute_default() {
    let mut tree = XmlTree::new(SPACING.tag);
    let root = tree.root();
    let before = QName::w("before");

    assert_eq!(SPACING.get_attr::<i64>(&tree, root, before).unwrap(), Some(0));

    SPACING.set_attr(&mut tree, root, before, Some(&240i64)).unwrap();
    assert_eq!(tree.attribute(root, before), Some("240"));

    // writing the default drops the attribute
    SPACING.set_attr(&mut tree, root, before, Some(&0i64)).unwrap();
    assert_eq!(tree.attribute(root, before), None);
    assert_eq!(SPACING.get_attr::<i64>(&tree, root, before).unwrap(), Some(0));
}

#[test]
fn test_malformed_int_is_parse_error() {
    let mut tree = XmlTree::new(SPACING.tag);
    let root = tree.root();
    tree.set_attribute(root, QName::w("before"), "twelve");
    let err = SPACING
        .get_attr::<i64>(&tree, root, QName::w("before"))
        .unwrap_err();
    assert!(matches!(err, Error::Parse { ref value, .. } if value == "twelve"));
}

#[test]
fn test_bool_default_reads_true() {
    let mut tree = XmlTree::new(B.tag);
    let root = tree.root();
    assert_eq!(B.get_attr::<bool>(&tree, root, QName::w("val")).unwrap(), Some(true));
    B.set_attr(&mut tree, root, QName::w("val"), Some(&false)).unwrap();
    assert_eq!(tree.attribute(root, QName::w("val")), Some("0"));
}

#[test]
fn test_repeated_children_reject_get_or_add() {
    let mut tree = XmlTree::new(Run::schema().tag);
    let run = Run(tree.root());
    assert!(matches!(
        run.get_or_add_by_tag(&mut tree, QName::w("t")),
        Err(Error::Constraint(_))
    ));
}

#[test]
fn test_typed_run_editing() {
    let mut tree = XmlTree::new(Run::schema().tag);
    let run = Run(tree.root());
    run.add_text(&mut tree, " spaced ").unwrap();
    run.add_footnote_reference(&mut tree, 5).unwrap();
    let props = run.get_or_add_properties(&mut tree).unwrap();
    props.set_bold(&mut tree, Some(true)).unwrap();

    assert_eq!(
        child_tags(&tree, run.node()),
        vec!["rPr", "t", "footnoteReference"]
    );
    assert_eq!(run.text(&tree), " spaced ");
    assert_eq!(props.bold(&tree).unwrap(), Some(true));
    assert_eq!(props.style(&tree).unwrap().as_deref(), Some("FootnoteReference"));
    run.validate(&tree).unwrap();
}

#[test]
fn test_undeclared_child_is_constraint_error() {
    let mut tree = XmlTree::new(R_PR.tag);
    let root = tree.root();
    let err = R_PR.add(&mut tree, root, QName::w("color")).unwrap_err();
    assert!(matches!(err, Error::Constraint(_)));

    let spec = ChildSpec::zero_or_one(QName::w("b"));
    assert!(spec.cardinality.is_singleton());
}

#[test]
fn test_rejected_move_leaves_child_in_place() {
    let mut tree = XmlTree::new(Paragraph::schema().tag);
    let paragraph = Paragraph(tree.root());
    let first = paragraph.add_run(&mut tree).unwrap();
    let second = paragraph.add_run(&mut tree).unwrap();
    let moved = first.get_or_add_properties(&mut tree).unwrap();
    second.get_or_add_properties(&mut tree).unwrap();

    let err = second.insert(&mut tree, moved).unwrap_err();
    assert!(matches!(err, Error::Constraint(_)));
    assert_eq!(tree.parent(moved.node()), Some(first.node()));
    assert_eq!(child_tags(&tree, first.node()), vec!["rPr"]);
    assert_eq!(child_tags(&tree, second.node()), vec!["rPr"]);
}

#[test]
fn test_move_into_canonical_position() {
    let mut tree = XmlTree::new(Paragraph::schema().tag);
    let paragraph = Paragraph(tree.root());
    let source = paragraph.add_run(&mut tree).unwrap();
    let target = paragraph.add_run(&mut tree).unwrap();
    target.add_text(&mut tree, "text").unwrap();
    let props = source.get_or_add_properties(&mut tree).unwrap();

    target.insert(&mut tree, props).unwrap();
    assert_eq!(tree.parent(props.node()), Some(target.node()));
    assert!(child_tags(&tree, source.node()).is_empty());
    assert_eq!(child_tags(&tree, target.node()), vec!["rPr", "t"]);

    // re-inserting under the same parent is not a duplicate
    target.insert(&mut tree, props).unwrap();
    assert_eq!(child_tags(&tree, target.node()), vec!["rPr", "t"]);
}
