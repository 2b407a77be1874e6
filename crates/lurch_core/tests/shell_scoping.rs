use lurch_core::{
    document_to_lcs, AccessibleNode, Atom, DocumentTree, LcAttribute, LogicConcept, NodeId, Shell,
    ShellType,
};
use serde_json::json;

fn expression(tree: &mut DocumentTree, text: &str) -> NodeId {
    let atom = Atom::create(tree, "expression", false).expect("atom");
    atom.set_metadata(tree, "lc", json!(text)).expect("lc metadata");
    atom.node()
}

fn attach(tree: &mut DocumentTree, parent: NodeId, child: NodeId) {
    tree.append_child(parent, child).expect("append");
}

#[test]
fn flat_sequence_sees_every_earlier_atom() {
    let mut tree = DocumentTree::new();
    let root = tree.root();
    let a = expression(&mut tree, "A");
    let b = expression(&mut tree, "B");
    let c = expression(&mut tree, "C");
    for node in [a, b, c] {
        attach(&mut tree, root, node);
    }

    assert!(Shell::is_accessible(&tree, a, c));
    assert!(Shell::is_accessible(&tree, b, c));
    assert!(!Shell::is_accessible(&tree, c, a));
    assert!(!Shell::is_accessible(&tree, c, c));
}

#[test]
fn contents_of_a_closed_shell_are_out_of_scope() {
    let mut tree = DocumentTree::new();
    let root = tree.root();
    let shell = Shell::create(&mut tree, ShellType::Subproof).expect("shell");
    attach(&mut tree, root, shell.node());
    let inner = expression(&mut tree, "X");
    shell.append(&mut tree, inner).expect("append inner");
    let later = expression(&mut tree, "Y");
    attach(&mut tree, root, later);

    assert!(!Shell::is_accessible(&tree, inner, later));
    assert!(Shell::is_accessible(&tree, shell.node(), later));
    assert!(Shell::is_accessible(&tree, shell.node(), inner));
}

#[test]
fn nested_shells_see_enclosing_scope() {
    let mut tree = DocumentTree::new();
    let root = tree.root();
    let outer = Shell::create(&mut tree, ShellType::Proof).expect("outer");
    attach(&mut tree, root, outer.node());
    let premise = expression(&mut tree, "P");
    outer.append(&mut tree, premise).expect("append");
    let inner = Shell::create(&mut tree, ShellType::Subproof).expect("inner");
    outer.append(&mut tree, inner.node()).expect("append");
    let deep = expression(&mut tree, "Q");
    inner.append(&mut tree, deep).expect("append");

    assert!(Shell::is_accessible(&tree, premise, deep));
    assert_eq!(Shell::enclosing(&tree, deep), Some(inner));
    assert_eq!(Shell::enclosing(&tree, inner.node()), Some(outer));
}

#[test]
fn accessibles_lists_header_first_then_scoped_document_nodes() {
    let mut header = DocumentTree::new();
    let header_root = header.root();
    let axiom = expression(&mut header, "H");
    attach(&mut header, header_root, axiom);
    let header_shell = Shell::create(&mut header, ShellType::Axiom).expect("shell");
    attach(&mut header, header_root, header_shell.node());
    let hidden = expression(&mut header, "hidden");
    header_shell.append(&mut header, hidden).expect("append");

    let mut tree = DocumentTree::new();
    let root = tree.root();
    let shell = Shell::create(&mut tree, ShellType::Theorem).expect("shell");
    attach(&mut tree, root, shell.node());
    let inside = expression(&mut tree, "X");
    shell.append(&mut tree, inside).expect("append");
    let target = expression(&mut tree, "Y");
    attach(&mut tree, root, target);

    assert_eq!(
        Shell::accessibles(&tree, target, Some(&header)),
        vec![
            AccessibleNode::Header(axiom),
            AccessibleNode::Header(header_shell.node()),
            AccessibleNode::Document(shell.node()),
        ]
    );
}

#[test]
fn rule_finalize_marks_shell_and_children_given() {
    let mut tree = DocumentTree::new();
    let root = tree.root();
    let rule = Shell::create(&mut tree, ShellType::Rule).expect("rule");
    attach(&mut tree, root, rule.node());
    for text in ["A", "B"] {
        let node = expression(&mut tree, text);
        rule.append(&mut tree, node).expect("append");
    }

    let lc = rule.to_lc(&tree).expect("convert");
    assert!(lc.is_a(LcAttribute::Given));
    assert!(lc.is_a(LcAttribute::Rule));
    assert_eq!(lc.children().len(), 2);
    assert!(lc.children().iter().all(|child| child.is_a(LcAttribute::Given)));
}

#[test]
fn rule_with_one_environment_child_marks_that_child_given() {
    let mut tree = DocumentTree::new();
    let root = tree.root();
    let rule = Shell::create(&mut tree, ShellType::Rule).expect("rule");
    attach(&mut tree, root, rule.node());
    let inner = Shell::create(&mut tree, ShellType::Environment).expect("environment");
    rule.append(&mut tree, inner.node()).expect("append environment");
    for text in ["P", "Q"] {
        let node = expression(&mut tree, text);
        inner.append(&mut tree, node).expect("append");
    }

    let lc = rule.to_lc(&tree).expect("convert");
    assert!(lc.is_a(LcAttribute::Given));
    assert!(lc.is_a(LcAttribute::Rule));
    assert_eq!(lc.children().len(), 1);

    let child = &lc.children()[0];
    assert!(matches!(child, LogicConcept::Environment(_)));
    assert!(child.is_a(LcAttribute::Given));
    assert!(!child.is_a(LcAttribute::Rule));
    assert_eq!(child.children().len(), 2);
    assert!(child.children().iter().all(|lc| !lc.is_a(LcAttribute::Given)));
}

#[test]
fn accessibles_never_include_atoms_after_a_nested_target() {
    let mut tree = DocumentTree::new();
    let root = tree.root();
    let a = expression(&mut tree, "A");
    attach(&mut tree, root, a);
    let proof = Shell::create(&mut tree, ShellType::Proof).expect("proof");
    attach(&mut tree, root, proof.node());
    let step = expression(&mut tree, "B");
    proof.append(&mut tree, step).expect("append");
    let later = expression(&mut tree, "C");
    attach(&mut tree, root, later);

    let body = proof.body(&mut tree).expect("body");
    let accessible = Shell::accessibles(&tree, body, None);
    assert_eq!(
        accessible,
        vec![
            AccessibleNode::Document(a),
            AccessibleNode::Document(proof.node())
        ]
    );
}

#[test]
fn document_converts_top_level_atoms_in_order() {
    let mut tree = DocumentTree::new();
    let root = tree.root();
    let premise = Shell::create(&mut tree, ShellType::Premise).expect("premise");
    attach(&mut tree, root, premise.node());
    let fact = expression(&mut tree, "P");
    premise.append(&mut tree, fact).expect("append");
    let theorem = Shell::create(&mut tree, ShellType::Theorem).expect("theorem");
    attach(&mut tree, root, theorem.node());
    let claim = expression(&mut tree, "Q");
    theorem.append(&mut tree, claim).expect("append");
    let untyped = Atom::create(&mut tree, "comment", false).expect("comment");
    attach(&mut tree, root, untyped.node());

    let lcs = document_to_lcs(&tree).expect("convert");
    assert_eq!(lcs.len(), 2);
    assert!(lcs[0].is_a(LcAttribute::Given));
    assert!(!lcs[0].children()[0].is_a(LcAttribute::Given));
    assert!(lcs[1].is_a(LcAttribute::Theorem));
    assert!(matches!(
        &lcs[1].children()[0],
        LogicConcept::Expression(expr) if expr.text == "Q"
    ));
}
