use super::*;
use crate::protocol::Operand;

fn keyed(kind: CommandKind, key: i64) -> Command {
    Command { kind, operands: vec![Operand::Int(key)] }
}

fn traverse(order: &str) -> Command {
    Command { kind: CommandKind::Traverse, operands: vec![Operand::Text(order.to_owned())] }
}

/// Apply one command expecting it to produce an animation step.
fn step(snapshot: &BstSnapshot, command: &Command) -> Applied<BstSnapshot> {
    match BstEngine.apply(snapshot, command).expect("apply") {
        Outcome::Step(applied) => applied,
        Outcome::Noop => panic!("expected a step for {command}"),
    }
}

/// Apply a sequence of commands from the empty tree.
fn grown(commands: &[Command]) -> BstSnapshot {
    let engine = BstEngine;
    let mut snapshot = engine.initial();
    for command in commands {
        if let Outcome::Step(applied) = engine.apply(&snapshot, command).expect("apply") {
            snapshot = applied.snapshot;
        }
    }
    snapshot
}

fn inserts(keys: &[i64]) -> Vec<Command> {
    keys.iter().map(|&k| keyed(CommandKind::Insert, k)).collect()
}

// =============================================================
// Insert
// =============================================================

#[test]
fn insert_builds_ordered_tree() {
    let snapshot = grown(&inserts(&[5, 3, 8]));

    let root = snapshot.root().expect("root");
    let root_node = snapshot.node(root).expect("root node");
    assert_eq!(root_node.key, 5);

    let left = snapshot.node(root_node.left.expect("left")).expect("left node");
    let right = snapshot.node(root_node.right.expect("right")).expect("right node");
    assert_eq!(left.key, 3);
    assert_eq!(right.key, 8);
    assert_eq!(snapshot.in_order_keys(), vec![3, 5, 8]);
}

#[test]
fn insert_into_empty_sets_root() {
    let applied = step(&BstEngine.initial(), &keyed(CommandKind::Insert, 7));
    assert_eq!(applied.snapshot.len(), 1);
    assert_eq!(applied.snapshot.in_order_keys(), vec![7]);
    assert_eq!(applied.highlight.len(), 1);
    assert_eq!(applied.description, "insert 7");
}

#[test]
fn insert_duplicate_is_a_noop() {
    let before = grown(&inserts(&[5, 3]));
    let outcome = BstEngine.apply(&before, &keyed(CommandKind::Insert, 3)).expect("apply");
    assert_eq!(outcome, Outcome::Noop);
    // The previous snapshot is untouched.
    assert_eq!(before.in_order_keys(), vec![3, 5]);
}

#[test]
fn insert_highlight_is_root_to_new_node() {
    let before = grown(&inserts(&[5, 3]));
    let applied = step(&before, &keyed(CommandKind::Insert, 8));

    let root = applied.snapshot.root().expect("root");
    let new_id = applied.snapshot.node(root).and_then(|n| n.right).expect("new node");
    assert_eq!(applied.highlight, vec![root, new_id]);
}

#[test]
fn insert_accepts_integral_float_keys() {
    let command = Command { kind: CommandKind::Insert, operands: vec![Operand::Float(4.0)] };
    let applied = step(&BstEngine.initial(), &command);
    assert_eq!(applied.snapshot.in_order_keys(), vec![4]);
}

// =============================================================
// Delete
// =============================================================

#[test]
fn delete_leaf() {
    let before = grown(&inserts(&[5, 3, 8]));
    let applied = step(&before, &keyed(CommandKind::Delete, 3));
    assert_eq!(applied.snapshot.in_order_keys(), vec![5, 8]);
    assert_eq!(applied.description, "delete 3");
}

#[test]
fn delete_node_with_one_child_splices() {
    let before = grown(&inserts(&[5, 3, 2]));
    let applied = step(&before, &keyed(CommandKind::Delete, 3));

    assert_eq!(applied.snapshot.in_order_keys(), vec![2, 5]);
    let root = applied.snapshot.root().expect("root");
    let root_node = applied.snapshot.node(root).expect("root node");
    let left = applied.snapshot.node(root_node.left.expect("left")).expect("left node");
    assert_eq!(left.key, 2);
}

#[test]
fn delete_root_with_two_children_promotes_successor() {
    let before = grown(&inserts(&[5, 3, 8]));
    let applied = step(&before, &keyed(CommandKind::Delete, 5));

    let root = applied.snapshot.root().expect("root");
    let root_node = applied.snapshot.node(root).expect("root node");
    assert_eq!(root_node.key, 8);
    assert!(root_node.right.is_none());
    let left = applied.snapshot.node(root_node.left.expect("left")).expect("left node");
    assert_eq!(left.key, 3);
    assert_eq!(applied.snapshot.len(), 2);
}

#[test]
fn delete_with_deep_successor_relinks_successor_parent() {
    let before = grown(&inserts(&[5, 3, 8, 7, 9]));
    let applied = step(&before, &keyed(CommandKind::Delete, 5));

    assert_eq!(applied.snapshot.in_order_keys(), vec![3, 7, 8, 9]);
    let root = applied.snapshot.root().expect("root");
    let root_node = applied.snapshot.node(root).expect("root node");
    assert_eq!(root_node.key, 7);
    let right = applied.snapshot.node(root_node.right.expect("right")).expect("right node");
    assert_eq!(right.key, 8);
    assert!(right.left.is_none());
}

#[test]
fn delete_absent_key_is_a_noop() {
    let before = grown(&inserts(&[5, 3]));
    let outcome = BstEngine.apply(&before, &keyed(CommandKind::Delete, 42)).expect("apply");
    assert_eq!(outcome, Outcome::Noop);
}

#[test]
fn delete_last_node_empties_the_tree() {
    let before = grown(&inserts(&[5]));
    let applied = step(&before, &keyed(CommandKind::Delete, 5));
    assert!(applied.snapshot.is_empty());
    assert!(applied.snapshot.root().is_none());
}

// =============================================================
// Search and traverse
// =============================================================

#[test]
fn search_does_not_mutate_and_reports_outcome() {
    let before = grown(&inserts(&[5, 3, 8]));

    let found = step(&before, &keyed(CommandKind::Search, 8));
    assert_eq!(found.snapshot, before);
    assert_eq!(found.description, "search 8 (found)");
    assert_eq!(found.highlight.len(), 2); // 5 then 8

    let missing = step(&before, &keyed(CommandKind::Search, 4));
    assert_eq!(missing.snapshot, before);
    assert_eq!(missing.description, "search 4 (not found)");
    assert_eq!(missing.highlight.len(), 2); // 5 then 3
}

#[test]
fn traverse_orders_visit_expected_keys() {
    let snapshot = grown(&inserts(&[5, 3, 8]));
    let keys = |applied: &Applied<BstSnapshot>| -> Vec<i64> {
        applied
            .highlight
            .iter()
            .filter_map(|&id| applied.snapshot.node(id).map(|n| n.key))
            .collect()
    };

    let inorder = step(&snapshot, &traverse("inorder"));
    assert_eq!(keys(&inorder), vec![3, 5, 8]);
    assert_eq!(inorder.description, "traverse inorder");

    let preorder = step(&snapshot, &traverse("preorder"));
    assert_eq!(keys(&preorder), vec![5, 3, 8]);

    let postorder = step(&snapshot, &traverse("postorder"));
    assert_eq!(keys(&postorder), vec![3, 8, 5]);
}

#[test]
fn traverse_defaults_to_inorder() {
    let snapshot = grown(&inserts(&[2, 1, 3]));
    let command = Command { kind: CommandKind::Traverse, operands: vec![] };
    let applied = step(&snapshot, &command);
    assert_eq!(applied.description, "traverse inorder");
    assert_eq!(applied.highlight.len(), 3);
}

// =============================================================
// Operand validation
// =============================================================

#[test]
fn keyed_operations_reject_wrong_arity() {
    let engine = BstEngine;
    let snapshot = engine.initial();

    let none = Command { kind: CommandKind::Insert, operands: vec![] };
    assert_eq!(
        engine.apply(&snapshot, &none).unwrap_err(),
        OperationError::WrongArity { kind: CommandKind::Insert, expected: 1, got: 0 }
    );

    let two = Command {
        kind: CommandKind::Delete,
        operands: vec![Operand::Int(1), Operand::Int(2)],
    };
    assert_eq!(
        engine.apply(&snapshot, &two).unwrap_err(),
        OperationError::WrongArity { kind: CommandKind::Delete, expected: 1, got: 2 }
    );
}

#[test]
fn keyed_operations_reject_non_integer_keys() {
    let engine = BstEngine;
    let command = Command {
        kind: CommandKind::Search,
        operands: vec![Operand::Text("five".to_owned())],
    };
    assert_eq!(
        engine.apply(&engine.initial(), &command).unwrap_err(),
        OperationError::NonIntegerKey { kind: CommandKind::Search }
    );
}

#[test]
fn traverse_rejects_unknown_order() {
    let err = BstEngine.apply(&BstEngine.initial(), &traverse("sideways")).unwrap_err();
    assert_eq!(err, OperationError::UnknownTraversalOrder("sideways".to_owned()));
}

// =============================================================
// Determinism
// =============================================================

#[test]
fn replaying_the_same_commands_is_bit_identical() {
    let commands = inserts(&[50, 30, 70, 20, 40, 60, 80, 10]);
    let first = grown(&commands);
    let second = grown(&commands);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn shape_projects_every_live_node() {
    let engine = BstEngine;
    let snapshot = grown(&inserts(&[5, 3, 8]));
    let shape = engine.shape(&snapshot);

    assert_eq!(shape.root, snapshot.root());
    assert_eq!(shape.nodes.len(), 3);
    let labels: Vec<&str> = shape.nodes.iter().map(|n| n.label.as_str()).collect();
    assert!(labels.contains(&"5") && labels.contains(&"3") && labels.contains(&"8"));
}
