//! Binary search tree engine.
//!
//! Snapshots are value types: applying a command clones the previous
//! snapshot and edits the clone, so past steps can never be disturbed by
//! later ones. Nodes live in an id-keyed arena; ids are allocated
//! sequentially within one snapshot chain and never reused, which keeps
//! replays bit-identical and highlight paths unambiguous.

#[cfg(test)]
#[path = "bst_test.rs"]
mod bst_test;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{Applied, OperationError, Outcome, StructureEngine};
use crate::frame::{NodeId, ShapeNode, TreeShape};
use crate::protocol::{Command, CommandKind};

/// One node of a BST snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BstNode {
    /// Snapshot-chain-unique id.
    pub id: NodeId,
    /// The node's key. For every node: left subtree keys < key < right
    /// subtree keys.
    pub key: i64,
    /// Left child, if any.
    pub left: Option<NodeId>,
    /// Right child, if any.
    pub right: Option<NodeId>,
}

/// Full BST state at one animation step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BstSnapshot {
    root: Option<NodeId>,
    nodes: BTreeMap<NodeId, BstNode>,
    next_id: NodeId,
}

/// Named visitation orders for `traverse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Left, node, right — yields keys in ascending order.
    InOrder,
    /// Node, left, right.
    PreOrder,
    /// Left, right, node.
    PostOrder,
}

impl TraversalOrder {
    fn from_wire(name: &str) -> Option<Self> {
        match name {
            "inorder" => Some(Self::InOrder),
            "preorder" => Some(Self::PreOrder),
            "postorder" => Some(Self::PostOrder),
            _ => None,
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InOrder => "inorder",
            Self::PreOrder => "preorder",
            Self::PostOrder => "postorder",
        })
    }
}

impl BstSnapshot {
    /// The root node id, if the tree is non-empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look a node up by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&BstNode> {
        self.nodes.get(&id)
    }

    /// All keys in ascending order.
    #[must_use]
    pub fn in_order_keys(&self) -> Vec<i64> {
        self.visit(TraversalOrder::InOrder)
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|n| n.key))
            .collect()
    }

    /// Walk from the root comparing against `key`. Returns the comparison
    /// path (every node visited, in order) and the matching node if found.
    fn locate(&self, key: i64) -> (Vec<NodeId>, Option<NodeId>) {
        let mut path = Vec::new();
        let mut cursor = self.root;
        while let Some(id) = cursor {
            path.push(id);
            let Some(node) = self.nodes.get(&id) else {
                break;
            };
            cursor = match key.cmp(&node.key) {
                std::cmp::Ordering::Equal => return (path, Some(id)),
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
            };
        }
        (path, None)
    }

    fn insert(&self, key: i64) -> Outcome<Self> {
        let (path, existing) = self.locate(key);

        // Duplicate keys are a documented no-op, not an error.
        if existing.is_some() {
            return Outcome::Noop;
        }

        let mut next = self.clone();
        let id = next.next_id;
        next.next_id += 1;
        next.nodes.insert(id, BstNode { id, key, left: None, right: None });

        match path.last() {
            None => next.root = Some(id),
            Some(&parent_id) => {
                if let Some(parent) = next.nodes.get_mut(&parent_id) {
                    if key < parent.key {
                        parent.left = Some(id);
                    } else {
                        parent.right = Some(id);
                    }
                }
            }
        }

        let mut highlight = path;
        highlight.push(id);
        Outcome::Step(Applied { snapshot: next, highlight, description: format!("insert {key}") })
    }

    fn delete(&self, key: i64) -> Outcome<Self> {
        let (path, found) = self.locate(key);
        let Some(target) = found else {
            // Absent keys are a no-op, same policy as duplicate inserts.
            return Outcome::Noop;
        };

        let mut next = self.clone();
        let parent = if path.len() >= 2 { Some(path[path.len() - 2]) } else { None };
        let (left, right) = match next.nodes.get(&target) {
            Some(node) => (node.left, node.right),
            None => (None, None),
        };

        match (left, right) {
            // Leaf: detach from the parent.
            (None, None) => {
                next.relink(parent, target, None);
                next.nodes.remove(&target);
            }
            // One child: splice it into the target's place.
            (Some(child), None) | (None, Some(child)) => {
                next.relink(parent, target, Some(child));
                next.nodes.remove(&target);
            }
            // Two children: promote the in-order successor's key and remove
            // the successor node from its original location.
            (Some(_), Some(right_child)) => {
                let mut successor = right_child;
                let mut successor_parent = target;
                while let Some(left_id) = next.nodes.get(&successor).and_then(|n| n.left) {
                    successor_parent = successor;
                    successor = left_id;
                }
                let (successor_key, successor_right) = match next.nodes.get(&successor) {
                    Some(node) => (node.key, node.right),
                    None => (key, None),
                };

                if successor_parent == target {
                    if let Some(node) = next.nodes.get_mut(&target) {
                        node.right = successor_right;
                    }
                } else if let Some(node) = next.nodes.get_mut(&successor_parent) {
                    node.left = successor_right;
                }

                if let Some(node) = next.nodes.get_mut(&target) {
                    node.key = successor_key;
                }
                next.nodes.remove(&successor);
            }
        }

        Outcome::Step(Applied { snapshot: next, highlight: path, description: format!("delete {key}") })
    }

    fn search(&self, key: i64) -> Outcome<Self> {
        let (path, found) = self.locate(key);
        let verdict = if found.is_some() { "found" } else { "not found" };
        Outcome::Step(Applied {
            snapshot: self.clone(),
            highlight: path,
            description: format!("search {key} ({verdict})"),
        })
    }

    fn traverse(&self, order: TraversalOrder) -> Outcome<Self> {
        Outcome::Step(Applied {
            snapshot: self.clone(),
            highlight: self.visit(order),
            description: format!("traverse {order}"),
        })
    }

    /// Replace the child link pointing at `from` with `to`. A `None` parent
    /// means `from` is the root.
    fn relink(&mut self, parent: Option<NodeId>, from: NodeId, to: Option<NodeId>) {
        match parent {
            None => self.root = to,
            Some(parent_id) => {
                if let Some(node) = self.nodes.get_mut(&parent_id) {
                    if node.left == Some(from) {
                        node.left = to;
                    } else if node.right == Some(from) {
                        node.right = to;
                    }
                }
            }
        }
    }

    fn visit(&self, order: TraversalOrder) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.visit_from(self.root, order, &mut out);
        out
    }

    fn visit_from(&self, cursor: Option<NodeId>, order: TraversalOrder, out: &mut Vec<NodeId>) {
        let Some(id) = cursor else {
            return;
        };
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        match order {
            TraversalOrder::InOrder => {
                self.visit_from(node.left, order, out);
                out.push(id);
                self.visit_from(node.right, order, out);
            }
            TraversalOrder::PreOrder => {
                out.push(id);
                self.visit_from(node.left, order, out);
                self.visit_from(node.right, order, out);
            }
            TraversalOrder::PostOrder => {
                self.visit_from(node.left, order, out);
                self.visit_from(node.right, order, out);
                out.push(id);
            }
        }
    }
}

/// The BST variant of [`StructureEngine`]. Stateless; all state lives in
/// the snapshots it produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct BstEngine;

impl StructureEngine for BstEngine {
    type Snapshot = BstSnapshot;

    fn initial(&self) -> BstSnapshot {
        BstSnapshot::default()
    }

    fn apply(
        &self,
        snapshot: &BstSnapshot,
        command: &Command,
    ) -> Result<Outcome<BstSnapshot>, OperationError> {
        match command.kind {
            CommandKind::Insert => Ok(snapshot.insert(key_operand(command)?)),
            CommandKind::Delete => Ok(snapshot.delete(key_operand(command)?)),
            CommandKind::Search => Ok(snapshot.search(key_operand(command)?)),
            CommandKind::Traverse => Ok(snapshot.traverse(order_operand(command)?)),
        }
    }

    fn shape(&self, snapshot: &BstSnapshot) -> TreeShape {
        TreeShape {
            root: snapshot.root,
            nodes: snapshot
                .nodes
                .values()
                .map(|node| ShapeNode {
                    id: node.id,
                    label: node.key.to_string(),
                    left: node.left,
                    right: node.right,
                })
                .collect(),
        }
    }
}

/// Extract the single integer key the keyed operations take.
fn key_operand(command: &Command) -> Result<i64, OperationError> {
    let [operand] = command.operands.as_slice() else {
        return Err(OperationError::WrongArity {
            kind: command.kind,
            expected: 1,
            got: command.operands.len(),
        });
    };
    operand
        .as_key()
        .ok_or(OperationError::NonIntegerKey { kind: command.kind })
}

/// Extract the traversal order; a bare `traverse` defaults to in-order.
fn order_operand(command: &Command) -> Result<TraversalOrder, OperationError> {
    match command.operands.as_slice() {
        [] => Ok(TraversalOrder::InOrder),
        [operand] => {
            let name = operand
                .as_text()
                .ok_or_else(|| OperationError::UnknownTraversalOrder(operand.to_string()))?;
            TraversalOrder::from_wire(name)
                .ok_or_else(|| OperationError::UnknownTraversalOrder(name.to_owned()))
        }
        more => Err(OperationError::WrongArity {
            kind: command.kind,
            expected: 1,
            got: more.len(),
        }),
    }
}
