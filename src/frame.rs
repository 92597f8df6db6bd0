//! Frame synthesis: deterministic layout of structural snapshots.
//!
//! Engines report each snapshot as a kind-agnostic [`TreeShape`]; this
//! module places every node on a 2D grid (in-order position → x, depth → y)
//! and packages the result with the step's highlight path and description.
//! Layout is a pure function of the shape: identical shapes always produce
//! identical coordinates, so replaying a run redraws pixel-identical frames.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use serde::Serialize;

use crate::engine::OperationError;
use crate::protocol::{Command, ParseError};

/// Unique identifier of a node within one snapshot chain.
pub type NodeId = u64;

// Layout constants (logical pixels; the renderer applies its own scale).
const NODE_SIZE: f64 = 40.0;
const H_GAP: f64 = 24.0;
const V_GAP: f64 = 56.0;
const MARGIN: f64 = 24.0;

/// Kind-agnostic node-graph view of a snapshot, produced by an engine for
/// layout. Every tree-shaped structure can express itself this way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeShape {
    /// The root node, if the structure is non-empty.
    pub root: Option<NodeId>,
    /// Every live node, in any order; ids are unique.
    pub nodes: Vec<ShapeNode>,
}

/// One node of a [`TreeShape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeNode {
    /// Snapshot-chain-unique id.
    pub id: NodeId,
    /// Render label (for a BST, the key).
    pub label: String,
    /// Left child, if any.
    pub left: Option<NodeId>,
    /// Right child, if any.
    pub right: Option<NodeId>,
}

/// A node placed at concrete coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    /// Snapshot-chain-unique id.
    pub id: NodeId,
    /// Render label.
    pub label: String,
    /// Left edge in logical pixels.
    pub x: f64,
    /// Top edge in logical pixels.
    pub y: f64,
    /// Distance from the root, root = 0.
    pub depth: usize,
}

/// A parent→child connector between two placed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Parent node id.
    pub from: NodeId,
    /// Child node id.
    pub to: NodeId,
}

/// Computed geometry for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Layout {
    /// Placed nodes in in-order sequence.
    pub nodes: Vec<PlacedNode>,
    /// Parent→child connectors.
    pub edges: Vec<Edge>,
    /// Nodes to highlight: the touched path for insert/delete/search, the
    /// full visitation order for traverse.
    pub highlight: Vec<NodeId>,
    /// Total drawing width in logical pixels.
    pub width: f64,
    /// Total drawing height in logical pixels.
    pub height: f64,
}

/// One renderable animation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// 0-based position in the sequence of successfully applied commands.
    pub step: usize,
    /// Human-readable account of the operation just applied.
    pub description: String,
    /// Node coordinates, connectors and highlight for this step.
    pub layout: Layout,
}

/// Why one step of a run was skipped. Retained in stream order so callers
/// can show what the animation left out.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A protocol line that never became a command.
    Parse(ParseError),
    /// A parsed command the engine could not apply.
    Operation {
        /// The command that was skipped.
        command: Command,
        /// Why the engine rejected it.
        error: OperationError,
    },
}

impl Diagnostic {
    /// One-line human-readable summary.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Parse(err) => err.to_string(),
            Self::Operation { command, error } => format!("`{command}` skipped: {error}"),
        }
    }
}

/// The complete output of one pipeline run: one frame per successfully
/// applied command, plus the steps that were skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameSequence {
    /// Ordered frames, `frames[i].step == i`.
    pub frames: Vec<Frame>,
    /// Skipped lines and commands, in stream order.
    pub diagnostics: Vec<Diagnostic>,
}

impl FrameSequence {
    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the run produced no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Build one frame from a snapshot shape.
///
/// Pure: no layout state survives between calls. Nodes are placed on a grid
/// where the x slot is the node's in-order position and the y slot is its
/// depth. Nodes unreachable from the root are not placed (an engine that
/// produces such a shape has broken its own invariant).
#[must_use]
pub fn build(shape: &TreeShape, step: usize, description: &str, highlight: &[NodeId]) -> Frame {
    let mut placed = Vec::with_capacity(shape.nodes.len());
    let mut edges = Vec::new();
    let mut next_slot = 0usize;
    let mut max_depth = 0usize;

    if let Some(root) = shape.root {
        place(shape, root, 0, &mut next_slot, &mut max_depth, &mut placed, &mut edges);
    }

    let layout = Layout {
        width: if placed.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let slots = next_slot as f64;
            2.0 * MARGIN + slots * NODE_SIZE + (slots - 1.0) * H_GAP
        },
        height: if placed.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let rows = (max_depth + 1) as f64;
            2.0 * MARGIN + rows * NODE_SIZE + (rows - 1.0) * V_GAP
        },
        nodes: placed,
        edges,
        highlight: highlight.to_vec(),
    };

    Frame { step, description: description.to_owned(), layout }
}

/// In-order placement: left subtree, this node, right subtree.
fn place(
    shape: &TreeShape,
    id: NodeId,
    depth: usize,
    next_slot: &mut usize,
    max_depth: &mut usize,
    placed: &mut Vec<PlacedNode>,
    edges: &mut Vec<Edge>,
) {
    let Some(node) = shape.nodes.iter().find(|n| n.id == id) else {
        return;
    };

    *max_depth = (*max_depth).max(depth);

    if let Some(left) = node.left {
        edges.push(Edge { from: id, to: left });
        place(shape, left, depth + 1, next_slot, max_depth, placed, edges);
    }

    #[allow(clippy::cast_precision_loss)]
    let slot = *next_slot as f64;
    #[allow(clippy::cast_precision_loss)]
    let row = depth as f64;
    placed.push(PlacedNode {
        id,
        label: node.label.clone(),
        x: MARGIN + slot * (NODE_SIZE + H_GAP),
        y: MARGIN + row * (NODE_SIZE + V_GAP),
        depth,
    });
    *next_slot += 1;

    if let Some(right) = node.right {
        edges.push(Edge { from: id, to: right });
        place(shape, right, depth + 1, next_slot, max_depth, placed, edges);
    }
}
