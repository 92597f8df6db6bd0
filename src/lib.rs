//! Animation core for data-structure exercises.
//!
//! A learner submits code, an external sandbox runs it, and the program's
//! stdout comes back as one opaque string. Instrumented runtimes hide a
//! line-oriented protocol inside that output; this crate extracts it,
//! parses it into structural commands, replays them against an in-memory
//! model, and synthesizes the deterministic frame sequence the renderer
//! animates. The crate performs no I/O and exposes no async surface: one
//! call, one owned [`frame::FrameSequence`].
//!
//! ```
//! use structboard::{INSTRUMENTATION_TOKEN, draw};
//!
//! let output = format!(
//!     "warming up\n{t}/{{\"kind\":\"insert\",\"operands\":[5]}}\n{t}/{{\"kind\":\"insert\",\"operands\":[3]}}\n",
//!     t = INSTRUMENTATION_TOKEN
//! );
//! let sequence = draw("BST").with(&output);
//! assert_eq!(sequence.len(), 2);
//! ```
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`protocol`] | Token extraction and command parsing |
//! | [`engine`] | Structure engines, replay fold, kind registry |
//! | [`frame`] | Deterministic layout and frame types |
//! | [`drawer`] | Public `draw(kind).with(text)` dispatch |

pub mod drawer;
pub mod engine;
pub mod frame;
pub mod protocol;

pub use drawer::{Drawer, draw};
pub use engine::{
    Applied, BstEngine, BstNode, BstSnapshot, OperationError, Outcome, StructureEngine,
    TraversalOrder, replay,
};
pub use frame::{
    Diagnostic, Edge, Frame, FrameSequence, Layout, NodeId, PlacedNode, ShapeNode, TreeShape,
};
pub use protocol::{
    Command, CommandKind, CommandStream, INSTRUMENTATION_TOKEN, Operand, ParseError, RawLine,
    display_output, extract, parse, parse_all,
};
