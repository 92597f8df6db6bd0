//! Structure engines: per-kind replay of command streams into snapshots.
//!
//! An engine owns the semantics of one structure kind. It exposes the
//! canonical empty snapshot, a pure `apply` that derives the next snapshot
//! from the previous one, and a [`TreeShape`] projection for layout. The
//! replay fold threads snapshots through the valid commands of a stream,
//! absorbing per-step failures so one bad command never discards the rest
//! of the animation.

#[cfg(test)]
#[path = "mod_test.rs"]
mod engine_test;

pub mod bst;

use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::{debug, warn};

use crate::frame::{self, Diagnostic, FrameSequence, NodeId, TreeShape};
use crate::protocol::{Command, CommandKind, CommandStream};

pub use bst::{BstEngine, BstNode, BstSnapshot, TraversalOrder};

/// Why a parsed command could not be applied to the current snapshot.
/// Treated exactly like a parse failure downstream: the step is skipped and
/// replay continues from the last good snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// The command carries the wrong number of operands for its kind.
    #[error("`{kind}` expects {expected} operand(s), got {got}")]
    WrongArity {
        /// The offending operation.
        kind: CommandKind,
        /// How many operands the operation takes.
        expected: usize,
        /// How many the command carried.
        got: usize,
    },
    /// A key operand is not an integer.
    #[error("`{kind}` expects an integer key operand")]
    NonIntegerKey {
        /// The offending operation.
        kind: CommandKind,
    },
    /// A traverse order operand names no known order.
    #[error("unknown traversal order `{0}`")]
    UnknownTraversalOrder(String),
}

/// What a valid command did to the structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<S> {
    /// The command produced a new animation step.
    Step(Applied<S>),
    /// Documented no-op (duplicate insert, delete of an absent key): the
    /// structure is unchanged and no frame is emitted. Not a failure.
    Noop,
}

/// The result of applying one command: the next snapshot plus per-step
/// presentation data. Highlight paths live here rather than in the
/// snapshot, so read-only operations like `search` stay mutation-free.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<S> {
    /// The snapshot after the command.
    pub snapshot: S,
    /// Nodes touched by the operation, in visit order.
    pub highlight: Vec<NodeId>,
    /// Human-readable account of what happened.
    pub description: String,
}

/// Capability contract for one structure kind.
///
/// `apply` must be a pure function of `(snapshot, command)`: no hidden
/// state, so replaying the same stream from [`initial`](Self::initial)
/// always produces an identical snapshot chain.
pub trait StructureEngine {
    /// Full structural state at one animation step.
    type Snapshot: Clone + PartialEq;

    /// The canonical empty structure.
    fn initial(&self) -> Self::Snapshot;

    /// Derive the next snapshot from the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] when the command's operands do not fit
    /// the operation; the previous snapshot is left untouched.
    fn apply(
        &self,
        snapshot: &Self::Snapshot,
        command: &Command,
    ) -> Result<Outcome<Self::Snapshot>, OperationError>;

    /// Project a snapshot into the kind-agnostic layout view.
    fn shape(&self, snapshot: &Self::Snapshot) -> TreeShape;
}

/// Fold a command stream into frames with a concrete engine.
///
/// Parse failures and inapplicable commands become [`Diagnostic`]s in
/// stream order; every successfully applied command yields exactly one
/// frame, numbered by its position among the successes.
#[must_use]
pub fn replay<E: StructureEngine>(engine: &E, stream: &CommandStream) -> FrameSequence {
    let mut snapshot = engine.initial();
    let mut sequence = FrameSequence::default();

    for entry in stream.entries() {
        match entry {
            Err(err) => {
                warn!(reason = err.reason_code(), line = err.line(), "skipping unparseable instrumentation line");
                sequence.diagnostics.push(Diagnostic::Parse(err.clone()));
            }
            Ok(command) => match engine.apply(&snapshot, command) {
                Err(error) => {
                    warn!(command = %command, error = %error, "skipping inapplicable command");
                    sequence
                        .diagnostics
                        .push(Diagnostic::Operation { command: command.clone(), error });
                }
                Ok(Outcome::Noop) => {
                    debug!(command = %command, "no-op command; structure unchanged, no frame");
                }
                Ok(Outcome::Step(applied)) => {
                    let step = sequence.frames.len();
                    sequence.frames.push(frame::build(
                        &engine.shape(&applied.snapshot),
                        step,
                        &applied.description,
                        &applied.highlight,
                    ));
                    snapshot = applied.snapshot;
                }
            },
        }
    }

    sequence
}

/// Object-safe seam over [`StructureEngine`] so engines with different
/// snapshot types can share one registry.
pub(crate) trait Animate: Send + Sync {
    fn animate(&self, stream: &CommandStream) -> FrameSequence;
}

impl<E: StructureEngine + Send + Sync> Animate for E {
    fn animate(&self, stream: &CommandStream) -> FrameSequence {
        replay(self, stream)
    }
}

/// Structure-kind registry, read-only after startup and safe to share
/// across concurrent runs (no per-run state lives here).
static ENGINES: LazyLock<HashMap<&'static str, Box<dyn Animate>>> = LazyLock::new(|| {
    let mut engines: HashMap<&'static str, Box<dyn Animate>> = HashMap::new();
    engines.insert("BST", Box::new(BstEngine));
    engines
});

/// Look up the engine registered for a structure-kind name.
pub(crate) fn resolve(structure: &str) -> Option<&'static dyn Animate> {
    ENGINES.get(structure).map(|engine| &**engine)
}
