//! Public entry point: dispatch a raw command stream to a structure engine.
//!
//! `draw("BST").with(raw_output)` is the whole pipeline: extract protocol
//! lines, parse them, replay against the named engine, and return ordered
//! frames. An unknown structure name is a documented no-op — callers treat
//! "no animation support for this kind" the same as "no commands found".

#[cfg(test)]
#[path = "drawer_test.rs"]
mod drawer_test;

use tracing::debug;

use crate::engine::{self, Animate};
use crate::frame::FrameSequence;
use crate::protocol;

/// A pipeline bound to one structure kind. Created by [`draw`].
pub struct Drawer {
    engine: Option<&'static dyn Animate>,
}

/// Bind the pipeline to a structure kind by name (e.g. `"BST"`).
///
/// Resolution happens here; an unregistered name yields a [`Drawer`] whose
/// [`with`](Drawer::with) always returns an empty sequence.
#[must_use]
pub fn draw(structure: &str) -> Drawer {
    let engine = engine::resolve(structure);
    if engine.is_none() {
        debug!(structure, "no engine registered; animation unavailable");
    }
    Drawer { engine }
}

impl Drawer {
    /// Run the pipeline over raw program output.
    ///
    /// All per-line and per-command failures are absorbed into the returned
    /// sequence's diagnostics; this never fails and never panics on
    /// malformed input.
    #[must_use]
    pub fn with(&self, raw_output: &str) -> FrameSequence {
        let Some(engine) = self.engine else {
            return FrameSequence::default();
        };

        let lines = protocol::extract(raw_output);
        let stream = protocol::parse_all(&lines);
        debug!(lines = lines.len(), commands = stream.commands().count(), "instrumentation extracted");

        engine.animate(&stream)
    }
}
