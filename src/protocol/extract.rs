//! Instrumentation-line extraction from raw program output.
//!
//! The execution collaborator returns the learner program's stdout as one
//! opaque string. Protocol lines are tagged with a fixed UID prefix so they
//! can be fished out of arbitrary print noise; everything else belongs to
//! the terminal, not the animation.

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;

/// Fixed marker identifying protocol-bearing lines in program output.
///
/// The instrumented exercise runtimes print this exact UID at the start of
/// every protocol line. It is part of the wire contract with the execution
/// collaborator and must not change.
pub const INSTRUMENTATION_TOKEN: &str = "35a7bfa2-e0aa-11ed-b5ea-0242ac120002";

/// One line of output confirmed to carry the instrumentation token, with
/// the token already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine(pub String);

impl RawLine {
    /// The token-stripped line content.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Scan raw program output and yield every protocol line in order.
///
/// A line qualifies iff it begins with [`INSTRUMENTATION_TOKEN`]; the token
/// is stripped from the yielded remainder. All other lines are ordinary
/// program output and are dropped. Empty input yields an empty vector.
#[must_use]
pub fn extract(raw: &str) -> Vec<RawLine> {
    raw.lines()
        .filter_map(|line| line.strip_prefix(INSTRUMENTATION_TOKEN))
        .map(|rest| RawLine(rest.to_owned()))
        .collect()
}

/// Return the raw output with protocol lines removed, for terminal display.
///
/// Non-protocol lines are preserved verbatim, in order. The result is what
/// the learner should see: their own prints, without the instrumentation
/// chatter.
#[must_use]
pub fn display_output(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.starts_with(INSTRUMENTATION_TOKEN))
        .collect::<Vec<_>>()
        .join("\n")
}
