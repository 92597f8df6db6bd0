//! Instrumentation protocol: extraction and command parsing.
//!
//! Instrumented exercise programs interleave protocol lines with ordinary
//! stdout. A line is protocol data iff it starts with the fixed
//! [`INSTRUMENTATION_TOKEN`]; the rest of the line carries a `/`-separated
//! JSON payload describing one structural operation.

pub mod command;
pub mod extract;

pub use command::{Command, CommandKind, CommandStream, Operand, ParseError, parse, parse_all};
pub use extract::{INSTRUMENTATION_TOKEN, RawLine, display_output, extract};
