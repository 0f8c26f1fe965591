//! Dotted-quad parsing straight from raw window bytes.
//!
//! - [`LineParser`] - Byte-at-a-time automaton for one line at a time
//! - [`parse_window`] - Runs the automaton over a chunk window

mod line;

pub use line::{LineParser, parse_window};
