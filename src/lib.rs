//! ipspan
//!
//! Count distinct IPv4 addresses in huge newline-delimited files.
//!
//! `ipspan` answers one question about an address log of any size: how many
//! different addresses does it contain? It is built for multi-GB inputs:
//!
//! - the file is read through memory-mapped, overlapping windows
//! - windows are parsed in parallel by a hand-rolled byte automaton
//! - addresses land in an exact 2^32-bit presence bitmap (512 MiB)
//!
//! The crate intentionally:
//! - does NOT parse IPv6 or anything but `a.b.c.d\n` lines
//! - does NOT report malformed lines (they are skipped)
//! - does NOT persist state between runs
//!
//! It only does one thing: **File in → unique count out**
//!
//! # Example
//!
//! ```no_run
//! use ipspan::{CancelToken, CountConfig, Counter};
//!
//! fn main() -> Result<(), ipspan::CountError> {
//!     let counter = Counter::new(CountConfig::default());
//!     let result = counter.count_path("ips.txt", &CancelToken::new())?;
//!
//!     println!("{} unique addresses", result.unique_count());
//!     for err in result.errors() {
//!         eprintln!("{}", err);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Cancellation
//!
//! Every run observes a [`CancelToken`]. Raising it (from a signal handler,
//! another thread, or a failing worker) stops the run promptly; the count of
//! what was parsed so far is still returned.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bitmap;
mod cancel;
mod config;
mod counter;
mod error;
mod parse;
mod window;

//
// Public surface
//

pub use bitmap::PresenceBitmap;
pub use cancel::CancelToken;
pub use config::{
    CountConfig, DEFAULT_ADDRESS_BATCH, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, MAX_LINE_LEN,
    default_workers,
};
pub use counter::{Counter, RunResult};
pub use error::CountError;
pub use parse::{LineParser, parse_window};
pub use window::{ChunkDescriptor, ChunkLayout, Window, WindowMapper, WindowSource};
