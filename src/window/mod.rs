//! Bounded, overlapping read-only views over the input.
//!
//! - [`ChunkLayout`] / [`ChunkDescriptor`] - Chunk index to byte range math
//! - [`WindowSource`] - Anything that can hand out a byte range as a [`Window`]
//! - [`WindowMapper`] - Per-worker mapper holding at most one live window

mod layout;
mod mapper;
mod source;

pub use layout::{ChunkDescriptor, ChunkLayout};
pub use mapper::WindowMapper;
pub use source::{Window, WindowSource};
