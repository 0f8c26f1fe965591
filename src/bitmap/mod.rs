//! Exact membership over the full IPv4 address space.
//!
//! - [`PresenceBitmap`] - One bit per possible address, set-and-count

mod presence;

pub use presence::PresenceBitmap;
