//! Go toolchain source handling.
//!
//! - `sources`: distribution archive download and extraction
//! - `patcher`: marker-based edits to the linker sources

pub mod patcher;
pub mod sources;
