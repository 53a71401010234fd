//! Blockfall (workspace facade crate).
//!
//! Re-exports the member crates under `blockfall::{core,input,types}` and
//! carries the pieces only the terminal binary needs: configuration loading
//! and frame composition.

pub mod config;
pub mod frame;

pub use blockfall_core as core;
pub use blockfall_input as input;
pub use blockfall_types as types;
