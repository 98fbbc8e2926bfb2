//! C FFI layer for host applications.
//!
//! Thin wrappers over [`crate::automaton::Grid`] that handle null checks and
//! C-to-Rust conversions. All functions use `extern "C"` with `#[no_mangle]`.

pub mod grid;
pub mod lifecycle;

pub use grid::{la_edit_rules, la_get_cell, la_get_colour, la_get_dimension, la_step};
pub use lifecycle::{la_create, la_destroy, la_get_step};
