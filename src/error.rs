//! Error types for grid construction, rule edits and generation updates.

use thiserror::Error;

/// Errors raised while building a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Grid side length must be positive.
    #[error("grid dimension must be positive")]
    ZeroDimension,

    /// `dimension³` does not fit in memory indices.
    #[error("grid dimension {0} is too large")]
    TooLarge(usize),

    /// Initial state array does not hold exactly `dimension³` values.
    #[error("expected {expected} initial states, got {got}")]
    StateCount {
        /// `dimension³`.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// A nested plane or row has the wrong length.
    #[error("nested initial state has length {got} at {axis} index {index}, expected {expected}")]
    Shape {
        /// Axis name (`x`, `y` or `z`).
        axis: char,
        /// Offending index along the parent axis.
        index: usize,
        /// Expected length.
        expected: usize,
        /// Length found.
        got: usize,
    },

    /// A state id present in the initial array has no colour.
    #[error("state {0} has no colour map entry")]
    UnmappedState(u8),

    /// Mode flag is neither 0 nor 1.
    #[error("unknown automaton mode {0}")]
    UnknownMode(u8),

    /// Colour string is not a hexadecimal 24-bit value.
    #[error("invalid colour {0:?}")]
    InvalidColour(String),

    /// Worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Errors raised when parsing the `"a,b/c/T"` rule encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRuleError {
    /// Encoding must have exactly three slash-separated segments.
    #[error("expected 3 '/'-separated segments, got {0}")]
    SegmentCount(usize),

    /// A neighbour count is not a non-negative integer.
    #[error("invalid neighbour count {0:?}")]
    Count(String),

    /// Neighbourhood tag is not `M` or `N`.
    #[error("unknown neighbourhood tag {0:?}")]
    Neighborhood(String),
}

/// Errors raised while computing the next generation.
///
/// When any of these is returned the grid still holds the previous generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// A worker failed while computing its slab.
    #[error("worker for x in [{start_x}, {end_x}) failed: {reason}")]
    Worker {
        /// First x-plane of the slab.
        start_x: usize,
        /// One past the last x-plane of the slab.
        end_x: usize,
        /// Failure description.
        reason: String,
    },

    /// A slab came back with the wrong number of cells.
    #[error("slab starting at x={start_x} has {got} cells, expected {expected}")]
    SlabLength {
        /// First x-plane of the slab.
        start_x: usize,
        /// Expected cell count.
        expected: usize,
        /// Cell count returned.
        got: usize,
    },

    /// Slabs do not tile the x axis exactly.
    #[error("slabs do not cover x={0} exactly once")]
    Coverage(usize),

    /// A computed state has no colour map entry.
    #[error("state {state} at ({x}, {y}, {z}) has no colour map entry")]
    UnmappedState {
        /// The offending state id.
        state: u8,
        /// Cell x.
        x: i32,
        /// Cell y.
        y: i32,
        /// Cell z.
        z: i32,
    },
}
