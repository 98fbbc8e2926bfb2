//! Grid state, neighbourhoods and parallel stepping.
//!
//! `grid` owns construction and reads, `stepping` advances a generation,
//! and `record` defines the flat form used to persist a grid.

pub mod grid;
pub mod record;
pub mod stepping;

pub use grid::{index_of, Grid, Mode, Snapshot};
pub use record::{parse_colour, GridRecord};
pub use stepping::{partition_axis, reassemble, Slab};
