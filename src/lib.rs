//! Lattice Automata - discrete-time automata on a cubic 3D lattice.
//!
//! Two automata are supported: a threshold rule generalising Conway's game
//! of life (configurable survival/birth counts, Moore or Von Neumann
//! neighbourhoods of any radius) and a stochastic tree-growth generator.
//! Generations are advanced in parallel from an immutable snapshot.
//!
//! A C ABI for host applications lives in `ffi`.

pub mod automaton;
pub mod cell;
pub mod config;
pub mod error;
pub mod ffi;
pub mod rules;


pub use automaton::{Grid, GridRecord, Mode};
pub use cell::{Cell, CellSnapshot, Position};
pub use config::GridConfig;
pub use error::{ConfigError, InvalidRuleError, UpdateError};
pub use rules::{Neighborhood, RuleParams};
