//! Grid construction, cell access and neighbourhood enumeration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cell::{tree, Cell, CellSnapshot, Position, LEAF_COLOUR, NEWBORN_COLOUR, WOOD_COLOUR};
use crate::config::GridConfig;
use crate::error::{ConfigError, InvalidRuleError};
use crate::rules::{Neighborhood, RuleParams};

/// Which transition every cell of a grid runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Mode {
    /// Threshold rule driven by [`RuleParams`].
    GeneralizedRule,
    /// Stochastic tree generator.
    TreeGrowth,
}

impl TryFrom<u8> for Mode {
    type Error = ConfigError;

    fn try_from(flag: u8) -> Result<Self, Self::Error> {
        match flag {
            0 => Ok(Mode::GeneralizedRule),
            1 => Ok(Mode::TreeGrowth),
            other => Err(ConfigError::UnknownMode(other)),
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> u8 {
        match mode {
            Mode::GeneralizedRule => 0,
            Mode::TreeGrowth => 1,
        }
    }
}

impl Mode {
    /// Colours for every state this mode can produce.
    fn palette(self) -> &'static [(u8, u32)] {
        match self {
            Mode::GeneralizedRule => &[(0, 0), (1, NEWBORN_COLOUR)],
            Mode::TreeGrowth => &[
                (tree::EMPTY, 0),
                (tree::TRUNK, WOOD_COLOUR),
                (tree::BRANCH, WOOD_COLOUR),
                (tree::TRUNK_TOP, WOOD_COLOUR),
                (tree::LEAF_X, LEAF_COLOUR),
                (tree::LEAF_X_STOP, LEAF_COLOUR),
                (tree::LEAF_X_DROOP, LEAF_COLOUR),
                (tree::LEAF_Z, LEAF_COLOUR),
                (tree::LEAF_Z_STOP, LEAF_COLOUR),
                (tree::LEAF_Z_DROOP, LEAF_COLOUR),
                (tree::CANOPY_TOP, LEAF_COLOUR),
                (tree::CANOPY_FILL, LEAF_COLOUR),
            ],
        }
    }
}

/// A cubic lattice of cells plus the rule configuration that advances it.
pub struct Grid {
    pub(crate) dimension: usize,
    /// Current generation, x-major: index = (x * N + y) * N + z.
    pub(crate) cells: Vec<Cell>,
    pub(crate) colours: BTreeMap<u8, u32>,
    pub(crate) mode: Mode,
    pub(crate) rules: RuleParams,
    pub(crate) config: GridConfig,
    pub(crate) workers: usize,
    /// Completed updates.
    pub(crate) steps: u64,
    pub(crate) thread_pool: rayon::ThreadPool,
}

/// Read-only view of one generation.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    pub cells: &'a [Cell],
    pub dimension: usize,
}

impl<'a> Snapshot<'a> {
    /// Unchecked lookup; callers keep coordinates below `dimension`.
    #[inline]
    pub(crate) fn cell(&self, x: usize, y: usize, z: usize) -> &'a Cell {
        &self.cells[index_of(self.dimension, x, y, z)]
    }

    /// Cells of the radius cube around `(x, y, z)`, clipped to the grid,
    /// centre excluded. Von Neumann additionally requires Manhattan
    /// distance <= `radius`.
    pub fn neighbours(
        &self,
        x: usize,
        y: usize,
        z: usize,
        radius: usize,
        kind: Neighborhood,
    ) -> Vec<&'a Cell> {
        let n = self.dimension;
        let span = |c: usize| {
            c.saturating_sub(radius)..c.saturating_add(radius).saturating_add(1).min(n)
        };

        let mut out = Vec::new();
        for i in span(x) {
            for j in span(y) {
                for k in span(z) {
                    if (i, j, k) == (x, y, z) {
                        continue;
                    }
                    if kind == Neighborhood::VonNeumann
                        && i.abs_diff(x) + j.abs_diff(y) + k.abs_diff(z) > radius
                    {
                        continue;
                    }
                    out.push(self.cell(i, j, k));
                }
            }
        }
        out
    }
}

/// Linear index of `(x, y, z)` in an x-major cube of side `dimension`.
#[inline]
pub fn index_of(dimension: usize, x: usize, y: usize, z: usize) -> usize {
    (x * dimension + y) * dimension + z
}

fn build_thread_pool(workers: usize) -> Result<rayon::ThreadPool, ConfigError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("lattice-worker-{i}"))
        .build()
        .map_err(|e| ConfigError::ThreadPool(e.to_string()))
}

impl Grid {
    /// Build a grid from `dimension³` states in x, y, z row-major order.
    ///
    /// Every state present must have a colour in `colours`; state 0 and the
    /// states reachable by `mode` get a default colour when missing.
    pub fn new(
        dimension: usize,
        states: Vec<u8>,
        mut colours: BTreeMap<u8, u32>,
        mode: Mode,
        config: GridConfig,
    ) -> Result<Self, ConfigError> {
        if dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        let side = i32::try_from(dimension).map_err(|_| ConfigError::TooLarge(dimension))?;
        let expected = dimension
            .checked_pow(3)
            .ok_or(ConfigError::TooLarge(dimension))?;
        if states.len() != expected {
            return Err(ConfigError::StateCount {
                expected,
                got: states.len(),
            });
        }

        colours.entry(0).or_insert(0);
        if let Some(&missing) = states.iter().find(|&s| !colours.contains_key(s)) {
            return Err(ConfigError::UnmappedState(missing));
        }
        for &(state, colour) in mode.palette() {
            colours.entry(state).or_insert(colour);
        }

        let mut cells = Vec::with_capacity(expected);
        let mut states = states.into_iter();
        for x in 0..side {
            for y in 0..side {
                for z in 0..side {
                    // Length checked above.
                    let state = states.next().unwrap_or_default();
                    cells.push(Cell::new(state, colours[&state], Position::new(x, y, z)));
                }
            }
        }

        let workers = config.effective_workers(dimension);
        let thread_pool = build_thread_pool(workers)?;

        tracing::info!(dimension, ?mode, workers, "grid created");

        Ok(Grid {
            dimension,
            cells,
            colours,
            mode,
            rules: RuleParams::default(),
            config,
            workers,
            steps: 0,
            thread_pool,
        })
    }

    /// Build a grid from states nested as `[x][y][z]`.
    pub fn from_nested(
        dimension: usize,
        states: &[Vec<Vec<u8>>],
        colours: BTreeMap<u8, u32>,
        mode: Mode,
        config: GridConfig,
    ) -> Result<Self, ConfigError> {
        let shape = |axis, index, got| ConfigError::Shape {
            axis,
            index,
            expected: dimension,
            got,
        };

        if states.len() != dimension {
            return Err(shape('x', 0, states.len()));
        }
        let mut flat = Vec::with_capacity(dimension.saturating_pow(3));
        for (x, plane) in states.iter().enumerate() {
            if plane.len() != dimension {
                return Err(shape('y', x, plane.len()));
            }
            for (y, row) in plane.iter().enumerate() {
                if row.len() != dimension {
                    return Err(shape('z', y, row.len()));
                }
                flat.extend_from_slice(row);
            }
        }
        Grid::new(dimension, flat, colours, mode, config)
    }

    /// Threshold-rule grid with cells alive where `x + y + z` is even.
    pub fn checkerboard(dimension: usize, config: GridConfig) -> Result<Self, ConfigError> {
        let n = dimension;
        let count = n.checked_pow(3).ok_or(ConfigError::TooLarge(n))?;
        let states = (0..count)
            .map(|i| u8::from((i / (n * n) + i / n % n + i % n) % 2 == 0))
            .collect();
        Grid::new(
            dimension,
            states,
            BTreeMap::from([(0, 0), (1, NEWBORN_COLOUR)]),
            Mode::GeneralizedRule,
            config,
        )
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn rules(&self) -> &RuleParams {
        &self.rules
    }

    pub fn colours(&self) -> &BTreeMap<u8, u32> {
        &self.colours
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of parallel slabs per update.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of completed updates.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn view(&self) -> Snapshot<'_> {
        Snapshot {
            cells: &self.cells,
            dimension: self.dimension,
        }
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.dimension && y < self.dimension && z < self.dimension
    }

    pub fn cell(&self, x: usize, y: usize, z: usize) -> Option<&Cell> {
        if self.in_bounds(x, y, z) {
            Some(self.view().cell(x, y, z))
        } else {
            None
        }
    }

    /// Current states in x, y, z row-major order.
    pub fn states(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.state).collect()
    }

    /// Number of cells in `state`.
    pub fn population(&self, state: u8) -> usize {
        self.cells.iter().filter(|c| c.state == state).count()
    }

    pub fn get_neighbours(
        &self,
        x: usize,
        y: usize,
        z: usize,
        radius: usize,
        kind: Neighborhood,
    ) -> Vec<&Cell> {
        self.view().neighbours(x, y, z, radius, kind)
    }

    /// `{state, colour}` pairs nested as `[x][y][z]`.
    pub fn snapshot(&self) -> Vec<Vec<Vec<CellSnapshot>>> {
        let n = self.dimension;
        self.cells
            .chunks(n * n)
            .map(|plane| {
                plane
                    .chunks(n)
                    .map(|row| row.iter().map(Cell::snapshot).collect())
                    .collect()
            })
            .collect()
    }

    /// Replace the rule parameters from the `"a,b/c/T"` encoding.
    /// Takes effect from the next update.
    pub fn edit_rules(&mut self, encoded: &str) -> Result<(), InvalidRuleError> {
        match encoded.parse::<RuleParams>() {
            Ok(rules) => {
                self.set_rules(rules);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(encoded, error = %e, "rule edit rejected");
                Err(e)
            }
        }
    }

    pub fn set_rules(&mut self, rules: RuleParams) {
        tracing::debug!(rules = %rules, "rules replaced");
        self.rules = rules;
    }
}
