//! Parallel generation advance.
//!
//! The current generation is frozen for the whole update. The x axis is cut
//! into contiguous slabs, one per worker; each worker reads only the frozen
//! snapshot and writes only its own slab. Slabs are stitched back together by
//! their `start_x`, so completion order never matters, and the new generation
//! replaces the old one only if every slab succeeded.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::grid::{Grid, Mode, Snapshot};
use crate::cell::Cell;
use crate::error::UpdateError;
use crate::rules::{Neighborhood, RuleParams};

/// Output of one worker: cells for x in `[start_x, end_x)`.
#[derive(Debug)]
pub struct Slab {
    pub start_x: usize,
    pub end_x: usize,
    pub cells: Vec<Cell>,
}

/// Split `[0, dimension)` into `workers` contiguous half-open ranges whose
/// lengths differ by at most one.
pub fn partition_axis(dimension: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.clamp(1, dimension.max(1));
    let base = dimension / workers;
    let extra = dimension % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let len = base + usize::from(i < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Stitch slabs into a full generation, ordered by `start_x`.
///
/// Fails if the slabs leave a gap, overlap, or carry the wrong cell count.
pub fn reassemble(mut slabs: Vec<Slab>, dimension: usize) -> Result<Vec<Cell>, UpdateError> {
    let plane = dimension * dimension;
    slabs.sort_by_key(|s| s.start_x);

    let mut cells = Vec::with_capacity(plane * dimension);
    let mut next_x = 0;
    for slab in slabs {
        if slab.start_x != next_x || slab.end_x < slab.start_x {
            return Err(UpdateError::Coverage(next_x));
        }
        let expected = (slab.end_x - slab.start_x) * plane;
        if slab.cells.len() != expected {
            return Err(UpdateError::SlabLength {
                start_x: slab.start_x,
                expected,
                got: slab.cells.len(),
            });
        }
        cells.extend(slab.cells);
        next_x = slab.end_x;
    }
    if next_x != dimension {
        return Err(UpdateError::Coverage(next_x));
    }
    Ok(cells)
}

/// Everything a worker needs, fixed when the update starts.
struct StepPlan {
    mode: Mode,
    rules: RuleParams,
    radius: usize,
    seed: u64,
    step: u64,
}

impl StepPlan {
    fn next_cell(&self, snapshot: &Snapshot<'_>, x: usize, y: usize, z: usize) -> Cell {
        let cell = snapshot.cell(x, y, z);
        match self.mode {
            Mode::GeneralizedRule => {
                let neighbours =
                    snapshot.neighbours(x, y, z, self.radius, self.rules.neighborhood);
                cell.transition_generalized(
                    &neighbours,
                    &self.rules.stay_alive,
                    &self.rules.get_alive,
                )
            }
            Mode::TreeGrowth => {
                let neighbours = snapshot.neighbours(x, y, z, 1, Neighborhood::Moore);
                let index = super::grid::index_of(snapshot.dimension, x, y, z);
                let mut rng = SmallRng::seed_from_u64(cell_seed(self.seed, self.step, index));
                cell.transition_tree(&neighbours, &mut rng)
            }
        }
    }
}

/// Per-cell seed so results do not depend on how cells are split across workers.
fn cell_seed(seed: u64, step: u64, index: usize) -> u64 {
    let mut h = seed ^ step.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (index as u64).rotate_left(32);
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

fn panic_reason(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Compute one slab. A panic inside the transition is reported as an error
/// for this slab.
fn compute_slab<F>(
    snapshot: &Snapshot<'_>,
    range: Range<usize>,
    colours: &std::collections::BTreeMap<u8, u32>,
    next_cell: &F,
) -> Result<Slab, UpdateError>
where
    F: Fn(&Snapshot<'_>, usize, usize, usize) -> Result<Cell, UpdateError> + Sync,
{
    let n = snapshot.dimension;
    let run = || -> Result<Vec<Cell>, UpdateError> {
        let mut cells = Vec::with_capacity(range.len() * n * n);
        for x in range.clone() {
            for y in 0..n {
                for z in 0..n {
                    let cell = next_cell(snapshot, x, y, z)?;
                    if !colours.contains_key(&cell.state) {
                        let p = cell.position();
                        return Err(UpdateError::UnmappedState {
                            state: cell.state,
                            x: p.x,
                            y: p.y,
                            z: p.z,
                        });
                    }
                    cells.push(cell);
                }
            }
        }
        Ok(cells)
    };

    let cells = panic::catch_unwind(AssertUnwindSafe(run)).map_err(|payload| {
        UpdateError::Worker {
            start_x: range.start,
            end_x: range.end,
            reason: panic_reason(payload),
        }
    })??;

    Ok(Slab {
        start_x: range.start,
        end_x: range.end,
        cells,
    })
}

impl Grid {
    /// Advance one generation.
    ///
    /// On error the current generation, step count and rules are unchanged.
    pub fn update(&mut self) -> Result<(), UpdateError> {
        let plan = StepPlan {
            mode: self.mode,
            rules: self.rules.clone(),
            radius: self.config.radius,
            seed: self.config.seed,
            step: self.steps,
        };
        self.advance_with(|snapshot, x, y, z| Ok(plan.next_cell(snapshot, x, y, z)))
    }

    /// Run `next_cell` for every site in parallel and swap in the result.
    pub(crate) fn advance_with<F>(&mut self, next_cell: F) -> Result<(), UpdateError>
    where
        F: Fn(&Snapshot<'_>, usize, usize, usize) -> Result<Cell, UpdateError> + Sync,
    {
        let started = Instant::now();
        let dimension = self.dimension;
        let ranges = partition_axis(dimension, self.workers);
        let slab_count = ranges.len();

        let snapshot = self.view();
        let colours = &self.colours;
        let slabs: Result<Vec<Slab>, UpdateError> = self.thread_pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| compute_slab(&snapshot, range, colours, &next_cell))
                .collect()
        });

        let next = match slabs.and_then(|slabs| reassemble(slabs, dimension)) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(step = self.steps, error = %e, "update aborted");
                return Err(e);
            }
        };

        self.cells = next;
        self.steps += 1;

        tracing::debug!(
            step = self.steps,
            slabs = slab_count,
            elapsed_us = started.elapsed().as_micros() as u64,
            "generation advanced"
        );
        Ok(())
    }
}
