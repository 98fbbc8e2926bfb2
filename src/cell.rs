//! Per-site cell state and the two transition rules.
//!
//! A cell knows nothing about the grid. Each transition consumes a neighbour
//! list gathered by the grid and returns the replacement cell for the next
//! generation; the receiver is never mutated.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Colour given to cells born under the threshold rule.
pub const NEWBORN_COLOUR: u32 = 0xFF0000;
/// Colour of trunk and branch states.
pub const WOOD_COLOUR: u32 = 0xDC7633;
/// Colour of leaf and canopy states.
pub const LEAF_COLOUR: u32 = 0x2ECC71;

/// State ids used by the tree-growth generator.
pub mod tree {
    /// Background.
    pub const EMPTY: u8 = 0;
    /// Trunk segment that may still extend upward.
    pub const TRUNK: u8 = 2;
    /// Trunk segment that spawns a sideways trunk.
    pub const BRANCH: u8 = 3;
    /// Trunk top; leaves and the canopy start here.
    pub const TRUNK_TOP: u8 = 4;
    /// Leaf growing along x.
    pub const LEAF_X: u8 = 5;
    /// Leaf that stopped growing along x.
    pub const LEAF_X_STOP: u8 = 6;
    /// Drooping leaf along x.
    pub const LEAF_X_DROOP: u8 = 7;
    /// Leaf growing along z.
    pub const LEAF_Z: u8 = 8;
    /// Leaf that stopped growing along z.
    pub const LEAF_Z_STOP: u8 = 9;
    /// Drooping leaf along z.
    pub const LEAF_Z_DROOP: u8 = 10;
    /// Canopy top.
    pub const CANOPY_TOP: u8 = 11;
    /// Canopy fill.
    pub const CANOPY_FILL: u8 = 12;
    /// Highest state id the generator produces.
    pub const MAX_STATE: u8 = CANOPY_FILL;
}

/// Integer lattice coordinate of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Position { x, y, z }
    }

    /// The position displaced by `(dx, dy, dz)`.
    #[inline]
    pub fn offset(self, [dx, dy, dz]: [i32; 3]) -> Self {
        Position::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Publishable part of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub state: u8,
    pub colour: u32,
}

/// One lattice site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub state: u8,
    /// Packed 0xRRGGBB, meaningful only when `state != 0`.
    pub colour: u32,
    position: Position,
    /// Height counter used by tree growth to bound vertical extent.
    pub aux_height: u32,
}

impl Cell {
    pub fn new(state: u8, colour: u32, position: Position) -> Self {
        Cell {
            state,
            colour,
            position,
            aux_height: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            state: self.state,
            colour: self.colour,
        }
    }

    /// Replacement cell at the same position.
    #[inline]
    fn next(&self, state: u8, colour: u32, aux_height: u32) -> Cell {
        Cell {
            state,
            colour,
            position: self.position,
            aux_height,
        }
    }

    /// State and height of the neighbour at `offset` from this cell, or
    /// `(0, 0)` when no neighbour sits there.
    pub fn locate(&self, neighbours: &[&Cell], offset: [i32; 3]) -> (u8, u32) {
        let target = self.position.offset(offset);
        neighbours
            .iter()
            .find(|n| n.position == target)
            .map_or((0, 0), |n| (n.state, n.aux_height))
    }

    /// Classic 2,3/3 rule. Births take [`NEWBORN_COLOUR`].
    pub fn transition_default(&self, neighbours: &[&Cell]) -> Cell {
        let live = live_count(neighbours);
        match self.state {
            1 if live == 2 || live == 3 => *self,
            1 => self.next(0, self.colour, self.aux_height),
            0 if live == 3 => self.next(1, NEWBORN_COLOUR, self.aux_height),
            _ => *self,
        }
    }

    /// Threshold rule parameterised by survival and birth counts.
    ///
    /// With both sets empty this is exactly [`Cell::transition_default`].
    pub fn transition_generalized(
        &self,
        neighbours: &[&Cell],
        stay_alive: &BTreeSet<u32>,
        get_alive: &BTreeSet<u32>,
    ) -> Cell {
        if stay_alive.is_empty() && get_alive.is_empty() {
            return self.transition_default(neighbours);
        }

        let live = live_count(neighbours);
        match self.state {
            1 if stay_alive.contains(&live) => *self,
            1 => self.next(0, self.colour, self.aux_height),
            0 if get_alive.contains(&live) => self.next(1, NEWBORN_COLOUR, self.aux_height),
            _ => *self,
        }
    }

    /// Stochastic tree growth. Only empty cells change; the first matching
    /// rule wins.
    pub fn transition_tree<R: Rng + ?Sized>(&self, neighbours: &[&Cell], rng: &mut R) -> Cell {
        use tree::*;

        if self.state != EMPTY {
            return *self;
        }

        let (under, under_h) = self.locate(neighbours, [0, -1, 0]);

        let (x_neg, x_neg_h) = self.locate(neighbours, [-1, 0, 0]);
        let (x_pos, x_pos_h) = self.locate(neighbours, [1, 0, 0]);
        let (x_diag_a, _) = self.locate(neighbours, [-1, 1, 0]);
        let (x_diag_b, _) = self.locate(neighbours, [1, 1, 0]);
        let height = under_h.max(x_neg_h).max(x_pos_h);
        let height_x = x_neg_h.max(x_pos_h);

        let (z_neg, z_neg_h) = self.locate(neighbours, [0, 0, -1]);
        let (z_pos, z_pos_h) = self.locate(neighbours, [0, 0, 1]);
        let (z_diag_a, _) = self.locate(neighbours, [0, 1, -1]);
        let (z_diag_b, _) = self.locate(neighbours, [0, 1, 1]);
        let height_z = z_neg_h.max(z_pos_h);

        let grows_leaf = |s: u8| matches!(s, TRUNK_TOP | LEAF_X | LEAF_Z);
        let stopped_leaf = |s: u8| matches!(s, LEAF_X_STOP | LEAF_Z_STOP);

        let wood = |state, h| self.next(state, WOOD_COLOUR, h);
        let leaf = |state, h| self.next(state, LEAF_COLOUR, h);

        if under == TRUNK {
            if (height > 6 || rng.gen::<f64>() > 0.8) && height >= 3 {
                wood(TRUNK_TOP, self.aux_height)
            } else if rng.gen::<f64>() < 0.2 {
                wood(BRANCH, height)
            } else {
                wood(TRUNK, height + 1)
            }
        } else if x_neg == BRANCH {
            wood(TRUNK, height + 1)
        } else if grows_leaf(x_neg) || grows_leaf(x_pos) {
            if rng.gen::<f64>() < 0.3 || height_x > 2 {
                leaf(LEAF_X_STOP, self.aux_height)
            } else {
                leaf(LEAF_X, height_x + 1)
            }
        } else if stopped_leaf(x_diag_a) || stopped_leaf(x_diag_b) {
            let state = if rng.gen::<f64>() > 0.91 {
                LEAF_X_STOP
            } else {
                LEAF_X_DROOP
            };
            leaf(state, height_x + 1)
        } else if grows_leaf(z_neg) || grows_leaf(z_pos) {
            if rng.gen::<f64>() < 0.3 || height_z > 2 {
                leaf(LEAF_Z_STOP, self.aux_height)
            } else {
                leaf(LEAF_Z, height_z + 1)
            }
        } else if stopped_leaf(z_diag_a) || stopped_leaf(z_diag_b) {
            let state = if rng.gen::<f64>() > 0.91 {
                LEAF_Z_STOP
            } else {
                LEAF_Z_DROOP
            };
            leaf(state, height_z + 1)
        } else if under == TRUNK_TOP {
            leaf(CANOPY_TOP, self.aux_height)
        } else if [x_neg, x_pos, z_neg, z_pos].contains(&CANOPY_TOP) && under != EMPTY {
            let state = if rng.gen::<f64>() > 0.8 {
                CANOPY_TOP
            } else {
                CANOPY_FILL
            };
            leaf(state, self.aux_height)
        } else if leaf_count(neighbours) > 5 {
            leaf(CANOPY_FILL, self.aux_height)
        } else {
            *self
        }
    }
}

/// Number of neighbours in state 1.
fn live_count(neighbours: &[&Cell]) -> u32 {
    neighbours.iter().filter(|n| n.state == 1).count() as u32
}

/// Number of neighbours in any leaf state.
fn leaf_count(neighbours: &[&Cell]) -> usize {
    neighbours
        .iter()
        .filter(|n| (tree::LEAF_X..=tree::LEAF_Z_DROOP).contains(&n.state))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn at(state: u8, x: i32, y: i32, z: i32) -> Cell {
        Cell::new(state, 0, Position::new(x, y, z))
    }

    /// `live` live cells followed by dead ones, 26 in total.
    fn moore_ring(live: usize) -> Vec<Cell> {
        let mut cells = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if (dx, dy, dz) == (0, 0, 0) {
                        continue;
                    }
                    let state = if cells.len() < live { 1 } else { 0 };
                    cells.push(at(state, 5 + dx, 5 + dy, 5 + dz));
                }
            }
        }
        cells
    }

    fn refs(cells: &[Cell]) -> Vec<&Cell> {
        cells.iter().collect()
    }

    #[test]
    fn test_snapshot() {
        let cell = Cell::new(1, 0x00FF00, Position::new(1, 2, 3));
        assert_eq!(
            cell.snapshot(),
            CellSnapshot {
                state: 1,
                colour: 0x00FF00
            }
        );
        assert_eq!(cell.position(), Position::new(1, 2, 3));
        assert_eq!(cell.aux_height, 0);
    }

    #[test]
    fn test_default_truth_table() {
        for live in 0..=26 {
            let ring = moore_ring(live);
            let neighbours = refs(&ring);

            let alive = at(1, 5, 5, 5).transition_default(&neighbours);
            let expected = if live == 2 || live == 3 { 1 } else { 0 };
            assert_eq!(alive.state, expected, "live cell with {live} neighbours");

            let dead = at(0, 5, 5, 5).transition_default(&neighbours);
            let expected = if live == 3 { 1 } else { 0 };
            assert_eq!(dead.state, expected, "dead cell with {live} neighbours");
        }
    }

    #[test]
    fn test_empty_sets_match_default() {
        let empty = BTreeSet::new();
        for live in 0..=26 {
            let ring = moore_ring(live);
            let neighbours = refs(&ring);
            for state in [0, 1] {
                let cell = at(state, 5, 5, 5);
                assert_eq!(
                    cell.transition_generalized(&neighbours, &empty, &empty),
                    cell.transition_default(&neighbours)
                );
            }
        }
    }

    #[test]
    fn test_parameterised_rule() {
        let stay = BTreeSet::from([4, 5]);
        let get = BTreeSet::from([1]);

        let ring = moore_ring(4);
        let survivor = at(1, 5, 5, 5).transition_generalized(&refs(&ring), &stay, &get);
        assert_eq!(survivor.state, 1);

        let ring = moore_ring(3);
        let dies = at(1, 5, 5, 5).transition_generalized(&refs(&ring), &stay, &get);
        assert_eq!(dies.state, 0);

        let ring = moore_ring(1);
        let born = at(0, 5, 5, 5).transition_generalized(&refs(&ring), &stay, &get);
        assert_eq!(born.state, 1);
        assert_eq!(born.colour, NEWBORN_COLOUR);
        assert_eq!(born.position(), Position::new(5, 5, 5));
    }

    #[test]
    fn test_counts_are_not_bounded_by_26() {
        // Radius-2 Moore neighbourhoods have up to 124 members.
        let neighbours: Vec<Cell> = (0..40).map(|i| at(1, 100 + i, 0, 0)).collect();
        let stay = BTreeSet::from([40]);
        let next =
            at(1, 0, 0, 0).transition_generalized(&refs(&neighbours), &stay, &BTreeSet::new());
        assert_eq!(next.state, 1);
    }

    #[test]
    fn test_locate() {
        let cell = at(0, 0, 0, 0);
        let mut tall = at(1, -1, 0, 0);
        tall.aux_height = 4;
        let cells = [tall, at(0, 1, 0, 0), at(1, 0, 1, 0)];
        let neighbours = refs(&cells);

        assert_eq!(cell.locate(&neighbours, [-1, 0, 0]), (1, 4));
        assert_eq!(cell.locate(&neighbours, [0, 1, 0]), (1, 0));
        assert_eq!(cell.locate(&neighbours, [0, -1, 0]), (0, 0));
        assert_eq!(cell.locate(&[], [0, 0, 1]), (0, 0));
    }

    #[test]
    fn test_tree_non_empty_is_terminal() {
        let mut rng = SmallRng::seed_from_u64(1);
        let below = at(tree::TRUNK, 0, -1, 0);
        for state in 1..=tree::MAX_STATE {
            let cell = at(state, 0, 0, 0);
            assert_eq!(cell.transition_tree(&[&below], &mut rng), cell);
        }
    }

    #[test]
    fn test_tree_trunk_extends_upward() {
        let mut rng = SmallRng::seed_from_u64(7);
        let below = at(tree::TRUNK, 0, -1, 0);
        for _ in 0..100 {
            let next = at(0, 0, 0, 0).transition_tree(&[&below], &mut rng);
            // Low trunks never stop.
            assert!(matches!(next.state, tree::TRUNK | tree::BRANCH));
            assert_eq!(next.colour, WOOD_COLOUR);
            if next.state == tree::TRUNK {
                assert_eq!(next.aux_height, 1);
            }
        }
    }

    #[test]
    fn test_tree_tall_trunk_stops() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut below = at(tree::TRUNK, 0, -1, 0);
        below.aux_height = 7;
        let next = at(0, 0, 0, 0).transition_tree(&[&below], &mut rng);
        assert_eq!(next.state, tree::TRUNK_TOP);
    }

    #[test]
    fn test_tree_branch_becomes_trunk() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut branch = at(tree::BRANCH, -1, 0, 0);
        branch.aux_height = 2;
        let next = at(0, 0, 0, 0).transition_tree(&[&branch], &mut rng);
        assert_eq!(next.state, tree::TRUNK);
        assert_eq!(next.aux_height, 3);
    }

    #[test]
    fn test_tree_leaves_sprout_from_top() {
        let mut rng = SmallRng::seed_from_u64(11);
        let top = at(tree::TRUNK_TOP, 1, 0, 0);
        let next = at(0, 0, 0, 0).transition_tree(&[&top], &mut rng);
        assert!(matches!(next.state, tree::LEAF_X | tree::LEAF_X_STOP));
        assert_eq!(next.colour, LEAF_COLOUR);

        let top = at(tree::TRUNK_TOP, 0, 0, 1);
        let next = at(0, 0, 0, 0).transition_tree(&[&top], &mut rng);
        assert!(matches!(next.state, tree::LEAF_Z | tree::LEAF_Z_STOP));
    }

    #[test]
    fn test_tree_long_leaf_stops() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut leaf = at(tree::LEAF_X, -1, 0, 0);
        leaf.aux_height = 3;
        let next = at(0, 0, 0, 0).transition_tree(&[&leaf], &mut rng);
        assert_eq!(next.state, tree::LEAF_X_STOP);
    }

    #[test]
    fn test_tree_droop_from_stopped_leaf() {
        let mut rng = SmallRng::seed_from_u64(5);
        let stopped = at(tree::LEAF_Z_STOP, -1, 1, 0);
        let next = at(0, 0, 0, 0).transition_tree(&[&stopped], &mut rng);
        assert!(matches!(next.state, tree::LEAF_X_STOP | tree::LEAF_X_DROOP));

        let stopped = at(tree::LEAF_X_STOP, 0, 1, 1);
        let next = at(0, 0, 0, 0).transition_tree(&[&stopped], &mut rng);
        assert!(matches!(next.state, tree::LEAF_Z_STOP | tree::LEAF_Z_DROOP));
    }

    #[test]
    fn test_tree_canopy_above_top() {
        let mut rng = SmallRng::seed_from_u64(5);
        let top = at(tree::TRUNK_TOP, 0, -1, 0);
        let next = at(0, 0, 0, 0).transition_tree(&[&top], &mut rng);
        assert_eq!(next.state, tree::CANOPY_TOP);
        assert_eq!(next.colour, LEAF_COLOUR);
    }

    #[test]
    fn test_tree_canopy_spreads_only_when_supported() {
        let mut rng = SmallRng::seed_from_u64(9);
        let canopy = at(tree::CANOPY_TOP, 0, 0, -1);

        let unsupported = at(0, 0, 0, 0).transition_tree(&[&canopy], &mut rng);
        assert_eq!(unsupported.state, tree::EMPTY);

        let support = at(tree::CANOPY_FILL, 0, -1, 0);
        let next = at(0, 0, 0, 0).transition_tree(&[&canopy, &support], &mut rng);
        assert!(matches!(next.state, tree::CANOPY_TOP | tree::CANOPY_FILL));
    }

    #[test]
    fn test_tree_fill_from_dense_leaves() {
        let mut rng = SmallRng::seed_from_u64(9);
        // Six drooping leaves on the far side of the cube; none hit the axis rules.
        let corners = [
            (-1, -1, -1),
            (1, -1, -1),
            (-1, -1, 1),
            (1, -1, 1),
            (-1, 1, 1),
            (1, 1, -1),
        ];
        let leaves: Vec<Cell> = corners
            .iter()
            .map(|&(x, y, z)| at(tree::LEAF_X_DROOP, x, y, z))
            .collect();
        let next = at(0, 0, 0, 0).transition_tree(&refs(&leaves), &mut rng);
        assert_eq!(next.state, tree::CANOPY_FILL);

        let next = at(0, 0, 0, 0).transition_tree(&refs(&leaves[..5]), &mut rng);
        assert_eq!(next.state, tree::EMPTY);
    }

    #[test]
    fn test_tree_reproducible_for_seed() {
        let below = at(tree::TRUNK, 0, -1, 0);
        let run = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            (0..32)
                .map(|_| at(0, 0, 0, 0).transition_tree(&[&below], &mut rng).state)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
