//! Eller's algorithm.
//!
//! Rows are carved top to bottom while only the set ids of cells are remembered. Each cell in a
//! row belongs to a set; cells in the same set are already connected through earlier rows.
//! Randomly merge neighbouring sets, drop at least one passage south per set, then on the last
//! row merge everything that is left.
//!
//! Set ids live in a plain id-per-cell vector so they can be inspected and planted directly.

use itertools::Itertools;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::generators::ProgressReporter;
use crate::grid::Grid;
use crate::utils;
use crate::utils::FnvHashMap;

/// Id of a cell no row pass has labelled yet.
pub const UNLABELLED: u32 = 0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EllerSettings {
    /// Chance two horizontally adjacent cells in different sets get merged.
    pub join_probability: f64,
    /// Chance any one cell of a set drops a passage into the next row.
    pub drop_probability: f64,
}

impl Default for EllerSettings {
    fn default() -> EllerSettings {
        EllerSettings {
            join_probability: 0.5,
            drop_probability: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EllerSets {
    row_length: usize,
    ids: Vec<u32>,
    members: FnvHashMap<u32, Vec<usize>>,
    next_id: u32,
}

impl EllerSets {
    pub fn new(grid: &Grid) -> EllerSets {
        EllerSets {
            row_length: grid.width().0,
            ids: vec![UNLABELLED; grid.size()],
            members: utils::fnv_hashmap(grid.width().0),
            next_id: UNLABELLED + 1,
        }
    }

    #[inline]
    fn index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        let index = coord.y as usize * self.row_length + coord.x as usize;
        if (coord.x as usize) < self.row_length && index < self.ids.len() {
            Some(index)
        } else {
            None
        }
    }

    /// Set id of a cell, `UNLABELLED` before its row has been labelled.
    pub fn set_id(&self, coord: Cartesian2DCoordinate) -> Option<u32> {
        self.index(coord).map(|index| self.ids[index])
    }

    /// Move a cell into set `id`. Returns false for coordinates off the grid.
    pub fn set_set_id(&mut self, coord: Cartesian2DCoordinate, id: u32) -> bool {
        let index = match self.index(coord) {
            Some(index) => index,
            None => return false,
        };
        let old_id = self.ids[index];
        if old_id != UNLABELLED {
            if let Some(old_members) = self.members.get_mut(&old_id) {
                old_members.retain(|member| *member != index);
                if old_members.is_empty() {
                    let _ = self.members.remove(&old_id);
                }
            }
        }
        self.ids[index] = id;
        if id != UNLABELLED {
            self.members.entry(id).or_insert_with(Vec::new).push(index);
            if id >= self.next_id {
                self.next_id = id.saturating_add(1);
            }
        }
        true
    }

    /// Number of distinct sets among labelled cells.
    pub fn sets_count(&self) -> usize {
        self.members.len()
    }

    /// Give every unlabelled cell of the row a set of its own.
    pub fn label_row(&mut self, row: &[Cartesian2DCoordinate]) {
        for coord in row {
            if self.set_id(*coord) == Some(UNLABELLED) {
                let id = self.next_id;
                let _ = self.set_set_id(*coord, id);
            }
        }
    }

    /// Merge the set of `b` into the set of `a` and knock down the wall between them.
    /// Cells already in the same set are left alone and false is returned.
    pub fn join_sets(&mut self, grid: &mut Grid, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        let (a_id, b_id) = match (self.set_id(a), self.set_id(b)) {
            (Some(a_id), Some(b_id)) => (a_id, b_id),
            _ => return false,
        };
        if a_id == b_id || grid.link(a, b).is_err() {
            return false;
        }

        let relabelled = if b_id == UNLABELLED {
            self.index(b).into_iter().collect()
        } else {
            self.members.remove(&b_id).unwrap_or_default()
        };
        for index in relabelled {
            self.ids[index] = UNLABELLED;
            let coord = Cartesian2DCoordinate::from_row_major_index(index, self.row_length);
            let _ = self.set_set_id(coord, a_id);
        }
        true
    }

    pub fn should_join<R: Rng>(&self, rng: &mut R, probability: f64) -> bool {
        rng.gen_bool(probability.max(0.0).min(1.0))
    }

    /// Every set in the row opens at least one passage south, carrying its id down.
    pub fn drop_sets<R: Rng>(&mut self,
                             grid: &mut Grid,
                             rng: &mut R,
                             row: &[Cartesian2DCoordinate],
                             probability: f64) {
        let row_ids = row.iter()
            .filter_map(|coord| self.set_id(*coord))
            .unique()
            .collect::<Vec<u32>>();

        for id in row_ids {
            let set_cells = row.iter()
                .cloned()
                .filter(|coord| self.set_id(*coord) == Some(id))
                .collect::<Vec<_>>();
            let mut dropping = set_cells.iter()
                .cloned()
                .filter(|_| self.should_join(rng, probability))
                .collect::<Vec<_>>();
            if dropping.is_empty() {
                dropping.extend(set_cells.choose(rng).cloned());
            }

            for coord in dropping {
                if let Some(below) = grid.neighbour_at_direction(coord, CompassPrimary::South) {
                    if grid.link(coord, below).is_ok() {
                        let _ = self.set_set_id(below, id);
                    }
                }
            }
        }
    }

    /// Merge every pair of neighbouring cells in different sets.
    pub fn join_last_row(&mut self, grid: &mut Grid, row: &[Cartesian2DCoordinate]) {
        for (a, b) in row.iter().tuple_windows() {
            let _ = self.join_sets(grid, *a, *b);
        }
    }

    /// Carve a perfect maze into `grid` one row at a time.
    pub fn generate<R: Rng>(&mut self,
                            grid: &mut Grid,
                            rng: &mut R,
                            settings: &EllerSettings,
                            progress: &mut dyn FnMut(u8)) {
        let rows_count = grid.height().0;
        let mut reporter = ProgressReporter::new(progress, rows_count);
        reporter.update(0);

        for (y, row) in grid.iter_row().enumerate() {
            self.label_row(&row);
            if y + 1 < rows_count {
                for (a, b) in row.iter().tuple_windows() {
                    if self.should_join(rng, settings.join_probability) {
                        let _ = self.join_sets(grid, *a, *b);
                    }
                }
                self.drop_sets(grid, rng, &row, settings.drop_probability);
            } else {
                self.join_last_row(grid, &row);
            }
            reporter.update(y + 1);
        }
        debug!("eller finished with {} set(s)", self.sets_count());
    }
}

/// Apply Eller's algorithm to a grid with every wall up.
pub fn eller<R: Rng>(grid: &mut Grid, rng: &mut R, settings: &EllerSettings, progress: &mut dyn FnMut(u8)) -> EllerSets {
    let mut sets = EllerSets::new(grid);
    sets.generate(grid, rng, settings, progress);
    sets
}

#[cfg(test)]
mod tests {

    use quickcheck::quickcheck;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::generators::GENERATION_PROGRESS_END;
    use crate::pathing::Distances;
    use crate::units::{Height, Width};

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    fn row_grid(w: usize) -> (Grid, EllerSets) {
        let g = Grid::new(Width(w), Height(1)).unwrap();
        let sets = EllerSets::new(&g);
        (g, sets)
    }

    #[test]
    fn joining_the_same_set_is_a_noop() {
        let (mut g, mut sets) = row_grid(3);
        assert!(sets.set_set_id(gc(0, 0), 5));
        assert!(sets.set_set_id(gc(1, 0), 5));

        assert!(!sets.join_sets(&mut g, gc(0, 0), gc(1, 0)));
        assert_eq!(sets.set_id(gc(0, 0)), Some(5));
        assert_eq!(sets.set_id(gc(1, 0)), Some(5));
        assert!(!g.is_linked(gc(0, 0), gc(1, 0)));
    }

    #[test]
    fn joining_different_sets_merges_by_value() {
        let (mut g, mut sets) = row_grid(5);
        let ids = [1, 1, 2, 2, 3];
        for (x, id) in ids.iter().enumerate() {
            assert!(sets.set_set_id(gc(x as u32, 0), *id));
        }

        assert!(sets.join_sets(&mut g, gc(1, 0), gc(2, 0)));
        assert!(g.is_linked(gc(1, 0), gc(2, 0)));
        for x in 0..4 {
            assert_eq!(sets.set_id(gc(x, 0)), Some(1));
        }
        // The third group is untouched.
        assert_eq!(sets.set_id(gc(4, 0)), Some(3));
        assert_eq!(sets.sets_count(), 2);
    }

    #[test]
    fn set_id_off_the_grid() {
        let (_, mut sets) = row_grid(2);
        assert_eq!(sets.set_id(gc(2, 0)), None);
        assert_eq!(sets.set_id(gc(0, 1)), None);
        assert!(!sets.set_set_id(gc(2, 0), 1));
    }

    #[test]
    fn labelling_uses_fresh_ids() {
        let mut g = Grid::new(Width(4), Height(2)).unwrap();
        let mut sets = EllerSets::new(&g);
        let rows = g.iter_row().collect::<Vec<_>>();

        sets.label_row(&rows[0]);
        let first = rows[0].iter().map(|c| sets.set_id(*c).unwrap()).collect::<Vec<_>>();
        assert!(first.iter().all(|id| *id != UNLABELLED));
        assert_eq!(first.iter().unique().count(), 4);

        // A dropped id is kept, everything else gets an id never seen before.
        assert!(g.link(gc(2, 0), gc(2, 1)).is_ok());
        assert!(sets.set_set_id(gc(2, 1), first[2]));
        sets.label_row(&rows[1]);
        assert_eq!(sets.set_id(gc(2, 1)), Some(first[2]));
        for x in &[0, 1, 3] {
            let id = sets.set_id(gc(*x, 1)).unwrap();
            assert!(!first.contains(&id));
        }
        assert_eq!(sets.sets_count(), 7);
    }

    #[test]
    fn last_row_is_merged_into_one_set() {
        let (mut g, mut sets) = row_grid(4);
        for (x, id) in [1, 2, 2, 3].iter().enumerate() {
            assert!(sets.set_set_id(gc(x as u32, 0), *id));
        }
        let row = g.iter_row().next().unwrap();
        sets.join_last_row(&mut g, &row);

        let first = sets.set_id(gc(0, 0));
        assert!(row.iter().all(|coord| sets.set_id(*coord) == first));
        // (1, 0) and (2, 0) already shared a set so stay apart.
        assert!(!g.is_linked(gc(1, 0), gc(2, 0)));
        assert_eq!(g.links_count(), 2);
    }

    #[test]
    fn every_set_drops_south() {
        let mut g = Grid::new(Width(6), Height(2)).unwrap();
        let mut sets = EllerSets::new(&g);
        let mut rng = XorShiftRng::seed_from_u64(3);
        let rows = g.iter_row().collect::<Vec<_>>();
        sets.label_row(&rows[0]);
        // Never drop by chance, so exactly one forced drop per set.
        sets.drop_sets(&mut g, &mut rng, &rows[0], 0.0);
        assert_eq!(g.links_count(), 6);
        for x in 0..6 {
            assert_eq!(sets.set_id(gc(x, 1)), sets.set_id(gc(x, 0)));
        }
    }

    #[test]
    fn generated_maze_is_one_set_and_a_spanning_tree() {
        fn p(seed: u64, w: u8, h: u8) -> bool {
            let (w, h) = (w as usize % 16 + 1, h as usize % 16 + 1);
            let mut g = Grid::new(Width(w), Height(h)).unwrap();
            let mut rng = XorShiftRng::seed_from_u64(seed);
            let sets = eller(&mut g, &mut rng, &EllerSettings::default(), &mut |_| {});

            let first = sets.set_id(gc(0, 0));
            let single_set = g.iter().all(|coord| sets.set_id(coord) == first);
            single_set && sets.sets_count() == 1 && g.links_count() == g.size() - 1 &&
            Distances::new(&g, gc(0, 0)).is_ok()
        }
        quickcheck(p as fn(u64, u8, u8) -> bool);
    }

    #[test]
    fn extreme_probabilities_still_connect() {
        for &(join, drop) in &[(0.0, 0.0), (1.0, 1.0), (0.0, 1.0), (1.0, 0.0)] {
            let mut g = Grid::new(Width(9), Height(7)).unwrap();
            let mut rng = XorShiftRng::seed_from_u64(99);
            let settings = EllerSettings {
                join_probability: join,
                drop_probability: drop,
            };
            let mut reports = vec![];
            let _ = eller(&mut g, &mut rng, &settings, &mut |p| reports.push(p));
            assert_eq!(g.links_count(), 62);
            assert!(Distances::new(&g, gc(4, 3)).is_ok());
            assert_eq!(reports.last(), Some(&GENERATION_PROGRESS_END));
        }
    }
}
