//! Spanning tree carvers plus the extras that make a maze imperfect.
//!
//! Each carver starts from a grid with every wall up and links cells until every cell is
//! connected exactly once, so the result is a perfect maze. Eller's algorithm lives in `eller`.

use bit_set::BitSet;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary, Wallboard};
use crate::grid::{Grid, Room};

/// Progress reported once the spanning tree is complete. Later pipeline stages report above it.
pub const GENERATION_PROGRESS_END: u8 = 70;

const ROOM_MIN_SIDE: u32 = 2;
const ROOM_MAX_SIDE: u32 = 5;
const ROOM_ATTEMPTS_PER_ROOM: usize = 10;

/// Reports `done / total` of the generation share of progress, only when the percentage moves.
pub(crate) struct ProgressReporter<'a> {
    report: &'a mut dyn FnMut(u8),
    total: usize,
    last: Option<u8>,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(report: &'a mut dyn FnMut(u8), total: usize) -> ProgressReporter<'a> {
        ProgressReporter { report, total, last: None }
    }

    pub(crate) fn update(&mut self, done: usize) {
        let total = self.total.max(1);
        let percent = (done.min(total) * GENERATION_PROGRESS_END as usize / total) as u8;
        if self.last.map_or(true, |last| percent > last) {
            self.last = Some(percent);
            (self.report)(percent);
        }
    }
}

fn random_cell<R: Rng>(grid: &Grid, rng: &mut R) -> Cartesian2DCoordinate {
    let index = rng.gen_range(0..grid.size());
    Cartesian2DCoordinate::from_row_major_index(index, grid.width().0)
}

/// Randomized depth first search.
/// Walk from a random cell to random unvisited neighbours, carving as we go. At a dead end
/// backtrack along the stack until a cell with unvisited neighbours turns up.
/// Produces long twisty corridors with few dead ends.
pub fn recursive_backtracker<R: Rng>(grid: &mut Grid, rng: &mut R, progress: &mut dyn FnMut(u8)) {
    let cells_count = grid.size();
    let mut reporter = ProgressReporter::new(progress, cells_count);
    reporter.update(0);

    let mut visited = BitSet::with_capacity(cells_count);
    let start = random_cell(grid, rng);
    let mut stack = vec![start];
    if let Some(index) = grid.grid_coordinate_to_index(start) {
        visited.insert(index);
    }
    let mut visited_count = 1;

    while let Some(&current) = stack.last() {
        let unvisited = grid.neighbours(current)
            .iter()
            .cloned()
            .filter(|coord| {
                grid.grid_coordinate_to_index(*coord).map_or(false, |index| !visited.contains(index))
            })
            .collect::<Vec<_>>();

        match unvisited.choose(rng) {
            Some(&next) => {
                if grid.link(current, next).is_ok() {
                    if let Some(index) = grid.grid_coordinate_to_index(next) {
                        visited.insert(index);
                    }
                    visited_count += 1;
                    reporter.update(visited_count);
                    stack.push(next);
                }
            }
            None => {
                let _ = stack.pop();
            }
        }
    }

    debug_assert_eq!(visited_count, cells_count);
    reporter.update(cells_count);
}

/// Randomized Prim.
/// Grow a single connected region from a random cell. The frontier holds the wallboards between
/// the region and the cells just outside it; a uniformly random frontier wallboard is knocked
/// down each step, unless its far side joined the region in the meantime.
pub fn prim<R: Rng>(grid: &mut Grid, rng: &mut R, progress: &mut dyn FnMut(u8)) {
    let cells_count = grid.size();
    let mut reporter = ProgressReporter::new(progress, cells_count);
    reporter.update(0);

    let mut connected = BitSet::with_capacity(cells_count);
    let mut frontier: Vec<Wallboard> = vec![];

    let start = random_cell(grid, rng);
    connect_cell(grid, start, &mut connected, &mut frontier);
    let mut connected_count = 1;

    while !frontier.is_empty() {
        let wallboard = frontier.swap_remove(rng.gen_range(0..frontier.len()));
        let far_side = match grid.neighbour_at_direction(wallboard.cell, wallboard.direction) {
            Some(coord) => coord,
            None => continue,
        };
        let already_connected = grid.grid_coordinate_to_index(far_side)
            .map_or(true, |index| connected.contains(index));
        if already_connected {
            continue;
        }

        if grid.link(wallboard.cell, far_side).is_ok() {
            connect_cell(grid, far_side, &mut connected, &mut frontier);
            connected_count += 1;
            reporter.update(connected_count);
        }
    }

    debug_assert_eq!(connected_count, cells_count);
    reporter.update(cells_count);
}

/// Add `coord` to the region and its walls towards unconnected cells to the frontier.
fn connect_cell(grid: &Grid,
                coord: Cartesian2DCoordinate,
                connected: &mut BitSet,
                frontier: &mut Vec<Wallboard>) {
    if let Some(index) = grid.grid_coordinate_to_index(coord) {
        connected.insert(index);
    }
    for dir in CompassPrimary::ALL.iter() {
        if let Some(neighbour) = grid.neighbour_at_direction(coord, *dir) {
            let neighbour_connected = grid.grid_coordinate_to_index(neighbour)
                .map_or(true, |index| connected.contains(index));
            if !neighbour_connected {
                frontier.push(Wallboard { cell: coord, direction: *dir });
            }
        }
    }
}

/// Knock down `loop_percent` percent of the interior walls still standing, picked at random.
/// Every removal of a wall from a spanning tree adds a loop. Returns the number removed.
pub fn knock_down_walls<R: Rng>(grid: &mut Grid, rng: &mut R, loop_percent: u8) -> usize {
    let mut walls = grid.interior_walls();
    let target = walls.len() * loop_percent.min(100) as usize / 100;
    walls.shuffle(rng);

    let removed = walls.iter()
        .take(target)
        .filter(|wallboard| grid.remove_wallboard(**wallboard).is_ok())
        .count();
    debug!("knocked down {} of {} interior walls", removed, walls.len());
    removed
}

/// Carve up to `rooms` rectangular rooms of 2 to 5 cells a side at random places.
/// Rooms never overlap or touch one another. Returns the number carved.
pub fn carve_rooms<R: Rng>(grid: &mut Grid, rng: &mut R, rooms: usize) -> usize {
    let (grid_width, grid_height) = (grid.width().0 as u32, grid.height().0 as u32);
    if grid_width < ROOM_MIN_SIDE || grid_height < ROOM_MIN_SIDE {
        return 0;
    }

    let mut carved = 0;
    for _ in 0..rooms * ROOM_ATTEMPTS_PER_ROOM {
        if carved == rooms {
            break;
        }
        let width = rng.gen_range(ROOM_MIN_SIDE..=ROOM_MAX_SIDE).min(grid_width);
        let height = rng.gen_range(ROOM_MIN_SIDE..=ROOM_MAX_SIDE).min(grid_height);
        let x = rng.gen_range(0..=grid_width - width);
        let y = rng.gen_range(0..=grid_height - height);
        let room = Room::new(x, y, width, height);

        if grid.rooms().iter().any(|other| room.overlaps(other, 1)) {
            continue;
        }
        if grid.add_room(room).is_ok() {
            carved += 1;
        }
    }
    debug!("carved {} of {} rooms", carved, rooms);
    carved
}
