//! A finished maze: the frozen grid, its distance field and where the robot starts.

use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary, Wallboard};
use crate::errors::*;
use crate::grid::{Grid, Room};
use crate::pathing::Distances;
use crate::units::{Height, Width};

#[derive(Debug, Clone)]
pub struct Maze {
    grid: Grid,
    distances: Distances,
    start: Cartesian2DCoordinate,
    start_direction: CompassPrimary,
}

impl Maze {
    /// Freeze a grid with an exit into a maze. The distance field is computed here so a maze
    /// always comes with one that covers every cell.
    pub fn new(grid: Grid, start: Cartesian2DCoordinate) -> Result<Maze> {
        let exit = grid.exit_position().ok_or(ErrorKind::MissingExit)?;
        if !grid.is_valid_coordinate(start) {
            bail!(ErrorKind::InvalidPosition(start.x, start.y));
        }
        let distances = Distances::new(&grid, exit)?;
        Ok(Maze {
            grid,
            distances,
            start,
            start_direction: CompassPrimary::East,
        })
    }

    /// Freeze a grid with an exit, starting the robot on the cell farthest from the exit.
    /// Ties go to the first such cell in row-major order.
    pub fn with_farthest_start(grid: Grid) -> Result<Maze> {
        let exit = grid.exit_position().ok_or(ErrorKind::MissingExit)?;
        let distances = Distances::new(&grid, exit)?;
        let start = distances.furthest_points_on_grid()
            .first()
            .cloned()
            .unwrap_or(exit);
        Ok(Maze {
            grid,
            distances,
            start,
            start_direction: CompassPrimary::East,
        })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn distances(&self) -> &Distances {
        &self.distances
    }

    #[inline]
    pub fn start(&self) -> Cartesian2DCoordinate {
        self.start
    }

    #[inline]
    pub fn start_direction(&self) -> CompassPrimary {
        self.start_direction
    }

    #[inline]
    pub fn exit(&self) -> Cartesian2DCoordinate {
        self.distances.exit()
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.grid.height()
    }

    /// Cells from the start to the exit, the overlay a map view draws.
    pub fn solution_path(&self) -> Option<Vec<Cartesian2DCoordinate>> {
        self.distances.path_to_exit(&self.grid, self.start)
    }

    pub fn snapshot(&self) -> MazeSnapshot {
        MazeSnapshot {
            width: self.grid.width().0,
            height: self.grid.height().0,
            start: self.start,
            exit: self.grid
                .exit_wallboard()
                .unwrap_or(Wallboard { cell: self.exit(), direction: CompassPrimary::North }),
            rooms: self.grid.rooms().to_vec(),
            walls: self.grid.interior_walls(),
        }
    }

    /// Rebuild a maze without rerunning any generator.
    pub fn from_snapshot(snapshot: &MazeSnapshot) -> Result<Maze> {
        let mut grid = Grid::new(Width(snapshot.width), Height(snapshot.height))?;
        for coord in grid.iter() {
            for dir in &[CompassPrimary::East, CompassPrimary::South] {
                if let Some(neighbour) = grid.neighbour_at_direction(coord, *dir) {
                    if grid.link(coord, neighbour).is_err() {
                        bail!(ErrorKind::InvalidWallboard(Wallboard { cell: coord, direction: *dir }));
                    }
                }
            }
        }
        for room in &snapshot.rooms {
            grid.add_room(*room)?;
        }
        for wallboard in &snapshot.walls {
            if !grid.add_wallboard(*wallboard) {
                bail!(ErrorKind::InvalidWallboard(*wallboard));
            }
        }
        grid.set_exit(snapshot.exit)?;
        Maze::new(grid, snapshot.start)
    }
}

/// The serializable shape of a maze. Walls lists every interior wallboard still up, each once,
/// in East/South form. Exterior walls are implied apart from the exit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeSnapshot {
    pub width: usize,
    pub height: usize,
    pub start: Cartesian2DCoordinate,
    pub exit: Wallboard,
    pub rooms: Vec<Room>,
    pub walls: Vec<Wallboard>,
}

impl MazeSnapshot {
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<MazeSnapshot> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
