// Distances from the exit.
//
// A breadth first flood fill over the passages of a finished grid. Every step between linked cells
// has the same weight so the first time a cell is reached is via its shortest route, and the
// distances vector doubles as the visited set.

use smallvec::SmallVec;
use std::u32;

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::grid::{CoordinateSmallVec, Grid};
use crate::units::{Height, Width};

/// Marker for cells the flood fill never reached.
const UNREACHED: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distances {
    width: Width,
    height: Height,
    exit_coordinate: Cartesian2DCoordinate,
    distances: Vec<u32>,
    max_distance: u32,
}

impl Distances {
    /// Flood fill from `exit_coordinate`. Fails if the coordinate is off the grid or any cell
    /// cannot be reached from it.
    pub fn new(grid: &Grid, exit_coordinate: Cartesian2DCoordinate) -> Result<Distances> {
        let exit_index = grid.grid_coordinate_to_index(exit_coordinate)
            .ok_or_else(|| ErrorKind::InvalidPosition(exit_coordinate.x, exit_coordinate.y))?;

        let row_length = grid.width().0;
        let mut distances = vec![UNREACHED; grid.size()];
        distances[exit_index] = 0;

        let mut max = 0;
        let mut reached = 1;
        let mut frontier = vec![exit_coordinate];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for cell_coord in &frontier {
                let distance_to_cell = distances[cell_coord.y as usize * row_length +
                                                 cell_coord.x as usize];
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                let links: CoordinateSmallVec = grid.links(*cell_coord).unwrap_or_default();
                for link_coordinate in &*links {
                    let link_index = link_coordinate.y as usize * row_length +
                                     link_coordinate.x as usize;
                    if distances[link_index] == UNREACHED {
                        distances[link_index] = distance_to_cell + 1;
                        reached += 1;
                        new_frontier.push(*link_coordinate);
                    }
                }
            }
            frontier = new_frontier;
        }

        if reached != grid.size() {
            bail!(ErrorKind::Disconnected(grid.size() - reached));
        }

        Ok(Distances {
            width: grid.width(),
            height: grid.height(),
            exit_coordinate,
            distances,
            max_distance: max,
        })
    }

    /// A field from precomputed row-major values, e.g. to steer a driver with a custom field.
    pub fn from_values(width: Width,
                       height: Height,
                       exit_coordinate: Cartesian2DCoordinate,
                       values: Vec<u32>)
                       -> Result<Distances> {
        if width.0 == 0 || height.0 == 0 || values.len() != width.0 * height.0 {
            bail!(ErrorKind::InvalidDimensions(width.0, height.0));
        }
        if exit_coordinate.x as usize >= width.0 || exit_coordinate.y as usize >= height.0 {
            bail!(ErrorKind::InvalidPosition(exit_coordinate.x, exit_coordinate.y));
        }
        let max_distance = values.iter().cloned().max().unwrap_or(0);
        Ok(Distances {
            width,
            height,
            exit_coordinate,
            distances: values,
            max_distance,
        })
    }

    #[inline(always)]
    pub fn exit(&self) -> Cartesian2DCoordinate {
        self.exit_coordinate
    }

    #[inline(always)]
    pub fn is_exit_position(&self, coord: Cartesian2DCoordinate) -> bool {
        self.exit_coordinate == coord
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    /// Steps to the exit, None off the grid.
    #[inline]
    pub fn distance_to(&self, coord: Cartesian2DCoordinate) -> Option<u32> {
        if (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0 {
            Some(self.distances[coord.y as usize * self.width.0 + coord.x as usize])
        } else {
            None
        }
    }

    /// Cells at the maximum distance, in row-major order.
    pub fn furthest_points_on_grid(&self) -> SmallVec<[Cartesian2DCoordinate; 8]> {
        let furthest_distance = self.max();
        let row_length = self.width.0;
        self.distances
            .iter()
            .enumerate()
            .filter(|&(_, distance)| *distance == furthest_distance)
            .map(|(index, _)| Cartesian2DCoordinate::from_row_major_index(index, row_length))
            .collect()
    }

    /// The linked neighbour strictly closer to the exit. Neighbours are tried North, East,
    /// South, West and the first with the smallest distance wins. None at the exit itself.
    pub fn neighbour_closer_to_exit(&self,
                                    grid: &Grid,
                                    coord: Cartesian2DCoordinate)
                                    -> Option<Cartesian2DCoordinate> {
        let current_distance = self.distance_to(coord)?;
        let mut closest: Option<(Cartesian2DCoordinate, u32)> = None;
        for neighbour_coord in grid.neighbours(coord).iter().cloned() {
            if !grid.is_linked(coord, neighbour_coord) {
                continue;
            }
            if let Some(neighbour_distance) = self.distance_to(neighbour_coord) {
                let closer = closest.map_or(true, |(_, best)| neighbour_distance < best);
                if neighbour_distance < current_distance && closer {
                    closest = Some((neighbour_coord, neighbour_distance));
                }
            }
        }
        closest.map(|(neighbour_coord, _)| neighbour_coord)
    }

    /// The solution path from `start` to the exit inclusive.
    /// None if some cell on the way has no linked neighbour closer to the exit.
    pub fn path_to_exit(&self, grid: &Grid, start: Cartesian2DCoordinate) -> Option<Vec<Cartesian2DCoordinate>> {
        self.distance_to(start)?;

        let mut path = vec![start];
        let mut current_coord = start;
        while current_coord != self.exit_coordinate {
            current_coord = self.neighbour_closer_to_exit(grid, current_coord)?;
            path.push(current_coord);
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {

    use quickcheck::quickcheck;
    use std::u32;

    use super::*;
    use crate::cells::CompassPrimary;

    static OUT_OF_GRID_COORDINATE: Cartesian2DCoordinate = Cartesian2DCoordinate {
        x: u32::MAX,
        y: u32::MAX,
    };

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    fn open_grid(w: usize, h: usize) -> Grid {
        let mut g = Grid::new(Width(w), Height(h)).unwrap();
        for coord in g.iter() {
            for dir in &[CompassPrimary::East, CompassPrimary::South] {
                if let Some(neighbour) = g.neighbour_at_direction(coord, *dir) {
                    g.link(coord, neighbour).expect("Link Failed");
                }
            }
        }
        g
    }

    /// A 3x3 spiral corridor.
    fn spiral_grid() -> Grid {
        let mut g = Grid::new(Width(3), Height(3)).unwrap();
        let route = [gc(1, 1), gc(0, 1), gc(0, 0), gc(1, 0), gc(2, 0), gc(2, 1), gc(2, 2), gc(1, 2),
                     gc(0, 2)];
        for pair in route.windows(2) {
            g.link(pair[0], pair[1]).expect("Link Failed");
        }
        g
    }

    #[test]
    fn distances_construction_requires_valid_exit_coordinate() {
        let g = open_grid(3, 3);
        assert!(Distances::new(&g, OUT_OF_GRID_COORDINATE).is_err());
    }

    #[test]
    fn disconnected_grids_are_rejected() {
        let g = Grid::new(Width(3), Height(3)).unwrap();
        let err = Distances::new(&g, gc(0, 0)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Disconnected(8)));
    }

    #[test]
    fn exit() {
        let g = open_grid(3, 3);
        let exit_coordinate = gc(1, 1);
        let distances = Distances::new(&g, exit_coordinate).unwrap();
        assert_eq!(exit_coordinate, distances.exit());
        assert_eq!(distances.distance_to(exit_coordinate), Some(0));
        assert!(distances.is_exit_position(exit_coordinate));
    }

    #[test]
    fn distance_to_invalid_coordinate_is_none() {
        let g = open_grid(3, 3);
        let distances = Distances::new(&g, gc(0, 0)).unwrap();
        assert_eq!(distances.distance_to(OUT_OF_GRID_COORDINATE), None);
    }

    #[test]
    fn distances_on_open_grid() {
        let g = open_grid(2, 2);
        let distances = Distances::new(&g, gc(0, 0)).unwrap();

        assert_eq!(distances.distance_to(gc(0, 0)), Some(0));
        assert_eq!(distances.distance_to(gc(1, 0)), Some(1));
        assert_eq!(distances.distance_to(gc(0, 1)), Some(1));
        assert_eq!(distances.distance_to(gc(1, 1)), Some(2));
        assert_eq!(distances.max(), 2);
    }

    #[test]
    fn furthest_point_on_spiral() {
        let g = spiral_grid();
        let distances = Distances::new(&g, gc(1, 1)).unwrap();
        assert_eq!(distances.max(), 8);
        assert_eq!(&*distances.furthest_points_on_grid(), &[gc(0, 2)]);
    }

    #[test]
    fn path_follows_the_corridor() {
        let g = spiral_grid();
        let distances = Distances::new(&g, gc(1, 1)).unwrap();
        let path = distances.path_to_exit(&g, gc(0, 2)).unwrap();
        assert_eq!(path,
                   vec![gc(0, 2), gc(1, 2), gc(2, 2), gc(2, 1), gc(2, 0), gc(1, 0), gc(0, 0),
                        gc(0, 1), gc(1, 1)]);
        assert_eq!(distances.path_to_exit(&g, gc(1, 1)), Some(vec![gc(1, 1)]));
    }

    #[test]
    fn closer_neighbour_ties_break_north_first() {
        let g = open_grid(3, 3);
        let distances = Distances::new(&g, gc(0, 0)).unwrap();
        // Both North (1, 0) and West (0, 1) are one step closer.
        assert_eq!(distances.neighbour_closer_to_exit(&g, gc(1, 1)), Some(gc(1, 0)));
        assert_eq!(distances.neighbour_closer_to_exit(&g, gc(0, 0)), None);
    }

    #[test]
    fn closer_neighbour_ignores_walls() {
        // An unlinked neighbour with a smaller distance is not a way out.
        let g = spiral_grid();
        let distances = Distances::new(&g, gc(1, 1)).unwrap();
        assert_eq!(distances.neighbour_closer_to_exit(&g, gc(1, 2)), Some(gc(2, 2)));
    }

    #[test]
    fn values_are_injected_as_given() {
        let values = vec![3, 2, 1, 9, 9, 0];
        let distances = Distances::from_values(Width(3), Height(2), gc(2, 1), values).unwrap();
        assert_eq!(distances.distance_to(gc(0, 1)), Some(9));
        assert_eq!(distances.max(), 9);
        assert_eq!(&*distances.furthest_points_on_grid(), &[gc(0, 1), gc(1, 1)]);

        assert!(Distances::from_values(Width(3), Height(2), gc(2, 1), vec![0; 5]).is_err());
        assert!(Distances::from_values(Width(3), Height(2), gc(3, 1), vec![0; 6]).is_err());
    }

    #[test]
    fn open_grid_distances_are_manhattan() {
        fn p(w: u8, h: u8, x: u8, y: u8) -> bool {
            let (w, h) = (w as usize % 12 + 1, h as usize % 12 + 1);
            let exit = gc(x as u32 % w as u32, y as u32 % h as u32);
            let g = open_grid(w, h);
            let distances = Distances::new(&g, exit).unwrap();
            g.iter().all(|coord| {
                let manhattan = (coord.x as i64 - exit.x as i64).abs() +
                                (coord.y as i64 - exit.y as i64).abs();
                distances.distance_to(coord) == Some(manhattan as u32)
            })
        }
        quickcheck(p as fn(u8, u8, u8, u8) -> bool)
    }
}
