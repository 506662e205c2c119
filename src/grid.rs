//! The maze floorplan.
//!
//! Cells are nodes of an undirected petgraph graph; an edge between two adjacent cells is a
//! passage, i.e. the wallboard between them is absent. Every other interior wallboard is up.
//! Exterior wallboards are all up (borders) except at most one, the exit.

use bit_set::BitSet;
use petgraph::graph;
use petgraph::{Graph, Undirected};
use serde_derive::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::slice;
use std::u32;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary, Wallboard};
use crate::errors::*;
use crate::grid_iterators::{RectGridCellIter, RectRowIter};
use crate::units::{EdgesCount, Height, NodesCount, Width};

pub type CoordinateSmallVec = SmallVec<[Cartesian2DCoordinate; 4]>;
pub type WallboardSmallVec = SmallVec<[Wallboard; 4]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellLinkError {
    InvalidGridCoordinate,
    SelfLink,
    NotAdjacent,
}

/// Rectangular block of cells with every internal wall removed.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Room {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Room {
        Room { x, y, width, height }
    }

    pub fn contains(&self, coord: Cartesian2DCoordinate) -> bool {
        coord.x >= self.x && coord.x - self.x < self.width && coord.y >= self.y &&
        coord.y - self.y < self.height
    }

    /// Bottom right cell, None for an empty room or one reaching past `u32::MAX`.
    pub fn far_corner(&self) -> Option<Cartesian2DCoordinate> {
        let x = self.x.checked_add(self.width)?.checked_sub(1)?;
        let y = self.y.checked_add(self.height)?.checked_sub(1)?;
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(Cartesian2DCoordinate::new(x, y))
    }

    /// Do the rooms overlap once `self` is grown by `margin` cells on every side?
    pub fn overlaps(&self, other: &Room, margin: u32) -> bool {
        let (x, y, w, h, m) = (self.x as u64, self.y as u64, self.width as u64, self.height as u64,
                               margin as u64);
        let (ox, oy, ow, oh) = (other.x as u64, other.y as u64, other.width as u64,
                                other.height as u64);
        let left = x.saturating_sub(m);
        let top = y.saturating_sub(m);
        left < ox + ow && ox < x + w + m && top < oy + oh && oy < y + h + m
    }

    pub fn cells(&self) -> impl Iterator<Item = Cartesian2DCoordinate> {
        let room = *self;
        (room.y..room.y.saturating_add(room.height))
            .flat_map(move |y| {
                (room.x..room.x.saturating_add(room.width))
                    .map(move |x| Cartesian2DCoordinate::new(x, y))
            })
    }
}

#[derive(Clone)]
pub struct Grid {
    graph: Graph<(), (), Undirected, u32>,
    width: Width,
    height: Height,
    exit: Option<Wallboard>,
    rooms: Vec<Room>,
    room_cells: BitSet,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Grid :: graph: {:?}, width: {:?}, height: {:?}, exit: {:?}, rooms: {:?}",
               self.graph,
               self.width,
               self.height,
               self.exit,
               self.rooms)
    }
}

impl Grid {
    /// A grid of `width` * `height` cells with every wallboard up and no exit.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        let (Width(w), Height(h)) = (width, height);
        let too_large = w.checked_mul(h).map_or(true, |size| size >= u32::MAX as usize);
        if w == 0 || h == 0 || too_large {
            bail!(ErrorKind::InvalidDimensions(w, h));
        }

        let (NodesCount(nodes), EdgesCount(edges)) = Grid::graph_size(width, height);
        let mut graph = Graph::with_capacity(nodes, edges);
        for _ in 0..nodes {
            let _ = graph.add_node(());
        }

        Ok(Grid {
            graph,
            width,
            height,
            exit: None,
            rooms: vec![],
            room_cells: BitSet::with_capacity(nodes),
        })
    }

    fn graph_size(width: Width, height: Height) -> (NodesCount, EdgesCount) {
        let cells_count = width.0 * height.0;
        // Every interior wall knocked down, the densest a maze gets.
        let edges_count_hint = (width.0 - 1) * height.0 + width.0 * (height.0 - 1);
        (NodesCount(cells_count), EdgesCount(edges_count_hint))
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.width.0 * self.height.0
    }

    #[inline]
    pub fn links_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Link two adjacent cells, removing the wallboard between them.
    /// Linking already linked cells is a no-op.
    pub fn link(&mut self,
                a: Cartesian2DCoordinate,
                b: Cartesian2DCoordinate)
                -> ::std::result::Result<(), CellLinkError> {
        if a == b {
            return Err(CellLinkError::SelfLink);
        }
        let a_index_opt = self.grid_coordinate_graph_index(a);
        let b_index_opt = self.grid_coordinate_graph_index(b);
        match (a_index_opt, b_index_opt) {
            (Some(a_index), Some(b_index)) => {
                if !self.is_neighbour(a, b) {
                    return Err(CellLinkError::NotAdjacent);
                }
                let _ = self.graph.update_edge(a_index, b_index, ());
                Ok(())
            }
            _ => Err(CellLinkError::InvalidGridCoordinate),
        }
    }

    /// Unlink two cells, if the grid coordinates are valid and a link exists between them.
    /// Returns true if an unlink occurred.
    pub fn unlink(&mut self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        let a_index_opt = self.grid_coordinate_graph_index(a);
        let b_index_opt = self.grid_coordinate_graph_index(b);

        if let (Some(a_index), Some(b_index)) = (a_index_opt, b_index_opt) {
            if let Some(edge_index) = self.graph.find_edge(a_index, b_index) {
                // Invalidates the last edge index in the graph, which is fine as we
                // are not storing them for any reason.
                self.graph.remove_edge(edge_index);
                return true;
            }
        }

        false
    }

    /// Cells that are linked to a particular cell by a passage.
    pub fn links(&self, coord: Cartesian2DCoordinate) -> Option<CoordinateSmallVec> {
        self.grid_coordinate_graph_index(coord).map(|graph_node_index| {
            let row_length = self.width.0;
            self.graph
                .neighbors(graph_node_index)
                .map(|linked| Cartesian2DCoordinate::from_row_major_index(linked.index(), row_length))
                .collect()
        })
    }

    /// Cells that are to the North, East, South or West of a particular cell, but not
    /// necessarily linked by a passage.
    pub fn neighbours(&self, coord: Cartesian2DCoordinate) -> CoordinateSmallVec {
        CompassPrimary::ALL
            .iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        coord.offset(direction).and_then(|neighbour_coord| {
            if self.is_valid_coordinate(neighbour_coord) {
                Some(neighbour_coord)
            } else {
                None
            }
        })
    }

    /// Are two cells in the grid linked?
    pub fn is_linked(&self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        let a_index_opt = self.grid_coordinate_graph_index(a);
        let b_index_opt = self.grid_coordinate_graph_index(b);
        if let (Some(a_index), Some(b_index)) = (a_index_opt, b_index_opt) {
            self.graph.find_edge(a_index, b_index).is_some()
        } else {
            false
        }
    }

    pub fn is_neighbour_linked(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false, |neighbour_coord| self.is_linked(coord, neighbour_coord))
    }

    /// Is the wallboard on side `direction` of cell `coord` up?
    ///
    /// Interior wallboards are up unless the cells are linked, exterior ones unless they are
    /// the exit. Anything outside the grid counts as solid wall.
    pub fn has_wall(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        if !self.is_valid_coordinate(coord) {
            return true;
        }
        match self.neighbour_at_direction(coord, direction) {
            Some(neighbour_coord) => !self.is_linked(coord, neighbour_coord),
            None => self.exit != Some(Wallboard { cell: coord, direction }),
        }
    }

    #[inline]
    pub fn has_wallboard(&self, wallboard: Wallboard) -> bool {
        self.has_wall(wallboard.cell, wallboard.direction)
    }

    /// Take down an interior wallboard; both sides go as they are one wall.
    pub fn remove_wallboard(&mut self, wallboard: Wallboard) -> ::std::result::Result<(), CellLinkError> {
        let neighbour = self.neighbour_at_direction(wallboard.cell, wallboard.direction)
            .ok_or(CellLinkError::InvalidGridCoordinate)?;
        self.link(wallboard.cell, neighbour)
    }

    /// Put an interior wallboard back up. Returns true if it was down.
    pub fn add_wallboard(&mut self, wallboard: Wallboard) -> bool {
        match self.neighbour_at_direction(wallboard.cell, wallboard.direction) {
            Some(neighbour) => self.unlink(wallboard.cell, neighbour),
            None => false,
        }
    }

    /// Is the wallboard on the outer boundary of the grid?
    pub fn is_part_of_border(&self, wallboard: Wallboard) -> bool {
        self.is_valid_coordinate(wallboard.cell) &&
        self.neighbour_at_direction(wallboard.cell, wallboard.direction).is_none()
    }

    /// Exterior wallboards of a cell in N/E/S/W order, empty for inner cells.
    pub fn border_wallboards(&self, coord: Cartesian2DCoordinate) -> WallboardSmallVec {
        CompassPrimary::ALL
            .iter()
            .map(|dir| Wallboard { cell: coord, direction: *dir })
            .filter(|wallboard| self.is_part_of_border(*wallboard))
            .collect()
    }

    /// Make `wallboard` the one missing exterior wall. Any previous exit is walled up again.
    pub fn set_exit(&mut self, wallboard: Wallboard) -> Result<()> {
        if !self.is_part_of_border(wallboard) {
            bail!(ErrorKind::InvalidWallboard(wallboard));
        }
        self.exit = Some(wallboard);
        Ok(())
    }

    #[inline]
    pub fn exit_wallboard(&self) -> Option<Wallboard> {
        self.exit
    }

    #[inline]
    pub fn exit_position(&self) -> Option<Cartesian2DCoordinate> {
        self.exit.map(|wallboard| wallboard.cell)
    }

    #[inline]
    pub fn is_exit_position(&self, coord: Cartesian2DCoordinate) -> bool {
        self.exit_position() == Some(coord)
    }

    /// Carve a room: every wall inside the rectangle comes down and its cells are marked.
    pub fn add_room(&mut self, room: Room) -> Result<()> {
        match room.far_corner() {
            Some(corner) if self.is_valid_coordinate(corner) => {}
            _ => bail!(ErrorKind::InvalidDimensions(room.width as usize, room.height as usize)),
        }

        for coord in room.cells() {
            for dir in &[CompassPrimary::East, CompassPrimary::South] {
                if let Some(neighbour) = self.neighbour_at_direction(coord, *dir) {
                    if room.contains(neighbour) && self.link(coord, neighbour).is_err() {
                        bail!(ErrorKind::InvalidDimensions(room.width as usize,
                                                           room.height as usize));
                    }
                }
            }
            if let Some(index) = self.grid_coordinate_to_index(coord) {
                self.room_cells.insert(index);
            }
        }
        self.rooms.push(room);
        Ok(())
    }

    pub fn is_in_room(&self, coord: Cartesian2DCoordinate) -> bool {
        self.grid_coordinate_to_index(coord)
            .map_or(false, |index| self.room_cells.contains(index))
    }

    #[inline]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Every interior wallboard still up, each listed once in its East/South form.
    pub fn interior_walls(&self) -> Vec<Wallboard> {
        let mut walls = vec![];
        for coord in self.iter() {
            for dir in &[CompassPrimary::East, CompassPrimary::South] {
                if let Some(neighbour) = self.neighbour_at_direction(coord, *dir) {
                    if !self.is_linked(coord, neighbour) {
                        walls.push(Wallboard { cell: coord, direction: *dir });
                    }
                }
            }
        }
        walls
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn iter(&self) -> RectGridCellIter {
        RectGridCellIter::new(self.width, self.height)
    }

    #[inline]
    pub fn iter_row(&self) -> RectRowIter {
        RectRowIter::new(self.width, self.height)
    }

    pub fn iter_links(&self) -> LinksIter {
        LinksIter {
            graph_edge_iter: self.graph.raw_edges().iter(),
            row_length: self.width.0,
        }
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }

    fn is_neighbour(&self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        self.neighbours(a).iter().any(|&coord| coord == b)
    }

    /// Convert a grid coordinate into petgraph nodeindex
    /// Returns None if the grid coordinate is invalid (out of the grid's dimensions).
    #[inline]
    fn grid_coordinate_graph_index(&self, coord: Cartesian2DCoordinate) -> Option<graph::NodeIndex<u32>> {
        self.grid_coordinate_to_index(coord).map(graph::NodeIndex::<u32>::new)
    }
}

pub struct LinksIter<'a> {
    graph_edge_iter: slice::Iter<'a, graph::Edge<(), u32>>,
    row_length: usize,
}

impl<'a> Iterator for LinksIter<'a> {
    type Item = (Cartesian2DCoordinate, Cartesian2DCoordinate);

    fn next(&mut self) -> Option<Self::Item> {
        let row_length = self.row_length;
        self.graph_edge_iter.next().map(|edge| {
            let src_cell_coord = Cartesian2DCoordinate::from_row_major_index(edge.source().index(),
                                                                             row_length);
            let dst_cell_coord = Cartesian2DCoordinate::from_row_major_index(edge.target().index(),
                                                                             row_length);
            (src_cell_coord, dst_cell_coord)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}
impl<'a> ExactSizeIterator for LinksIter<'a> {} // default impl using size_hint()

impl<'a> fmt::Debug for LinksIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LinksIter :: edges iter : {:?}", self.graph_edge_iter)
    }
}
