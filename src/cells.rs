use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use std::convert::From;

use crate::units::{ColumnIndex, RowIndex};

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Cartesian2DCoordinate {
    pub x: u32,
    pub y: u32,
}

impl Cartesian2DCoordinate {
    pub fn new(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate { x, y }
    }

    #[inline]
    pub fn from_row_major_index(index: usize, row_length: usize) -> Cartesian2DCoordinate {
        let x = index % row_length;
        let y = index / row_length;
        Cartesian2DCoordinate::new(x as u32, y as u32)
    }

    #[inline]
    pub fn from_row_column_indices(col_index: ColumnIndex, row_index: RowIndex) -> Self {
        let (ColumnIndex(col), RowIndex(row)) = (col_index, row_index);
        Cartesian2DCoordinate::new(col as u32, row as u32)
    }

    /// Coordinate one step away in `dir`. None if that is not representable, which only
    /// happens going North from row 0 or West from column 0.
    /// The caller still has to check the result lies within its grid.
    pub fn offset(&self, dir: CompassPrimary) -> Option<Cartesian2DCoordinate> {
        let (x, y) = (self.x, self.y);
        match dir {
            CompassPrimary::North => y.checked_sub(1).map(|y| Cartesian2DCoordinate::new(x, y)),
            CompassPrimary::South => y.checked_add(1).map(|y| Cartesian2DCoordinate::new(x, y)),
            CompassPrimary::East => x.checked_add(1).map(|x| Cartesian2DCoordinate::new(x, y)),
            CompassPrimary::West => x.checked_sub(1).map(|x| Cartesian2DCoordinate::new(x, y)),
        }
    }
}

impl From<(u32, u32)> for Cartesian2DCoordinate {
    fn from(x_y_pair: (u32, u32)) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

/// Absolute (cardinal) direction in the maze. y grows towards the South.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

impl CompassPrimary {
    /// Candidate order used wherever ties between directions are broken.
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    #[inline]
    fn quarter_turns(self) -> u8 {
        match self {
            CompassPrimary::North => 0,
            CompassPrimary::East => 1,
            CompassPrimary::South => 2,
            CompassPrimary::West => 3,
        }
    }

    #[inline]
    fn from_quarter_turns(turns: u8) -> CompassPrimary {
        CompassPrimary::ALL[(turns % 4) as usize]
    }

    pub fn opposite(self) -> CompassPrimary {
        CompassPrimary::from_quarter_turns(self.quarter_turns() + 2)
    }

    pub fn rotate_clockwise(self) -> CompassPrimary {
        CompassPrimary::from_quarter_turns(self.quarter_turns() + 1)
    }

    pub fn rotate_counter_clockwise(self) -> CompassPrimary {
        CompassPrimary::from_quarter_turns(self.quarter_turns() + 3)
    }

    /// Heading after turning on the spot.
    pub fn turned(self, turn: Turn) -> CompassPrimary {
        match turn {
            Turn::Left => self.rotate_counter_clockwise(),
            Turn::Right => self.rotate_clockwise(),
            Turn::Around => self.opposite(),
        }
    }

    /// The absolute direction a robot facing `self` sees as `relative`.
    pub fn towards(self, relative: RelativeDirection) -> CompassPrimary {
        CompassPrimary::from_quarter_turns(self.quarter_turns() + relative.quarter_turns())
    }

    /// Inverse of `towards`: how a robot facing `self` sees the absolute direction `other`.
    pub fn relative_to(self, other: CompassPrimary) -> RelativeDirection {
        RelativeDirection::from_quarter_turns(other.quarter_turns() + 4 - self.quarter_turns())
    }

    /// The turn that changes heading `self` into `target`, None if already facing it.
    pub fn turn_towards(self, target: CompassPrimary) -> Option<Turn> {
        match self.relative_to(target) {
            RelativeDirection::Forward => None,
            RelativeDirection::Right => Some(Turn::Right),
            RelativeDirection::Backward => Some(Turn::Around),
            RelativeDirection::Left => Some(Turn::Left),
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> CompassPrimary {
        CompassPrimary::ALL[rng.gen_range(0..4)]
    }
}

/// A turn on the spot.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum Turn {
    Left,
    Right,
    Around,
}

impl Turn {
    pub fn quarter_turns(self) -> u8 {
        match self {
            Turn::Left | Turn::Right => 1,
            Turn::Around => 2,
        }
    }

    pub fn reversed(self) -> Turn {
        match self {
            Turn::Left => Turn::Right,
            Turn::Right => Turn::Left,
            Turn::Around => Turn::Around,
        }
    }

    /// Turn that rotates the robot clockwise by `quarter_turns`, None for a full circle.
    pub fn clockwise(quarter_turns: u8) -> Option<Turn> {
        match quarter_turns % 4 {
            1 => Some(Turn::Right),
            2 => Some(Turn::Around),
            3 => Some(Turn::Left),
            _ => None,
        }
    }
}

/// Direction from the robot's point of view, relative to its current heading.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum RelativeDirection {
    Left,
    Right,
    Forward,
    Backward,
}

impl RelativeDirection {
    pub const ALL: [RelativeDirection; 4] = [RelativeDirection::Left,
                                             RelativeDirection::Right,
                                             RelativeDirection::Forward,
                                             RelativeDirection::Backward];

    /// Clockwise quarter turns from the robot's forward direction.
    pub fn quarter_turns(self) -> u8 {
        match self {
            RelativeDirection::Forward => 0,
            RelativeDirection::Right => 1,
            RelativeDirection::Backward => 2,
            RelativeDirection::Left => 3,
        }
    }

    fn from_quarter_turns(turns: u8) -> RelativeDirection {
        match turns % 4 {
            0 => RelativeDirection::Forward,
            1 => RelativeDirection::Right,
            2 => RelativeDirection::Backward,
            _ => RelativeDirection::Left,
        }
    }

    pub fn opposite(self) -> RelativeDirection {
        RelativeDirection::from_quarter_turns(self.quarter_turns() + 2)
    }

    /// Index into per-sensor arrays, in `ALL` order.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            RelativeDirection::Left => 0,
            RelativeDirection::Right => 1,
            RelativeDirection::Forward => 2,
            RelativeDirection::Backward => 3,
        }
    }
}

/// The wall segment on one side of one cell. The same physical wall seen from the neighbour
/// is `mirrored()`.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Wallboard {
    pub cell: Cartesian2DCoordinate,
    pub direction: CompassPrimary,
}

impl Wallboard {
    pub fn new(x: u32, y: u32, direction: CompassPrimary) -> Wallboard {
        Wallboard {
            cell: Cartesian2DCoordinate::new(x, y),
            direction,
        }
    }

    /// The cell on the far side, if representable.
    pub fn neighbour(&self) -> Option<Cartesian2DCoordinate> {
        self.cell.offset(self.direction)
    }

    /// The same wall seen from the other side.
    pub fn mirrored(&self) -> Option<Wallboard> {
        self.neighbour().map(|cell| Wallboard {
            cell,
            direction: self.direction.opposite(),
        })
    }

    /// East/South form of an interior wall so both sides compare equal.
    pub fn canonical(&self) -> Wallboard {
        match self.direction {
            CompassPrimary::North | CompassPrimary::West => self.mirrored().unwrap_or(*self),
            CompassPrimary::East | CompassPrimary::South => *self,
        }
    }
}
