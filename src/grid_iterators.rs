use std::fmt;

use crate::cells::Cartesian2DCoordinate;
use crate::units::{ColumnIndex, Height, RowIndex, Width};

#[derive(Clone)]
pub struct RectGridCellIter {
    row_length: usize,
    current_cell_number: usize,
    cells_count: usize,
}

impl RectGridCellIter {
    pub fn new(width: Width, height: Height) -> RectGridCellIter {
        RectGridCellIter {
            row_length: width.0,
            current_cell_number: 0,
            cells_count: width.0 * height.0,
        }
    }
}

impl fmt::Debug for RectGridCellIter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "CellIter :: current_cell_number: {:?}, cells_count: {:?}",
               self.current_cell_number,
               self.cells_count)
    }
}

impl ExactSizeIterator for RectGridCellIter {} // default impl using size_hint()
impl Iterator for RectGridCellIter {
    type Item = Cartesian2DCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = Cartesian2DCoordinate::from_row_major_index(self.current_cell_number,
                                                                    self.row_length);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}

/// Yields the grid one row at a time, top (North) to bottom.
#[derive(Debug, Copy, Clone)]
pub struct RectRowIter {
    current_row: usize,
    row_length: usize,
    rows_count: usize,
}

impl RectRowIter {
    pub fn new(width: Width, height: Height) -> RectRowIter {
        RectRowIter {
            current_row: 0,
            row_length: width.0,
            rows_count: height.0,
        }
    }
}

impl ExactSizeIterator for RectRowIter {}
impl Iterator for RectRowIter {
    type Item = Vec<Cartesian2DCoordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row < self.rows_count {
            let row = self.current_row;
            let coords = (0..self.row_length)
                .map(|i: usize| {
                    Cartesian2DCoordinate::from_row_column_indices(ColumnIndex(i), RowIndex(row))
                })
                .collect();
            self.current_row += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows_count - self.current_row;
        (remaining, Some(remaining))
    }
}
