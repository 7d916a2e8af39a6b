mod error;

use std::collections::VecDeque;

pub use error::*;

use crate::{Cell, Color, Field, PlayerId};

/// Read-only, row-major view of one snapshot of the playing field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major, `width * height` entries.
    cells: Vec<Cell>,
}

/// The four orthogonal neighbours of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// The cells a player would annex by claiming a color, split by how the
/// flood first reached them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FloodGain {
    /// Cells entered through an up/down step.
    pub vertical: usize,
    /// Cells entered through a left/right step.
    pub horizontal: usize,
}

impl FloodGain {
    pub fn total(&self) -> usize {
        self.vertical + self.horizontal
    }
}

impl Board {
    /// Chunks `cells` into rows of `width` cells.
    pub fn new(cells: Vec<Cell>, width: usize) -> Result<Self, ShapeError> {
        if width == 0 {
            return Err(ShapeError::ZeroWidth);
        }
        if cells.len() % width != 0 {
            return Err(ShapeError::NotAMultipleOfWidth {
                num_cells: cells.len(),
                width,
            });
        }
        Ok(Self {
            width,
            height: cells.len() / width,
            cells,
        })
    }

    /// Like [`Self::new()`], additionally checking the height the server declared.
    pub fn from_field(field: &Field) -> Result<Self, ShapeError> {
        let board = Self::new(field.cells.clone(), field.width)?;
        match field.height {
            Some(declared) if declared != board.height => Err(ShapeError::HeightMismatch {
                declared,
                derived: board.height,
            }),
            _ => Ok(board),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Result<&Cell, BoundsError> {
        if row >= self.height || col >= self.width {
            return Err(BoundsError {
                row,
                col: Some(col),
                height: self.height,
                width: self.width,
            });
        }
        Ok(&self.cells[row * self.width + col])
    }

    /// Who owns the cell, [`UNCLAIMED`](crate::UNCLAIMED) if nobody does.
    pub fn owner_at(&self, row: usize, col: usize) -> Result<PlayerId, BoundsError> {
        self.cell_at(row, col).map(|cell| cell.player_id)
    }

    pub fn row(&self, row: usize) -> Result<&[Cell], BoundsError> {
        if row >= self.height {
            return Err(BoundsError {
                row,
                col: None,
                height: self.height,
                width: self.width,
            });
        }
        Ok(&self.cells[row * self.width..(row + 1) * self.width])
    }

    /// `None` for a board without rows.
    pub fn last_row(&self) -> Option<&[Cell]> {
        self.height.checked_sub(1).and_then(|i| self.row(i).ok())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks_exact(self.width)
    }

    pub fn column(&self, col: usize) -> Result<impl Iterator<Item = &Cell> + '_, BoundsError> {
        if col >= self.width {
            return Err(BoundsError {
                row: 0,
                col: Some(col),
                height: self.height,
                width: self.width,
            });
        }
        Ok(self.cells.iter().skip(col).step_by(self.width))
    }

    /// All cells with their `(row, col)` coordinates, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (idx / self.width, idx % self.width, cell))
    }

    /// Coordinates of the cells owned by `player`.
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.iter()
            .filter(move |(_, _, cell)| cell.player_id == player)
            .map(|(i, j, _)| (i, j))
    }

    pub fn count_owned(&self, player: PlayerId) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.player_id == player)
            .count()
    }

    /// The in-bounds orthogonal neighbours of `(row, col)`.
    pub fn neighbors(
        &self,
        row: usize,
        col: usize,
    ) -> impl Iterator<Item = (Direction, usize, usize)> + '_ {
        DIRECTIONS.into_iter().filter_map(move |dir| {
            let (i, j) = match dir {
                Direction::Up => (row.checked_sub(1)?, col),
                Direction::Down => (row + 1, col),
                Direction::Left => (row, col.checked_sub(1)?),
                Direction::Right => (row, col + 1),
            };
            (i < self.height && j < self.width).then_some((dir, i, j))
        })
    }

    /// Counts the cells `player` would annex by switching to `color`.
    ///
    /// The flood starts at every cell owned by `player` and spreads through
    /// unclaimed cells of `color`, so chains of same-colored cells are
    /// annexed as a whole. Each annexed cell is attributed to the direction
    /// of the step through which the flood first reached it.
    pub fn flood_gain(&self, player: PlayerId, color: Color) -> FloodGain {
        let mut visited = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();
        for (i, j) in self.owned_by(player) {
            visited[i * self.width + j] = true;
            queue.push_back((i, j));
        }

        let mut gain = FloodGain::default();
        while let Some((i, j)) = queue.pop_front() {
            for (dir, ni, nj) in self.neighbors(i, j) {
                let idx = ni * self.width + nj;
                let cell = &self.cells[idx];
                if visited[idx] || cell.is_claimed() || cell.color != Some(color) {
                    continue;
                }
                visited[idx] = true;
                if dir.is_vertical() {
                    gain.vertical += 1;
                } else {
                    gain.horizontal += 1;
                }
                queue.push_back((ni, nj));
            }
        }
        gain
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;

    quickcheck! {
        fn rows_have_the_given_width(cells: Vec<Cell>, width: u8) -> bool {
            let width = width as usize;
            let num_cells = cells.len();
            match Board::new(cells, width) {
                Ok(board) => {
                    width > 0
                        && num_cells % width == 0
                        && board.height() == num_cells / width
                        && board.rows().count() == num_cells / width
                        && board.rows().all(|row| row.len() == width)
                }
                Err(ShapeError::ZeroWidth) => width == 0,
                Err(ShapeError::NotAMultipleOfWidth { .. }) => width > 0 && num_cells % width != 0,
                Err(ShapeError::HeightMismatch { .. }) => false,
            }
        }
    }

    fn cell(player_id: PlayerId) -> Cell {
        Cell {
            player_id,
            color: None,
        }
    }

    #[test]
    fn shape_errors() {
        assert_eq!(
            Board::new(vec![cell(0); 5], 2),
            Err(ShapeError::NotAMultipleOfWidth {
                num_cells: 5,
                width: 2
            })
        );
        assert_eq!(Board::new(vec![cell(0); 4], 0), Err(ShapeError::ZeroWidth));

        let field = Field {
            width: 2,
            height: Some(3),
            cells: vec![cell(0); 4],
        };
        assert_eq!(
            Board::from_field(&field),
            Err(ShapeError::HeightMismatch {
                declared: 3,
                derived: 2
            })
        );
    }

    #[test]
    fn lookups() {
        let board = Board::new(vec![cell(1), cell(2), cell(0), cell(0), cell(0), cell(2)], 3).unwrap();
        assert_eq!(board.height(), 2);
        assert_eq!(board.owner_at(0, 1), Ok(2));
        assert_eq!(board.owner_at(1, 2), Ok(2));
        assert_eq!(
            board.cell_at(2, 0),
            Err(BoundsError {
                row: 2,
                col: Some(0),
                height: 2,
                width: 3
            })
        );
        assert!(board.cell_at(0, 3).is_err());
        assert!(board.row(2).is_err());
        assert_eq!(board.last_row(), Some(&[cell(0), cell(0), cell(2)][..]));
        let col: Vec<PlayerId> = board.column(1).unwrap().map(|c| c.player_id).collect();
        assert_eq!(col, vec![2, 0]);
        assert!(board.column(3).is_err());
        assert_eq!(board.count_owned(2), 2);
        assert_eq!(board.owned_by(1).collect::<Vec<_>>(), vec![(0, 0)]);
    }

    #[test]
    fn empty_board() {
        let board = Board::new(vec![], 3).unwrap();
        assert_eq!(board.height(), 0);
        assert_eq!(board.last_row(), None);
        assert_eq!(board.rows().count(), 0);
        assert_eq!(board.flood_gain(1, Color::Red), FloodGain::default());
    }

    #[test]
    fn neighbors_at_corner() {
        let board = Board::new(vec![cell(0); 9], 3).unwrap();
        let corner: Vec<_> = board.neighbors(0, 0).collect();
        assert_eq!(
            corner,
            vec![(Direction::Down, 1, 0), (Direction::Right, 0, 1)]
        );
        assert_eq!(board.neighbors(1, 1).count(), 4);
    }

    #[test]
    fn flood_follows_chains() {
        // 1 r r
        // r g r
        // r r 2
        let board = Board::from_diagram(&["1rr", "rgr", "rr2"]).unwrap();
        let gain = board.flood_gain(1, Color::Red);
        assert_eq!(gain.total(), 6);
        assert_eq!(gain, FloodGain { vertical: 3, horizontal: 3 });

        assert_eq!(board.flood_gain(1, Color::Green), FloodGain::default());
        assert_eq!(board.flood_gain(2, Color::Red).total(), 6);
        // Nobody owns anything as player 3
        assert_eq!(board.flood_gain(3, Color::Red), FloodGain::default());
    }

    #[test]
    fn flood_direction_split() {
        // The column below player 1 is entered vertically, the row to the right horizontally
        let board = Board::from_diagram(&["1bb", "b..", "b.."]).unwrap();
        assert_eq!(
            board.flood_gain(1, Color::Blue),
            FloodGain {
                vertical: 2,
                horizontal: 2
            }
        );
    }
}
