/// The error type for [`Board::new()`](crate::Board::new), i.e. for a cell list
/// that does not form a rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    ZeroWidth,
    NotAMultipleOfWidth { num_cells: usize, width: usize },
    HeightMismatch { declared: usize, derived: usize },
}

impl std::error::Error for ShapeError {}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::ZeroWidth => write!(f, "The field has a width of zero"),
            ShapeError::NotAMultipleOfWidth { num_cells, width } => write!(
                f,
                "The field has {} cells, which is not a multiple of its width {}",
                num_cells, width
            ),
            ShapeError::HeightMismatch { declared, derived } => write!(
                f,
                "The field declares a height of {}, but its cells make up {} rows",
                declared, derived
            ),
        }
    }
}

/// Returned when looking up a cell or row outside of the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundsError {
    pub row: usize,
    pub col: Option<usize>,
    pub height: usize,
    pub width: usize,
}

impl std::error::Error for BoundsError {}

impl std::fmt::Display for BoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.col {
            Some(col) => write!(
                f,
                "Cell ({}, {}) is outside of the {}x{} board",
                self.row, col, self.height, self.width
            ),
            None => write!(
                f,
                "Row {} is outside of the {}x{} board",
                self.row, self.height, self.width
            ),
        }
    }
}
