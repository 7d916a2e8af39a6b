use crate::{Board, Cell, Color, ShapeError, PALETTE};

fn cell_char(cell: &Cell) -> char {
    if cell.is_claimed() {
        char::from_digit(cell.player_id, 10).unwrap_or('#')
    } else {
        cell.color.map(Color::initial).unwrap_or('.')
    }
}

impl Board {
    /// Builds a board from one string per row, using the characters that
    /// [`visualize_board()`] prints: a digit is a cell owned by that player,
    /// a color initial is an unclaimed cell of that color, and anything else
    /// is an unclaimed cell of unknown color.
    ///
    /// Mostly useful for writing down positions in tests.
    pub fn from_diagram(rows: &[&str]) -> Result<Board, ShapeError> {
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(1);
        let cells: Vec<Cell> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| match c.to_digit(10) {
                Some(player_id) => Cell {
                    player_id,
                    color: None,
                },
                None => Cell {
                    player_id: 0,
                    color: PALETTE.into_iter().find(|color| color.initial() == c),
                },
            })
            .collect();
        Board::new(cells, width)
    }
}

/// Renders the board in a box, one character per cell.
pub fn visualize_board(board: &Board) -> String {
    let mut result = String::from("╭");
    for _ in 0..board.width() {
        result.push('─');
    }
    result += "╮\n";
    for row in board.rows() {
        result.push('│');
        result.extend(row.iter().map(cell_char));
        result += "│\n";
    }
    result.push('╰');
    for _ in 0..board.width() {
        result.push('─');
    }
    result.push('╯');
    result
}
