use std::cmp::Reverse;

use filler::{Board, Color, FloodGain, NoSafeColorError, PlayerId};
use filler_bot_utils::{Bot, Turn};
use tracing::debug;

/// How much each part of a candidate's evaluation counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Weights {
    /// Per cell gained towards the top or bottom edge.
    pub vertical: u64,
    /// Bonus for taking the opponent's best color away.
    pub block: u64,
    /// Per cell gained sideways.
    pub horizontal: u64,
}

impl Weights {
    /// Weights under which vertical gain always wins over blocking, and
    /// blocking always wins over horizontal gain, on a board of `num_cells`.
    ///
    /// No gain can exceed `num_cells`, so a single vertical cell outweighs
    /// the block bonus plus any horizontal gain.
    pub fn lexicographic(num_cells: usize) -> Self {
        let n = num_cells as u64;
        Self {
            vertical: 2 * (n + 1),
            block: n + 1,
            horizontal: 1,
        }
    }
}

/// What claiming one safe color would do this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub color: Color,
    pub gain: FloodGain,
    /// Cells the opponent would annex with this color.
    pub opponent_gain: usize,
    /// This is the opponent's single best color.
    pub blocks_opponent: bool,
}

impl Candidate {
    pub fn score(&self, weights: &Weights) -> u64 {
        self.gain.vertical as u64 * weights.vertical
            + if self.blocks_opponent { weights.block } else { 0 }
            + self.gain.horizontal as u64 * weights.horizontal
    }
}

/// Evaluates every safe color for `player`.
pub fn evaluate(
    board: &Board,
    player: PlayerId,
    opponent: PlayerId,
    safe_colors: &[Color],
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = safe_colors
        .iter()
        .map(|&color| Candidate {
            color,
            gain: board.flood_gain(player, color),
            opponent_gain: board.flood_gain(opponent, color).total(),
            blocks_opponent: false,
        })
        .collect();

    // Only block when the opponent has one clearly best color
    let best = candidates.iter().map(|c| c.opponent_gain).max().unwrap_or(0);
    let num_best = candidates.iter().filter(|c| c.opponent_gain == best).count();
    if best > 0 && num_best == 1 {
        for candidate in candidates.iter_mut() {
            candidate.blocks_opponent = candidate.opponent_gain == best;
        }
    }
    candidates
}

/// Grows towards the top and bottom edges first, blocks the opponent's best
/// color second, and grows sideways last. Ties go to the color that comes
/// first in the palette.
#[derive(Clone, Debug, Default)]
pub struct FrontierBot {
    /// `None` means [`Weights::lexicographic()`] for the current board.
    weights: Option<Weights>,
}

impl FrontierBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: Weights) -> Self {
        Self {
            weights: Some(weights),
        }
    }

    pub fn choose(
        &self,
        board: &Board,
        player: PlayerId,
        opponent: PlayerId,
        safe_colors: &[Color],
    ) -> Result<Color, NoSafeColorError> {
        let weights = self
            .weights
            .unwrap_or_else(|| Weights::lexicographic(board.num_cells()));
        let candidates = evaluate(board, player, opponent, safe_colors);
        for candidate in &candidates {
            debug!(
                color = %candidate.color,
                vertical = candidate.gain.vertical,
                horizontal = candidate.gain.horizontal,
                opponent_gain = candidate.opponent_gain,
                blocks = candidate.blocks_opponent,
                score = candidate.score(&weights),
                "Candidate"
            );
        }
        candidates
            .into_iter()
            .max_by_key(|c| (c.score(&weights), Reverse(c.color.palette_index())))
            .map(|c| c.color)
            .ok_or(NoSafeColorError)
    }
}

impl Bot for FrontierBot {
    fn play_turn(&mut self, turn: &Turn) -> Result<Color, NoSafeColorError> {
        self.choose(turn.board, turn.player, turn.opponent, turn.safe_colors)
    }
}
