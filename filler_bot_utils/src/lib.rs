mod client;
mod config;
mod error;
mod turn;
pub use client::*;
pub use config::*;
pub use error::*;
pub use turn::*;

use std::sync::atomic::AtomicBool;

use filler::{Color, NoSafeColorError, PlayerId};

/// A trait to simplify writing bots.
pub trait Bot {
    /// Picks the color to claim this turn. Must be one of `turn.safe_colors`.
    fn play_turn(&mut self, turn: &Turn) -> Result<Color, NoSafeColorError>;

    /// Plays until the server reports a winner, and returns the winner's id.
    ///
    /// `stop` is checked before every request; once it is set the loop
    /// ends with [`TurnError::Interrupted`].
    fn run<S: GameServer>(
        &mut self,
        server: &mut S,
        config: &TurnConfig,
        stop: &AtomicBool,
    ) -> Result<PlayerId, TurnError>
    where
        Self: Sized,
    {
        play_game(self, server, config, stop)
    }
}
