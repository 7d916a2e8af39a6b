use std::time::Duration;

use filler::PlayerId;

use crate::ConfigError;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Everything the turn loop needs to know for the whole game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnConfig {
    /// Always ends with a slash.
    server: String,
    game_id: String,
    /// Sent to the server as given on the command line.
    player_id: String,
    /// `player_id` as it appears in the cells of the field.
    player: PlayerId,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How often a failed request is retried before giving up.
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// How long to wait before checking again whether it's our turn.
    pub poll_interval: Duration,
}

impl TurnConfig {
    pub fn new(server: &str, game_id: &str, player_id: &str) -> Result<Self, ConfigError> {
        let server = non_empty(server, "gameServer")?;
        let game_id = non_empty(game_id, "gameId")?;
        let player_id = non_empty(player_id, "playerId")?;
        let player = match player_id.parse::<PlayerId>() {
            Ok(player) if player > 0 => player,
            _ => return Err(ConfigError::InvalidPlayerId(player_id)),
        };

        let mut server = server;
        if !server.ends_with('/') {
            server.push('/');
        }

        Ok(Self {
            server,
            game_id,
            player_id,
            player,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        })
    }

    /// The URL used for both fetching the game and submitting moves.
    pub fn game_url(&self) -> String {
        format!("{}game/{}", self.server, self.game_id)
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }
}

fn non_empty(value: &str, name: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ConfigError::MissingValue(name))
    } else {
        Ok(String::from(value))
    }
}
