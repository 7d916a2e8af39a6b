use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Color;

/// Players are numbered from 1. Cells use 0 for "unclaimed".
pub type PlayerId = u32;

/// The id cells carry when nobody owns them.
pub const UNCLAIMED: PlayerId = 0;

/// Snapshot of a game, as returned by `GET game/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub field: Field,
    /// May be missing once the game is over.
    #[serde(default)]
    pub players: Players,
    #[serde(default)]
    pub current_player_id: Option<PlayerId>,
    /// Only present when the game has ended.
    #[serde(default)]
    pub winner_player_id: Option<PlayerId>,
}

/// The playing field, as a flat row-major list of cells.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Field {
    pub width: usize,
    /// Redundant with `cells.len() / width`. Checked if the server sends it.
    #[serde(default)]
    pub height: Option<usize>,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub player_id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Cell {
    pub fn is_claimed(&self) -> bool {
        self.player_id != UNCLAIMED
    }
}

/// The current color of each player.
///
/// The server has been seen sending this both as an object keyed by the
/// player id and as a list of player objects, so both are accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PlayersRepr")]
pub struct Players(BTreeMap<PlayerId, Color>);

impl Players {
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        self.0.get(&player).copied()
    }

    /// The first listed player that is not `player`.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.0.keys().copied().find(|&id| id != player)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, Color)> + '_ {
        self.0.iter().map(|(&id, &color)| (id, color))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(PlayerId, Color)> for Players {
    fn from_iter<T: IntoIterator<Item = (PlayerId, Color)>>(iter: T) -> Self {
        Players(iter.into_iter().collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlayersRepr {
    ById(BTreeMap<String, PlayerEntry>),
    List(Vec<PlayerEntry>),
}

#[derive(Deserialize)]
struct PlayerEntry {
    #[serde(default)]
    id: Option<PlayerId>,
    color: Color,
}

impl TryFrom<PlayersRepr> for Players {
    type Error = String;

    fn try_from(repr: PlayersRepr) -> Result<Self, Self::Error> {
        match repr {
            PlayersRepr::ById(map) => map
                .into_iter()
                .map(|(key, entry)| {
                    let id = key
                        .parse::<PlayerId>()
                        .map_err(|_| format!("Player key '{}' is not a player id", key))?;
                    Ok((id, entry.color))
                })
                .collect(),
            // Without explicit ids, list position decides: the first entry is player 1
            PlayersRepr::List(entries) => Ok(entries
                .into_iter()
                .enumerate()
                .map(|(idx, entry)| (entry.id.unwrap_or(idx as PlayerId + 1), entry.color))
                .collect()),
        }
    }
}

/// Body of `PUT game/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub player_id: String,
    pub color: Color,
}
