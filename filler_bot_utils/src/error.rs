use filler::{Color, NoSafeColorError, PlayerId, ShapeError};

/// Invalid command line input. Detected before any request is made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingValue(&'static str),
    InvalidPlayerId(String),
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingValue(name) => write!(f, "No value given for {}", name),
            ConfigError::InvalidPlayerId(id) => {
                write!(f, "Player id '{}' is not a positive integer", id)
            }
        }
    }
}

/// What the server objected to, derived from the response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    BadRequest,
    NotYourTurn,
    BadGameId,
    ColorUnavailable,
    Unknown(u16),
    /// The status was fine, but the body could not be parsed.
    MalformedBody,
}

impl ProtocolErrorKind {
    /// Maps the status of a move submission.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ProtocolErrorKind::BadRequest,
            403 => ProtocolErrorKind::NotYourTurn,
            404 => ProtocolErrorKind::BadGameId,
            409 => ProtocolErrorKind::ColorUnavailable,
            _ => ProtocolErrorKind::Unknown(status),
        }
    }

    /// Maps the status of a state fetch, which only defines 400 and 404.
    pub fn from_get_status(status: u16) -> Self {
        match status {
            400 => ProtocolErrorKind::BadRequest,
            404 => ProtocolErrorKind::BadGameId,
            _ => ProtocolErrorKind::Unknown(status),
        }
    }
}

impl std::fmt::Display for ProtocolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolErrorKind::BadRequest => write!(f, "incorrect request parameters (400)"),
            ProtocolErrorKind::NotYourTurn => {
                write!(f, "the player can't make a move right now (403)")
            }
            ProtocolErrorKind::BadGameId => write!(f, "incorrect game id (404)"),
            ProtocolErrorKind::ColorUnavailable => {
                write!(f, "the player can't choose this color right now (409)")
            }
            ProtocolErrorKind::Unknown(status) => write!(f, "unexpected status {}", status),
            ProtocolErrorKind::MalformedBody => write!(f, "malformed response body"),
        }
    }
}

/// The server rejected a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolError {
    pub kind: ProtocolErrorKind,
    pub method: &'static str,
    pub endpoint: String,
    /// Start of the response body, or the parse error for a malformed body.
    pub detail: String,
}

impl std::error::Error for ProtocolError {}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} failed: {}", self.method, self.endpoint, self.kind)?;
        if !self.detail.is_empty() {
            write!(f, " ({})", self.detail)?;
        }
        Ok(())
    }
}

/// A single request that never got a response.
#[derive(Debug)]
pub struct TransportFailure {
    pub timed_out: bool,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportFailure {
    pub fn new(timed_out: bool, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            timed_out,
            source: source.into(),
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        TransportFailure::new(err.is_timeout(), err)
    }
}

impl std::error::Error for TransportFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.timed_out {
            write!(f, "Request timed out")
        } else {
            write!(f, "Request failed: {}", self.source)
        }
    }
}

/// A request that kept failing after all retries.
#[derive(Debug)]
pub struct TransportError {
    pub method: &'static str,
    pub endpoint: String,
    pub attempts: u32,
    pub last_failure: TransportFailure,
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_failure)
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} failed after {} attempt(s)",
            self.method, self.endpoint, self.attempts
        )
    }
}

/// Why the turn loop stopped without a winner.
#[derive(Debug)]
pub enum TurnError {
    Shape(ShapeError),
    Protocol(ProtocolError),
    NoSafeColor(NoSafeColorError),
    Transport(TransportError),
    /// The snapshot does not say which color this player has.
    MissingPlayerColor(PlayerId),
    /// The bot picked a color outside of the safe set.
    UnsafeColorChosen(Color),
    Interrupted,
}

impl std::error::Error for TurnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TurnError::Shape(err) => Some(err),
            TurnError::Protocol(err) => Some(err),
            TurnError::NoSafeColor(err) => Some(err),
            TurnError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for TurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnError::Shape(_) => write!(f, "The server sent a malformed field"),
            TurnError::Protocol(_) => write!(f, "The server rejected a request"),
            TurnError::NoSafeColor(_) => write!(f, "The turn was forfeited"),
            TurnError::Transport(_) => write!(f, "Could not reach the game server"),
            TurnError::MissingPlayerColor(player) => {
                write!(f, "The game state has no color for player {}", player)
            }
            TurnError::UnsafeColorChosen(color) => {
                write!(f, "The bot chose {}, which is not a safe color", color)
            }
            TurnError::Interrupted => write!(f, "Interrupted before the game ended"),
        }
    }
}

impl From<ShapeError> for TurnError {
    fn from(err: ShapeError) -> Self {
        TurnError::Shape(err)
    }
}

impl From<ProtocolError> for TurnError {
    fn from(err: ProtocolError) -> Self {
        TurnError::Protocol(err)
    }
}

impl From<NoSafeColorError> for TurnError {
    fn from(err: NoSafeColorError) -> Self {
        TurnError::NoSafeColor(err)
    }
}

impl From<TransportError> for TurnError {
    fn from(err: TransportError) -> Self {
        TurnError::Transport(err)
    }
}
