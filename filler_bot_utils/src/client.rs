use filler::MoveRequest;
use tracing::trace;

use crate::{TransportFailure, TurnConfig};

/// Status and body of an HTTP response, before any interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerResponse {
    pub status: u16,
    pub body: String,
}

impl ServerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The first few characters of the body, for error messages.
    pub fn body_summary(&self) -> String {
        const MAX_CHARS: usize = 200;
        let mut summary: String = self.body.chars().take(MAX_CHARS).collect();
        if self.body.chars().count() > MAX_CHARS {
            summary.push('…');
        }
        summary
    }
}

/// The two calls the bot makes against the game server.
///
/// An `Err` means no response was received at all (timeout, connection
/// failure). Any received response, whatever its status, is an `Ok`.
pub trait GameServer {
    /// Used in log messages and errors.
    fn endpoint(&self) -> &str;
    /// `GET game/{id}`
    fn fetch_game(&mut self) -> Result<ServerResponse, TransportFailure>;
    /// `PUT game/{id}`
    fn submit_move(&mut self, request: &MoveRequest) -> Result<ServerResponse, TransportFailure>;
}

/// [`GameServer`] over HTTP, one blocking request at a time.
pub struct HttpGameServer {
    client: reqwest::blocking::Client,
    game_url: String,
}

impl HttpGameServer {
    pub fn new(config: &TurnConfig) -> Result<Self, TransportFailure> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            game_url: config.game_url(),
        })
    }
}

fn read_response(response: reqwest::blocking::Response) -> Result<ServerResponse, TransportFailure> {
    let status = response.status().as_u16();
    let body = response.text()?;
    trace!(name: "Received response", status, body = %body);
    Ok(ServerResponse { status, body })
}

impl GameServer for HttpGameServer {
    fn endpoint(&self) -> &str {
        &self.game_url
    }

    fn fetch_game(&mut self) -> Result<ServerResponse, TransportFailure> {
        trace!(name: "Sending request", method = "GET", url = %self.game_url);
        read_response(self.client.get(&self.game_url).send()?)
    }

    fn submit_move(&mut self, request: &MoveRequest) -> Result<ServerResponse, TransportFailure> {
        trace!(name: "Sending request", method = "PUT", url = %self.game_url, request = ?request);
        read_response(self.client.put(&self.game_url).json(request).send()?)
    }
}
