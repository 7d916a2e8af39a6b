use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use filler::{
    safe_colors_excluding, visualize_board, Board, Color, GameState, MoveRequest, NoSafeColorError,
    PlayerId,
};
use tracing::{debug, info, trace, warn};

use crate::{
    Bot, GameServer, ProtocolError, ProtocolErrorKind, ServerResponse, TransportError,
    TransportFailure, TurnConfig, TurnError,
};

/// Everything a bot gets to see when choosing a color.
pub struct Turn<'a> {
    pub board: &'a Board,
    pub player: PlayerId,
    pub opponent: PlayerId,
    /// In palette order. Never empty.
    pub safe_colors: &'a [Color],
}

/// The turn loop's states. Each one owns the snapshot it works on, so
/// nothing survives from one fetched snapshot to the next.
enum State {
    Connecting,
    Deciding {
        snapshot: GameState,
        /// Colors the server refused for this snapshot.
        rejected: Vec<Color>,
    },
    Submitting {
        snapshot: GameState,
        rejected: Vec<Color>,
        color: Color,
    },
    Evaluating {
        snapshot: GameState,
        rejected: Vec<Color>,
        color: Color,
        response: ServerResponse,
    },
    Terminal {
        winner: PlayerId,
    },
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Connecting => "connecting",
            State::Deciding { .. } => "deciding",
            State::Submitting { .. } => "submitting",
            State::Evaluating { .. } => "evaluating",
            State::Terminal { .. } => "terminal",
        }
    }
}

/// Fetches, decides and submits until the server reports a winner.
///
/// Returns an error only for problems that can't be fixed by choosing
/// another color: a refused color (409) is handled here.
pub fn play_game<B: Bot + ?Sized, S: GameServer + ?Sized>(
    bot: &mut B,
    server: &mut S,
    config: &TurnConfig,
    stop: &AtomicBool,
) -> Result<PlayerId, TurnError> {
    let mut state = State::Connecting;
    // Submissions that got no response since the last one that did
    let mut failed_submits = 0;
    loop {
        state = match state {
            State::Connecting => {
                check_stop(stop)?;
                let snapshot = fetch_game(server, config)?;
                State::Deciding {
                    snapshot,
                    rejected: Vec::new(),
                }
            }
            State::Deciding { snapshot, rejected } => {
                if let Some(winner) = snapshot.winner_player_id {
                    State::Terminal { winner }
                } else if let Some(current) = snapshot
                    .current_player_id
                    .filter(|&current| current != config.player())
                {
                    debug!(current_player = current, "Waiting for the opponent");
                    thread::sleep(config.poll_interval);
                    State::Connecting
                } else {
                    let color = decide(bot, &snapshot, &rejected, config.player())?;
                    State::Submitting {
                        snapshot,
                        rejected,
                        color,
                    }
                }
            }
            State::Submitting {
                snapshot,
                rejected,
                color,
            } => {
                check_stop(stop)?;
                info!(color = %color, "Submitting move");
                let request = MoveRequest {
                    player_id: String::from(config.player_id()),
                    color,
                };
                match server.submit_move(&request) {
                    Ok(response) => {
                        failed_submits = 0;
                        State::Evaluating {
                            snapshot,
                            rejected,
                            color,
                            response,
                        }
                    }
                    // The move may have landed anyway, so only a fresh
                    // snapshot can tell whether it is still our turn
                    Err(failure) if failed_submits < config.max_retries => {
                        failed_submits += 1;
                        warn!(
                            attempts = failed_submits,
                            error = %failure,
                            "Move submission failed, fetching the game again"
                        );
                        thread::sleep(config.retry_delay);
                        State::Connecting
                    }
                    Err(failure) => {
                        return Err(TransportError {
                            method: "PUT",
                            endpoint: String::from(server.endpoint()),
                            attempts: failed_submits + 1,
                            last_failure: failure,
                        }
                        .into())
                    }
                }
            }
            State::Evaluating {
                snapshot,
                mut rejected,
                color,
                response,
            } => {
                if response.is_success() {
                    State::Connecting
                } else {
                    match ProtocolErrorKind::from_status(response.status) {
                        ProtocolErrorKind::ColorUnavailable => {
                            // The board may have changed underneath us, but
                            // another safe color is still worth a try
                            warn!(color = %color, "Color refused by the server");
                            rejected.push(color);
                            State::Deciding { snapshot, rejected }
                        }
                        kind => {
                            return Err(ProtocolError {
                                kind,
                                method: "PUT",
                                endpoint: String::from(server.endpoint()),
                                detail: response.body_summary(),
                            }
                            .into())
                        }
                    }
                }
            }
            State::Terminal { winner } => {
                info!(winner, "Game over");
                return Ok(winner);
            }
        };
        debug!(state = state.name(), "Transition");
    }
}

fn check_stop(stop: &AtomicBool) -> Result<(), TurnError> {
    if stop.load(Ordering::SeqCst) {
        Err(TurnError::Interrupted)
    } else {
        Ok(())
    }
}

fn fetch_game<S: GameServer + ?Sized>(
    server: &mut S,
    config: &TurnConfig,
) -> Result<GameState, TurnError> {
    let endpoint = String::from(server.endpoint());
    let response = with_retries(config, "GET", &endpoint, || server.fetch_game())?;
    if !response.is_success() {
        return Err(ProtocolError {
            kind: ProtocolErrorKind::from_get_status(response.status),
            method: "GET",
            endpoint,
            detail: response.body_summary(),
        }
        .into());
    }
    serde_json::from_str(&response.body).map_err(|err| {
        TurnError::from(ProtocolError {
            kind: ProtocolErrorKind::MalformedBody,
            method: "GET",
            endpoint,
            detail: err.to_string(),
        })
    })
}

fn decide<B: Bot + ?Sized>(
    bot: &mut B,
    snapshot: &GameState,
    rejected: &[Color],
    player: PlayerId,
) -> Result<Color, TurnError> {
    let board = Board::from_field(&snapshot.field)?;
    let opponent = snapshot
        .players
        .opponent_of(player)
        .unwrap_or(if player == 1 { 2 } else { 1 });
    let own_color = snapshot
        .players
        .color_of(player)
        .ok_or(TurnError::MissingPlayerColor(player))?;
    let opponent_color = snapshot
        .players
        .color_of(opponent)
        .ok_or(TurnError::MissingPlayerColor(opponent))?;

    let safe_colors = safe_colors_excluding(own_color, opponent_color, rejected);
    if safe_colors.is_empty() {
        return Err(NoSafeColorError.into());
    }
    trace!("Current board:\n{}", visualize_board(&board));

    let color = bot.play_turn(&Turn {
        board: &board,
        player,
        opponent,
        safe_colors: &safe_colors,
    })?;
    if !safe_colors.contains(&color) {
        return Err(TurnError::UnsafeColorChosen(color));
    }
    debug!(color = %color, num_candidates = safe_colors.len(), "Chose color");
    Ok(color)
}

/// Runs `request` until it gets a response, at most `1 + config.max_retries` times.
fn with_retries<T>(
    config: &TurnConfig,
    method: &'static str,
    endpoint: &str,
    mut request: impl FnMut() -> Result<T, TransportFailure>,
) -> Result<T, TransportError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match request() {
            Ok(response) => return Ok(response),
            Err(failure) if attempts <= config.max_retries => {
                warn!(method, endpoint, attempts, error = %failure, "Request failed, retrying");
                thread::sleep(config.retry_delay);
            }
            Err(failure) => {
                return Err(TransportError {
                    method,
                    endpoint: String::from(endpoint),
                    attempts,
                    last_failure: failure,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    /// Answers requests from a script and records what was submitted.
    struct ScriptedServer {
        gets: VecDeque<Result<ServerResponse, TransportFailure>>,
        puts: VecDeque<Result<ServerResponse, TransportFailure>>,
        num_gets: usize,
        submitted: Vec<Color>,
        /// Set once a move has been accepted.
        stop_after_move: Option<Arc<AtomicBool>>,
    }

    impl ScriptedServer {
        fn new() -> Self {
            Self {
                gets: VecDeque::new(),
                puts: VecDeque::new(),
                num_gets: 0,
                submitted: Vec::new(),
                stop_after_move: None,
            }
        }

        fn on_get(mut self, status: u16, body: serde_json::Value) -> Self {
            self.gets.push_back(Ok(ServerResponse {
                status,
                body: body.to_string(),
            }));
            self
        }

        fn on_get_timeout(mut self) -> Self {
            self.gets
                .push_back(Err(TransportFailure::new(true, "operation timed out")));
            self
        }

        fn on_put_timeout(mut self) -> Self {
            self.puts
                .push_back(Err(TransportFailure::new(true, "operation timed out")));
            self
        }

        fn on_put(mut self, status: u16) -> Self {
            self.puts.push_back(Ok(ServerResponse {
                status,
                body: String::new(),
            }));
            self
        }
    }

    impl GameServer for ScriptedServer {
        fn endpoint(&self) -> &str {
            "http://test/game/g1"
        }

        fn fetch_game(&mut self) -> Result<ServerResponse, TransportFailure> {
            self.num_gets += 1;
            self.gets.pop_front().expect("Unexpected GET")
        }

        fn submit_move(&mut self, request: &MoveRequest) -> Result<ServerResponse, TransportFailure> {
            assert_eq!(request.player_id, "1");
            self.submitted.push(request.color);
            let response = self.puts.pop_front().expect("Unexpected PUT");
            if let (Some(stop), Ok(r)) = (&self.stop_after_move, &response) {
                if r.is_success() {
                    stop.store(true, Ordering::SeqCst);
                }
            }
            response
        }
    }

    /// Takes the first safe color, or a fixed one if given.
    struct SimpleBot(Option<Color>);

    impl Bot for SimpleBot {
        fn play_turn(&mut self, turn: &Turn) -> Result<Color, NoSafeColorError> {
            self.0
                .or(turn.safe_colors.first().copied())
                .ok_or(NoSafeColorError)
        }
    }

    fn config() -> TurnConfig {
        let mut config = TurnConfig::new("http://test/", "g1", "1").unwrap();
        config.max_retries = 2;
        config.retry_delay = Duration::ZERO;
        config.poll_interval = Duration::ZERO;
        config
    }

    fn play(server: &mut ScriptedServer) -> Result<PlayerId, TurnError> {
        SimpleBot(None).run(server, &config(), &AtomicBool::new(false))
    }

    fn running_game(current_player: PlayerId) -> serde_json::Value {
        json!({
            "field": {"width": 2, "cells": [
                {"playerId": 1, "color": "#ff0000"}, {"playerId": 0, "color": "#ffff00"},
                {"playerId": 0, "color": "#ffffff"}, {"playerId": 2, "color": "#00ff00"}
            ]},
            "players": {"1": {"color": "#ff0000"}, "2": {"color": "#00ff00"}},
            "currentPlayerId": current_player,
            "winnerPlayerId": null
        })
    }

    fn finished_game(winner: PlayerId) -> serde_json::Value {
        json!({
            "field": {"width": 2, "cells": [
                {"playerId": 1}, {"playerId": 2}, {"playerId": 0}, {"playerId": 0}
            ]},
            "winnerPlayerId": winner
        })
    }

    #[test]
    fn winner_reported_without_moving() {
        let mut server = ScriptedServer::new().on_get(200, finished_game(1));
        assert_eq!(play(&mut server).unwrap(), 1);
        assert!(server.submitted.is_empty());
        assert_eq!(server.num_gets, 1);
    }

    #[test]
    fn bad_game_id_is_fatal() {
        let mut server = ScriptedServer::new().on_get(404, json!("Incorrect game id"));
        match play(&mut server) {
            Err(TurnError::Protocol(err)) => {
                assert_eq!(err.kind, ProtocolErrorKind::BadGameId);
                assert_eq!(err.method, "GET");
                assert_eq!(err.endpoint, "http://test/game/g1");
            }
            other => panic!("Expected a protocol error, got {:?}", other),
        }
        assert!(server.submitted.is_empty());
    }

    #[test]
    fn bad_request_on_fetch_is_fatal() {
        let mut server = ScriptedServer::new().on_get(400, json!(null));
        assert!(matches!(
            play(&mut server),
            Err(TurnError::Protocol(ProtocolError {
                kind: ProtocolErrorKind::BadRequest,
                ..
            }))
        ));
    }

    #[test]
    fn full_turn_then_winner() {
        let mut server = ScriptedServer::new()
            .on_get(200, running_game(1))
            .on_put(200)
            .on_get(200, finished_game(2));
        assert_eq!(play(&mut server).unwrap(), 2);
        assert_eq!(server.submitted, vec![Color::Yellow]);
        assert_eq!(server.num_gets, 2);
    }

    #[test]
    fn refused_color_is_replaced_without_refetching() {
        let mut server = ScriptedServer::new()
            .on_get(200, running_game(1))
            .on_put(409)
            .on_put(200)
            .on_get(200, finished_game(1));
        assert_eq!(play(&mut server).unwrap(), 1);
        assert_eq!(server.submitted, vec![Color::Yellow, Color::White]);
        assert_eq!(server.num_gets, 2);
    }

    #[test]
    fn every_color_refused_forfeits() {
        let mut server = ScriptedServer::new().on_get(200, running_game(1));
        for _ in 0..5 {
            server = server.on_put(409);
        }
        assert!(matches!(
            play(&mut server),
            Err(TurnError::NoSafeColor(NoSafeColorError))
        ));
        assert_eq!(
            server.submitted,
            vec![
                Color::Yellow,
                Color::White,
                Color::Cyan,
                Color::Blue,
                Color::Magenta
            ]
        );
    }

    #[test]
    fn not_your_turn_is_fatal() {
        let mut server = ScriptedServer::new()
            .on_get(200, running_game(1))
            .on_put(403);
        assert!(matches!(
            play(&mut server),
            Err(TurnError::Protocol(ProtocolError {
                kind: ProtocolErrorKind::NotYourTurn,
                method: "PUT",
                ..
            }))
        ));
    }

    #[test]
    fn unknown_status_is_fatal() {
        let mut server = ScriptedServer::new()
            .on_get(200, running_game(1))
            .on_put(500);
        assert!(matches!(
            play(&mut server),
            Err(TurnError::Protocol(ProtocolError {
                kind: ProtocolErrorKind::Unknown(500),
                ..
            }))
        ));
    }

    #[test]
    fn waits_for_own_turn() {
        let mut server = ScriptedServer::new()
            .on_get(200, running_game(2))
            .on_get(200, running_game(1))
            .on_put(200)
            .on_get(200, finished_game(1));
        assert_eq!(play(&mut server).unwrap(), 1);
        assert_eq!(server.num_gets, 3);
        assert_eq!(server.submitted.len(), 1);
    }

    #[test]
    fn timeouts_are_retried() {
        let mut server = ScriptedServer::new()
            .on_get_timeout()
            .on_get_timeout()
            .on_get(200, finished_game(2));
        assert_eq!(play(&mut server).unwrap(), 2);
        assert_eq!(server.num_gets, 3);
    }

    #[test]
    fn retries_are_bounded() {
        let mut server = ScriptedServer::new()
            .on_get_timeout()
            .on_get_timeout()
            .on_get_timeout();
        match play(&mut server) {
            Err(TurnError::Transport(err)) => {
                assert_eq!(err.attempts, 3);
                assert_eq!(err.method, "GET");
                assert!(err.last_failure.timed_out);
            }
            other => panic!("Expected a transport error, got {:?}", other),
        }
        assert_eq!(server.num_gets, 3);
    }

    #[test]
    fn fetch_statuses_of_moves_are_unknown() {
        let mut server = ScriptedServer::new().on_get(409, json!(null));
        assert!(matches!(
            play(&mut server),
            Err(TurnError::Protocol(ProtocolError {
                kind: ProtocolErrorKind::Unknown(409),
                method: "GET",
                ..
            }))
        ));
        assert_eq!(
            ProtocolErrorKind::from_get_status(403),
            ProtocolErrorKind::Unknown(403)
        );
        assert_eq!(
            ProtocolErrorKind::from_get_status(404),
            ProtocolErrorKind::BadGameId
        );
    }

    #[test]
    fn lost_move_response_is_not_resent() {
        // The move landed, only the response got lost
        let mut server = ScriptedServer::new()
            .on_get(200, running_game(1))
            .on_put_timeout()
            .on_put(403)
            .on_get(200, running_game(2))
            .on_get(200, finished_game(1));
        assert_eq!(play(&mut server).unwrap(), 1);
        assert_eq!(server.submitted, vec![Color::Yellow]);
        assert_eq!(server.num_gets, 3);
    }

    #[test]
    fn lost_move_is_submitted_again() {
        let mut server = ScriptedServer::new()
            .on_get(200, running_game(1))
            .on_put_timeout()
            .on_get(200, running_game(1))
            .on_put(200)
            .on_get(200, finished_game(1));
        assert_eq!(play(&mut server).unwrap(), 1);
        assert_eq!(server.submitted, vec![Color::Yellow, Color::Yellow]);
        assert_eq!(server.num_gets, 3);
    }

    #[test]
    fn move_retries_are_bounded() {
        let mut server = ScriptedServer::new();
        for _ in 0..3 {
            server = server.on_get(200, running_game(1)).on_put_timeout();
        }
        match play(&mut server) {
            Err(TurnError::Transport(err)) => {
                assert_eq!(err.attempts, 3);
                assert_eq!(err.method, "PUT");
                assert!(err.last_failure.timed_out);
            }
            other => panic!("Expected a transport error, got {:?}", other),
        }
        assert_eq!(server.submitted.len(), 3);
        assert_eq!(server.num_gets, 3);
    }

    #[test]
    fn malformed_body() {
        let mut server = ScriptedServer::new().on_get(200, json!({"field": 3}));
        assert!(matches!(
            play(&mut server),
            Err(TurnError::Protocol(ProtocolError {
                kind: ProtocolErrorKind::MalformedBody,
                ..
            }))
        ));
    }

    #[test]
    fn misshapen_field() {
        let mut state = running_game(1);
        state["field"]["width"] = json!(3);
        let mut server = ScriptedServer::new().on_get(200, state);
        assert!(matches!(play(&mut server), Err(TurnError::Shape(_))));
        assert!(server.submitted.is_empty());
    }

    #[test]
    fn missing_own_color() {
        let mut state = running_game(1);
        state["players"] = json!({"2": {"color": "#00ff00"}});
        let mut server = ScriptedServer::new().on_get(200, state);
        assert!(matches!(
            play(&mut server),
            Err(TurnError::MissingPlayerColor(1))
        ));
    }

    #[test]
    fn unsafe_choice_is_never_submitted() {
        let mut server = ScriptedServer::new().on_get(200, running_game(1));
        let result = SimpleBot(Some(Color::Green)).run(&mut server, &config(), &AtomicBool::new(false));
        assert!(matches!(
            result,
            Err(TurnError::UnsafeColorChosen(Color::Green))
        ));
        assert!(server.submitted.is_empty());
    }

    #[test]
    fn stop_flag_interrupts() {
        let mut server = ScriptedServer::new();
        let result = SimpleBot(None).run(&mut server, &config(), &AtomicBool::new(true));
        assert!(matches!(result, Err(TurnError::Interrupted)));
        assert_eq!(server.num_gets, 0);
    }

    #[test]
    fn stop_flag_interrupts_between_turns() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut server = ScriptedServer::new()
            .on_get(200, running_game(1))
            .on_put(200);
        server.stop_after_move = Some(Arc::clone(&stop));
        let result = SimpleBot(None).run(&mut server, &config(), &stop);
        assert!(matches!(result, Err(TurnError::Interrupted)));
        assert_eq!(server.submitted, vec![Color::Yellow]);
        assert_eq!(server.num_gets, 1);
    }
}
