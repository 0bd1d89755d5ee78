use super::board::Board;
use super::board_movement::PromotionChooser;
use super::moves::Movement;
use super::notation;
use super::piece::{Color, Player, Players};
use super::position::Position;
use super::status::DrawReason;
use super::ChessError;
use crate::config::RulesConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Checkmate { winner: Color },
    Draw(DrawReason),
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            GameOutcome::Draw(reason) => write!(f, "draw by {}", reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Ready,
    Playing,
    Paused,
    Stopped,
    Finished(GameOutcome),
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameState::Ready => write!(f, "ready"),
            GameState::Playing => write!(f, "playing"),
            GameState::Paused => write!(f, "paused"),
            GameState::Stopped => write!(f, "stopped"),
            GameState::Finished(outcome) => write!(f, "finished ({})", outcome),
        }
    }
}

/// What a move source wants to do on its turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveRequest {
    /// Structured from/to request, resolved against the legal movements
    Movement(Movement),
    /// Algebraic token, e.g. "Nf3", "O-O" or "e4 (=)"
    Notation(String),
    Undo,
    AcceptDraw,
    Stop,
}

/// A participant driving one side of a game
pub trait MoveSource {
    fn request_move(&mut self, player: &Player, board: &Board) -> MoveRequest;

    /// Called when the last request was rejected; the source will be asked again
    fn rejected(&mut self, _request: &MoveRequest, _error: &ChessError) {}
}

/// Move source replaying a fixed queue of requests, then stopping the game
#[derive(Debug, Clone, Default)]
pub struct ScriptedMoves {
    requests: VecDeque<MoveRequest>,
    rejections: Vec<(MoveRequest, ChessError)>,
}

impl ScriptedMoves {
    pub fn new(requests: impl IntoIterator<Item = MoveRequest>) -> Self {
        Self {
            requests: requests.into_iter().collect(),
            rejections: Vec::new(),
        }
    }

    pub fn from_notations<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            tokens
                .into_iter()
                .map(|token| MoveRequest::Notation(token.to_string())),
        )
    }

    pub fn push(&mut self, request: MoveRequest) {
        self.requests.push_back(request);
    }

    pub fn remaining(&self) -> usize {
        self.requests.len()
    }

    pub fn rejections(&self) -> &[(MoveRequest, ChessError)] {
        &self.rejections
    }
}

impl MoveSource for ScriptedMoves {
    fn request_move(&mut self, _player: &Player, _board: &Board) -> MoveRequest {
        self.requests.pop_front().unwrap_or(MoveRequest::Stop)
    }

    fn rejected(&mut self, request: &MoveRequest, error: &ChessError) {
        self.rejections.push((request.clone(), error.clone()));
    }
}

/// Summary of a movement played through a [`Game`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub color: Color,
    pub movement: Movement,
    pub notation: String,
    pub draw_offer: bool,
    /// Set when the movement ended the game
    pub outcome: Option<GameOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Moved(MoveReport),
    Undone(Option<Movement>),
    DrawAccepted,
    Stopped,
    /// The request was refused; the same player is still to move
    Rejected(ChessError),
}

/// A game session: a board, two players and the session state
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    players: Players,
    state: GameState,
    draw_offer: Option<Color>,
}

impl Game {
    /// Standard setup, default players and rules
    pub fn new() -> Self {
        Self::with_board(Players::default(), Board::standard())
    }

    pub fn with_players(players: Players) -> Self {
        Self::with_board(players, Board::standard())
    }

    pub fn with_rules(rules: RulesConfig) -> Self {
        Self::with_board(Players::default(), Board::standard().with_rules(rules))
    }

    pub fn with_board(players: Players, board: Board) -> Self {
        Self {
            board,
            players,
            state: GameState::Ready,
            draw_offer: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.state {
            GameState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// The color that offered a draw with its last movement, if still open
    pub fn pending_draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    /// White moves first; afterwards colors alternate with the history
    pub fn now_playing(&self) -> Color {
        self.board
            .history()
            .last()
            .and_then(|last| last.mover_color())
            .map_or(Color::White, |color| color.opposite())
    }

    pub fn current_player(&self) -> &Player {
        self.players.get(self.now_playing())
    }

    pub fn opponent(&self) -> &Player {
        self.players.get(self.now_playing().opposite())
    }

    pub fn start(&mut self) -> Result<(), ChessError> {
        if self.state != GameState::Ready {
            return Err(ChessError::GameNotActive(format!(
                "Cannot start a game that is {}",
                self.state
            )));
        }
        self.state = GameState::Playing;
        info!(
            "Game started: {} vs {}",
            self.players.white(),
            self.players.black()
        );
        self.evaluate_outcome()?;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), ChessError> {
        self.ensure_playing()?;
        self.state = GameState::Paused;
        debug!("Game paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), ChessError> {
        if self.state != GameState::Paused {
            return Err(ChessError::GameNotActive(format!(
                "Cannot resume a game that is {}",
                self.state
            )));
        }
        self.state = GameState::Playing;
        debug!("Game resumed");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ChessError> {
        match self.state {
            GameState::Stopped | GameState::Finished(_) => Err(ChessError::GameNotActive(
                format!("Cannot stop a game that is {}", self.state),
            )),
            _ => {
                self.state = GameState::Stopped;
                info!("Game stopped after {} moves", self.board.history().len());
                Ok(())
            }
        }
    }

    /// Back to the standard setup, keeping players and rules
    pub fn reset(&mut self) {
        let rules = self.board.rules().clone();
        self.board = Board::standard().with_rules(rules);
        self.state = GameState::Ready;
        self.draw_offer = None;
        debug!("Game reset");
    }

    fn ensure_playing(&self) -> Result<(), ChessError> {
        if self.state != GameState::Playing {
            return Err(ChessError::GameNotActive(format!(
                "The game is {}",
                self.state
            )));
        }
        Ok(())
    }

    /// Decode an algebraic token for the player to move and play it
    #[instrument(skip(self, chooser))]
    pub fn play(
        &mut self,
        token: &str,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<MoveReport, ChessError> {
        self.ensure_playing()?;
        let color = self.now_playing();
        let decoded = notation::decode(token, &mut self.board, color)?;
        self.commit(color, decoded.movement, decoded.draw_offer, chooser)
    }

    /// Play a structured movement. The request must match one of the legal
    /// movements of the piece on its source square; that legal movement
    /// (with its castling cascade, if any) is what gets applied.
    #[instrument(skip(self, movement, chooser), fields(movement = %movement))]
    pub fn exec_move(
        &mut self,
        movement: Movement,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<MoveReport, ChessError> {
        self.ensure_playing()?;
        let color = self.now_playing();

        let piece = self.board.piece_at(movement.from).ok_or_else(|| {
            ChessError::InvalidMove(format!("No piece at source position {}", movement.from))
        })?;
        if piece.color() != color {
            return Err(ChessError::IllegalMove(format!(
                "The piece at {} does not belong to {}",
                movement.from, color
            )));
        }

        let resolved = self
            .board
            .legal_movements_at(movement.from)?
            .into_iter()
            .find(|legal| *legal == movement)
            .ok_or_else(|| {
                ChessError::IllegalMove(format!("{} is not a legal move", movement))
            })?;
        let resolved = match movement.promote_to() {
            Some(kind) => resolved.with_promotion(kind)?,
            None => resolved,
        };

        self.commit(color, resolved, false, chooser)
    }

    fn commit(
        &mut self,
        color: Color,
        movement: Movement,
        draw_offer: bool,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<MoveReport, ChessError> {
        let applied = self.board.apply(movement, chooser)?;
        let movement = applied.movement().clone();
        let notation = applied
            .notation()
            .map_or_else(|| movement.to_string(), str::to_string);

        self.draw_offer = draw_offer.then_some(color);
        let outcome = self.evaluate_outcome()?;

        info!("{} played {}", self.players.get(color), notation);
        if draw_offer {
            info!("{} offers a draw", self.players.get(color));
        }

        Ok(MoveReport {
            color,
            movement,
            notation,
            draw_offer,
            outcome,
        })
    }

    /// Finish the game if the player to move is mated or a draw applies
    fn evaluate_outcome(&mut self) -> Result<Option<GameOutcome>, ChessError> {
        let next = self.now_playing();
        let mut status = self.board.status(next);

        let outcome = if status.is_checkmate()? {
            Some(GameOutcome::Checkmate {
                winner: next.opposite(),
            })
        } else {
            status.draw_reason()?.map(GameOutcome::Draw)
        };

        if let Some(outcome) = outcome {
            self.state = GameState::Finished(outcome);
            self.draw_offer = None;
            info!("Game over: {}", outcome);
        }
        Ok(outcome)
    }

    /// Revert the most recent movement. Reopens a finished game.
    pub fn undo_last(&mut self) -> Result<Option<Movement>, ChessError> {
        match self.state {
            GameState::Playing | GameState::Finished(_) => {}
            _ => {
                return Err(ChessError::GameNotActive(format!(
                    "Cannot undo in a game that is {}",
                    self.state
                )))
            }
        }

        let undone = self.board.undo_last()?;
        if let Some(undone) = &undone {
            self.state = GameState::Playing;
            self.draw_offer = None;
            info!("Undid {}", undone.movement());
        }
        Ok(undone.map(|undone| undone.into_movement()))
    }

    /// Accept the draw the opponent offered with their last movement
    pub fn accept_draw(&mut self) -> Result<(), ChessError> {
        self.ensure_playing()?;
        let color = self.now_playing();
        if self.draw_offer != Some(color.opposite()) {
            return Err(ChessError::IllegalMove(format!(
                "{} has no draw offer to accept",
                self.players.get(color)
            )));
        }

        let outcome = GameOutcome::Draw(DrawReason::MutualAgreement);
        self.state = GameState::Finished(outcome);
        self.draw_offer = None;
        info!("{} accepts the draw", self.players.get(color));
        Ok(())
    }

    /// Destination squares of the legal movements from `square`
    pub fn legal_targets(&mut self, square: Position) -> Result<Vec<Position>, ChessError> {
        Ok(self
            .board
            .legal_movements_at(square)?
            .into_iter()
            .map(|movement| movement.to)
            .collect())
    }

    /// Ask `source` for one request and carry it out. Rejected requests are
    /// reported back to the source and leave the game unchanged.
    pub fn take_turn(
        &mut self,
        source: &mut dyn MoveSource,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<TurnOutcome, ChessError> {
        self.ensure_playing()?;
        let color = self.now_playing();
        let request = source.request_move(self.players.get(color), &self.board);

        let result = match &request {
            MoveRequest::Movement(movement) => self
                .exec_move(movement.clone(), chooser)
                .map(TurnOutcome::Moved),
            MoveRequest::Notation(token) => self.play(token, chooser).map(TurnOutcome::Moved),
            MoveRequest::Undo => self.undo_last().map(TurnOutcome::Undone),
            MoveRequest::AcceptDraw => self.accept_draw().map(|()| TurnOutcome::DrawAccepted),
            MoveRequest::Stop => self.stop().map(|()| TurnOutcome::Stopped),
        };

        match result {
            Err(error) if error.is_rejection() => {
                warn!("Rejected request from {}: {}", self.players.get(color), error);
                source.rejected(&request, &error);
                Ok(TurnOutcome::Rejected(error))
            }
            other => other,
        }
    }

    /// Take turns until the game is no longer playing. White and Black
    /// requests are drawn from their own sources.
    pub fn run(
        &mut self,
        white: &mut dyn MoveSource,
        black: &mut dyn MoveSource,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<GameState, ChessError> {
        while self.is_playing() {
            let source: &mut dyn MoveSource = match self.now_playing() {
                Color::White => &mut *white,
                Color::Black => &mut *black,
            };
            self.take_turn(source, chooser)?;
        }
        Ok(self.state)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
