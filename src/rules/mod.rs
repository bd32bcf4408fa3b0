//! rules
//!
//! Adapter over the chess rules engine.
//!
//! # Architecture
//!
//! Chess rules are an external collaborator: legal-move enumeration, SAN
//! formatting, FEN encoding and Polyglot keys all come from `shakmaty`.
//! This module is the only place that touches it, so the rest of the crate
//! speaks [`PositionId`] and [`MoveCode`] only.
//!
//! [`Board`] is also the mutable "current position" context the crawls push
//! and pop moves on.
//!
//! # Example
//!
//! ```
//! use openbook::core::types::MoveCode;
//! use openbook::rules::Board;
//!
//! let mut board = Board::initial();
//! let e4 = MoveCode::new("e2e4").unwrap();
//! assert_eq!(board.label(&e4).unwrap(), "e4");
//!
//! board.push(&e4).unwrap();
//! assert_eq!(board.ply(), 1);
//! assert!(!board.white_to_move());
//!
//! board.pop();
//! assert_eq!(board.position_id().unwrap(), Board::initial().position_id().unwrap());
//! ```

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position};
use thiserror::Error;

use crate::core::types::{MoveCode, PositionId, TypeError};

/// Errors from the rules adapter.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The move is not legal in the position.
    #[error("illegal move {uci} in position {position}")]
    IllegalMove { uci: String, position: String },

    /// The position id does not describe a legal position.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// A generated identifier failed validation.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// A position plus the moves that led to it.
#[derive(Debug, Clone)]
pub struct Board {
    pos: Chess,
    /// Positions before each pushed move, with the move.
    history: Vec<(Chess, MoveCode)>,
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Board {
    /// The standard starting position.
    pub fn initial() -> Self {
        Self {
            pos: Chess::default(),
            history: Vec::new(),
        }
    }

    /// Rebuild a board from a stored position id.
    ///
    /// The board has no history.
    pub fn from_position_id(id: &PositionId) -> Result<Self, RulesError> {
        let fen: Fen = id
            .to_fen()
            .parse()
            .map_err(|e| RulesError::InvalidPosition(format!("{}: {}", id, e)))?;
        let pos: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition(format!("{}: {}", id, e)))?;
        Ok(Self {
            pos,
            history: Vec::new(),
        })
    }

    /// Play a line of moves from the starting position.
    pub fn from_line(line: &[MoveCode]) -> Result<Self, RulesError> {
        let mut board = Self::initial();
        for uci in line {
            board.push(uci)?;
        }
        Ok(board)
    }

    /// Full FEN of the current position.
    pub fn fen(&self) -> String {
        Fen::from_position(self.pos.clone(), EnPassantMode::Legal).to_string()
    }

    /// Canonical identity of the current position.
    pub fn position_id(&self) -> Result<PositionId, RulesError> {
        Ok(PositionId::from_fen(&self.fen())?)
    }

    /// Number of moves pushed since the board was created.
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Moves pushed since the board was created.
    pub fn line(&self) -> Vec<MoveCode> {
        self.history.iter().map(|(_, uci)| uci.clone()).collect()
    }

    /// Check whether white is to move.
    pub fn white_to_move(&self) -> bool {
        self.pos.turn() == Color::White
    }

    /// Legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<MoveCode> {
        self.pos
            .legal_moves()
            .iter()
            .filter_map(|m| MoveCode::new(m.to_uci(CastlingMode::Standard).to_string()).ok())
            .collect()
    }

    /// Check whether a move is legal here.
    pub fn is_legal(&self, uci: &MoveCode) -> bool {
        self.find_move(uci).is_ok()
    }

    /// Play a move, remembering the previous position.
    pub fn push(&mut self, uci: &MoveCode) -> Result<(), RulesError> {
        let m = self.find_move(uci)?;
        let before = self.pos.clone();
        self.pos.play_unchecked(&m);
        self.history.push((before, uci.clone()));
        Ok(())
    }

    /// Resolve a move given in SAN to its coordinate form.
    ///
    /// Check, mate and annotation suffixes are ignored, and `0-0` is read
    /// as `O-O`.
    pub fn resolve_san(&self, text: &str) -> Result<MoveCode, RulesError> {
        let illegal = || RulesError::IllegalMove {
            uci: text.to_string(),
            position: self.fen(),
        };
        let normalized = text.trim_end_matches(['+', '#', '!', '?']).replace('0', "O");
        let san: San = normalized.parse().map_err(|_| illegal())?;
        let m = san.to_move(&self.pos).map_err(|_| illegal())?;
        Ok(MoveCode::new(m.to_uci(CastlingMode::Standard).to_string())?)
    }

    /// Undo the last pushed move.
    pub fn pop(&mut self) -> Option<MoveCode> {
        let (before, uci) = self.history.pop()?;
        self.pos = before;
        Some(uci)
    }

    /// SAN text for a move, with check and mate suffixes.
    pub fn label(&self, uci: &MoveCode) -> Result<String, RulesError> {
        let m = self.find_move(uci)?;
        Ok(SanPlus::from_move(self.pos.clone(), &m).to_string())
    }

    /// Position reached by a move, without changing the board.
    pub fn destination(&self, uci: &MoveCode) -> Result<PositionId, RulesError> {
        let m = self.find_move(uci)?;
        let mut next = self.pos.clone();
        next.play_unchecked(&m);
        let fen = Fen::from_position(next, EnPassantMode::Legal).to_string();
        Ok(PositionId::from_fen(&fen)?)
    }

    /// Map a raw book move onto a legal move code.
    ///
    /// Polyglot books encode castling as king-takes-rook (`e1h1`); both that
    /// form and standard UCI are accepted. Returns `None` for moves that are
    /// not legal here.
    pub fn resolve_book_move(&self, raw: &str) -> Option<MoveCode> {
        self.pos.legal_moves().iter().find_map(|m| {
            let standard = m.to_uci(CastlingMode::Standard).to_string();
            let king_takes_rook = m.to_uci(CastlingMode::Chess960).to_string();
            if standard == raw || king_takes_rook == raw {
                MoveCode::new(standard).ok()
            } else {
                None
            }
        })
    }

    /// Polyglot-compatible Zobrist key of the current position.
    pub fn book_key(&self) -> u64 {
        let key: Zobrist64 = self.pos.zobrist_hash(EnPassantMode::Legal);
        key.0
    }

    fn find_move(&self, uci: &MoveCode) -> Result<Move, RulesError> {
        self.pos
            .legal_moves()
            .iter()
            .find(|m| m.to_uci(CastlingMode::Standard).to_string() == uci.as_str())
            .cloned()
            .ok_or_else(|| RulesError::IllegalMove {
                uci: uci.to_string(),
                position: self.fen(),
            })
    }
}
