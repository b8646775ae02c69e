use serde::{Deserialize, Serialize};

use crate::scorer::Classification;
use crate::summary::GameSummary;

/// Side making a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn is_white(self) -> bool {
        self == Color::White
    }
}

/// One half-move of the loaded game, produced once by the game loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 0-based ply index.
    pub ply: usize,
    /// SAN text as played ("Nf3", "exd5", "O-O").
    pub san: String,
    /// Long algebraic form ("g1f3").
    pub uci: String,
    pub from: String,
    pub to: String,
    pub color: Color,
    pub fen_before: String,
    pub fen_after: String,
}

/// Review verdict for a single move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveReview {
    #[serde(flatten)]
    pub record: MoveRecord,
    /// White-relative evaluation in pawns before the move (mate shown as ±10).
    pub eval_before: f64,
    /// White-relative evaluation in pawns after the move.
    pub eval_after: f64,
    /// Side-aware loss in pawns, never negative.
    pub eval_loss: f64,
    pub is_mate: bool,
    pub lost_mate: bool,
    /// Mover's material delta in pawns, positive when material was lost.
    pub material_loss: i32,
    pub best_move: Option<String>,
    pub principal_variation: Vec<String>,
    pub classification: Classification,
    pub comment: String,
}

/// Completed review: per-move verdicts plus the game-level summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameReview {
    pub moves: Vec<MoveReview>,
    pub summary: GameSummary,
}
