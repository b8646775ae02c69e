//! Game loading: SAN move list to move records, material accounting.
//!
//! Rule legality, FEN generation and SAN resolution are the `chess`
//! crate's job; this module only walks the game forward and records what
//! the review needs at each ply.

use std::str::FromStr;

use chess::{Board, ChessMove, Color as BoardColor, Piece};

use review_core::{Color, MoveRecord};

use crate::error::ReviewError;

const PIECE_VALUES: [(Piece, i32); 5] = [
    (Piece::Pawn, 1),
    (Piece::Knight, 3),
    (Piece::Bishop, 3),
    (Piece::Rook, 5),
    (Piece::Queen, 9),
];

fn to_color(color: BoardColor) -> Color {
    match color {
        BoardColor::White => Color::White,
        BoardColor::Black => Color::Black,
    }
}

fn to_board_color(color: Color) -> BoardColor {
    match color {
        Color::White => BoardColor::White,
        Color::Black => BoardColor::Black,
    }
}

/// Resolve one SAN token against a position, tolerating annotation
/// suffixes and zero-style castling.
fn parse_san(board: &Board, san: &str) -> Option<ChessMove> {
    let clean = san.trim().trim_end_matches(['+', '#', '!', '?']);
    let clean = match clean {
        "0-0" => "O-O",
        "0-0-0" => "O-O-O",
        other => other,
    };
    ChessMove::from_san(board, clean).ok()
}

fn move_to_uci(mv: &ChessMove) -> String {
    let promotion = match mv.get_promotion() {
        Some(Piece::Queen) => "q",
        Some(Piece::Rook) => "r",
        Some(Piece::Bishop) => "b",
        Some(Piece::Knight) => "n",
        _ => "",
    };
    format!("{}{}{}", mv.get_source(), mv.get_dest(), promotion)
}

/// Split PGN-style movetext into bare SAN tokens, dropping move numbers
/// and result markers.
pub fn split_movetext(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|t| !t.ends_with('.') && !matches!(*t, "1-0" | "0-1" | "1/2-1/2" | "*"))
        .map(|t| {
            // "12.e4" style glued move numbers.
            match t.rfind('.') {
                Some(idx) => t[idx + 1..].to_string(),
                None => t.to_string(),
            }
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Build the immutable per-move records for a game from its SAN moves,
/// starting at the standard position.
pub fn build_move_records(sans: &[String]) -> Result<Vec<MoveRecord>, ReviewError> {
    let mut board = Board::default();
    let mut records = Vec::with_capacity(sans.len());

    for (ply, san) in sans.iter().enumerate() {
        let mv = parse_san(&board, san).ok_or_else(|| {
            ReviewError::InvalidMoveList(format!("illegal or unparsable move {san:?} at ply {ply}"))
        })?;
        let fen_before = board.to_string();
        let color = to_color(board.side_to_move());
        let board_after = board.make_move_new(mv);

        records.push(MoveRecord {
            ply,
            san: san.clone(),
            uci: move_to_uci(&mv),
            from: mv.get_source().to_string(),
            to: mv.get_dest().to_string(),
            color,
            fen_before,
            fen_after: board_after.to_string(),
        });
        board = board_after;
    }

    Ok(records)
}

/// Total material for one side, pawns (P1 N3 B3 R5 Q9, king uncounted).
pub fn material_count(board: &Board, color: BoardColor) -> i32 {
    let side = *board.color_combined(color);
    PIECE_VALUES
        .iter()
        .map(|&(piece, value)| (*board.pieces(piece) & side).popcnt() as i32 * value)
        .sum()
}

/// Mover's own material before the move minus after, in pawns.
/// Positive means the mover gave up material.
pub fn material_loss(fen_before: &str, fen_after: &str, color: Color) -> Result<i32, ReviewError> {
    let before = Board::from_str(fen_before)
        .map_err(|e| ReviewError::InvalidPosition(format!("{fen_before}: {e}")))?;
    let after = Board::from_str(fen_after)
        .map_err(|e| ReviewError::InvalidPosition(format!("{fen_after}: {e}")))?;
    let side = to_board_color(color);
    Ok(material_count(&before, side) - material_count(&after, side))
}
