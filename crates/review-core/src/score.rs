//! Engine score model and white-relative normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Pawns value used when rendering a forced mate on the eval axis.
const MATE_DISPLAY_PAWNS: f64 = 10.0;

/// A position score, always white-relative once normalized.
///
/// `Centipawn` is hundredths of a pawn; `Mate` is moves-to-mate with
/// positive meaning White delivers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Score {
    Centipawn(i32),
    Mate(i32),
}

impl Score {
    /// The zero-information fallback used for timeouts and an unavailable
    /// engine.
    pub fn neutral() -> Self {
        Score::Centipawn(0)
    }

    /// Normalize a score reported by the engine.
    ///
    /// UCI engines score from the side to move's perspective; this is the
    /// single point where that sign is flipped into the white-relative
    /// convention every downstream consumer assumes.
    pub fn from_engine(raw: Score, side_to_move: Color) -> Self {
        if side_to_move.is_white() {
            raw
        } else {
            match raw {
                Score::Centipawn(cp) => Score::Centipawn(-cp),
                Score::Mate(m) => Score::Mate(-m),
            }
        }
    }

    /// Flip into the mover's perspective.
    pub fn pov(self, color: Color) -> Self {
        if color.is_white() {
            self
        } else {
            match self {
                Score::Centipawn(cp) => Score::Centipawn(-cp),
                Score::Mate(m) => Score::Mate(-m),
            }
        }
    }

    pub fn is_mate(self) -> bool {
        matches!(self, Score::Mate(_))
    }

    /// Value in pawns for reporting. Forced mates render as ±10.
    pub fn to_pawns(self) -> f64 {
        match self {
            Score::Centipawn(cp) => f64::from(cp) / 100.0,
            Score::Mate(m) => {
                if m > 0 {
                    MATE_DISPLAY_PAWNS
                } else {
                    -MATE_DISPLAY_PAWNS
                }
            }
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawn(cp) => write!(f, "{:+.2}", f64::from(*cp) / 100.0),
            Score::Mate(m) => {
                if *m >= 0 {
                    write!(f, "M{m}")
                } else {
                    write!(f, "-M{}", -m)
                }
            }
        }
    }
}

/// Everything the engine had to say about one position, white-relative.
///
/// Immutable once inserted into the analysis cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionEvaluation {
    pub score: Score,
    pub best_move: Option<String>,
    pub principal_variation: Vec<String>,
}

impl PositionEvaluation {
    /// Fallback evaluation: centipawn zero, no best move, empty line.
    pub fn neutral() -> Self {
        PositionEvaluation {
            score: Score::neutral(),
            best_move: None,
            principal_variation: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_white_to_move_is_identity() {
        let s = Score::from_engine(Score::Centipawn(120), Color::White);
        assert_eq!(s, Score::Centipawn(120));
        let m = Score::from_engine(Score::Mate(3), Color::White);
        assert_eq!(m, Score::Mate(3));
    }

    #[test]
    fn test_normalize_black_to_move_flips_sign() {
        let s = Score::from_engine(Score::Centipawn(120), Color::Black);
        assert_eq!(s, Score::Centipawn(-120));
        let m = Score::from_engine(Score::Mate(2), Color::Black);
        assert_eq!(m, Score::Mate(-2));
    }

    #[test]
    fn test_pov_round_trip() {
        let s = Score::Centipawn(-80);
        assert_eq!(s.pov(Color::White), s);
        assert_eq!(s.pov(Color::Black), Score::Centipawn(80));
        assert_eq!(s.pov(Color::Black).pov(Color::Black), s);
    }

    #[test]
    fn test_mate_renders_as_ten_pawns() {
        assert_eq!(Score::Mate(4).to_pawns(), 10.0);
        assert_eq!(Score::Mate(-1).to_pawns(), -10.0);
        assert_eq!(Score::Centipawn(-350).to_pawns(), -3.5);
    }

    #[test]
    fn test_display() {
        assert_eq!(Score::Centipawn(35).to_string(), "+0.35");
        assert_eq!(Score::Mate(-2).to_string(), "-M2");
    }
}
