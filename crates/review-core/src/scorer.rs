//! Move scoring and classification. Pure functions only.
//!
//! All scores coming in here are white-relative; the scorer flips them into
//! the mover's perspective itself.

use serde::{Deserialize, Serialize};

use crate::score::Score;
use crate::types::Color;

/// Loss charged when a forced mate is thrown away entirely.
const LOST_MATE_PENALTY: f64 = 5.0;

/// Loss charged when the mate is kept but its distance worsens.
const SLOWER_MATE_PENALTY: f64 = 2.0;

/// Above this advantage (pawns, either side) the position counts as
/// already decisive and losses are discounted.
const DECISIVE_EVAL_PAWNS: f64 = 5.0;

/// Discount factor applied to losses in already-decisive positions.
const DECISIVE_LOSS_SCALE: f64 = 0.3;

/// The canonical classification table. One versioned set of thresholds,
/// nothing scattered at call sites.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Losses up to this count as the engine's choice.
    pub best: f64,
    pub good: f64,
    pub inaccuracy: f64,
    pub mistake: f64,
    /// Sacrifices losing less than this stay sound.
    pub sound_sacrifice: f64,
}

impl Thresholds {
    pub const V1: Thresholds = Thresholds {
        best: 0.15,
        good: 0.5,
        inaccuracy: 1.2,
        mistake: 2.5,
        sound_sacrifice: 0.5,
    };
}

/// Quality label for a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Brilliant,
    Great,
    Best,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Brilliant => "Brilliant",
            Classification::Great => "Great",
            Classification::Best => "Best",
            Classification::Good => "Good",
            Classification::Inaccuracy => "Inaccuracy",
            Classification::Mistake => "Mistake",
            Classification::Blunder => "Blunder",
        }
    }
}

/// Outcome of the eval-loss computation for one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveAssessment {
    /// Side-aware loss in pawns, never negative.
    pub eval_loss: f64,
    /// A forced mate was involved on either side of the move.
    pub is_mate: bool,
    /// The mover had a forced mate and no longer does.
    pub lost_mate: bool,
}

/// Compute the side-aware evaluation loss for a move.
///
/// `before` and `after` are white-relative; `color` is the side that moved.
pub fn assess_move(before: Score, after: Score, color: Color) -> MoveAssessment {
    match (before.pov(color), after.pov(color)) {
        // Mate on the board before the move, gone after it.
        (Score::Mate(_), Score::Centipawn(_)) => MoveAssessment {
            eval_loss: LOST_MATE_PENALTY,
            is_mate: true,
            lost_mate: true,
        },
        // The move creates (or walks into) a forced mate; the drop, if
        // any, is judged by the mate rules on the next move instead.
        (Score::Centipawn(_), Score::Mate(_)) => MoveAssessment {
            eval_loss: 0.0,
            is_mate: true,
            lost_mate: false,
        },
        (Score::Mate(b), Score::Mate(a)) => {
            // Both mover-relative: positive = the mover mates.
            if b > 0 && a < 0 {
                // Winning mate handed to the opponent.
                MoveAssessment {
                    eval_loss: LOST_MATE_PENALTY,
                    is_mate: true,
                    lost_mate: true,
                }
            } else if (b > 0 && a > b) || (b < 0 && a < 0 && a > b) {
                // Own mate got slower, or the opponent's got faster.
                MoveAssessment {
                    eval_loss: SLOWER_MATE_PENALTY,
                    is_mate: true,
                    lost_mate: false,
                }
            } else {
                MoveAssessment {
                    eval_loss: 0.0,
                    is_mate: true,
                    lost_mate: false,
                }
            }
        }
        (Score::Centipawn(b), Score::Centipawn(a)) => {
            // Only drops count; improvements clamp to zero.
            let mut loss = (f64::from(b) - f64::from(a)).max(0.0) / 100.0;
            if f64::from(b.abs()) / 100.0 > DECISIVE_EVAL_PAWNS {
                loss *= DECISIVE_LOSS_SCALE;
            }
            MoveAssessment {
                eval_loss: loss,
                is_mate: false,
                lost_mate: false,
            }
        }
    }
}

/// Classify a move from its assessment and the mover's material delta
/// (pawns, positive = material lost).
pub fn classify_move(assessment: MoveAssessment, material_loss: i32) -> Classification {
    let t = Thresholds::V1;
    let loss = assessment.eval_loss;

    if assessment.lost_mate {
        return Classification::Blunder;
    }

    if assessment.is_mate {
        if loss <= t.best {
            if loss == 0.0 && material_loss <= 0 {
                return Classification::Great;
            }
            return Classification::Best;
        }
        return Classification::Blunder;
    }

    // A sacrifice that barely costs anything is sound.
    if material_loss > 0 && loss < t.sound_sacrifice {
        return Classification::Brilliant;
    }

    if loss == 0.0 && material_loss <= 0 {
        return Classification::Great;
    }

    if loss <= t.best {
        Classification::Best
    } else if loss <= t.good {
        Classification::Good
    } else if loss <= t.inaccuracy {
        Classification::Inaccuracy
    } else if loss <= t.mistake {
        Classification::Mistake
    } else {
        Classification::Blunder
    }
}

/// Produce the review comment for a move.
///
/// Material-loss framing wins over the generic framing; the engine's
/// recommendation is named whenever the move was neither engine-approved
/// nor framed as a material loss.
pub fn explain_move(
    classification: Classification,
    assessment: MoveAssessment,
    material_loss: i32,
    best_move: Option<&str>,
) -> String {
    match classification {
        Classification::Brilliant => {
            return format!(
                "A sound sacrifice: gives up {material_loss} point(s) of material \
                 without worsening the position."
            );
        }
        Classification::Great => return "An excellent move, better than the engine expected.".to_string(),
        Classification::Best => return "This is the best move according to the engine.".to_string(),
        _ => {}
    }

    if assessment.lost_mate {
        let mut comment = "This move throws away a forced mate.".to_string();
        if let Some(best) = best_move {
            comment.push_str(&format!(" Best was {best}."));
        }
        return comment;
    }

    if material_loss > 0 {
        return match classification {
            Classification::Blunder => {
                format!("This move loses significant material ({material_loss} point(s)).")
            }
            _ => format!("This move loses material ({material_loss} point(s))."),
        };
    }

    let mut comment = match classification {
        Classification::Good => "A reasonable move, though the engine found better.".to_string(),
        Classification::Inaccuracy => "This move misses a better continuation.".to_string(),
        Classification::Mistake => "This move misses a tactical opportunity.".to_string(),
        Classification::Blunder => "This move seriously worsens the position.".to_string(),
        _ => "This move is not optimal.".to_string(),
    };
    if let Some(best) = best_move {
        comment.push_str(&format!(" Best move: {best}."));
    }
    comment
}
