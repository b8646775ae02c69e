//! Accuracy aggregation and the game-level summary.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::scorer::Classification;
use crate::types::{Color, MoveReview};

/// Per-move losses are capped here before averaging, mate losses included.
const ACCURACY_LOSS_CAP: f64 = 5.0;

/// Pawns-of-average-loss to accuracy-percent conversion factor.
const ACCURACY_SCALE: f64 = 25.0;

/// A loss above this marks a turning point of the game.
const KEY_MOMENT_THRESHOLD: f64 = 1.5;

/// At most this many key moments are reported.
const MAX_KEY_MOMENTS: usize = 5;

/// Classification tallies for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub brilliant: u32,
    pub great: u32,
    pub best: u32,
    pub good: u32,
    pub inaccuracy: u32,
    pub mistake: u32,
    pub blunder: u32,
}

impl ClassificationCounts {
    fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Brilliant => self.brilliant += 1,
            Classification::Great => self.great += 1,
            Classification::Best => self.best += 1,
            Classification::Good => self.good += 1,
            Classification::Inaccuracy => self.inaccuracy += 1,
            Classification::Mistake => self.mistake += 1,
            Classification::Blunder => self.blunder += 1,
        }
    }
}

/// A move whose loss crossed the key-moment threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMoment {
    pub ply: usize,
    pub san: String,
    pub color: Color,
    pub eval_loss: f64,
    pub classification: Classification,
}

/// Whole-game summary, recomputed wholesale on every review run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    /// 0–100.
    pub white_accuracy: u32,
    pub black_accuracy: u32,
    pub white_classifications: ClassificationCounts,
    pub black_classifications: ClassificationCounts,
    pub blunders: u32,
    pub mistakes: u32,
    pub inaccuracies: u32,
    pub key_moments: Vec<KeyMoment>,
}

/// Accuracy for one side: average capped loss mapped onto 0–100.
fn accuracy_for(moves: &[MoveReview], color: Color) -> u32 {
    let losses: Vec<f64> = moves
        .iter()
        .filter(|m| m.record.color == color)
        .map(|m| m.eval_loss.min(ACCURACY_LOSS_CAP))
        .collect();
    if losses.is_empty() {
        return 100;
    }
    let average = losses.iter().sum::<f64>() / losses.len() as f64;
    let accuracy = (100.0 - average * ACCURACY_SCALE).round();
    accuracy.clamp(0.0, 100.0) as u32
}

fn counts_for(moves: &[MoveReview], color: Color) -> ClassificationCounts {
    let mut counts = ClassificationCounts::default();
    for m in moves.iter().filter(|m| m.record.color == color) {
        counts.record(m.classification);
    }
    counts
}

fn key_moments(moves: &[MoveReview]) -> Vec<KeyMoment> {
    let mut moments: Vec<KeyMoment> = moves
        .iter()
        .filter(|m| m.eval_loss > KEY_MOMENT_THRESHOLD)
        .map(|m| KeyMoment {
            ply: m.record.ply,
            san: m.record.san.clone(),
            color: m.record.color,
            eval_loss: m.eval_loss,
            classification: m.classification,
        })
        .collect();
    moments.sort_by(|a, b| {
        b.eval_loss
            .partial_cmp(&a.eval_loss)
            .unwrap_or(Ordering::Equal)
    });
    moments.truncate(MAX_KEY_MOMENTS);
    moments
}

/// Reduce the per-move reviews into the game summary.
pub fn summarize(moves: &[MoveReview]) -> GameSummary {
    let white_classifications = counts_for(moves, Color::White);
    let black_classifications = counts_for(moves, Color::Black);

    GameSummary {
        white_accuracy: accuracy_for(moves, Color::White),
        black_accuracy: accuracy_for(moves, Color::Black),
        blunders: white_classifications.blunder + black_classifications.blunder,
        mistakes: white_classifications.mistake + black_classifications.mistake,
        inaccuracies: white_classifications.inaccuracy + black_classifications.inaccuracy,
        white_classifications,
        black_classifications,
        key_moments: key_moments(moves),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MoveRecord;

    fn review(ply: usize, color: Color, eval_loss: f64, classification: Classification) -> MoveReview {
        MoveReview {
            record: MoveRecord {
                ply,
                san: format!("m{ply}"),
                uci: String::new(),
                from: String::new(),
                to: String::new(),
                color,
                fen_before: String::new(),
                fen_after: String::new(),
            },
            eval_before: 0.0,
            eval_after: 0.0,
            eval_loss,
            is_mate: false,
            lost_mate: false,
            material_loss: 0,
            best_move: None,
            principal_variation: Vec::new(),
            classification,
            comment: String::new(),
        }
    }

    #[test]
    fn test_accuracy_zero_loss_is_perfect() {
        let moves = vec![
            review(0, Color::White, 0.0, Classification::Best),
            review(1, Color::Black, 0.0, Classification::Best),
        ];
        let summary = summarize(&moves);
        assert_eq!(summary.white_accuracy, 100);
        assert_eq!(summary.black_accuracy, 100);
    }

    #[test]
    fn test_accuracy_floor() {
        // A single 4-pawn loss: round(100 - 4.0 * 25) = 0.
        let moves = vec![review(0, Color::White, 4.0, Classification::Blunder)];
        let summary = summarize(&moves);
        assert_eq!(summary.white_accuracy, 0);
        // No black moves at all still reads 100.
        assert_eq!(summary.black_accuracy, 100);
    }

    #[test]
    fn test_losses_capped_before_averaging() {
        // An 8-pawn loss caps at 5.0: round(100 - 5.0 * 25) clamps to 0.
        let moves = vec![review(0, Color::White, 8.0, Classification::Blunder)];
        assert_eq!(summarize(&moves).white_accuracy, 0);
    }

    #[test]
    fn test_accuracy_average() {
        // Average of 0.4 and 0.0 = 0.2 -> round(100 - 5) = 95.
        let moves = vec![
            review(0, Color::White, 0.4, Classification::Good),
            review(2, Color::White, 0.0, Classification::Best),
        ];
        assert_eq!(summarize(&moves).white_accuracy, 95);
    }

    #[test]
    fn test_key_moments_order_and_threshold() {
        let losses = [0.1, 2.0, 1.6, 3.0, 0.5];
        let moves: Vec<MoveReview> = losses
            .iter()
            .enumerate()
            .map(|(i, &loss)| {
                let color = if i % 2 == 0 { Color::White } else { Color::Black };
                review(i, color, loss, Classification::Good)
            })
            .collect();
        let summary = summarize(&moves);
        let plies: Vec<usize> = summary.key_moments.iter().map(|k| k.ply).collect();
        assert_eq!(plies, vec![3, 1, 2]);
    }

    #[test]
    fn test_key_moments_truncated_to_five() {
        let moves: Vec<MoveReview> = (0..8)
            .map(|i| review(i, Color::White, 2.0 + i as f64, Classification::Blunder))
            .collect();
        let summary = summarize(&moves);
        assert_eq!(summary.key_moments.len(), 5);
        assert_eq!(summary.key_moments[0].ply, 7);
    }

    #[test]
    fn test_totals_count_both_sides() {
        let moves = vec![
            review(0, Color::White, 3.0, Classification::Blunder),
            review(1, Color::Black, 2.0, Classification::Mistake),
            review(2, Color::White, 1.0, Classification::Inaccuracy),
            review(3, Color::Black, 3.5, Classification::Blunder),
        ];
        let summary = summarize(&moves);
        assert_eq!(summary.blunders, 2);
        assert_eq!(summary.mistakes, 1);
        assert_eq!(summary.inaccuracies, 1);
        assert_eq!(summary.white_classifications.blunder, 1);
        assert_eq!(summary.black_classifications.blunder, 1);
    }
}
