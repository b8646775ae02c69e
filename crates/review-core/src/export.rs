//! External export format for a completed review.
//!
//! Field names are camelCase to match the consumers of the old review
//! format; internal types stay snake_case.

use serde::Serialize;

use crate::summary::KeyMoment;
use crate::types::GameReview;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveExport {
    #[serde(rename = "move")]
    pub san: String,
    pub eval_before: f64,
    pub eval_after: f64,
    pub best_move: Option<String>,
    pub classification: String,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMomentExport {
    pub move_index: usize,
    #[serde(rename = "move")]
    pub san: String,
    pub eval_loss: f64,
    pub classification: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryExport {
    pub white_accuracy: u32,
    pub black_accuracy: u32,
    pub blunders: u32,
    pub mistakes: u32,
    pub inaccuracies: u32,
    pub key_moments: Vec<KeyMomentExport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewExport {
    pub moves: Vec<MoveExport>,
    pub summary: SummaryExport,
}

impl From<&KeyMoment> for KeyMomentExport {
    fn from(k: &KeyMoment) -> Self {
        KeyMomentExport {
            move_index: k.ply,
            san: k.san.clone(),
            eval_loss: k.eval_loss,
            classification: k.classification.label().to_string(),
        }
    }
}

impl From<&GameReview> for ReviewExport {
    fn from(review: &GameReview) -> Self {
        ReviewExport {
            moves: review
                .moves
                .iter()
                .map(|m| MoveExport {
                    san: m.record.san.clone(),
                    eval_before: m.eval_before,
                    eval_after: m.eval_after,
                    best_move: m.best_move.clone(),
                    classification: m.classification.label().to_string(),
                    comment: m.comment.clone(),
                })
                .collect(),
            summary: SummaryExport {
                white_accuracy: review.summary.white_accuracy,
                black_accuracy: review.summary.black_accuracy,
                blunders: review.summary.blunders,
                mistakes: review.summary.mistakes,
                inaccuracies: review.summary.inaccuracies,
                key_moments: review.summary.key_moments.iter().map(Into::into).collect(),
            },
        }
    }
}

/// Serialize a review into the pretty-printed JSON export.
pub fn export_review_json(review: &GameReview) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ReviewExport::from(review))
}
