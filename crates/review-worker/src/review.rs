//! Game review orchestrator.
//!
//! Walks the move list in order, drives the analyzer for the before/after
//! position of every ply, scores and classifies each move, and reduces
//! the move reviews into the game summary.

use tracing::{debug, info};

use review_core::export::export_review_json;
use review_core::{
    assess_move, classify_move, explain_move, summarize, GameReview, MoveRecord, MoveReview,
};

use crate::cache::Analyzer;
use crate::error::ReviewError;
use crate::game;

/// Orchestrator lifecycle. A second `generate_review` while one is
/// running is rejected, not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Idle,
    Running,
    Complete,
    Failed,
}

pub struct GameReviewer {
    analyzer: Analyzer,
    state: ReviewState,
    last_review: Option<GameReview>,
}

impl GameReviewer {
    pub fn new(analyzer: Analyzer) -> Self {
        GameReviewer {
            analyzer,
            state: ReviewState::Idle,
            last_review: None,
        }
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn review(&self) -> Option<&GameReview> {
        self.last_review.as_ref()
    }

    /// Review a full game. Progress is reported as 0–100 after each ply.
    ///
    /// The before/after evaluations are awaited sequentially through the
    /// cache: the session serializes them anyway, and sequencing makes the
    /// one-engine-call-per-position guarantee structural rather than a
    /// property of request timing.
    pub async fn generate_review<F>(
        &mut self,
        moves: &[MoveRecord],
        mut progress: F,
    ) -> Result<GameReview, ReviewError>
    where
        F: FnMut(u8),
    {
        if self.state == ReviewState::Running {
            return Err(ReviewError::ReviewInProgress);
        }
        if moves.is_empty() {
            self.state = ReviewState::Failed;
            return Err(ReviewError::InvalidMoveList("move list is empty".to_string()));
        }
        self.state = ReviewState::Running;

        let total = moves.len();
        let mut reviews: Vec<MoveReview> = Vec::with_capacity(total);

        for record in moves {
            let before = self.analyzer.evaluate(&record.fen_before).await;
            let after = self.analyzer.evaluate(&record.fen_after).await;

            let material_loss =
                match game::material_loss(&record.fen_before, &record.fen_after, record.color) {
                    Ok(delta) => delta,
                    Err(e) => {
                        self.state = ReviewState::Failed;
                        return Err(e);
                    }
                };

            let assessment = assess_move(before.score, after.score, record.color);
            let classification = classify_move(assessment, material_loss);
            let comment = explain_move(
                classification,
                assessment,
                material_loss,
                before.best_move.as_deref(),
            );

            debug!(
                ply = record.ply,
                san = %record.san,
                eval_loss = assessment.eval_loss,
                classification = classification.label(),
                "Move scored"
            );

            reviews.push(MoveReview {
                record: record.clone(),
                eval_before: before.score.to_pawns(),
                eval_after: after.score.to_pawns(),
                eval_loss: assessment.eval_loss,
                is_mate: assessment.is_mate,
                lost_mate: assessment.lost_mate,
                material_loss,
                best_move: before.best_move.clone(),
                principal_variation: before.principal_variation.clone(),
                classification,
                comment,
            });

            let percent = ((record.ply + 1) as f64 * 100.0 / total as f64).round() as u8;
            progress(percent);
        }

        let summary = summarize(&reviews);
        info!(
            moves = total,
            white_accuracy = summary.white_accuracy,
            black_accuracy = summary.black_accuracy,
            distinct_positions = self.analyzer.cached_positions(),
            "Review complete"
        );

        let review = GameReview {
            moves: reviews,
            summary,
        };
        self.last_review = Some(review.clone());
        self.state = ReviewState::Complete;
        Ok(review)
    }

    /// Drop the review result and the analysis cache (new game loaded).
    pub fn clear_review(&mut self) {
        self.analyzer.reset();
        self.last_review = None;
        self.state = ReviewState::Idle;
    }

    /// Serialize the last completed review into the JSON export format.
    pub fn export_json(&self) -> Result<Option<String>, ReviewError> {
        match &self.last_review {
            Some(review) => Ok(Some(export_review_json(review)?)),
            None => Ok(None),
        }
    }

    /// Tear down, shutting the engine down cleanly.
    pub async fn shutdown(self) {
        self.analyzer.quit().await;
    }
}
