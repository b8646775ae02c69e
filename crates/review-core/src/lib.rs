//! Pure scoring library for game review.
//!
//! No engine or I/O dependencies; everything here operates on
//! white-relative [`Score`] values produced by the worker's normalizer.

pub mod export;
pub mod score;
pub mod scorer;
pub mod summary;
pub mod types;

pub use score::{PositionEvaluation, Score};
pub use scorer::{assess_move, classify_move, explain_move, Classification, MoveAssessment};
pub use summary::{summarize, ClassificationCounts, GameSummary, KeyMoment};
pub use types::{Color, GameReview, MoveRecord, MoveReview};
