//! Position-keyed analysis cache and the normalization point.
//!
//! The [`Analyzer`] owns the engine session plus the memo table for one
//! review session. Adjacent plies share a position (the "after" of move i
//! is the "before" of move i+1), so each distinct position costs at most
//! one engine call across the whole review.

use std::collections::HashMap;

use tracing::debug;

use review_core::{Color, PositionEvaluation, Score};

use crate::session::{EngineSession, RawAnalysis};
use crate::uci::EngineScore;

/// Canonical cache key for a position: board, side to move, castling and
/// en-passant state. The clocks are dropped on purpose: transpositions
/// differing only in move counters evaluate identically.
pub fn position_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Side to move encoded in a FEN.
pub fn side_to_move(fen: &str) -> Color {
    match fen.split_whitespace().nth(1) {
        Some("b") => Color::Black,
        _ => Color::White,
    }
}

/// Convert a raw engine result into the white-relative evaluation stored
/// in the cache. The engine scores from the side to move's perspective;
/// this is the single sign-flip point for the whole pipeline.
fn normalize(raw: RawAnalysis, stm: Color) -> PositionEvaluation {
    let score = match raw.score {
        Some(EngineScore::Cp(cp)) => Score::from_engine(Score::Centipawn(cp), stm),
        Some(EngineScore::Mate(m)) => Score::from_engine(Score::Mate(m), stm),
        None => Score::neutral(),
    };
    PositionEvaluation {
        score,
        best_move: raw.best_move,
        principal_variation: raw.pv,
    }
}

/// Engine session plus memoized evaluations, scoped to one review session.
pub struct Analyzer {
    session: EngineSession,
    depth: u32,
    cache: HashMap<String, PositionEvaluation>,
}

impl Analyzer {
    pub fn new(session: EngineSession, depth: u32) -> Self {
        Analyzer {
            session,
            depth,
            cache: HashMap::new(),
        }
    }

    /// Get-or-compute the evaluation for a position. The first completed
    /// analysis for a key wins; entries are never overwritten.
    pub async fn evaluate(&mut self, fen: &str) -> PositionEvaluation {
        let key = position_key(fen);
        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, "analysis cache hit");
            return hit.clone();
        }
        let raw = self.session.request(fen, self.depth).await;
        let evaluation = normalize(raw, side_to_move(fen));
        self.cache
            .entry(key)
            .or_insert_with(|| evaluation)
            .clone()
    }

    /// Drop all memoized evaluations (new game loaded or explicit reset).
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    pub fn cached_positions(&self) -> usize {
        self.cache.len()
    }

    pub fn is_available(&self) -> bool {
        self.session.is_available()
    }

    /// Tear down, shutting the engine down cleanly.
    pub async fn quit(self) {
        self.session.quit().await;
    }
}
