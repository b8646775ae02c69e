//! Worker configuration from environment variables

use std::env;
use std::time::Duration;

use crate::error::ReviewError;
use crate::session::SessionOptions;

#[derive(Clone, Debug)]
pub struct ReviewConfig {
    /// Path to the engine binary (UCI-speaking).
    pub stockfish_path: String,

    /// Search depth per position.
    pub depth: u32,

    /// Seconds to wait for a terminal engine response before falling back
    /// to the neutral evaluation.
    pub request_timeout_secs: u64,

    /// Engine option passthrough; not interpreted here.
    pub skill_level: Option<u8>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
}

impl ReviewConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ReviewError> {
        let stockfish_path = env::var("STOCKFISH_PATH")
            .unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string());

        let depth = env::var("ANALYSIS_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);
        if depth == 0 {
            return Err(ReviewError::Config("ANALYSIS_DEPTH must be at least 1"));
        }

        let request_timeout_secs = env::var("ENGINE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let skill_level = env::var("ENGINE_SKILL_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok());

        let threads = env::var("ENGINE_THREADS").ok().and_then(|v| v.parse().ok());

        let hash_mb = env::var("ENGINE_HASH_MB").ok().and_then(|v| v.parse().ok());

        Ok(Self {
            stockfish_path,
            depth,
            request_timeout_secs,
            skill_level,
            threads,
            hash_mb,
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            skill_level: self.skill_level,
            threads: self.threads,
            hash_mb: self.hash_mb,
            ..SessionOptions::default()
        }
    }
}
