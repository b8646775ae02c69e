pub mod cache;
pub mod config;
pub mod error;
pub mod game;
pub mod review;
pub mod session;
pub mod uci;

pub use cache::{position_key, Analyzer};
pub use config::ReviewConfig;
pub use error::ReviewError;
pub use review::{GameReviewer, ReviewState};
pub use session::{EngineSession, RawAnalysis, SessionOptions};
