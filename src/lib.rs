pub mod error;
pub mod models;
pub mod services;

pub use error::{ScoreboardError, ScoreboardResult};
pub use services::filter::TeamFilter;
pub use services::scoreboard_service::{Scoreboard, ScoreboardService, compute_scoreboard};
