pub mod config;
pub mod error;
pub mod fixture_difficulty;
pub mod fpl_fetch;
pub mod fpl_types;
pub mod http_client;
pub mod logging;
pub mod scout;
pub mod scout_export;
pub mod scout_score;
pub mod state;
