pub mod config_loader;
pub mod contest_clock;
pub mod contest_loader;
pub mod contest_processor;
pub mod filter;
pub mod ranker;
pub mod scoreboard_service;
pub mod statistics;
pub mod submission_lister;
