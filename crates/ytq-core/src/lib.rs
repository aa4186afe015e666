pub mod config;
pub mod logging;

// Core modules: queue orchestration over an external downloader process.
pub mod control;
pub mod events;
pub mod jobs;
pub mod parser;
pub mod queue;
pub mod runner;
