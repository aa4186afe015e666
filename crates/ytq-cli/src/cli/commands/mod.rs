//! CLI command handlers. Each command is in its own file for clarity.

mod completions;
mod cookies;
mod run;

pub use completions::run_completions;
pub use cookies::run_cookies;
pub use run::run_queue;
