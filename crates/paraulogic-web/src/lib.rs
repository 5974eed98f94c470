pub mod config;
pub mod handlers;
pub mod rate_limit;

pub use config::Config;
pub use handlers::{AppState, MAX_LETTERS, router};
