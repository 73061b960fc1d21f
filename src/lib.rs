pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod format;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod state;
pub mod upstream;
pub mod validation;

pub use app::app;
pub use state::AppState;
