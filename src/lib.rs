pub mod analysis;
pub mod app;
pub mod cache;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod report;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Settings;
pub use state::AppState;
pub use storage::Store;
