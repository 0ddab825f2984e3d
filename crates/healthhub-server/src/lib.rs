//! HealthHub HTTP server: configuration, bootstrap seeding, and the
//! axum router over the workflow engine and storage backends.

pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod routes;
pub mod state;

pub use config::{AppConfig, load_config};
pub use routes::build_router;
pub use state::AppState;
