//! SignalServe Server
//!
//! HTTP front end for a trained classification model: `POST /predecir`
//! returns the predicted class, its color and per-class probabilities,
//! `GET /info` publishes the model descriptor.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::{CorsConfig, ServerConfig};
pub use routes::create_router;
pub use state::AppState;
