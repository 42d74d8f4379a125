pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod redirect;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
pub mod views;

pub use routes::app;
pub use state::AppState;
