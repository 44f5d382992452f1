pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod geo;
pub mod models;
pub mod observability;
pub mod payments;
pub mod session;
pub mod state;
pub mod store;
