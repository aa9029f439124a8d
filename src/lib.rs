// HTTP server
pub mod api_error;
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

// Postgres persistence
pub mod store;

// Reply generation
pub mod llm;

// Client side: REST client, batching, offline history
pub mod client;
