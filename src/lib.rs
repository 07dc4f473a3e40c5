pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod notifier;
pub mod routes;
pub mod state;
