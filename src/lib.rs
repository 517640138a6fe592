pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod importer;
pub mod membership;
pub mod middleware;
pub mod models;
pub mod search;
pub mod services;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod testing;
