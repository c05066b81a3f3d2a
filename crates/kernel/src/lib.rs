//! Croupier kernel library.
//!
//! Multilingual casino and slot catalogue: the content core, its
//! PostgreSQL repository, and the JSON API. The `croupier` binary serves it.

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
