//! # Pawlog API Server Library
//!
//! HTTP surface of the Pawlog training tracker.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and the authorization gate layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
