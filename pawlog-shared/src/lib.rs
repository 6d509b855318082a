//! # Pawlog Shared Library
//!
//! Core of the Pawlog service-animal training tracker: entities, persistence, and the
//! services the HTTP API is built from.
//!
//! ## Module Organization
//!
//! - `models`: users, animals, training logs and their projections
//! - `store`: repository traits with PostgreSQL and in-memory implementations
//! - `db`: connection pool and migrations
//! - `auth`: password hashing, bearer tokens, the authorization gate, login
//! - `linker`: record creation with ownership and uniqueness checks
//! - `pagination`: keyset-paginated listings
//! - `blob`: uploads to external blob storage
//! - `error`: the service error taxonomy

pub mod auth;
pub mod blob;
pub mod db;
pub mod error;
pub mod linker;
pub mod models;
pub mod pagination;
pub mod store;

/// Current version of the Pawlog shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
