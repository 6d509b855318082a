/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// Row access goes through [`crate::store::postgres::PgRepository`].

pub mod migrations;
pub mod pool;
