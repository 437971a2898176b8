//! # Varant Database Crate
//!
//! This crate is the relational adapter for the two stores the analysis reads:
//! the instrument catalog (derivatives joined with brokerages) and the tick
//! store holding daily OHLCV bars.
//!
//! ## Architectural Principles
//!
//! - **Adapter only:** All SQL lives here. Rows come back in their raw stored
//!   shape; turning them into normalized instruments is the caller's job.
//! - **Request-scoped connections:** `connect` opens a single-connection pool
//!   for one request. Callers close it when they are done; nothing is shared
//!   between requests.
//!
//! ## Public API
//!
//! - `connect`: Opens a request-scoped connection pool for a DSN.
//! - `DbRepository`: Holds the pool and runs the two queries.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::connect;
pub use error::DbError;
pub use repository::{DbDerivative, DbPricePair, DbRepository};
