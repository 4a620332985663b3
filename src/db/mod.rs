//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection provider and scoped connection handles
//! - Statement execution
//! - Parameter binding and identifier quoting
//! - Type mappings

pub mod executor;
pub mod params;
pub mod pool;
pub mod types;

pub use params::quote_identifier;
pub use pool::{
    Connection, ConnectionProvider, MySqlConnectionProvider, PoolStatus, PooledConnection,
};
pub use types::RowToJson;
