//! Database layer: connection, schema reconciliation, record store

pub mod init;
pub mod migrations;
pub mod models;
pub mod reconcile;
pub mod records;
pub mod table_schemas;

pub use init::*;
pub use models::*;
pub use records::*;
