//! Local SQLite storage for client-side markers.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::StoreError;
pub use repository::{MarkerRepository, SqliteMarkerStore};
