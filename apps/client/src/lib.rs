//! Reading client session layer.
//!
//! Owns the device-local marker store and drives the navigation gate from
//! auth resolution and marker changes.

pub mod auth;
pub mod error;
pub mod navigation;
pub mod state;
pub mod store;

pub use auth::AuthHandle;
pub use error::{ClientError, Result};
pub use navigation::NavigationSession;
pub use state::ClientState;
pub use store::{MarkerRepository, SqliteMarkerStore};

use std::path::PathBuf;

/// Location of the local marker database.
pub fn get_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("echoread")
        .join("client.db")
}

/// Open the marker store at [`get_db_path`], creating its directory.
pub fn open_default_store() -> Result<SqliteMarkerStore> {
    let db_path = get_db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!(path = %db_path.display(), "Opening local marker store");
    Ok(SqliteMarkerStore::open(&db_path)?)
}
