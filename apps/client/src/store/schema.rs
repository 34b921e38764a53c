//! SQLite schema definitions.

/// Complete schema for the local client database.
pub const SCHEMA: &str = r#"
-- Presence markers (trial, subscription, onboarding)
CREATE TABLE IF NOT EXISTS local_markers (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
