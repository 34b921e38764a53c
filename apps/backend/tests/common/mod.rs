//! Common test utilities and fixtures for integration tests.
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).
//! Every row a test creates carries the context's tag so that
//! [`TestContext::cleanup`] can remove it afterwards.

#![allow(dead_code)]

pub mod fixtures;

use uuid::Uuid;

use echoread_backend::config::Config;
use echoread_backend::db::Database;

/// Test context holding a migrated database and a per-test tag.
pub struct TestContext {
    pub db: Database,
    pub tag: String,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        let config = Config::from_env().expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&config.database_url, 2)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let tag = Uuid::new_v4().simple().to_string()[..8].to_string();

        Self { db, tag }
    }

    /// Suffix a value with this context's tag.
    pub fn tagged(&self, value: &str) -> String {
        format!("{} {}", value, self.tag)
    }

    /// User id owned by this context.
    pub fn user_id(&self, name: &str) -> String {
        format!("{}-{}", self.tag, name)
    }

    /// Remove every row created under this context's tag.
    pub async fn cleanup(&self) {
        let user_pattern = format!("{}-%", self.tag);
        let name_pattern = format!("% {}", self.tag);
        let pool = self.db.pool();

        for table in ["bookmarks", "notes", "reading_sessions", "subscriptions"] {
            let _ = sqlx::query(&format!("DELETE FROM {} WHERE user_id LIKE $1", table))
                .bind(&user_pattern)
                .execute(pool)
                .await;
        }

        let _ = sqlx::query(
            "DELETE FROM summaries WHERE book_id IN (SELECT id FROM books WHERE title LIKE $1)",
        )
        .bind(&name_pattern)
        .execute(pool)
        .await;

        let _ = sqlx::query("DELETE FROM books WHERE title LIKE $1")
            .bind(&name_pattern)
            .execute(pool)
            .await;

        let _ = sqlx::query("DELETE FROM authors WHERE name LIKE $1")
            .bind(&name_pattern)
            .execute(pool)
            .await;

        let _ = sqlx::query("DELETE FROM categories WHERE name LIKE $1")
            .bind(&name_pattern)
            .execute(pool)
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id LIKE $1")
            .bind(&user_pattern)
            .execute(pool)
            .await;
    }
}
