//! Per-user reading activity: sessions, bookmarks and notes

use echoread_core::{
    prepare_insert, prepare_patch, BookmarkPatch, EntityPatch, InsertBookmark, InsertNote,
    InsertReadingSession, NotePatch, ReadingSessionPatch,
};

use super::Database;
use crate::error::{Result, StoreError};
use crate::models::*;

impl Database {
    // === Reading Session Repository ===

    pub async fn create_reading_session(
        &self,
        session: InsertReadingSession,
    ) -> Result<ReadingSession> {
        let session = prepare_insert(session)?;

        let sql = format!(
            r#"
            INSERT INTO reading_sessions (user_id, summary_id, progress_percent, current_position,
                                          is_completed, time_spent_minutes, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            READING_SESSION_COLUMNS
        );
        let row = sqlx::query_as::<_, DbReadingSession>(&sql)
            .bind(&session.user_id)
            .bind(&session.summary_id)
            .bind(session.progress_percent)
            .bind(session.current_position)
            .bind(session.is_completed)
            .bind(session.time_spent_minutes)
            .bind(session.completed_at)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(
            session_id = %row.id,
            user_id = %row.user_id,
            summary_id = %row.summary_id,
            "Started reading session"
        );
        Ok(row.into())
    }

    pub async fn get_reading_session(&self, id: &str) -> Result<Option<ReadingSession>> {
        let sql = format!(
            "SELECT {} FROM reading_sessions WHERE id = $1",
            READING_SESSION_COLUMNS
        );
        let row = sqlx::query_as::<_, DbReadingSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Record progress. Always bumps `last_accessed_at`.
    pub async fn update_reading_session(
        &self,
        id: &str,
        patch: ReadingSessionPatch,
    ) -> Result<ReadingSession> {
        let patch = prepare_patch::<ReadingSession, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM reading_sessions WHERE id = $1 FOR UPDATE",
            READING_SESSION_COLUMNS
        );
        let mut session: ReadingSession = sqlx::query_as::<_, DbReadingSession>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("reading_session", id))?
            .into();

        patch.apply(&mut session);

        let sql = format!(
            r#"
            UPDATE reading_sessions
            SET progress_percent = $2, current_position = $3, is_completed = $4,
                time_spent_minutes = $5, completed_at = $6, last_accessed_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            READING_SESSION_COLUMNS
        );
        let row = sqlx::query_as::<_, DbReadingSession>(&sql)
            .bind(id)
            .bind(session.progress_percent)
            .bind(session.current_position)
            .bind(session.is_completed)
            .bind(session.time_spent_minutes)
            .bind(session.completed_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// A user's sessions, most recently accessed first.
    pub async fn list_reading_sessions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReadingSession>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM reading_sessions
            WHERE user_id = $1
            ORDER BY last_accessed_at DESC
            "#,
            READING_SESSION_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbReadingSession>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    // === Bookmark Repository ===

    pub async fn create_bookmark(&self, bookmark: InsertBookmark) -> Result<Bookmark> {
        let bookmark = prepare_insert(bookmark)?;

        let sql = format!(
            r#"
            INSERT INTO bookmarks (user_id, summary_id, position, note)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            BOOKMARK_COLUMNS
        );
        let row = sqlx::query_as::<_, DbBookmark>(&sql)
            .bind(&bookmark.user_id)
            .bind(&bookmark.summary_id)
            .bind(bookmark.position)
            .bind(&bookmark.note)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    /// A user's bookmarks, optionally narrowed to one summary, by position.
    pub async fn list_bookmarks(
        &self,
        user_id: &str,
        summary_id: Option<&str>,
    ) -> Result<Vec<Bookmark>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM bookmarks
            WHERE user_id = $1 AND ($2::varchar IS NULL OR summary_id = $2)
            ORDER BY summary_id, position
            "#,
            BOOKMARK_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbBookmark>(&sql)
            .bind(user_id)
            .bind(summary_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_bookmark(&self, id: &str, patch: BookmarkPatch) -> Result<Bookmark> {
        let patch = prepare_patch::<Bookmark, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM bookmarks WHERE id = $1 FOR UPDATE", BOOKMARK_COLUMNS);
        let mut bookmark: Bookmark = sqlx::query_as::<_, DbBookmark>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("bookmark", id))?
            .into();

        patch.apply(&mut bookmark);

        let sql = format!(
            "UPDATE bookmarks SET position = $2, note = $3 WHERE id = $1 RETURNING {}",
            BOOKMARK_COLUMNS
        );
        let row = sqlx::query_as::<_, DbBookmark>(&sql)
            .bind(id)
            .bind(bookmark.position)
            .bind(&bookmark.note)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    // === Note Repository ===

    pub async fn create_note(&self, note: InsertNote) -> Result<Note> {
        let note = prepare_insert(note)?;

        let sql = format!(
            r#"
            INSERT INTO notes (user_id, summary_id, content, position, is_private)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            NOTE_COLUMNS
        );
        let row = sqlx::query_as::<_, DbNote>(&sql)
            .bind(&note.user_id)
            .bind(&note.summary_id)
            .bind(&note.content)
            .bind(note.position)
            .bind(note.is_private)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    /// A user's notes, optionally narrowed to one summary, newest first.
    pub async fn list_notes(&self, user_id: &str, summary_id: Option<&str>) -> Result<Vec<Note>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM notes
            WHERE user_id = $1 AND ($2::varchar IS NULL OR summary_id = $2)
            ORDER BY created_at DESC
            "#,
            NOTE_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbNote>(&sql)
            .bind(user_id)
            .bind(summary_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_note(&self, id: &str, patch: NotePatch) -> Result<Note> {
        let patch = prepare_patch::<Note, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM notes WHERE id = $1 FOR UPDATE", NOTE_COLUMNS);
        let mut note: Note = sqlx::query_as::<_, DbNote>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("note", id))?
            .into();

        patch.apply(&mut note);

        let sql = format!(
            r#"
            UPDATE notes
            SET content = $2, position = $3, is_private = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            NOTE_COLUMNS
        );
        let row = sqlx::query_as::<_, DbNote>(&sql)
            .bind(id)
            .bind(&note.content)
            .bind(note.position)
            .bind(note.is_private)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }
}
