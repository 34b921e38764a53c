//! Summaries and their JSONB payloads

use echoread_core::{prepare_insert, prepare_patch, EntityPatch, InsertSummary, SummaryPatch};
use sqlx::types::Json;

use super::Database;
use crate::error::{Result, StoreError};
use crate::models::*;

impl Database {
    // === Summary Repository ===

    pub async fn create_summary(&self, summary: InsertSummary) -> Result<Summary> {
        let summary = prepare_insert(summary)?;

        let sql = format!(
            r#"
            INSERT INTO summaries (book_id, title, content, in_this_summary, key_takeaways,
                                   big_ideas, about_author, reading_time_minutes, audio_url,
                                   audio_duration_minutes, text_timings, chapter_markers,
                                   use_auto_scroll, summary_type, sequence_number,
                                   is_published, is_premium)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {}
            "#,
            SUMMARY_COLUMNS
        );
        let row = sqlx::query_as::<_, DbSummary>(&sql)
            .bind(&summary.book_id)
            .bind(&summary.title)
            .bind(&summary.content)
            .bind(&summary.in_this_summary)
            .bind(summary.key_takeaways.as_ref().map(Json))
            .bind(summary.big_ideas.as_ref().map(Json))
            .bind(&summary.about_author)
            .bind(summary.reading_time_minutes)
            .bind(&summary.audio_url)
            .bind(summary.audio_duration_minutes)
            .bind(summary.text_timings.as_ref().map(Json))
            .bind(summary.chapter_markers.as_ref().map(Json))
            .bind(summary.use_auto_scroll)
            .bind(summary.summary_type.as_str())
            .bind(summary.sequence_number)
            .bind(summary.is_published)
            .bind(summary.is_premium)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(
            summary_id = %row.id,
            book_id = %row.book_id,
            summary_type = %row.summary_type,
            "Created summary"
        );
        row.try_into()
    }

    pub async fn get_summary(&self, id: &str) -> Result<Option<Summary>> {
        let sql = format!("SELECT {} FROM summaries WHERE id = $1", SUMMARY_COLUMNS);
        let row = sqlx::query_as::<_, DbSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Summary::try_from).transpose()
    }

    pub async fn update_summary(&self, id: &str, patch: SummaryPatch) -> Result<Summary> {
        let patch = prepare_patch::<Summary, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM summaries WHERE id = $1 FOR UPDATE", SUMMARY_COLUMNS);
        let mut summary: Summary = sqlx::query_as::<_, DbSummary>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("summary", id))?
            .try_into()?;

        patch.apply(&mut summary);

        let sql = format!(
            r#"
            UPDATE summaries
            SET title = $2, content = $3, in_this_summary = $4, key_takeaways = $5, big_ideas = $6,
                about_author = $7, reading_time_minutes = $8, audio_url = $9,
                audio_duration_minutes = $10, text_timings = $11, chapter_markers = $12,
                use_auto_scroll = $13, summary_type = $14, sequence_number = $15,
                is_published = $16, is_premium = $17, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SUMMARY_COLUMNS
        );
        let row = sqlx::query_as::<_, DbSummary>(&sql)
            .bind(id)
            .bind(&summary.title)
            .bind(&summary.content)
            .bind(&summary.in_this_summary)
            .bind(summary.key_takeaways.as_ref().map(Json))
            .bind(summary.big_ideas.as_ref().map(Json))
            .bind(&summary.about_author)
            .bind(summary.reading_time_minutes)
            .bind(&summary.audio_url)
            .bind(summary.audio_duration_minutes)
            .bind(summary.text_timings.as_ref().map(Json))
            .bind(summary.chapter_markers.as_ref().map(Json))
            .bind(summary.use_auto_scroll)
            .bind(summary.summary_type.as_str())
            .bind(summary.sequence_number)
            .bind(summary.is_published)
            .bind(summary.is_premium)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        row.try_into()
    }

    /// Summaries of a book in reading order.
    pub async fn list_summaries_for_book(
        &self,
        book_id: &str,
        published_only: bool,
    ) -> Result<Vec<Summary>> {
        self.summaries_for_books(&[book_id.to_string()], published_only)
            .await
    }

    /// Summaries of several books in reading order.
    pub(crate) async fn summaries_for_books(
        &self,
        book_ids: &[String],
        published_only: bool,
    ) -> Result<Vec<Summary>> {
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"
            SELECT {}
            FROM summaries
            WHERE book_id = ANY($1) AND (is_published OR NOT $2)
            "#,
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbSummary>(&sql)
            .bind(book_ids)
            .bind(published_only)
            .fetch_all(&self.pool)
            .await?;

        let mut summaries = summaries_from_rows(rows)?;
        echoread_core::projection::sort_summaries(&mut summaries);
        Ok(summaries)
    }
}
