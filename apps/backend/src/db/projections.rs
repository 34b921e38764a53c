//! Composite read models
//!
//! Each projection fetches every table it needs once per call and joins in
//! memory, so listing N books costs a fixed number of queries.

use std::collections::HashMap;

use echoread_core::projection::{assemble_books, referenced_ids};
use echoread_core::{BookWithDetails, ReadingSessionWithSummary, SummaryWithBook};

use super::Database;
use crate::error::{Result, StoreError};
use crate::models::*;

impl Database {
    /// A book with its author, category and all of its summaries.
    pub async fn get_book_with_details(&self, id: &str) -> Result<Option<BookWithDetails>> {
        let Some(book) = self.get_book(id).await? else {
            return Ok(None);
        };
        Ok(self.details_for_books(vec![book]).await?.pop())
    }

    /// Every book, or only those of one category, alphabetical.
    pub async fn list_books_with_details(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<BookWithDetails>> {
        let books = match category_id {
            Some(category_id) => self.list_books_by_category(category_id).await?,
            None => {
                let sql = format!("SELECT {} FROM books ORDER BY title", BOOK_COLUMNS);
                sqlx::query_as::<_, DbBook>(&sql)
                    .fetch_all(&self.pool)
                    .await?
                    .into_iter()
                    .map(Into::into)
                    .collect()
            }
        };
        self.details_for_books(books).await
    }

    pub async fn get_summary_with_book(&self, id: &str) -> Result<Option<SummaryWithBook>> {
        let Some(summary) = self.get_summary(id).await? else {
            return Ok(None);
        };
        let mut joined = self.join_books(vec![summary]).await?;
        Ok(joined.pop())
    }

    pub async fn get_reading_session_with_summary(
        &self,
        id: &str,
    ) -> Result<Option<ReadingSessionWithSummary>> {
        let Some(session) = self.get_reading_session(id).await? else {
            return Ok(None);
        };
        Ok(self.join_summaries(vec![session]).await?.pop())
    }

    /// A user's sessions with what they are reading, most recent first.
    pub async fn list_reading_sessions_with_summary(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReadingSessionWithSummary>> {
        let sessions = self.list_reading_sessions_for_user(user_id).await?;
        self.join_summaries(sessions).await
    }

    async fn details_for_books(&self, books: Vec<Book>) -> Result<Vec<BookWithDetails>> {
        if books.is_empty() {
            return Ok(Vec::new());
        }
        let (author_ids, category_ids) = referenced_ids(&books);
        let book_ids: Vec<String> = books.iter().map(|b| b.id.clone()).collect();

        let authors = self.authors_by_ids(&author_ids).await?;
        let categories = self.categories_by_ids(&category_ids).await?;
        let summaries = self.summaries_for_books(&book_ids, false).await?;

        Ok(assemble_books(books, authors, categories, summaries))
    }

    async fn join_books(&self, summaries: Vec<Summary>) -> Result<Vec<SummaryWithBook>> {
        let mut book_ids: Vec<String> = summaries.iter().map(|s| s.book_id.clone()).collect();
        book_ids.sort();
        book_ids.dedup();

        let books = self.books_by_ids(&book_ids).await?;
        let details: HashMap<String, BookWithDetails> = self
            .details_for_books(books)
            .await?
            .into_iter()
            .map(|d| (d.book.id.clone(), d))
            .collect();

        summaries
            .into_iter()
            .map(|summary| {
                let book = details.get(&summary.book_id).cloned().ok_or_else(|| {
                    StoreError::InvalidData(format!(
                        "summary {} references missing book {}",
                        summary.id, summary.book_id
                    ))
                })?;
                Ok(SummaryWithBook { summary, book })
            })
            .collect()
    }

    async fn join_summaries(
        &self,
        sessions: Vec<ReadingSession>,
    ) -> Result<Vec<ReadingSessionWithSummary>> {
        if sessions.is_empty() {
            return Ok(Vec::new());
        }
        let mut summary_ids: Vec<String> = sessions.iter().map(|s| s.summary_id.clone()).collect();
        summary_ids.sort();
        summary_ids.dedup();

        let sql = format!("SELECT {} FROM summaries WHERE id = ANY($1)", SUMMARY_COLUMNS);
        let rows = sqlx::query_as::<_, DbSummary>(&sql)
            .bind(&summary_ids)
            .fetch_all(&self.pool)
            .await?;
        let summaries = summaries_from_rows(rows)?;

        let by_id: HashMap<String, SummaryWithBook> = self
            .join_books(summaries)
            .await?
            .into_iter()
            .map(|s| (s.summary.id.clone(), s))
            .collect();

        sessions
            .into_iter()
            .map(|session| {
                let summary = by_id.get(&session.summary_id).cloned().ok_or_else(|| {
                    StoreError::InvalidData(format!(
                        "reading session {} references missing summary {}",
                        session.id, session.summary_id
                    ))
                })?;
                Ok(ReadingSessionWithSummary { session, summary })
            })
            .collect()
    }
}
