//! Read-side composites joined from several entities.
//!
//! These are never persisted. The storage layer fetches each table once per
//! request and [`assemble_books`] joins the rows in memory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Author, Book, Category, ReadingSession, Summary};

/// A book with its author, category and every summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookWithDetails {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<Author>,
    pub category: Option<Category>,
    pub summaries: Vec<Summary>,
}

/// A summary with its fully detailed book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryWithBook {
    #[serde(flatten)]
    pub summary: Summary,
    pub book: BookWithDetails,
}

/// A reading session with the summary being read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSessionWithSummary {
    #[serde(flatten)]
    pub session: ReadingSession,
    pub summary: SummaryWithBook,
}

/// Reading order: opening, main summaries by sequence number, closing.
pub fn sort_summaries(summaries: &mut [Summary]) {
    summaries.sort_by(|a, b| {
        a.summary_type
            .cmp(&b.summary_type)
            .then(a.sequence_number.cmp(&b.sequence_number))
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Join books with batch-fetched authors, categories and summaries.
///
/// Book order is preserved. A dangling author or category reference yields
/// `None` rather than an error.
pub fn assemble_books(
    books: Vec<Book>,
    authors: Vec<Author>,
    categories: Vec<Category>,
    summaries: Vec<Summary>,
) -> Vec<BookWithDetails> {
    let authors: HashMap<String, Author> =
        authors.into_iter().map(|a| (a.id.clone(), a)).collect();
    let categories: HashMap<String, Category> =
        categories.into_iter().map(|c| (c.id.clone(), c)).collect();

    let mut by_book: HashMap<String, Vec<Summary>> = HashMap::new();
    for summary in summaries {
        by_book
            .entry(summary.book_id.clone())
            .or_default()
            .push(summary);
    }

    books
        .into_iter()
        .map(|book| {
            let author = book.author_id.as_ref().and_then(|id| authors.get(id)).cloned();
            let category = book
                .category_id
                .as_ref()
                .and_then(|id| categories.get(id))
                .cloned();
            let mut summaries = by_book.remove(&book.id).unwrap_or_default();
            sort_summaries(&mut summaries);
            BookWithDetails {
                book,
                author,
                category,
                summaries,
            }
        })
        .collect()
}

/// Ids referenced by a batch of books, deduplicated.
pub fn referenced_ids(books: &[Book]) -> (Vec<String>, Vec<String>) {
    let mut author_ids: Vec<String> = books.iter().filter_map(|b| b.author_id.clone()).collect();
    let mut category_ids: Vec<String> =
        books.iter().filter_map(|b| b.category_id.clone()).collect();
    author_ids.sort();
    author_ids.dedup();
    category_ids.sort();
    category_ids.dedup();
    (author_ids, category_ids)
}
