//! Categories, authors and books

use echoread_core::{
    prepare_insert, prepare_patch, AuthorPatch, BookPatch, CategoryPatch, EntityPatch,
    InsertAuthor, InsertBook, InsertCategory,
};

use super::Database;
use crate::error::{Result, StoreError};
use crate::models::*;

impl Database {
    // === Category Repository ===

    pub async fn create_category(&self, category: InsertCategory) -> Result<Category> {
        let category = prepare_insert(category)?;

        let sql = format!(
            r#"
            INSERT INTO categories (name, slug, description, icon_name, color, is_active,
                                    sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        let row = sqlx::query_as::<_, DbCategory>(&sql)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.icon_name)
            .bind(&category.color)
            .bind(category.is_active)
            .bind(category.sort_order)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(category_id = %row.id, slug = %row.slug, "Created category");
        Ok(row.into())
    }

    pub async fn get_category(&self, id: &str) -> Result<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        let row = sqlx::query_as::<_, DbCategory>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE slug = $1", CATEGORY_COLUMNS);
        let row = sqlx::query_as::<_, DbCategory>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Active categories in display order.
    pub async fn list_active_categories(&self) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE is_active ORDER BY sort_order, name",
            CATEGORY_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbCategory>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_category(&self, id: &str, patch: CategoryPatch) -> Result<Category> {
        let patch = prepare_patch::<Category, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM categories WHERE id = $1 FOR UPDATE", CATEGORY_COLUMNS);
        let mut category: Category = sqlx::query_as::<_, DbCategory>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("category", id))?
            .into();

        patch.apply(&mut category);

        let sql = format!(
            r#"
            UPDATE categories
            SET name = $2, slug = $3, description = $4, icon_name = $5, color = $6,
                is_active = $7, sort_order = $8
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        let row = sqlx::query_as::<_, DbCategory>(&sql)
            .bind(id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.icon_name)
            .bind(&category.color)
            .bind(category.is_active)
            .bind(category.sort_order)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    // === Author Repository ===

    pub async fn create_author(&self, author: InsertAuthor) -> Result<Author> {
        let author = prepare_insert(author)?;

        let sql = format!(
            "INSERT INTO authors (name, bio, image_url) VALUES ($1, $2, $3) RETURNING {}",
            AUTHOR_COLUMNS
        );
        let row = sqlx::query_as::<_, DbAuthor>(&sql)
            .bind(&author.name)
            .bind(&author.bio)
            .bind(&author.image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    pub async fn get_author(&self, id: &str) -> Result<Option<Author>> {
        let sql = format!("SELECT {} FROM authors WHERE id = $1", AUTHOR_COLUMNS);
        let row = sqlx::query_as::<_, DbAuthor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn update_author(&self, id: &str, patch: AuthorPatch) -> Result<Author> {
        let patch = prepare_patch::<Author, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM authors WHERE id = $1 FOR UPDATE", AUTHOR_COLUMNS);
        let mut author: Author = sqlx::query_as::<_, DbAuthor>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("author", id))?
            .into();

        patch.apply(&mut author);

        let sql = format!(
            "UPDATE authors SET name = $2, bio = $3, image_url = $4 WHERE id = $1 RETURNING {}",
            AUTHOR_COLUMNS
        );
        let row = sqlx::query_as::<_, DbAuthor>(&sql)
            .bind(id)
            .bind(&author.name)
            .bind(&author.bio)
            .bind(&author.image_url)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    // === Book Repository ===

    pub async fn create_book(&self, book: InsertBook) -> Result<Book> {
        let book = prepare_insert(book)?;

        let sql = format!(
            r#"
            INSERT INTO books (title, subtitle, author_id, category_id, cover_image_url,
                               description, published_year, isbn, rating, ratings_count,
                               is_popular, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, DbBook>(&sql)
            .bind(&book.title)
            .bind(&book.subtitle)
            .bind(&book.author_id)
            .bind(&book.category_id)
            .bind(&book.cover_image_url)
            .bind(&book.description)
            .bind(book.published_year)
            .bind(&book.isbn)
            .bind(book.rating)
            .bind(book.ratings_count)
            .bind(book.is_popular)
            .bind(book.is_featured)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(book_id = %row.id, "Created book");
        Ok(row.into())
    }

    pub async fn get_book(&self, id: &str) -> Result<Option<Book>> {
        let sql = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let row = sqlx::query_as::<_, DbBook>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn update_book(&self, id: &str, patch: BookPatch) -> Result<Book> {
        let patch = prepare_patch::<Book, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM books WHERE id = $1 FOR UPDATE", BOOK_COLUMNS);
        let mut book: Book = sqlx::query_as::<_, DbBook>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("book", id))?
            .into();

        patch.apply(&mut book);

        let sql = format!(
            r#"
            UPDATE books
            SET title = $2, subtitle = $3, author_id = $4, category_id = $5, cover_image_url = $6,
                description = $7, published_year = $8, isbn = $9, rating = $10,
                ratings_count = $11, is_popular = $12, is_featured = $13, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, DbBook>(&sql)
            .bind(id)
            .bind(&book.title)
            .bind(&book.subtitle)
            .bind(&book.author_id)
            .bind(&book.category_id)
            .bind(&book.cover_image_url)
            .bind(&book.description)
            .bind(book.published_year)
            .bind(&book.isbn)
            .bind(book.rating)
            .bind(book.ratings_count)
            .bind(book.is_popular)
            .bind(book.is_featured)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Books in a category, alphabetical.
    pub async fn list_books_by_category(&self, category_id: &str) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {} FROM books WHERE category_id = $1 ORDER BY title",
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbBook>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Featured books, newest first.
    pub async fn list_featured_books(&self, limit: i64) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {} FROM books WHERE is_featured ORDER BY created_at DESC LIMIT $1",
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbBook>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Popular books, best rated first.
    pub async fn list_popular_books(&self, limit: i64) -> Result<Vec<Book>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM books
            WHERE is_popular
            ORDER BY rating DESC, ratings_count DESC
            LIMIT $1
            "#,
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbBook>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Fetch a batch of books by id, in no particular order.
    pub(crate) async fn books_by_ids(&self, ids: &[String]) -> Result<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM books WHERE id = ANY($1)", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, DbBook>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub(crate) async fn authors_by_ids(&self, ids: &[String]) -> Result<Vec<Author>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM authors WHERE id = ANY($1)", AUTHOR_COLUMNS);
        let rows = sqlx::query_as::<_, DbAuthor>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub(crate) async fn categories_by_ids(&self, ids: &[String]) -> Result<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {} FROM categories WHERE id = ANY($1)", CATEGORY_COLUMNS);
        let rows = sqlx::query_as::<_, DbCategory>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
