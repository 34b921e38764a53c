//! Database row types and their conversion to core entities

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::error::{Result, StoreError};

// Re-export shared types from echoread-core
pub use echoread_core::types::{
    Author, BigIdea, Book, Bookmark, Category, ChapterMarker, Note, ReadingSession, Subscription,
    SubscriptionPlan, SubscriptionStatus, SubscriptionTier, Summary, SummaryType, TextTiming,
    User,
};

// === Column Lists ===

pub(crate) const USER_COLUMNS: &str = "id, email, first_name, last_name, profile_image_url, \
    subscription_type, subscription_expires_at, reading_streak, total_minutes_read, \
    summaries_completed, created_at, updated_at";

pub(crate) const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, icon_name, color, is_active, sort_order, created_at";

pub(crate) const AUTHOR_COLUMNS: &str = "id, name, bio, image_url, created_at";

pub(crate) const BOOK_COLUMNS: &str = "id, title, subtitle, author_id, category_id, \
    cover_image_url, description, published_year, isbn, rating, ratings_count, is_popular, \
    is_featured, created_at, updated_at";

pub(crate) const SUMMARY_COLUMNS: &str = "id, book_id, title, content, in_this_summary, \
    key_takeaways, big_ideas, about_author, reading_time_minutes, audio_url, \
    audio_duration_minutes, text_timings, chapter_markers, use_auto_scroll, summary_type, \
    sequence_number, is_published, is_premium, created_at, updated_at";

pub(crate) const READING_SESSION_COLUMNS: &str = "id, user_id, summary_id, progress_percent, \
    current_position, is_completed, time_spent_minutes, started_at, last_accessed_at, \
    completed_at";

pub(crate) const BOOKMARK_COLUMNS: &str = "id, user_id, summary_id, position, note, created_at";

pub(crate) const NOTE_COLUMNS: &str =
    "id, user_id, summary_id, content, position, is_private, created_at, updated_at";

pub(crate) const SUBSCRIPTION_COLUMNS: &str = "id, user_id, type, status, start_date, end_date, \
    amount, currency, payment_id, created_at";

// === Database Entity Types ===

/// User stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub subscription_type: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub reading_streak: i32,
    pub total_minutes_read: i32,
    pub summaries_completed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            profile_image_url: row.profile_image_url,
            subscription_type: SubscriptionTier::from_db(&row.subscription_type),
            subscription_expires_at: row.subscription_expires_at,
            reading_streak: row.reading_streak,
            total_minutes_read: row.total_minutes_read,
            summaries_completed: row.summaries_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbCategory {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon_name: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<DbCategory> for Category {
    fn from(row: DbCategory) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            icon_name: row.icon_name,
            color: row.color,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAuthor {
    pub id: String,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbAuthor> for Author {
    fn from(row: DbAuthor) -> Self {
        Author {
            id: row.id,
            name: row.name,
            bio: row.bio,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbBook {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub author_id: Option<String>,
    pub category_id: Option<String>,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
    pub published_year: Option<i32>,
    pub isbn: Option<String>,
    pub rating: Decimal,
    pub ratings_count: i32,
    pub is_popular: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbBook> for Book {
    fn from(row: DbBook) -> Self {
        Book {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            author_id: row.author_id,
            category_id: row.category_id,
            cover_image_url: row.cover_image_url,
            description: row.description,
            published_year: row.published_year,
            isbn: row.isbn,
            rating: row.rating,
            ratings_count: row.ratings_count,
            is_popular: row.is_popular,
            is_featured: row.is_featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Summary stored in PostgreSQL, JSONB columns still wrapped
#[derive(Debug, Clone, FromRow)]
pub struct DbSummary {
    pub id: String,
    pub book_id: String,
    pub title: String,
    pub content: String,
    pub in_this_summary: Option<String>,
    pub key_takeaways: Option<Json<Vec<String>>>,
    pub big_ideas: Option<Json<Vec<BigIdea>>>,
    pub about_author: Option<String>,
    pub reading_time_minutes: i32,
    pub audio_url: Option<String>,
    pub audio_duration_minutes: Option<i32>,
    pub text_timings: Option<Json<Vec<TextTiming>>>,
    pub chapter_markers: Option<Json<Vec<ChapterMarker>>>,
    pub use_auto_scroll: bool,
    pub summary_type: String,
    pub sequence_number: i32,
    pub is_published: bool,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbSummary> for Summary {
    type Error = StoreError;

    fn try_from(row: DbSummary) -> Result<Self> {
        let summary_type = SummaryType::from_str(&row.summary_type).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "summary {} has unknown summary_type {}",
                row.id, row.summary_type
            ))
        })?;

        Ok(Summary {
            id: row.id,
            book_id: row.book_id,
            title: row.title,
            content: row.content,
            in_this_summary: row.in_this_summary,
            key_takeaways: row.key_takeaways.map(|j| j.0),
            big_ideas: row.big_ideas.map(|j| j.0),
            about_author: row.about_author,
            reading_time_minutes: row.reading_time_minutes,
            audio_url: row.audio_url,
            audio_duration_minutes: row.audio_duration_minutes,
            text_timings: row.text_timings.map(|j| j.0),
            chapter_markers: row.chapter_markers.map(|j| j.0),
            use_auto_scroll: row.use_auto_scroll,
            summary_type,
            sequence_number: row.sequence_number,
            is_published: row.is_published,
            is_premium: row.is_premium,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbReadingSession {
    pub id: String,
    pub user_id: String,
    pub summary_id: String,
    pub progress_percent: i32,
    pub current_position: i32,
    pub is_completed: bool,
    pub time_spent_minutes: i32,
    pub started_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<DbReadingSession> for ReadingSession {
    fn from(row: DbReadingSession) -> Self {
        ReadingSession {
            id: row.id,
            user_id: row.user_id,
            summary_id: row.summary_id,
            progress_percent: row.progress_percent,
            current_position: row.current_position,
            is_completed: row.is_completed,
            time_spent_minutes: row.time_spent_minutes,
            started_at: row.started_at,
            last_accessed_at: row.last_accessed_at,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbBookmark {
    pub id: String,
    pub user_id: String,
    pub summary_id: String,
    pub position: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DbBookmark> for Bookmark {
    fn from(row: DbBookmark) -> Self {
        Bookmark {
            id: row.id,
            user_id: row.user_id,
            summary_id: row.summary_id,
            position: row.position,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbNote {
    pub id: String,
    pub user_id: String,
    pub summary_id: String,
    pub content: String,
    pub position: Option<i32>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbNote> for Note {
    fn from(row: DbNote) -> Self {
        Note {
            id: row.id,
            user_id: row.user_id,
            summary_id: row.summary_id,
            content: row.content,
            position: row.position,
            is_private: row.is_private,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Subscription history row; `type` and `status` stored as strings
#[derive(Debug, Clone, FromRow)]
pub struct DbSubscription {
    pub id: String,
    pub user_id: String,
    #[sqlx(rename = "type")]
    pub plan: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: Option<Decimal>,
    pub currency: String,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbSubscription> for Subscription {
    type Error = StoreError;

    fn try_from(row: DbSubscription) -> Result<Self> {
        let plan = SubscriptionPlan::from_str(&row.plan).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "subscription {} has unknown type {}",
                row.id, row.plan
            ))
        })?;
        let status = SubscriptionStatus::from_str(&row.status).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "subscription {} has unknown status {}",
                row.id, row.status
            ))
        })?;

        Ok(Subscription {
            id: row.id,
            user_id: row.user_id,
            plan,
            status,
            start_date: row.start_date,
            end_date: row.end_date,
            amount: row.amount,
            currency: row.currency,
            payment_id: row.payment_id,
            created_at: row.created_at,
        })
    }
}

/// Convert a batch of summary rows, failing on the first malformed one.
pub fn summaries_from_rows(rows: Vec<DbSummary>) -> Result<Vec<Summary>> {
    rows.into_iter().map(Summary::try_from).collect()
}

/// Convert a batch of subscription rows, failing on the first malformed one.
pub fn subscriptions_from_rows(rows: Vec<DbSubscription>) -> Result<Vec<Subscription>> {
    rows.into_iter().map(Subscription::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn db_summary(summary_type: &str) -> DbSummary {
        let now = Utc::now();
        DbSummary {
            id: "s1".to_string(),
            book_id: "b1".to_string(),
            title: "Opening".to_string(),
            content: "Body".to_string(),
            in_this_summary: None,
            key_takeaways: Some(Json(vec!["a".to_string(), "b".to_string()])),
            big_ideas: None,
            about_author: None,
            reading_time_minutes: 12,
            audio_url: None,
            audio_duration_minutes: None,
            text_timings: None,
            chapter_markers: Some(Json(vec![])),
            use_auto_scroll: true,
            summary_type: summary_type.to_string(),
            sequence_number: 1,
            is_published: true,
            is_premium: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_summary_row_unwraps_json() {
        let summary = Summary::try_from(db_summary("main")).unwrap();
        assert_eq!(summary.summary_type, SummaryType::Main);
        assert_eq!(
            summary.key_takeaways,
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(summary.chapter_markers, Some(vec![]));
    }

    #[test]
    fn test_summary_row_with_unknown_type() {
        let err = Summary::try_from(db_summary("epilogue")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn test_user_row_unknown_tier_reads_as_free() {
        let now = Utc::now();
        let user = User::from(DbUser {
            id: "u1".to_string(),
            email: None,
            first_name: None,
            last_name: None,
            profile_image_url: None,
            subscription_type: "legacy_gold".to_string(),
            subscription_expires_at: None,
            reading_streak: 3,
            total_minutes_read: 40,
            summaries_completed: 2,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(user.subscription_type, SubscriptionTier::Free);
        assert_eq!(user.reading_streak, 3);
    }

    #[test]
    fn test_subscription_row_conversion() {
        let now = Utc::now();
        let row = DbSubscription {
            id: "sub1".to_string(),
            user_id: "u1".to_string(),
            plan: "yearly".to_string(),
            status: "cancelled".to_string(),
            start_date: now,
            end_date: now,
            amount: Some(Decimal::new(49900000, 2)),
            currency: "IDR".to_string(),
            payment_id: None,
            created_at: now,
        };
        let sub = Subscription::try_from(row.clone()).unwrap();
        assert_eq!(sub.plan, SubscriptionPlan::Yearly);
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);

        let bad = DbSubscription {
            status: "paused".to_string(),
            ..row
        };
        assert!(Subscription::try_from(bad).is_err());
    }
}
