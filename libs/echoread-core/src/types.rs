//! Core entity types for the reading application.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Subscription tier recorded on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Free,
    FreeTrial,
    Monthly,
    Yearly,
}

impl Default for SubscriptionTier {
    fn default() -> Self {
        Self::Free
    }
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::FreeTrial => "free_trial",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Parse from the stored string. Unknown values read as `Free`.
    pub fn from_db(s: &str) -> Self {
        match s {
            "free_trial" => Self::FreeTrial,
            "monthly" => Self::Monthly,
            "yearly" => Self::Yearly,
            _ => Self::Free,
        }
    }
}

/// Kind of a subscription history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    FreeTrial,
    Monthly,
    Yearly,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreeTrial => "free_trial",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free_trial" => Some(Self::FreeTrial),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Lifecycle status of a subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// Position of a summary within a book's reading sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    Opening,
    Main,
    Closing,
}

impl Default for SummaryType {
    fn default() -> Self {
        Self::Opening
    }
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Main => "main",
            Self::Closing => "closing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "opening" => Some(Self::Opening),
            "main" => Some(Self::Main),
            "closing" => Some(Self::Closing),
            _ => None,
        }
    }
}

/// One "big idea" section of a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigIdea {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Per-segment audio timing, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextTiming {
    #[serde(alias = "textSegment")]
    pub text_segment: String,
    #[serde(alias = "startTime")]
    pub start_time: f64,
    #[serde(alias = "endTime")]
    pub end_time: f64,
}

/// Coarse chapter marker: one start time per section, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterMarker {
    pub title: String,
    #[serde(alias = "startTime")]
    pub start_time: f64,
    pub content: String,
}

/// Application user.
///
/// Reading stats are counters maintained by session tracking outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub subscription_type: SubscriptionTier,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub reading_streak: i32,
    pub total_minutes_read: i32,
    pub summaries_completed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Book metadata. Author and category references are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
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

/// A summary of a book.
///
/// Audio sync data lives in three independent fields; see
/// [`Summary::sync_strategy`](crate::sync_strategy) for the resolved view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: String,
    pub book_id: String,
    pub title: String,
    pub content: String,
    pub in_this_summary: Option<String>,
    pub key_takeaways: Option<Vec<String>>,
    pub big_ideas: Option<Vec<BigIdea>>,
    pub about_author: Option<String>,
    pub reading_time_minutes: i32,
    pub audio_url: Option<String>,
    pub audio_duration_minutes: Option<i32>,
    pub text_timings: Option<Vec<TextTiming>>,
    pub chapter_markers: Option<Vec<ChapterMarker>>,
    pub use_auto_scroll: bool,
    pub summary_type: SummaryType,
    pub sequence_number: i32,
    pub is_published: bool,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSession {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub summary_id: String,
    pub position: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub summary_id: String,
    pub content: String,
    pub position: Option<i32>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription history row. At most one should be active per user;
/// that is upheld by the write path, not the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: Option<Decimal>,
    pub currency: String,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Active and not yet past its end date.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date > now
    }
}
