//! Partial updates.
//!
//! Every patch field is optional and only present fields are merged.
//! Server-assigned fields and user reading stats are not patchable.
//! A nullable column cannot be cleared back to NULL through a patch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{FieldError, Result, ValidationError};
use crate::insert::{check_fixed_point, check_rating, to_scale, AMOUNT_PRECISION, RATING_PRECISION};
use crate::types::{
    Author, BigIdea, Book, Bookmark, Category, ChapterMarker, Note, ReadingSession, Subscription,
    SubscriptionStatus, SubscriptionTier, Summary, SummaryType, TextTiming, User,
};

/// A partial update for entity `E`.
pub trait EntityPatch<E>: Validate {
    /// Merge present fields into `entity`.
    fn apply(self, entity: &mut E);

    fn check_extra(&self) -> Vec<FieldError> {
        Vec::new()
    }

    fn normalize(&mut self) {}
}

/// Normalize and validate a patch before it is merged.
pub fn prepare_patch<E, P: EntityPatch<E>>(mut patch: P) -> Result<P> {
    patch.normalize();
    let mut errors = match patch.validate() {
        Ok(()) => Vec::new(),
        Err(e) => ValidationError::from(e).errors().to_vec(),
    };
    errors.extend(patch.check_extra());
    match ValidationError::from_errors(errors) {
        Some(err) => Err(err),
        None => Ok(patch),
    }
}

macro_rules! merge {
    (
        $patch:ident => $entity:ident
        { $($field:ident),* $(,)? }
        nullable { $($opt:ident),* $(,)? }
    ) => {
        $(
            if let Some(v) = $patch.$field {
                $entity.$field = v;
            }
        )*
        $(
            if let Some(v) = $patch.$opt {
                $entity.$opt = Some(v);
            }
        )*
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UserProfilePatch {
    #[validate(email)]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub subscription_type: Option<SubscriptionTier>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

impl EntityPatch<User> for UserProfilePatch {
    fn apply(self, user: &mut User) {
        let patch = self;
        merge!(patch => user { subscription_type } nullable {
            email, first_name, last_name, profile_image_url, subscription_expires_at,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CategoryPatch {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub icon_name: Option<String>,
    #[validate(length(max = 7))]
    pub color: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl EntityPatch<Category> for CategoryPatch {
    fn apply(self, category: &mut Category) {
        let patch = self;
        merge!(patch => category { name, slug, is_active, sort_order } nullable {
            description, icon_name, color,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AuthorPatch {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl EntityPatch<Author> for AuthorPatch {
    fn apply(self, author: &mut Author) {
        let patch = self;
        merge!(patch => author { name } nullable { bio, image_url });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BookPatch {
    #[validate(length(max = 300))]
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author_id: Option<String>,
    pub category_id: Option<String>,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
    pub published_year: Option<i32>,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    pub rating: Option<Decimal>,
    pub ratings_count: Option<i32>,
    pub is_popular: Option<bool>,
    pub is_featured: Option<bool>,
}

impl EntityPatch<Book> for BookPatch {
    fn apply(self, book: &mut Book) {
        let patch = self;
        merge!(patch => book { title, rating, ratings_count, is_popular, is_featured } nullable {
            subtitle, author_id, category_id, cover_image_url, description, published_year, isbn,
        });
    }

    fn check_extra(&self) -> Vec<FieldError> {
        self.rating.as_ref().and_then(check_rating).into_iter().collect()
    }

    fn normalize(&mut self) {
        if let Some(rating) = self.rating.as_mut() {
            to_scale(rating, RATING_PRECISION.1);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SummaryPatch {
    #[validate(length(max = 300))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub in_this_summary: Option<String>,
    pub key_takeaways: Option<Vec<String>>,
    pub big_ideas: Option<Vec<BigIdea>>,
    pub about_author: Option<String>,
    #[validate(range(min = 0))]
    pub reading_time_minutes: Option<i32>,
    pub audio_url: Option<String>,
    #[validate(range(min = 0))]
    pub audio_duration_minutes: Option<i32>,
    pub text_timings: Option<Vec<TextTiming>>,
    pub chapter_markers: Option<Vec<ChapterMarker>>,
    pub use_auto_scroll: Option<bool>,
    pub summary_type: Option<SummaryType>,
    #[validate(range(min = 1))]
    pub sequence_number: Option<i32>,
    pub is_published: Option<bool>,
    pub is_premium: Option<bool>,
}

impl EntityPatch<Summary> for SummaryPatch {
    fn apply(self, summary: &mut Summary) {
        let patch = self;
        merge!(patch => summary {
            title, content, reading_time_minutes, use_auto_scroll, summary_type,
            sequence_number, is_published, is_premium,
        } nullable {
            in_this_summary, key_takeaways, big_ideas, about_author, audio_url,
            audio_duration_minutes, text_timings, chapter_markers,
        });
    }
}

/// Progress update for a reading session.
///
/// Setting `completed_at` when `is_completed` flips is the caller's policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReadingSessionPatch {
    #[validate(range(min = 0, max = 100))]
    pub progress_percent: Option<i32>,
    #[validate(range(min = 0))]
    pub current_position: Option<i32>,
    pub is_completed: Option<bool>,
    #[validate(range(min = 0))]
    pub time_spent_minutes: Option<i32>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl EntityPatch<ReadingSession> for ReadingSessionPatch {
    fn apply(self, session: &mut ReadingSession) {
        let patch = self;
        merge!(patch => session {
            progress_percent, current_position, is_completed, time_spent_minutes,
        } nullable { completed_at });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BookmarkPatch {
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    pub note: Option<String>,
}

impl EntityPatch<Bookmark> for BookmarkPatch {
    fn apply(self, bookmark: &mut Bookmark) {
        let patch = self;
        merge!(patch => bookmark { position } nullable { note });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NotePatch {
    pub content: Option<String>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    pub is_private: Option<bool>,
}

impl EntityPatch<Note> for NotePatch {
    fn apply(self, note: &mut Note) {
        let patch = self;
        merge!(patch => note { content, is_private } nullable { position });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SubscriptionPatch {
    pub status: Option<SubscriptionStatus>,
    pub end_date: Option<DateTime<Utc>>,
    pub amount: Option<Decimal>,
    pub payment_id: Option<String>,
}

impl EntityPatch<Subscription> for SubscriptionPatch {
    fn apply(self, subscription: &mut Subscription) {
        let patch = self;
        merge!(patch => subscription { status, end_date } nullable { amount, payment_id });
    }

    fn check_extra(&self) -> Vec<FieldError> {
        self.amount
            .as_ref()
            .and_then(|a| check_fixed_point("amount", a, AMOUNT_PRECISION.0, AMOUNT_PRECISION.1))
            .into_iter()
            .collect()
    }

    fn normalize(&mut self) {
        if let Some(amount) = self.amount.as_mut() {
            to_scale(amount, AMOUNT_PRECISION.1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrorKind;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn book() -> Book {
        let now = Utc::now();
        Book {
            id: "b1".to_string(),
            title: "Deep Work".to_string(),
            subtitle: Some("Rules for focused success".to_string()),
            author_id: None,
            category_id: None,
            cover_image_url: None,
            description: None,
            published_year: Some(2016),
            isbn: None,
            rating: Decimal::new(0, 2),
            ratings_count: 0,
            is_popular: false,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_present_fields_are_merged() {
        let mut b = book();
        let patch: BookPatch =
            serde_json::from_str(r#"{ "is_featured": true, "author_id": "a1" }"#).unwrap();
        patch.apply(&mut b);
        assert!(b.is_featured);
        assert_eq!(b.author_id.as_deref(), Some("a1"));
        assert_eq!(b.title, "Deep Work");
        assert_eq!(b.subtitle.as_deref(), Some("Rules for focused success"));
        assert_eq!(b.published_year, Some(2016));
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut b = book();
        let before = b.clone();
        BookPatch::default().apply(&mut b);
        assert_eq!(b, before);
    }

    #[test]
    fn patch_rating_is_rescaled_and_checked() {
        let patch = prepare_patch::<Book, _>(BookPatch {
            rating: Some(Decimal::new(45, 1)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.rating.unwrap().to_string(), "4.50");

        let err = prepare_patch::<Book, _>(BookPatch {
            rating: Some(Decimal::new(100, 1)),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.field("rating").unwrap().kind, FieldErrorKind::Constraint);
    }

    #[test]
    fn session_progress_is_bounded() {
        let err = prepare_patch::<ReadingSession, _>(ReadingSessionPatch {
            progress_percent: Some(101),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.field("progress_percent").unwrap().kind, FieldErrorKind::Constraint);
    }

    #[test]
    fn completing_a_session_does_not_stamp_it() {
        let now = Utc::now();
        let mut session = ReadingSession {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            summary_id: "s1".to_string(),
            progress_percent: 90,
            current_position: 1200,
            is_completed: false,
            time_spent_minutes: 11,
            started_at: now,
            last_accessed_at: now,
            completed_at: None,
        };
        ReadingSessionPatch {
            progress_percent: Some(100),
            is_completed: Some(true),
            ..Default::default()
        }
        .apply(&mut session);
        assert!(session.is_completed);
        assert_eq!(session.progress_percent, 100);
        assert_eq!(session.completed_at, None);
    }

    #[test]
    fn category_slug_cap_applies_to_patches() {
        let err = prepare_patch::<Category, _>(CategoryPatch {
            slug: Some("s".repeat(101)),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.field("slug").unwrap().kind, FieldErrorKind::Constraint);
    }
}
