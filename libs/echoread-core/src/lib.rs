//! Core library shared by the backend and the reading client.
//!
//! Provides:
//! - Entity read shapes (User, Book, Summary, ReadingSession, ...)
//! - Insert and patch shapes with validation and declared defaults
//! - Read-side projections (BookWithDetails, SummaryWithBook, ...)
//! - Summary audio sync resolution
//! - Navigation gate and route table for the client

pub mod error;
pub mod gate;
pub mod insert;
pub mod patch;
pub mod projection;
pub mod routes;
pub mod sync_strategy;
pub mod types;

pub use error::{FieldError, FieldErrorKind, Result, ValidationError};
pub use gate::{AuthStatus, GateInputs, GateState, Marker, MarkerSnapshot, ScreenSet};
pub use insert::{
    parse_insert, prepare_insert, validate_insert, InsertAuthor, InsertBook, InsertBookmark,
    InsertCategory, InsertNote, InsertReadingSession, InsertShape, InsertSubscription,
    InsertSummary, UpsertUser,
};
pub use patch::{
    prepare_patch, AuthorPatch, BookPatch, BookmarkPatch, CategoryPatch, EntityPatch, NotePatch,
    ReadingSessionPatch, SubscriptionPatch, SummaryPatch, UserProfilePatch,
};
pub use projection::{assemble_books, BookWithDetails, ReadingSessionWithSummary, SummaryWithBook};
pub use routes::{resolve, ReaderTarget, Screen};
pub use sync_strategy::{SyncKind, SyncStrategy};
pub use types::{
    Author, BigIdea, Book, Bookmark, Category, ChapterMarker, Note, ReadingSession, Subscription,
    SubscriptionPlan, SubscriptionStatus, SubscriptionTier, Summary, SummaryType, TextTiming,
    User,
};
