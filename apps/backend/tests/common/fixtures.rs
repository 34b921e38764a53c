//! Test fixtures and factory functions for creating test data.

use chrono::{Duration, Utc};
use serde_json::json;

use echoread_core::{
    parse_insert, InsertAuthor, InsertBook, InsertBookmark, InsertCategory, InsertNote,
    InsertReadingSession, InsertSubscription, InsertSummary, UpsertUser,
};

use super::TestContext;

/// A category whose name and slug carry the context tag.
pub fn category(ctx: &TestContext, name: &str) -> InsertCategory {
    let slug = format!("{}-{}", name.to_lowercase().replace(' ', "-"), ctx.tag);
    parse_insert(json!({
        "name": ctx.tagged(name),
        "slug": slug,
        "icon_name": "brain",
        "color": "#FF6B35",
    }))
    .expect("valid category fixture")
}

pub fn author(ctx: &TestContext, name: &str) -> InsertAuthor {
    parse_insert(json!({
        "name": ctx.tagged(name),
        "bio": "Writes about habits.",
    }))
    .expect("valid author fixture")
}

/// A book with only the required title and optional references.
pub fn book(
    ctx: &TestContext,
    title: &str,
    author_id: Option<&str>,
    category_id: Option<&str>,
) -> InsertBook {
    parse_insert(json!({
        "title": ctx.tagged(title),
        "author_id": author_id,
        "category_id": category_id,
    }))
    .expect("valid book fixture")
}

/// A summary of the given type, otherwise relying on declared defaults.
pub fn summary(
    book_id: &str,
    title: &str,
    summary_type: &str,
    sequence_number: i32,
) -> InsertSummary {
    parse_insert(json!({
        "book_id": book_id,
        "title": title,
        "content": format!("{} content", title),
        "reading_time_minutes": 15,
        "summary_type": summary_type,
        "sequence_number": sequence_number,
        "is_published": true,
        "key_takeaways": ["Start small", "Stack habits", "Track progress"],
    }))
    .expect("valid summary fixture")
}

pub fn user(ctx: &TestContext, name: &str) -> UpsertUser {
    parse_insert(json!({
        "id": ctx.user_id(name),
        "email": format!("{}@{}.example.com", name, ctx.tag),
        "first_name": name,
    }))
    .expect("valid user fixture")
}

pub fn reading_session(user_id: &str, summary_id: &str) -> InsertReadingSession {
    parse_insert(json!({
        "user_id": user_id,
        "summary_id": summary_id,
    }))
    .expect("valid reading session fixture")
}

pub fn bookmark(user_id: &str, summary_id: &str, position: i32) -> InsertBookmark {
    parse_insert(json!({
        "user_id": user_id,
        "summary_id": summary_id,
        "position": position,
    }))
    .expect("valid bookmark fixture")
}

pub fn note(user_id: &str, summary_id: &str, content: &str) -> InsertNote {
    parse_insert(json!({
        "user_id": user_id,
        "summary_id": summary_id,
        "content": content,
    }))
    .expect("valid note fixture")
}

/// A monthly subscription that started now and runs for 30 days.
pub fn monthly_subscription(user_id: &str, status: &str) -> InsertSubscription {
    let start = Utc::now();
    parse_insert(json!({
        "user_id": user_id,
        "type": "monthly",
        "status": status,
        "start_date": start,
        "end_date": start + Duration::days(30),
        "amount": "49000",
    }))
    .expect("valid subscription fixture")
}
