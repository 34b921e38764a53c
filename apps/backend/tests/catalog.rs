//! Catalog storage tests: categories, authors, books and summaries.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use echoread_backend::error::StoreError;
use echoread_core::{BookPatch, CategoryPatch, SummaryPatch, SummaryType, SyncKind};

use common::fixtures;
use common::TestContext;

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_category_applies_defaults() {
    let ctx = TestContext::new().await;

    let category = ctx
        .db
        .create_category(fixtures::category(&ctx, "Self-Help"))
        .await
        .unwrap();

    assert_eq!(category.name, ctx.tagged("Self-Help"));
    assert!(category.is_active);
    assert_eq!(category.sort_order, 0);
    assert!(!category.id.is_empty());

    let by_slug = ctx
        .db
        .get_category_by_slug(&category.slug)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_slug, category);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_category_name_is_a_unique_violation() {
    let ctx = TestContext::new().await;

    ctx.db
        .create_category(fixtures::category(&ctx, "Self-Help"))
        .await
        .unwrap();

    let mut duplicate = fixtures::category(&ctx, "Self-Help");
    duplicate.slug = format!("other-{}", ctx.tag);
    let err = ctx.db.create_category(duplicate).await.unwrap_err();

    assert!(err.is_unique_violation(), "unexpected error: {}", err);
    assert!(matches!(err, StoreError::Database(_)));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_list_active_categories_hides_inactive() {
    let ctx = TestContext::new().await;

    let active = ctx
        .db
        .create_category(fixtures::category(&ctx, "Business"))
        .await
        .unwrap();
    let hidden = ctx
        .db
        .create_category(fixtures::category(&ctx, "Archive"))
        .await
        .unwrap();
    ctx.db
        .update_category(
            &hidden.id,
            CategoryPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let ids: Vec<String> = ctx
        .db
        .list_active_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert!(ids.contains(&active.id));
    assert!(!ids.contains(&hidden.id));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_book_with_only_title() {
    let ctx = TestContext::new().await;

    let book = ctx
        .db
        .create_book(fixtures::book(&ctx, "Atomic Habits", None, None))
        .await
        .unwrap();

    assert_eq!(book.rating, Decimal::new(0, 2));
    assert_eq!(serde_json::to_value(&book).unwrap()["rating"], "0.00");
    assert_eq!(book.ratings_count, 0);
    assert!(!book.is_popular);
    assert!(!book.is_featured);
    assert!(book.author_id.is_none());

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_book_with_unknown_author_is_a_foreign_key_violation() {
    let ctx = TestContext::new().await;

    let err = ctx
        .db
        .create_book(fixtures::book(&ctx, "Orphan", Some("no-such-author"), None))
        .await
        .unwrap_err();
    assert!(err.is_foreign_key_violation(), "unexpected error: {}", err);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_book_merges_and_bumps_updated_at() {
    let ctx = TestContext::new().await;

    let book = ctx
        .db
        .create_book(fixtures::book(&ctx, "Deep Work", None, None))
        .await
        .unwrap();

    let updated = ctx
        .db
        .update_book(
            &book.id,
            BookPatch {
                rating: Some(Decimal::new(4567, 3)),
                is_featured: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, book.title);
    assert_eq!(updated.rating.to_string(), "4.57");
    assert!(updated.is_featured);
    assert!(updated.updated_at >= book.updated_at);
    assert_eq!(updated.created_at, book.created_at);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_missing_book_is_not_found() {
    let ctx = TestContext::new().await;

    let err = ctx
        .db
        .update_book("missing-book", BookPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "book", .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_summary_defaults_and_json_columns() {
    let ctx = TestContext::new().await;

    let book = ctx
        .db
        .create_book(fixtures::book(&ctx, "Essentialism", None, None))
        .await
        .unwrap();

    let mut insert = fixtures::summary(&book.id, "Opening", "opening", 1);
    insert.is_published = false;
    let summary = ctx.db.create_summary(insert).await.unwrap();

    assert_eq!(summary.summary_type, SummaryType::Opening);
    assert!(summary.use_auto_scroll);
    assert!(!summary.is_premium);
    assert_eq!(
        summary.key_takeaways,
        Some(vec![
            "Start small".to_string(),
            "Stack habits".to_string(),
            "Track progress".to_string(),
        ])
    );
    assert_eq!(summary.sync_strategy().kind(), SyncKind::AutoScroll);

    let fetched = ctx.db.get_summary(&summary.id).await.unwrap().unwrap();
    assert_eq!(fetched, summary);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_list_summaries_for_book_in_reading_order() {
    let ctx = TestContext::new().await;

    let book = ctx
        .db
        .create_book(fixtures::book(&ctx, "Range", None, None))
        .await
        .unwrap();

    for (title, kind, seq) in [
        ("Closing", "closing", 1),
        ("Chapter 2", "main", 2),
        ("Opening", "opening", 1),
        ("Chapter 1", "main", 1),
    ] {
        ctx.db
            .create_summary(fixtures::summary(&book.id, title, kind, seq))
            .await
            .unwrap();
    }

    let draft = ctx
        .db
        .create_summary(fixtures::summary(&book.id, "Draft", "main", 3))
        .await
        .unwrap();
    ctx.db
        .update_summary(
            &draft.id,
            SummaryPatch {
                is_published: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let titles: Vec<String> = ctx
        .db
        .list_summaries_for_book(&book.id, true)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["Opening", "Chapter 1", "Chapter 2", "Closing"]);

    let all = ctx.db.list_summaries_for_book(&book.id, false).await.unwrap();
    assert_eq!(all.len(), 5);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_book_with_details() {
    let ctx = TestContext::new().await;

    let author = ctx
        .db
        .create_author(fixtures::author(&ctx, "James Clear"))
        .await
        .unwrap();
    let category = ctx
        .db
        .create_category(fixtures::category(&ctx, "Habits"))
        .await
        .unwrap();
    let book = ctx
        .db
        .create_book(fixtures::book(
            &ctx,
            "Atomic Habits",
            Some(&author.id),
            Some(&category.id),
        ))
        .await
        .unwrap();
    let summary = ctx
        .db
        .create_summary(fixtures::summary(&book.id, "Opening", "opening", 1))
        .await
        .unwrap();

    let details = ctx
        .db
        .get_book_with_details(&book.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(details.book, book);
    assert_eq!(details.author, Some(author));
    assert_eq!(details.category, Some(category.clone()));
    assert_eq!(details.summaries, vec![summary.clone()]);

    let listed = ctx
        .db
        .list_books_with_details(Some(&category.id))
        .await
        .unwrap();
    assert_eq!(listed, vec![details.clone()]);

    let with_book = ctx
        .db
        .get_summary_with_book(&summary.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_book.summary, summary);
    assert_eq!(with_book.book, details);

    assert!(ctx.db.get_book_with_details("missing").await.unwrap().is_none());

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_summary_with_book_includes_siblings_in_reading_order() {
    let ctx = TestContext::new().await;

    let author = ctx
        .db
        .create_author(fixtures::author(&ctx, "Cal Newport"))
        .await
        .unwrap();
    let category = ctx
        .db
        .create_category(fixtures::category(&ctx, "Productivity"))
        .await
        .unwrap();
    let book = ctx
        .db
        .create_book(fixtures::book(
            &ctx,
            "Deep Work",
            Some(&author.id),
            Some(&category.id),
        ))
        .await
        .unwrap();

    let mut created = Vec::new();
    for (title, kind, seq) in [
        ("Closing", "closing", 1),
        ("Rule 1", "main", 1),
        ("Opening", "opening", 1),
    ] {
        let summary = ctx
            .db
            .create_summary(fixtures::summary(&book.id, title, kind, seq))
            .await
            .unwrap();
        created.push(summary);
    }
    let rule = created[1].clone();

    let joined = ctx
        .db
        .get_summary_with_book(&rule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(joined.summary, rule);
    assert_eq!(joined.book.book, book);
    assert_eq!(joined.book.author, Some(author));
    assert_eq!(joined.book.category, Some(category));

    let titles: Vec<&str> = joined
        .book
        .summaries
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Opening", "Rule 1", "Closing"]);

    assert!(ctx.db.get_summary_with_book("missing").await.unwrap().is_none());

    ctx.cleanup().await;
}
