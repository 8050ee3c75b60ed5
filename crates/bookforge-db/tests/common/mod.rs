// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` so that the same logic
// can be exercised against both the SQLite and Postgres backends.

#![allow(dead_code)]

use std::time::Duration;

use bookforge_core::book::{BookFilter, CreateBook, UpdateBook, Visibility};
use bookforge_core::preferences::{FontFamily, ReaderPreferences, Theme};
use bookforge_db::{Database, DbError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_book(title: &str, author: &str, visibility: Visibility) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        idea: format!("idea for {title}"),
        cover_prompt: format!("cover for {title}"),
        content: "## Chapter 1\n\nIt began.\n\n## Chapter 2\n\nIt ended.".to_string(),
        cover_key: format!("covers/{title}.png"),
        author: author.to_string(),
        visibility,
    }
}

/// Create books with strictly increasing timestamps so ordering is stable.
async fn seed(db: &dyn Database, books: &[(&str, &str, Visibility)]) {
    for (title, author, visibility) in books {
        db.create_book(&make_book(title, author, *visibility))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// ---------------------------------------------------------------------------
// Book tests
// ---------------------------------------------------------------------------

/// Create, get, update, delete.
pub async fn test_book_crud(db: &dyn Database) {
    let book = db
        .create_book(&make_book("Tidewater", "ana", Visibility::Private))
        .await
        .unwrap();
    assert_eq!(book.title, "Tidewater");
    assert_eq!(book.idea, "idea for Tidewater");
    assert_eq!(book.cover_prompt, "cover for Tidewater");
    assert_eq!(book.cover_key, "covers/Tidewater.png");
    assert_eq!(book.author, "ana");
    assert_eq!(book.visibility, Visibility::Private);
    assert!(book.content.contains("## Chapter 2"));

    let fetched = db.get_book(&book.id).await.unwrap();
    assert_eq!(fetched.id, book.id);
    assert_eq!(fetched.content, book.content);

    let updated = db
        .update_book(
            &book.id,
            &UpdateBook {
                title: Some("Tidewater, Revised".into()),
                visibility: Some(Visibility::Public),
                cover_key: Some("covers/new.png".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Tidewater, Revised");
    assert_eq!(updated.visibility, Visibility::Public);
    assert_eq!(updated.cover_key, "covers/new.png");
    assert_eq!(updated.author, "ana");
    assert!(updated.updated_at >= book.updated_at);

    // Empty update is a read.
    let same = db.update_book(&book.id, &UpdateBook::default()).await.unwrap();
    assert_eq!(same.title, "Tidewater, Revised");

    db.delete_book(&book.id).await.unwrap();
    assert!(matches!(
        db.get_book(&book.id).await.unwrap_err(),
        DbError::NotFound(_)
    ));
}

/// Missing ids surface as NotFound for every book operation.
pub async fn test_book_not_found(db: &dyn Database) {
    assert!(matches!(
        db.get_book("missing").await.unwrap_err(),
        DbError::NotFound(_)
    ));
    assert!(matches!(
        db.delete_book("missing").await.unwrap_err(),
        DbError::NotFound(_)
    ));
    let update = UpdateBook {
        title: Some("x".into()),
        ..Default::default()
    };
    assert!(matches!(
        db.update_book("missing", &update).await.unwrap_err(),
        DbError::NotFound(_)
    ));
}

/// Library order is newest first.
pub async fn test_list_newest_first(db: &dyn Database) {
    seed(
        db,
        &[
            ("one", "ana", Visibility::Private),
            ("two", "ana", Visibility::Private),
            ("three", "ana", Visibility::Private),
        ],
    )
    .await;

    let all = db.list_books(&BookFilter::default()).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["three", "two", "one"]);
}

/// Visibility and author filters, counts, and limit/offset paging.
pub async fn test_gallery_filtering(db: &dyn Database) {
    seed(
        db,
        &[
            ("a", "ana", Visibility::Public),
            ("b", "ben", Visibility::Private),
            ("c", "ana", Visibility::Public),
            ("d", "ben", Visibility::Public),
            ("e", "ana", Visibility::Private),
        ],
    )
    .await;

    let public = db.list_books(&BookFilter::public()).await.unwrap();
    let titles: Vec<&str> = public.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["d", "c", "a"]);
    assert_eq!(db.count_books(&BookFilter::public()).await.unwrap(), 3);

    let anas = BookFilter {
        author: Some("ana".into()),
        ..Default::default()
    };
    assert_eq!(db.count_books(&anas).await.unwrap(), 3);

    let ana_public = BookFilter {
        visibility: Some(Visibility::Public),
        author: Some("ana".into()),
        ..Default::default()
    };
    let books = db.list_books(&ana_public).await.unwrap();
    assert_eq!(books.len(), 2);

    let second_page = BookFilter {
        visibility: Some(Visibility::Public),
        limit: Some(2),
        offset: Some(2),
        ..Default::default()
    };
    let page = db.list_books(&second_page).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "a");
    // Counts ignore paging.
    assert_eq!(db.count_books(&second_page).await.unwrap(), 3);

    let offset_only = BookFilter {
        offset: Some(4),
        ..Default::default()
    };
    let tail = db.list_books(&offset_only).await.unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].title, "a");
}

// ---------------------------------------------------------------------------
// Preferences tests
// ---------------------------------------------------------------------------

pub async fn test_preferences(db: &dyn Database) {
    assert!(db.get_preferences("reader-1").await.unwrap().is_none());

    let mut prefs = ReaderPreferences::defaults("reader-1");
    let saved = db.upsert_preferences(&prefs).await.unwrap();
    assert_eq!(saved.theme, Theme::Light);
    assert_eq!(saved.font_size, prefs.font_size);

    prefs.theme = Theme::Sepia;
    prefs.font_family = FontFamily::Monospace;
    prefs.font_size = 24;
    prefs.words_per_page = 500;
    db.upsert_preferences(&prefs).await.unwrap();

    let fetched = db.get_preferences("reader-1").await.unwrap().unwrap();
    assert_eq!(fetched.theme, Theme::Sepia);
    assert_eq!(fetched.font_family, FontFamily::Monospace);
    assert_eq!(fetched.font_size, 24);
    assert_eq!(fetched.words_per_page, 500);

    // Other readers are unaffected.
    assert!(db.get_preferences("reader-2").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// API key tests
// ---------------------------------------------------------------------------

pub async fn test_api_keys(db: &dyn Database) {
    assert!(!db.has_api_keys().await.unwrap());

    let key = db.insert_api_key("laptop", "hash-abc").await.unwrap();
    assert_eq!(key.name, "laptop");
    assert!(key.last_used_at.is_none());
    assert!(db.has_api_keys().await.unwrap());

    let found = db.find_api_key_by_hash("hash-abc").await.unwrap().unwrap();
    assert_eq!(found.id, key.id);
    assert!(db.find_api_key_by_hash("other").await.unwrap().is_none());

    db.touch_api_key(&key.id).await.unwrap();
    let touched = db.find_api_key_by_hash("hash-abc").await.unwrap().unwrap();
    assert!(touched.last_used_at.is_some());

    assert!(matches!(
        db.insert_api_key("dupe", "hash-abc").await.unwrap_err(),
        DbError::Conflict(_)
    ));

    assert_eq!(db.list_api_keys().await.unwrap().len(), 1);
    db.delete_api_key(&key.id).await.unwrap();
    assert!(!db.has_api_keys().await.unwrap());
    assert!(matches!(
        db.delete_api_key(&key.id).await.unwrap_err(),
        DbError::NotFound(_)
    ));
}
