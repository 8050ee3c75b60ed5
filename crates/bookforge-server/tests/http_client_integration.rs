use bookforge_core::book::{BookFilter, UpdateBook, Visibility};
use bookforge_core::preferences::{Theme, UpdatePreferences};
use bookforge_server::test_helpers::{
    spawn_router, spawn_test_server, test_router_with, test_router_with_auth,
};
use bookforge_service::{BookService, ForgeRequest, HttpService, ReadRequest, ServiceError};

fn forge_request(visibility: Visibility) -> ForgeRequest {
    ForgeRequest {
        idea: "a lighthouse keeper who can hear the tides counting".into(),
        author: "Marisol".into(),
        visibility,
    }
}

#[tokio::test]
async fn health_check() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    svc.health_check().await.unwrap();
}

#[tokio::test]
async fn forge_get_list_delete() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);

    let book = svc.forge_book(&forge_request(Visibility::Private)).await.unwrap();
    assert_eq!(book.title, "The Lighthouse Clock");
    assert_eq!(book.author, "Marisol");
    assert!(book.content.contains("## Chapter 3"));

    let fetched = svc.get_book(&book.id).await.unwrap();
    assert_eq!(fetched.id, book.id);
    assert_eq!(fetched.cover_prompt, book.cover_prompt);

    let library = svc.list_books(&BookFilter::default()).await.unwrap();
    assert_eq!(library.len(), 1);
    assert!(library[0].word_count >= 600);

    svc.delete_book(&book.id).await.unwrap();
    let err = svc.get_book(&book.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn update_and_publish() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    let book = svc.forge_book(&forge_request(Visibility::Private)).await.unwrap();

    let updated = svc
        .update_book(
            &book.id,
            &UpdateBook {
                title: Some("  Tidal Hours ".into()),
                visibility: Some(Visibility::Public),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Tidal Hours");
    assert_eq!(updated.visibility, Visibility::Public);

    let gallery = svc.gallery(None, None).await.unwrap();
    assert_eq!(gallery.total, 1);
    assert_eq!(gallery.books[0].title, "Tidal Hours");

    let err = svc
        .update_book(
            &book.id,
            &UpdateBook {
                title: Some(" ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)), "{err:?}");
}

#[tokio::test]
async fn gallery_shows_only_public_books() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    svc.forge_book(&forge_request(Visibility::Public)).await.unwrap();
    svc.forge_book(&forge_request(Visibility::Private)).await.unwrap();
    svc.forge_book(&forge_request(Visibility::Public)).await.unwrap();

    let gallery = svc.gallery(Some(1), Some(0)).await.unwrap();
    assert_eq!(gallery.total, 2);
    assert_eq!(gallery.books.len(), 1);
    assert_eq!(gallery.limit, 1);
    assert!(gallery.books.iter().all(|b| b.visibility == Visibility::Public));

    let private = svc
        .list_books(&BookFilter {
            visibility: Some(Visibility::Private),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(private.len(), 1);
}

#[tokio::test]
async fn read_pages_with_preferences() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    let book = svc.forge_book(&forge_request(Visibility::Private)).await.unwrap();

    let first = svc
        .read_page(&book.id, &ReadRequest::default())
        .await
        .unwrap();
    assert_eq!(first.page.index, 0);
    assert!(first.page.has_next);
    assert!(!first.page.has_previous);
    assert!(first.page.total_pages >= 3);

    let last = svc
        .read_page(
            &book.id,
            &ReadRequest {
                page: 999,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(last.page.index, last.page.total_pages - 1);
    assert!(!last.page.has_next);

    svc.update_preferences(
        "reader-7",
        &UpdatePreferences {
            theme: Some(Theme::Dark),
            words_per_page: Some(100),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let view = svc
        .read_page(
            &book.id,
            &ReadRequest {
                page: 0,
                words_per_page: None,
                reader_id: Some("reader-7".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(view.preferences.theme, Theme::Dark);
    assert_eq!(view.page.text.split_whitespace().count(), 100);
}

#[tokio::test]
async fn preferences_default_then_validate() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);

    let prefs = svc.get_preferences("new-reader").await.unwrap();
    assert_eq!(prefs.theme, Theme::Light);

    let err = svc
        .update_preferences(
            "new-reader",
            &UpdatePreferences {
                font_size: Some(99),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)), "{err:?}");
}

#[tokio::test]
async fn cover_bytes_and_regeneration() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    let book = svc.forge_book(&forge_request(Visibility::Public)).await.unwrap();

    let cover = svc.cover(&book.id).await.unwrap();
    assert_eq!(cover.mime_type, "image/png");
    assert!(!cover.bytes.is_empty());

    let regenerated = svc.regenerate_cover(&book.id).await.unwrap();
    assert_ne!(regenerated.cover_key, book.cover_key);
    assert_eq!(regenerated.cover_prompt, book.cover_prompt);
    svc.cover(&book.id).await.unwrap();
}

#[tokio::test]
async fn generation_failure_maps_to_generation_error() {
    let app = test_router_with(
        bookforge_genai::MockTextGenerator::failure("quota exhausted"),
        bookforge_genai::MockCoverGenerator::success(),
    )
    .await;
    let server = spawn_router(app).await;
    let svc = HttpService::new(&server.base_url);

    let err = svc
        .forge_book(&forge_request(Visibility::Private))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Generation(_)), "{err:?}");
    assert!(svc.list_books(&BookFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_output_is_reported() {
    let app = test_router_with(
        bookforge_genai::MockTextGenerator::success("just some prose without tags"),
        bookforge_genai::MockCoverGenerator::success(),
    )
    .await;
    let server = spawn_router(app).await;
    let svc = HttpService::new(&server.base_url);

    let err = svc
        .forge_book(&forge_request(Visibility::Private))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Generation(_)), "{err:?}");
}

#[tokio::test]
async fn api_key_required_when_auth_enabled() {
    let (app, key) = test_router_with_auth().await;
    let server = spawn_router(app).await;

    let anonymous = HttpService::new(&server.base_url);
    anonymous.health_check().await.unwrap();
    let err = anonymous
        .list_books(&BookFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)), "{err:?}");
    assert!(err.to_string().contains("BOOKFORGE_API_KEY"), "{err}");
    anonymous.gallery(None, None).await.unwrap();

    let authed = HttpService::with_api_key(&server.base_url, key);
    let book = authed
        .forge_book(&forge_request(Visibility::Public))
        .await
        .unwrap();
    anonymous.cover(&book.id).await.unwrap();
}
