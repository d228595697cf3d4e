mod common;

use appbase_content::client::Table;
use appbase_content::models::db_operations::{ErrorKind, NOT_INITIALIZED};
use appbase_content::models::envelope::Envelope;
use appbase_content::models::{
    ContentKind, ContentPatch, DashboardStats, MediaKind, MediaPatch, NewContent, NewMedia, RecordId, UploadFile,
};
use regex::Regex;
use serde_json::{json, Map};

use common::{content_row, media_row, ready_facade, unready_facade, MemoryBackend};

fn seed_content(backend: &MemoryBackend) {
    backend.seed(Table::Content, content_row(1, "news", true, "2024-01-01T08:00:00Z", "Opening"));
    backend.seed(Table::Content, content_row(2, "news", false, "2024-03-01T08:00:00Z", "Draft news"));
    backend.seed(Table::Content, content_row(3, "courses", true, "2024-02-01T08:00:00Z", "Tajweed"));
    backend.seed(Table::Content, content_row(4, "news", true, "2024-02-15T08:00:00Z", "Graduation"));
    backend.seed(Table::Content, content_row(5, "pages", true, "2023-12-01T08:00:00Z", "About"));
}

#[tokio::test]
async fn authoring_list_is_newest_first_and_includes_drafts() {
    let backend = MemoryBackend::new();
    seed_content(&backend);
    let facade = ready_facade(&backend);

    let all = facade.list_content(None).await.expect("list should succeed");
    let ids: Vec<String> = all.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, ["2", "4", "3", "1", "5"]);
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let news = facade.list_content(Some(ContentKind::News)).await.expect("list should succeed");
    assert_eq!(news.len(), 3);
    assert!(news.iter().any(|r| !r.published));
}

#[tokio::test]
async fn public_listing_only_returns_published_records_of_the_kind() {
    let backend = MemoryBackend::new();
    seed_content(&backend);
    let facade = ready_facade(&backend);

    let news = facade
        .get_public_content(ContentKind::News, None)
        .await
        .expect("public list should succeed");
    assert_eq!(news.len(), 2);
    assert!(news.iter().all(|r| r.published && r.r#type == "news"));
    assert_eq!(news[0].title, "Graduation");

    let limited = facade
        .get_public_content(ContentKind::News, Some(1))
        .await
        .expect("public list should succeed");
    assert_eq!(limited.len(), 1);
    assert_eq!(backend.last_select().and_then(|q| q.limit), Some(1));
}

#[tokio::test]
async fn rows_with_null_display_fields_still_list() {
    let backend = MemoryBackend::new();
    seed_content(&backend);
    let mut untitled = content_row(6, "news", true, "2024-04-01T08:00:00Z", "");
    untitled["title"] = json!(null);
    untitled["description"] = json!(null);
    backend.seed(Table::Content, untitled);
    let mut unknown_state = content_row(7, "news", true, "2024-04-02T08:00:00Z", "Unreviewed");
    unknown_state["published"] = json!(null);
    backend.seed(Table::Content, unknown_state);
    let facade = ready_facade(&backend);

    let news = facade
        .get_public_content(ContentKind::News, None)
        .await
        .expect("public list should succeed");
    assert_eq!(news.len(), 3);
    assert_eq!(news[0].id, RecordId::Int(6));
    assert_eq!(news[0].title, "");
    assert_eq!(news[0].description, None);

    let all = facade.list_content(None).await.expect("list should succeed");
    let unreviewed = all.iter().find(|r| r.id == RecordId::Int(7)).expect("row listed");
    assert!(!unreviewed.published);
}

#[tokio::test]
async fn get_content_reports_not_found_for_missing_rows() {
    let backend = MemoryBackend::new();
    seed_content(&backend);
    let facade = ready_facade(&backend);

    let found = facade.get_content(&RecordId::Int(3)).await.expect("row exists");
    assert_eq!(found.title, "Tajweed");

    let err = facade.get_content(&RecordId::Int(99)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn text_keys_are_matched_like_integer_keys() {
    let backend = MemoryBackend::new();
    let key = uuid::Uuid::new_v4().to_string();
    let mut row = content_row(0, "files", true, "2024-04-01T08:00:00Z", "Timetable");
    row["id"] = json!(key);
    backend.seed(Table::Content, row);
    let facade = ready_facade(&backend);

    let found = facade.get_content(&RecordId::from(key.clone())).await.expect("row exists");
    assert_eq!(found.id, RecordId::Text(key));
    assert_eq!(found.title, "Timetable");
}

#[tokio::test]
async fn create_update_and_delete_content() {
    let backend = MemoryBackend::new();
    let facade = ready_facade(&backend);

    let created = facade
        .create_content(&NewContent {
            r#type: ContentKind::Courses,
            title: "Memorization circle".to_string(),
            description: Some("Evening sessions".to_string()),
            image_url: None,
            published: false,
            extra: Map::new(),
        })
        .await
        .expect("insert should succeed");
    assert_eq!(created.r#type, "courses");
    assert!(!created.published);

    let updated = facade
        .update_content(
            &created.id,
            &ContentPatch {
                published: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("update should succeed");
    assert!(updated.published);
    assert_eq!(updated.title, "Memorization circle");

    facade.delete_content(&created.id).await.expect("delete should succeed");
    assert!(backend.rows(Table::Content).is_empty());
}

#[tokio::test]
async fn create_update_and_get_media() {
    let backend = MemoryBackend::new();
    let facade = ready_facade(&backend);

    let created = facade
        .create_media(&NewMedia {
            r#type: MediaKind::Video,
            title: Some("Recitation".to_string()),
            file_path: None,
            url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            extra: Map::new(),
        })
        .await
        .expect("insert should succeed");
    assert_eq!(created.kind(), Some(MediaKind::Video));

    let updated = facade
        .update_media(
            &created.id,
            &MediaPatch {
                title: Some("Evening recitation".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.title.as_deref(), Some("Evening recitation"));
    assert_eq!(updated.url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));

    let fetched = facade.get_media(&created.id).await.expect("row exists");
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn updating_a_missing_row_is_not_found() {
    let backend = MemoryBackend::new();
    seed_content(&backend);
    let facade = ready_facade(&backend);

    let err = facade
        .update_content(&RecordId::Int(99), &ContentPatch { published: Some(false), ..Default::default() })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = facade
        .update_media(&RecordId::Int(99), &MediaPatch { title: Some("x".to_string()), ..Default::default() })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Media item not found");
}

#[tokio::test]
async fn second_page_requests_rows_20_to_39_and_counts_pages() {
    let backend = MemoryBackend::new();
    for i in 0..45 {
        let created_at = format!("2024-01-01T00:{:02}:00Z", i);
        let path = format!("images/{}.png", i);
        backend.seed(Table::Media, media_row(i, "image", Some(&path), &created_at));
    }
    backend.seed(Table::Media, media_row(100, "audio", Some("audio/a.mp3"), "2024-02-01T00:00:00Z"));
    let facade = ready_facade(&backend);

    let page = facade
        .list_media(Some(MediaKind::Image), 2, 20)
        .await
        .expect("list should succeed");

    assert_eq!(backend.last_select().and_then(|q| q.range), Some((20, 39)));
    assert_eq!(page.data.len(), 20);
    assert_eq!(page.data[0].id, RecordId::Int(24));
    assert_eq!(page.pagination.total, 45);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.page_size, 20);

    let last = facade.list_media(Some(MediaKind::Image), 3, 20).await.expect("list should succeed");
    assert_eq!(last.data.len(), 5);
}

#[tokio::test]
async fn deleting_a_video_never_touches_storage() {
    let backend = MemoryBackend::new();
    backend.seed(Table::Media, media_row(1, "video", Some("videos/clip.mp4"), "2024-01-01T00:00:00Z"));
    let facade = ready_facade(&backend);

    facade.delete_media(&RecordId::Int(1)).await.expect("delete should succeed");

    assert!(backend.rows(Table::Media).is_empty());
    assert!(backend.removal_attempts().is_empty());
}

#[tokio::test]
async fn deleting_an_image_removes_its_file() {
    let backend = MemoryBackend::new();
    backend.seed(Table::Media, media_row(1, "image", Some("images/a.png"), "2024-01-01T00:00:00Z"));
    backend.seed_file("images/a.png");
    let facade = ready_facade(&backend);

    facade.delete_media(&RecordId::Int(1)).await.expect("delete should succeed");

    assert_eq!(backend.removal_attempts(), ["images/a.png"]);
    assert!(!backend.has_file("images/a.png"));
}

#[tokio::test]
async fn storage_failure_during_media_delete_is_not_fatal() {
    let backend = MemoryBackend::new();
    backend.seed(Table::Media, media_row(1, "audio", Some("audio/a.mp3"), "2024-01-01T00:00:00Z"));
    backend.fail_removals();
    let facade = ready_facade(&backend);

    let result = facade.delete_media(&RecordId::Int(1)).await;

    assert!(result.is_ok());
    assert!(Envelope::done(result).success);
    assert!(backend.rows(Table::Media).is_empty());
    assert_eq!(backend.removal_attempts(), ["audio/a.mp3"]);
}

#[tokio::test]
async fn deleting_missing_media_fails_with_not_found() {
    let backend = MemoryBackend::new();
    let facade = ready_facade(&backend);

    let err = facade.delete_media(&RecordId::Int(5)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Media item not found");
}

#[tokio::test]
async fn uploads_land_in_their_folders_with_generated_names() {
    let backend = MemoryBackend::new();
    let facade = ready_facade(&backend);
    let name = Regex::new(r"^\d+_[a-z0-9]+\.mp3$").unwrap();

    let file = UploadFile::new("lesson one.mp3", b"ID3".to_vec());
    let uploaded = facade
        .upload_media_file(&file, MediaKind::Audio)
        .await
        .expect("upload should succeed");

    let (folder, file_name) = uploaded.path.split_once('/').expect("path has a folder");
    assert_eq!(folder, "audio");
    assert!(name.is_match(file_name), "unexpected name {}", file_name);
    assert_eq!(uploaded.url, format!("https://storage.test/media/{}", uploaded.path));
    assert!(backend.has_file(&uploaded.path));

    let (_, options) = backend.uploads().pop().expect("upload recorded");
    assert_eq!(options.cache_control_secs, Some(3600));
    assert!(!options.upsert);
    assert_eq!(options.content_type.as_deref(), Some("audio/mpeg"));

    let doc = facade
        .upload_file(&UploadFile::new("syllabus.pdf", b"%PDF".to_vec()), "content")
        .await
        .expect("upload should succeed");
    assert!(doc.path.starts_with("content/"));
    assert!(doc.path.ends_with(".pdf"));

    let odd = facade
        .upload_media_file(&UploadFile::new("a.x/../../y", b"GIF8".to_vec()), MediaKind::Image)
        .await
        .expect("upload should succeed");
    assert_eq!(odd.path.matches('/').count(), 1);
    assert!(odd.path.starts_with("images/") && odd.path.ends_with(".bin"));
}

#[tokio::test]
async fn delete_file_surfaces_storage_errors() {
    let backend = MemoryBackend::new();
    backend.seed_file("content/old.pdf");
    let facade = ready_facade(&backend);

    facade.delete_file("content/old.pdf").await.expect("delete should succeed");
    assert!(!backend.has_file("content/old.pdf"));

    backend.fail_removals();
    let err = facade.delete_file("content/other.pdf").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);
}

#[tokio::test]
async fn dashboard_stats_count_each_kind_and_the_total() {
    let backend = MemoryBackend::new();
    seed_content(&backend);
    let facade = ready_facade(&backend);

    let stats = facade.dashboard_stats().await.expect("stats should succeed");
    assert_eq!(
        stats,
        DashboardStats {
            total_content: 5,
            courses: 1,
            news: 3,
            files: 0,
            pages: 1,
        }
    );
}

#[tokio::test]
async fn one_failed_count_fails_the_whole_dashboard() {
    let backend = MemoryBackend::new();
    seed_content(&backend);
    backend.fail_count_for_type("files");
    let facade = ready_facade(&backend);

    let result = facade.dashboard_stats().await;
    assert!(result.is_err());

    let envelope = serde_json::to_value(Envelope::stats(result)).expect("serializes");
    assert_eq!(envelope["success"], json!(false));
    assert_eq!(
        envelope["stats"],
        json!({ "totalContent": 0, "courses": 0, "news": 0, "files": 0, "pages": 0 })
    );
}

#[tokio::test]
async fn operations_fail_without_a_handle() {
    let facade = unready_facade();

    let err = facade.list_content(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotReady);
    assert_eq!(err.message, NOT_INITIALIZED);

    let envelope = Envelope::data(facade.get_public_content(ContentKind::News, Some(3)).await);
    assert!(!envelope.success);
    assert!(envelope.body.data.is_empty());

    let page = facade.list_media(None, 1, 20).await;
    assert_eq!(page.unwrap_err().kind, ErrorKind::NotReady);
}
