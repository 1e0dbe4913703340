//! Integration tests for the library cache module.
//!
//! These tests verify Library with a real in-memory Database, covering
//! upsert semantics, ordered retrieval, cascade deletion, and progress
//! lifecycle.

use repobook_core::{
    CacheError, CachedChapter, CachedPage, CachedRepo, Database, DownloadProgress, Library,
    ProgressStatus,
};

// ==================== Helper Functions ====================

async fn setup_library() -> Library {
    let db = Database::new_in_memory()
        .await
        .expect("Failed to create in-memory database");
    Library::new(db)
}

fn repo(id: &str) -> CachedRepo {
    let (owner, name) = id.split_once('/').expect("repo id must be owner/repo");
    CachedRepo {
        id: id.to_string(),
        owner: owner.to_string(),
        repo: name.to_string(),
        name: name.to_string(),
        description: Some(format!("Description of {id}")),
        full_name: id.to_string(),
        downloaded_at: String::new(),
    }
}

fn chapter(repo_id: &str, ord: i64, title: &str) -> CachedChapter {
    let content = format!("# {title}\n\nBody of {title}");
    CachedChapter {
        id: format!("sha-{repo_id}-{ord}"),
        repo_id: repo_id.to_string(),
        title: title.to_string(),
        content_size: content.chars().count() as i64,
        content,
        path: format!("{}.md", title.to_lowercase()),
        ord,
    }
}

fn page(repo_id: &str, chapter_index: i64, page_index: i64, ord: i64) -> CachedPage {
    CachedPage {
        repo_id: repo_id.to_string(),
        chapter_index,
        page_index,
        title: format!("Chapter {chapter_index}"),
        content: format!("page {ord} content"),
        content_preview: format!("page {ord} content"),
        content_length: 14,
        ord,
    }
}

// ==================== Repository Upsert Tests ====================

#[tokio::test]
async fn test_save_and_get_repo_round_trip() {
    let library = setup_library().await;

    library.save_repo(&repo("acme/docs")).await.unwrap();

    let stored = library.get_repo("acme/docs").await.unwrap().unwrap();
    assert_eq!(stored.owner, "acme");
    assert_eq!(stored.repo, "docs");
    assert_eq!(stored.full_name, "acme/docs");
    assert_eq!(stored.description.as_deref(), Some("Description of acme/docs"));
    assert!(
        !stored.downloaded_at.is_empty(),
        "downloaded_at should be set by SQL"
    );
}

#[tokio::test]
async fn test_get_repo_returns_none_when_missing() {
    let library = setup_library().await;
    assert!(library.get_repo("ghost/nowhere").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_repo_twice_does_not_accumulate_rows() {
    let library = setup_library().await;

    library.save_repo(&repo("acme/docs")).await.unwrap();
    let mut updated = repo("acme/docs");
    updated.description = Some("Updated description".to_string());
    library.save_repo(&updated).await.unwrap();

    let repos = library.list_repos().await.unwrap();
    assert_eq!(repos.len(), 1, "upsert must replace, not duplicate");
    assert_eq!(repos[0].description.as_deref(), Some("Updated description"));
}

#[tokio::test]
async fn test_list_repos_returns_all_cached() {
    let library = setup_library().await;

    library.save_repo(&repo("acme/docs")).await.unwrap();
    library.save_repo(&repo("widgets/manual")).await.unwrap();

    let repos = library.list_repos().await.unwrap();
    assert_eq!(repos.len(), 2);
    let ids: Vec<_> = repos.iter().map(|r| r.id.as_str()).collect();
    assert!(ids.contains(&"acme/docs"));
    assert!(ids.contains(&"widgets/manual"));
}

// ==================== Chapter Tests ====================

#[tokio::test]
async fn test_get_chapters_ordered_by_ord_in_sql() {
    let library = setup_library().await;

    // Insert deliberately out of order
    library.save_chapter(&chapter("acme/docs", 2, "Third")).await.unwrap();
    library.save_chapter(&chapter("acme/docs", 0, "First")).await.unwrap();
    library.save_chapter(&chapter("acme/docs", 1, "Second")).await.unwrap();

    let chapters = library.get_chapters("acme/docs").await.unwrap();
    let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
    let ords: Vec<_> = chapters.iter().map(|c| c.ord).collect();
    assert_eq!(ords, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_save_chapter_same_ord_replaces() {
    let library = setup_library().await;

    library.save_chapter(&chapter("acme/docs", 0, "Old")).await.unwrap();
    library.save_chapter(&chapter("acme/docs", 0, "New")).await.unwrap();

    let chapters = library.get_chapters("acme/docs").await.unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].title, "New");
}

#[tokio::test]
async fn test_chapters_isolated_per_repo() {
    let library = setup_library().await;

    library.save_chapter(&chapter("acme/docs", 0, "Alpha")).await.unwrap();
    library.save_chapter(&chapter("widgets/manual", 0, "Beta")).await.unwrap();

    let chapters = library.get_chapters("acme/docs").await.unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].title, "Alpha");
    assert_eq!(library.count_chapters("widgets/manual").await.unwrap(), 1);
}

#[tokio::test]
async fn test_purge_repo_removes_every_trace() {
    let library = setup_library().await;

    library.save_repo(&repo("acme/docs")).await.unwrap();
    library.save_chapter(&chapter("acme/docs", 0, "Intro")).await.unwrap();
    library
        .save_pages("acme/docs", &[page("acme/docs", 0, 0, 0)])
        .await
        .unwrap();
    library
        .upsert_progress(&DownloadProgress::completed("acme/docs", 1))
        .await
        .unwrap();

    let removed = library.purge_repo("acme/docs").await.unwrap();
    assert_eq!(removed, 1);

    assert!(library.get_repo("acme/docs").await.unwrap().is_none());
    assert_eq!(library.count_chapters("acme/docs").await.unwrap(), 0);
    assert!(library.get_pages("acme/docs").await.unwrap().is_empty());
    assert!(library.get_progress("acme/docs").await.unwrap().is_none());
}

#[tokio::test]
async fn test_purge_repo_missing_is_not_an_error() {
    let library = setup_library().await;
    assert_eq!(library.purge_repo("ghost/nowhere").await.unwrap(), 0);
}

// ==================== Page Tests ====================

#[tokio::test]
async fn test_get_pages_ordered_by_flat_ord() {
    let library = setup_library().await;

    let pages = vec![
        page("acme/docs", 1, 0, 2),
        page("acme/docs", 0, 0, 0),
        page("acme/docs", 0, 1, 1),
    ];
    library.save_pages("acme/docs", &pages).await.unwrap();

    let stored = library.get_pages("acme/docs").await.unwrap();
    let ords: Vec<_> = stored.iter().map(|p| p.ord).collect();
    assert_eq!(ords, vec![0, 1, 2]);
    assert_eq!(stored[2].chapter_index, 1);
}

#[tokio::test]
async fn test_save_pages_replaces_previous_set() {
    let library = setup_library().await;

    let first = vec![
        page("acme/docs", 0, 0, 0),
        page("acme/docs", 0, 1, 1),
        page("acme/docs", 0, 2, 2),
    ];
    library.save_pages("acme/docs", &first).await.unwrap();

    let second = vec![page("acme/docs", 0, 0, 0)];
    library.save_pages("acme/docs", &second).await.unwrap();

    let stored = library.get_pages("acme/docs").await.unwrap();
    assert_eq!(stored.len(), 1, "old page set must be fully replaced");
}

// ==================== Deletion Tests ====================

#[tokio::test]
async fn test_delete_repo_cascades_to_all_tables() {
    let library = setup_library().await;

    library.save_repo(&repo("acme/docs")).await.unwrap();
    library.save_chapter(&chapter("acme/docs", 0, "Intro")).await.unwrap();
    library
        .save_pages("acme/docs", &[page("acme/docs", 0, 0, 0)])
        .await
        .unwrap();
    library
        .upsert_progress(&DownloadProgress::completed("acme/docs", 1))
        .await
        .unwrap();

    library.delete_repo("acme/docs").await.unwrap();

    assert!(library.get_repo("acme/docs").await.unwrap().is_none());
    assert_eq!(library.count_chapters("acme/docs").await.unwrap(), 0);
    assert!(library.get_pages("acme/docs").await.unwrap().is_empty());
    assert!(library.get_progress("acme/docs").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_repo_leaves_other_repos_intact() {
    let library = setup_library().await;

    library.save_repo(&repo("acme/docs")).await.unwrap();
    library.save_repo(&repo("widgets/manual")).await.unwrap();
    library.save_chapter(&chapter("widgets/manual", 0, "Kept")).await.unwrap();

    library.delete_repo("acme/docs").await.unwrap();

    assert!(library.get_repo("widgets/manual").await.unwrap().is_some());
    assert_eq!(library.count_chapters("widgets/manual").await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_repo_missing_returns_repo_not_found() {
    let library = setup_library().await;

    let result = library.delete_repo("ghost/nowhere").await;
    assert!(
        matches!(result, Err(CacheError::RepoNotFound { .. })),
        "expected RepoNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn test_clear_all_wipes_every_table() {
    let library = setup_library().await;

    library
        .upsert_user("reader", Some("A Reader"), None, Some("tok"))
        .await
        .unwrap();
    library.save_repo(&repo("acme/docs")).await.unwrap();
    library.save_chapter(&chapter("acme/docs", 0, "Intro")).await.unwrap();
    library
        .upsert_progress(&DownloadProgress::completed("acme/docs", 1))
        .await
        .unwrap();

    let removed = library.clear_all().await.unwrap();
    assert_eq!(removed, 1);

    assert!(library.list_repos().await.unwrap().is_empty());
    assert_eq!(library.count_chapters("acme/docs").await.unwrap(), 0);
    assert!(library.get_progress("acme/docs").await.unwrap().is_none());
    assert!(library.get_user("reader").await.unwrap().is_none());
}

// ==================== Progress Tests ====================

#[tokio::test]
async fn test_progress_upsert_overwrites_in_place() {
    let library = setup_library().await;

    library
        .upsert_progress(&DownloadProgress::downloading("acme/docs", 0, 5))
        .await
        .unwrap();
    library
        .upsert_progress(&DownloadProgress::downloading("acme/docs", 3, 5))
        .await
        .unwrap();

    let stored = library.get_progress("acme/docs").await.unwrap().unwrap();
    assert_eq!(stored.current, 3);
    assert_eq!(stored.total, 5);
    assert_eq!(stored.status(), ProgressStatus::Downloading);
}

#[tokio::test]
async fn test_progress_failed_carries_error_text() {
    let library = setup_library().await;

    library
        .upsert_progress(&DownloadProgress::failed("acme/docs", "rate limited"))
        .await
        .unwrap();

    let stored = library.get_progress("acme/docs").await.unwrap().unwrap();
    assert_eq!(stored.status(), ProgressStatus::Failed);
    assert_eq!(stored.error.as_deref(), Some("rate limited"));
}

#[tokio::test]
async fn test_get_progress_none_when_absent() {
    let library = setup_library().await;
    assert!(library.get_progress("acme/docs").await.unwrap().is_none());
}

// ==================== User Tests ====================

#[tokio::test]
async fn test_upsert_user_updates_existing_login() {
    let library = setup_library().await;

    let first_id = library
        .upsert_user("reader", Some("Old Name"), None, None)
        .await
        .unwrap();
    let second_id = library
        .upsert_user("reader", Some("New Name"), Some("https://img"), Some("tok"))
        .await
        .unwrap();

    assert_eq!(first_id, second_id, "same login must keep the same row");

    let user = library.get_user("reader").await.unwrap().unwrap();
    assert_eq!(user.name.as_deref(), Some("New Name"));
    assert_eq!(user.avatar_url.as_deref(), Some("https://img"));
    assert_eq!(user.access_token.as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_get_user_none_when_absent() {
    let library = setup_library().await;
    assert!(library.get_user("nobody").await.unwrap().is_none());
}
