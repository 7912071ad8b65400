//! Integration Tests - End-to-end Blog Client Testing
//!
//! Exercises `BlogClient`, the session and publish flows against the
//! in-memory store, and uses mockall doubles where a test needs to
//! prove that no request was made or to inject a store failure.

use std::sync::Arc;

use mockall::mock;
use tokio_test::{assert_err, assert_ok};

use repoblog::adapters::memory::{InMemoryDocumentStore, MemoryCredentialStore};
use repoblog::config::AppConfig;
use repoblog::domain::{MediaFile, MediaRejection, PostIndex};
use repoblog::error::{BlogError, Operation};
use repoblog::ports::{
    Access, ConcurrencyToken, Credential, CredentialStore, DocumentStore, Identity, PutReceipt,
    PutRequest, RemoteDocument, StoreResponse,
};
use repoblog::usecases::session::{self, SessionState};
use repoblog::usecases::{BlogClient, Draft, publish};

// ---- Mock Definitions ----

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl DocumentStore for Store {
        async fn whoami(&self, credential: &Credential) -> anyhow::Result<StoreResponse<Identity>>;

        async fn fetch(
            &self,
            path: &str,
            access: &Access,
        ) -> anyhow::Result<StoreResponse<RemoteDocument>>;

        async fn put(
            &self,
            path: &str,
            request: &PutRequest,
            credential: &Credential,
        ) -> anyhow::Result<StoreResponse<PutReceipt>>;
    }
}

mock! {
    pub Creds {}

    #[async_trait::async_trait]
    impl CredentialStore for Creds {
        async fn load(&self) -> anyhow::Result<Option<Credential>>;
        async fn save(&self, credential: &Credential) -> anyhow::Result<()>;
        async fn clear(&self) -> anyhow::Result<()>;
    }
}

// ---- Helpers ----

const INDEX: &str = "posts/posts.json";
const TOKEN: &str = "ghp_test";

type MemClient = BlogClient<InMemoryDocumentStore, MemoryCredentialStore>;

fn config() -> AppConfig {
    let mut config = AppConfig::new("octocat", "blog");
    config.media.max_file_size = 1024;
    config
}

fn memory_store() -> Arc<InMemoryDocumentStore> {
    Arc::new(InMemoryDocumentStore::new().with_identity(TOKEN, "octocat"))
}

async fn signed_in(store: &Arc<InMemoryDocumentStore>) -> MemClient {
    BlogClient::new(
        Arc::clone(store),
        Arc::new(MemoryCredentialStore::with_token(TOKEN)),
        &config(),
    )
    .await
    .unwrap()
}

async fn mocked(store: MockStore) -> BlogClient<MockStore, MemoryCredentialStore> {
    BlogClient::new(
        Arc::new(store),
        Arc::new(MemoryCredentialStore::with_token(TOKEN)),
        &config(),
    )
    .await
    .unwrap()
}

fn stored_index(store: &InMemoryDocumentStore) -> PostIndex {
    let raw = String::from_utf8(store.contents(INDEX).unwrap()).unwrap();
    PostIndex::from_json(&raw).unwrap()
}

// ---- Post index ----

#[tokio::test]
async fn test_absent_index_lists_empty() {
    let store = memory_store();
    let client = signed_in(&store).await;

    let listing = assert_ok!(client.list_posts().await);
    assert!(listing.posts.is_empty());
    assert!(listing.token.is_none());
}

#[tokio::test]
async fn test_create_post_goes_first_and_keeps_history() {
    let store = memory_store();
    let client = signed_in(&store).await;

    let first = client.create_post(Some("One"), "first", vec![]).await.unwrap();
    let second = client.create_post(None, "second", vec![]).await.unwrap();

    assert_ne!(first.id, second.id);
    assert!(second.id.millis() > first.id.millis());

    let listing = client.list_posts().await.unwrap();
    assert_eq!(listing.posts.len(), 2);
    assert_eq!(listing.posts[0].id, second.id);
    assert_eq!(listing.posts[1].id, first.id);
    assert_eq!(listing.token, store.token_of(INDEX));
}

#[tokio::test]
async fn test_create_post_preserves_foreign_fields() {
    let store = memory_store();
    store.seed(
        INDEX,
        r#"[{"id":"5","title":"Old","content":"x","media":[],
            "createdAt":"2024-01-01T00:00:00.000Z","pinned":true}]"#,
    );
    let client = signed_in(&store).await;

    let post = client.create_post(Some("New"), "y", vec![]).await.unwrap();

    let index = stored_index(&store);
    assert_eq!(index.posts()[0].id, post.id);
    assert_eq!(index.posts()[1].extra["pinned"], serde_json::json!(true));
}

#[tokio::test]
async fn test_get_post_missing_id() {
    let store = memory_store();
    let client = signed_in(&store).await;
    let post = client.create_post(Some("Hi"), "there", vec![]).await.unwrap();

    assert!(client.get_post("missing-id").await.unwrap().is_none());
    assert_eq!(client.get_post(post.id.as_str()).await.unwrap(), Some(post));
}

#[tokio::test]
async fn test_create_post_requires_credential() {
    let store = memory_store();
    let client = BlogClient::new(
        Arc::clone(&store),
        Arc::new(MemoryCredentialStore::new()),
        &config(),
    )
    .await
    .unwrap();

    let err = assert_err!(client.create_post(None, "text", vec![]).await);
    assert!(matches!(err, BlogError::AuthenticationRequired));
    assert_eq!(store.request_count(), 0);
}

// ---- Documents and conflicts ----

#[tokio::test]
async fn test_stale_token_rejected_and_document_unchanged() {
    let store = memory_store();
    let client = signed_in(&store).await;

    client.write_document("notes.txt", "v1", "create", None).await.unwrap();
    let read = client.read_document("notes.txt").await.unwrap().unwrap();

    // Someone else commits in between.
    store.seed("notes.txt", "theirs");

    let err = client
        .write_document("notes.txt", "mine", "update", Some(&read.token))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.operation(), Some(Operation::SaveFile));
    assert_eq!(store.contents("notes.txt").unwrap(), b"theirs");
}

#[tokio::test]
async fn test_write_with_current_token_succeeds() {
    let store = memory_store();
    let client = signed_in(&store).await;

    client.write_document("a.md", "one", "create", None).await.unwrap();
    let read = client.read_document("a.md").await.unwrap().unwrap();
    let receipt = client
        .write_document("a.md", "two", "update", Some(&read.token))
        .await
        .unwrap();

    assert_ne!(receipt.token, read.token);
    assert_eq!(client.read_document("a.md").await.unwrap().unwrap().content, "two");
}

#[tokio::test]
async fn test_read_missing_document_is_none() {
    let store = memory_store();
    let client = signed_in(&store).await;
    assert!(client.read_document("nope.txt").await.unwrap().is_none());
}

#[tokio::test]
async fn test_index_changed_between_read_and_write_surfaces_conflict() {
    let mut store = MockStore::new();
    store.expect_fetch().times(1).returning(|_, _| {
        Ok(StoreResponse::Ok(RemoteDocument {
            bytes: b"[]".to_vec(),
            token: ConcurrencyToken::new("sha-1"),
        }))
    });
    store
        .expect_put()
        .withf(|path, request, _| {
            path == INDEX && request.expected == Some(ConcurrencyToken::new("sha-1"))
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(StoreResponse::Conflict {
                message: Some("is at sha-2 but expected sha-1".to_string()),
            })
        });

    let client = mocked(store).await;
    let err = client.create_post(Some("Race"), "body", vec![]).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.status(), Some(409));
}

#[tokio::test]
async fn test_transport_failure_carries_operation_prefix() {
    let mut store = MockStore::new();
    store
        .expect_fetch()
        .returning(|_, _| Err(anyhow::anyhow!("connection reset")));

    let client = mocked(store).await;
    let err = client.list_posts().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to get posts: connection reset");

    let err = client.get_post("1").await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::GetPosts));
}

#[tokio::test]
async fn test_server_error_reports_status() {
    let mut store = MockStore::new();
    store.expect_put().returning(|_, _, _| {
        Ok(StoreResponse::Failed {
            status: 500,
            message: None,
        })
    });

    let client = mocked(store).await;
    let err = client.write_document("x.txt", "x", "msg", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to save file: HTTP 500");
    assert_eq!(err.status(), Some(500));
}

// ---- Media ----

#[tokio::test]
async fn test_upload_at_limit_succeeds_one_over_fails_without_write() {
    let store = memory_store();
    let client = signed_in(&store).await;

    let at_limit = MediaFile::new("photo.jpg", vec![0; 1024]);
    let uploaded = assert_ok!(client.upload_media(&at_limit, "image/jpeg").await);
    assert!(uploaded.path.starts_with("media/images/"));
    assert_eq!(store.write_count(), 1);

    let over = MediaFile::new("photo.jpg", vec![0; 1025]);
    let err = assert_err!(client.upload_media(&over, "image/jpeg").await);
    assert!(matches!(
        err,
        BlogError::Rejected(MediaRejection::TooLarge { size: 1025, limit: 1024 })
    ));
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_upload_prefers_store_download_url() {
    let store = Arc::new(
        InMemoryDocumentStore::new()
            .with_identity(TOKEN, "octocat")
            .with_download_base("https://cdn.test/"),
    );
    let client = signed_in(&store).await;

    let uploaded = client
        .upload_media(&MediaFile::new("song.mp3", vec![3; 32]), "audio/mpeg")
        .await
        .unwrap();

    assert!(uploaded.path.starts_with("media/audio/"));
    assert_eq!(uploaded.public_url, format!("https://cdn.test/{}", uploaded.path));
    assert_ne!(uploaded.public_url, client.media_url(&uploaded.path));
}

#[tokio::test]
async fn test_upload_pdf_makes_no_request() {
    // No expectations: any store call panics.
    let client = mocked(MockStore::new()).await;

    let err = client
        .upload_media(&MediaFile::new("paper.pdf", vec![1, 2, 3]), "application/pdf")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported media type: application/pdf");
}

#[tokio::test]
async fn test_upload_path_and_commit_message() {
    let mut store = MockStore::new();
    store
        .expect_put()
        .withf(|path, request, _| {
            let name = path.strip_prefix("media/audio/").unwrap_or_default();
            path.ends_with(".ogg")
                && request.expected.is_none()
                && request.message == format!("Upload media: {name}")
        })
        .times(1)
        .returning(|path, _, _| {
            Ok(StoreResponse::Ok(PutReceipt {
                token: ConcurrencyToken::new("sha-m"),
                download_url: Some(format!("https://cdn.example/{path}")),
            }))
        });

    let client = mocked(store).await;
    let uploaded = client
        .upload_media(&MediaFile::new("Voice Memo.OGG", vec![7; 16]), "audio/ogg")
        .await
        .unwrap();

    let name = uploaded.path.trim_start_matches("media/audio/");
    let (stamp, rest) = name.split_once('-').unwrap();
    assert!(stamp.parse::<u64>().is_ok());
    assert_eq!(rest.len(), "abcdefghi.ogg".len());
    assert_eq!(uploaded.public_url, format!("https://cdn.example/{}", uploaded.path));
}

#[tokio::test]
async fn test_media_url_is_pure() {
    let store = memory_store();
    let client = signed_in(&store).await;

    let url = client.media_url("media/videos/1-abc.mp4");
    assert_eq!(
        url,
        "https://raw.githubusercontent.com/octocat/blog/main/media/videos/1-abc.mp4"
    );
    assert_eq!(store.request_count(), 0);
}

// ---- Credentials and session ----

#[tokio::test]
async fn test_credential_storage_failure_surfaces() {
    let mut creds = MockCreds::new();
    creds
        .expect_load()
        .returning(|| Err(anyhow::anyhow!("permission denied")));

    let result = BlogClient::new(memory_store(), Arc::new(creds), &config()).await;
    assert!(matches!(result, Err(BlogError::CredentialStorage(_))));
}

#[tokio::test]
async fn test_set_credential_persists_before_holding() {
    let mut creds = MockCreds::new();
    creds.expect_load().returning(|| Ok(None));
    creds
        .expect_save()
        .withf(|credential| credential.expose() == TOKEN)
        .times(1)
        .returning(|_| Ok(()));

    let mut client = BlogClient::new(memory_store(), Arc::new(creds), &config())
        .await
        .unwrap();
    client.set_credential(TOKEN).await.unwrap();
    assert!(client.has_credential());
}

#[tokio::test]
async fn test_unauthorized_write_reports_status() {
    let store = memory_store();
    let client = BlogClient::new(
        Arc::clone(&store),
        Arc::new(MemoryCredentialStore::with_token("revoked")),
        &config(),
    )
    .await
    .unwrap();

    let err = client.write_document("a.txt", "x", "m", None).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(store.paths().is_empty());
}

#[tokio::test]
async fn test_session_resume_then_logout() {
    let store = memory_store();
    let creds = Arc::new(MemoryCredentialStore::with_token(TOKEN));
    let mut client = BlogClient::new(Arc::clone(&store), Arc::clone(&creds), &config())
        .await
        .unwrap();

    let state = session::resume(&mut client).await.unwrap();
    assert!(matches!(state, SessionState::SignedIn(ref id) if id.login == "octocat"));

    session::logout(&mut client).await.unwrap();
    assert!(creds.current().is_none());
    assert_eq!(session::resume(&mut client).await.unwrap(), SessionState::SignedOut);
}

#[tokio::test]
async fn test_resume_keeps_credential_on_transport_error() {
    let mut store = MockStore::new();
    store
        .expect_whoami()
        .returning(|_| Err(anyhow::anyhow!("dns failure")));

    let mut client = mocked(store).await;
    let err = session::resume(&mut client).await.unwrap_err();

    assert_eq!(err.operation(), Some(Operation::ValidateToken));
    assert!(client.has_credential());
}

// ---- Publish ----

#[tokio::test]
async fn test_publish_uploads_in_order_then_indexes() {
    let store = memory_store();
    let client = signed_in(&store).await;

    let mut draft = Draft::new("  Trip  ", "  Day one.  ", client.max_file_size());
    draft.stage(MediaFile::new("a.png", vec![1; 8]), "image/png").unwrap();
    draft.stage(MediaFile::new("b.mp4", vec![2; 8]), "video/mp4").unwrap();

    let published = publish(&client, draft).await.unwrap();

    assert_eq!(published.post.title.as_deref(), Some("Trip"));
    assert_eq!(published.post.content, "Day one.");
    assert_eq!(published.uploads.len(), 2);
    assert!(published.post.media[0].starts_with("media/images/"));
    assert!(published.post.media[1].starts_with("media/videos/"));

    let index = stored_index(&store);
    assert_eq!(index.posts()[0].media, published.post.media);
    // Two uploads and one index write.
    assert_eq!(store.write_count(), 3);
}

#[tokio::test]
async fn test_publish_requires_content() {
    let store = memory_store();
    let client = signed_in(&store).await;

    let err = publish(&client, Draft::new("Title only", "   ", 1024))
        .await
        .unwrap_err();
    assert!(matches!(err, BlogError::MissingContent));
    assert_eq!(store.request_count(), 0);
}

#[tokio::test]
async fn test_failed_upload_aborts_before_index() {
    let store = memory_store();
    let client = BlogClient::new(
        Arc::clone(&store),
        Arc::new(MemoryCredentialStore::with_token("revoked")),
        &config(),
    )
    .await
    .unwrap();

    let mut draft = Draft::new("", "body", client.max_file_size());
    draft.stage(MediaFile::new("a.gif", vec![0; 4]), "image/gif").unwrap();

    let err = publish(&client, draft).await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::UploadMedia));
    assert!(store.contents(INDEX).is_none());
}
