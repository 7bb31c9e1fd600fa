//! Integration tests for document and image stores.

use folio::editor::{EditingSession, Position, Range};
use folio::model::MarkKind;
use folio::render::FALLBACK_MARKUP;
use folio::store::{load_rendered, save_session};
use folio::{
    markdown_to_stored, DirectoryStore, DocumentStore, Error, Folio, ImageStore, MemoryStore,
    PostId, RenderOptions, StoredDocument,
};
use serde_json::json;
use tempfile::TempDir;

const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

#[test]
fn test_directory_store_save_and_render() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let id = PostId::new("hello-world");

    let mut session = EditingSession::new();
    assert!(session.insert_text(&Position::new([0], 0), "First post"));
    assert!(session.toggle_mark(&Range::within([0], 0, 5), MarkKind::Bold));
    save_session(&store, &id, &session).unwrap();

    let file = dir.path().join("posts").join("hello-world.json");
    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.contains('\n'));
    assert!(!dir.path().join("posts").join("hello-world.json.tmp").exists());

    let rendered = load_rendered(&store, &id, &RenderOptions::default()).unwrap();
    assert_eq!(rendered.markup, "<p><strong>First</strong> post</p>");
    assert_eq!(store.post_ids().unwrap(), vec![id]);
}

#[test]
fn test_directory_store_overwrites() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let id = PostId::new("draft");

    store.save_document(&id, &markdown_to_stored("Old")).unwrap();
    store.save_document(&id, &markdown_to_stored("New")).unwrap();

    let rendered = Folio::new().render_post(&store, &id).unwrap();
    assert_eq!(rendered.markup, "<p>New</p>");
}

#[test]
fn test_missing_and_unsafe_ids() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());

    assert!(store.post_ids().unwrap().is_empty());
    assert!(matches!(
        store.load_document(&PostId::new("nope")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.load_document(&PostId::new("../secrets")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.save_document(&PostId::new("a/b"), &StoredDocument::empty()),
        Err(Error::Write(_))
    ));
}

#[test]
fn test_corrupt_post_renders_fallback() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let id = PostId::new("broken");
    store
        .save_document(&id, &StoredDocument::from_value(json!({"type": "doc", "content": [{"type": "video"}]})))
        .unwrap();

    let rendered = load_rendered(&store, &id, &RenderOptions::default()).unwrap();
    assert_eq!(rendered.markup, FALLBACK_MARKUP);

    let session = Folio::new().edit(&store, &id).unwrap();
    assert_eq!(session.document().text_content(), folio::codec::PLACEHOLDER_TEXT);
}

#[test]
fn test_directory_image_upload() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path()).with_public_prefix("https://blog.test/media/");

    let url = store.upload_image(GIF, "loop.gif").unwrap();
    assert!(url.starts_with("https://blog.test/media/"));
    assert!(url.ends_with(".gif"));

    let name = url.rsplit('/').next().unwrap();
    let saved = std::fs::read(dir.path().join("images").join(name)).unwrap();
    assert_eq!(saved, GIF);

    assert!(matches!(store.upload_image(b"", "a.gif"), Err(Error::Upload(_))));
}

#[test]
fn test_upload_names_are_unique() {
    let store = MemoryStore::new();
    let a = store.upload_image(GIF, "a.gif").unwrap();
    let b = store.upload_image(GIF, "a.gif").unwrap();
    assert_ne!(a, b);
    assert_eq!(store.image_count(), 2);
}

#[test]
fn test_stores_are_interchangeable() {
    let dir = TempDir::new().unwrap();
    let stores: Vec<Box<dyn DocumentStore>> = vec![
        Box::new(MemoryStore::new()),
        Box::new(DirectoryStore::new(dir.path())),
    ];
    let doc = markdown_to_stored("## Title\n\nBody");

    for store in &stores {
        let id = PostId::from("post");
        store.save_document(&id, &doc).unwrap();
        assert_eq!(store.load_document(&id).unwrap(), doc);
    }
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_async_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let id = PostId::new("async-post");
    let doc = markdown_to_stored("Async body");

    store.save_document_async(&id, &doc).await.unwrap();
    assert_eq!(store.load_document_async(&id).await.unwrap(), doc);

    let url = store.upload_image_async(GIF, "x.gif").await.unwrap();
    assert!(url.starts_with("/images/"));
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_async_failed_save_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    std::fs::create_dir_all(dir.path().join("posts/taken.json")).unwrap();

    let result = store.save_document_async(&PostId::new("taken"), &markdown_to_stored("x")).await;
    assert!(matches!(result, Err(Error::Write(_))));
    assert!(!dir.path().join("posts/taken.json.tmp").exists());
}
