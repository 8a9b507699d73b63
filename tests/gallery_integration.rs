//! Gallery persistence integration tests for Cheese.
//!
//! Tests that selfies appended to a SQLite-backed gallery survive reopening
//! the database, using a temporary directory per test.

use cheese_lib::capture::{EncodedImage, GalleryAppender};
use cheese_lib::database::SqliteListStore;
use cheese_lib::gallery::{Gallery, ListStore};
use std::sync::Arc;
use tempfile::TempDir;

fn open_gallery(dir: &TempDir) -> (Arc<SqliteListStore>, Gallery) {
    let store = Arc::new(
        SqliteListStore::open(dir.path().join("cheese.db")).expect("Failed to open store"),
    );
    let gallery = Gallery::restore(store.clone(), "selfies").expect("Failed to restore gallery");
    (store, gallery)
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_gallery_survives_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    {
        let (_, gallery) = open_gallery(&temp_dir);
        assert!(gallery.is_empty());
        gallery
            .append_to_gallery(&EncodedImage::new("image/png", vec![1, 2, 3]))
            .expect("Failed to append");
        gallery
            .append_to_gallery(&EncodedImage::new("image/png", vec![4, 5, 6]))
            .expect("Failed to append");
    }

    let (_, reopened) = open_gallery(&temp_dir);
    let entries = reopened.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].data, vec![1, 2, 3]);
    assert_eq!(entries[1].data, vec![4, 5, 6]);
}

#[test]
fn test_same_image_twice_is_two_entries() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (store, gallery) = open_gallery(&temp_dir);
    let image = EncodedImage::new("image/png", vec![42]);

    gallery.append_to_gallery(&image).expect("Failed to append");
    gallery.append_to_gallery(&image).expect("Failed to append");

    assert_eq!(gallery.len(), 2);
    assert_eq!(store.count("selfies").expect("Failed to count"), 2);
}

#[test]
fn test_restore_does_not_grow_storage() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    {
        let (_, gallery) = open_gallery(&temp_dir);
        gallery
            .append_to_gallery(&EncodedImage::new("image/png", vec![1]))
            .expect("Failed to append");
    }

    for _ in 0..3 {
        let (store, gallery) = open_gallery(&temp_dir);
        assert_eq!(gallery.len(), 1);
        assert_eq!(store.count("selfies").expect("Failed to count"), 1);
    }
}

#[test]
fn test_lists_are_keyed() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let (store, gallery) = open_gallery(&temp_dir);

    gallery
        .append_to_gallery(&EncodedImage::new("image/png", vec![1]))
        .expect("Failed to append");
    store
        .append("archive", &EncodedImage::new("image/jpeg", vec![2]))
        .expect("Failed to append");

    assert_eq!(store.load("selfies").expect("Failed to load").len(), 1);
    let archive = store.load("archive").expect("Failed to load");
    assert_eq!(archive.len(), 1);
    assert_eq!(archive[0].mime_type, "image/jpeg");
}

#[test]
fn test_database_file_created_in_nested_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("data").join("cheese.db");

    let store = SqliteListStore::open(&db_path).expect("Failed to open store");
    assert!(db_path.exists());
    assert_eq!(store.path(), db_path.as_path());
}
