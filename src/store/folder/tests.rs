// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};
use serde_json::json;

use super::{FolderStore, WriteDurability};
use crate::model::DocumentId;
use crate::store::{Collection, Document, DocumentStore, Filter, StoreError, ID_FIELD};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("lessonmap-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new("folder-store")
}

fn document(value: serde_json::Value) -> Document {
    value.as_object().cloned().expect("object")
}

#[rstest]
#[case::best_effort(WriteDurability::BestEffort)]
#[case::durable(WriteDurability::Durable)]
#[tokio::test]
async fn documents_survive_reopen(temp_dir: TempDir, #[case] durability: WriteDurability) {
    let id = {
        let store = FolderStore::open(temp_dir.path(), durability).await.unwrap();
        store
            .insert(Collection::Lessons, document(json!({ "title": "Cells", "user_id": "u1" })))
            .await
            .unwrap()
    };

    let reopened = FolderStore::open(temp_dir.path(), durability).await.unwrap();
    let found = reopened
        .find_by_id(Collection::Lessons, &id)
        .await
        .unwrap()
        .expect("persisted");
    assert_eq!(found["title"], json!("Cells"));
    assert_eq!(found[ID_FIELD], json!(id.as_str()));
}

#[rstest]
#[tokio::test]
async fn each_collection_gets_its_own_file(temp_dir: TempDir) {
    let store = FolderStore::open(temp_dir.path(), WriteDurability::BestEffort).await.unwrap();
    store
        .insert(Collection::Users, document(json!({ "email": "a@b.c" })))
        .await
        .unwrap();
    store
        .insert(Collection::Contents, document(json!({ "title": "t", "text": "x" })))
        .await
        .unwrap();

    assert!(temp_dir.path().join("users.json").is_file());
    assert!(temp_dir.path().join("contents.json").is_file());
    assert!(!temp_dir.path().join("lessons.json").exists());

    let raw = std::fs::read_to_string(temp_dir.path().join("users.json")).unwrap();
    let parsed: Vec<Document> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0]["email"], json!("a@b.c"));
}

#[rstest]
#[tokio::test]
async fn no_temp_files_are_left_behind(temp_dir: TempDir) {
    let store = FolderStore::open(temp_dir.path(), WriteDurability::Durable).await.unwrap();
    for n in 0..3 {
        store
            .insert(Collection::Subtopics, document(json!({ "name": format!("s{n}") })))
            .await
            .unwrap();
    }

    let leftovers = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".lessonmap.tmp."))
        .count();
    assert_eq!(leftovers, 0);
}

#[rstest]
#[tokio::test]
async fn update_and_delete_are_persisted(temp_dir: TempDir) {
    let store = FolderStore::open(temp_dir.path(), WriteDurability::BestEffort).await.unwrap();
    let keep = store
        .insert(Collection::Subtopics, document(json!({ "lesson_id": "l1", "name": "A" })))
        .await
        .unwrap();
    let gone = store
        .insert(Collection::Subtopics, document(json!({ "lesson_id": "l2", "name": "B" })))
        .await
        .unwrap();

    assert!(store
        .update(Collection::Subtopics, &keep, document(json!({ "content_id": "c1" })))
        .await
        .unwrap());
    assert_eq!(
        store
            .delete_many(Collection::Subtopics, &Filter::new().eq("lesson_id", "l2"))
            .await
            .unwrap(),
        1
    );
    drop(store);

    let reopened = FolderStore::open(temp_dir.path(), WriteDurability::BestEffort).await.unwrap();
    let kept = reopened
        .find_by_id(Collection::Subtopics, &keep)
        .await
        .unwrap()
        .expect("kept");
    assert_eq!(kept["content_id"], json!("c1"));
    assert!(reopened.find_by_id(Collection::Subtopics, &gone).await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn misses_do_not_touch_the_disk(temp_dir: TempDir) {
    let store = FolderStore::open(temp_dir.path(), WriteDurability::BestEffort).await.unwrap();
    let missing = DocumentId::new("missing").unwrap();

    assert!(!store.delete(Collection::Lessons, &missing).await.unwrap());
    assert!(!store.update(Collection::Lessons, &missing, Document::new()).await.unwrap());
    assert_eq!(store.delete_many(Collection::Lessons, &Filter::new()).await.unwrap(), 0);
    assert!(!temp_dir.path().join("lessons.json").exists());
}

#[rstest]
#[tokio::test]
async fn corrupt_collection_file_is_reported(temp_dir: TempDir) {
    std::fs::write(temp_dir.path().join("lessons.json"), b"{ not json").unwrap();

    let err = FolderStore::open(temp_dir.path(), WriteDurability::BestEffort)
        .await
        .unwrap_err();
    match err {
        StoreError::Json { path, .. } => assert!(path.ends_with("lessons.json")),
        other => panic!("expected json error, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn open_creates_missing_root(temp_dir: TempDir) {
    let nested = temp_dir.path().join("nested").join("data");
    let store = FolderStore::open(&nested, WriteDurability::BestEffort).await.unwrap();
    assert_eq!(store.root(), nested.as_path());
    assert!(nested.is_dir());
}
