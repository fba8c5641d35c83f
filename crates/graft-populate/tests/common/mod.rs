#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use bson::{Document, doc};
use graft_db::{Database, PopulateOptions, Schema};
use graft_store::{DocumentIter, MemoryStore, Store, StoreError};

pub const POSTS: &str = "posts";
pub const AUTHORS: &str = "authors";
pub const PUBLISHERS: &str = "publishers";
pub const COMMENTS: &str = "comments";

/// Memory store that records every scan and can be told to fail scans of
/// chosen collections.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    scans: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn scans(&self) -> Vec<String> {
        self.scans.lock().unwrap().clone()
    }

    pub fn scans_of(&self, collection: &str) -> usize {
        self.scans().iter().filter(|c| *c == collection).count()
    }

    pub fn reset(&self) {
        self.scans.lock().unwrap().clear();
    }

    pub fn fail_scans_of(&self, collection: &str) {
        self.failing.lock().unwrap().insert(collection.to_string());
    }
}

impl Store for RecordingStore {
    fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        self.inner.create_collection(name)
    }

    fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.inner.drop_collection(name)
    }

    fn insert(&self, collection: &str, docs: Vec<Document>) -> Result<(), StoreError> {
        self.inner.insert(collection, docs)
    }

    fn scan(&self, collection: &str) -> Result<DocumentIter<'_>, StoreError> {
        self.scans.lock().unwrap().push(collection.to_string());
        if self.failing.lock().unwrap().contains(collection) {
            return Err(StoreError::Storage(format!("scan of {collection} refused")));
        }
        self.inner.scan(collection)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Blog fixture:
/// - posts reference their author through `author` (local key, singular)
/// - posts own comments through `comments.postId` (foreign key, list)
/// - authors reference a publisher through `publisher`
pub fn blog_db() -> Database<RecordingStore> {
    init_tracing();
    let db = Database::open(RecordingStore::default());

    db.create_collection(Schema::new(PUBLISHERS).field("name"))
        .unwrap()
        .insert_many(vec![
            doc! { "_id": "acm", "name": "ACM" },
            doc! { "_id": "ieee", "name": "IEEE" },
        ])
        .unwrap();

    db.create_collection(
        Schema::new(AUTHORS)
            .field("name")
            .reference("publisher", PopulateOptions::reference_to(PUBLISHERS)),
    )
    .unwrap()
    .insert_many(vec![
        doc! { "_id": 10_i32, "name": "Ada", "active": true, "publisher": "acm" },
        doc! { "_id": 20_i32, "name": "Grace", "active": true, "publisher": "ieee" },
        doc! { "_id": 30_i32, "name": "Edsger", "active": false, "publisher": "acm" },
    ])
    .unwrap();

    db.create_collection(
        Schema::new(POSTS)
            .field("title")
            .reference("author", PopulateOptions::reference_to(AUTHORS))
            .reference(
                "comments",
                PopulateOptions::reference_to(COMMENTS).foreign_key("postId"),
            ),
    )
    .unwrap()
    .insert_many(vec![
        doc! { "_id": 1_i32, "title": "Engines", "author": 10_i32 },
        doc! { "_id": 2_i32, "title": "Compilers", "author": 20_i32 },
        doc! { "_id": 3_i32, "title": "Notes", "author": 10_i32 },
        doc! { "_id": 4_i32, "title": "Drafts", "author": 99_i32 },
    ])
    .unwrap();

    db.create_collection(Schema::new(COMMENTS).field("body"))
        .unwrap()
        .insert_many(vec![
            doc! { "_id": 100_i32, "postId": 1_i32, "body": "first", "hidden": false },
            doc! { "_id": 101_i32, "postId": 1_i32, "body": "second", "hidden": true },
            doc! { "_id": 102_i32, "postId": 2_i32, "body": "third", "hidden": false },
        ])
        .unwrap();

    db.store().reset();
    db
}

pub fn ids(docs: &[Document]) -> Vec<i32> {
    docs.iter().map(|d| d.get_i32("_id").unwrap()).collect()
}
