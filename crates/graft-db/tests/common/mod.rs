use bson::doc;
use graft_db::{Database, PopulateOptions, Schema};
use graft_store::MemoryStore;

pub const AUTHORS: &str = "authors";
pub const POSTS: &str = "posts";

pub fn temp_db() -> Database<MemoryStore> {
    Database::open(MemoryStore::new())
}

/// Register authors + posts and insert a small seed set.
pub fn seed_records(db: &Database<MemoryStore>) {
    db.create_collection(Schema::new(AUTHORS).field("name").field("country"))
        .unwrap()
        .insert_many(vec![
            doc! { "_id": 10_i32, "name": "Ada", "country": "uk", "active": true },
            doc! { "_id": 20_i32, "name": "Grace", "country": "us", "active": true },
            doc! { "_id": 30_i32, "name": "Edsger", "country": "nl", "active": false },
        ])
        .unwrap();

    db.create_collection(
        Schema::new(POSTS)
            .field("title")
            .reference("authorId", PopulateOptions::reference_to(AUTHORS)),
    )
    .unwrap()
    .insert_many(vec![
        doc! { "_id": 1_i32, "title": "Engines", "authorId": 10_i32,
               "meta": { "views": 120_i32 } },
        doc! { "_id": 2_i32, "title": "Compilers", "authorId": 20_i32,
               "meta": { "views": 80_i32 } },
        doc! { "_id": 3_i32, "title": "Notes", "authorId": 10_i32,
               "meta": { "views": 5_i32 } },
    ])
    .unwrap();
}
