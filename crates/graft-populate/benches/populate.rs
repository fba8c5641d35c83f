use bson::{Document, doc};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use graft_db::{Database, PopulateOptions, Schema};
use graft_populate::{PathOptions, PopulateModelExt, PopulateQueryExt};
use graft_store::MemoryStore;

const AUTHORS: usize = 50;

fn seeded_db(posts: usize) -> Database<MemoryStore> {
    let db = Database::open(MemoryStore::new());
    db.create_collection(Schema::new("publishers"))
        .unwrap()
        .insert_many((0..5_i32).map(|i| doc! { "_id": i, "name": format!("pub-{i}") }).collect())
        .unwrap();
    db.create_collection(
        Schema::new("authors")
            .reference("publisher", PopulateOptions::reference_to("publishers")),
    )
    .unwrap()
    .insert_many(
        (0..AUTHORS as i32)
            .map(|i| doc! { "_id": i, "name": format!("author-{i}"), "publisher": i % 5 })
            .collect(),
    )
    .unwrap();
    db.create_collection(
        Schema::new("posts")
            .reference("author", PopulateOptions::reference_to("authors"))
            .reference(
                "comments",
                PopulateOptions::reference_to("comments").foreign_key("postId"),
            ),
    )
    .unwrap()
    .insert_many(
        (0..posts as i32)
            .map(|i| doc! { "_id": i, "title": format!("post-{i}"), "author": i % AUTHORS as i32 })
            .collect(),
    )
    .unwrap();
    db.create_collection(Schema::new("comments"))
        .unwrap()
        .insert_many(
            (0..(posts * 2) as i32)
                .map(|i| doc! { "_id": i, "postId": i / 2, "body": "ok" })
                .collect(),
        )
        .unwrap();
    db
}

fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate/paths");
    for n in [100, 1_000] {
        let db = seeded_db(n);
        let posts = db.model("posts").unwrap();
        let docs: Vec<Document> = posts.find(doc! {}).exec().unwrap();

        for paths in ["author", "author.publisher", "author comments"] {
            group.bench_with_input(BenchmarkId::new(paths, n), &n, |b, _| {
                b.iter_batched(
                    || docs.clone(),
                    |mut docs| {
                        posts.populate(&mut docs, paths, &PathOptions::new()).unwrap();
                        docs
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_hooked_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate/query");
    for n in [100, 1_000] {
        let db = seeded_db(n);
        let posts = db.model("posts").unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                posts
                    .find(doc! {})
                    .populate("author", PathOptions::new())
                    .exec()
                    .wait()
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_populate, bench_hooked_query);
criterion_main!(benches);
