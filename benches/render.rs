use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use mortar::core::from_row;
use mortar::mysql::{self, arg, f, lit, sm};
use mortar::{Context, build};
use rusqlite::Connection;
use std::hint::black_box;

fn report_query() -> mysql::SelectQuery {
    mysql::select((
        sm::columns([lit("u.id"), f("COUNT", ["o.id"]).r#as("orders")]),
        sm::from("users").r#as("u").use_index(["idx_users_email"]),
        sm::left_join("orders").r#as("o").on_eq("o.user_id", "u.id"),
        sm::r#where(lit("u.active").eq(arg([1]))),
        sm::r#where(lit("u.plan").in_([arg(["pro", "team", "enterprise"])])),
        sm::group_by("u.id"),
        sm::having(lit("COUNT(o.id)").gt(arg([5]))),
        sm::order_by("orders").desc(),
        sm::limit(arg([50])),
    ))
}

fn render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    group.bench_function("assemble", |b| b.iter(|| black_box(report_query())));

    let q = report_query();
    group.bench_function("build", |b| b.iter(|| black_box(build(&q).unwrap())));

    group.finish();
}

fn execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    let ctx = Context::background();

    group.bench_function("all", |b| {
        b.iter_batched(
            || {
                let conn = Connection::open_in_memory().unwrap();
                conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
                    .unwrap();
                for i in 0..100 {
                    conn.execute("INSERT INTO users (name) VALUES (?1)", [format!("User {i}")])
                        .unwrap();
                }
                conn
            },
            |conn| {
                let q = mysql::select((sm::columns(["id", "name"]), sm::from("users")));
                let rows = mortar::all(&ctx, &conn, &q, from_row::<(i64, String)>()).unwrap();
                black_box(rows);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, render, execute);
criterion_main!(benches);
