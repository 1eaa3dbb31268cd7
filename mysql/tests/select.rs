use mortar_core::expr::render;
use mortar_core::mods::Mod;
use mortar_core::{MortarError, build};
use mortar_mysql::{DIALECT, SelectQuery, arg, case, f, lit, placeholder, select, sm};

fn sql(q: &SelectQuery) -> String {
    build(q).unwrap().0
}

#[test]
fn test_from_alias_and_index_hint() {
    let q = select(sm::from("users").r#as("u").use_index(["idx_users_email"]));
    assert_eq!(sql(&q), "SELECT * FROM users AS u USE INDEX (idx_users_email)");
}

#[test]
fn test_index_hints_keep_attachment_order() {
    let q = select((
        sm::from("users")
            .r#as("u")
            .force_index_for_join(["idx_a"])
            .ignore_index(["idx_b"]),
        sm::use_index(["idx_c"]).for_order_by(),
    ));
    assert_eq!(
        sql(&q),
        "SELECT * FROM users AS u FORCE INDEX FOR JOIN (idx_a) IGNORE INDEX (idx_b) USE INDEX FOR ORDER BY (idx_c)"
    );
}

#[test]
fn test_partitions_and_lateral_order() {
    let q = select((
        sm::from("events").partition(["p2024"]).r#as("e"),
        sm::partition(["p2025"]),
    ));
    assert_eq!(sql(&q), "SELECT * FROM events PARTITION (p2024, p2025) AS e");
}

#[test]
fn test_last_from_wins_and_hints_accumulate() {
    let q = select((
        sm::from("a").r#as("x").use_index(["idx_a"]),
        sm::from("b").r#as("y").ignore_index(["idx_b"]),
    ));
    assert_eq!(
        sql(&q),
        "SELECT * FROM b AS y USE INDEX (idx_a) IGNORE INDEX (idx_b)"
    );

    let q = select((sm::from("a"), sm::from("b")));
    assert_eq!(sql(&q), "SELECT * FROM b");
}

#[test]
fn test_inner_join_on_eq() {
    let q = select((
        sm::from("users").r#as("u"),
        sm::inner_join("orders").on_eq("u.id", "orders.user_id"),
    ));
    assert_eq!(
        sql(&q),
        "SELECT * FROM users AS u INNER JOIN orders ON u.id = orders.user_id"
    );
}

#[test]
fn test_join_variants() {
    let q = select((
        sm::from("a"),
        sm::left_join("b").r#as("bb").using(["id"]),
        sm::straight_join("c").on("c.x = a.x").on("c.y > 0"),
        sm::cross_join("d").natural(),
    ));
    assert_eq!(
        sql(&q),
        "SELECT * FROM a LEFT JOIN b AS bb USING (id) STRAIGHT_JOIN c ON c.x = a.x AND c.y > 0 NATURAL CROSS JOIN d"
    );
}

#[test]
fn test_order_by_collate_desc() {
    let q = select((sm::from("t"), sm::order_by("name").desc().collate("binary")));
    assert_eq!(sql(&q), "SELECT * FROM t ORDER BY name COLLATE binary DESC");
}

#[test]
fn test_with_cte() {
    let inner = select((sm::columns(["id"]), sm::from("users"), sm::r#where("active = 1")));
    let q = select((sm::with("t").r#as(inner), sm::from("t")));
    assert_eq!(
        sql(&q),
        "WITH t AS (SELECT id FROM users WHERE active = 1) SELECT * FROM t"
    );
}

#[test]
fn test_recursive_cte_with_columns() {
    let seed = select(sm::columns(["1"]));
    let q = select((
        sm::recursive(true),
        sm::with("n").columns(["x"]).r#as(seed),
        sm::from("n"),
    ));
    assert_eq!(
        sql(&q),
        "WITH RECURSIVE n(x) AS (SELECT 1) SELECT * FROM n"
    );
}

#[test]
fn test_cte_without_query_is_rejected() {
    let q = select((sm::with("cte"), sm::from("cte")));
    assert!(matches!(build(&q), Err(MortarError::Render(_))));
}

#[test]
fn test_args_bind_in_declared_order() {
    let q = select((
        sm::from("t"),
        sm::r#where(lit("a").in_([arg(["a", "b", "c"])])),
    ));
    let (text, params) = build(&q).unwrap();
    assert_eq!(text, "SELECT * FROM t WHERE a IN (?, ?, ?)");
    let bound: Vec<String> = params
        .iter()
        .filter_map(|p| p.value.as_ref().map(ToString::to_string))
        .collect();
    assert_eq!(bound, vec!["'a'", "'b'", "'c'"]);
}

#[test]
fn test_placeholders_are_unbound() {
    let q = select((sm::from("t"), sm::r#where(lit("id").eq(placeholder(1)))));
    let (_, params) = build(&q).unwrap();
    assert_eq!(params.len(), 1);
    assert!(!params[0].is_bound());
}

#[test]
fn test_case_expression() {
    let e = case()
        .when("c1", "t1")
        .when("c2", "t2")
        .r#else("e");
    assert_eq!(
        render(&e, DIALECT, 1).unwrap().0,
        "CASE WHEN c1 THEN t1 WHEN c2 THEN t2 ELSE e END"
    );
}

// =============================================================================
// Chains and mods
// =============================================================================

#[test]
fn test_chain_is_a_reusable_template() {
    let base = sm::inner_join("orders").r#as("o");
    let by_user = base.on_eq("o.user_id", "u.id");
    let by_org = base.on_eq("o.org_id", "u.org_id");

    let q1 = select((sm::from("users").r#as("u"), by_user));
    let q2 = select((sm::from("users").r#as("u"), by_org));
    let q3 = select((sm::from("users").r#as("u"), base));

    assert!(sql(&q1).ends_with("INNER JOIN orders AS o ON o.user_id = u.id"));
    assert!(sql(&q2).ends_with("INNER JOIN orders AS o ON o.org_id = u.org_id"));
    assert!(sql(&q3).ends_with("INNER JOIN orders AS o"));
}

#[test]
fn test_applying_a_mod_twice_accumulates() {
    let join = sm::left_join("tags").using(["post_id"]);
    let order = sm::order_by("id");
    let mut q = select(sm::from("posts"));
    for _ in 0..2 {
        join.apply(&mut q);
        order.apply(&mut q);
    }
    assert_eq!(
        sql(&q),
        "SELECT * FROM posts LEFT JOIN tags USING (post_id) LEFT JOIN tags USING (post_id) ORDER BY id, id"
    );
}

#[test]
fn test_render_is_repeatable() {
    let q = select((
        sm::from("t"),
        sm::r#where(lit("a").eq(arg([1]))),
        sm::limit(arg([10])),
    ));
    assert_eq!(build(&q).unwrap(), build(&q).unwrap());
}

// =============================================================================
// Windows and locks
// =============================================================================

#[test]
fn test_named_window_and_over() {
    let q = select((
        sm::columns([f("ROW_NUMBER", Vec::<&str>::new()).over_named("w").r#as("rn")]),
        sm::from("emp"),
        sm::window("w")
            .partition_by("dept")
            .order_by("salary")
            .rows()
            .from_unbounded_preceding()
            .to_current_row(),
    ));
    assert_eq!(
        sql(&q),
        "SELECT ROW_NUMBER() OVER w AS rn FROM emp WINDOW w AS (PARTITION BY dept ORDER BY salary ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)"
    );
}

#[test]
fn test_window_boundary_without_mode_is_rejected() {
    let q = select((
        sm::from("emp"),
        sm::window("w").from_preceding(1).to_following(1),
    ));
    assert!(matches!(build(&q), Err(MortarError::Render(_))));
}

#[test]
fn test_lock_last_wait_policy_wins() {
    let q = select((
        sm::from("jobs"),
        sm::for_share(Vec::<&str>::new()).skip_locked().nowait(),
    ));
    assert_eq!(sql(&q), "SELECT * FROM jobs FOR SHARE NOWAIT");
}

#[test]
fn test_distinct_group_having() {
    let q = select((
        sm::distinct(),
        sm::columns(["dept"]),
        sm::from("emp"),
        sm::group_by("dept"),
        sm::having(lit("COUNT(*)").gt(arg([3]))),
        sm::offset(5),
        sm::limit(5),
    ));
    assert_eq!(
        sql(&q),
        "SELECT DISTINCT dept FROM emp GROUP BY dept HAVING COUNT(*) > ? LIMIT 5 OFFSET 5"
    );
}

#[test]
fn test_subquery_in_from() {
    let inner = select((sm::columns(["id"]), sm::from("users")));
    let q = select(sm::from(sm::subquery(inner)).r#as("x"));
    assert_eq!(sql(&q), "SELECT * FROM (SELECT id FROM users) AS x");
}
