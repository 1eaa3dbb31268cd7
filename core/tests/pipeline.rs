use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use compact_str::CompactString;
use mortar_core::exec::{self, prepare, prepare_query};
use mortar_core::hook::{AfterQuery, Collection, Hookable, hook_fn};
use mortar_core::load::{loader_fn, typed_loader};
use mortar_core::mods::{AddHook, AddLoader, AddMapperMod};
use mortar_core::scan::{FromRow, from_row, single};
use mortar_core::{
    Context, Dialect, ExecResult, Executor, HookStage, MapperMod, MortarError, Preparer, QueryType,
    Result, Row, Rows, Statement, Value, VecRows, raw_query,
};

// =============================================================================
// Scripted executor
// =============================================================================

#[derive(Default)]
struct Mock {
    columns: Vec<&'static str>,
    rows: Vec<Vec<Value>>,
    log: RefCell<Vec<String>>,
}

impl Mock {
    fn users() -> Self {
        Self {
            columns: vec!["id", "name"],
            rows: vec![
                vec![Value::Integer(1), Value::from("ada")],
                vec![Value::Integer(2), Value::from("grace")],
            ],
            log: RefCell::default(),
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn record(&self, op: &str, sql: &str, args: &[Value]) {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        self.log
            .borrow_mut()
            .push(format!("{op} {sql} [{}]", args.join(", ")));
    }

    fn rows(&self) -> VecRows {
        VecRows::new(self.columns.iter().copied(), self.rows.clone())
    }
}

impl Executor for Mock {
    fn exec(&self, _: &Context, sql: &str, args: &[Value]) -> Result<ExecResult> {
        self.record("exec", sql, args);
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    fn query(&self, _: &Context, sql: &str, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        self.record("query", sql, args);
        Ok(Box::new(self.rows()))
    }
}

struct MockStmt<'m> {
    mock: &'m Mock,
    sql: String,
}

impl Statement for MockStmt<'_> {
    fn exec(&self, ctx: &Context, args: &[Value]) -> Result<ExecResult> {
        Executor::exec(self.mock, ctx, &self.sql, args)
    }

    fn query(&self, ctx: &Context, args: &[Value]) -> Result<Box<dyn Rows + '_>> {
        Executor::query(self.mock, ctx, &self.sql, args)
    }
}

impl Preparer for Mock {
    type Prepared<'s> = MockStmt<'s>;

    fn prepare<'s>(&'s self, _: &Context, sql: &str) -> Result<MockStmt<'s>> {
        self.record("prepare", sql, &[]);
        Ok(MockStmt {
            mock: self,
            sql: sql.to_string(),
        })
    }
}

// =============================================================================
// Result types
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: i64,
    name: String,
    orders: i64,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(User {
            id: row.get("id")?,
            name: row.get("name")?,
            orders: 0,
        })
    }
}

fn require_orders(u: &mut User, _: &Context, _: &dyn Executor, qt: QueryType) -> Result<()> {
    if u.orders == 0 {
        return Err(MortarError::Other(format!("{} has no orders loaded", u.name)));
    }
    assert_eq!(qt, QueryType::Select);
    Ok(())
}

impl Hookable for User {
    const AFTER_QUERY: AfterQuery<Self> = AfterQuery::Hook(require_orders);
}

/// A collection with its own hook, which replaces the per-element hook.
#[derive(Debug)]
struct Roster {
    users: Vec<User>,
    checked: bool,
}

fn check_roster(r: &mut Roster, _: &Context, _: &dyn Executor, _: QueryType) -> Result<()> {
    r.checked = true;
    Ok(())
}

impl Hookable for Roster {
    const AFTER_QUERY: AfterQuery<Self> = AfterQuery::Hook(check_roster);
}

impl Collection<User> for Roster {
    fn from_vec(users: Vec<User>) -> Self {
        Roster {
            users,
            checked: false,
        }
    }

    fn items_mut(&mut self) -> &mut [User] {
        &mut self.users
    }
}

fn load_orders() -> AddLoader {
    AddLoader::new(typed_loader(|_: &Context, _: &dyn Executor, users: &mut [User]| {
        for u in users {
            u.orders = u.id * 10;
        }
        Ok(())
    }))
}

fn select_users() -> mortar_core::RawQuery {
    raw_query(Dialect::SQLite, "SELECT id, name FROM users", Vec::<Value>::new())
        .with_query_type(QueryType::Select)
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_hook_sees_loaded_state_for_one() {
    let mock = Mock::users();
    let ctx = Context::background();
    let q = select_users().apply(load_orders());

    let stmt = prepare_query(&ctx, &mock, &q, from_row::<User>()).unwrap();
    let user = stmt.one(&ctx, &[]).unwrap();
    assert_eq!(user.orders, 10);
}

#[test]
fn test_hook_without_loader_fails_with_value() {
    let mock = Mock::users();
    let ctx = Context::background();
    let q = select_users();

    let err = exec::one(&ctx, &mock, &q, from_row::<User>()).unwrap_err();
    assert!(matches!(
        err.error,
        MortarError::Hook {
            stage: HookStage::AfterQuery,
            ..
        }
    ));
    assert_eq!(err.value.map(|u| u.id), Some(1));
}

#[test]
fn test_all_runs_element_hooks_for_every_element() {
    // Hook capability is fixed per type, so either every element runs its
    // hook or none does; a collection can never be mixed.
    let mock = Mock::users();
    let ctx = Context::background();
    let q = select_users().apply(load_orders());

    let users = exec::all(&ctx, &mock, &q, from_row::<User>()).unwrap();
    assert_eq!(
        users.iter().map(|u| u.orders).collect::<Vec<_>>(),
        vec![10, 20]
    );
}

#[test]
fn test_collection_hook_replaces_element_hooks() {
    let mock = Mock::users();
    let ctx = Context::background();
    let q = select_users();

    // No loader fills `orders`, so element hooks would fail if they ran.
    let stmt = prepare_query(&ctx, &mock, &q, from_row::<User>())
        .unwrap()
        .collect_into::<Roster>();
    let roster = stmt.all(&ctx, &[]).unwrap();
    assert!(roster.checked);
    assert_eq!(roster.users.len(), 2);
}

#[test]
fn test_typed_loader_fills_custom_collection() {
    let mock = Mock::users();
    let ctx = Context::background();
    let q = select_users().apply(load_orders());

    let stmt = prepare_query(&ctx, &mock, &q, from_row::<User>())
        .unwrap()
        .collect_into::<Roster>();
    let roster = stmt.all(&ctx, &[]).unwrap();
    assert!(roster.checked);
    assert_eq!(
        roster.users.iter().map(|u| u.orders).collect::<Vec<_>>(),
        vec![10, 20]
    );
}

#[test]
fn test_loaders_run_once_for_all() {
    let mock = Mock::users();
    let ctx = Context::background();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let q = select_users().apply(AddLoader::new(typed_loader(
        move |_: &Context, _: &dyn Executor, items: &mut [(i64, String)]| {
            assert_eq!(items.len(), 2);
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    )));

    let rows = exec::all(&ctx, &mock, &q, from_row::<(i64, String)>()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Loader failures
// =============================================================================

fn counting(counter: &Arc<AtomicUsize>, fail: bool) -> AddLoader {
    let counter = Arc::clone(counter);
    AddLoader::new(loader_fn(move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        if fail {
            return Err(MortarError::Other("boom".into()));
        }
        Ok(())
    }))
}

#[test]
fn test_second_loader_failure_stops_the_third() {
    let mock = Mock::users();
    let ctx = Context::background();
    let (first, second, third) = (
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
    );
    let q = select_users().apply((
        counting(&first, false),
        counting(&second, true),
        counting(&third, false),
    ));

    let err = exec::all(&ctx, &mock, &q, from_row::<(i64, String)>()).unwrap_err();
    assert!(matches!(err.error, MortarError::Loader { index: 2, .. }));
    assert_eq!(err.value.map(|v| v.len()), Some(2));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(third.load(Ordering::SeqCst), 0);
}

#[test]
fn test_exec_runs_loaders_with_nothing_retrieved() {
    let mock = Mock::users();
    let ctx = Context::background();
    let saw_none = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&saw_none);
    let q = raw_query(Dialect::SQLite, "DELETE FROM users", Vec::<Value>::new())
        .apply(AddLoader::new(loader_fn(move |_, _, retrieved| {
            if retrieved.is_none() {
                flag.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        })))
        .apply(load_orders());

    let stmt = prepare(&ctx, &mock, &q).unwrap();
    let res = stmt.exec(&ctx, &[]).unwrap();
    assert_eq!(res.rows_affected, 1);
    assert_eq!(saw_none.load(Ordering::SeqCst), 1);
}

#[test]
fn test_exec_loader_failure_discards_result() {
    let mock = Mock::users();
    let ctx = Context::background();
    let counter = Arc::new(AtomicUsize::new(0));
    let q = raw_query(Dialect::SQLite, "DELETE FROM users", Vec::<Value>::new())
        .apply(counting(&counter, true));

    let err = exec::exec(&ctx, &mock, &q).unwrap_err();
    assert!(matches!(err, MortarError::Loader { index: 1, .. }));
}

// =============================================================================
// Arguments
// =============================================================================

#[test]
fn test_argument_count_is_checked() {
    let mock = Mock::users();
    let ctx = Context::background();
    let q = raw_query(Dialect::SQLite, "SELECT ?, ?, ?", ["a", "b", "c"]);

    let stmt = prepare(&ctx, &mock, &q).unwrap();
    assert_eq!(stmt.len_args(), 3);

    let err = stmt
        .exec(&ctx, &[Value::from("a"), Value::from("b")])
        .unwrap_err();
    assert!(matches!(
        err,
        MortarError::ArgumentCount {
            expected: 3,
            got: 2
        }
    ));

    stmt.exec(&ctx, &stmt.bound_args().unwrap()).unwrap();
    assert_eq!(
        mock.log(),
        vec![
            "prepare SELECT ?, ?, ? []".to_string(),
            "exec SELECT ?, ?, ? ['a', 'b', 'c']".to_string(),
        ]
    );
}

#[test]
fn test_direct_exec_rejects_unbound_placeholder() {
    use mortar_core::expr::{self, Expression};

    #[derive(Debug)]
    struct Lookup(mortar_core::Expr);

    impl Expression for Lookup {
        fn write_sql(
            &self,
            w: &mut String,
            d: Dialect,
            start: usize,
        ) -> Result<mortar_core::Params> {
            self.0.write_sql(w, d, start)
        }
    }

    impl mortar_core::Query for Lookup {
        fn dialect(&self) -> Dialect {
            Dialect::SQLite
        }
    }

    let mock = Mock::users();
    let ctx = Context::background();
    let q = Lookup(expr::group([expr::placeholder(2)]));
    let err = exec::exec(&ctx, &mock, &q).unwrap_err();
    assert!(matches!(err, MortarError::UnboundParameter { index: 1 }));
    assert!(mock.log().is_empty());

    // The same query prepares fine; its values come with each execution.
    let stmt = prepare(&ctx, &mock, &q).unwrap();
    stmt.exec(&ctx, &[Value::Integer(1), Value::Integer(2)]).unwrap();
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn test_cancelled_context_stops_prepare() {
    let mock = Mock::users();
    let (ctx, cancel) = Context::background().with_cancel();
    cancel.cancel();
    let err = prepare(&ctx, &mock, &select_users()).unwrap_err();
    assert!(matches!(err, MortarError::Cancelled));
    assert!(mock.log().is_empty());
}

#[test]
fn test_cancellation_between_loaders_is_not_wrapped() {
    let mock = Mock::users();
    let (ctx, cancel) = Context::background().with_cancel();
    let cancel = Arc::new(cancel);
    let trigger = Arc::clone(&cancel);
    let after = Arc::new(AtomicUsize::new(0));
    let q = select_users()
        .apply(AddLoader::new(loader_fn(move |_, _, _| {
            trigger.cancel();
            Ok(())
        })))
        .apply(counting(&after, false));

    let err = exec::all(&ctx, &mock, &q, from_row::<(i64, String)>()).unwrap_err();
    assert!(matches!(err.error, MortarError::Cancelled));
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[test]
fn test_query_hooks_enrich_context_for_loaders() {
    let mock = Mock::users();
    let q = select_users()
        .apply(AddHook::new(hook_fn(|ctx: Context, _: &dyn Executor| {
            Ok(ctx.with_value("tenant", 7_i64))
        })))
        .apply(AddLoader::new(loader_fn(|ctx: &Context, _, _| {
            match ctx.value::<i64>("tenant") {
                Some(7) => Ok(()),
                _ => Err(MortarError::Other("tenant missing".into())),
            }
        })));

    let names = exec::all(&Context::background(), &mock, &q, mapper_name()).unwrap();
    assert_eq!(names, vec!["ada".to_string(), "grace".to_string()]);
}

fn mapper_name() -> impl mortar_core::Mapper<String> {
    mortar_core::scan::mapper_fn(|row: &Row| row.get::<String>("name"))
}

#[test]
fn test_failing_query_hook_aborts_before_prepare() {
    let mock = Mock::users();
    let q = select_users().apply(AddHook::new(hook_fn(|_: Context, _: &dyn Executor| {
        Err(MortarError::Other("denied".into()))
    })));
    let err = prepare(&Context::background(), &mock, &q).unwrap_err();
    assert!(matches!(
        err,
        MortarError::Hook {
            stage: HookStage::BeforeQuery,
            ..
        }
    ));
    assert!(mock.log().is_empty());
}

// =============================================================================
// Cursors and mapper mods
// =============================================================================

#[test]
fn test_cursor_runs_loaders_per_item() {
    let mock = Mock::users();
    let ctx = Context::background();
    let q = select_users().apply(load_orders());
    let stmt = prepare_query(&ctx, &mock, &q, from_row::<User>()).unwrap();

    let mut cursor = stmt.cursor(&ctx, &[]).unwrap();
    assert_eq!(cursor.next().map(|r| r.map(|u| u.orders).ok()), Some(Some(10)));
    assert_eq!(cursor.next().map(|r| r.map(|u| u.orders).ok()), Some(Some(20)));
    assert!(cursor.next().is_none());
}

#[test]
fn test_cursor_stops_after_error() {
    let mock = Mock::users();
    let ctx = Context::background();
    let q = select_users();

    let mut cursor = exec::cursor(&ctx, &mock, &q, from_row::<User>()).unwrap();
    assert!(matches!(cursor.next(), Some(Err(MortarError::Hook { .. }))));
    assert!(cursor.next().is_none());
}

struct CountRows(AtomicUsize);

impl MapperMod for CountRows {
    fn row(&self, _: &Row) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn before(&self, _: &Context, columns: &[CompactString]) -> Result<()> {
        if columns.len() == 1 {
            Ok(())
        } else {
            Err(MortarError::Mapping("expected one column".into()))
        }
    }
}

#[test]
fn test_mapper_mods_wrap_the_mapper() {
    let mock = Mock {
        columns: vec!["n"],
        rows: vec![vec![Value::Integer(4)], vec![Value::Integer(5)]],
        log: RefCell::default(),
    };
    let counter = Arc::new(CountRows(AtomicUsize::new(0)));
    let q = raw_query(Dialect::SQLite, "SELECT n FROM t", Vec::<Value>::new())
        .apply(AddMapperMod(counter.clone()));

    let ctx = Context::background();
    let out = exec::all(&ctx, &mock, &q, single::<i64>()).unwrap();
    assert_eq!(out, vec![4, 5]);
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);
}
