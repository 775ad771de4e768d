//! End-to-end coverage of routing, rewriting, splitting, fan-out, and
//! merging against an in-memory `DataSource` stub, exercising the full
//! parser → router → rewrite → splitter → executor → merger pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sharddb::executor::{Aggregated, DataSource, ExecContext, ExecOutcome, Executor};
use sharddb::merger::{self, AggregateKind, AggregateSpec, MergeDescriptor, OrderKey, Row};
use sharddb::parser::{extract_literal_bindings, KeywordParser, Parser};
use sharddb::rewrite::{rewrite, RewriteContext};
use sharddb::router::Router;
use sharddb::sharding::Registry;
use sharddb::splitter::{SplitContext, Splitter};
use sharddb::value::RawValue;
use sharddb_config::Config;

fn mod_sharded_config() -> Arc<Config> {
    let toml = r#"
    default_group = "main"

    [data_sources.ds_0]
    name = "ds_0"
    driver = "postgres"
    url = "postgres://ds0"

    [data_sources.m]
    name = "m"
    driver = "postgres"
    url = "postgres://m"

    [data_sources.s1]
    name = "s1"
    driver = "postgres"
    url = "postgres://s1"

    [data_sources.s2]
    name = "s2"
    driver = "postgres"
    url = "postgres://s2"

    [read_write_groups.main]
    name = "main"
    primary = "m"
    replicas = ["s1", "s2"]
    lb_algo = "round_robin"

    [sharding_rule.tables.t_order]
    actual_data_nodes = "ds_0.t_order_${0..3}"

    [sharding_rule.tables.t_order.tbl_strategy]
    column = "order_id"
    algo = "mod"
    properties = { "sharding-count" = "4" }
    "#;
    Arc::new(Config::from_toml_str(toml).unwrap())
}

struct EchoSource;

#[async_trait]
impl DataSource for EchoSource {
    async fn execute(&self, sql: &str, _parameters: &[RawValue]) -> Result<ExecOutcome, String> {
        Ok(ExecOutcome::Rows(vec![vec![RawValue::Str(sql.to_string())]]))
    }
}

#[test]
fn test_mod_routing_end_to_end() {
    let config = mod_sharded_config();
    let registry = Registry::new();
    let router = Router::new(config, &registry).unwrap();

    let sql = "SELECT * FROM t_order WHERE order_id = 123";
    let descriptor = KeywordParser::new().parse(sql).unwrap();
    let bindings = extract_literal_bindings(sql);

    let routes = router
        .route(&descriptor.referenced_tables[0], &bindings, None)
        .unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].data_source, "ds_0");
    assert_eq!(routes[0].physical_table, "t_order_3");

    let ctx = RewriteContext {
        original_sql: sql,
        logical_tables: &descriptor.referenced_tables,
        routes: &routes,
        parameters: &[],
    };
    let rewrites = rewrite(&ctx).unwrap();
    assert_eq!(rewrites.len(), 1);
    assert_eq!(
        rewrites[0].sql,
        "SELECT * FROM t_order_3 WHERE order_id = 123"
    );
}

#[test]
fn test_inline_cartesian_routing() {
    let toml = r#"
    [data_sources.ds_0]
    name = "ds_0"
    driver = "postgres"
    url = "postgres://ds0"

    [data_sources.ds_1]
    name = "ds_1"
    driver = "postgres"
    url = "postgres://ds1"

    [sharding_rule.tables.t_order2]
    actual_data_nodes = "ds_${0..1}.t_order2_${0..1}"

    [sharding_rule.tables.t_order2.db_strategy]
    column = "user_id"
    algo = "inline"
    properties = { "algorithm-expression" = "ds_${value % 2}" }

    [sharding_rule.tables.t_order2.tbl_strategy]
    column = "order_id"
    algo = "inline"
    properties = { "algorithm-expression" = "t_order2_${value % 2}" }
    "#;
    let config = Arc::new(Config::from_toml_str(toml).unwrap());
    let registry = Registry::new();
    let router = Router::new(config, &registry).unwrap();

    let mut bindings = sharddb::router::BindingMap::new();
    bindings.insert(
        "user_id".into(),
        sharddb::router::Binding::Single(RawValue::I64(5)),
    );
    bindings.insert(
        "order_id".into(),
        sharddb::router::Binding::Single(RawValue::I64(4)),
    );

    let routes = router.route("t_order2", &bindings, None).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].data_source, "ds_1");
    assert_eq!(routes[0].physical_table, "t_order2_0");
}

#[test]
fn test_in_list_fan_out_rewrite() {
    let config = mod_sharded_config();
    let registry = Registry::new();
    let router = Router::new(config, &registry).unwrap();

    let sql = "SELECT * FROM t_order WHERE order_id IN (1,2,5,9)";
    let descriptor = KeywordParser::new().parse(sql).unwrap();
    let bindings = extract_literal_bindings(sql);

    let mut routes = router
        .route(&descriptor.referenced_tables[0], &bindings, None)
        .unwrap();
    routes.sort_by(|a, b| a.physical_table.cmp(&b.physical_table));
    assert_eq!(routes.len(), 2);

    let ctx = RewriteContext {
        original_sql: sql,
        logical_tables: &descriptor.referenced_tables,
        routes: &routes,
        parameters: &[],
    };
    let rewrites = rewrite(&ctx).unwrap();
    assert_eq!(rewrites.len(), 2);
}

#[test]
fn test_force_primary_routes_to_primary() {
    let config = mod_sharded_config();
    let splitter = Splitter::new(config);
    let ctx = SplitContext {
        force_primary: true,
        in_transaction: false,
    };
    let target = splitter.route("main", "SELECT * FROM users", &ctx).unwrap();
    assert_eq!(target, "m");
}

#[test]
fn test_hint_master_route_only_routes_to_primary() {
    let config = mod_sharded_config();
    let mut manager = sharddb::hint::HintManager::new();
    manager.set_master_route_only(true);
    let hint = manager.take();

    let splitter = Splitter::new(config);
    let ctx = SplitContext::from(&hint);
    let target = splitter.route("main", "SELECT * FROM users", &ctx).unwrap();
    assert_eq!(target, "m");
}

#[test]
fn test_unrouted_statement_uses_default_group() {
    let config = mod_sharded_config();
    let sql = "SELECT 1";
    let descriptor = KeywordParser::new().parse(sql).unwrap();
    assert!(descriptor.referenced_tables.is_empty());

    let splitter = Splitter::new(config.clone());
    let group = config.default_group.as_ref().unwrap();
    let target = splitter
        .route(group, sql, &SplitContext::default())
        .unwrap();
    assert!(["m", "s1", "s2"].contains(&target.as_str()));
}

#[test]
fn test_cross_shard_merge() {
    let a: Vec<Row> = vec![
        vec![RawValue::I64(3), RawValue::Str("A".into())],
        vec![RawValue::I64(1), RawValue::Str("C".into())],
    ];
    let b: Vec<Row> = vec![
        vec![RawValue::I64(2), RawValue::Str("B".into())],
        vec![RawValue::I64(4), RawValue::Str("D".into())],
    ];

    let descriptor = MergeDescriptor {
        columns: vec!["col0".into(), "col1".into()],
        order_by: vec![OrderKey {
            column: 0,
            desc: false,
        }],
        limit: Some((1, 2)),
        ..Default::default()
    };

    let merged = merger::merge(&descriptor, &[a, b]).unwrap();
    assert_eq!(
        merged,
        vec![
            vec![RawValue::I64(2), RawValue::Str("B".into())],
            vec![RawValue::I64(3), RawValue::Str("A".into())],
        ]
    );
}

#[tokio::test]
async fn test_fan_out_execution_against_stub_backend() {
    let config = mod_sharded_config();
    let registry = Registry::new();
    let router = Router::new(config, &registry).unwrap();

    let sql = "SELECT * FROM t_order WHERE order_id IN (1,2,5,9)";
    let descriptor = KeywordParser::new().parse(sql).unwrap();
    let bindings = extract_literal_bindings(sql);
    let mut routes = router
        .route(&descriptor.referenced_tables[0], &bindings, None)
        .unwrap();
    routes.sort_by(|a, b| a.physical_table.cmp(&b.physical_table));

    let ctx = RewriteContext {
        original_sql: sql,
        logical_tables: &descriptor.referenced_tables,
        routes: &routes,
        parameters: &[],
    };
    let rewrites = rewrite(&ctx).unwrap();

    let mut backends: HashMap<String, Arc<dyn DataSource>> = HashMap::new();
    backends.insert("ds_0".into(), Arc::new(EchoSource));
    let executor = Executor::new(backends);

    let result = executor
        .dispatch(&rewrites, &ExecContext::default())
        .await
        .unwrap();
    match result {
        Aggregated::Rows(rows) => assert_eq!(rows.len(), 2),
        other => panic!("expected Rows, got {other:?}"),
    }
}

#[test]
fn test_group_by_aggregate_descriptor() {
    let rows: Vec<Row> = vec![
        vec![RawValue::I64(1), RawValue::I64(10)],
        vec![RawValue::I64(1), RawValue::I64(20)],
        vec![RawValue::I64(2), RawValue::I64(5)],
    ];
    let descriptor = MergeDescriptor {
        columns: vec!["group".into(), "value".into()],
        group_by: vec![0],
        aggregates: vec![AggregateSpec {
            column: 1,
            kind: AggregateKind::Sum,
        }],
        ..Default::default()
    };
    let merged = merger::merge(&descriptor, &[rows]).unwrap();
    assert_eq!(merged.len(), 2);
}
