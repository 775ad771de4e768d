//! Fan-out executor: dispatches one rewritten statement per target
//! concurrently, aggregates the per-shard outcomes, and supports
//! cancellation. Built on `tokio::task::JoinSet` (one task per
//! `RewriteResult`), upgrading pgdog's `futures::future::join_all` fan-out
//! idiom (`backend/schema/fk_lookup.rs`) to a cancel-safe primitive, plus a
//! `tokio_util::sync::CancellationToken` for the deadline/cancel signal.

mod error;

pub use error::Error;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::{merger::Row, rewrite::RewriteResult, value::RawValue};

/// One statement's outcome: a materialized row set for reads, or an
/// `(rows_affected, last_insert_id)` pair for writes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    Rows(Vec<Row>),
    Write { rows_affected: u64, last_insert_id: u64 },
}

/// The physical backend capability the executor dispatches against. An
/// external collaborator: connection management and the wire protocol
/// live outside this crate.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn execute(&self, sql: &str, parameters: &[RawValue]) -> Result<ExecOutcome, String>;
}

/// Per-call execution context.
#[derive(Clone)]
pub struct ExecContext {
    pub in_transaction: bool,
    pub cancel: CancellationToken,
}

impl Default for ExecContext {
    fn default() -> Self {
        Self {
            in_transaction: false,
            cancel: CancellationToken::new(),
        }
    }
}

/// Aggregated result across every dispatched `RewriteResult`.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregated {
    Rows(Vec<Row>),
    Write { rows_affected: u64, last_insert_id: u64 },
}

fn aggregate(outcomes: Vec<ExecOutcome>) -> Aggregated {
    if outcomes
        .iter()
        .all(|outcome| matches!(outcome, ExecOutcome::Write { .. }))
    {
        let mut rows_affected = 0u64;
        let mut last_insert_id = 0u64;
        for outcome in outcomes {
            if let ExecOutcome::Write {
                rows_affected: r,
                last_insert_id: l,
            } = outcome
            {
                rows_affected += r;
                if l > 0 {
                    last_insert_id = last_insert_id.max(l);
                }
            }
        }
        Aggregated::Write {
            rows_affected,
            last_insert_id,
        }
    } else {
        let mut rows = Vec::new();
        for outcome in outcomes {
            if let ExecOutcome::Rows(r) = outcome {
                rows.extend(r);
            }
        }
        Aggregated::Rows(rows)
    }
}

/// Holds one backend handle per configured data-source name and fans out
/// `RewriteResult`s concurrently.
pub struct Executor {
    backends: HashMap<String, Arc<dyn DataSource>>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Executor {
    pub fn new(backends: HashMap<String, Arc<dyn DataSource>>) -> Self {
        Self { backends }
    }

    pub async fn dispatch(
        &self,
        rewrites: &[RewriteResult],
        ctx: &ExecContext,
    ) -> Result<Aggregated, Error> {
        if ctx.in_transaction && rewrites.len() > 1 {
            return Err(Error::MultiShardTxn(rewrites.len()));
        }

        let mut set = JoinSet::new();
        for rw in rewrites {
            let data_source = rw.data_source.clone();
            let Some(backend) = self.backends.get(&data_source).cloned() else {
                return Err(Error::Exec {
                    data_source,
                    message: "no backend registered for this data source".into(),
                });
            };
            let sql = rw.sql.clone();
            let parameters = rw.parameters.clone();
            let cancel = ctx.cancel.clone();

            set.spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => Err(Error::Cancelled),
                    result = backend.execute(&sql, &parameters) => {
                        result.map_err(|message| Error::Exec { data_source, message })
                    }
                }
            });
        }

        let mut outcomes = Vec::with_capacity(rewrites.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(err)) => {
                    warn!(error = %err, "per-shard failure, aborting in-flight work");
                    ctx.cancel.cancel();
                    set.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    error!(error = %join_err, "executor task panicked or was aborted");
                    ctx.cancel.cancel();
                    set.abort_all();
                    return Err(Error::Cancelled);
                }
            }
        }

        Ok(aggregate(outcomes))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Stub {
        rows_per_call: Vec<RawValue>,
    }

    #[async_trait]
    impl DataSource for Stub {
        async fn execute(&self, _sql: &str, _parameters: &[RawValue]) -> Result<ExecOutcome, String> {
            Ok(ExecOutcome::Rows(vec![self.rows_per_call.clone()]))
        }
    }

    struct FailingStub;

    #[async_trait]
    impl DataSource for FailingStub {
        async fn execute(&self, _sql: &str, _parameters: &[RawValue]) -> Result<ExecOutcome, String> {
            Err("connection refused".into())
        }
    }

    struct WriteStub {
        rows_affected: u64,
        last_insert_id: u64,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DataSource for WriteStub {
        async fn execute(&self, _sql: &str, _parameters: &[RawValue]) -> Result<ExecOutcome, String> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(ExecOutcome::Write {
                rows_affected: self.rows_affected,
                last_insert_id: self.last_insert_id,
            })
        }
    }

    fn rewrite(data_source: &str, sql: &str) -> RewriteResult {
        RewriteResult {
            data_source: data_source.to_string(),
            sql: sql.to_string(),
            parameters: vec![],
        }
    }

    #[tokio::test]
    async fn test_fan_out_collects_rows_from_every_route() {
        let mut backends: HashMap<String, Arc<dyn DataSource>> = HashMap::new();
        backends.insert(
            "ds_0".into(),
            Arc::new(Stub {
                rows_per_call: vec![RawValue::I64(1)],
            }),
        );
        let executor = Executor::new(backends);
        let rewrites = vec![
            rewrite("ds_0", "SELECT * FROM t_order_1"),
            rewrite("ds_0", "SELECT * FROM t_order_2"),
        ];
        let result = executor
            .dispatch(&rewrites, &ExecContext::default())
            .await
            .unwrap();
        match result {
            Aggregated::Rows(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected Rows, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_write_aggregation_sums_rows_affected_and_maxes_insert_id() {
        let mut backends: HashMap<String, Arc<dyn DataSource>> = HashMap::new();
        let calls = Arc::new(AtomicUsize::new(0));
        backends.insert(
            "ds_0".into(),
            Arc::new(WriteStub {
                rows_affected: 2,
                last_insert_id: 0,
                calls: calls.clone(),
            }),
        );
        backends.insert(
            "ds_1".into(),
            Arc::new(WriteStub {
                rows_affected: 3,
                last_insert_id: 42,
                calls: calls.clone(),
            }),
        );
        let executor = Executor::new(backends);
        let rewrites = vec![
            rewrite("ds_0", "UPDATE t SET a = 1"),
            rewrite("ds_1", "UPDATE t SET a = 1"),
        ];
        let result = executor
            .dispatch(&rewrites, &ExecContext::default())
            .await
            .unwrap();
        assert_eq!(
            result,
            Aggregated::Write {
                rows_affected: 5,
                last_insert_id: 42
            }
        );
    }

    #[tokio::test]
    async fn test_per_shard_failure_is_reported_with_data_source() {
        let mut backends: HashMap<String, Arc<dyn DataSource>> = HashMap::new();
        backends.insert("ds_0".into(), Arc::new(FailingStub));
        let executor = Executor::new(backends);
        let rewrites = vec![rewrite("ds_0", "SELECT 1")];
        let err = executor
            .dispatch(&rewrites, &ExecContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Exec { data_source, .. } if data_source == "ds_0"));
    }

    #[tokio::test]
    async fn test_multi_shard_txn_is_fail_fast() {
        let mut backends: HashMap<String, Arc<dyn DataSource>> = HashMap::new();
        backends.insert(
            "ds_0".into(),
            Arc::new(Stub {
                rows_per_call: vec![RawValue::I64(1)],
            }),
        );
        let executor = Executor::new(backends);
        let rewrites = vec![
            rewrite("ds_0", "SELECT * FROM t_order_1"),
            rewrite("ds_0", "SELECT * FROM t_order_2"),
        ];
        let ctx = ExecContext {
            in_transaction: true,
            cancel: CancellationToken::new(),
        };
        assert!(matches!(
            executor.dispatch(&rewrites, &ctx).await,
            Err(Error::MultiShardTxn(2))
        ));
    }
}
