//! best-first 最近邻查询与批量分发
//!
//! 批量查询彼此独立：每条查询在只读索引上执行，结果写入自己的槽位
//! （rayon 有序 collect），不管完成顺序如何，`results[i]` 都对应 `queries[i]`。
//! 单条查询失败（错误或 panic）只记录在它自己的 `QueryResult` 里。

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use crate::core::{
    cmp_f64, AdaptiveScheduler, ExecutionStrategy, QueryError, QueryPoint, Task,
};
use crate::index::{Neighbor, SpatialIndex};
use crate::query::range::count_within;
use crate::stats::BatchTiming;

/// 单索引最近邻：委托给索引的 `nearest(q, 1)`
pub fn nn<I: SpatialIndex + ?Sized>(index: &I, qx: f64, qy: f64) -> Result<Neighbor, QueryError> {
    check_query(qx, qy)?;
    index
        .nearest(qx, qy, 1)?
        .into_iter()
        .next()
        .ok_or(QueryError::EmptyIndex)
}

/// 多分区最近邻：每个分区各取最近点，再按 (距离, id) 取全局最小。
///
/// 空分区跳过；所有分区都为空时返回 `EmptyIndex`。
pub fn nn_multi<I: SpatialIndex>(indexes: &[I], qx: f64, qy: f64) -> Result<Neighbor, QueryError> {
    if indexes.is_empty() {
        return Err(QueryError::NoIndexes);
    }
    check_query(qx, qy)?;

    let mut best: Option<(f64, Neighbor)> = None;
    for idx in indexes.iter().filter(|i| !i.is_empty()) {
        let cand = nn(idx, qx, qy)?;
        let d2 = cand.point.distance_sq(qx, qy);
        let better = match &best {
            None => true,
            Some((bd2, b)) => cmp_f64(d2, *bd2).then(cand.point.id.cmp(&b.point.id)).is_lt(),
        };
        if better {
            best = Some((d2, cand));
        }
    }
    best.map(|(_, n)| n).ok_or(QueryError::EmptyIndex)
}

pub(crate) fn check_query(qx: f64, qy: f64) -> Result<(), QueryError> {
    if qx.is_finite() && qy.is_finite() {
        Ok(())
    } else {
        Err(QueryError::NonFiniteQuery)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryAnswer {
    Nearest(Neighbor),
    Count { count: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryResult {
    pub query_id: u64,
    pub outcome: Result<QueryAnswer, QueryError>,
    #[serde(skip)]
    pub elapsed: Duration,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    pub results: Vec<QueryResult>,
    pub timing: BatchTiming,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_err()).count()
    }
}

/// 批量查询分发器：有界线程池，每条查询一个任务
pub struct QueryDispatcher {
    scheduler: AdaptiveScheduler,
}

impl QueryDispatcher {
    pub fn new(scheduler: AdaptiveScheduler) -> Self {
        Self { scheduler }
    }

    /// `workers` 为 None 时按系统负载自适应
    pub fn with_workers(workers: Option<usize>) -> Self {
        let scheduler = match workers {
            Some(n) => AdaptiveScheduler::fixed(n),
            None => {
                let mut s = AdaptiveScheduler::new();
                s.adjust_parallelism();
                s
            }
        };
        Self { scheduler }
    }

    pub fn nearest<I: SpatialIndex>(&self, index: &I, queries: &[QueryPoint]) -> BatchReport {
        self.dispatch(queries, |q| nn(index, q.x, q.y).map(QueryAnswer::Nearest))
    }

    pub fn nearest_multi<I: SpatialIndex>(
        &self,
        indexes: &[I],
        queries: &[QueryPoint],
    ) -> BatchReport {
        self.dispatch(queries, |q| nn_multi(indexes, q.x, q.y).map(QueryAnswer::Nearest))
    }

    pub fn count_within<I: SpatialIndex>(
        &self,
        index: &I,
        queries: &[QueryPoint],
        radius: f64,
    ) -> BatchReport {
        self.dispatch(queries, |q| {
            count_within(index, q.x, q.y, radius).map(|count| QueryAnswer::Count { count })
        })
    }

    pub fn dispatch<F>(&self, queries: &[QueryPoint], f: F) -> BatchReport
    where
        F: Fn(&QueryPoint) -> Result<QueryAnswer, QueryError> + Sync,
    {
        let started = Instant::now();
        let strategy = self.scheduler.select_strategy(&Task::QueryBatch {
            queries: queries.len(),
        });

        let results: Vec<QueryResult> = match strategy {
            ExecutionStrategy::Serial => queries.iter().map(|q| run_one(q, &f)).collect(),
            ExecutionStrategy::Parallel { workers } => {
                match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                    Ok(pool) => pool.install(|| queries.par_iter().map(|q| run_one(q, &f)).collect()),
                    Err(e) => {
                        tracing::warn!("Query pool build failed, running serially: {}", e);
                        queries.iter().map(|q| run_one(q, &f)).collect()
                    }
                }
            }
        };

        let timing = BatchTiming::new(started.elapsed(), queries.len());
        let report = BatchReport { results, timing };
        tracing::info!(
            "Dispatched {} queries ({:?}): {} failed, {}",
            queries.len(),
            strategy,
            report.failures(),
            report.timing
        );
        report
    }
}

fn run_one<F>(q: &QueryPoint, f: &F) -> QueryResult
where
    F: Fn(&QueryPoint) -> Result<QueryAnswer, QueryError>,
{
    let started = Instant::now();
    let outcome = match catch_unwind(AssertUnwindSafe(|| f(q))) {
        Ok(r) => r.map_err(|e| match e {
            QueryError::NonFiniteQuery => QueryError::InvalidQuery { id: q.id },
            other => other,
        }),
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "query panicked".to_string());
            tracing::warn!("Query {} panicked: {}", q.id, msg);
            Err(QueryError::Failed(msg))
        }
    };
    QueryResult {
        query_id: q.id,
        outcome,
        elapsed: started.elapsed(),
    }
}
