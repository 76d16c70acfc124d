//! 分治 skyline：按中位数切成两半，各自建索引跑 BBS，再合并。
//!
//! 合并必须针对合并后的完整集合判断：一侧的局部 skyline 点完全可能被
//! 另一侧的点支配（例如按 y 切分时，上半部分的点可以支配下半部分的点）。

use rayon::join;

use crate::core::{
    cmp_f64, AdaptiveScheduler, Axis, DominanceRule, ExecutionStrategy, IndexError,
    PartitionError, Point, Task,
};
use crate::index::SpatialIndex;
use crate::query::bbs::{BbsEngine, BbsStats};
use crate::query::set::SkylineSet;

/// 按 `axis` 排序后在中位数下标处切开；左半 `len / 2` 个点。
///
/// 同坐标按 id 排序，保证切分结果确定。少于 2 个点时拒绝切分。
pub fn partition(
    mut points: Vec<Point>,
    axis: Axis,
) -> Result<(Vec<Point>, Vec<Point>), PartitionError> {
    if points.len() < 2 {
        return Err(PartitionError::EmptyPartition { len: points.len() });
    }
    points.sort_by(|a, b| cmp_f64(a.coord(axis), b.coord(axis)).then(a.id.cmp(&b.id)));
    let right = points.split_off(points.len() / 2);
    Ok((points, right))
}

/// 合并两个局部 skyline：以左侧为起点，右侧点逐个针对合并集合做接纳判断，
/// 新接纳的点会剔除合并集合中被它支配的旧成员。
pub fn merge(left: SkylineSet, right: SkylineSet, rule: &DominanceRule) -> SkylineSet {
    let mut combined = left;
    let mut evicted = 0;
    for p in right.into_vec() {
        if let Some(n) = combined.admit_evicting(rule, p) {
            evicted += n;
        }
    }
    if evicted > 0 {
        tracing::debug!("Skyline merge evicted {} left-partition point(s)", evicted);
    }
    combined
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartitionedStats {
    pub left_len: usize,
    pub right_len: usize,
    pub left: BbsStats,
    pub right: BbsStats,
}

/// 分治 skyline 的编排器
pub struct PartitionedSkyline {
    axis: Axis,
    engine: BbsEngine,
    strategy: ExecutionStrategy,
}

impl PartitionedSkyline {
    pub fn new(axis: Axis, rule: DominanceRule, scheduler: &AdaptiveScheduler) -> Self {
        Self {
            axis,
            engine: BbsEngine::new(rule),
            strategy: scheduler.select_strategy(&Task::PartitionedSkyline { partitions: 2 }),
        }
    }

    pub fn serial(axis: Axis, rule: DominanceRule) -> Self {
        Self {
            axis,
            engine: BbsEngine::new(rule),
            strategy: ExecutionStrategy::Serial,
        }
    }

    pub fn run<I: SpatialIndex>(
        &self,
        points: Vec<Point>,
    ) -> Result<(SkylineSet, PartitionedStats), PartitionError> {
        self.run_with(points, I::build)
    }

    /// `build` 为每个分区建索引；任一分区建索引失败都会中止整个分治流程
    pub fn run_with<I, F>(
        &self,
        points: Vec<Point>,
        build: F,
    ) -> Result<(SkylineSet, PartitionedStats), PartitionError>
    where
        I: SpatialIndex,
        F: Fn(Vec<Point>) -> Result<I, IndexError> + Sync,
    {
        let (left_pts, right_pts) = partition(points, self.axis)?;
        let (left_len, right_len) = (left_pts.len(), right_pts.len());
        tracing::info!(
            "Partitioned on {:?}: left {} / right {} points",
            self.axis,
            left_len,
            right_len
        );

        let left_idx = build(left_pts)?;
        let right_idx = build(right_pts)?;

        let pass = |idx: &I| {
            let mut set = SkylineSet::new();
            let stats = self.engine.run(idx, &mut set);
            (set, stats)
        };

        // 两个分区互不相交，可以并行；merge 必须等两侧都完成
        let ((left_sky, left_stats), (right_sky, right_stats)) = match self.strategy {
            ExecutionStrategy::Parallel { .. } => join(|| pass(&left_idx), || pass(&right_idx)),
            ExecutionStrategy::Serial => (pass(&left_idx), pass(&right_idx)),
        };

        let merged = merge(left_sky, right_sky, self.engine.rule());
        Ok((
            merged,
            PartitionedStats {
                left_len,
                right_len,
                left: left_stats,
                right: right_stats,
            },
        ))
    }
}

/// 按中位数切分并为两半各建一个索引（供分治 NN 使用）
pub fn partitioned_indexes<I, F>(
    points: Vec<Point>,
    axis: Axis,
    build: F,
) -> Result<Vec<I>, PartitionError>
where
    I: SpatialIndex,
    F: Fn(Vec<Point>) -> Result<I, IndexError>,
{
    let (left, right) = partition(points, axis)?;
    Ok(vec![build(left)?, build(right)?])
}
