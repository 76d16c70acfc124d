//! Branch-and-Bound Skyline (BBS)
//!
//! 优先队列按包围盒"最优角"的分数 `(sx, sy)` 字典序升序出堆
//! （分数已按规则转成越小越好）。盒内任一点的分数都不小于最优角，
//! 能严格支配某点 p 的点分数一定字典序更小，所以 p 出堆时所有潜在
//! 支配者都已处理完：它们要么已在集合里，要么被集合里的某个成员支配。
//! 因此叶子出堆时的一次成员判断就是最终结论，已接纳的点不会再被移除。

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::core::{cmp_f64, DominanceRule};
use crate::index::{EntryKind, IndexEntry, SpatialIndex};
use crate::query::set::SkylineSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BbsStats {
    pub popped: usize,
    pub expanded: usize,
    pub pruned: usize,
    pub rejected: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BbsEngine {
    rule: DominanceRule,
}

impl BbsEngine {
    pub fn new(rule: DominanceRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &DominanceRule {
        &self.rule
    }

    pub fn skyline<I: SpatialIndex + ?Sized>(&self, index: &I) -> SkylineSet {
        let mut set = SkylineSet::new();
        self.run(index, &mut set);
        set
    }

    /// 在调用方持有的 `set` 上累积结果。
    ///
    /// `set` 非空时，已有成员同样参与剪枝（结果是 set ∪ 本分区中未被 set 支配的 skyline）；
    /// 已有成员本身不会因为本分区的点被剔除。
    pub fn run<I: SpatialIndex + ?Sized>(&self, index: &I, set: &mut SkylineSet) -> BbsStats {
        let mut stats = BbsStats::default();
        let mut heap: BinaryHeap<Candidate> = index
            .frontier()
            .into_iter()
            .map(|e| Candidate::new(&self.rule, e))
            .collect();

        while let Some(c) = heap.pop() {
            stats.popped += 1;
            match c.entry.kind {
                EntryKind::Leaf(p) => {
                    if !set.admit(&self.rule, p) {
                        stats.rejected += 1;
                    }
                }
                EntryKind::Node(id) => {
                    if self.rule.box_dominated_by(&c.entry.key, set.as_slice()) {
                        stats.pruned += 1;
                        continue;
                    }
                    stats.expanded += 1;
                    heap.extend(
                        index
                            .expand(id)
                            .into_iter()
                            .map(|e| Candidate::new(&self.rule, e)),
                    );
                }
            }
        }

        tracing::debug!(
            "BBS done: {} skyline points (popped {}, expanded {}, pruned {}, rejected {})",
            set.len(),
            stats.popped,
            stats.expanded,
            stats.pruned,
            stats.rejected
        );
        stats
    }
}

/// 默认规则（最小化 x、最大化 y）下的 BBS skyline
pub fn bbs_skyline<I: SpatialIndex + ?Sized>(index: &I) -> SkylineSet {
    BbsEngine::default().skyline(index)
}

struct Candidate {
    sx: f64,
    sy: f64,
    // 0 = 节点, 1 = 叶子；同分时先展开节点
    rank: u8,
    entry: IndexEntry,
}

impl Candidate {
    fn new(rule: &DominanceRule, entry: IndexEntry) -> Self {
        let (cx, cy) = rule.best_corner(&entry.key);
        let (sx, sy) = rule.scores(cx, cy);
        let rank = match entry.kind {
            EntryKind::Node(_) => 0,
            EntryKind::Leaf(_) => 1,
        };
        Self { sx, sy, rank, entry }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // 小顶堆
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(other.sx, self.sx)
            .then_with(|| cmp_f64(other.sy, self.sy))
            .then(other.rank.cmp(&self.rank))
            .then(other.entry.id.cmp(&self.entry.id))
    }
}
