//! R-tree 后端：geo-index 的 packed Hilbert R-tree（flatbush 布局）。
//!
//! 节点都存放在一个平铺的 `boxes` 数组里，每个节点 4 个值
//! `[min_x, min_y, max_x, max_y]`；先是全部叶子条目，再逐层往上，根在最后。
//! `NodeId` 就是节点在 `boxes` 中的起始下标，`indices[pos >> 2]` 对叶子是
//! 插入序号，对内部节点是子节点组的起始下标。

use std::fmt;

use geo_index::rtree::sort::HilbertSort;
use geo_index::rtree::{RTree as PackedRTree, RTreeBuilder, RTreeIndex};

use crate::core::{cmp_f64, BoundingBox, IndexError, Point};
use crate::index::{validate_all, IndexEntry, Neighbor, NodeId, SpatialIndex};

pub const DEFAULT_NODE_CAPACITY: usize = 16;
const MIN_NODE_CAPACITY: usize = 2;

pub struct RTree {
    /// 按插入顺序保存，下标即 geo-index 返回的条目序号
    points: Vec<Point>,
    /// 空数据集不建树
    tree: Option<PackedRTree<f64>>,
    capacity: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub depth: usize,
    pub node_count: usize,
    pub leaf_count: usize,
}

impl fmt::Debug for RTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("len", &self.points.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}

impl RTree {
    pub fn with_capacity(points: Vec<Point>, capacity: usize) -> Result<Self, IndexError> {
        validate_all(&points)?;
        let capacity = capacity.clamp(MIN_NODE_CAPACITY, u16::MAX as usize);

        let tree = if points.is_empty() {
            None
        } else {
            let mut builder = RTreeBuilder::<f64>::new_with_node_size(points.len() as u32, capacity as u16);
            for p in &points {
                builder.add(p.x, p.y, p.x, p.y);
            }
            Some(builder.finish::<HilbertSort>())
        };

        let index = Self {
            points,
            tree,
            capacity,
        };
        let stats = index.stats();
        tracing::debug!(
            "R-tree built: {} points, depth {}, {} nodes ({} leaves), capacity {}",
            index.points.len(),
            stats.depth,
            stats.node_count,
            stats.leaf_count,
            capacity
        );
        Ok(index)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> TreeStats {
        let Some(tree) = &self.tree else {
            return TreeStats::default();
        };
        let bounds = tree.level_bounds();
        let items = self.points.len();
        let total = tree.boxes().len() / 4;
        TreeStats {
            depth: bounds.len().saturating_sub(1),
            node_count: total - items,
            leaf_count: match bounds {
                [items_end, first_level, ..] => (first_level - items_end) / 4,
                _ => 0,
            },
        }
    }

    fn node_box(tree: &PackedRTree<f64>, pos: usize) -> BoundingBox {
        let b = &tree.boxes()[pos..pos + 4];
        BoundingBox::new(b[0], b[1], b[2], b[3])
    }

    /// 子节点组 `[start, end)`：最多 `node_size` 个，且不跨层
    fn group_entries(&self, tree: &PackedRTree<f64>, start: usize) -> Vec<IndexEntry> {
        let end = (start + self.capacity * 4).min(upper_bound(start, tree.level_bounds()));
        let indices = tree.indices();
        let leaf_group = start < self.points.len() * 4;

        (start..end)
            .step_by(4)
            .map(|pos| {
                let slot = indices.get(pos >> 2);
                if leaf_group {
                    IndexEntry::leaf(self.points[slot])
                } else {
                    IndexEntry::node(pos, Self::node_box(tree, pos))
                }
            })
            .collect()
    }
}

/// `level_bounds` 中第一个大于 `value` 的层边界（flatbush 的 upperBound）
fn upper_bound(value: usize, bounds: &[usize]) -> usize {
    let i = bounds.partition_point(|&b| b <= value);
    bounds
        .get(i)
        .or_else(|| bounds.last())
        .copied()
        .unwrap_or(value)
}

/// 搜索半径放宽几个 ulp，保证与第 k 近点等距的点都落在窗口内
fn widen(radius: f64, qx: f64, qy: f64) -> f64 {
    radius + radius * 1e-9 + (qx.abs() + qy.abs() + 1.0) * f64::EPSILON * 4.0
}

impl SpatialIndex for RTree {
    fn build(points: Vec<Point>) -> Result<Self, IndexError> {
        Self::with_capacity(points, DEFAULT_NODE_CAPACITY)
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn root_bounds(&self) -> Option<BoundingBox> {
        let tree = self.tree.as_ref()?;
        Some(Self::node_box(tree, tree.boxes().len() - 4))
    }

    fn range(&self, bbox: &BoundingBox) -> Vec<IndexEntry> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        tree.search(bbox.xlo, bbox.ylo, bbox.xhi, bbox.yhi)
            .into_iter()
            .map(|slot| IndexEntry::leaf(self.points[slot as usize]))
            .collect()
    }

    /// 根的直接子条目
    fn frontier(&self) -> Vec<IndexEntry> {
        match &self.tree {
            Some(tree) => {
                let root = tree.boxes().len() - 4;
                self.group_entries(tree, tree.indices().get(root >> 2))
            }
            None => Vec::new(),
        }
    }

    fn expand(&self, node: NodeId) -> Vec<IndexEntry> {
        match &self.tree {
            Some(tree)
                if node % 4 == 0 && node >= self.points.len() * 4 && node + 4 <= tree.boxes().len() =>
            {
                self.group_entries(tree, tree.indices().get(node >> 2))
            }
            _ => Vec::new(),
        }
    }

    /// geo-index 的 best-first `neighbors` 给出 k 个候选，取其中最远的距离
    /// 作为半径再做一次窗口搜索，按 (距离, id) 排序后取前 k 个。
    /// 这样与第 k 近点等距的点都会参与比较，同距离时 id 小者优先。
    fn nearest(&self, qx: f64, qy: f64, k: usize) -> Result<Vec<Neighbor>, IndexError> {
        let Some(tree) = &self.tree else {
            return Err(IndexError::EmptyIndex);
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let seeds = tree.neighbors(qx, qy, Some(k), None);
        let reach_sq = seeds
            .iter()
            .map(|&slot| self.points[slot as usize].distance_sq(qx, qy))
            .fold(0.0_f64, f64::max);
        let r = widen(reach_sq.sqrt(), qx, qy);

        let mut scored: Vec<(f64, &Point)> = tree
            .search(qx - r, qy - r, qx + r, qy + r)
            .into_iter()
            .map(|slot| {
                let p = &self.points[slot as usize];
                (p.distance_sq(qx, qy), p)
            })
            .collect();
        scored.sort_by(|a, b| cmp_f64(a.0, b.0).then(a.1.id.cmp(&b.1.id)));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, p)| Neighbor::new(*p, qx, qy))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::EntryKind;

    fn grid(n: u64) -> Vec<Point> {
        (0..n * n)
            .map(|i| Point::new(i, (i % n) as f64, (i / n) as f64))
            .collect()
    }

    #[test]
    fn small_capacity_builds_multi_level_tree() {
        let tree = RTree::with_capacity(grid(10), 4).unwrap();
        let stats = tree.stats();
        assert_eq!(tree.len(), 100);
        assert_eq!(tree.capacity(), 4);
        assert!(stats.depth >= 3, "depth = {}", stats.depth);
        assert_eq!(stats.leaf_count, 25);
    }

    #[test]
    fn capacity_is_clamped() {
        let tree = RTree::with_capacity(grid(3), 0).unwrap();
        assert_eq!(tree.capacity(), MIN_NODE_CAPACITY);
    }

    #[test]
    fn range_returns_each_point_exactly_once() {
        let tree = RTree::with_capacity(grid(12), 3).unwrap();
        let root = tree.root_bounds().unwrap();
        assert_eq!(root, BoundingBox::new(0.0, 0.0, 11.0, 11.0));
        let mut ids: Vec<u64> = tree.range(&root).iter().map(|e| e.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..144).collect::<Vec<_>>());

        let window = BoundingBox::new(2.0, 3.0, 4.0, 5.0);
        assert_eq!(tree.range(&window).len(), 9);
        assert!(tree.range(&BoundingBox::new(50.0, 50.0, 60.0, 60.0)).is_empty());
    }

    #[test]
    fn expanding_frontier_reaches_every_leaf() {
        let tree = RTree::with_capacity(grid(9), 2).unwrap();
        let mut stack = tree.frontier();
        let mut seen = Vec::new();
        while let Some(e) = stack.pop() {
            match e.kind {
                EntryKind::Leaf(p) => seen.push(p.id),
                EntryKind::Node(id) => {
                    let children = tree.expand(id);
                    assert!(!children.is_empty());
                    // 子条目都在父节点的包围盒内
                    for c in &children {
                        assert!(e.key.xlo <= c.key.xlo && c.key.xhi <= e.key.xhi);
                        assert!(e.key.ylo <= c.key.ylo && c.key.yhi <= e.key.yhi);
                    }
                    stack.extend(children);
                }
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..81).collect::<Vec<_>>());
    }

    #[test]
    fn single_point_tree_has_one_leaf_under_root() {
        let tree = RTree::build(vec![Point::new(7, 2.0, 3.0)]).unwrap();
        let frontier = tree.frontier();
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier[0].point(), Some(&Point::new(7, 2.0, 3.0)));
    }

    #[test]
    fn expanding_a_leaf_position_yields_nothing() {
        let tree = RTree::with_capacity(grid(4), 2).unwrap();
        assert!(tree.expand(0).is_empty());
        assert!(tree.expand(usize::MAX - 8).is_empty());
    }

    #[test]
    fn nearest_prefers_lower_id_on_equal_distance() {
        let pts = vec![
            Point::new(30, 1.0, 0.0),
            Point::new(10, 0.0, 1.0),
            Point::new(20, -1.0, 0.0),
            Point::new(40, 5.0, 5.0),
        ];
        let tree = RTree::with_capacity(pts, 2).unwrap();
        let got = tree.nearest(0.0, 0.0, 2).unwrap();
        assert_eq!(got[0].point.id, 10);
        assert_eq!(got[1].point.id, 20);
        assert_eq!(got[0].distance, 1.0);
    }

    #[test]
    fn nearest_k_is_sorted_by_distance() {
        let tree = RTree::with_capacity(grid(20), 5).unwrap();
        let got = tree.nearest(7.2, 3.9, 10).unwrap();
        assert_eq!(got.len(), 10);
        assert_eq!(got[0].point.id, 4 * 20 + 7);
        assert!(got.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn nearest_with_k_above_len_returns_everything() {
        let tree = RTree::build(grid(3)).unwrap();
        assert_eq!(tree.nearest(100.0, 100.0, 50).unwrap().len(), 9);
        assert!(tree.nearest(0.0, 0.0, 0).unwrap().is_empty());
    }

    #[test]
    fn empty_tree_has_no_frontier_and_rejects_nearest() {
        let tree = RTree::build(Vec::new()).unwrap();
        assert!(tree.is_empty());
        assert!(tree.frontier().is_empty());
        assert!(tree.root_bounds().is_none());
        assert_eq!(tree.stats(), TreeStats::default());
        assert_eq!(tree.nearest(1.0, 1.0, 1), Err(IndexError::EmptyIndex));
    }

    #[test]
    fn upper_bound_picks_next_level() {
        let bounds = [40, 56, 60];
        assert_eq!(upper_bound(0, &bounds), 40);
        assert_eq!(upper_bound(40, &bounds), 56);
        assert_eq!(upper_bound(56, &bounds), 60);
        assert_eq!(upper_bound(60, &bounds), 60);
    }
}
