pub mod flat;
pub mod rtree;

use serde::Serialize;

use crate::core::{BoundingBox, IndexError, Point};

pub use flat::FlatIndex;
pub use rtree::RTree;

/// 索引内部节点句柄（只在产生它的索引实例内有效）
pub type NodeId = usize;

/// 索引条目：叶子（一个点）或内部节点摘要，二者都带包围盒
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntryKind {
    Leaf(Point),
    Node(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexEntry {
    pub key: BoundingBox,
    /// 叶子为点 id，节点为 NodeId
    pub id: u64,
    pub kind: EntryKind,
}

impl IndexEntry {
    pub fn leaf(p: Point) -> Self {
        Self {
            key: p.bbox(),
            id: p.id,
            kind: EntryKind::Leaf(p),
        }
    }

    pub fn node(id: NodeId, key: BoundingBox) -> Self {
        Self {
            key,
            id: id as u64,
            kind: EntryKind::Node(id),
        }
    }

    pub fn point(&self) -> Option<&Point> {
        match &self.kind {
            EntryKind::Leaf(p) => Some(p),
            EntryKind::Node(_) => None,
        }
    }
}

/// 最近邻结果
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Neighbor {
    pub point: Point,
    pub distance: f64,
}

impl Neighbor {
    pub fn new(point: Point, qx: f64, qy: f64) -> Self {
        Self {
            point,
            distance: point.distance(qx, qy),
        }
    }
}

/// 空间索引抽象：BBS / NN 引擎只通过这个接口访问索引。
///
/// ## 契约（重要）
/// - 构建后只读；`&self` 上的并发查询必须安全（因此要求 `Send + Sync`）。
/// - `build` 遇到非有限坐标返回 `IndexError::InvalidGeometry`。
/// - `range` 只返回叶子条目，每个与 `bbox` 相交的点恰好一次；结果为空不是错误。
/// - `frontier` 返回根的直接子条目；`expand` 返回某个节点的直接子条目。
///   不分层的实现可以用默认实现（frontier = range(root_bounds)，没有节点）。
/// - `nearest` 按 (距离, id) 升序返回最多 `k` 个点；空索引返回 `IndexError::EmptyIndex`。
pub trait SpatialIndex: Send + Sync {
    fn build(points: Vec<Point>) -> Result<Self, IndexError>
    where
        Self: Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn root_bounds(&self) -> Option<BoundingBox>;

    fn range(&self, bbox: &BoundingBox) -> Vec<IndexEntry>;

    fn frontier(&self) -> Vec<IndexEntry> {
        match self.root_bounds() {
            Some(b) => self.range(&b),
            None => Vec::new(),
        }
    }

    fn expand(&self, _node: NodeId) -> Vec<IndexEntry> {
        Vec::new()
    }

    fn nearest(&self, qx: f64, qy: f64, k: usize) -> Result<Vec<Neighbor>, IndexError>;
}

/// 构建前统一校验坐标
pub(crate) fn validate_all(points: &[Point]) -> Result<(), IndexError> {
    for p in points {
        p.validate()?;
    }
    Ok(())
}
