use crate::core::{cmp_f64, BoundingBox, IndexError, Point};
use crate::index::{validate_all, IndexEntry, Neighbor, SpatialIndex};

/// 扁平索引：所有点放在一个数组里，每次查询全量扫描。
///
/// 不分层（没有内部节点），用来验证引擎只依赖 `SpatialIndex` 契约。
pub struct FlatIndex {
    points: Vec<Point>,
    bounds: Option<BoundingBox>,
}

impl SpatialIndex for FlatIndex {
    fn build(points: Vec<Point>) -> Result<Self, IndexError> {
        validate_all(&points)?;
        let bounds = BoundingBox::enclosing(&points);
        Ok(Self { points, bounds })
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn root_bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    fn range(&self, bbox: &BoundingBox) -> Vec<IndexEntry> {
        self.points
            .iter()
            .filter(|p| bbox.contains_point(p))
            .map(|p| IndexEntry::leaf(*p))
            .collect()
    }

    fn nearest(&self, qx: f64, qy: f64, k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if self.points.is_empty() {
            return Err(IndexError::EmptyIndex);
        }
        let mut scored: Vec<(f64, &Point)> = self
            .points
            .iter()
            .map(|p| (p.distance_sq(qx, qy), p))
            .collect();
        scored.sort_by(|a, b| cmp_f64(a.0, b.0).then(a.1.id.cmp(&b.1.id)));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, p)| Neighbor::new(*p, qx, qy))
            .collect())
    }
}
