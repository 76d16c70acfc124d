use serde::{Deserialize, Serialize};

use crate::core::{BoundingBox, Point, QueryError};
use crate::index::SpatialIndex;

/// 闭区间窗口 `[x1, x2] × [y1, y2]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowQuery {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl WindowQuery {
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self { x1, x2, y1, y2 }
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x1, self.y1, self.x2, self.y2)
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.x1 <= p.x && p.x <= self.x2 && self.y1 <= p.y && p.y <= self.y2
    }
}

/// 与查询点距离不超过 `radius` 的点数（边界上的点计入）。
///
/// 先用外接正方形做 `range` 粗筛，再精确比较距离平方。
pub fn count_within<I: SpatialIndex + ?Sized>(
    index: &I,
    qx: f64,
    qy: f64,
    radius: f64,
) -> Result<usize, QueryError> {
    check_count_args(qx, qy, radius)?;
    let r2 = radius * radius;
    Ok(index
        .range(&BoundingBox::around(qx, qy, radius))
        .iter()
        .filter_map(|e| e.point())
        .filter(|p| p.distance_sq(qx, qy) <= r2)
        .count())
}

pub(crate) fn check_count_args(qx: f64, qy: f64, radius: f64) -> Result<(), QueryError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(QueryError::InvalidRadius(radius));
    }
    if !qx.is_finite() || !qy.is_finite() {
        return Err(QueryError::NonFiniteQuery);
    }
    Ok(())
}

/// 对任意点集做窗口过滤（例如在 skyline 结果上再筛一遍）
pub fn window(points: &[Point], w: &WindowQuery) -> Vec<Point> {
    points.iter().filter(|p| w.contains(p)).copied().collect()
}

pub fn window_indexed<I: SpatialIndex + ?Sized>(index: &I, w: &WindowQuery) -> Vec<Point> {
    index
        .range(&w.bbox())
        .into_iter()
        .filter_map(|e| e.point().copied())
        .collect()
}
