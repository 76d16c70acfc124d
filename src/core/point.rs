use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::core::error::GeometryError;

/// 数据集中的一个点（加载后不可变；身份由 `id` 决定）
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    /// 坐标必须是有限值（NaN / ±inf 会破坏堆序与支配判断）
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.x.is_finite() && self.y.is_finite() {
            Ok(())
        } else {
            Err(GeometryError::InvalidGeometry {
                id: self.id,
                x: self.x,
                y: self.y,
            })
        }
    }

    pub fn coord(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// 欧氏距离平方。
    ///
    /// 所有引擎（R-tree / flat / oracle）都通过这一个函数算距离，
    /// 保证相同输入得到逐位相同的结果，平局判断才一致。
    pub fn distance_sq(&self, qx: f64, qy: f64) -> f64 {
        let dx = self.x - qx;
        let dy = self.y - qy;
        dx * dx + dy * dy
    }

    pub fn distance(&self, qx: f64, qy: f64) -> f64 {
        self.distance_sq(qx, qy).sqrt()
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_point(self)
    }
}

/// 查询位置（批量 NN / 半径计数的输入）
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl QueryPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

impl From<Point> for QueryPoint {
    fn from(p: Point) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
}

impl std::str::FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            other => Err(format!("unknown axis: {}", other)),
        }
    }
}

/// 轴对齐包围盒；点的包围盒退化为 `(x, y, x, y)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xlo: f64,
    pub ylo: f64,
    pub xhi: f64,
    pub yhi: f64,
}

impl BoundingBox {
    pub fn new(xlo: f64, ylo: f64, xhi: f64, yhi: f64) -> Self {
        Self { xlo, ylo, xhi, yhi }
    }

    pub fn from_point(p: &Point) -> Self {
        Self {
            xlo: p.x,
            ylo: p.y,
            xhi: p.x,
            yhi: p.y,
        }
    }

    /// 以 (cx, cy) 为中心、半边长为 `half` 的正方形
    pub fn around(cx: f64, cy: f64, half: f64) -> Self {
        Self {
            xlo: cx - half,
            ylo: cy - half,
            xhi: cx + half,
            yhi: cy + half,
        }
    }

    /// 包含所有点的最小包围盒；空输入返回 None
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut bbox = Self::from_point(first);
        for p in it {
            bbox.expand(&Self::from_point(p));
        }
        Some(bbox)
    }

    pub fn expand(&mut self, other: &BoundingBox) {
        self.xlo = self.xlo.min(other.xlo);
        self.ylo = self.ylo.min(other.ylo);
        self.xhi = self.xhi.max(other.xhi);
        self.yhi = self.yhi.max(other.yhi);
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.xlo <= other.xhi
            && self.xhi >= other.xlo
            && self.ylo <= other.yhi
            && self.yhi >= other.ylo
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.xlo && p.x <= self.xhi && p.y >= self.ylo && p.y <= self.yhi
    }

    pub fn is_point(&self) -> bool {
        self.xlo == self.xhi && self.ylo == self.yhi
    }

    /// 查询点到盒子的最小距离平方（盒内为 0）。
    ///
    /// 对退化盒 `(x, y, x, y)` 的结果与 [`Point::distance_sq`] 逐位相同。
    pub fn min_distance_sq(&self, qx: f64, qy: f64) -> f64 {
        let dx = if qx < self.xlo {
            self.xlo - qx
        } else if qx > self.xhi {
            qx - self.xhi
        } else {
            0.0
        };
        let dy = if qy < self.ylo {
            self.ylo - qy
        } else if qy > self.yhi {
            qy - self.yhi
        } else {
            0.0
        };
        dx * dx + dy * dy
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.xlo + self.xhi) * 0.5, (self.ylo + self.yhi) * 0.5)
    }
}

/// f64 全序比较（坐标已保证有限，total_cmp 只用来避免 unwrap）
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}
